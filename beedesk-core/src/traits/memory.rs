//! Heap statistics

/// Heap usage snapshot in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MemoryUsage {
    pub used: usize,
    pub free: usize,
}

/// Source of heap statistics
pub trait MemoryStats {
    fn usage(&self) -> MemoryUsage;
}
