//! Global heap and its statistics

use beedesk_core::traits::{MemoryStats, MemoryUsage};
use embedded_alloc::LlffHeap as Heap;

#[global_allocator]
pub static HEAP: Heap = Heap::empty();

/// Heap size: 16KB
const HEAP_SIZE: usize = 16 * 1024;

/// Initialize the heap allocator; call once before anything allocates
pub fn init() {
    use core::mem::MaybeUninit;
    static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
    #[allow(static_mut_refs)]
    unsafe {
        HEAP.init(HEAP_MEM.as_ptr() as usize, HEAP_SIZE)
    }
}

/// [`MemoryStats`] over the global heap
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapStats;

impl MemoryStats for HeapStats {
    fn usage(&self) -> MemoryUsage {
        MemoryUsage {
            used: HEAP.used(),
            free: HEAP.free(),
        }
    }
}
