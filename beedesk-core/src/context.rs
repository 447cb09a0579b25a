//! Shared key/value context
//!
//! The context is the only channel tasks use to talk to each other. Keys are
//! short strings agreed on ahead of time; values are a small tagged union.
//! Reads never fail: a missing key, or a key holding a different variant,
//! yields the caller's default.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::{String, Vec};

/// Maximum key length in bytes
pub const MAX_KEY_LEN: usize = 24;

/// Maximum text value length in bytes
pub const MAX_TEXT_LEN: usize = 32;

/// Maximum byte-buffer value length
pub const MAX_BYTES_LEN: usize = 32;

/// Maximum number of keys held at once
pub const CONTEXT_CAPACITY: usize = 32;

/// Key holding the scheduler timestamp of the current run, in milliseconds
pub const TICKS_MS: &str = "ticks_ms";

/// Errors from context writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ContextError {
    /// No room for another key
    Full,
    /// Key longer than [`MAX_KEY_LEN`]
    KeyTooLong,
    /// Text longer than [`MAX_TEXT_LEN`]
    TextTooLong,
    /// Byte buffer longer than [`MAX_BYTES_LEN`]
    BytesTooLong,
}

/// A context value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Flag
    Bool(bool),
    /// Signed integer (timestamps, counters, enum discriminants)
    Int(i64),
    /// Short text
    Text(String<MAX_TEXT_LEN>),
    /// Short byte buffer
    Bytes(Vec<u8, MAX_BYTES_LEN>),
    /// Opaque handle (task ids, colour rule and beep sequence selectors)
    Handle(u32),
}

impl Value {
    /// Build a text value
    pub fn text(s: &str) -> Result<Self, ContextError> {
        let mut text = String::new();
        text.push_str(s).map_err(|_| ContextError::TextTooLong)?;
        Ok(Value::Text(text))
    }

    /// Build a byte-buffer value
    pub fn bytes(data: &[u8]) -> Result<Self, ContextError> {
        Vec::from_slice(data)
            .map(Value::Bytes)
            .map_err(|_| ContextError::BytesTooLong)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

/// Key/value store shared by every task of both schedulers
#[derive(Debug, Clone, Default)]
pub struct Context {
    vars: Vec<(String<MAX_KEY_LEN>, Value), CONTEXT_CAPACITY>,
}

impl Context {
    /// Create an empty context
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    /// Look up a raw value
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v)
    }

    /// Look up a value, cloning `default` when the key is absent
    pub fn get_or(&self, name: &str, default: Value) -> Value {
        self.get(name).cloned().unwrap_or(default)
    }

    /// Read a flag
    pub fn get_bool(&self, name: &str, default: bool) -> bool {
        match self.get(name) {
            Some(Value::Bool(v)) => *v,
            _ => default,
        }
    }

    /// Read an integer
    pub fn get_int(&self, name: &str, default: i64) -> i64 {
        match self.get(name) {
            Some(Value::Int(v)) => *v,
            _ => default,
        }
    }

    /// Read a text value
    pub fn get_text<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        match self.get(name) {
            Some(Value::Text(v)) => v.as_str(),
            _ => default,
        }
    }

    /// Read a byte buffer
    pub fn get_bytes<'a>(&'a self, name: &str, default: &'a [u8]) -> &'a [u8] {
        match self.get(name) {
            Some(Value::Bytes(v)) => v.as_slice(),
            _ => default,
        }
    }

    /// Read a handle
    pub fn get_handle(&self, name: &str, default: u32) -> u32 {
        match self.get(name) {
            Some(Value::Handle(v)) => *v,
            _ => default,
        }
    }

    /// Store a value, replacing whatever the key held before
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ContextError> {
        let value = value.into();

        if let Some((_, slot)) = self.vars.iter_mut().find(|(k, _)| k.as_str() == name) {
            *slot = value;
            return Ok(());
        }

        let mut key = String::new();
        key.push_str(name).map_err(|_| ContextError::KeyTooLong)?;
        self.vars
            .push((key, value))
            .map_err(|_| ContextError::Full)
    }

    /// Store a text value
    pub fn set_text(&mut self, name: &str, text: &str) -> Result<(), ContextError> {
        self.set(name, Value::text(text)?)
    }

    /// Remove a key, returning its value
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let index = self.vars.iter().position(|(k, _)| k.as_str() == name)?;
        Some(self.vars.swap_remove(index).1)
    }

    /// Check whether a key is present
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of keys held
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Check whether the context holds no keys
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Replay the changes that turned `before` into `after`
    ///
    /// Only keys whose value changed, or that were removed, are touched, so
    /// writes made here to any other key in the meantime survive. Every
    /// change is attempted; the first failure is returned.
    pub fn merge_changes(
        &mut self,
        before: &Context,
        after: &Context,
    ) -> Result<(), ContextError> {
        let mut result = Ok(());
        for (key, value) in after.vars.iter() {
            if before.get(key) == Some(value) {
                continue;
            }
            if let Err(e) = self.set(key, value.clone()) {
                result = result.and(Err(e));
            }
        }
        for (key, _) in before.vars.iter() {
            if !after.contains(key) {
                self.remove(key);
            }
        }
        result
    }
}

/// Context guarded for access from more than one execution context
///
/// The periodic scheduler runs in interrupt context and the suspend
/// scheduler on the main thread. Tasks run through [`SharedContext::run_at`]
/// on a private copy: the critical section covers only taking the copy and
/// merging the task's changes back, never the task's own I/O. A task sees
/// a consistent view for the whole run and never a half-applied write from
/// the other scheduler.
pub struct SharedContext {
    inner: Mutex<RefCell<Context>>,
}

impl SharedContext {
    /// Wrap an existing context
    pub fn new(ctx: Context) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(ctx)),
        }
    }

    /// Run `f` with exclusive access to the context
    ///
    /// Must not be called re-entrantly from inside `f`.
    pub fn with<R>(&self, f: impl FnOnce(&mut Context) -> R) -> R {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }

    /// Stamp `now` into [`TICKS_MS`] and run `f` on a copy outside the lock
    ///
    /// Changes `f` makes to the copy are merged back afterwards; the merge
    /// result is returned beside `f`'s.
    pub fn run_at<R>(
        &self,
        now: i64,
        f: impl FnOnce(&mut Context) -> R,
    ) -> (R, Result<(), ContextError>) {
        let before = self.with(|ctx| {
            let _ = ctx.set(TICKS_MS, now);
            ctx.clone()
        });
        let mut local = before.clone();
        let out = f(&mut local);
        let merged = self.with(|ctx| ctx.merge_changes(&before, &local));
        (out, merged)
    }
}

impl Default for SharedContext {
    fn default() -> Self {
        Self::new(Context::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_returns_default() {
        let ctx = Context::new();
        assert!(!ctx.get_bool("flush", false));
        assert_eq!(ctx.get_int("mode", 7), 7);
        assert_eq!(ctx.get_text("title", "none"), "none");
        assert_eq!(ctx.get_handle("rule", 3), 3);
        assert_eq!(ctx.get_or("x", Value::Bool(true)), Value::Bool(true));
    }

    #[test]
    fn test_set_and_overwrite() {
        let mut ctx = Context::new();
        ctx.set("mode", 1).unwrap();
        ctx.set("mode", 2).unwrap();
        assert_eq!(ctx.len(), 1);
        assert_eq!(ctx.get_int("mode", 0), 2);

        ctx.set_text("str1", "42").unwrap();
        assert_eq!(ctx.get_text("str1", ""), "42");
    }

    #[test]
    fn test_mismatched_variant_reads_default() {
        let mut ctx = Context::new();
        ctx.set("flag", true).unwrap();
        assert_eq!(ctx.get_int("flag", -1), -1);
        assert_eq!(ctx.get_text("flag", "d"), "d");
    }

    #[test]
    fn test_capacity_and_key_limits() {
        let mut ctx = Context::new();
        let long_key = "k".repeat(MAX_KEY_LEN + 1);
        assert_eq!(ctx.set(&long_key, 1), Err(ContextError::KeyTooLong));

        for i in 0..CONTEXT_CAPACITY {
            let key = std::format!("key{}", i);
            ctx.set(&key, i as i64).unwrap();
        }
        assert_eq!(ctx.set("one_more", 1), Err(ContextError::Full));
        // Overwriting an existing key still works when full
        assert!(ctx.set("key0", 99).is_ok());
    }

    #[test]
    fn test_value_limits() {
        let long_text = "x".repeat(MAX_TEXT_LEN + 1);
        assert_eq!(Value::text(&long_text), Err(ContextError::TextTooLong));
        assert_eq!(
            Value::bytes(&[0u8; MAX_BYTES_LEN + 1]),
            Err(ContextError::BytesTooLong)
        );
        assert!(Value::bytes(&[1, 2, 3]).is_ok());
    }

    #[test]
    fn test_remove() {
        let mut ctx = Context::new();
        ctx.set("a", 1).unwrap();
        ctx.set("b", 2).unwrap();
        assert_eq!(ctx.remove("a"), Some(Value::Int(1)));
        assert!(!ctx.contains("a"));
        assert_eq!(ctx.get_int("b", 0), 2);
        assert_eq!(ctx.remove("a"), None);
    }

    #[test]
    fn test_merge_keeps_untouched_keys() {
        let mut before = Context::new();
        before.set("mode", 1).unwrap();
        before.set("flush", true).unwrap();
        before.set("gone", 5).unwrap();

        let mut after = before.clone();
        after.set("flush", false).unwrap();
        after.set("new", 9).unwrap();
        after.remove("gone");

        // Meanwhile the shared copy moved on
        let mut shared = before.clone();
        shared.set("mode", 2).unwrap();
        shared.set("other", 3).unwrap();

        shared.merge_changes(&before, &after).unwrap();
        assert_eq!(shared.get_int("mode", 0), 2);
        assert_eq!(shared.get_int("other", 0), 3);
        assert!(!shared.get_bool("flush", true));
        assert_eq!(shared.get_int("new", 0), 9);
        assert!(!shared.contains("gone"));
    }

    #[test]
    fn test_merge_reports_full_and_applies_the_rest() {
        let before = Context::new();
        let mut after = Context::new();
        after.set("a", 1).unwrap();
        after.set("b", 2).unwrap();

        let mut shared = Context::new();
        for i in 0..CONTEXT_CAPACITY - 1 {
            shared.set(&std::format!("key{}", i), 0).unwrap();
        }
        assert_eq!(shared.merge_changes(&before, &after), Err(ContextError::Full));
        assert_eq!(shared.get_int("a", 0), 1);
        assert!(!shared.contains("b"));
    }

    #[test]
    fn test_run_at_releases_lock_while_running() {
        let shared = SharedContext::default();
        let (out, merged) = shared.run_at(1_000, |ctx| {
            // Another execution context writes while the run is in progress
            shared.with(|c| c.set("isr", 7)).unwrap();
            assert!(!ctx.contains("isr"));
            assert_eq!(ctx.get_int(TICKS_MS, 0), 1_000);
            ctx.set("mine", 1)
        });
        assert_eq!(out, Ok(()));
        assert_eq!(merged, Ok(()));
        shared.with(|c| {
            assert_eq!(c.get_int("isr", 0), 7);
            assert_eq!(c.get_int("mine", 0), 1);
            assert_eq!(c.get_int(TICKS_MS, 0), 1_000);
        });
    }

    #[test]
    fn test_shared_context_round_trip() {
        let shared = SharedContext::default();
        shared.with(|ctx| ctx.set("flush", true)).unwrap();
        assert!(shared.with(|ctx| ctx.get_bool("flush", false)));
    }
}
