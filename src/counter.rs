use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::Result;

/// Number of crops saved per label, shared by every image of a batch.
///
/// A label's count only moves forward once its crop is on disk, so the files
/// under one label directory are always numbered `1..=count` without gaps.
#[derive(Debug, Default)]
pub struct LabelCounter {
    counts: Mutex<BTreeMap<String, u32>>,
}

impl LabelCounter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, u32>> {
        self.counts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bump the count for `key` and return the new value.
    pub fn increment(&self, key: &str) -> u32 {
        let mut counts = self.lock();
        let count = counts.entry(key.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// Hand the next number for `key` to `write` and keep it only if the write
    /// succeeds. The lock is held across the write so concurrent callers never
    /// see the same number.
    pub fn record_with<F>(&self, key: &str, write: F) -> Result<u32>
    where
        F: FnOnce(u32) -> Result<()>,
    {
        let mut counts = self.lock();
        let next = counts.get(key).copied().unwrap_or(0) + 1;
        write(next)?;
        counts.insert(key.to_string(), next);
        Ok(next)
    }

    pub fn get(&self, key: &str) -> u32 {
        self.lock().get(key).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.lock().values().map(|&c| c as u64).sum()
    }

    pub fn snapshot(&self) -> BTreeMap<String, u32> {
        self.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_increment_is_per_key() {
        let counter = LabelCounter::new();
        assert_eq!(counter.increment("a"), 1);
        assert_eq!(counter.increment("a"), 2);
        assert_eq!(counter.increment("b"), 1);
        assert_eq!(counter.get("a"), 2);
        assert_eq!(counter.get("z"), 0);
        assert_eq!(counter.total(), 3);
    }

    #[test]
    fn test_failed_write_does_not_advance() {
        let counter = LabelCounter::new();
        assert_eq!(counter.record_with("x", |_| Ok(())).unwrap(), 1);
        assert!(counter.record_with("x", |_| Err(anyhow!("disk full"))).is_err());

        let mut seen = None;
        let n = counter
            .record_with("x", |n| {
                seen = Some(n);
                Ok(())
            })
            .unwrap();
        assert_eq!(n, 2);
        assert_eq!(seen, Some(2));
    }

    #[test]
    fn test_shared_across_threads() {
        let counter = LabelCounter::new();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..25 {
                        counter.increment("k");
                    }
                });
            }
        });
        assert_eq!(counter.get("k"), 100);
        assert_eq!(counter.snapshot().len(), 1);
    }
}
