/// Counters describing how a pool has been used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Instances constructed, by pre-warming or on the cold acquire path.
    pub created: u64,
    /// Acquires that found the idle queue empty and constructed an instance.
    pub cold_acquires: u64,
    /// Acquires served from an idle queue.
    pub reused: u64,
    /// Successful returns.
    pub released: u64,
    /// Returns rejected because the instance was unknown or already idle.
    pub rejected: u64,
}

impl PoolStats {
    /// Total number of acquires.
    pub fn acquires(&self) -> u64 {
        self.reused + self.cold_acquires
    }

    /// Fraction of acquires served without constructing anything.
    pub fn reuse_ratio(&self) -> f64 {
        let total = self.acquires();
        if total == 0 {
            0.0
        } else {
            self.reused as f64 / total as f64
        }
    }
}
