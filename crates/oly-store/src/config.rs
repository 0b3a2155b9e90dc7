//! Store configuration parameters.

/// Configuration for the entity [`Store`](crate::Store).
///
/// Controls the allocator's random source and range routing. All values
/// are fixed once the store is constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Seed for the allocator's random start position.
    ///
    /// Default: 0. Two stores built with the same seed and fed the same
    /// allocation sequence hand out the same ids.
    pub seed: u64,

    /// Route new characters and locations to the compact "prime" ranges.
    ///
    /// Default: `true`. When off (or once a prime range is exhausted) they
    /// are drawn from the overflow range. Players always try the player
    /// range first.
    pub prime_ranges: bool,
}

impl StoreConfig {
    /// Default allocator seed.
    pub const DEFAULT_SEED: u64 = 0;

    /// Default prime-range routing.
    pub const DEFAULT_PRIME_RANGES: bool = true;

    /// Create a config with default values.
    pub fn new() -> Self {
        Self {
            seed: Self::DEFAULT_SEED,
            prime_ranges: Self::DEFAULT_PRIME_RANGES,
        }
    }

    /// Override the allocator seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enable or disable prime-range routing.
    #[must_use]
    pub fn with_prime_ranges(mut self, prime_ranges: bool) -> Self {
        self.prime_ranges = prime_ranges;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.seed, 0);
        assert!(config.prime_ranges);
    }

    #[test]
    fn builder_overrides() {
        let config = StoreConfig::new().with_seed(7).with_prime_ranges(false);
        assert_eq!(config.seed, 7);
        assert!(!config.prime_ranges);
    }
}
