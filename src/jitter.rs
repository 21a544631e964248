//! Jitter strategies for the backoff scheduler.
//!
//! The scheduler's schedule is deterministic by default (`None`); `Full` and
//! `Equal` randomize a computed delay when many verifier instances share a
//! target and should not synchronize their retries.

use rand::{rng, Rng};
use std::time::Duration;

/// Randomization applied to a computed backoff delay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Jitter {
    /// Use the exact computed delay.
    #[default]
    None,
    /// Uniform in `[0, delay]`.
    Full,
    /// Uniform in `[delay/2, delay]`, keeping a floor.
    Equal,
}

impl Jitter {
    /// Apply jitter using the thread-local RNG.
    pub fn apply(&self, delay: Duration) -> Duration {
        self.apply_with_rng(delay, &mut rng())
    }

    /// Apply jitter with an injected RNG, for deterministic tests.
    pub fn apply_with_rng<R: Rng>(&self, delay: Duration, rng: &mut R) -> Duration {
        // Millisecond precision; saturate absurd durations rather than panic.
        let millis: u64 = delay.as_millis().try_into().unwrap_or(u64::MAX);
        match self {
            Jitter::None => delay,
            Jitter::Full => {
                if millis == 0 {
                    return Duration::ZERO;
                }
                Duration::from_millis(rng.random_range(0..=millis))
            }
            Jitter::Equal => {
                if millis == 0 {
                    return Duration::ZERO;
                }
                Duration::from_millis(rng.random_range(millis / 2..=millis))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn none_is_identity() {
        let delay = Duration::from_millis(750);
        assert_eq!(Jitter::None.apply(delay), delay);
    }

    #[test]
    fn full_stays_within_bounds() {
        let delay = Duration::from_secs(1);
        for _ in 0..100 {
            assert!(Jitter::Full.apply(delay) <= delay);
        }
    }

    #[test]
    fn equal_keeps_the_floor() {
        let delay = Duration::from_secs(1);
        for _ in 0..100 {
            let jittered = Jitter::Equal.apply(delay);
            assert!(jittered >= Duration::from_millis(500));
            assert!(jittered <= delay);
        }
    }

    #[test]
    fn zero_delay_stays_zero() {
        assert_eq!(Jitter::Full.apply(Duration::ZERO), Duration::ZERO);
        assert_eq!(Jitter::Equal.apply(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn deterministic_with_seeded_rng() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        let delay = Duration::from_millis(1000);
        assert_eq!(
            Jitter::Full.apply_with_rng(delay, &mut a),
            Jitter::Full.apply_with_rng(delay, &mut b)
        );
    }
}
