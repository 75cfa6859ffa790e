//! Deterministic random number generation for rotation trials.
//!
//! RULE: Nothing in the generator may call any platform RNG.
//! All jitter flows through TrialRng instances derived from the
//! single master seed in RotationPolicy.
//!
//! Each trial gets its own RNG stream, seeded from
//! (master_seed XOR trial_index * golden ratio). This means:
//!   - A trial's stream does not depend on which worker runs it.
//!   - Raising the trial count never changes earlier trials' streams.

use crate::types::TrialIndex;
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A deterministic RNG owned by exactly one trial.
pub struct TrialRng {
    pub trial: TrialIndex,
    inner: Pcg64Mcg,
}

impl TrialRng {
    pub fn new(master_seed: u64, trial: TrialIndex) -> Self {
        let derived_seed = master_seed ^ trial.wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Self {
            trial,
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Uniform jitter in [0.0, amplitude). Zero amplitude draws nothing.
    pub fn jitter(&mut self, amplitude: f64) -> f64 {
        if amplitude <= 0.0 {
            return 0.0;
        }
        self.next_f64() * amplitude
    }
}

/// Hands out per-trial streams for one generator invocation.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_trial(&self, trial: TrialIndex) -> TrialRng {
        TrialRng::new(self.master_seed, trial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_trial_index_reproduces_stream() {
        let bank = RngBank::new(12345);
        let mut a = bank.for_trial(3);
        let mut b = bank.for_trial(3);
        for _ in 0..16 {
            assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
        }
    }

    #[test]
    fn different_trials_get_different_streams() {
        let bank = RngBank::new(12345);
        let mut a = bank.for_trial(0);
        let mut b = bank.for_trial(1);
        let draws_a: Vec<u64> = (0..8).map(|_| a.next_f64().to_bits()).collect();
        let draws_b: Vec<u64> = (0..8).map(|_| b.next_f64().to_bits()).collect();
        assert_ne!(draws_a, draws_b, "Trial streams should diverge");
    }

    #[test]
    fn jitter_stays_in_range_and_zero_disables() {
        let mut rng = RngBank::new(7).for_trial(0);
        for _ in 0..100 {
            let j = rng.jitter(1000.0);
            assert!((0.0..1000.0).contains(&j), "jitter={j} out of range");
        }
        assert_eq!(rng.jitter(0.0), 0.0);
    }
}
