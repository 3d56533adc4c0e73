//! Pluggable signal providers.
//!
//! Strategy-profile metrics are numeric scores with no real upstream data
//! source yet. All of them are produced through the [`SignalProvider`] seam
//! so production output is reproducible and tests can pin exact values.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Context a provider may fold into its score. Two calls with the same key
/// and context must return the same value for deterministic providers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalContext {
    /// Entity the signal is about, e.g. a campaign or product id.
    pub subject: String,
    /// Optimization round, 0 before the first optimize.
    pub round: u32,
}

impl SignalContext {
    pub fn for_subject(subject: impl Into<String>) -> Self {
        Self { subject: subject.into(), round: 0 }
    }

    pub fn at_round(mut self, round: u32) -> Self {
        self.round = round;
        self
    }
}

/// Source of a numeric score in `[0.0, 1.0]`.
pub trait SignalProvider: Send + Sync {
    fn score(&self, key: &str, context: &SignalContext) -> f64;
}

fn material_hash(key: &str, context: &SignalContext) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hasher.update([0x1f]);
    hasher.update(context.subject.as_bytes());
    hasher.update([0x1f]);
    hasher.update(context.round.to_be_bytes());
    let digest = hasher.finalize();
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix)
}

/// Production default: hashes key and context into a uniform value, so the
/// same inputs always score the same.
#[derive(Clone, Debug, Default)]
pub struct DeterministicSignalProvider;

impl SignalProvider for DeterministicSignalProvider {
    fn score(&self, key: &str, context: &SignalContext) -> f64 {
        material_hash(key, context) as f64 / u64::MAX as f64
    }
}

/// Seeded PRNG provider. The per-call generator is derived from the seed and
/// the call material, so scores do not depend on call order.
#[derive(Clone, Debug)]
pub struct SeededSignalProvider {
    seed: u64,
}

impl SeededSignalProvider {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl SignalProvider for SeededSignalProvider {
    fn score(&self, key: &str, context: &SignalContext) -> f64 {
        let mut rng = StdRng::seed_from_u64(self.seed ^ material_hash(key, context));
        rng.gen_range(0.0..=1.0)
    }
}

/// Fixed-table provider for tests: exact score per key, with a fallback.
#[derive(Clone, Debug, Default)]
pub struct FixedSignalProvider {
    scores: HashMap<String, f64>,
    fallback: f64,
}

impl FixedSignalProvider {
    pub fn new(fallback: f64) -> Self {
        Self { scores: HashMap::new(), fallback }
    }

    pub fn with_score(mut self, key: impl Into<String>, score: f64) -> Self {
        self.scores.insert(key.into(), score);
        self
    }
}

impl SignalProvider for FixedSignalProvider {
    fn score(&self, key: &str, _context: &SignalContext) -> f64 {
        self.scores.get(key).copied().unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DeterministicSignalProvider, FixedSignalProvider, SeededSignalProvider, SignalContext,
        SignalProvider,
    };

    #[test]
    fn deterministic_provider_repeats_for_same_inputs() {
        let provider = DeterministicSignalProvider;
        let context = SignalContext::for_subject("c-1");
        let first = provider.score("quantum.efficiency", &context);
        let second = provider.score("quantum.efficiency", &context);
        assert_eq!(first, second);
        assert!((0.0..=1.0).contains(&first));
    }

    #[test]
    fn deterministic_provider_varies_with_round() {
        let provider = DeterministicSignalProvider;
        let round_zero = provider
            .score("quantum.efficiency", &SignalContext::for_subject("c-1"));
        let round_one = provider
            .score("quantum.efficiency", &SignalContext::for_subject("c-1").at_round(1));
        assert_ne!(round_zero, round_one);
    }

    #[test]
    fn seeded_provider_reproduces_sequences_for_equal_seeds() {
        let a = SeededSignalProvider::new(42);
        let b = SeededSignalProvider::new(42);
        let context = SignalContext::for_subject("c-9").at_round(3);
        assert_eq!(a.score("emotional.resonance", &context), b.score("emotional.resonance", &context));

        let other_seed = SeededSignalProvider::new(43);
        assert_ne!(
            a.score("emotional.resonance", &context),
            other_seed.score("emotional.resonance", &context)
        );
    }

    #[test]
    fn fixed_provider_returns_table_values_then_fallback() {
        let provider = FixedSignalProvider::new(0.25).with_score("behavioral.engagement_rate", 0.8);
        let context = SignalContext::default();
        assert_eq!(provider.score("behavioral.engagement_rate", &context), 0.8);
        assert_eq!(provider.score("unknown", &context), 0.25);
    }
}
