//! Random source construction and sampling helpers.
//!
//! Every generator takes the random source as an explicit `&mut R` parameter; nothing in
//! this crate holds a global or thread-local generator. Reproducible output comes from
//! seeding with [`make_rng`].

use crate::error::{IntakeError, IntakeResult};
use blake2::{Blake2b512, Digest};
use intake_types::Probability;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Make a random number generator from a global seed and a string id.
///
/// The global seed controls all randomness in a run. The id makes each generator
/// different from the others (for example one per generated document), so that
/// documents stay reproducible individually even if the number of documents changes.
///
/// The id is concatenated with the global seed and the result is hashed with BLAKE2b.
/// The first 32 bytes of the hash seed the generator.
pub fn make_rng(global_seed: u64, id: &str) -> ChaCha8Rng {
    let message = format!("{id}{global_seed}");
    let mut hasher = Blake2b512::new();
    hasher.update(message);
    let digest = hasher.finalize();
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&digest[..32]);
    ChaCha8Rng::from_seed(seed)
}

/// Make an unseeded generator for runs that do not need to be reproducible.
pub fn entropy_rng() -> ChaCha8Rng {
    ChaCha8Rng::from_entropy()
}

/// An inclusive count range, e.g. "draw 1-3 entries".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CountRange {
    pub min: usize,
    pub max: usize,
}

impl CountRange {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Samples a count uniformly from `[min, max]`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        rng.gen_range(self.min..=self.max.max(self.min))
    }
}

/// An inclusive day-offset range relative to the generation instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OffsetRange {
    pub min: i64,
    pub max: i64,
}

impl OffsetRange {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        rng.gen_range(self.min..=self.max.max(self.min))
    }
}

/// Draws `count` distinct entries from `pool` without replacement.
///
/// The result is in random order, like a shuffled prefix of the pool.
///
/// # Errors
///
/// Returns `IntakeError::SamplingExhaustion` if `count` exceeds the pool size. This never
/// truncates silently: a pool smaller than its configured draw is a catalog mistake.
pub fn sample_distinct<T: Clone, R: Rng + ?Sized>(
    rng: &mut R,
    pool: &[T],
    count: usize,
    pool_name: &str,
) -> IntakeResult<Vec<T>> {
    if count > pool.len() {
        return Err(IntakeError::SamplingExhaustion {
            pool: pool_name.to_owned(),
            requested: count,
            available: pool.len(),
        });
    }

    Ok(rand::seq::index::sample(rng, pool.len(), count)
        .into_iter()
        .map(|i| pool[i].clone())
        .collect())
}

/// Picks one entry from `pool`.
///
/// # Errors
///
/// Returns `IntakeError::SamplingExhaustion` if the pool is empty.
pub fn pick<'a, T, R: Rng + ?Sized>(
    rng: &mut R,
    pool: &'a [T],
    pool_name: &str,
) -> IntakeResult<&'a T> {
    pool.choose(rng).ok_or_else(|| IntakeError::SamplingExhaustion {
        pool: pool_name.to_owned(),
        requested: 1,
        available: 0,
    })
}

/// Picks one phrase from a fixed, non-empty list of string literals.
pub fn pick_str<R: Rng + ?Sized>(rng: &mut R, phrases: &[&str]) -> String {
    phrases.choose(rng).copied().unwrap_or_default().to_owned()
}

/// Returns `true` with the given probability.
pub fn draw<R: Rng + ?Sized>(rng: &mut R, probability: Probability) -> bool {
    rng.gen_bool(probability.value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_make_rng_is_deterministic_per_id() {
        let a: Vec<u32> = (0..4).map(|_| make_rng(7, "doc-1").gen()).collect();
        let b: Vec<u32> = (0..4).map(|_| make_rng(7, "doc-1").gen()).collect();
        assert_eq!(a, b);

        let mut first = make_rng(7, "doc-1");
        let mut other_id = make_rng(7, "doc-2");
        let mut other_seed = make_rng(8, "doc-1");
        let x: u64 = first.gen();
        assert_ne!(x, other_id.gen::<u64>());
        assert_ne!(x, other_seed.gen::<u64>());
    }

    #[test]
    fn test_sample_distinct_has_no_duplicates() {
        let pool: Vec<u32> = (0..8).collect();
        for seed in 0..50 {
            let mut rng = make_rng(seed, "sample");
            let picked = sample_distinct(&mut rng, &pool, 4, "numbers").unwrap();
            let unique: HashSet<_> = picked.iter().collect();
            assert_eq!(picked.len(), 4);
            assert_eq!(unique.len(), 4);
        }
    }

    #[test]
    fn test_sample_distinct_whole_pool_and_empty() {
        let pool = ["a", "b", "c"];
        let mut rng = make_rng(1, "sample");
        let mut all = sample_distinct(&mut rng, &pool, 3, "letters").unwrap();
        all.sort();
        assert_eq!(all, vec!["a", "b", "c"]);
        assert!(sample_distinct(&mut rng, &pool, 0, "letters")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_sample_distinct_exhaustion_fails_loudly() {
        let pool = ["Penicillin", "Latex"];
        let mut rng = make_rng(1, "sample");
        let err = sample_distinct(&mut rng, &pool, 3, "allergies").unwrap_err();
        match err {
            IntakeError::SamplingExhaustion {
                pool,
                requested,
                available,
            } => {
                assert_eq!(pool, "allergies");
                assert_eq!(requested, 3);
                assert_eq!(available, 2);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_pick_empty_pool_errors() {
        let mut rng = make_rng(1, "pick");
        let empty: [u8; 0] = [];
        assert!(matches!(
            pick(&mut rng, &empty, "empty"),
            Err(IntakeError::SamplingExhaustion { .. })
        ));
    }

    #[test]
    fn test_count_range_bounds() {
        let range = CountRange::new(2, 4);
        let mut rng = make_rng(3, "count");
        for _ in 0..200 {
            let n = range.sample(&mut rng);
            assert!((2..=4).contains(&n));
        }
    }

    #[test]
    fn test_draw_extremes() {
        let mut rng = make_rng(3, "draw");
        for _ in 0..100 {
            assert!(draw(&mut rng, Probability::ALWAYS));
            assert!(!draw(&mut rng, Probability::NEVER));
        }
    }
}
