//! Deterministic linear congruential sequence generator
//!
//! Every random draw in the pipeline comes from an [`Lcg`]. The update rule
//! uses only wrapping `u32` arithmetic and a single division, so a given seed
//! yields the same sequence on every platform.
//!
//! # Algorithm
//!
//! ```text
//! state' = (state * 1664525 + 1013904223) mod 2^32
//! value  = state' / (2^32 - 1)
//! ```

use rand::{RngCore, SeedableRng};

/// LCG multiplier (Numerical Recipes)
const MULTIPLIER: u32 = 1_664_525;
/// LCG increment (Numerical Recipes)
const INCREMENT: u32 = 1_013_904_223;
/// Divisor mapping the state register to the unit interval
const DIVISOR: f64 = u32::MAX as f64;

/// Source of uniform values in the unit interval
///
/// Stages that consume randomness take the generator by `&mut` through this
/// trait, so the caller owns (and can replace) the entropy source.
pub trait SequenceGenerator {
    /// Advance the generator and return the next value in `[0, 1]`
    fn next(&mut self) -> f64;

    /// Draw an index in `0..len`
    ///
    /// Uses `floor(next() * len)`, clamped to `len - 1` for the single state
    /// that maps to exactly 1.0. `len` must be non-zero.
    fn next_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "next_index: len must be non-zero");
        let index = (self.next() * len as f64).floor() as usize;
        index.min(len - 1)
    }

    /// Draw a value in `[low, high]`
    fn range(&mut self, low: f64, high: f64) -> f64 {
        low + self.next() * (high - low)
    }
}

/// Linear congruential generator with a single `u32` state register
///
/// Each generation run must own its own instance: the state is mutated on
/// every draw and two runs sharing one generator would interleave draws.
///
/// # Example
///
/// ```rust
/// use dual_mesh_mapgen::generation::{Lcg, SequenceGenerator};
///
/// let mut a = Lcg::new(42);
/// let mut b = Lcg::new(42);
/// for _ in 0..10 {
///     assert_eq!(a.next().to_bits(), b.next().to_bits());
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    /// Create a generator from a `u32` seed
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Create a generator from any integer seed, normalized to `u32` (mod 2^32)
    pub fn from_signed(seed: i64) -> Self {
        Self::new(seed as u32)
    }

    /// Current value of the state register
    #[inline]
    pub fn state(&self) -> u32 {
        self.state
    }

    #[inline]
    fn step(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);
        self.state
    }

    /// Shuffle a slice in place (Fisher–Yates from the back)
    ///
    /// Element `i` is swapped with `floor(next() * (i + 1))`, so the same seed
    /// always yields the same permutation.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_index(i + 1);
            items.swap(i, j);
        }
    }
}

impl SequenceGenerator for Lcg {
    #[inline]
    fn next(&mut self) -> f64 {
        self.step() as f64 / DIVISOR
    }
}

// The raw register doubles as a `rand` core, so the generator can also drive
// `rand` distributions and slice helpers.
impl RngCore for Lcg {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        let high = self.step() as u64;
        let low = self.step() as u64;
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Lcg {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::new(state as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_rule() {
        let mut rng = Lcg::new(0);
        let value = rng.next();
        assert_eq!(rng.state(), 1_013_904_223);
        assert_eq!(value, 1_013_904_223.0 / 4_294_967_295.0);

        let mut rng = Lcg::new(1);
        rng.next();
        assert_eq!(rng.state(), 1_015_568_748);
    }

    #[test]
    fn test_wrapping_arithmetic() {
        let mut rng = Lcg::new(u32::MAX);
        rng.next();
        let expected = (u32::MAX as u64 * 1_664_525 + 1_013_904_223) % (1u64 << 32);
        assert_eq!(rng.state() as u64, expected);
    }

    #[test]
    fn test_values_in_unit_interval() {
        let mut rng = Lcg::new(123);
        for _ in 0..10_000 {
            let v = rng.next();
            assert!((0.0..=1.0).contains(&v), "value {} out of range", v);
        }
    }

    #[test]
    fn test_determinism() {
        let a: Vec<u64> = {
            let mut rng = Lcg::new(42);
            (0..100).map(|_| rng.next().to_bits()).collect()
        };
        let b: Vec<u64> = {
            let mut rng = Lcg::new(42);
            (0..100).map(|_| rng.next().to_bits()).collect()
        };
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let mut a = Lcg::new(1);
        let mut b = Lcg::new(2);
        assert_ne!(a.next(), b.next());
    }

    #[test]
    fn test_signed_seed_normalization() {
        assert_eq!(Lcg::from_signed(-1).state(), u32::MAX);
        assert_eq!(Lcg::from_signed(1 << 32).state(), 0);
        assert_eq!(Lcg::from_signed(42).state(), 42);
    }

    #[test]
    fn test_next_index_bounds() {
        let mut rng = Lcg::new(5);
        for len in 1..50 {
            let index = rng.next_index(len);
            assert!(index < len);
        }

        // The one state that maps to exactly 1.0 must still give a valid index
        let mut rng = Lcg::new(0);
        rng.state = u32::MAX.wrapping_sub(INCREMENT).wrapping_mul(inverse_multiplier());
        assert_eq!(rng.clone().next(), 1.0);
        assert_eq!(rng.next_index(8), 7);
    }

    /// Multiplicative inverse of MULTIPLIER mod 2^32 (Newton iteration)
    fn inverse_multiplier() -> u32 {
        let mut inv: u32 = MULTIPLIER;
        for _ in 0..5 {
            inv = inv.wrapping_mul(2u32.wrapping_sub(MULTIPLIER.wrapping_mul(inv)));
        }
        assert_eq!(MULTIPLIER.wrapping_mul(inv), 1);
        inv
    }

    #[test]
    fn test_shuffle_is_permutation_and_deterministic() {
        let mut a: Vec<u32> = (0..20).collect();
        let mut b = a.clone();
        Lcg::new(99).shuffle(&mut a);
        Lcg::new(99).shuffle(&mut b);
        assert_eq!(a, b);

        let mut sorted = a.clone();
        sorted.sort();
        assert_eq!(sorted, (0..20).collect::<Vec<u32>>());
    }

    #[test]
    fn test_rand_core_integration() {
        use rand::seq::SliceRandom;
        use rand::Rng;

        let mut rng = Lcg::seed_from_u64(7);
        let value: f64 = rng.gen_range(10.0..20.0);
        assert!((10.0..20.0).contains(&value));

        let items = [1, 2, 3, 4];
        assert!(items.choose(&mut rng).is_some());

        let mut bytes = [0u8; 7];
        rng.fill_bytes(&mut bytes);

        let from_bytes = Lcg::from_seed(42u32.to_le_bytes());
        assert_eq!(from_bytes, Lcg::new(42));
    }
}
