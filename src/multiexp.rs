//! Simultaneous multi-exponentiation with reusable precomputation.
//!
//! Computing `b_1^e_1 * ... * b_k^e_k mod m` with `k` independent exponentiations costs `k`
//! full square-and-multiply passes. Here the bases are split into windows of `w` bases and
//! every subset product of a window is tabulated once. Evaluating an exponent vector is then a
//! single pass over the exponent bits with one table lookup per window and bit.
//!
//! The tables depend only on the bases, so a [`MultiExponentiation`] built for a ring of
//! public keys can be kept and shared read-only between any number of verifications against
//! that ring.

use crate::prelude::*;
use num_bigint::BigUint;

/// Window width used by [`MultiExponentiation::new`].
pub const DEFAULT_WINDOW: usize = 4;

/// Window width used by the single-shot [`multi_pow`].
pub const SINGLE_SHOT_WINDOW: usize = 2;

const MAX_WINDOW: usize = 16;

/// Precomputed subset products for a fixed vector of bases.
///
/// The cache is bound to the exact bases (and their order) it was built from. Evaluating it
/// against exponents meant for another base vector silently gives a wrong result.
#[derive(Clone, Debug)]
pub struct MultiExponentiation {
    modulus: BigUint,
    bases: Vec<BigUint>,
    window: usize,
    tables: Vec<Vec<BigUint>>,
}

impl MultiExponentiation {
    /// Builds the cache for `bases` modulo `modulus` using [`DEFAULT_WINDOW`].
    pub fn new(modulus: BigUint, bases: Vec<BigUint>) -> MultiExponentiation {
        MultiExponentiation::with_window(modulus, bases, DEFAULT_WINDOW)
    }

    /// Builds the cache with windows of `window` bases (clamped to `1..=16`).
    ///
    /// Memory grows as `2^window` products per window.
    pub fn with_window(
        modulus: BigUint,
        bases: Vec<BigUint>,
        window: usize,
    ) -> MultiExponentiation {
        let window = window.clamp(1, MAX_WINDOW);
        let one = BigUint::from(1u32) % &modulus;

        let tables: Vec<Vec<BigUint>> = bases
            .chunks(window)
            .map(|chunk| {
                let mut table = Vec::with_capacity(1 << chunk.len());
                table.push(one.clone());
                for mask in 1usize..(1 << chunk.len()) {
                    let lowest = mask.trailing_zeros() as usize;
                    let product = (&table[mask & (mask - 1)] * &chunk[lowest]) % &modulus;
                    table.push(product);
                }
                table
            })
            .collect();

        tracing::debug!(
            bases = bases.len(),
            window,
            tables = tables.len(),
            "built multi-exponentiation cache"
        );

        MultiExponentiation {
            modulus,
            bases,
            window,
            tables,
        }
    }

    /// The bases this cache was built from, in order.
    pub fn bases(&self) -> &[BigUint] {
        &self.bases
    }

    /// The modulus products are reduced by.
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// Computes `Π bases[i]^exponents[i] mod modulus`.
    ///
    /// Exponents are used as given. Missing trailing exponents count as zero and surplus
    /// exponents are ignored.
    pub fn pow(&self, exponents: &[BigUint]) -> BigUint {
        let exponents = &exponents[..exponents.len().min(self.bases.len())];
        let bits = exponents.iter().map(|e| e.bits()).max().unwrap_or(0);

        let mut acc = BigUint::from(1u32) % &self.modulus;
        for bit in (0..bits).rev() {
            acc = (&acc * &acc) % &self.modulus;
            for (table, window) in self.tables.iter().zip(exponents.chunks(self.window)) {
                let mask = window
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.bit(bit))
                    .fold(0usize, |mask, (t, _)| mask | (1 << t));
                if mask != 0 {
                    acc = (&acc * &table[mask]) % &self.modulus;
                }
            }
        }
        acc
    }
}

/// Computes `Π bases[i]^exponents[i] mod modulus` without keeping any precomputation.
pub fn multi_pow(modulus: &BigUint, bases: &[BigUint], exponents: &[BigUint]) -> BigUint {
    MultiExponentiation::with_window(modulus.clone(), bases.to_vec(), SINGLE_SHOT_WINDOW)
        .pow(exponents)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::drbg::HmacDrbg;

    fn naive(modulus: &BigUint, bases: &[BigUint], exponents: &[BigUint]) -> BigUint {
        bases
            .iter()
            .zip(exponents)
            .fold(BigUint::from(1u32) % modulus, |acc, (b, e)| {
                (acc * b.modpow(e, modulus)) % modulus
            })
    }

    #[test]
    fn small_example() {
        let modulus = BigUint::from(23u32);
        let bases: Vec<BigUint> = [4u32, 9, 2].iter().map(|&b| BigUint::from(b)).collect();
        let exponents: Vec<BigUint> = [6u32, 7, 0].iter().map(|&e| BigUint::from(e)).collect();
        let cache = MultiExponentiation::new(modulus.clone(), bases.clone());
        // 4^6 * 9^7 = 2 * 4 mod 23
        assert_eq!(cache.pow(&exponents), BigUint::from(8u32));
        assert_eq!(cache.pow(&exponents), naive(&modulus, &bases, &exponents));
    }

    #[test]
    fn all_zero_exponents_give_one() {
        let modulus = BigUint::from(1_000_003u32);
        let bases = vec![BigUint::from(5u32), BigUint::from(7u32)];
        let cache = MultiExponentiation::new(modulus, bases);
        assert_eq!(cache.pow(&[BigUint::ZERO, BigUint::ZERO]), BigUint::from(1u32));
        assert_eq!(cache.pow(&[]), BigUint::from(1u32));
    }

    #[test]
    fn matches_independent_exponentiations() {
        let k = 111;
        let modulus = BigUint::from(5_555_555_566_666_777_777u64);
        let mut drbg = HmacDrbg::new(&[17u8; 64], 256, None).unwrap();
        let bases: Vec<BigUint> = (0..k)
            .map(|i| drbg.generate_integer(&(BigUint::from(1u32) << (200 + i)), 64).unwrap())
            .collect();
        let cache = MultiExponentiation::new(modulus.clone(), bases.clone());

        for trial in 0..1000 {
            let exponents: Vec<BigUint> = (0..k)
                .map(|j| {
                    let bound = BigUint::from(1u32) << (100 + (trial + j) % 100);
                    drbg.generate_integer(&bound, 64).unwrap()
                })
                .collect();
            let expected = naive(&modulus, &bases, &exponents);
            assert_eq!(cache.pow(&exponents), expected);
            if trial % 250 == 0 {
                assert_eq!(multi_pow(&modulus, &bases, &exponents), expected);
            }
            drbg.reseed(&[trial as u8; 48], None).unwrap();
        }
    }

    #[test]
    fn window_width_does_not_change_result() {
        let modulus = BigUint::from(4_294_967_291u64);
        let mut drbg = HmacDrbg::new(&[99u8; 48], 256, None).unwrap();
        let bases: Vec<BigUint> = (0..13)
            .map(|_| drbg.generate_integer(&modulus, 64).unwrap())
            .collect();
        let exponents: Vec<BigUint> = (0..13)
            .map(|_| drbg.generate_integer(&modulus, 64).unwrap())
            .collect();
        let expected = naive(&modulus, &bases, &exponents);
        for window in [0usize, 1, 3, 5, 8, 13, 40] {
            let cache = MultiExponentiation::with_window(modulus.clone(), bases.clone(), window);
            assert_eq!(cache.pow(&exponents), expected);
        }
    }

    #[test]
    fn bases_are_kept_in_order() {
        let bases = vec![BigUint::from(3u32), BigUint::from(11u32), BigUint::from(2u32)];
        let cache = MultiExponentiation::new(BigUint::from(101u32), bases.clone());
        assert_eq!(cache.bases(), &bases[..]);
        assert_eq!(cache.modulus(), &BigUint::from(101u32));
    }
}
