//! Arithmetic in a prime-order subgroup of `(Z/pZ)*`.

use crate::drbg::{HmacDrbg, MIN_SECURITY_PARAMETER};
use crate::error::{Error, Result};
use crate::multiexp::{multi_pow, MultiExponentiation};
use crate::prelude::*;
use num_bigint::{BigInt, BigUint, Sign};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A cyclic subgroup of prime order `subgroup_order` in `(Z/prime Z)*`, generated by
/// `generator`.
///
/// Exponents (scalars) live in `[0, subgroup_order)` and group elements in `[0, prime)`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupParameters {
    pub prime: BigUint,
    pub generator: BigUint,
    pub subgroup_order: BigUint,
}

impl GroupParameters {
    /// Checks that `generator` has order `subgroup_order` modulo `prime` and bundles the
    /// three values.
    ///
    /// Primality of `prime` and `subgroup_order` is not tested; parameters are expected to
    /// come from a published set.
    pub fn new(
        prime: BigUint,
        generator: BigUint,
        subgroup_order: BigUint,
    ) -> Result<GroupParameters> {
        let one = BigUint::from(1u32);
        if prime <= one || subgroup_order <= one {
            return Err(Error::InvalidParameters(
                "prime and subgroup order must be greater than one".to_string(),
            ));
        }
        if generator <= one || generator >= prime {
            return Err(Error::InvalidParameters(
                "generator must lie in (1, p)".to_string(),
            ));
        }
        if (&prime - &one) % &subgroup_order != BigUint::ZERO {
            return Err(Error::InvalidParameters(
                "subgroup order must divide p - 1".to_string(),
            ));
        }
        if generator.modpow(&subgroup_order, &prime) != one {
            return Err(Error::InvalidParameters(
                "generator does not have the given order".to_string(),
            ));
        }

        Ok(GroupParameters {
            prime,
            generator,
            subgroup_order,
        })
    }

    /// Number of bytes in the fixed-width encoding of a group element.
    pub fn element_len(&self) -> usize {
        ((self.prime.bits() + 7) / 8) as usize
    }

    /// Big-endian encoding of `element`, left padded to [`Self::element_len`] bytes.
    pub fn encode_element(&self, element: &BigUint) -> Vec<u8> {
        let bytes = element.to_bytes_be();
        let width = self.element_len().max(bytes.len());
        let mut out = vec![0u8; width - bytes.len()];
        out.extend_from_slice(&bytes);
        out
    }

    /// Canonical encoding of a ring: each public key encoded in order.
    pub fn encode_ring(&self, ring: &[BigUint]) -> Vec<u8> {
        let mut out = Vec::with_capacity(ring.len() * self.element_len());
        for public_key in ring {
            out.extend(self.encode_element(public_key));
        }
        out
    }

    /// `(p - 1) / q`, which maps any unit of `Z/pZ` into the subgroup.
    pub fn cofactor(&self) -> BigUint {
        (&self.prime - 1u32) / &self.subgroup_order
    }

    /// `a * b mod p`
    pub fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.prime
    }

    /// `base^exponent mod p`, with the exponent first reduced mod `q`.
    pub fn pow(&self, base: &BigUint, exponent: &BigUint) -> BigUint {
        base.modpow(&(exponent % &self.subgroup_order), &self.prime)
    }

    /// `g^exponent mod p`
    pub fn base_pow(&self, exponent: &BigUint) -> BigUint {
        self.pow(&self.generator, exponent)
    }

    /// `Π bases[i]^exponents[i] mod p`, with every exponent reduced mod `q`.
    pub fn multi_pow(&self, bases: &[BigUint], exponents: &[BigUint]) -> BigUint {
        let exponents: Vec<BigUint> = self.reduce_scalars(exponents);
        multi_pow(&self.prime, bases, &exponents)
    }

    /// Builds a reusable multi-exponentiation cache for `bases` (usually a ring).
    pub fn precompute(&self, bases: &[BigUint]) -> MultiExponentiation {
        MultiExponentiation::new(self.prime.clone(), bases.to_vec())
    }

    /// Evaluates a cache built by [`Self::precompute`] with exponents reduced mod `q`.
    pub fn cached_pow(&self, cache: &MultiExponentiation, exponents: &[BigUint]) -> BigUint {
        cache.pow(&self.reduce_scalars(exponents))
    }

    /// `(a + b) mod q`
    pub fn add_scalars(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a + b) % &self.subgroup_order
    }

    /// `(a - b) mod q`
    pub fn sub_scalars(&self, a: &BigUint, b: &BigUint) -> BigUint {
        modulo(
            &(BigInt::from(a.clone()) - BigInt::from(b.clone())),
            &self.subgroup_order,
        )
    }

    /// `(a * b) mod q`
    pub fn mul_scalars(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.subgroup_order
    }

    /// Draws a scalar uniformly (up to `2^-64` bias) from `[0, q)`.
    pub fn random_scalar(&self, rng: &mut HmacDrbg) -> Result<BigUint> {
        rng.generate_integer(&self.subgroup_order, MIN_SECURITY_PARAMETER)
    }

    /// Whether `s` is a reduced scalar.
    pub fn is_scalar(&self, s: &BigUint) -> bool {
        *s < self.subgroup_order
    }

    /// Whether `e` is a non-identity member of the order-`q` subgroup.
    pub fn is_element(&self, e: &BigUint) -> bool {
        let one = BigUint::from(1u32);
        *e > one && *e < self.prime && e.modpow(&self.subgroup_order, &self.prime) == one
    }

    fn reduce_scalars(&self, scalars: &[BigUint]) -> Vec<BigUint> {
        scalars.iter().map(|s| s % &self.subgroup_order).collect()
    }
}

/// `x mod m` as a value in `[0, m)`, also for negative `x`.
pub fn modulo(x: &BigInt, m: &BigUint) -> BigUint {
    let m = BigInt::from(m.clone());
    let r = x % &m;
    let r = if r.sign() == Sign::Minus { r + m } else { r };
    r.into_parts().1
}

#[cfg(test)]
mod test {
    use super::*;

    fn toy_group() -> GroupParameters {
        GroupParameters::new(
            BigUint::from(23u32),
            BigUint::from(4u32),
            BigUint::from(11u32),
        )
        .unwrap()
    }

    #[test]
    fn modulo_is_non_negative() {
        let m = BigUint::from(11u32);
        assert_eq!(modulo(&BigInt::from(-1), &m), BigUint::from(10u32));
        assert_eq!(modulo(&BigInt::from(-22), &m), BigUint::ZERO);
        assert_eq!(modulo(&BigInt::from(-23), &m), BigUint::from(10u32));
        assert_eq!(modulo(&BigInt::from(25), &m), BigUint::from(3u32));
    }

    #[test]
    fn scalar_arithmetic_wraps() {
        let group = toy_group();
        let three = BigUint::from(3u32);
        let seven = BigUint::from(7u32);
        assert_eq!(group.sub_scalars(&three, &seven), BigUint::from(7u32));
        assert_eq!(group.add_scalars(&seven, &seven), three);
        assert_eq!(group.mul_scalars(&three, &seven), BigUint::from(10u32));
    }

    #[test]
    fn exponents_are_reduced_mod_q() {
        let group = toy_group();
        let x = BigUint::from(6u32);
        assert_eq!(group.base_pow(&x), BigUint::from(2u32));
        assert_eq!(group.base_pow(&(&x + 11u32)), BigUint::from(2u32));

        let bases = vec![group.generator.clone(), BigUint::from(9u32)];
        let exponents = vec![BigUint::from(6u32 + 22), BigUint::from(7u32 + 11)];
        assert_eq!(group.multi_pow(&bases, &exponents), BigUint::from(8u32));

        let cache = group.precompute(&bases);
        assert_eq!(group.cached_pow(&cache, &exponents), BigUint::from(8u32));
    }

    #[test]
    fn encoding_is_fixed_width() {
        let group = toy_group();
        assert_eq!(group.element_len(), 1);
        assert_eq!(group.encode_element(&BigUint::from(4u32)), vec![4u8]);
        assert_eq!(
            group.encode_ring(&[BigUint::from(2u32), BigUint::from(13u32)]),
            vec![2u8, 13]
        );
    }

    #[test]
    fn rejects_bad_parameters() {
        let p = BigUint::from(23u32);
        let q = BigUint::from(11u32);
        assert!(GroupParameters::new(p.clone(), BigUint::from(5u32), q.clone()).is_err());
        assert!(GroupParameters::new(p.clone(), BigUint::from(1u32), q.clone()).is_err());
        assert!(GroupParameters::new(p.clone(), BigUint::from(23u32), q).is_err());
        assert!(GroupParameters::new(p, BigUint::from(4u32), BigUint::from(7u32)).is_err());
    }

    #[test]
    fn subgroup_membership() {
        let group = toy_group();
        assert!(group.is_element(&BigUint::from(2u32)));
        // 5 generates the whole group of order 22
        assert!(!group.is_element(&BigUint::from(5u32)));
        assert!(!group.is_element(&BigUint::from(1u32)));
        assert!(!group.is_element(&BigUint::from(25u32)));
        assert_eq!(group.cofactor(), BigUint::from(2u32));
    }
}
