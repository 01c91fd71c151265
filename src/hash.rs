//! Hashing into the scalar field and into the subgroup.
//!
//! Both maps absorb their (length framed) inputs into a 512-bit digest under a distinct domain
//! tag, then use that digest to seed an [`HmacDrbg`] from which the output is sampled:
//!
//! - `hash_to_scalar` samples an integer in `[0, q)`.
//! - `hash_to_element` samples an integer in `[0, p)` and raises it to the cofactor
//!   `(p - 1) / q`, retrying until the result is not the identity. Nobody knows the discrete
//!   logarithm of the result to the base `g`.

use crate::drbg::{HmacDrbg, HIGHEST_SECURITY_STRENGTH, MIN_SECURITY_PARAMETER};
use crate::error::Result;
use crate::group::GroupParameters;
use crate::prelude::*;
use digest::generic_array::typenum::U64;
use digest::Digest;
use num_bigint::BigUint;

const HASH_TO_SCALAR_DST: &[u8] = b"lrs-dsa/hash-to-scalar";
const HASH_TO_ELEMENT_DST: &[u8] = b"lrs-dsa/hash-to-element";

fn seeded_drbg<Hash: Digest<OutputSize = U64>>(
    domain: &[u8],
    parts: &[&[u8]],
) -> Result<HmacDrbg> {
    let mut hash = Hash::new();
    hash.update(domain);
    for part in parts {
        hash.update((part.len() as u64).to_be_bytes());
        hash.update(part);
    }
    HmacDrbg::new(&hash.finalize(), HIGHEST_SECURITY_STRENGTH, Some(domain))
}

/// Maps `parts` to a scalar in `[0, q)`.
pub fn hash_to_scalar<Hash: Digest<OutputSize = U64>>(
    params: &GroupParameters,
    parts: &[&[u8]],
) -> Result<BigUint> {
    seeded_drbg::<Hash>(HASH_TO_SCALAR_DST, parts)?
        .generate_integer(&params.subgroup_order, MIN_SECURITY_PARAMETER)
}

/// Maps `data` to a non-identity element of the order-`q` subgroup.
pub fn hash_to_element<Hash: Digest<OutputSize = U64>>(
    params: &GroupParameters,
    data: &[u8],
) -> Result<BigUint> {
    let mut drbg = seeded_drbg::<Hash>(HASH_TO_ELEMENT_DST, &[data])?;
    let cofactor = params.cofactor();
    let one = BigUint::from(1u32);
    loop {
        let candidate = drbg.generate_integer(&params.prime, MIN_SECURITY_PARAMETER)?;
        let element = candidate.modpow(&cofactor, &params.prime);
        if element > one {
            return Ok(element);
        }
    }
}

/// Linkability tag `H(L)^k` of private key `k` for `ring`.
///
/// It depends only on the key and the ring, never on the message.
pub fn key_image<Hash: Digest<OutputSize = U64>>(
    params: &GroupParameters,
    k: &BigUint,
    ring: &[BigUint],
) -> Result<BigUint> {
    let h = hash_to_element::<Hash>(params, &params.encode_ring(ring))?;
    Ok(params.pow(&h, k))
}

/// Fiat-Shamir transcript shared by every challenge of one signature.
///
/// Binds the ring, the linkability tag and the message; each challenge then appends the two
/// commitments of one round.
pub(crate) struct Transcript<'a> {
    params: &'a GroupParameters,
    ring: Vec<u8>,
    key_image: Vec<u8>,
    message: &'a [u8],
}

impl<'a> Transcript<'a> {
    pub(crate) fn new(
        params: &'a GroupParameters,
        encoded_ring: Vec<u8>,
        key_image: &BigUint,
        message: &'a [u8],
    ) -> Transcript<'a> {
        Transcript {
            params,
            ring: encoded_ring,
            key_image: params.encode_element(key_image),
            message,
        }
    }

    pub(crate) fn challenge<Hash: Digest<OutputSize = U64>>(
        &self,
        first: &BigUint,
        second: &BigUint,
    ) -> Result<BigUint> {
        hash_to_scalar::<Hash>(
            self.params,
            &[
                self.ring.as_slice(),
                self.key_image.as_slice(),
                self.message,
                self.params.encode_element(first).as_slice(),
                self.params.encode_element(second).as_slice(),
            ],
        )
    }
}
