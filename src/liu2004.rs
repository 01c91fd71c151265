use crate::drbg::HmacDrbg;
use crate::error::Result;
use crate::group::GroupParameters;
use crate::hash::{hash_to_element, key_image, Transcript};
use crate::keys::check_signer;
use crate::multiexp::MultiExponentiation;
use crate::prelude::*;
use crate::traits::{KeyImageGen, Link, Sign, Verify};
use digest::generic_array::typenum::U64;
use digest::Digest;
use num_bigint::BigUint;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Linkable Spontaneous Anonymous Group (LSAG) signatures
/// > "Linkable Spontaneous Anonymous Group Signature for Ad Hoc Groups" by Joseph K. Liu,
/// > Victor K. Wei and Duncan S. Wong (ACISP 2004).
///
/// Each ring member's challenge is the hash of the previous member's commitments, wrapping
/// around the ring; only the first challenge is stored. Signing and verifying take `n`
/// sequential hash evaluations.
///
/// Please read tests at the bottom of the source code for this module for examples on how to use
/// it
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Liu2004 {
    /// Challenge of the first ring member
    pub challenge: BigUint,
    /// One response per ring member, all but one of them random
    pub responses: Vec<BigUint>,
    /// Linkability tag `H(L)^x`
    pub key_image: BigUint,
}

impl Liu2004 {
    fn is_well_formed(&self, params: &GroupParameters, ring_len: usize) -> bool {
        ring_len > 0
            && self.responses.len() == ring_len
            && params.is_scalar(&self.challenge)
            && self.responses.iter().all(|s| params.is_scalar(s))
            && params.is_element(&self.key_image)
    }
}

impl KeyImageGen for Liu2004 {
    fn generate_key_image<Hash: Digest<OutputSize = U64> + Clone + Default>(
        params: &GroupParameters,
        k: &BigUint,
        ring: &[BigUint],
    ) -> Result<BigUint> {
        key_image::<Hash>(params, k, ring)
    }
}

impl Sign for Liu2004 {
    /// To sign you need `k` your private key, and `ring` which holds the public keys of
    /// everyone including you at `secret_index`. You are signing the `message`
    fn sign<Hash: Digest<OutputSize = U64> + Clone + Default>(
        params: &GroupParameters,
        rng: &mut HmacDrbg,
        k: &BigUint,
        ring: &[BigUint],
        secret_index: usize,
        message: &[u8],
    ) -> Result<Liu2004> {
        check_signer(params, k, ring, secret_index)?;
        let n = ring.len();

        let encoded_ring = params.encode_ring(ring);
        let h = hash_to_element::<Hash>(params, &encoded_ring)?;
        let key_image = params.pow(&h, k);
        let transcript = Transcript::new(params, encoded_ring, &key_image, message);

        // a failure anywhere below leaves `rng` as it was
        rng.atomically(|rng| {
            let a = params.random_scalar(rng)?;
            let mut rs: Vec<BigUint> = (0..n)
                .map(|_| params.random_scalar(rng))
                .collect::<Result<Vec<BigUint>>>()?;

            let mut cs: Vec<BigUint> = vec![BigUint::ZERO; n];

            cs[(secret_index + 1) % n] =
                transcript.challenge::<Hash>(&params.base_pow(&a), &params.pow(&h, &a))?;

            let mut i = (secret_index + 1) % n;

            while i != secret_index {
                let exponents = [rs[i].clone(), cs[i].clone()];
                let z1 =
                    params.multi_pow(&[params.generator.clone(), ring[i].clone()], &exponents);
                let z2 = params.multi_pow(&[h.clone(), key_image.clone()], &exponents);
                cs[(i + 1) % n] = transcript.challenge::<Hash>(&z1, &z2)?;
                i = (i + 1) % n;
            }

            rs[secret_index] = params.sub_scalars(&a, &params.mul_scalars(&cs[secret_index], k));

            Ok(Liu2004 {
                challenge: cs[0].clone(),
                responses: rs,
                key_image: key_image.clone(),
            })
        })
    }
}

impl Verify for Liu2004 {
    /// To verify a `signature` you need the `ring` and the `message` too
    fn verify<Hash: Digest<OutputSize = U64> + Clone + Default>(
        signature: &Liu2004,
        params: &GroupParameters,
        ring: &[BigUint],
        message: &[u8],
    ) -> bool {
        if !signature.is_well_formed(params, ring.len()) {
            return false;
        }

        let encoded_ring = params.encode_ring(ring);
        let h = match hash_to_element::<Hash>(params, &encoded_ring) {
            Ok(h) => h,
            Err(_) => return false,
        };
        let transcript = Transcript::new(params, encoded_ring, &signature.key_image, message);

        let mut reconstructed_c: BigUint = signature.challenge.clone();
        for (y, s) in ring.iter().zip(&signature.responses) {
            let exponents = [s.clone(), reconstructed_c];
            let z1 = params.multi_pow(&[params.generator.clone(), y.clone()], &exponents);
            let z2 = params.multi_pow(&[h.clone(), signature.key_image.clone()], &exponents);
            reconstructed_c = match transcript.challenge::<Hash>(&z1, &z2) {
                Ok(c) => c,
                Err(_) => return false,
            };
        }

        signature.challenge == reconstructed_c
    }

    /// The ring closure has no multi-exponentiation over the whole ring, so the cache only
    /// supplies the ring it was built from.
    fn verify_with_cache<Hash: Digest<OutputSize = U64> + Clone + Default>(
        signature: &Liu2004,
        params: &GroupParameters,
        cache: &MultiExponentiation,
        message: &[u8],
    ) -> bool {
        Liu2004::verify::<Hash>(signature, params, cache.bases(), message)
    }
}

impl Link for Liu2004 {
    /// This is for linking two signatures and checking if they are signed by the same person
    fn link(signature_1: &Liu2004, signature_2: &Liu2004) -> bool {
        signature_1.key_image == signature_2.key_image
    }
}
