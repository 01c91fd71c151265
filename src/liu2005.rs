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

/// Linkable ring signature with a single challenge split across the ring
/// > Realization 2 of "Linkable Ring Signatures: Security Models and New Schemes" by Joseph K.
/// > Liu and Duncan S. Wong (ICCSA 2005).
///
/// The ring members' challenges sum to one hash, so signing and verifying each cost one
/// multi-exponentiation over the ring instead of a sequential pass around it. Verification
/// against a fixed ring can reuse a [`MultiExponentiation`] cache.
///
/// Please read tests at the bottom of the source code for this module for examples on how to use
/// it
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Liu2005 {
    /// Linkability tag `H(L)^x`. Equal tags mean the same signer.
    pub key_image: BigUint,
    /// The single response scalar.
    pub response: BigUint,
    /// One challenge per ring member, summing to the transcript hash.
    pub challenges: Vec<BigUint>,
}

impl Liu2005 {
    fn is_well_formed(&self, params: &GroupParameters, ring_len: usize) -> bool {
        ring_len > 0
            && self.challenges.len() == ring_len
            && self.challenges.iter().all(|c| params.is_scalar(c))
            && params.is_scalar(&self.response)
            && params.is_element(&self.key_image)
    }

    /// Finishes verification once `a = Π y_i^{c_i} · g^s` is known.
    fn check_commitment<Hash: Digest<OutputSize = U64> + Clone + Default>(
        &self,
        params: &GroupParameters,
        ring: &[BigUint],
        a: &BigUint,
        message: &[u8],
    ) -> bool {
        let b = self
            .challenges
            .iter()
            .fold(BigUint::ZERO, |b, c| params.add_scalars(&b, c));

        let encoded_ring = params.encode_ring(ring);
        let h = match hash_to_element::<Hash>(params, &encoded_ring) {
            Ok(h) => h,
            Err(_) => return false,
        };
        let z = params.multi_pow(
            &[h, self.key_image.clone()],
            &[self.response.clone(), b.clone()],
        );

        Transcript::new(params, encoded_ring, &self.key_image, message)
            .challenge::<Hash>(a, &z)
            .map(|challenge| challenge == b)
            .unwrap_or(false)
    }
}

impl KeyImageGen for Liu2005 {
    fn generate_key_image<Hash: Digest<OutputSize = U64> + Clone + Default>(
        params: &GroupParameters,
        k: &BigUint,
        ring: &[BigUint],
    ) -> Result<BigUint> {
        key_image::<Hash>(params, k, ring)
    }
}

impl Sign for Liu2005 {
    /// To sign you need `k` your private key, and `ring` which holds the public keys of
    /// everyone including you at `secret_index`. You are signing the `message`
    fn sign<Hash: Digest<OutputSize = U64> + Clone + Default>(
        params: &GroupParameters,
        rng: &mut HmacDrbg,
        k: &BigUint,
        ring: &[BigUint],
        secret_index: usize,
        message: &[u8],
    ) -> Result<Liu2005> {
        check_signer(params, k, ring, secret_index)?;
        let n = ring.len();

        let encoded_ring = params.encode_ring(ring);
        let h = hash_to_element::<Hash>(params, &encoded_ring)?;
        let key_image = params.pow(&h, k);
        let transcript = Transcript::new(params, encoded_ring, &key_image, message);

        // a failure anywhere below leaves `rng` as it was
        rng.atomically(|rng| {
            let r = params.random_scalar(rng)?;

            // Decoy challenges are random; the signer's slot temporarily holds the nonce so
            // that one multi-exponentiation yields g^r · Π_{i≠π} y_i^{c_i}
            let mut cs: Vec<BigUint> = Vec::with_capacity(n);
            let mut b = BigUint::ZERO;
            for i in 0..n {
                if i == secret_index {
                    cs.push(r.clone());
                } else {
                    let c = params.random_scalar(rng)?;
                    b = params.add_scalars(&b, &c);
                    cs.push(c);
                }
            }

            let mut bases = ring.to_vec();
            bases[secret_index] = params.generator.clone();
            let a = params.multi_pow(&bases, &cs);
            let z = params.multi_pow(&[h.clone(), key_image.clone()], &[r.clone(), b.clone()]);

            let challenge = transcript.challenge::<Hash>(&a, &z)?;
            cs[secret_index] = params.sub_scalars(&challenge, &b);
            let response = params.sub_scalars(&r, &params.mul_scalars(&cs[secret_index], k));

            Ok(Liu2005 {
                key_image: key_image.clone(),
                response,
                challenges: cs,
            })
        })
    }
}

impl Verify for Liu2005 {
    /// To verify a `signature` you need the `ring` and the `message` too
    fn verify<Hash: Digest<OutputSize = U64> + Clone + Default>(
        signature: &Liu2005,
        params: &GroupParameters,
        ring: &[BigUint],
        message: &[u8],
    ) -> bool {
        if !signature.is_well_formed(params, ring.len()) {
            return false;
        }

        let mut bases = ring.to_vec();
        bases.push(params.generator.clone());
        let mut exponents = signature.challenges.clone();
        exponents.push(signature.response.clone());
        let a = params.multi_pow(&bases, &exponents);

        signature.check_commitment::<Hash>(params, ring, &a, message)
    }

    fn verify_with_cache<Hash: Digest<OutputSize = U64> + Clone + Default>(
        signature: &Liu2005,
        params: &GroupParameters,
        cache: &MultiExponentiation,
        message: &[u8],
    ) -> bool {
        let ring = cache.bases();
        if !signature.is_well_formed(params, ring.len()) {
            return false;
        }

        let a = params.mul(
            &params.cached_pow(cache, &signature.challenges),
            &params.base_pow(&signature.response),
        );

        signature.check_commitment::<Hash>(params, ring, &a, message)
    }
}

impl Link for Liu2005 {
    /// This is for linking two signatures and checking if they are signed by the same person
    fn link(signature_1: &Liu2005, signature_2: &Liu2005) -> bool {
        signature_1.key_image == signature_2.key_image
    }
}
