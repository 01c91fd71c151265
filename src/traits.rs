use crate::drbg::HmacDrbg;
use crate::error::Result;
use crate::group::GroupParameters;
use crate::keys::KeyPair;
use crate::multiexp::MultiExponentiation;
use digest::generic_array::typenum::U64;
use digest::Digest;
use num_bigint::BigUint;

pub trait Sign: Sized {
    /// Draws a fresh key pair for use in rings of this scheme.
    fn generate_key_pair(params: &GroupParameters, rng: &mut HmacDrbg) -> Result<KeyPair> {
        KeyPair::generate(params, rng)
    }

    /// Signs `message` as the owner of `ring[secret_index]`, whose private key is `k`.
    ///
    /// Fails with [`crate::Error::SignerMismatch`] if `ring[secret_index]` is not `g^k`.
    fn sign<Hash: Digest<OutputSize = U64> + Clone + Default>(
        params: &GroupParameters,
        rng: &mut HmacDrbg,
        k: &BigUint,
        ring: &[BigUint],
        secret_index: usize,
        message: &[u8],
    ) -> Result<Self>;
}

pub trait Verify {
    /// Checks `signature` over `message` against `ring`, in the order used for signing.
    fn verify<Hash: Digest<OutputSize = U64> + Clone + Default>(
        signature: &Self,
        params: &GroupParameters,
        ring: &[BigUint],
        message: &[u8],
    ) -> bool;

    /// Same as [`Verify::verify`] with the ring taken from a cache built by
    /// [`GroupParameters::precompute`].
    fn verify_with_cache<Hash: Digest<OutputSize = U64> + Clone + Default>(
        signature: &Self,
        params: &GroupParameters,
        cache: &MultiExponentiation,
        message: &[u8],
    ) -> bool;
}

pub trait Link {
    /// Whether both signatures were made with the same private key.
    fn link(signature_1: &Self, signature_2: &Self) -> bool;
}

pub trait KeyImageGen {
    /// The linkability tag a signature by `k` over `ring` will carry.
    fn generate_key_image<Hash: Digest<OutputSize = U64> + Clone + Default>(
        params: &GroupParameters,
        k: &BigUint,
        ring: &[BigUint],
    ) -> Result<BigUint>;
}
