use crate::drbg::HmacDrbg;
use crate::error::{Error, Result};
use crate::group::GroupParameters;
use num_bigint::BigUint;

/// A private scalar `x` and the public key `g^x mod p` it corresponds to.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub private_key: BigUint,
    pub public_key: BigUint,
}

impl core::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

impl KeyPair {
    /// Draws a private key uniformly from `[1, q)` and derives its public key.
    pub fn generate(params: &GroupParameters, rng: &mut HmacDrbg) -> Result<KeyPair> {
        let private_key = rng.atomically(|rng| loop {
            let x = params.random_scalar(rng)?;
            if x != BigUint::ZERO {
                return Ok(x);
            }
        })?;
        Ok(KeyPair::from_private_key(params, private_key))
    }

    pub fn from_private_key(params: &GroupParameters, private_key: BigUint) -> KeyPair {
        let public_key = params.base_pow(&private_key);
        KeyPair {
            private_key,
            public_key,
        }
    }
}

/// Checks that `ring[secret_index]` is the public key of `k` and that `k` is non-zero.
pub(crate) fn check_signer(
    params: &GroupParameters,
    k: &BigUint,
    ring: &[BigUint],
    secret_index: usize,
) -> Result<()> {
    if ring.is_empty() {
        return Err(Error::EmptyRing);
    }
    if *k == BigUint::ZERO {
        return Err(Error::ZeroPrivateKey);
    }
    match ring.get(secret_index) {
        Some(public_key) if *public_key == params.base_pow(k) => Ok(()),
        _ => Err(Error::SignerMismatch(secret_index)),
    }
}
