//! HMAC based deterministic random bit generator.
//!
//! This follows the `HMAC_DRBG` construction of NIST SP 800-90A instantiated with HMAC-SHA512.
//! It is the only source of randomness used by this crate: private keys, signing nonces and
//! decoy challenges are all drawn from it through [`HmacDrbg::generate_integer`].

use crate::error::{Error, Result};
use crate::prelude::*;
use hmac::{Hmac, Mac};
use num_bigint::BigUint;
use rand_core::{CryptoRng, RngCore};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Highest security strength (in bits) a generator can be instantiated with.
pub const HIGHEST_SECURITY_STRENGTH: usize = 256;

/// Seed length (in bytes) used when drawing entropy from an external source.
pub const SEED_LENGTH_BYTES: usize = 888 / 8;

/// Minimum statistical security parameter accepted by [`HmacDrbg::generate_integer`].
pub const MIN_SECURITY_PARAMETER: usize = 64;

const OUTLEN_BYTES: usize = 512 / 8;
const MAX_BITS_PER_REQUEST: usize = 7500;
const MAX_PERSONALIZATION_BYTES: usize = 512;
const RESEED_INTERVAL: u64 = 10_000;

/// Deterministic random bit generator state.
///
/// Two generators seeded with the same material produce the same stream for the same
/// sequence of calls. The state mutates on every call so an instance must not be shared
/// between concurrent callers without external locking.
#[derive(Clone)]
pub struct HmacDrbg {
    v: [u8; OUTLEN_BYTES],
    key: [u8; OUTLEN_BYTES],
    reseed_counter: u64,
    security_strength: usize,
}

impl core::fmt::Debug for HmacDrbg {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HmacDrbg")
            .field("reseed_counter", &self.reseed_counter)
            .field("security_strength", &self.security_strength)
            .finish_non_exhaustive()
    }
}

impl HmacDrbg {
    /// Instantiates a generator from `seed` and an optional personalization string.
    ///
    /// The requested `security_strength` is rounded up to one of 112, 128, 192 or 256 bits.
    pub fn new(
        seed: &[u8],
        security_strength: usize,
        personalization: Option<&[u8]>,
    ) -> Result<HmacDrbg> {
        let security_strength = round_security_strength(security_strength)?;
        let mut drbg = HmacDrbg {
            v: [0x01; OUTLEN_BYTES],
            key: [0x00; OUTLEN_BYTES],
            reseed_counter: 1,
            security_strength,
        };
        drbg.reseed(seed, personalization)?;
        Ok(drbg)
    }

    /// Instantiates a generator with [`SEED_LENGTH_BYTES`] of entropy drawn from `rng`.
    pub fn from_rng<CSPRNG: CryptoRng + RngCore>(
        rng: &mut CSPRNG,
        security_strength: usize,
    ) -> Result<HmacDrbg> {
        let mut seed = [0u8; SEED_LENGTH_BYTES];
        rng.fill_bytes(&mut seed);
        HmacDrbg::new(&seed, security_strength, None)
    }

    /// Security strength (in bits) the generator was rounded up to.
    pub fn security_strength(&self) -> usize {
        self.security_strength
    }

    /// Number of generate calls since the last (re)seed, plus one.
    pub fn reseed_counter(&self) -> u64 {
        self.reseed_counter
    }

    /// Replaces the state with one derived from fresh `seed` material.
    ///
    /// On error the previous state is left untouched.
    pub fn reseed(&mut self, seed: &[u8], personalization: Option<&[u8]>) -> Result<()> {
        let personalization = personalization.unwrap_or(&[]);
        if personalization.len() > MAX_PERSONALIZATION_BYTES {
            return Err(Error::PersonalizationTooLong(personalization.len()));
        }

        let required = self.security_strength * 3 / 2 / 8;
        if seed.len() < required {
            return Err(Error::InsufficientEntropy {
                provided: seed.len(),
                required,
            });
        }

        self.instantiate(seed, personalization);
        tracing::trace!(
            security_strength = self.security_strength,
            "hmac drbg (re)seeded"
        );
        Ok(())
    }

    /// Fills `output` with pseudorandom bytes.
    pub fn generate(&mut self, output: &mut [u8]) -> Result<()> {
        if output.len() * 8 > MAX_BITS_PER_REQUEST {
            return Err(Error::RequestTooLarge(output.len()));
        }
        if self.reseed_counter > RESEED_INTERVAL {
            tracing::warn!(
                reseed_counter = self.reseed_counter,
                "hmac drbg refused to generate until reseeded"
            );
            return Err(Error::ReseedRequired);
        }

        for chunk in output.chunks_mut(OUTLEN_BYTES) {
            self.v = hmac(&self.key, &[&self.v[..]]);
            chunk.copy_from_slice(&self.v[..chunk.len()]);
        }

        self.update(&[]);
        self.reseed_counter += 1;
        Ok(())
    }

    /// Draws an integer in `[0, max)` using the simple modular method.
    ///
    /// `security_parameter` extra bits are sampled so that the bias of the final reduction is
    /// at most `2^-security_parameter`.
    pub fn generate_integer(
        &mut self,
        max: &BigUint,
        security_parameter: usize,
    ) -> Result<BigUint> {
        if security_parameter < MIN_SECURITY_PARAMETER {
            return Err(Error::SecurityParameterTooLow(security_parameter));
        }
        if *max == BigUint::ZERO {
            return Err(Error::ZeroModulus);
        }

        let mut bytes = vec![0u8; max.to_bytes_be().len() + security_parameter / 8 + 1];
        self.generate(&mut bytes)?;
        bytes[0] = 0;
        Ok(BigUint::from_bytes_be(&bytes) % max)
    }

    /// Runs `f` against this generator, rolling the state back if it fails.
    ///
    /// Callers that draw several values for one result use this so that a failure part way
    /// through (typically [`Error::ReseedRequired`]) consumes nothing.
    pub fn atomically<T>(&mut self, f: impl FnOnce(&mut HmacDrbg) -> Result<T>) -> Result<T> {
        let snapshot = self.clone();
        let result = f(self);
        if result.is_err() {
            *self = snapshot;
        }
        result
    }

    fn instantiate(&mut self, seed: &[u8], personalization: &[u8]) {
        self.reseed_counter = 1;
        self.key = [0x00; OUTLEN_BYTES];
        self.v = [0x01; OUTLEN_BYTES];
        let mut seed_material = Vec::with_capacity(seed.len() + personalization.len());
        seed_material.extend_from_slice(seed);
        seed_material.extend_from_slice(personalization);
        self.update(&seed_material);
    }

    fn update(&mut self, provided_data: &[u8]) {
        self.key = hmac(&self.key, &[&self.v[..], &[0x00], provided_data]);
        self.v = hmac(&self.key, &[&self.v[..]]);
        if !provided_data.is_empty() {
            self.key = hmac(&self.key, &[&self.v[..], &[0x01], provided_data]);
            self.v = hmac(&self.key, &[&self.v[..]]);
        }
    }
}

fn round_security_strength(requested: usize) -> Result<usize> {
    match requested {
        0..=112 => Ok(112),
        113..=128 => Ok(128),
        129..=192 => Ok(192),
        193..=HIGHEST_SECURITY_STRENGTH => Ok(HIGHEST_SECURITY_STRENGTH),
        _ => Err(Error::UnsupportedSecurityStrength(requested)),
    }
}

fn hmac(key: &[u8], parts: &[&[u8]]) -> [u8; OUTLEN_BYTES] {
    let mut mac = HmacSha512::new_from_slice(key)
        .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
    for part in parts {
        mac.update(part);
    }
    let mut out = [0u8; OUTLEN_BYTES];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}

#[cfg(test)]
mod test {
    use super::*;

    fn counting_seed() -> Vec<u8> {
        (0u8..48).collect()
    }

    fn hex(bytes: &[u8]) -> String {
        bytes
            .iter()
            .map(|b| alloc::format!("{:02x}", b))
            .collect()
    }

    #[test]
    fn known_answer() {
        let mut drbg = HmacDrbg::new(&counting_seed(), 256, None).unwrap();
        let mut first = [0u8; 64];
        drbg.generate(&mut first).unwrap();
        assert_eq!(
            hex(&first),
            "5a947e2ec811344b506f321e3f1fbde3fde96845301a7c1793e72b2071e1d984\
             846eda8ee0e97301da2e6d07c4937b7a50c729a1ad16e594ab3dd96561709270"
        );

        let mut second = [0u8; 16];
        drbg.generate(&mut second).unwrap();
        assert_eq!(hex(&second), "44050f744342d8e9f0466ac60952686e");
        assert_eq!(drbg.reseed_counter(), 3);
    }

    #[test]
    fn known_answer_with_personalization() {
        let mut drbg = HmacDrbg::new(&counting_seed(), 256, Some(b"personal")).unwrap();
        let mut out = [0u8; 32];
        drbg.generate(&mut out).unwrap();
        assert_eq!(
            hex(&out),
            "02e514fee16281ca83c527f2be8d6cb94e885cacecba6abda879426f64ac73eb"
        );
    }

    #[test]
    fn known_integer() {
        let mut drbg = HmacDrbg::new(&counting_seed(), 256, None).unwrap();
        let x = drbg
            .generate_integer(&BigUint::from(1_000_003u32), 64)
            .unwrap();
        assert_eq!(x, BigUint::from(822_149u32));
    }

    #[test]
    fn deterministic() {
        let mut a = HmacDrbg::new(&[42u8; 64], 192, Some(b"ctx")).unwrap();
        let mut b = HmacDrbg::new(&[42u8; 64], 192, Some(b"ctx")).unwrap();
        for len in [1usize, 63, 64, 65, 200, 937] {
            let mut x = vec![0u8; len];
            let mut y = vec![0u8; len];
            a.generate(&mut x).unwrap();
            b.generate(&mut y).unwrap();
            assert_eq!(x, y);
        }

        let mut c = HmacDrbg::new(&[43u8; 64], 192, Some(b"ctx")).unwrap();
        let mut x = [0u8; 32];
        let mut z = [0u8; 32];
        a.generate(&mut x).unwrap();
        c.generate(&mut z).unwrap();
        assert_ne!(x, z);
    }

    #[test]
    fn security_strength_is_rounded_up() {
        let seed = [0u8; 48];
        assert_eq!(HmacDrbg::new(&seed, 80, None).unwrap().security_strength(), 112);
        assert_eq!(HmacDrbg::new(&seed, 112, None).unwrap().security_strength(), 112);
        assert_eq!(HmacDrbg::new(&seed, 113, None).unwrap().security_strength(), 128);
        assert_eq!(HmacDrbg::new(&seed, 160, None).unwrap().security_strength(), 192);
        assert_eq!(HmacDrbg::new(&seed, 256, None).unwrap().security_strength(), 256);
        assert_eq!(
            HmacDrbg::new(&seed, 257, None).unwrap_err(),
            Error::UnsupportedSecurityStrength(257)
        );
    }

    #[test]
    fn seed_must_carry_enough_entropy() {
        // 3 * 256 / 2 / 8 = 48 bytes
        assert_eq!(
            HmacDrbg::new(&[0u8; 47], 256, None).unwrap_err(),
            Error::InsufficientEntropy {
                provided: 47,
                required: 48
            }
        );
        assert!(HmacDrbg::new(&[0u8; 21], 112, None).is_ok());
        assert!(HmacDrbg::new(&[0u8; 20], 112, None).is_err());
    }

    #[test]
    fn personalization_limit() {
        let seed = [0u8; 48];
        assert!(HmacDrbg::new(&seed, 256, Some(&[0u8; 512])).is_ok());
        assert_eq!(
            HmacDrbg::new(&seed, 256, Some(&[0u8; 513])).unwrap_err(),
            Error::PersonalizationTooLong(513)
        );
    }

    #[test]
    fn request_ceiling() {
        let mut drbg = HmacDrbg::new(&[1u8; 48], 256, None).unwrap();
        let mut ok = [0u8; 937];
        assert!(drbg.generate(&mut ok).is_ok());
        let mut too_big = [0u8; 938];
        assert_eq!(
            drbg.generate(&mut too_big).unwrap_err(),
            Error::RequestTooLarge(938)
        );
        assert_eq!(drbg.reseed_counter(), 2);
    }

    #[test]
    fn reseed_bound() {
        let mut drbg = HmacDrbg::new(&[9u8; 48], 256, None).unwrap();
        let mut out = [0u8; 1];
        for _ in 0..10_000 {
            drbg.generate(&mut out).unwrap();
        }
        assert_eq!(drbg.generate(&mut out).unwrap_err(), Error::ReseedRequired);

        // a rejected reseed keeps the exhausted state
        assert!(drbg.reseed(&[1u8; 8], None).is_err());
        assert_eq!(drbg.generate(&mut out).unwrap_err(), Error::ReseedRequired);

        drbg.reseed(&[10u8; 48], None).unwrap();
        assert_eq!(drbg.reseed_counter(), 1);
        assert!(drbg.generate(&mut out).is_ok());
    }

    #[test]
    fn failed_calls_leave_state_intact() {
        let mut a = HmacDrbg::new(&[5u8; 48], 256, None).unwrap();
        let mut b = a.clone();
        let mut too_big = [0u8; 1000];
        assert!(a.generate(&mut too_big).is_err());
        assert!(a.reseed(&[0u8; 4], None).is_err());
        assert!(a.generate_integer(&BigUint::from(7u32), 32).is_err());

        let mut x = [0u8; 32];
        let mut y = [0u8; 32];
        a.generate(&mut x).unwrap();
        b.generate(&mut y).unwrap();
        assert_eq!(x, y);
    }

    #[test]
    fn atomically_rolls_back_on_error() {
        let mut drbg = HmacDrbg::new(&[6u8; 48], 256, None).unwrap();
        let mut out = [0u8; 1];
        for _ in 0..9_998 {
            drbg.generate(&mut out).unwrap();
        }
        let mut expected = drbg.clone();

        let result = drbg.atomically(|rng| {
            let mut buf = [0u8; 8];
            for _ in 0..3 {
                rng.generate(&mut buf)?;
            }
            Ok(buf)
        });
        assert_eq!(result.unwrap_err(), Error::ReseedRequired);
        assert_eq!(drbg.reseed_counter(), 9_999);

        let mut x = [0u8; 32];
        let mut y = [0u8; 32];
        drbg.generate(&mut x).unwrap();
        expected.generate(&mut y).unwrap();
        assert_eq!(x, y);

        let kept = drbg.atomically(|rng| rng.generate_integer(&BigUint::from(9u32), 64));
        assert!(kept.unwrap() < BigUint::from(9u32));
        assert_eq!(drbg.reseed_counter(), 10_001);
    }

    #[test]
    fn integers_fall_below_max() {
        let mut drbg = HmacDrbg::new(&[3u8; 48], 256, None).unwrap();
        let max = BigUint::from(1000u32);
        for _ in 0..500 {
            assert!(drbg.generate_integer(&max, 64).unwrap() < max);
        }
        assert_eq!(
            drbg.generate_integer(&BigUint::ZERO, 64).unwrap_err(),
            Error::ZeroModulus
        );
        assert_eq!(
            drbg.generate_integer(&max, 63).unwrap_err(),
            Error::SecurityParameterTooLow(63)
        );
    }
}
