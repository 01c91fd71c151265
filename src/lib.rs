//! # lrs-dsa
//! A library that implements linkable [Ring Signatures](https://en.wikipedia.org/wiki/Ring_signature)
//! over the prime-order subgroup of a DSA-style group `(Z/pZ)*`. Two schemes share one set of
//! traits:
//!
//!  - [`liu2005::Liu2005`]: one challenge split additively across the ring, computed with a
//!    single multi-exponentiation
//!  - [`liu2004::Liu2004`]: the classic LSAG ring closure, one hash per ring member
//!
//! Any signer in a ring can sign without revealing which member they are, yet two signatures
//! made with the same private key over the same ring carry the same linkability tag.
//!
//! All randomness comes from [`drbg::HmacDrbg`], an HMAC-SHA512 `HMAC_DRBG` (NIST SP 800-90A).
//! Verifying many signatures against one ring can share a precomputed
//! [`multiexp::MultiExponentiation`] cache.
//!
//! This library is to work with any 512-bit (64 byte output) hashing function, picked by the
//! caller as a type parameter of `sign` and `verify`.
//!
//! Arithmetic is not constant time.

#![no_std]
#[macro_use]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod drbg;
pub mod error;
pub mod group;
pub mod hash;
pub mod keys;
pub mod liu2004;
pub mod liu2005;
pub mod multiexp;
pub mod params;
mod prelude;
pub mod traits;

pub use drbg::HmacDrbg;
pub use error::{Error, Result};
pub use group::GroupParameters;
pub use keys::KeyPair;
pub use multiexp::MultiExponentiation;
pub use params::NamedGroup;
