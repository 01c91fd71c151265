//! Errors raised by generators, group setup and signing.
//!
//! Verification never produces one of these: a signature that fails to check for any
//! reason is reported as `false`.

use crate::prelude::*;

/// Everything that can abort an operation in this crate.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The requested DRBG security strength is above the highest supported tier.
    #[error("requested security strength {0} is not supported")]
    UnsupportedSecurityStrength(usize),

    /// The personalization string is longer than the DRBG accepts.
    #[error("personalization string of {0} bytes is too long")]
    PersonalizationTooLong(usize),

    /// The seed does not carry enough entropy for the configured security strength.
    #[error("seed of {provided} bytes is shorter than the {required} bytes required")]
    InsufficientEntropy { provided: usize, required: usize },

    /// A single generation request asked for more output than allowed per call.
    #[error("too many bytes requested: {0}")]
    RequestTooLarge(usize),

    /// The generator has produced its maximum number of outputs since the last (re)seed.
    #[error("a reseed is required")]
    ReseedRequired,

    /// The statistical security parameter for integer sampling is below 64 bits.
    #[error("security parameter {0} is too low")]
    SecurityParameterTooLow(usize),

    /// A modulus or sampling bound of zero was supplied.
    #[error("modulus must be non-zero")]
    ZeroModulus,

    /// A `(p, g, q)` triple does not describe a prime-order subgroup.
    #[error("invalid group parameters: {0}")]
    InvalidParameters(String),

    /// Signing was attempted over a ring with no members.
    #[error("ring must contain at least one public key")]
    EmptyRing,

    /// The ring member at the given index is not the public key of the signing key.
    #[error("ring member {0} does not match the private key")]
    SignerMismatch(usize),

    /// The signing key is zero, whose linkability tag would be the identity.
    #[error("private key must be non-zero")]
    ZeroPrivateKey,

    /// A group name that is not in the catalog.
    #[error("unknown group parameter set: {0}")]
    UnknownGroup(String),
}

/// Result type used across the crate.
pub type Result<T> = core::result::Result<T, Error>;
