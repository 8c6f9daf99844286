//! Error types.

use crate::Algorithm;
use thiserror::Error;

/// Crate result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Algorithm name is not one of the supported RFC 7518 names, or is `none`
    /// where a real signing method is required.
    #[error("invalid alg: {0} (available algs: HS256, HS384, HS512, RS256, RS384, RS512, PS256, PS384, PS512, ES256, ES384, ES512)")]
    InvalidAlgorithm(String),

    /// A kid was required but the empty string was given.
    #[error("kid must not be empty")]
    EmptyKid,

    /// An asymmetric algorithm was registered without a verifying key.
    #[error("{0} requires a verifying key")]
    MissingVerifyKey(Algorithm),

    /// No key is registered under this kid.
    #[error("key not found for kid {0:?}")]
    KeyNotFound(String),

    /// No signer is registered under this kid.
    #[error("signer not found for kid {0:?}")]
    SignerNotFound(String),

    /// No parser is registered under this kid.
    #[error("parser not found for kid {0:?}")]
    ParserNotFound(String),

    /// A signer was requested without a usable algorithm or key.
    #[error("invalid signer")]
    InvalidSigner,

    /// A parser was requested without a usable algorithm or key.
    #[error("invalid parser")]
    InvalidParser,

    /// A signer was registered in a multi-key signer without a kid.
    #[error("invalid multiple keys signer")]
    InvalidMultiKeySigner,

    /// A parser was registered in a multi-key parser without a kid.
    #[error("invalid multiple keys parser")]
    InvalidMultiKeyParser,

    /// Signature mismatch, or the header names an algorithm other than the expected one.
    #[error("invalid token")]
    InvalidToken,

    /// The `exp` claim is in the past.
    #[error("token is expired")]
    Expired,

    /// The `nbf` claim is in the future.
    #[error("token is not valid yet")]
    NotYetValid,

    /// The `iat` claim is in the future.
    #[error("token used before issued")]
    UsedBeforeIssued,

    /// A registered time claim is not a number.
    #[error("invalid {0} claim (not a number)")]
    InvalidTimeClaim(String),

    /// The token does not have exactly three segments.
    #[error("invalid number of JWT parts: expected 3, got {0}")]
    InvalidPartCount(usize),

    /// The token carries no `kid`.
    #[error("kid not found in token")]
    KidNotFound,

    /// The token's `kid` is not a string.
    #[error("invalid kid type (not string)")]
    KidType,

    /// Key bytes could not be parsed for the requested algorithm.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The key registry lock was poisoned by a panicking writer.
    #[error("key registry lock poisoned")]
    Poisoned,

    /// Reading a key file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A token segment is not valid base64url.
    #[error(transparent)]
    Base64(#[from] base64::DecodeError),

    /// JSON encoding or decoding error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// jsonwebtoken error (PEM parsing, signing backend).
    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
}
