//! Supported signing algorithms.

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A JWS signing algorithm (RFC 7518 section 3.1).
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// HMAC using SHA-256.
    HS256,
    /// HMAC using SHA-384.
    HS384,
    /// HMAC using SHA-512.
    HS512,
    /// RSASSA-PKCS1-v1_5 using SHA-256.
    RS256,
    /// RSASSA-PKCS1-v1_5 using SHA-384.
    RS384,
    /// RSASSA-PKCS1-v1_5 using SHA-512.
    RS512,
    /// RSASSA-PSS using SHA-256.
    PS256,
    /// RSASSA-PSS using SHA-384.
    PS384,
    /// RSASSA-PSS using SHA-512.
    PS512,
    /// ECDSA using P-256 and SHA-256.
    ES256,
    /// ECDSA using P-384 and SHA-384.
    ES384,
    /// ECDSA using P-521 and SHA-512.
    ES512,
    /// Unsecured JWS. Recognised by name, never usable for signing or parsing.
    None,
}

/// Key family of an algorithm, which decides how key bytes are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmFamily {
    /// Raw shared secret.
    Hmac,
    /// RSA keys, PEM encoded.
    Rsa,
    /// Elliptic-curve keys, PEM encoded.
    Ecdsa,
    /// No key at all.
    None,
}

impl Algorithm {
    /// All algorithms a key can be registered with.
    pub const SUPPORTED: [Algorithm; 12] = [
        Algorithm::HS256,
        Algorithm::HS384,
        Algorithm::HS512,
        Algorithm::RS256,
        Algorithm::RS384,
        Algorithm::RS512,
        Algorithm::PS256,
        Algorithm::PS384,
        Algorithm::PS512,
        Algorithm::ES256,
        Algorithm::ES384,
        Algorithm::ES512,
    ];

    /// The `alg` header value.
    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::HS256 => "HS256",
            Algorithm::HS384 => "HS384",
            Algorithm::HS512 => "HS512",
            Algorithm::RS256 => "RS256",
            Algorithm::RS384 => "RS384",
            Algorithm::RS512 => "RS512",
            Algorithm::PS256 => "PS256",
            Algorithm::PS384 => "PS384",
            Algorithm::PS512 => "PS512",
            Algorithm::ES256 => "ES256",
            Algorithm::ES384 => "ES384",
            Algorithm::ES512 => "ES512",
            Algorithm::None => "none",
        }
    }

    /// Key family.
    pub fn family(self) -> AlgorithmFamily {
        match self {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => AlgorithmFamily::Hmac,
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => AlgorithmFamily::Rsa,
            Algorithm::ES256 | Algorithm::ES384 | Algorithm::ES512 => AlgorithmFamily::Ecdsa,
            Algorithm::None => AlgorithmFamily::None,
        }
    }

    /// True for algorithms whose verifying key differs from the signing key.
    pub fn is_asymmetric(self) -> bool {
        matches!(self.family(), AlgorithmFamily::Rsa | AlgorithmFamily::Ecdsa)
    }

    /// The jsonwebtoken equivalent. ES512 and `none` have none; they are
    /// handled locally.
    pub(crate) fn to_jwt(self) -> Option<jsonwebtoken::Algorithm> {
        use jsonwebtoken::Algorithm as J;

        match self {
            Algorithm::HS256 => Some(J::HS256),
            Algorithm::HS384 => Some(J::HS384),
            Algorithm::HS512 => Some(J::HS512),
            Algorithm::RS256 => Some(J::RS256),
            Algorithm::RS384 => Some(J::RS384),
            Algorithm::RS512 => Some(J::RS512),
            Algorithm::PS256 => Some(J::PS256),
            Algorithm::PS384 => Some(J::PS384),
            Algorithm::PS512 => Some(J::PS512),
            Algorithm::ES256 => Some(J::ES256),
            Algorithm::ES384 => Some(J::ES384),
            Algorithm::ES512 | Algorithm::None => None,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == "none" {
            return Ok(Algorithm::None);
        }
        Algorithm::SUPPORTED
            .into_iter()
            .find(|alg| alg.as_str() == s)
            .ok_or_else(|| Error::InvalidAlgorithm(s.to_string()))
    }
}
