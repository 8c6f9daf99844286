//! Single-key token verification.

use crate::crypto::VerifyingKey;
use crate::{Algorithm, ClaimSet, Error, Result, key, token};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options for parsing tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Keep numeric claims at their exact textual precision. When false, every
    /// number is decoded as an `f64`.
    pub decode_numbers_as_exact_decimal: bool,

    /// Clock skew allowed when checking `exp`, `nbf` and `iat`, in seconds.
    /// Defaults to 60.
    pub leeway_seconds: u64,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            decode_numbers_as_exact_decimal: true,
            leeway_seconds: 60,
        }
    }
}

/// Verifies tokens signed with one algorithm and one key.
///
/// Tokens whose header names any other algorithm are rejected before the
/// signature is looked at.
#[derive(Debug, Clone)]
pub struct Parser {
    algorithm: Algorithm,
    key: VerifyingKey,
    options: ParserOptions,
}

impl Parser {
    /// Build a parser.
    ///
    /// `key` is the raw secret for HS* algorithms, and a public key PEM for
    /// RS*, PS* and ES* algorithms. `none` is never accepted.
    pub fn new(algorithm: Algorithm, key: &[u8], options: ParserOptions) -> Result<Self> {
        if algorithm == Algorithm::None || key.is_empty() {
            return Err(Error::InvalidParser);
        }
        Ok(Self {
            algorithm,
            key: VerifyingKey::from_bytes(algorithm, key)?,
            options,
        })
    }

    /// Build a parser from a key file.
    pub fn from_file(
        algorithm: Algorithm,
        path: impl AsRef<Path>,
        options: ParserOptions,
    ) -> Result<Self> {
        let key = key::read_key(path.as_ref())?;
        Self::new(algorithm, &key, options)
    }

    pub(crate) fn from_parts(algorithm: Algorithm, key: VerifyingKey, options: ParserOptions) -> Self {
        Self {
            algorithm,
            key,
            options,
        }
    }

    /// Expected algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Parsing options.
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Verify `token` and return its claims.
    ///
    /// A token whose `exp`, `nbf` or `iat` is out of range, after allowing
    /// [`ParserOptions::leeway_seconds`], is rejected.
    pub fn parse(&self, token: &str) -> Result<ClaimSet> {
        let parts = token::split(token)?;
        let header = token::decode_header(&parts)?;
        token::verify_and_decode(&parts, &header, self.algorithm, &self.key, &self.options)
    }
}
