//! Key material: one algorithm with its signing and verifying keys.

use crate::crypto::{SigningKey, VerifyingKey};
use crate::{Algorithm, Error, Parser, ParserOptions, Result, Signer};
use std::fs;
use std::path::Path;

/// Read a key file into memory.
pub fn read_key(path: &Path) -> Result<Vec<u8>> {
    Ok(fs::read(path)?)
}

/// An algorithm bound to a signing key and the matching verifying key.
///
/// For HS* algorithms both halves are the same secret. A `Key` is only ever
/// built from keys that parsed for its algorithm, so every value is usable.
#[derive(Debug, Clone)]
pub struct Key {
    algorithm: Algorithm,
    signing: SigningKey,
    verifying: VerifyingKey,
}

impl Key {
    /// Build key material from in-memory bytes.
    ///
    /// - HS*: `sign_key` is the secret, `verify_key` is ignored.
    /// - RS*, PS*, ES*: `sign_key` is a private key PEM and `verify_key` the
    ///   public key PEM; it is required.
    pub fn new(algorithm: Algorithm, sign_key: &[u8], verify_key: Option<&[u8]>) -> Result<Self> {
        if algorithm == Algorithm::None {
            return Err(Error::InvalidAlgorithm(algorithm.to_string()));
        }
        if sign_key.is_empty() {
            return Err(Error::InvalidKey("empty signing key".to_string()));
        }

        let verify_key = if algorithm.is_asymmetric() {
            let key = verify_key.ok_or(Error::MissingVerifyKey(algorithm))?;
            if key.is_empty() {
                return Err(Error::InvalidKey("empty verifying key".to_string()));
            }
            key
        } else {
            sign_key
        };

        Ok(Self {
            algorithm,
            signing: SigningKey::from_bytes(algorithm, sign_key)?,
            verifying: VerifyingKey::from_bytes(algorithm, verify_key)?,
        })
    }

    /// Build key material from key files. `verify_key_file` is ignored for HS*
    /// algorithms and required otherwise.
    pub fn from_files(
        algorithm: Algorithm,
        sign_key_file: &Path,
        verify_key_file: Option<&Path>,
    ) -> Result<Self> {
        if algorithm == Algorithm::None {
            return Err(Error::InvalidAlgorithm(algorithm.to_string()));
        }

        let sign_key = read_key(sign_key_file)?;
        if !algorithm.is_asymmetric() {
            return Self::new(algorithm, &sign_key, None);
        }

        let verify_key_file = verify_key_file.ok_or(Error::MissingVerifyKey(algorithm))?;
        let verify_key = read_key(verify_key_file)?;
        Self::new(algorithm, &sign_key, Some(&verify_key))
    }

    /// Signing algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// A signer using this key's signing half.
    pub fn signer(&self) -> Signer {
        Signer::from_parts(self.algorithm, self.signing.clone())
    }

    /// A parser using this key's verifying half.
    pub fn parser(&self, options: ParserOptions) -> Parser {
        Parser::from_parts(self.algorithm, self.verifying.clone(), options)
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing
    }

    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying
    }
}
