//! Single-key token signing.

use crate::crypto::SigningKey;
use crate::{Algorithm, Claim, ClaimSet, Error, Result, key, token};
use std::path::Path;

/// Signs tokens with one algorithm and one signing key.
///
/// ```no_run
/// use jwtkeys::{Algorithm, Claim, Signer};
///
/// # fn demo() -> jwtkeys::Result<()> {
/// let signer = Signer::from_file(Algorithm::RS256, "keys/rsa_2048_priv.pem")?;
/// let token = signer.signed_string([Claim::new("uid", "1"), Claim::new("count", 100)])?;
/// # Ok(()) }
/// ```
#[derive(Debug, Clone)]
pub struct Signer {
    algorithm: Algorithm,
    key: SigningKey,
}

impl Signer {
    /// Build a signer.
    ///
    /// `key` is the raw secret for HS* algorithms, and a private key PEM for
    /// RS*, PS* and ES* algorithms.
    pub fn new(algorithm: Algorithm, key: &[u8]) -> Result<Self> {
        if algorithm == Algorithm::None || key.is_empty() {
            return Err(Error::InvalidSigner);
        }
        Ok(Self {
            algorithm,
            key: SigningKey::from_bytes(algorithm, key)?,
        })
    }

    /// Build a signer from a key file.
    pub fn from_file(algorithm: Algorithm, path: impl AsRef<Path>) -> Result<Self> {
        let key = key::read_key(path.as_ref())?;
        Self::new(algorithm, &key)
    }

    pub(crate) fn from_parts(algorithm: Algorithm, key: SigningKey) -> Self {
        Self { algorithm, key }
    }

    /// Signing algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Sign the given claims, applied in order onto an empty claim set.
    pub fn signed_string<I>(&self, claims: I) -> Result<String>
    where
        I: IntoIterator<Item = Claim>,
    {
        self.sign_claims(&ClaimSet::from_claims(claims))
    }

    /// Sign an already built claim set.
    pub fn sign_claims(&self, claims: &ClaimSet) -> Result<String> {
        token::encode(self.algorithm, &self.key, None, claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    const RSA_PRIV: &[u8] = include_bytes!("../testdata/rsa_2048_priv.pem");

    #[test]
    fn missing_inputs_are_invalid_signer() {
        assert!(matches!(Signer::new(Algorithm::HS256, b""), Err(Error::InvalidSigner)));
        assert!(matches!(Signer::new(Algorithm::None, b"secret"), Err(Error::InvalidSigner)));
    }

    #[test]
    fn malformed_keys_are_rejected_at_construction() {
        assert!(matches!(Signer::new(Algorithm::RS256, b"garbage"), Err(Error::Jwt(_))));
        assert!(matches!(Signer::new(Algorithm::ES512, RSA_PRIV), Err(Error::InvalidKey(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Signer::from_file(Algorithm::HS256, "/nonexistent/jwtkeys/hmac.key").unwrap_err();
        assert!(matches!(err, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound));
    }

    #[test]
    fn secret_file_is_used_byte_for_byte() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"file-secret\n").unwrap();

        let signer = Signer::from_file(Algorithm::HS256, file.path()).unwrap();
        let token = signer.signed_string([Claim::new("uid", "1")]).unwrap();

        let parser =
            crate::Parser::new(Algorithm::HS256, b"file-secret\n", crate::ParserOptions::default())
                .unwrap();
        assert_eq!(parser.parse(&token).unwrap().get_str("uid"), Some("1"));

        let trimmed =
            crate::Parser::new(Algorithm::HS256, b"file-secret", crate::ParserOptions::default())
                .unwrap();
        assert!(matches!(trimmed.parse(&token), Err(Error::InvalidToken)));
    }

    #[test]
    fn token_has_three_unpadded_segments() {
        let signer = Signer::new(Algorithm::RS256, RSA_PRIV).unwrap();
        let token = signer
            .signed_string([Claim::new("uid", "1"), Claim::new("count", 100)])
            .unwrap();

        let segments: Vec<&str> = token.split('.').collect();
        assert_eq!(segments.len(), 3);
        assert!(segments.iter().all(|s| !s.is_empty() && !s.contains('=')));

        let payload = URL_SAFE_NO_PAD.decode(segments[1]).unwrap();
        let payload: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(payload, serde_json::json!({"uid": "1", "count": 100}));
    }

    #[test]
    fn hmac_signing_is_deterministic() {
        let signer = Signer::new(Algorithm::HS384, b"secret").unwrap();
        let a = signer.signed_string([Claim::new("a", 1)]).unwrap();
        let b = signer.signed_string([Claim::new("a", 1)]).unwrap();
        assert_eq!(a, b);
        assert_eq!(signer.algorithm(), Algorithm::HS384);
    }
}
