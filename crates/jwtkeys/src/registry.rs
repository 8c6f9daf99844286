//! Key registry: kid → key material, shared between threads.

use crate::{Algorithm, Claim, ClaimSet, Error, Key, ParserOptions, Result, token};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[cfg(feature = "global")]
use once_cell::sync::Lazy;

#[cfg(feature = "global")]
static GLOBAL: Lazy<KeyRegistry> = Lazy::new(KeyRegistry::new);

/// Claims of a token verified by [`KeyRegistry::parse`], with the header kid
/// that selected the key.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryToken {
    /// Header `kid`.
    pub kid: String,
    /// Verified claims.
    pub claims: ClaimSet,
}

/// Maps kids to key material.
///
/// Lookups share a read lock; installing and deleting take the write lock.
/// Entries are complete `Arc<Key>` values, so a reader sees either no entry or
/// a usable key.
///
/// Tokens signed through [`KeyRegistry::sign`] carry their kid in the JWT
/// header. That is a different convention from [`MultiKeySigner`](crate::MultiKeySigner),
/// which puts the kid in the claims; the two do not read each other's tokens.
#[derive(Debug, Default)]
pub struct KeyRegistry {
    keys: RwLock<HashMap<String, Arc<Key>>>,
}

impl KeyRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    #[cfg(feature = "global")]
    pub fn global() -> &'static KeyRegistry {
        &GLOBAL
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Arc<Key>>>> {
        self.keys.read().map_err(|_| Error::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Arc<Key>>>> {
        self.keys.write().map_err(|_| Error::Poisoned)
    }

    /// Install `key` under `kid`, replacing any previous key.
    pub fn set_key(&self, kid: &str, key: Key) -> Result<()> {
        if kid.is_empty() {
            return Err(Error::EmptyKid);
        }

        let alg = key.algorithm();
        let replaced = self.write()?.insert(kid.to_string(), Arc::new(key)).is_some();
        tracing::debug!(kid, alg = %alg, replaced, "installed key");
        Ok(())
    }

    /// Read key files and install the key under `kid`.
    ///
    /// For HS* algorithms the signing key file is the shared secret and
    /// `verify_key_file` is ignored. Nothing is installed if reading or parsing
    /// fails.
    pub fn set_key_from_file(
        &self,
        kid: &str,
        alg: Algorithm,
        sign_key_file: impl AsRef<Path>,
        verify_key_file: Option<&Path>,
    ) -> Result<()> {
        if kid.is_empty() {
            return Err(Error::EmptyKid);
        }
        let key = Key::from_files(alg, sign_key_file.as_ref(), verify_key_file)?;
        self.set_key(kid, key)
    }

    /// Key registered under `kid`.
    pub fn get_key(&self, kid: &str) -> Result<Arc<Key>> {
        if kid.is_empty() {
            return Err(Error::EmptyKid);
        }
        self.read()?
            .get(kid)
            .cloned()
            .ok_or_else(|| Error::KeyNotFound(kid.to_string()))
    }

    /// Remove the key registered under `kid`.
    pub fn delete_key(&self, kid: &str) -> Result<()> {
        if !self.contains(kid)? {
            return Err(Error::KeyNotFound(kid.to_string()));
        }
        // A concurrent delete may win between the check and here; the entry is
        // gone either way.
        self.write()?.remove(kid);
        tracing::debug!(kid, "deleted key");
        Ok(())
    }

    /// True if a key is registered under `kid`.
    pub fn contains(&self, kid: &str) -> Result<bool> {
        Ok(self.read()?.contains_key(kid))
    }

    /// Registered kids, sorted.
    pub fn kids(&self) -> Result<Vec<String>> {
        let mut kids: Vec<String> = self.read()?.keys().cloned().collect();
        kids.sort();
        Ok(kids)
    }

    /// Number of registered keys.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    /// True if no keys are registered.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    /// Sign `claims` with the key registered under `kid`, writing `kid` into
    /// the token header.
    pub fn sign<I>(&self, kid: &str, claims: I) -> Result<String>
    where
        I: IntoIterator<Item = Claim>,
    {
        let key = self.get_key(kid)?;
        let claims = ClaimSet::from_claims(claims);
        token::encode(key.algorithm(), key.signing_key(), Some(kid), &claims)
    }

    /// Verify a token produced by [`KeyRegistry::sign`].
    ///
    /// The header `kid` selects the key, and the header `alg` must be the
    /// algorithm that key was registered with.
    pub fn parse(&self, token: &str) -> Result<RegistryToken> {
        let parts = token::split(token)?;
        let header = token::decode_header(&parts)?;

        let kid = match &header.kid {
            None => return Err(Error::KidNotFound),
            Some(Value::String(kid)) => kid.clone(),
            Some(_) => return Err(Error::KidType),
        };

        let key = self.get_key(&kid).inspect_err(|_| {
            tracing::debug!(kid = %kid, "rejecting token: unknown kid");
        })?;
        let claims = token::verify_and_decode(
            &parts,
            &header,
            key.algorithm(),
            key.verifying_key(),
            &ParserOptions::default(),
        )?;

        Ok(RegistryToken { kid, claims })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use std::path::PathBuf;

    fn testdata(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata").join(name)
    }

    fn registry_with_all_algorithms() -> KeyRegistry {
        let registry = KeyRegistry::new();
        for (i, alg) in Algorithm::SUPPORTED.into_iter().enumerate() {
            let kid = format!("{:02}", i + 1);
            let (sign, verify) = match alg {
                Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => ("hmac.key", None),
                Algorithm::ES256 => ("ecdsa_256_priv.pem", Some("ecdsa_256_pub.pem")),
                Algorithm::ES384 => ("ecdsa_384_priv.pem", Some("ecdsa_384_pub.pem")),
                Algorithm::ES512 => ("ecdsa_521_priv.pem", Some("ecdsa_521_pub.pem")),
                _ => ("rsa_2048_priv.pem", Some("rsa_2048_pub.pem")),
            };
            let verify = verify.map(testdata);
            registry
                .set_key_from_file(&kid, alg, testdata(sign), verify.as_deref())
                .unwrap();
        }
        registry
    }

    #[test]
    fn header_kid_round_trip_for_every_algorithm() {
        let registry = registry_with_all_algorithms();
        assert_eq!(registry.len().unwrap(), 12);

        for (i, kid) in registry.kids().unwrap().into_iter().enumerate() {
            let token = registry.sign(&kid, [Claim::new("uid", i + 1)]).unwrap();
            let parsed = registry.parse(&token).unwrap();
            assert_eq!(parsed.kid, kid);
            assert_eq!(parsed.claims.get_i64("uid"), Some(i64::try_from(i + 1).unwrap()));
        }
    }

    #[test]
    fn lookups_are_isolated_per_kid() {
        let registry = KeyRegistry::new();
        registry.set_key("kid1", Key::new(Algorithm::HS256, b"one", None).unwrap()).unwrap();
        assert!(matches!(registry.get_key("kid2"), Err(Error::KeyNotFound(kid)) if kid == "kid2"));

        registry.set_key("kid2", Key::new(Algorithm::HS256, b"two", None).unwrap()).unwrap();
        registry.delete_key("kid1").unwrap();

        assert!(matches!(registry.get_key("kid1"), Err(Error::KeyNotFound(_))));
        assert_eq!(registry.get_key("kid2").unwrap().algorithm(), Algorithm::HS256);
        assert!(matches!(registry.delete_key("kid1"), Err(Error::KeyNotFound(_))));
        assert_eq!(registry.kids().unwrap(), vec!["kid2".to_string()]);
    }

    #[test]
    fn set_key_replaces_previous_entry() {
        let registry = KeyRegistry::new();
        registry.set_key("k", Key::new(Algorithm::HS256, b"old", None).unwrap()).unwrap();
        let old_token = registry.sign("k", [Claim::new("v", 1)]).unwrap();

        registry.set_key("k", Key::new(Algorithm::HS384, b"new", None).unwrap()).unwrap();
        assert_eq!(registry.get_key("k").unwrap().algorithm(), Algorithm::HS384);
        assert!(matches!(registry.parse(&old_token), Err(Error::InvalidToken)));
    }

    #[test]
    fn failed_loads_install_nothing() {
        let registry = KeyRegistry::new();
        assert!(matches!(
            registry.set_key_from_file("k", Algorithm::HS256, "/no/such/key", None),
            Err(Error::Io(_))
        ));
        assert!(matches!(
            registry.set_key_from_file("k", Algorithm::None, testdata("hmac.key"), None),
            Err(Error::InvalidAlgorithm(_))
        ));
        assert!(matches!(
            registry.set_key_from_file(
                "k",
                Algorithm::ES256,
                testdata("rsa_2048_priv.pem"),
                Some(&testdata("not_there.pem"))
            ),
            Err(Error::Io(_))
        ));
        assert!(matches!(
            registry.set_key_from_file("", Algorithm::HS256, testdata("hmac.key"), None),
            Err(Error::EmptyKid)
        ));
        assert!(registry.is_empty().unwrap());
    }

    #[test]
    fn header_kid_errors() {
        let registry = KeyRegistry::new();
        registry.set_key("k", Key::new(Algorithm::HS256, b"secret", None).unwrap()).unwrap();

        let payload = URL_SAFE_NO_PAD.encode(br#"{"uid":"1"}"#);
        let no_kid = format!("{}.{payload}.sig", URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256"}"#));
        assert!(matches!(registry.parse(&no_kid), Err(Error::KidNotFound)));

        let bad_kid = format!(
            "{}.{payload}.sig",
            URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","kid":7}"#)
        );
        assert!(matches!(registry.parse(&bad_kid), Err(Error::KidType)));

        let unknown = format!(
            "{}.{payload}.sig",
            URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","kid":"other"}"#)
        );
        assert!(matches!(registry.parse(&unknown), Err(Error::KeyNotFound(_))));

        assert!(matches!(registry.parse("only.two"), Err(Error::InvalidPartCount(2))));
        assert!(matches!(registry.sign("missing", Vec::<Claim>::new()), Err(Error::KeyNotFound(_))));
    }

    #[test]
    fn header_alg_must_match_registered_key() {
        let registry = KeyRegistry::new();
        registry.set_key("k", Key::new(Algorithm::HS256, b"secret", None).unwrap()).unwrap();

        let other = KeyRegistry::new();
        other.set_key("k", Key::new(Algorithm::HS512, b"secret", None).unwrap()).unwrap();
        let token = other.sign("k", [Claim::new("uid", "1")]).unwrap();

        assert!(matches!(registry.parse(&token), Err(Error::InvalidToken)));
    }

    #[test]
    fn expired_tokens_are_rejected_after_lookup() {
        let registry = KeyRegistry::new();
        registry.set_key("k", Key::new(Algorithm::HS256, b"secret", None).unwrap()).unwrap();

        let token = registry.sign("k", [Claim::new("exp", 1)]).unwrap();
        assert!(matches!(registry.parse(&token), Err(Error::Expired)));
    }

    #[test]
    fn payload_kid_is_not_a_header_kid() {
        let registry = KeyRegistry::new();
        let key = Key::new(Algorithm::HS256, b"secret", None).unwrap();
        let token = key
            .signer()
            .signed_string([Claim::new("kid", "k")])
            .unwrap();
        registry.set_key("k", key).unwrap();

        assert!(matches!(registry.parse(&token), Err(Error::KidNotFound)));
    }

    #[cfg(feature = "global")]
    #[test]
    fn global_registry_is_shared() {
        let kid = "registry-tests-global";
        KeyRegistry::global()
            .set_key(kid, Key::new(Algorithm::HS256, b"secret", None).unwrap())
            .unwrap();
        assert!(KeyRegistry::global().contains(kid).unwrap());
        KeyRegistry::global().delete_key(kid).unwrap();
        assert!(!KeyRegistry::global().contains(kid).unwrap());
    }
}
