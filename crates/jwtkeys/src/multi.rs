//! Multi-key dispatch: pick a signer or parser by kid, with the kid carried
//! inside the signed claims.

use crate::{Claim, ClaimSet, Error, Parser, Result, Signer, token};
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;

/// Claim name carrying the kid in multi-key tokens.
pub const KID_CLAIM: &str = "kid";

/// Signs with one of several signers chosen by kid.
///
/// The kid is added to the claims as `"kid"`, so it is covered by the
/// signature. Pair with [`MultiKeyParser`].
#[derive(Debug, Default)]
pub struct MultiKeySigner {
    signers: DashMap<String, Arc<Signer>>,
}

impl MultiKeySigner {
    /// Empty signer set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `signer` under `kid`, replacing any previous signer.
    pub fn set(&self, kid: impl Into<String>, signer: Signer) -> Result<()> {
        let kid = kid.into();
        if kid.is_empty() {
            return Err(Error::InvalidMultiKeySigner);
        }
        self.signers.insert(kid, Arc::new(signer));
        Ok(())
    }

    /// Signer registered under `kid`.
    pub fn get(&self, kid: &str) -> Option<Arc<Signer>> {
        self.signers.get(kid).map(|entry| Arc::clone(entry.value()))
    }

    /// Remove and return the signer registered under `kid`.
    pub fn remove(&self, kid: &str) -> Option<Arc<Signer>> {
        self.signers.remove(kid).map(|(_, signer)| signer)
    }

    /// Registered kids, sorted.
    pub fn kids(&self) -> Vec<String> {
        let mut kids: Vec<String> = self.signers.iter().map(|e| e.key().clone()).collect();
        kids.sort();
        kids
    }

    /// Number of registered signers.
    pub fn len(&self) -> usize {
        self.signers.len()
    }

    /// True if no signers are registered.
    pub fn is_empty(&self) -> bool {
        self.signers.is_empty()
    }

    /// Sign `claims` plus `kid = <kid>` with the signer registered under `kid`.
    ///
    /// The kid claim is applied last, so it replaces any `kid` the caller
    /// passed.
    pub fn signed_string<I>(&self, kid: &str, claims: I) -> Result<String>
    where
        I: IntoIterator<Item = Claim>,
    {
        let signer = self
            .get(kid)
            .ok_or_else(|| Error::SignerNotFound(kid.to_string()))?;
        signer.signed_string(claims.into_iter().chain([Claim::new(KID_CLAIM, kid)]))
    }
}

/// Verifies tokens from a [`MultiKeySigner`], choosing the parser by the
/// `kid` claim.
#[derive(Debug, Default)]
pub struct MultiKeyParser {
    parsers: DashMap<String, Arc<Parser>>,
}

impl MultiKeyParser {
    /// Empty parser set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `parser` under `kid`, replacing any previous parser.
    pub fn set(&self, kid: impl Into<String>, parser: Parser) -> Result<()> {
        let kid = kid.into();
        if kid.is_empty() {
            return Err(Error::InvalidMultiKeyParser);
        }
        self.parsers.insert(kid, Arc::new(parser));
        Ok(())
    }

    /// Parser registered under `kid`.
    pub fn get(&self, kid: &str) -> Option<Arc<Parser>> {
        self.parsers.get(kid).map(|entry| Arc::clone(entry.value()))
    }

    /// Remove and return the parser registered under `kid`.
    pub fn remove(&self, kid: &str) -> Option<Arc<Parser>> {
        self.parsers.remove(kid).map(|(_, parser)| parser)
    }

    /// Registered kids, sorted.
    pub fn kids(&self) -> Vec<String> {
        let mut kids: Vec<String> = self.parsers.iter().map(|e| e.key().clone()).collect();
        kids.sort();
        kids
    }

    /// Number of registered parsers.
    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    /// True if no parsers are registered.
    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    /// Verify `token` with the parser named by its `kid` claim.
    ///
    /// The kid is read from the payload before the signature is checked; it only
    /// selects the parser. The returned claims come from the verified parse.
    pub fn parse(&self, token: &str) -> Result<ClaimSet> {
        let unverified = token::parse_claims_unverified(token)?;
        let kid = match unverified.get(KID_CLAIM) {
            None => return Err(Error::KidNotFound),
            Some(Value::String(kid)) => kid.as_str(),
            Some(_) => return Err(Error::KidType),
        };

        let parser = self.get(kid).ok_or_else(|| {
            tracing::debug!(kid, "rejecting token: no parser for kid");
            Error::ParserNotFound(kid.to_string())
        })?;
        parser.parse(token)
    }
}
