//! Compact token encoding: `b64(header).b64(payload).b64(signature)`.

use crate::claims::unix_seconds;
use crate::crypto::{SigningKey, VerifyingKey};
use crate::{Algorithm, ClaimSet, Error, ParserOptions, Result};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::SystemTime;

/// Header written when signing.
#[derive(Debug, Serialize)]
struct Header<'a> {
    alg: &'static str,
    typ: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kid: Option<&'a str>,
}

/// The parts of a received header this crate looks at.
#[derive(Debug, Deserialize)]
pub(crate) struct DecodedHeader {
    pub(crate) alg: String,
    #[serde(default)]
    pub(crate) kid: Option<Value>,
}

/// A token split into its three segments.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TokenParts<'a> {
    /// `header.payload`, the bytes the signature covers.
    pub(crate) signing_input: &'a str,
    pub(crate) header: &'a str,
    pub(crate) payload: &'a str,
    pub(crate) signature: &'a str,
}

pub(crate) fn split(token: &str) -> Result<TokenParts<'_>> {
    let segments: Vec<&str> = token.split('.').collect();
    let [header, payload, signature] = segments[..] else {
        return Err(Error::InvalidPartCount(segments.len()));
    };
    Ok(TokenParts {
        signing_input: &token[..header.len() + 1 + payload.len()],
        header,
        payload,
        signature,
    })
}

pub(crate) fn decode_header(parts: &TokenParts<'_>) -> Result<DecodedHeader> {
    let bytes = URL_SAFE_NO_PAD.decode(parts.header)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn decode_payload(payload: &str) -> Result<ClaimSet> {
    let bytes = URL_SAFE_NO_PAD.decode(payload)?;
    let claims: Map<String, Value> = serde_json::from_slice(&bytes)?;
    Ok(ClaimSet::from(claims))
}

/// Serialise and sign. `kid` goes into the header when given.
pub(crate) fn encode(
    alg: Algorithm,
    key: &SigningKey,
    kid: Option<&str>,
    claims: &ClaimSet,
) -> Result<String> {
    let header = Header {
        alg: alg.as_str(),
        typ: "JWT",
        kid,
    };
    let header = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims.as_map())?);
    let signing_input = format!("{header}.{payload}");
    let signature = key.sign(alg, signing_input.as_bytes())?;
    Ok(format!("{signing_input}.{signature}"))
}

/// Check the header algorithm and the signature, then decode the claims and
/// check their time claims.
pub(crate) fn verify_and_decode(
    parts: &TokenParts<'_>,
    header: &DecodedHeader,
    alg: Algorithm,
    key: &VerifyingKey,
    options: &ParserOptions,
) -> Result<ClaimSet> {
    if header.alg != alg.as_str() {
        tracing::debug!(expected = %alg, found = %header.alg, "rejecting token: algorithm mismatch");
        return Err(Error::InvalidToken);
    }

    let signature = URL_SAFE_NO_PAD.decode(parts.signature)?;
    if !key.verify(alg, parts.signing_input.as_bytes(), &signature)? {
        tracing::debug!(alg = %alg, "rejecting token: signature mismatch");
        return Err(Error::InvalidToken);
    }

    let mut claims = decode_payload(parts.payload)?;
    claims
        .check_time_claims(unix_seconds(SystemTime::now()), options.leeway_seconds)
        .inspect_err(|e| tracing::debug!(error = %e, "rejecting token: time claims"))?;
    if !options.decode_numbers_as_exact_decimal {
        claims.numbers_to_f64();
    }
    Ok(claims)
}

/// Decode the payload without checking the signature.
///
/// Only for reading a routing hint such as an embedded `kid` before picking the
/// key that verifies the token. Nothing returned here is trustworthy until the
/// same token has passed [`Parser::parse`](crate::Parser::parse).
pub fn parse_claims_unverified(token: &str) -> Result<ClaimSet> {
    let parts = split(token)?;
    decode_payload(parts.payload)
}
