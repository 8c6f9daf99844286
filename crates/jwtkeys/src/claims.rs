//! Claims and claim sets.

use crate::{Error, Result};
use serde_json::{Map, Number, Value};
use std::time::{SystemTime, UNIX_EPOCH};

/// Whole seconds since the Unix epoch, rounded towards negative infinity.
pub(crate) fn unix_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => i64::try_from(d.as_secs()).unwrap_or(i64::MAX),
        Err(e) => {
            let before = e.duration();
            let secs = i64::try_from(before.as_secs()).map_or(i64::MIN, |s| -s);
            if before.subsec_nanos() > 0 {
                secs.saturating_sub(1)
            } else {
                secs
            }
        }
    }
}

/// One named claim, applied in order when a token payload is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Claim {
    name: String,
    value: Value,
}

impl Claim {
    /// Claim with any JSON-convertible value.
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Claim holding a Unix timestamp in whole seconds.
    ///
    /// Times before the epoch are stored as negative seconds, rounded down.
    pub fn time(name: impl Into<String>, value: SystemTime) -> Self {
        Self::new(name, unix_seconds(value))
    }

    /// Claim name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Claim value.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// A decoded or to-be-signed claim set (the JWT payload object).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClaimSet {
    claims: Map<String, Value>,
}

impl ClaimSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply claims in order. A later claim replaces an earlier one with the same name.
    pub fn from_claims<I>(claims: I) -> Self
    where
        I: IntoIterator<Item = Claim>,
    {
        let mut set = Self::new();
        set.extend(claims);
        set
    }

    /// Insert or replace one claim.
    pub fn insert(&mut self, claim: Claim) {
        self.claims.insert(claim.name, claim.value);
    }

    /// Get a claim by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// Convenience accessor for string claims.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Convenience accessor for integer claims.
    ///
    /// Integral floats (`100.0`) also read back as integers, so the value does not
    /// depend on how the parser was told to decode numbers.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        let n = self.get(name)?.as_number()?;
        n.as_i64().or_else(|| integral_f64(n))
    }

    /// Convenience accessor for numeric claims as floats.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    /// True if the claim is present.
    pub fn contains(&self, name: &str) -> bool {
        self.claims.contains_key(name)
    }

    /// Number of claims.
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    /// True if there are no claims.
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.claims.iter()
    }

    /// The underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.claims
    }

    /// Take the underlying JSON object.
    pub fn into_map(self) -> Map<String, Value> {
        self.claims
    }

    /// Take the claims as a JSON object value.
    pub fn into_value(self) -> Value {
        Value::Object(self.claims)
    }

    /// Check `exp`, `nbf` and `iat` against `now` (Unix seconds), allowing
    /// `leeway` seconds of clock skew. Absent claims are not checked.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn check_time_claims(&self, now: i64, leeway: u64) -> Result<()> {
        let (now, leeway) = (now as f64, leeway as f64);
        if self.time_claim("exp")?.is_some_and(|exp| now > exp + leeway) {
            return Err(Error::Expired);
        }
        if self.time_claim("nbf")?.is_some_and(|nbf| nbf > now + leeway) {
            return Err(Error::NotYetValid);
        }
        if self.time_claim("iat")?.is_some_and(|iat| iat > now + leeway) {
            return Err(Error::UsedBeforeIssued);
        }
        Ok(())
    }

    fn time_claim(&self, name: &str) -> Result<Option<f64>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(Some)
                .ok_or_else(|| Error::InvalidTimeClaim(name.to_string())),
            Some(_) => Err(Error::InvalidTimeClaim(name.to_string())),
        }
    }

    /// Rewrite every number, at any depth, as an `f64` JSON number.
    pub(crate) fn numbers_to_f64(&mut self) {
        for value in self.claims.values_mut() {
            value_numbers_to_f64(value);
        }
    }
}

impl From<Map<String, Value>> for ClaimSet {
    fn from(claims: Map<String, Value>) -> Self {
        Self { claims }
    }
}

impl Extend<Claim> for ClaimSet {
    fn extend<I: IntoIterator<Item = Claim>>(&mut self, iter: I) {
        for claim in iter {
            self.insert(claim);
        }
    }
}

impl FromIterator<Claim> for ClaimSet {
    fn from_iter<I: IntoIterator<Item = Claim>>(iter: I) -> Self {
        Self::from_claims(iter)
    }
}

fn value_numbers_to_f64(value: &mut Value) {
    match value {
        Value::Number(n) => {
            // Out-of-range numbers have no finite f64 form; they are left as they were.
            if let Some(f) = n.as_f64().and_then(Number::from_f64) {
                *n = f;
            }
        }
        Value::Array(items) => items.iter_mut().for_each(value_numbers_to_f64),
        Value::Object(map) => map.values_mut().for_each(value_numbers_to_f64),
        Value::Null | Value::Bool(_) | Value::String(_) => {}
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn integral_f64(n: &Number) -> Option<i64> {
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}
