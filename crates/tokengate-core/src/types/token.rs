use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the creation timestamp field in a stored record.
pub const TIMESTAMP_FIELD: &str = "_ts";

/// Caller-supplied claims about the authenticated principal.
pub type Claims = Map<String, Value>;

/// Opaque bearer token: lowercase hex of secure-random bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Wraps an already-validated hex string. Use the codec to build tokens
    /// from untrusted input.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Leading characters only, safe to put in logs.
    pub fn fingerprint(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// What the store keeps for a token. The creation timestamp sits next to
/// the claims so a caller-supplied `_ts` claim never collides with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub claims: Claims,
    #[serde(rename = "_ts")]
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(claims: Claims) -> Self {
        Self {
            claims,
            created_at: Utc::now(),
        }
    }

    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// Claims with `_ts` added, the shape older clients expect. A `_ts`
    /// claim supplied by the caller is shadowed in this view only.
    pub fn flatten(&self) -> Claims {
        let mut flat = self.claims.clone();
        flat.insert(
            TIMESTAMP_FIELD.to_string(),
            Value::String(self.created_at.to_rfc3339()),
        );
        flat
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueTokenRequest {
    #[serde(default)]
    pub claims: Value,
    pub ttl_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueTokenResponse {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_keeps_timestamp_apart() {
        let mut claims = Claims::new();
        claims.insert("_ts".into(), json!("caller value"));
        claims.insert("id".into(), json!(1));
        let record = SessionRecord::new(claims);

        let encoded = serde_json::to_value(&record).unwrap();
        assert_eq!(encoded["claims"]["_ts"], "caller value");
        assert!(encoded["_ts"].is_string());

        let decoded: SessionRecord = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, record);
        assert_eq!(decoded.claim("_ts"), Some(&json!("caller value")));
    }

    #[test]
    fn test_flatten_adds_timestamp() {
        let mut claims = Claims::new();
        claims.insert("firstname".into(), json!("John"));
        let record = SessionRecord::new(claims);
        let flat = record.flatten();
        assert_eq!(flat["firstname"], "John");
        assert_eq!(flat[TIMESTAMP_FIELD], json!(record.created_at.to_rfc3339()));
        assert_eq!(flat.len(), 2);
    }

    #[test]
    fn test_token_fingerprint() {
        let token = Token::from_hex("0123456789abcdef");
        assert_eq!(token.fingerprint(), "01234567");
        assert_eq!(Token::from_hex("ab").fingerprint(), "ab");
        assert_eq!(Token::from_hex("ééééééééé").fingerprint(), "éééééééé");
    }
}
