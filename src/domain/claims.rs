//! CWT claims payload carried by successful claims outcomes
//!
//! Registered claim names follow RFC 8392 section 3.1. Anything else a token carries
//! (public or private claims) is kept verbatim in `extra` so nothing is lost on the way
//! from the validator to the consumer.

use crate::domain::violations::{VerdictError, VerdictResult};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Claims extracted from a validated CWT
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CwtClaims {
    /// Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Subject
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Audience
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    /// Expiration time as a NumericDate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Not-before time as a NumericDate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    /// Issued-at time as a NumericDate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// CWT ID, hex encoded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cti: Option<String>,
    /// Every claim that is not a registered one
    #[serde(flatten)]
    extra: BTreeMap<String, JsonValue>,
}

impl CwtClaims {
    /// Start building a claims set
    pub fn builder() -> CwtClaimsBuilder {
        CwtClaimsBuilder::default()
    }

    /// Expiration time, if present and representable
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(numeric_date)
    }

    /// Not-before time, if present and representable
    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        self.nbf.and_then(numeric_date)
    }

    /// Issued-at time, if present and representable
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.iat.and_then(numeric_date)
    }

    /// Look up a non-registered claim by name
    pub fn claim(&self, name: &str) -> Option<&JsonValue> {
        self.extra.get(name)
    }

    /// All non-registered claims, ordered by name
    pub fn extra_claims(&self) -> &BTreeMap<String, JsonValue> {
        &self.extra
    }

    /// Set a claim by name. Registered names go to their typed field and must have its type.
    pub fn set_claim(&mut self, name: impl Into<String>, value: JsonValue) -> VerdictResult<()> {
        let name = name.into();
        match name.as_str() {
            "iss" | "sub" | "aud" | "cti" => {
                let text = value.as_str().map(str::to_string).ok_or_else(|| {
                    VerdictError::claims(format!("claim `{name}` must be a string, got {value}"))
                })?;
                let field = match name.as_str() {
                    "iss" => &mut self.iss,
                    "sub" => &mut self.sub,
                    "aud" => &mut self.aud,
                    _ => &mut self.cti,
                };
                *field = Some(text);
            }
            "exp" | "nbf" | "iat" => {
                let seconds = value.as_i64().ok_or_else(|| {
                    VerdictError::claims(format!(
                        "claim `{name}` must be an integer NumericDate, got {value}"
                    ))
                })?;
                let field = match name.as_str() {
                    "exp" => &mut self.exp,
                    "nbf" => &mut self.nbf,
                    _ => &mut self.iat,
                };
                *field = Some(seconds);
            }
            _ => {
                self.extra.insert(name.clone(), value);
            }
        }
        Ok(())
    }

    /// Whether the claims set carries no claim at all
    pub fn is_empty(&self) -> bool {
        self.iss.is_none()
            && self.sub.is_none()
            && self.aud.is_none()
            && self.exp.is_none()
            && self.nbf.is_none()
            && self.iat.is_none()
            && self.cti.is_none()
            && self.extra.is_empty()
    }
}

fn numeric_date(seconds: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(seconds, 0).single()
}

/// Builder for programmatic construction of claims
#[derive(Debug, Default)]
pub struct CwtClaimsBuilder {
    claims: CwtClaims,
    error: Option<VerdictError>,
}

impl CwtClaimsBuilder {
    pub fn issuer(mut self, iss: impl Into<String>) -> Self {
        self.claims.iss = Some(iss.into());
        self
    }

    pub fn subject(mut self, sub: impl Into<String>) -> Self {
        self.claims.sub = Some(sub.into());
        self
    }

    pub fn audience(mut self, aud: impl Into<String>) -> Self {
        self.claims.aud = Some(aud.into());
        self
    }

    pub fn expiration(mut self, exp: i64) -> Self {
        self.claims.exp = Some(exp);
        self
    }

    pub fn not_before(mut self, nbf: i64) -> Self {
        self.claims.nbf = Some(nbf);
        self
    }

    pub fn issued_at(mut self, iat: i64) -> Self {
        self.claims.iat = Some(iat);
        self
    }

    pub fn cwt_id(mut self, cti: impl Into<String>) -> Self {
        self.claims.cti = Some(cti.into());
        self
    }

    /// Add a claim by name, see `CwtClaims::set_claim`
    pub fn claim(mut self, name: impl Into<String>, value: JsonValue) -> Self {
        if let Err(e) = self.claims.set_claim(name, value) {
            self.error.get_or_insert(e);
        }
        self
    }

    /// Finish the claims set, failing on the first rejected claim
    pub fn build(self) -> VerdictResult<CwtClaims> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.claims),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_and_dates() {
        let claims = CwtClaims::builder()
            .issuer("coap://as.example.com")
            .subject("erikw")
            .audience("coap://light.example.com")
            .expiration(1444064944)
            .not_before(1443944944)
            .issued_at(1443944944)
            .cwt_id("0b71")
            .build()
            .unwrap();

        assert_eq!(claims.iss.as_deref(), Some("coap://as.example.com"));
        assert_eq!(
            claims.expires_at().map(|d| d.to_rfc3339()),
            Some("2015-10-05T17:09:04+00:00".to_string())
        );
        assert_eq!(claims.not_before(), claims.issued_at());
        assert!(!claims.is_empty());
    }

    #[test]
    fn test_extra_claims_are_flattened() {
        let claims: CwtClaims = serde_json::from_value(json!({
            "iss": "DE",
            "exp": 1700000000,
            "hcert": { "v": [] }
        }))
        .unwrap();

        assert_eq!(claims.iss.as_deref(), Some("DE"));
        assert_eq!(claims.claim("hcert"), Some(&json!({ "v": [] })));

        let encoded = serde_json::to_value(&claims).unwrap();
        assert_eq!(encoded["hcert"], json!({ "v": [] }));
        assert!(encoded.get("sub").is_none());
    }

    #[test]
    fn test_empty_claims() {
        let claims = CwtClaims::default();
        assert!(claims.is_empty());
        assert_eq!(claims.expires_at(), None);
    }

    #[test]
    fn test_unrepresentable_date() {
        let claims = CwtClaims::builder().expiration(i64::MAX).build().unwrap();
        assert_eq!(claims.expires_at(), None);
    }

    #[test]
    fn test_registered_names_route_to_typed_fields() {
        let claims = CwtClaims::builder()
            .issuer("DE")
            .claim("iss", json!("FR"))
            .claim("exp", json!(1700000000))
            .claim("hcert", json!({}))
            .build()
            .unwrap();

        assert_eq!(claims.iss.as_deref(), Some("FR"));
        assert_eq!(claims.exp, Some(1700000000));
        assert_eq!(claims.extra_claims().len(), 1);

        let encoded = serde_json::to_string(&claims).unwrap();
        assert_eq!(encoded.matches("\"iss\"").count(), 1);
        let decoded: CwtClaims = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_registered_names_with_wrong_type_rejected() {
        let err = CwtClaims::builder()
            .claim("exp", json!("soon"))
            .build()
            .unwrap_err();
        assert!(matches!(err, VerdictError::Claims { .. }));
        assert!(err.to_string().contains("`exp`"));

        let mut claims = CwtClaims::default();
        assert!(claims.set_claim("sub", json!(42)).is_err());
        assert!(claims.is_empty());
    }
}
