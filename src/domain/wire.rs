//! Flat wire records for outcomes
//!
//! Consumers exchange outcomes as `{"success": bool, "violates": ..., "cwtClaims": ...}`.
//! Encoding always writes every key. Decoding accepts a missing payload key as `null` and
//! rejects every pairing the outcome types cannot represent.

use crate::domain::claims::CwtClaims;
use crate::domain::outcome::{CheckResult, CwtClaimsResult};
use crate::domain::violations::{VerdictError, VerdictResult, Violates};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Flat form of a `CheckResult`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckRecord {
    pub success: bool,
    #[serde(default)]
    pub violates: Option<Violates>,
}

/// Flat form of a `CwtClaimsResult`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimsRecord {
    pub success: bool,
    #[serde(default)]
    pub violates: Option<Violates>,
    #[serde(rename = "cwtClaims", default)]
    pub cwt_claims: Option<CwtClaims>,
}

impl TryFrom<CheckRecord> for CheckResult {
    type Error = VerdictError;

    fn try_from(record: CheckRecord) -> VerdictResult<Self> {
        match (record.success, record.violates) {
            (true, None) => Ok(CheckResult::Success),
            (false, Some(violates)) => Ok(CheckResult::Failure(violates)),
            (true, Some(_)) => Err(VerdictError::contract(
                "`violates` must be null when `success` is true",
            )),
            (false, None) => Err(VerdictError::contract(
                "`violates` must be present when `success` is false",
            )),
        }
    }
}

impl From<CheckResult> for CheckRecord {
    fn from(result: CheckResult) -> Self {
        match result {
            CheckResult::Success => Self {
                success: true,
                violates: None,
            },
            CheckResult::Failure(violates) => Self {
                success: false,
                violates: Some(violates),
            },
        }
    }
}

impl TryFrom<ClaimsRecord> for CwtClaimsResult {
    type Error = VerdictError;

    fn try_from(record: ClaimsRecord) -> VerdictResult<Self> {
        match (record.success, record.violates, record.cwt_claims) {
            (true, None, Some(claims)) => Ok(CwtClaimsResult::Success(claims)),
            (false, Some(violates), None) => Ok(CwtClaimsResult::Failure(violates)),
            (true, Some(_), _) => Err(VerdictError::contract(
                "`violates` must be null when `success` is true",
            )),
            (true, None, None) => Err(VerdictError::contract(
                "`cwtClaims` must be present when `success` is true",
            )),
            (false, None, _) => Err(VerdictError::contract(
                "`violates` must be present when `success` is false",
            )),
            (false, Some(_), Some(_)) => Err(VerdictError::contract(
                "`cwtClaims` must be null when `success` is false",
            )),
        }
    }
}

impl From<CwtClaimsResult> for ClaimsRecord {
    fn from(result: CwtClaimsResult) -> Self {
        match result {
            CwtClaimsResult::Success(claims) => Self {
                success: true,
                violates: None,
                cwt_claims: Some(claims),
            },
            CwtClaimsResult::Failure(violates) => Self {
                success: false,
                violates: Some(violates),
                cwt_claims: None,
            },
        }
    }
}

/// Either outcome shape, as found in a record of unknown kind
#[derive(Debug, Clone, PartialEq)]
pub enum WireOutcome {
    Check(CheckResult),
    Claims(CwtClaimsResult),
}

impl WireOutcome {
    /// Decode a JSON value, picking the claims shape when it has a `cwtClaims` key.
    ///
    /// Structural problems (not an object, wrong field types) are `Decode` errors attributed
    /// to `source_label`; pairings the outcome types forbid are `Contract` errors.
    pub fn from_value(value: JsonValue, source_label: &str) -> VerdictResult<Self> {
        let has_claims_key = value
            .as_object()
            .map(|object| object.contains_key("cwtClaims"))
            .ok_or_else(|| VerdictError::decode(source_label, "record is not a JSON object"))?;

        if has_claims_key {
            let record: ClaimsRecord = serde_json::from_value(value)
                .map_err(|e| VerdictError::decode(source_label, e.to_string()))?;
            Ok(Self::Claims(CwtClaimsResult::try_from(record)?))
        } else {
            let record: CheckRecord = serde_json::from_value(value)
                .map_err(|e| VerdictError::decode(source_label, e.to_string()))?;
            Ok(Self::Check(CheckResult::try_from(record)?))
        }
    }

    /// The outcome without any claims payload
    pub fn as_check(&self) -> CheckResult {
        match self {
            Self::Check(result) => result.clone(),
            Self::Claims(result) => result.as_check(),
        }
    }

    pub fn cwt_claims(&self) -> Option<&CwtClaims> {
        match self {
            Self::Check(_) => None,
            Self::Claims(result) => result.cwt_claims(),
        }
    }

    /// Encode back into the flat record
    pub fn to_value(&self) -> VerdictResult<JsonValue> {
        let record = match self {
            Self::Check(result) => serde_json::to_value(result),
            Self::Claims(result) => serde_json::to_value(result),
        };
        record.map_err(|e| VerdictError::report(format!("Failed to encode outcome: {e}")))
    }
}
