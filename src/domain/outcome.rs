//! Success/failure outcomes reported by claims validators
//!
//! Architecture: Sum Types - each outcome is exactly one of two constructors
//! - `Success` carries the payload (nothing, or the claims), `Failure` carries a `Violates`
//! - The discriminant is the only thing a consumer has to look at
//! - The flat `{success, violates, cwtClaims}` record exists only on the wire (see `wire`)

use crate::domain::claims::CwtClaims;
use crate::domain::violations::Violates;
use crate::domain::wire::{CheckRecord, ClaimsRecord};
use serde::{Deserialize, Serialize};

/// Common view over every outcome shape
pub trait Outcome {
    /// Whether the outcome is the success branch
    fn is_success(&self) -> bool;

    /// The violation carried by the failure branch
    fn violates(&self) -> Option<&Violates>;

    fn is_failure(&self) -> bool {
        !self.is_success()
    }
}

/// Pass/fail outcome of a generic check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CheckRecord", into = "CheckRecord")]
pub enum CheckResult {
    Success,
    Failure(Violates),
}

impl CheckResult {
    pub fn success() -> Self {
        Self::Success
    }

    pub fn failure(violates: Violates) -> Self {
        Self::Failure(violates)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    pub fn violates(&self) -> Option<&Violates> {
        match self {
            Self::Success => None,
            Self::Failure(violates) => Some(violates),
        }
    }

    pub fn into_violates(self) -> Option<Violates> {
        match self {
            Self::Success => None,
            Self::Failure(violates) => Some(violates),
        }
    }

    /// Convert into a standard `Result` so callers can use `?`
    pub fn into_result(self) -> Result<(), Violates> {
        self.into()
    }
}

impl Outcome for CheckResult {
    fn is_success(&self) -> bool {
        CheckResult::is_success(self)
    }

    fn violates(&self) -> Option<&Violates> {
        CheckResult::violates(self)
    }
}

impl From<Result<(), Violates>> for CheckResult {
    fn from(result: Result<(), Violates>) -> Self {
        match result {
            Ok(()) => Self::Success,
            Err(violates) => Self::Failure(violates),
        }
    }
}

impl From<CheckResult> for Result<(), Violates> {
    fn from(result: CheckResult) -> Self {
        match result {
            CheckResult::Success => Ok(()),
            CheckResult::Failure(violates) => Err(violates),
        }
    }
}

/// Outcome of validating a CWT and extracting its claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ClaimsRecord", into = "ClaimsRecord")]
pub enum CwtClaimsResult {
    Success(CwtClaims),
    Failure(Violates),
}

impl CwtClaimsResult {
    pub fn success(claims: CwtClaims) -> Self {
        Self::Success(claims)
    }

    pub fn failure(violates: Violates) -> Self {
        Self::Failure(violates)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    pub fn violates(&self) -> Option<&Violates> {
        match self {
            Self::Success(_) => None,
            Self::Failure(violates) => Some(violates),
        }
    }

    pub fn cwt_claims(&self) -> Option<&CwtClaims> {
        match self {
            Self::Success(claims) => Some(claims),
            Self::Failure(_) => None,
        }
    }

    pub fn into_cwt_claims(self) -> Option<CwtClaims> {
        match self {
            Self::Success(claims) => Some(claims),
            Self::Failure(_) => None,
        }
    }

    /// Convert into a standard `Result` so callers can use `?`
    pub fn into_result(self) -> Result<CwtClaims, Violates> {
        self.into()
    }

    /// Outcome without the payload
    pub fn as_check(&self) -> CheckResult {
        match self {
            Self::Success(_) => CheckResult::Success,
            Self::Failure(violates) => CheckResult::Failure(violates.clone()),
        }
    }

    /// Run a further check against the extracted claims.
    ///
    /// A failure stays untouched; a success becomes the check's failure if the check fails.
    pub fn and_then_check<F>(self, check: F) -> Self
    where
        F: FnOnce(&CwtClaims) -> CheckResult,
    {
        match self {
            Self::Success(claims) => match check(&claims) {
                CheckResult::Success => Self::Success(claims),
                CheckResult::Failure(violates) => Self::Failure(violates),
            },
            failure => failure,
        }
    }
}

impl Outcome for CwtClaimsResult {
    fn is_success(&self) -> bool {
        CwtClaimsResult::is_success(self)
    }

    fn violates(&self) -> Option<&Violates> {
        CwtClaimsResult::violates(self)
    }
}

impl From<Result<CwtClaims, Violates>> for CwtClaimsResult {
    fn from(result: Result<CwtClaims, Violates>) -> Self {
        match result {
            Ok(claims) => Self::Success(claims),
            Err(violates) => Self::Failure(violates),
        }
    }
}

impl From<CwtClaimsResult> for Result<CwtClaims, Violates> {
    fn from(result: CwtClaimsResult) -> Self {
        match result {
            CwtClaimsResult::Success(claims) => Ok(claims),
            CwtClaimsResult::Failure(violates) => Err(violates),
        }
    }
}

impl From<CwtClaimsResult> for CheckResult {
    fn from(result: CwtClaimsResult) -> Self {
        match result {
            CwtClaimsResult::Success(_) => CheckResult::Success,
            CwtClaimsResult::Failure(violates) => CheckResult::Failure(violates),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_issuer() -> Violates {
        Violates::new("Missing issuer", "4.1", "https://example/spec#4.1")
    }

    #[test]
    fn test_check_result_branches() {
        let ok = CheckResult::success();
        assert!(ok.is_success());
        assert_eq!(ok.violates(), None);

        let failed = CheckResult::failure(missing_issuer());
        assert!(failed.is_failure());
        assert_eq!(failed.violates().map(|v| v.section()), Some("4.1"));
        assert_eq!(failed.into_violates(), Some(missing_issuer()));
    }

    #[test]
    fn test_check_result_question_mark() {
        fn run(result: CheckResult) -> Result<&'static str, Violates> {
            result.into_result()?;
            Ok("passed")
        }

        assert_eq!(run(CheckResult::Success), Ok("passed"));
        assert_eq!(run(CheckResult::failure(missing_issuer())), Err(missing_issuer()));
    }

    #[test]
    fn test_claims_result_branches() {
        let claims = CwtClaims::builder().issuer("DE").build().unwrap();
        let ok = CwtClaimsResult::success(claims.clone());

        assert!(ok.is_success());
        assert_eq!(ok.cwt_claims(), Some(&claims));
        assert_eq!(ok.violates(), None);
        assert_eq!(ok.as_check(), CheckResult::Success);

        let failed = CwtClaimsResult::failure(missing_issuer());
        assert!(failed.is_failure());
        assert_eq!(failed.cwt_claims(), None);
        assert_eq!(CheckResult::from(failed), CheckResult::failure(missing_issuer()));
    }

    #[test]
    fn test_and_then_check() {
        let claims = CwtClaims::builder().subject("erikw").build().unwrap();
        let require_issuer = |claims: &CwtClaims| {
            if claims.iss.is_some() {
                CheckResult::Success
            } else {
                CheckResult::failure(missing_issuer())
            }
        };

        let chained = CwtClaimsResult::success(claims).and_then_check(require_issuer);
        assert_eq!(chained, CwtClaimsResult::failure(missing_issuer()));

        let expired = Violates::new("Token expired", "3.1.4", "rfc8392#section-3.1.4");
        let untouched =
            CwtClaimsResult::failure(expired.clone()).and_then_check(|_| CheckResult::Success);
        assert_eq!(untouched.violates(), Some(&expired));
    }

    #[test]
    fn test_outcome_trait_objects() {
        let outcomes: Vec<Box<dyn Outcome>> = vec![
            Box::new(CheckResult::Success),
            Box::new(CwtClaimsResult::failure(missing_issuer())),
        ];

        let failures = outcomes.iter().filter(|o| o.is_failure()).count();
        assert_eq!(failures, 1);
    }

    #[test]
    fn test_std_result_conversion() {
        let claims = CwtClaims::builder().issuer("SE").build().unwrap();
        let result: CwtClaimsResult = Ok::<_, Violates>(claims.clone()).into();
        assert_eq!(result.into_result(), Ok(claims));
    }
}
