//! Domain layer for CWT verdicts
//!
//! Pure value types: violations, outcomes, claims and the report aggregate.
//! Nothing here touches the file system or the terminal.

pub mod claims;
pub mod outcome;
pub mod report;
pub mod violations;
pub mod wire;

// Re-export main domain types for convenience
pub use claims::{CwtClaims, CwtClaimsBuilder};
pub use outcome::{CheckResult, CwtClaimsResult, Outcome};
pub use report::{MalformedRecord, OutcomeEntry, OutcomeReport, OutcomeSummary};
pub use violations::{VerdictError, VerdictResult, Violates};
pub use wire::{CheckRecord, ClaimsRecord, WireOutcome};
