/// Conformance checks for a generated mirror
///
/// - `drift`: snapshot schema against the live one
/// - `freshness`: files on disk against a new generation run
/// - `roundtrip`: operations and sampled variables against the mock server

pub mod drift;
pub mod freshness;
pub mod roundtrip;

pub use drift::{diff_schemas, DriftChange, DriftReport, Severity};
pub use freshness::{check_outputs, StaleOutput, StaleReason};
pub use roundtrip::{roundtrip_all, sample_variables, RoundTripFailure};
