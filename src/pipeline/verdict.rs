use super::types::FieldComparison;
use crate::models::VerificationStatus;

/// Verdict for a completed comparison: `Original` only when there is at
/// least one comparison and every one matched.
///
/// Never returns `Error`; extraction failures short-circuit before this.
pub fn decide(comparisons: &[FieldComparison]) -> VerificationStatus {
    if !comparisons.is_empty() && comparisons.iter().all(FieldComparison::is_match) {
        VerificationStatus::Original
    } else {
        VerificationStatus::Fake
    }
}
