//! Request metrics
//!
//! Counters go through the `metrics` facade; without an installed recorder
//! they cost nothing.

use crate::error::GateResult;

/// Requests handled, labelled by operation kind and outcome
pub const REQUESTS_TOTAL: &str = "tablegate_requests_total";

/// Operation label for commands that could not be routed
pub const OPERATION_UNKNOWN: &str = "unknown";

/// Outcome label for an admitted request that storage answered
pub const OUTCOME_ALLOWED: &str = "allowed";

/// Outcome label for a handled request
pub fn outcome<T>(result: &GateResult<T>) -> &'static str {
    match result {
        Ok(_) => OUTCOME_ALLOWED,
        Err(e) => e.outcome(),
    }
}

pub(crate) fn record_request(operation: &'static str, outcome: &'static str) {
    metrics::counter!(
        REQUESTS_TOTAL,
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GateError, Rejection};
    use tablegate_common::TableName;

    #[test]
    fn test_outcome_labels() {
        let ok: GateResult<()> = Ok(());
        assert_eq!(outcome(&ok), "allowed");

        let table = TableName::new("summary").unwrap();
        let rejected: GateResult<()> =
            Err(GateError::rejected(&table, Rejection::ActiveTableImmutable));
        assert_eq!(outcome(&rejected), "ActiveTableImmutable");
    }
}
