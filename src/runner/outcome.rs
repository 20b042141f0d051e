use serde::Serialize;

use crate::results::ResultSet;

/// Aggregate counters for one script run.
///
/// Under the lenient per-statement policy a run can carry failures and still
/// conclude successfully; callers inspect `statements_failed` to tell the two
/// apart.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunOutcome {
    /// Statements (or batches) that executed successfully
    pub statements_executed: usize,
    /// Statements that failed and were skipped over
    pub statements_failed: usize,
    /// Total affected-row count reported by DML statements
    pub rows_affected: usize,
}

impl RunOutcome {
    /// True when every statement executed without error.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.statements_failed == 0
    }
}

/// Terminal state of one execution call, inspected by the runner's loop to
/// decide continue-vs-abort instead of relying on error propagation.
#[derive(Debug)]
pub enum StatementOutcome {
    /// The statement ran; its result sets are ready for formatting.
    Succeeded { result_sets: Vec<ResultSet> },
    /// The statement failed with the given message.
    Failed { message: String },
}
