use std::fmt;

/// End-of-session report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSummary {
    pub queries_total: usize,
    pub queries_completed: usize,
    pub queries_aborted: usize,
    /// Records appended during this process run.
    pub records_added: usize,
    /// Records in the output, including earlier runs.
    pub records_total: usize,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} queries ({} completed, {} aborted), {} new records this run, {} unique records in output",
            self.queries_total,
            self.queries_completed,
            self.queries_aborted,
            self.records_added,
            self.records_total
        )
    }
}
