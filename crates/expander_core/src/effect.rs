use std::fmt;

/// What the driver should do next for the query in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStep {
    /// Request `page` (after the pacing delay, unless just cooled down).
    Fetch { page: u32 },
    /// Checkpoint, wait out the cooldown, then report `CooldownElapsed`.
    PausedForRateLimit { resume_page: u32 },
    Completed { total_unique: usize, reason: StopReason },
    Aborted { reason: String },
}

impl QueryStep {
    pub fn is_terminal(&self) -> bool {
        matches!(self, QueryStep::Completed { .. } | QueryStep::Aborted { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    TargetReached,
    PageLimit,
    NoMorePages,
    /// Same page came back empty again after a cooldown.
    EndOfResults,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::TargetReached => write!(f, "target reached"),
            StopReason::PageLimit => write!(f, "page limit reached"),
            StopReason::NoMorePages => write!(f, "last page was partial"),
            StopReason::EndOfResults => write!(f, "end of results"),
        }
    }
}
