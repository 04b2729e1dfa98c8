use crate::{QueryStep, RunEvent, StopReason};

/// Per-query bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunLimits {
    pub target_unique: usize,
    pub max_pages: u32,
}

impl Default for RunLimits {
    fn default() -> Self {
        Self {
            target_unique: 2666,
            max_pages: 100,
        }
    }
}

/// Progress of one derived query. Owned by the driver and threaded through
/// [`update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRun {
    page: u32,
    unique: usize,
    limits: RunLimits,
    /// Page that already had its one cooldown.
    cooled_page: Option<u32>,
    outcome: Option<QueryStep>,
}

impl QueryRun {
    pub fn new(start_page: u32, start_unique: usize, limits: RunLimits) -> Self {
        Self {
            page: start_page.max(1),
            unique: start_unique,
            limits,
            cooled_page: None,
            outcome: None,
        }
    }

    /// Next page to request; also the page to persist on interruption.
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn unique_count(&self) -> usize {
        self.unique
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    fn finish(&mut self, step: QueryStep) -> QueryStep {
        self.outcome = Some(step.clone());
        step
    }

    fn complete(&mut self, reason: StopReason) -> QueryStep {
        let total_unique = self.unique;
        self.finish(QueryStep::Completed {
            total_unique,
            reason,
        })
    }

    fn limit_reached(&self) -> Option<StopReason> {
        if self.unique >= self.limits.target_unique {
            Some(StopReason::TargetReached)
        } else if self.page > self.limits.max_pages {
            Some(StopReason::PageLimit)
        } else {
            None
        }
    }
}

/// Pure update function: applies a driver event to the query and returns the
/// next step. Once a terminal step has been produced it is returned again for
/// every further event.
pub fn update(mut run: QueryRun, event: RunEvent) -> (QueryRun, QueryStep) {
    if let Some(done) = run.outcome.clone() {
        return (run, done);
    }

    let step = match event {
        RunEvent::Start | RunEvent::CooldownElapsed => match run.limit_reached() {
            Some(reason) => run.complete(reason),
            None => QueryStep::Fetch { page: run.page },
        },
        RunEvent::PageRecorded { accepted, has_more } => {
            // The cap is only checked here, between pages: a page that
            // overshoots the target is kept whole.
            run.unique += accepted;
            run.page += 1;
            run.cooled_page = None;
            match run.limit_reached() {
                Some(reason) => run.complete(reason),
                None if !has_more => run.complete(StopReason::NoMorePages),
                None => QueryStep::Fetch { page: run.page },
            }
        }
        RunEvent::PageEmpty => {
            if run.cooled_page == Some(run.page) {
                run.complete(StopReason::EndOfResults)
            } else {
                run.cooled_page = Some(run.page);
                QueryStep::PausedForRateLimit {
                    resume_page: run.page,
                }
            }
        }
        RunEvent::FetchFailed { reason, .. } => run.finish(QueryStep::Aborted { reason }),
    };

    (run, step)
}
