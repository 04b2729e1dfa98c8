use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use expander_core::{
    update, DerivedQuery, FetchOutcome, QueryRun, QueryStep, ResultRecord, RunEvent, RunLimits,
    SessionState,
};
use tokio_util::sync::CancellationToken;

use crate::pacing::{cooldown, sleep_or_cancel, Pacer, RetrySignal, Wait};
use crate::{EngineError, PageFetcher, ResultStore, RunOutcome, SessionStore, StoreError};

#[derive(Debug, Clone)]
pub struct RunSettings {
    pub limits: RunLimits,
    pub min_delay: Duration,
    pub max_delay: Duration,
    /// Pause after an empty page (suspected rate limit).
    pub cooldown: Duration,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            limits: RunLimits::default(),
            min_delay: Duration::from_secs_f64(94.2),
            max_delay: Duration::from_secs(300),
            cooldown: Duration::from_secs(600),
        }
    }
}

/// Drives derived queries page by page. Owns every collaborator with side
/// effects so the scheduler stays a plain loop.
pub struct QueryRunner {
    fetcher: Box<dyn PageFetcher>,
    store: Box<dyn ResultStore>,
    session: Box<dyn SessionStore>,
    settings: RunSettings,
    pacer: Pacer,
    cancel: CancellationToken,
    retry: RetrySignal,
    records_added: usize,
}

impl QueryRunner {
    pub fn new(
        fetcher: Box<dyn PageFetcher>,
        store: Box<dyn ResultStore>,
        session: Box<dyn SessionStore>,
        settings: RunSettings,
        cancel: CancellationToken,
        retry: RetrySignal,
    ) -> Self {
        let pacer = Pacer::new(settings.min_delay, settings.max_delay);
        Self {
            fetcher,
            store,
            session,
            settings,
            pacer,
            cancel,
            retry,
            records_added: 0,
        }
    }

    pub fn store(&self) -> &dyn ResultStore {
        self.store.as_ref()
    }

    /// Records appended by this runner since it was created.
    pub fn records_added(&self) -> usize {
        self.records_added
    }

    /// Runs `query` from `start_page` with `start_unique` records already
    /// collected. `Err` means the whole process must stop.
    pub async fn run_query(
        &mut self,
        query: &DerivedQuery,
        start_page: u32,
        start_unique: usize,
    ) -> Result<RunOutcome, EngineError> {
        let (mut run, mut step) = update(
            QueryRun::new(start_page, start_unique, self.settings.limits),
            RunEvent::Start,
        );

        loop {
            let event = match step {
                QueryStep::Fetch { page } => {
                    if self.cancel.is_cancelled() {
                        return self.interrupt(query, &run);
                    }
                    let delay = self.pacer.next_delay();
                    if !delay.is_zero() {
                        engine_debug!("Waiting {:.1}s before page {}", delay.as_secs_f64(), page);
                        if sleep_or_cancel(delay, &self.cancel).await == Wait::Interrupted {
                            return self.interrupt(query, &run);
                        }
                    }

                    engine_info!("Searching page {} for \"{}\"", page, query.text);
                    let outcome = tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => return self.interrupt(query, &run),
                        outcome = self.fetcher.fetch_page(&query.text, page) => outcome,
                    };
                    self.page_event(page, outcome)?
                }
                QueryStep::PausedForRateLimit { resume_page } => {
                    self.checkpoint(&SessionState::at(query.index, resume_page, run.unique_count()));
                    engine_warn!(
                        "Page {} returned no results; cooling down for {}s (type 'r' + Enter to retry now)",
                        resume_page,
                        self.settings.cooldown.as_secs()
                    );
                    match cooldown(self.settings.cooldown, &self.cancel, &self.retry).await {
                        Wait::Interrupted => return self.interrupt(query, &run),
                        Wait::RetryRequested => {
                            engine_info!("Retry requested; fetching page {} again", resume_page)
                        }
                        Wait::Elapsed => {
                            engine_info!("Cooldown elapsed; fetching page {} again", resume_page)
                        }
                    }
                    self.pacer.rest();
                    RunEvent::CooldownElapsed
                }
                QueryStep::Completed {
                    total_unique,
                    reason,
                } => {
                    return Ok(RunOutcome::Completed {
                        total_unique,
                        reason,
                    })
                }
                QueryStep::Aborted { reason } => return Ok(RunOutcome::Aborted { reason }),
            };

            let fetched = !matches!(event, RunEvent::CooldownElapsed);
            (run, step) = update(run, event);
            if fetched {
                self.checkpoint(&SessionState::at(query.index, run.page(), run.unique_count()));
            }
        }
    }

    fn page_event(&mut self, page: u32, outcome: FetchOutcome) -> Result<RunEvent, StoreError> {
        let event = match outcome {
            FetchOutcome::Results { items, has_more } => {
                let accepted = self.record_page(&items)?;
                engine_info!(
                    "Page {}: {} results, {} new (total in output: {})",
                    page,
                    items.len(),
                    accepted,
                    self.store.count()
                );
                RunEvent::PageRecorded { accepted, has_more }
            }
            FetchOutcome::Empty => {
                engine_warn!("Page {} is empty", page);
                RunEvent::PageEmpty
            }
            FetchOutcome::TransientError(reason) => {
                engine_error!("Giving up on page {}: {}", page, reason);
                RunEvent::FetchFailed {
                    reason,
                    fatal: false,
                }
            }
            FetchOutcome::FatalError(reason) => {
                engine_error!("Unusable response for page {}: {}", page, reason);
                RunEvent::FetchFailed {
                    reason,
                    fatal: true,
                }
            }
        };
        Ok(event)
    }

    /// Offers a whole page to the store. No await point inside, so an
    /// interruption never splits a page.
    fn record_page(&mut self, items: &[ResultRecord]) -> Result<usize, StoreError> {
        let mut accepted = 0;
        for item in items {
            if self.store.record_if_new(item)? {
                accepted += 1;
            }
        }
        self.records_added += accepted;
        Ok(accepted)
    }

    /// Best-effort save while running; a failure only costs resume precision.
    pub(crate) fn checkpoint(&mut self, state: &SessionState) {
        if let Err(err) = self.session.save(state) {
            engine_error!("Failed to save session checkpoint {:?}: {}", state, err);
        }
    }

    pub(crate) fn finish_session(&mut self) {
        if let Err(err) = self.session.clear() {
            engine_error!("Failed to remove finished session state: {}", err);
        }
    }

    fn interrupt(&mut self, query: &DerivedQuery, run: &QueryRun) -> Result<RunOutcome, EngineError> {
        let checkpoint = SessionState::at(query.index, run.page(), run.unique_count());
        self.session
            .save(&checkpoint)
            .map_err(EngineError::Checkpoint)?;
        engine_warn!(
            "Interrupted; saved position at page {} of \"{}\" ({} unique so far)",
            checkpoint.current_page,
            query.text,
            checkpoint.unique_count_for_current_query
        );
        Ok(RunOutcome::Interrupted { checkpoint })
    }
}
