use engine_logging::{clear_query_label, engine_error, engine_info, set_query_label};
use expander_core::{DerivedQuery, SessionState, SessionSummary};

use crate::{EngineError, QueryRunner, RunOutcome, SessionOutcome};

/// Walks the derived-query sequence, one query at a time, from a fresh or
/// resumed [`SessionState`].
pub struct Scheduler {
    runner: QueryRunner,
}

impl Scheduler {
    pub fn new(runner: QueryRunner) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &QueryRunner {
        &self.runner
    }

    pub async fn run(
        &mut self,
        queries: &[DerivedQuery],
        initial: SessionState,
    ) -> Result<SessionOutcome, EngineError> {
        let total = queries.len();
        let mut summary = SessionSummary {
            queries_total: total,
            ..SessionSummary::default()
        };

        if initial != SessionState::fresh() {
            engine_info!(
                "Resuming session at query {}/{}, page {} ({} unique collected)",
                initial.current_query_index + 1,
                total,
                initial.current_page,
                initial.unique_count_for_current_query
            );
        }

        let mut state = initial;
        while let Some(query) = queries.get(state.current_query_index) {
            set_query_label(query.label(total));
            engine_info!(
                "Processing \"{}\" from page {}",
                query.text,
                state.current_page
            );

            let outcome = self
                .runner
                .run_query(
                    query,
                    state.current_page,
                    state.unique_count_for_current_query,
                )
                .await;
            let outcome = match outcome {
                Ok(outcome) => outcome,
                Err(err) => {
                    clear_query_label();
                    return Err(err);
                }
            };

            match outcome {
                RunOutcome::Completed {
                    total_unique,
                    reason,
                } => {
                    summary.queries_completed += 1;
                    engine_info!(
                        "Finished \"{}\": {} unique results ({})",
                        query.text,
                        total_unique,
                        reason
                    );
                }
                RunOutcome::Aborted { reason } => {
                    summary.queries_aborted += 1;
                    engine_error!("Aborted \"{}\": {}", query.text, reason);
                }
                RunOutcome::Interrupted { checkpoint } => {
                    clear_query_label();
                    return Ok(SessionOutcome::Interrupted { checkpoint });
                }
            }

            state = state.next_query();
            self.runner.checkpoint(&state);
        }

        clear_query_label();
        self.runner.finish_session();
        summary.records_added = self.runner.records_added();
        summary.records_total = self.runner.store().count();
        engine_info!("Session complete: {}", summary);
        Ok(SessionOutcome::Completed(summary))
    }
}
