use std::io;
use std::path::{Path, PathBuf};

use engine_logging::{engine_error, engine_info, engine_warn};
use expander_core::SessionState;
use expander_engine::{FileSessionStore, SessionFile};

/// What the previous session file, if any, contributes to this run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct ResumePlan {
    pub seed: Option<String>,
    pub output_path: Option<PathBuf>,
    state: SessionState,
    expected_queries: Option<usize>,
}

impl ResumePlan {
    fn resumed(saved: SessionFile) -> Self {
        Self {
            seed: Some(saved.context.seed),
            output_path: Some(PathBuf::from(saved.context.output_path)),
            state: saved.state,
            expected_queries: Some(saved.context.query_count),
        }
    }

    /// Starting position for a session of `query_count` derived queries.
    /// A saved position that no longer fits the query list is dropped.
    pub fn initial_state(&self, query_count: usize) -> SessionState {
        if let Some(expected) = self.expected_queries {
            if expected != query_count {
                engine_warn!(
                    "Saved session had {} derived queries, modifiers now give {}; positions may refer to different queries",
                    expected,
                    query_count
                );
            }
        }
        match self.state.validate(query_count) {
            Ok(()) => self.state,
            Err(err) => {
                engine_warn!("Saved position unusable ({}); starting from the first query", err);
                SessionState::fresh()
            }
        }
    }
}

/// Loads the session file at `state_file` and asks `confirm` whether to
/// resume it. Declining deletes the file.
pub(crate) fn plan_resume(
    state_file: &Path,
    confirm: impl FnOnce(&SessionFile) -> io::Result<bool>,
) -> io::Result<ResumePlan> {
    let Some(saved) = FileSessionStore::load(state_file) else {
        return Ok(ResumePlan::default());
    };

    if confirm(&saved)? {
        engine_info!(
            "Resuming seed \"{}\" at query {}, page {}",
            saved.context.seed,
            saved.state.current_query_index + 1,
            saved.state.current_page
        );
        return Ok(ResumePlan::resumed(saved));
    }

    match FileSessionStore::discard(state_file) {
        Ok(_) => engine_info!("Discarded previous session state {:?}", state_file),
        Err(err) => engine_error!("Failed to delete previous session state {:?}: {}", state_file, err),
    }
    Ok(ResumePlan::default())
}

#[cfg(test)]
mod tests {
    use expander_engine::{SessionContext, SessionStore};

    use super::*;

    fn saved_session(dir: &Path, state: SessionState) -> PathBuf {
        let path = dir.join("state.ron");
        let mut store = FileSessionStore::new(
            &path,
            SessionContext {
                seed: "coffee".to_string(),
                query_count: 3,
                output_path: "out.csv".to_string(),
            },
        );
        store.save(&state).expect("save session");
        path
    }

    #[test]
    fn no_file_means_fresh_start_without_prompt() {
        let dir = tempfile::tempdir().expect("tempdir");
        let plan = plan_resume(&dir.path().join("absent.ron"), |_| {
            panic!("nothing to confirm")
        })
        .expect("plan");
        assert_eq!(plan.seed, None);
        assert_eq!(plan.initial_state(3), SessionState::fresh());
    }

    #[test]
    fn accepting_uses_saved_seed_and_position() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = saved_session(dir.path(), SessionState::at(2, 5, 10));

        let plan = plan_resume(&path, |_| Ok(true)).expect("plan");
        assert_eq!(plan.seed.as_deref(), Some("coffee"));
        assert_eq!(plan.output_path, Some(PathBuf::from("out.csv")));
        assert_eq!(plan.initial_state(3), SessionState::at(2, 5, 10));
        assert!(path.exists());
    }

    #[test]
    fn declining_deletes_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = saved_session(dir.path(), SessionState::at(1, 3, 4));

        let plan = plan_resume(&path, |_| Ok(false)).expect("plan");
        assert_eq!(plan, ResumePlan::default());
        assert!(!path.exists());
    }

    #[test]
    fn position_beyond_a_shorter_query_list_restarts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = saved_session(dir.path(), SessionState::at(3, 2, 1));

        let plan = plan_resume(&path, |_| Ok(true)).expect("plan");
        assert_eq!(plan.initial_state(2), SessionState::fresh());
    }
}
