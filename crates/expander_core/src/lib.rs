//! Expander core: data model and the pure per-query state machine.
mod backoff;
mod effect;
mod msg;
mod queries;
mod record;
mod state;
mod update;
mod view_model;

pub use backoff::{backoff_delay, pacing_delay};
pub use effect::{QueryStep, StopReason};
pub use msg::RunEvent;
pub use queries::{derive_queries, parse_modifiers, DerivedQuery};
pub use record::{FetchOutcome, ResultRecord};
pub use state::{InvalidSessionState, SessionState};
pub use update::{update, QueryRun, RunLimits};
pub use view_model::SessionSummary;
