//! Expander engine: fetching, durable storage and the drivers that run a
//! session of derived queries.
mod fetch;
mod pacing;
mod persist;
mod runner;
mod scheduler;
mod session;
mod store;
mod types;

pub use fetch::{FetchSettings, PageFetcher, SearxFetcher};
pub use pacing::{cooldown, sleep_or_cancel, Pacer, RetrySignal, Wait};
pub use persist::{ensure_dir, parent_dir, AtomicFileWriter, PersistError};
pub use runner::{QueryRunner, RunSettings};
pub use scheduler::Scheduler;
pub use session::{FileSessionStore, SessionContext, SessionFile, SessionStore};
pub use store::{CsvResultStore, ResultStore, StoreError};
pub use types::{EngineError, FailureKind, FetchError, RunOutcome, SessionOutcome};
