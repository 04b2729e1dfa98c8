#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use expander_core::{FetchOutcome, ResultRecord, RunLimits, SessionState};
use expander_engine::{
    PageFetcher, PersistError, ResultStore, RunSettings, SessionStore, StoreError,
};
use tokio_util::sync::CancellationToken;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

pub fn fast_settings(target_unique: usize, max_pages: u32) -> RunSettings {
    RunSettings {
        limits: RunLimits {
            target_unique,
            max_pages,
        },
        min_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
        cooldown: Duration::ZERO,
    }
}

pub fn page(query: &str, urls: &[&str], has_more: bool) -> FetchOutcome {
    FetchOutcome::Results {
        items: urls
            .iter()
            .map(|url| ResultRecord::new(query, format!("title of {url}"), *url))
            .collect(),
        has_more,
    }
}

enum Scripted {
    Outcome(FetchOutcome),
    /// Cancels the session and never answers, like a request cut off by Ctrl-C.
    CancelAndHang(CancellationToken),
}

/// Fetcher answering from a per-(query, page) script. Unscripted pages are
/// empty.
#[derive(Clone, Default)]
pub struct ScriptedFetcher {
    script: Arc<Mutex<HashMap<(String, u32), VecDeque<Scripted>>>>,
    calls: Arc<Mutex<Vec<(String, u32)>>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, query: &str, page: u32, outcome: FetchOutcome) -> &Self {
        self.push(query, page, Scripted::Outcome(outcome));
        self
    }

    pub fn cancel_on(&self, query: &str, page: u32, cancel: &CancellationToken) -> &Self {
        self.push(query, page, Scripted::CancelAndHang(cancel.clone()));
        self
    }

    fn push(&self, query: &str, page: u32, entry: Scripted) {
        self.script
            .lock()
            .unwrap()
            .entry((query.to_string(), page))
            .or_default()
            .push_back(entry);
    }

    pub fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn pages_for(&self, query: &str) -> Vec<u32> {
        self.calls()
            .into_iter()
            .filter(|(q, _)| q == query)
            .map(|(_, page)| page)
            .collect()
    }
}

#[async_trait::async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch_page(&self, query: &str, page: u32) -> FetchOutcome {
        self.calls.lock().unwrap().push((query.to_string(), page));
        let next = self
            .script
            .lock()
            .unwrap()
            .get_mut(&(query.to_string(), page))
            .and_then(VecDeque::pop_front);
        match next {
            Some(Scripted::Outcome(outcome)) => outcome,
            Some(Scripted::CancelAndHang(cancel)) => {
                cancel.cancel();
                std::future::pending::<FetchOutcome>().await
            }
            None => FetchOutcome::Empty,
        }
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionState {
    pub saved: Option<SessionState>,
    pub history: Vec<SessionState>,
    pub cleared: bool,
    pub fail_saves: bool,
}

#[derive(Clone, Default)]
pub struct MemorySession {
    pub state: Arc<Mutex<MemorySessionState>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let session = Self::default();
        session.state.lock().unwrap().fail_saves = true;
        session
    }

    pub fn saved(&self) -> Option<SessionState> {
        self.state.lock().unwrap().saved
    }

    pub fn history(&self) -> Vec<SessionState> {
        self.state.lock().unwrap().history.clone()
    }

    pub fn cleared(&self) -> bool {
        self.state.lock().unwrap().cleared
    }
}

impl SessionStore for MemorySession {
    fn save(&mut self, state: &SessionState) -> Result<(), PersistError> {
        let mut guard = self.state.lock().unwrap();
        if guard.fail_saves {
            return Err(PersistError::Io(std::io::Error::other("disk full")));
        }
        guard.saved = Some(*state);
        guard.history.push(*state);
        guard.cleared = false;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), PersistError> {
        let mut guard = self.state.lock().unwrap();
        guard.saved = None;
        guard.cleared = true;
        Ok(())
    }
}

/// In-memory store whose disk "fills up" after `capacity` accepted records.
pub struct FailingStore {
    seen: HashSet<String>,
    capacity: usize,
}

impl FailingStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            seen: HashSet::new(),
            capacity,
        }
    }
}

impl ResultStore for FailingStore {
    fn record_if_new(&mut self, record: &ResultRecord) -> Result<bool, StoreError> {
        if self.seen.contains(&record.url) {
            return Ok(false);
        }
        if self.seen.len() >= self.capacity {
            return Err(StoreError::Io(std::io::Error::other("no space left on device")));
        }
        self.seen.insert(record.url.clone());
        Ok(true)
    }

    fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    fn count(&self) -> usize {
        self.seen.len()
    }
}
