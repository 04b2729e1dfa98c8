use std::fs;
use std::path::{Path, PathBuf};

use engine_logging::{engine_info, engine_warn};
use expander_core::SessionState;
use serde::{Deserialize, Serialize};

use crate::persist::{AtomicFileWriter, PersistError};

/// Everything needed to rebuild the derived-query sequence of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub seed: String,
    pub query_count: usize,
    pub output_path: String,
}

/// On-disk session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFile {
    pub context: SessionContext,
    pub state: SessionState,
}

/// Durable home of the scheduler position.
pub trait SessionStore: Send {
    fn save(&mut self, state: &SessionState) -> Result<(), PersistError>;
    /// Removes the persisted state; absent state is not an error.
    fn clear(&mut self) -> Result<(), PersistError>;
}

pub struct FileSessionStore {
    writer: AtomicFileWriter,
    context: SessionContext,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>, context: SessionContext) -> Self {
        Self {
            writer: AtomicFileWriter::new(path),
            context,
        }
    }

    /// Reads a previously saved session. Missing, unreadable, unparsable or
    /// inconsistent files all yield `None`; only the latter three are reported.
    pub fn load(path: &Path) -> Option<SessionFile> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                engine_warn!("Failed to read session state from {:?}: {}", path, err);
                return None;
            }
        };

        let file: SessionFile = match ron::from_str(&content) {
            Ok(file) => file,
            Err(err) => {
                engine_warn!("Failed to parse session state from {:?}: {}", path, err);
                return None;
            }
        };

        if let Err(err) = file.state.validate(file.context.query_count) {
            engine_warn!("Ignoring session state in {:?}: {}", path, err);
            return None;
        }

        engine_info!("Loaded session state from {:?}", path);
        Some(file)
    }

    /// Deletes a stale session file without needing a context.
    pub fn discard(path: &Path) -> Result<bool, PersistError> {
        AtomicFileWriter::new(path).remove()
    }
}

impl SessionStore for FileSessionStore {
    fn save(&mut self, state: &SessionState) -> Result<(), PersistError> {
        let file = SessionFile {
            context: self.context.clone(),
            state: *state,
        };
        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(&file, pretty)
            .map_err(|err| PersistError::Serialize(err.to_string()))?;
        self.writer.write(&content)
    }

    fn clear(&mut self) -> Result<(), PersistError> {
        if self.writer.remove()? {
            engine_info!("Removed session state {:?}", self.writer.path());
        }
        Ok(())
    }
}
