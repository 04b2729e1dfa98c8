use std::fs;
use std::io;
use std::path::Path;

use engine_logging::{engine_info, engine_warn};
use expander_core::parse_modifiers;

/// Reads the modifier list once at startup. Any read problem degrades to a
/// seed-only session.
pub(crate) fn load(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(raw) => {
            let terms = parse_modifiers(&raw);
            if terms.is_empty() {
                engine_warn!("{:?} holds no modifiers; only the seed query will run", path);
            } else {
                engine_info!("Loaded {} modifiers from {:?}", terms.len(), path);
            }
            terms
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            engine_warn!("Modifier file {:?} not found; only the seed query will run", path);
            Vec::new()
        }
        Err(err) => {
            engine_warn!(
                "Could not read modifier file {:?}: {}; only the seed query will run",
                path,
                err
            );
            Vec::new()
        }
    }
}
