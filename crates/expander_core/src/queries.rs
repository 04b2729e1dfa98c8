/// One entry of the expansion sequence. Index 0 is the bare seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedQuery {
    pub index: usize,
    pub text: String,
}

impl DerivedQuery {
    /// Short label used in log lines, e.g. `q2/7`.
    pub fn label(&self, total: usize) -> String {
        format!("q{}/{}", self.index + 1, total)
    }

    pub fn is_seed(&self) -> bool {
        self.index == 0
    }
}

/// Builds the ordered derived-query sequence: the seed alone, then the seed
/// followed by each modifier in the given order. Blank modifiers are skipped.
pub fn derive_queries<S: AsRef<str>>(seed: &str, modifiers: &[S]) -> Vec<DerivedQuery> {
    let seed = seed.trim();
    let mut queries = Vec::with_capacity(modifiers.len() + 1);
    queries.push(DerivedQuery {
        index: 0,
        text: seed.to_string(),
    });
    for modifier in modifiers
        .iter()
        .map(|m| m.as_ref().trim())
        .filter(|m| !m.is_empty())
    {
        queries.push(DerivedQuery {
            index: queries.len(),
            text: format!("{seed} {modifier}"),
        });
    }
    queries
}

/// Parses a modifier list: one term per line, first comma-separated column,
/// surrounding quotes removed, blank lines ignored.
pub fn parse_modifiers(raw: &str) -> Vec<String> {
    raw.lines()
        .map(first_column)
        .filter(|term| !term.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn first_column(line: &str) -> &str {
    let line = line.trim();
    if let Some(rest) = line.strip_prefix('"') {
        return match rest.find('"') {
            Some(end) => rest[..end].trim(),
            None => rest.trim(),
        };
    }
    line.split(',').next().unwrap_or_default().trim()
}
