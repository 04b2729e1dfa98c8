use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of the scheduler within a session. This is the only thing, next
/// to the output CSV, that survives between process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub current_query_index: usize,
    /// Next page to fetch for the current query (1-based).
    pub current_page: u32,
    pub unique_count_for_current_query: usize,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::fresh()
    }
}

impl SessionState {
    pub fn fresh() -> Self {
        Self::at(0, 1, 0)
    }

    pub fn at(query_index: usize, page: u32, unique_count: usize) -> Self {
        Self {
            current_query_index: query_index,
            current_page: page,
            unique_count_for_current_query: unique_count,
        }
    }

    /// State for the start of the query after the current one.
    pub fn next_query(&self) -> Self {
        Self::at(self.current_query_index + 1, 1, 0)
    }

    pub fn is_complete(&self, query_count: usize) -> bool {
        self.current_query_index >= query_count
    }

    pub fn validate(&self, query_count: usize) -> Result<(), InvalidSessionState> {
        if self.current_page == 0 {
            return Err(InvalidSessionState::PageZero);
        }
        if self.current_query_index > query_count {
            return Err(InvalidSessionState::IndexOutOfRange {
                index: self.current_query_index,
                query_count,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidSessionState {
    PageZero,
    IndexOutOfRange { index: usize, query_count: usize },
}

impl fmt::Display for InvalidSessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidSessionState::PageZero => write!(f, "page numbers start at 1"),
            InvalidSessionState::IndexOutOfRange { index, query_count } => {
                write!(f, "query index {index} beyond {query_count} derived queries")
            }
        }
    }
}

impl std::error::Error for InvalidSessionState {}
