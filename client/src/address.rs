//! Shareable address (query string) that mirrors the filter state.

use std::sync::{Mutex, PoisonError};

/// Where the filter state is mirrored. Writes replace the current entry;
/// nothing is ever pushed onto a history stack.
pub trait AddressBar: Send + Sync {
    /// Current query string, without the leading `?`.
    fn query(&self) -> String;

    fn replace_query(&self, query: &str);
}

#[derive(Debug, Default)]
struct AddressEntry {
    query: String,
    replacements: usize,
}

/// In-process address bar, used by the CLI and in tests.
#[derive(Debug, Default)]
pub struct MemoryAddress {
    entry: Mutex<AddressEntry>,
}

impl MemoryAddress {
    pub fn new(query: &str) -> Self {
        Self {
            entry: Mutex::new(AddressEntry {
                query: query.strip_prefix('?').unwrap_or(query).to_string(),
                replacements: 0,
            }),
        }
    }

    /// Number of replacing writes since creation.
    pub fn replacements(&self) -> usize {
        self.entry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replacements
    }

    /// Simulates the user navigating to a different address, e.g. going back.
    pub fn navigate(&self, query: &str) {
        let mut entry = self.entry.lock().unwrap_or_else(PoisonError::into_inner);
        entry.query = query.strip_prefix('?').unwrap_or(query).to_string();
    }
}

impl AddressBar for MemoryAddress {
    fn query(&self) -> String {
        self.entry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .query
            .clone()
    }

    fn replace_query(&self, query: &str) {
        let mut entry = self.entry.lock().unwrap_or_else(PoisonError::into_inner);
        entry.query = query.to_string();
        entry.replacements += 1;
    }
}
