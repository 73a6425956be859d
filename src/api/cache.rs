use std::collections::HashMap;

use crate::core::{ChorusError, CompanyId};

/// Read-through cache of Chorus Pro structure identifiers, per company.
///
/// Entries are never invalidated.
#[derive(Debug, Clone, Default)]
pub struct IdentifierCache {
    entries: HashMap<CompanyId, i64>,
}

impl IdentifierCache {
    pub fn get(&self, company: CompanyId) -> Option<i64> {
        self.entries.get(&company).copied()
    }

    pub fn insert(&mut self, company: CompanyId, identifier: i64) {
        self.entries.insert(company, identifier);
    }

    /// Cached identifier, or the result of `fetch` stored for next time.
    /// Failed fetches are not cached.
    pub fn get_or_fetch<F>(&mut self, company: CompanyId, fetch: F) -> Result<i64, ChorusError>
    where
        F: FnOnce() -> Result<i64, ChorusError>,
    {
        if let Some(identifier) = self.get(company) {
            return Ok(identifier);
        }
        let identifier = fetch()?;
        self.entries.insert(company, identifier);
        Ok(identifier)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
