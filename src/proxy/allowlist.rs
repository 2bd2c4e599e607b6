//! Destination allow-list.
//!
//! Built once from configuration at startup and never mutated. Matching is
//! exact string equality: no prefix, pattern, case or trailing-slash
//! normalization, so only pre-approved URLs are reachable.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejected {
    #[error("no destination provided")]
    MissingDestination,
    #[error("destination is not in the allow-list")]
    Unauthorized,
}

#[derive(Debug, Clone, Default)]
pub struct AllowList {
    // Configuration order, for diagnostics.
    entries: Vec<String>,
    index: HashSet<String>,
}

impl AllowList {
    pub fn new<I>(destinations: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut list = Self::default();
        for destination in destinations {
            if list.index.insert(destination.clone()) {
                list.entries.push(destination);
            }
        }
        list
    }

    /// Check `candidate` against the list, returning it unchanged on success.
    pub fn validate<'a>(&self, candidate: Option<&'a str>) -> Result<&'a str, Rejected> {
        match candidate {
            None | Some("") => Err(Rejected::MissingDestination),
            Some(c) if self.index.contains(c) => Ok(c),
            Some(_) => Err(Rejected::Unauthorized),
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
