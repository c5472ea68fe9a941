use std::collections::HashSet;

use crate::catalog::file_name;

/// Images that cannot be rated and always carry the skip code.
///
/// An entry containing `/` matches that exact path. A bare filename entry
/// also matches any path ending in that filename.
#[derive(Debug, Clone, Default)]
pub struct SkipList {
    paths: HashSet<String>,
    names: HashSet<String>,
}

impl SkipList {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::default();
        for entry in entries {
            let entry = entry.into();
            if entry.contains('/') {
                list.paths.insert(entry);
            } else {
                list.names.insert(entry);
            }
        }
        list
    }

    #[must_use]
    pub fn contains(&self, filename: &str) -> bool {
        self.paths.contains(filename) || self.names.contains(file_name(filename))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len() + self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.names.is_empty()
    }
}
