use std::collections::HashSet;

use crate::config::DEFAULT_EXCLUSIONS;

/// Case-insensitive set of directory and file names pruned during traversal.
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    names: HashSet<String>,
}

impl ExclusionFilter {
    pub fn new(additional: &[String], no_defaults: bool) -> Self {
        let mut names = HashSet::new();
        if !no_defaults {
            names.extend(DEFAULT_EXCLUSIONS.iter().map(|n| n.to_ascii_lowercase()));
        }
        names.extend(additional.iter().map(|n| n.to_ascii_lowercase()));
        Self { names }
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.names.contains(&name.to_ascii_lowercase())
    }
}
