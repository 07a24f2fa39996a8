use regex::{Regex, RegexBuilder};

use crate::error::{Result, ScanError};

/// Line predicate selected once at setup and shared read-only across
/// workers.
#[derive(Debug)]
pub enum PatternMatcher {
    /// Case-insensitive substring.
    Literal(String),
    /// `|`-separated alternatives; any case-insensitive substring hit wins.
    AnyTerm(Vec<String>),
    /// Compiled case-insensitive regular expression.
    Regex(Regex),
}

impl PatternMatcher {
    pub fn build(pattern: &str, use_regex: bool) -> Result<Self> {
        if use_regex {
            let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
            return Ok(PatternMatcher::Regex(regex));
        }
        if pattern.contains('|') {
            let terms: Vec<String> = pattern
                .split('|')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_owned)
                .collect();
            if terms.is_empty() {
                return Err(ScanError::EmptyPattern);
            }
            return Ok(PatternMatcher::AnyTerm(terms));
        }
        Ok(PatternMatcher::Literal(pattern.to_owned()))
    }

    #[inline]
    pub fn is_match(&self, line: &str) -> bool {
        match self {
            PatternMatcher::Literal(term) => contains_ignore_case(line, term),
            PatternMatcher::AnyTerm(terms) => {
                terms.iter().any(|t| contains_ignore_case(line, t))
            }
            PatternMatcher::Regex(regex) => regex.is_match(line),
        }
    }
}

#[inline]
fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let haystack = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.len() > haystack.len() {
        return false;
    }
    haystack
        .windows(needle.len().max(1))
        .any(|window| window.eq_ignore_ascii_case(needle))
        || needle.is_empty()
}
