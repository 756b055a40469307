//! Extension filter for store keys and file names.
//!
//! One regex with the alternation grouped under a single anchor,
//! `\.(?:png|jpg)$`, so every extension is matched against the end of the
//! key. Extensions are escaped: `c++` means the literal text `c++`.

use regex::Regex;

use crate::key::StoreKey;

/// Case-sensitive, end-anchored match of `.` + one of a set of extensions.
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    // None when the extension set is empty: nothing matches.
    pattern: Option<Regex>,
}

impl ExtensionFilter {
    /// Build a filter from extensions given without the leading dot.
    ///
    /// Extensions are not validated. One that can never appear at the end of
    /// a key (e.g. containing `:` or `/`) just never matches.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternatives: Vec<String> = extensions
            .into_iter()
            .map(|e| regex::escape(e.as_ref()))
            .collect();
        if alternatives.is_empty() {
            return ExtensionFilter { pattern: None };
        }
        let source = format!(r"\.(?:{})$", alternatives.join("|"));
        // Escaped literals joined by `|` always form a valid pattern.
        let pattern = Regex::new(&source).ok();
        ExtensionFilter { pattern }
    }

    pub fn is_match(&self, candidate: &str) -> bool {
        self.pattern
            .as_ref()
            .map(|re| re.is_match(candidate))
            .unwrap_or(false)
    }

    pub fn matches_key(&self, key: &StoreKey) -> bool {
        self.is_match(key.as_str())
    }

    /// Keep only the keys this filter selects.
    pub fn select(&self, keys: Vec<StoreKey>) -> Vec<StoreKey> {
        keys.into_iter().filter(|k| self.matches_key(k)).collect()
    }
}
