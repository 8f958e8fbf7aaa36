//! Fitted categorical encoders.

use serde::Deserialize;
use std::collections::HashMap;

/// A fitted mapping from a closed set of category strings to integer
/// codes, plus the reverse list of known categories.
///
/// The code for a category is its position in the fitted class list, so
/// codes are stable integers in `[0, n_classes)`. The class list order is
/// part of the bundle's contract and is never re-sorted here.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "Vec<String>")]
pub struct LabelEncoder {
    classes: Vec<String>,
    index: HashMap<String, i64>,
}

impl From<Vec<String>> for LabelEncoder {
    fn from(classes: Vec<String>) -> Self {
        Self::new(classes)
    }
}

impl LabelEncoder {
    /// Build an encoder from an ordered fitted class list.
    pub fn new(classes: Vec<String>) -> Self {
        let index = classes
            .iter()
            .enumerate()
            .map(|(code, class)| (class.clone(), code as i64))
            .collect();
        Self { classes, index }
    }

    /// Encode a category value to its integer code, or `None` if the value
    /// is outside the fitted set.
    pub fn encode(&self, value: &str) -> Option<i64> {
        self.index.get(value).copied()
    }

    /// Look up the category string for a code.
    pub fn decode(&self, code: i64) -> Option<&str> {
        usize::try_from(code)
            .ok()
            .and_then(|i| self.classes.get(i))
            .map(String::as_str)
    }

    /// The ordered fitted class list. Input surfaces must populate their
    /// selectors from this, never from a hardcoded parallel list.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
