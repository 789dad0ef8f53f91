use std::path::Path;
use tracing::{debug, warn};

use crate::error::{CurateError, Result};
use crate::types::TextEdit;

pub const DEFAULT_CORRECTIONS_FILE: &str = "corrections.json";

/// Ordered old-fragment → new-fragment replacements, e.g. as returned by an
/// external correction-suggestion service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrectionMap {
    entries: Vec<(String, String)>,
}

impl CorrectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = Self::new();
        for (old, new) in pairs {
            map.insert(old, new);
        }
        map
    }

    /// Insert a replacement; re-inserting a key updates it in place.
    pub fn insert(&mut self, old: impl Into<String>, new: impl Into<String>) {
        let old = old.into();
        let new = new.into();
        match self.entries.iter_mut().find(|(key, _)| *key == old) {
            Some(entry) => entry.1 = new,
            None => self.entries.push((old, new)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(old, new)| (old.as_str(), new.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a flat JSON object of string → string, keeping document order.
    pub fn from_json_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::new());
        }

        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(content)
            .map_err(|e| CurateError::Corrections(format!("Expected a JSON object: {}", e)))?;

        let mut map = Self::new();
        for (old, value) in object {
            match value {
                serde_json::Value::String(new) => map.insert(old, new),
                other => {
                    return Err(CurateError::Corrections(format!(
                        "Replacement for '{}' must be a string, got {}",
                        old, other
                    )));
                }
            }
        }
        Ok(map)
    }

    /// Load a correction map file. A missing file is an empty map.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No correction map at {}", path.display());
            return Ok(Self::new());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            CurateError::Corrections(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }
}

/// Stage 2: literal substring replacement, in map order.
pub fn apply_corrections(text: &str, corrections: &CorrectionMap) -> TextEdit {
    let mut result = text.to_string();
    let mut changes = 0;
    let mut details = Vec::new();

    for (old, new) in corrections.iter() {
        if old.is_empty() {
            warn!("Ignoring correction with an empty source fragment");
            continue;
        }
        let count = result.matches(old).count();
        if count == 0 {
            continue;
        }
        result = result.replace(old, new);
        changes += count;
        details.push(format!("'{}' → '{}' ({}x)", old, new, count));
    }

    TextEdit {
        text: result,
        changes,
        details,
    }
}
