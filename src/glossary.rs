//! Domain glossary: canonical terms and the ways ASR tends to mishear them.
//!
//! A glossary file is TOML with one array of tables per category:
//!
//! ```toml
//! [[tools]]
//! term = "DataLad"
//! patterns = ["data lad", "data ladd"]
//!
//! [[projects]]
//! term = "ReproNim"
//! patterns = ["repro nim"]
//! expansion = "Center for Reproducible Neuroimaging Computation"
//! ```
//!
//! Glossaries can live at several directory levels. Discovery walks from a
//! directory up through its ancestors, and the closer file wins when two files
//! define the same canonical term.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{CurateError, Result};

pub const DEFAULT_GLOSSARY_FILE: &str = "glossary.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlossaryTerm {
    pub canonical: String,
    pub patterns: Vec<String>,
    pub category: String,
    pub expansion: Option<String>,
}

impl GlossaryTerm {
    pub fn new(canonical: &str, patterns: &[&str], category: &str) -> Self {
        Self {
            canonical: canonical.to_string(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            category: category.to_string(),
            expansion: None,
        }
    }

    pub fn with_expansion(mut self, expansion: &str) -> Self {
        self.expansion = Some(expansion.to_string());
        self
    }

    pub fn is_single_word(&self) -> bool {
        self.canonical.split_whitespace().count() == 1
    }
}

/// On-disk shape of one entry under a category key.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GlossaryEntry {
    term: String,
    #[serde(default)]
    patterns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expansion: Option<String>,
}

/// Terms keyed by canonical form, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Glossary {
    terms: Vec<GlossaryTerm>,
}

impl Glossary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_terms(terms: impl IntoIterator<Item = GlossaryTerm>) -> Self {
        let mut glossary = Self::new();
        for term in terms {
            glossary.insert(term);
        }
        glossary
    }

    /// Add a term, replacing any existing term with the same canonical form in place.
    pub fn insert(&mut self, term: GlossaryTerm) {
        match self.terms.iter_mut().find(|t| t.canonical == term.canonical) {
            Some(existing) => *existing = term,
            None => self.terms.push(term),
        }
    }

    pub fn get(&self, canonical: &str) -> Option<&GlossaryTerm> {
        self.terms.iter().find(|t| t.canonical == canonical)
    }

    pub fn terms(&self) -> &[GlossaryTerm] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Canonical spellings, e.g. as context for an external correction service.
    pub fn canonical_terms(&self) -> Vec<&str> {
        self.terms.iter().map(|t| t.canonical.as_str()).collect()
    }

    /// Union of both glossaries; `other` wins on canonical-key collisions.
    pub fn merge(&self, other: &Glossary) -> Glossary {
        let mut merged = self.clone();
        for term in &other.terms {
            merged.insert(term.clone());
        }
        merged
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::new());
        }

        let table: toml::Table = toml::from_str(content)?;
        let mut glossary = Self::new();
        for (category, value) in table {
            let entries: Vec<GlossaryEntry> = value.try_into().map_err(|e| {
                CurateError::Glossary(format!("Invalid entries in category '{}': {}", category, e))
            })?;
            for entry in entries {
                glossary.insert(GlossaryTerm {
                    canonical: entry.term,
                    patterns: entry.patterns,
                    category: category.clone(),
                    expansion: entry.expansion,
                });
            }
        }

        Ok(glossary)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        let mut table = toml::Table::new();
        for term in &self.terms {
            let entry = GlossaryEntry {
                term: term.canonical.clone(),
                patterns: term.patterns.clone(),
                expansion: term.expansion.clone(),
            };
            let value = toml::Value::try_from(entry)
                .map_err(|e| CurateError::Glossary(format!("Failed to serialize glossary: {}", e)))?;
            if let toml::Value::Array(entries) = table
                .entry(term.category.clone())
                .or_insert(toml::Value::Array(Vec::new()))
            {
                entries.push(value);
            }
        }

        toml::to_string_pretty(&table)
            .map_err(|e| CurateError::Glossary(format!("Failed to serialize glossary: {}", e)))
    }

    /// Load a glossary file. A missing file is an empty glossary.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No glossary at {}", path.display());
            return Ok(Self::new());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| CurateError::Glossary(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
            .map_err(|e| CurateError::Glossary(format!("{}: {}", path.display(), e)))
    }

    /// Glossary files named `file_name` in `start_dir` and, when `walk_parents`
    /// is set, in each of its ancestors. Closest first.
    pub fn candidate_files<P: AsRef<Path>>(start_dir: P, file_name: &str, walk_parents: bool) -> Vec<PathBuf> {
        let depth = if walk_parents { usize::MAX } else { 1 };
        // "." and "" have no ancestors of their own, so resolve them first
        let start = start_dir.as_ref();
        let start = if start.as_os_str().is_empty() { Path::new(".") } else { start };
        let start = std::fs::canonicalize(start)
            .or_else(|_| std::path::absolute(start))
            .unwrap_or_else(|_| start.to_path_buf());
        start
            .ancestors()
            .take(depth)
            .map(|dir| dir.join(file_name))
            .filter(|path| path.is_file())
            .collect()
    }

    /// Collate every glossary found from `start_dir` upwards, farthest first so
    /// that closer files override.
    pub fn discover<P: AsRef<Path>>(start_dir: P, file_name: &str, walk_parents: bool) -> Result<Self> {
        let files = Self::candidate_files(start_dir, file_name, walk_parents);
        let mut glossary = Self::new();
        for path in files.iter().rev() {
            let found = Self::load(path)?;
            info!("Loaded {} glossary terms from {}", found.len(), path.display());
            glossary = glossary.merge(&found);
        }
        Ok(glossary)
    }
}
