//! Where graph documents come from.
//!
//! Sources resolve a college code to the raw JSON of its graph. Codes are
//! matched exactly first, then in lower and upper case, then by a
//! case-insensitive scan, so `NITC`, `nitc` and `Nitc` all find `nitc.json`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::trace;

use super::error::GraphError;

/// Provides raw graph documents keyed by college code.
///
/// This abstraction allows the route planner to be tested with in-memory
/// graphs.
pub trait GraphSource: Send + Sync {
    /// Return the JSON document for `code`, or [`GraphError::NotFound`].
    fn read(&self, code: &str) -> Result<String, GraphError>;
}

/// Candidate spellings of a code, exact first, without duplicates.
fn code_variants(code: &str) -> Vec<String> {
    let mut variants = vec![code.to_string()];
    for candidate in [code.to_lowercase(), code.to_uppercase()] {
        if !variants.contains(&candidate) {
            variants.push(candidate);
        }
    }
    variants
}

/// Reads `<code>.json` files from an ordered list of directories.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dirs: Vec<PathBuf>,
}

impl DirectorySource {
    /// Create a source searching `dirs` in order.
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// The directories searched, in order.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    fn locate(&self, code: &str) -> Option<PathBuf> {
        let variants = code_variants(code);
        let wanted = format!("{}.json", code.to_lowercase());

        for dir in &self.dirs {
            for variant in &variants {
                let path = dir.join(format!("{variant}.json"));
                if path.is_file() {
                    return Some(path);
                }
            }

            // Case-insensitive scan for filesystems where file casing differs
            // from the code
            let Ok(entries) = std::fs::read_dir(dir) else {
                continue;
            };
            let mut matches: Vec<PathBuf> = entries
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .filter(|path| {
                    path.is_file()
                        && path
                            .file_name()
                            .and_then(|name| name.to_str())
                            .is_some_and(|name| name.to_lowercase() == wanted)
                })
                .collect();
            matches.sort();
            if let Some(path) = matches.into_iter().next() {
                return Some(path);
            }
        }

        None
    }
}

impl GraphSource for DirectorySource {
    fn read(&self, code: &str) -> Result<String, GraphError> {
        if code.is_empty() || code.contains(['/', '\\']) || code.contains("..") {
            return Err(GraphError::NotFound {
                code: code.to_string(),
            });
        }

        let path = self.locate(code).ok_or_else(|| GraphError::NotFound {
            code: code.to_string(),
        })?;

        trace!(code, path = %path.display(), "Reading graph file");

        std::fs::read_to_string(&path).map_err(|e| GraphError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// In-memory graph documents.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    graphs: BTreeMap<String, String>,
}

impl StaticSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a graph document under `code`.
    pub fn with_graph(mut self, code: impl Into<String>, json: impl Into<String>) -> Self {
        self.insert(code, json);
        self
    }

    /// Add or replace a graph document under `code`.
    pub fn insert(&mut self, code: impl Into<String>, json: impl Into<String>) {
        self.graphs.insert(code.into(), json.into());
    }
}

impl GraphSource for StaticSource {
    fn read(&self, code: &str) -> Result<String, GraphError> {
        for variant in code_variants(code) {
            if let Some(json) = self.graphs.get(&variant) {
                return Ok(json.clone());
            }
        }

        let lower = code.to_lowercase();
        self.graphs
            .iter()
            .find(|(key, _)| key.to_lowercase() == lower)
            .map(|(_, json)| json.clone())
            .ok_or_else(|| GraphError::NotFound {
                code: code.to_string(),
            })
    }
}
