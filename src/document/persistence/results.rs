//! Result types for async project operations.

use std::path::PathBuf;

use super::SavedProject;

/// What a write task produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Project,
    TmxExport,
}

/// Result of an async save or export
pub struct SaveResult {
    pub path: PathBuf,
    pub kind: WriteKind,
    pub error: Option<String>,
}

/// Result of an async load
pub struct LoadResult {
    pub path: PathBuf,
    pub project: Option<SavedProject>,
    pub error: Option<String>,
}
