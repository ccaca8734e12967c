//! Readers for sub-element position lists.
//!
//! Only one format is supported: [`positions`], a plain-text list of
//! `x y z radius` records. Unlike most readers, a position load never fails
//! as a whole. Problems are collected as [`LoadDiagnostic`]s next to the
//! records that could be read.

pub mod positions;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Problems encountered while loading a position list.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadDiagnostic {
    /// The position file could not be opened, or reading it failed part-way.
    #[error("Cannot open '{}': {}", .path.display(), .reason)]
    ResourceUnavailable { path: PathBuf, reason: String },

    /// A line that is not four numeric fields. `line` is the original text.
    #[error("Invalid line {line_number} '{line}': {reason}")]
    MalformedRecord {
        line_number: usize,
        line: String,
        reason: String,
    },
}

impl LoadDiagnostic {
    pub fn is_resource_unavailable(&self) -> bool {
        matches!(self, LoadDiagnostic::ResourceUnavailable { .. })
    }
}

/// One sub-element: centre position and radius, in internal length units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub position: [f64; 3],
    pub radius: f64,
}

/// Records in file-line order.
pub type PositionList = Vec<PlacementRecord>;

/// Result of a position load: whatever could be read, plus what went wrong.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionLoad {
    pub records: PositionList,
    pub diagnostics: Vec<LoadDiagnostic>,
}

impl PositionLoad {
    /// Number of malformed lines that were skipped.
    pub fn skipped_lines(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, LoadDiagnostic::MalformedRecord { .. }))
            .count()
    }

    /// Whether the source could not be opened or read to the end.
    pub fn source_unavailable(&self) -> bool {
        self.diagnostics.iter().any(LoadDiagnostic::is_resource_unavailable)
    }
}
