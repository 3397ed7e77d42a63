//! Compare outcome model and engine errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::editor::{EditorError, MarkerMask};

/// Overall verdict of a compare run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareResult {
    Match,
    Mismatch,
    Cancelled,
    Error,
}

/// One side of an alignment row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentViewData {
    pub line: usize,
    pub diff_mask: MarkerMask,
}

/// One row of the alignment table: the first line of a region in each view
/// and the marker class painted there.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentPair {
    pub main: AlignmentViewData,
    pub sub: AlignmentViewData,
}

/// Verdict plus the alignment rows produced on the way. Rows are only
/// meaningful for `Mismatch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareOutcome {
    pub result: CompareResult,
    pub alignment: Vec<AlignmentPair>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompareError {
    #[error("compare cancelled")]
    Cancelled,
    #[error("diff trace exceeded {limit} cells (needed {cells})")]
    TraceLimitExceeded { cells: usize, limit: usize },
    #[error("editor collaborator failed: {0}")]
    Editor(#[from] EditorError),
}
