//! Block-level diff data model.
//!
//! The line diff yields a vector of blocks; move detection and block pairing
//! extend each block's info in later passes. Blocks reference each other by
//! index into the owning vector, never by pointer.

use serde::{Deserialize, Serialize};

use crate::lcs::{Span, SpanKind};

/// A run of lines. As an input section, `len == 0` means "through the end of
/// the document"; everywhere else lengths are exact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub off: usize,
    pub len: usize,
}

impl Section {
    pub fn new(off: usize, len: usize) -> Self {
        Self { off, len }
    }
}

/// A matched run of lines inside a non-matching block. `is_moved`
/// distinguishes relocation from duplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct LineMatch {
    pub section: Section,
    pub is_moved: bool,
}

/// A changed line within a paired block, with the byte ranges inside the
/// line that differ from its mapped partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct LineChange {
    pub line: usize,
    pub changes: Vec<Section>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct BlockInfo {
    /// Index of the paired block in the owning block vector.
    pub match_partner: Option<usize>,
    pub changed_lines: Vec<LineChange>,
    pub matches: Vec<LineMatch>,
}

impl BlockInfo {
    /// Length and moved flag of the recorded match containing the block-local
    /// `line`, if any. The length is the full run length, not the remainder.
    pub(crate) fn matched_section(&self, line: usize) -> Option<(usize, bool)> {
        for m in &self.matches {
            if line >= m.section.off && line < m.section.off + m.section.len {
                return Some((m.section.len, m.is_moved));
            }
        }
        None
    }
}

/// One block of the line-level diff. `off` is in A's line space for `Match`
/// and `InA` blocks and in B's for `InB` blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct BlockDiff {
    pub kind: SpanKind,
    pub off: usize,
    pub len: usize,
    pub info: BlockInfo,
}

impl BlockDiff {
    pub(crate) fn from_span(span: Span) -> Self {
        Self {
            kind: span.kind,
            off: span.off,
            len: span.len,
            info: BlockInfo::default(),
        }
    }
}
