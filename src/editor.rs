//! Host editor collaborator interface.
//!
//! The engine reads document text and emits every side effect (markers,
//! changed-range paints, the origin blank line) through this trait. Hosts
//! adapt it to their buffer and view APIs; tests substitute an in-memory
//! implementation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifies one of the two compared documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewId {
    Main,
    Sub,
}

/// Half-open byte range within one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

/// Opaque marker bitmask; values belong to the host.
pub type MarkerMask = u32;

/// The marker masks the engine paints with. The host decides the values;
/// the default assigns one distinct bit per kind so embedders and tests can
/// start without a scheme of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerScheme {
    pub added: MarkerMask,
    pub removed: MarkerMask,
    pub added_local: MarkerMask,
    pub removed_local: MarkerMask,
    pub moved_line: MarkerMask,
    pub moved_begin: MarkerMask,
    pub moved_mid: MarkerMask,
    pub moved_end: MarkerMask,
    pub changed: MarkerMask,
}

impl Default for MarkerScheme {
    fn default() -> Self {
        Self {
            added: 1 << 0,
            removed: 1 << 1,
            added_local: 1 << 2,
            removed_local: 1 << 3,
            moved_line: 1 << 4,
            moved_begin: 1 << 5,
            moved_mid: 1 << 6,
            moved_end: 1 << 7,
            changed: 1 << 8,
        }
    }
}

impl MarkerScheme {
    /// The local-change mask matching a block's paint mask.
    pub(crate) fn local_for(&self, block_mask: MarkerMask) -> MarkerMask {
        if block_mask == self.added {
            self.added_local
        } else {
            self.removed_local
        }
    }
}

/// Failure reported by the host editor. Any editor failure is fatal for the
/// running compare.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EditorError {
    pub message: String,
}

impl EditorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Access to the two compared documents.
///
/// Line coordinates are absolute document lines; byte offsets are document
/// local. `line_range` spans the line's content without its end-of-line
/// bytes. An empty document reports zero lines.
pub trait EditorSession {
    fn line_count(&self, view: ViewId) -> Result<usize, EditorError>;
    fn line_range(&self, view: ViewId, line: usize) -> Result<ByteRange, EditorError>;
    fn text(&self, view: ViewId, range: ByteRange) -> Result<Vec<u8>, EditorError>;

    fn add_line_marker(
        &mut self,
        view: ViewId,
        line: usize,
        mask: MarkerMask,
    ) -> Result<(), EditorError>;
    fn mark_changed_text(
        &mut self,
        view: ViewId,
        offset: usize,
        length: usize,
    ) -> Result<(), EditorError>;
    fn insert_at_origin(&mut self, view: ViewId, text: &str) -> Result<(), EditorError>;
    fn set_save_point(&mut self, view: ViewId) -> Result<(), EditorError>;
    fn is_modified(&self, view: ViewId) -> Result<bool, EditorError>;

    /// Toggle host write permission for a view. The engine pairs enable and
    /// disable through [`WriteEnableGuard`], which releases on all paths.
    fn set_write_enabled(&mut self, view: ViewId, enabled: bool);

    /// Surface a fatal engine message to the user.
    fn report_error(&mut self, message: &str);
}

/// Enables writing on the given views for the guard's lifetime.
pub(crate) struct WriteEnableGuard<'a, E: EditorSession> {
    editor: &'a mut E,
    views: [ViewId; 2],
}

impl<'a, E: EditorSession> WriteEnableGuard<'a, E> {
    pub(crate) fn new(editor: &'a mut E, views: [ViewId; 2]) -> Self {
        for view in views {
            editor.set_write_enabled(view, true);
        }
        Self { editor, views }
    }

    pub(crate) fn editor(&mut self) -> &mut E {
        self.editor
    }
}

impl<E: EditorSession> Drop for WriteEnableGuard<'_, E> {
    fn drop(&mut self) {
        for view in self.views {
            self.editor.set_write_enabled(view, false);
        }
    }
}
