//! Text Compare: a line and word level text comparison engine.
//!
//! This crate compares two documents held by a host editor and describes
//! their differences:
//! - a block-level diff over hashed lines,
//! - detection of line runs moved between the documents,
//! - a best mapping of similar lines inside replaced blocks,
//! - byte-accurate word-level change ranges within mapped lines.
//!
//! The engine never touches the host directly. Documents and marker painting
//! are reached through the [`EditorSession`] collaborator, and long compares
//! poll a [`ProgressMonitor`] for cancellation. Identical inputs with
//! identical settings always produce identical output.
//!
//! # Quick Start
//!
//! ```ignore
//! use text_compare::{
//!     CompareConfig, CompareMode, MarkerScheme, NoProgress, Section, compare_views,
//! };
//!
//! let mut editor = my_host_adapter();
//! let outcome = compare_views(
//!     &mut editor,
//!     &mut NoProgress,
//!     &CompareConfig::default(),
//!     &MarkerScheme::default(),
//!     Section::default(),
//!     Section::default(),
//!     CompareMode::Full,
//!     Some("Comparing files..."),
//! );
//! println!("{:?}", outcome.result);
//! ```

mod block_pair;
mod blocks;
mod config;
mod editor;
mod engine;
mod hashing;
mod lcs;
mod moves;
mod progress;
mod report;
mod unique;
mod words;

pub use blocks::Section;
pub use config::{CompareConfig, CompareConfigBuilder, ConfigError, DEFAULT_LCS_TRACE_CELL_LIMIT};
pub use editor::{ByteRange, EditorError, EditorSession, MarkerMask, MarkerScheme, ViewId};
pub use engine::{CompareMode, compare_views, try_compare_views};
pub use lcs::{Span, SpanKind, diff_spans};
pub use progress::{NoProgress, ProgressMonitor};
pub use report::{
    AlignmentPair, AlignmentViewData, CompareError, CompareOutcome, CompareResult,
};
