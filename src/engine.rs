//! Compare orchestration.
//!
//! Drives the phases of a compare run: hash both documents, diff the hash
//! sequences into blocks, detect moves, pair replaced blocks, then walk the
//! blocks emitting markers and alignment rows through the editor
//! collaborator. Cancellation is polled between phases and at a coarse
//! cadence inside each phase.

use crate::block_pair::compare_blocks;
use crate::blocks::{BlockDiff, Section};
use crate::config::CompareConfig;
use crate::editor::{EditorSession, MarkerMask, MarkerScheme, ViewId, WriteEnableGuard};
use crate::hashing::{hash_line, is_blank_hash};
use crate::lcs::{CANCEL_CHECK_STRIDE, SpanKind, diff_sequences};
use crate::moves::detect_moves;
use crate::progress::ProgressMonitor;
use crate::report::{
    AlignmentPair, AlignmentViewData, CompareError, CompareOutcome, CompareResult,
};
use crate::unique::mark_unique_lines;

/// Poll the progress monitor once per this many hashed lines.
const HASH_CANCEL_STRIDE: usize = 500;

/// Which comparison to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareMode {
    /// Full block diff with moves, line mapping and word-level changes.
    Full,
    /// Set difference of line hashes only.
    FindUnique,
}

/// One document's compare state: the view it lives in, the section under
/// comparison, and the mask its unmatched lines paint with.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DocSide {
    pub view: ViewId,
    pub section: Section,
    pub paint_mask: MarkerMask,
}

/// Compare the two views and emit markers and alignment rows.
///
/// Maps every exit to a [`CompareResult`]: collaborator failures close the
/// progress surface, are reported through the editor, and come back as
/// [`CompareResult::Error`].
#[allow(clippy::too_many_arguments)]
pub fn compare_views<E: EditorSession, P: ProgressMonitor>(
    editor: &mut E,
    progress: &mut P,
    config: &CompareConfig,
    markers: &MarkerScheme,
    main_section: Section,
    sub_section: Section,
    mode: CompareMode,
    progress_title: Option<&str>,
) -> CompareOutcome {
    match try_compare_views(
        editor,
        progress,
        config,
        markers,
        main_section,
        sub_section,
        mode,
        progress_title,
    ) {
        Ok(outcome) => outcome,
        Err(CompareError::Cancelled) => CompareOutcome {
            result: CompareResult::Cancelled,
            alignment: Vec::new(),
        },
        Err(err) => {
            editor.report_error(&err.to_string());
            CompareOutcome {
                result: CompareResult::Error,
                alignment: Vec::new(),
            }
        }
    }
}

/// Like [`compare_views`] but surfaces cancellation and failures to the
/// caller instead of folding them into the result.
#[allow(clippy::too_many_arguments)]
pub fn try_compare_views<E: EditorSession, P: ProgressMonitor>(
    editor: &mut E,
    progress: &mut P,
    config: &CompareConfig,
    markers: &MarkerScheme,
    main_section: Section,
    sub_section: Section,
    mode: CompareMode,
    progress_title: Option<&str>,
) -> Result<CompareOutcome, CompareError> {
    if let Some(title) = progress_title {
        progress.open(title);
    }

    let mut alignment = Vec::new();
    let run = match mode {
        CompareMode::Full => run_compare(
            editor,
            progress,
            config,
            markers,
            main_section,
            sub_section,
            &mut alignment,
        ),
        CompareMode::FindUnique => run_find_unique(
            editor,
            progress,
            config,
            markers,
            main_section,
            sub_section,
            &mut alignment,
        ),
    };

    progress.close();

    let matched = run?;
    Ok(CompareOutcome {
        result: if matched {
            CompareResult::Match
        } else {
            CompareResult::Mismatch
        },
        alignment,
    })
}

fn paint_masks(config: &CompareConfig, markers: &MarkerScheme) -> (MarkerMask, MarkerMask) {
    if config.old_file_view == ViewId::Main {
        (markers.removed, markers.added)
    } else {
        (markers.added, markers.removed)
    }
}

fn run_compare<E: EditorSession, P: ProgressMonitor>(
    editor: &mut E,
    progress: &mut P,
    config: &CompareConfig,
    markers: &MarkerScheme,
    main_section: Section,
    sub_section: Section,
    alignment: &mut Vec<AlignmentPair>,
) -> Result<bool, CompareError> {
    let selection_compare = main_section.len != 0 || sub_section.len != 0;

    let (main_mask, sub_mask) = paint_masks(config, markers);
    let mut doc1 = DocSide {
        view: ViewId::Main,
        section: main_section,
        paint_mask: main_mask,
    };
    let mut doc2 = DocSide {
        view: ViewId::Sub,
        section: sub_section,
        paint_mask: sub_mask,
    };

    let mut hashes1 = hash_section(editor, progress, config, &mut doc1)?;
    if !progress.next_phase() {
        return Err(CompareError::Cancelled);
    }
    let mut hashes2 = hash_section(editor, progress, config, &mut doc2)?;
    if !progress.next_phase() {
        return Err(CompareError::Cancelled);
    }

    // the diff runs with the longer sequence first
    if hashes1.len() < hashes2.len() {
        std::mem::swap(&mut hashes1, &mut hashes2);
        std::mem::swap(&mut doc1, &mut doc2);
    }

    let mut blocks = line_block_diff(progress, config, &hashes1, &hashes2)?;

    if blocks.is_empty() || (blocks.len() == 1 && blocks[0].kind == SpanKind::Match) {
        return Ok(true);
    }

    if config.detect_moves {
        detect_moves(&mut blocks, &hashes1, &hashes2, progress)?;
    }

    // The host cannot anchor an annotation above the first line. When the
    // documents differ right at a document origin, give both a synthetic
    // blank first line and shift the compared sections below it.
    if blocks[0].kind != SpanKind::Match && (doc1.section.off == 0 || doc2.section.off == 0) {
        insert_origin_lines(editor, &mut doc1, &mut doc2)?;
    }

    if doc1.section.off != 0 || doc2.section.off != 0 {
        for block in &mut blocks {
            match block.kind {
                SpanKind::Match | SpanKind::InA => block.off += doc1.section.off,
                SpanKind::InB => block.off += doc2.section.off,
            }
        }
    }

    if !progress.next_phase() {
        return Err(CompareError::Cancelled);
    }

    progress.set_max_count(blocks.len());
    for i in 0..blocks.len() {
        if blocks[i].kind == SpanKind::InB && i != 0 && blocks[i - 1].kind == SpanKind::InA {
            blocks[i - 1].info.match_partner = Some(i);
            blocks[i].info.match_partner = Some(i - 1);
            compare_blocks(
                editor,
                (doc1.view, doc2.view),
                config,
                &mut blocks,
                i - 1,
                i,
            )?;
        }
        if !progress.advance() {
            return Err(CompareError::Cancelled);
        }
    }

    if !progress.next_phase() {
        return Err(CompareError::Cancelled);
    }

    mark_all_diffs(
        editor,
        progress,
        markers,
        &blocks,
        doc1,
        doc2,
        selection_compare,
        alignment,
    )?;

    Ok(false)
}

fn run_find_unique<E: EditorSession, P: ProgressMonitor>(
    editor: &mut E,
    progress: &mut P,
    config: &CompareConfig,
    markers: &MarkerScheme,
    main_section: Section,
    sub_section: Section,
    alignment: &mut Vec<AlignmentPair>,
) -> Result<bool, CompareError> {
    let (main_mask, sub_mask) = paint_masks(config, markers);
    let mut doc1 = DocSide {
        view: ViewId::Main,
        section: main_section,
        paint_mask: main_mask,
    };
    let mut doc2 = DocSide {
        view: ViewId::Sub,
        section: sub_section,
        paint_mask: sub_mask,
    };

    let hashes1 = hash_section(editor, progress, config, &mut doc1)?;
    if !progress.next_phase() {
        return Err(CompareError::Cancelled);
    }
    let hashes2 = hash_section(editor, progress, config, &mut doc2)?;
    if !progress.next_phase() {
        return Err(CompareError::Cancelled);
    }

    if mark_unique_lines(editor, &doc1, &doc2, &hashes1, &hashes2, config)? {
        return Ok(true);
    }

    alignment.push(AlignmentPair {
        main: AlignmentViewData {
            line: doc1.section.off,
            diff_mask: 0,
        },
        sub: AlignmentViewData {
            line: doc2.section.off,
            diff_mask: 0,
        },
    });
    Ok(false)
}

/// Hash one document's compared section. Clamps the section to the document,
/// then drops a trailing blank line: it only mirrors the final end-of-line
/// and never counts as content.
fn hash_section<E: EditorSession, P: ProgressMonitor>(
    editor: &E,
    progress: &mut P,
    config: &CompareConfig,
    doc: &mut DocSide,
) -> Result<Vec<u64>, CompareError> {
    let line_count = editor.line_count(doc.view)?;

    if doc.section.len == 0 || doc.section.off + doc.section.len > line_count {
        doc.section.len = line_count.saturating_sub(doc.section.off);
    }

    progress.set_max_count(doc.section.len / HASH_CANCEL_STRIDE + 1);

    let mut hashes = Vec::with_capacity(doc.section.len);
    for line in 0..doc.section.len {
        if line % HASH_CANCEL_STRIDE == 0 && !progress.advance() {
            return Err(CompareError::Cancelled);
        }
        let range = editor.line_range(doc.view, doc.section.off + line)?;
        let bytes = editor.text(doc.view, range)?;
        hashes.push(hash_line(&bytes, config));
    }

    if let Some(&last) = hashes.last()
        && is_blank_hash(last)
    {
        hashes.pop();
        doc.section.len -= 1;
    }

    Ok(hashes)
}

fn line_block_diff<P: ProgressMonitor>(
    progress: &mut P,
    config: &CompareConfig,
    hashes1: &[u64],
    hashes2: &[u64],
) -> Result<Vec<BlockDiff>, CompareError> {
    progress.set_max_count((hashes1.len() + hashes2.len()) / CANCEL_CHECK_STRIDE + 1);
    let spans = diff_sequences(hashes1, hashes2, config.lcs_trace_cell_limit, &mut || {
        !progress.advance()
    })?;
    Ok(spans.into_iter().map(BlockDiff::from_span).collect())
}

fn insert_origin_lines<E: EditorSession>(
    editor: &mut E,
    doc1: &mut DocSide,
    doc2: &mut DocSide,
) -> Result<(), CompareError> {
    let doc1_modified = editor.is_modified(doc1.view)?;
    let doc2_modified = editor.is_modified(doc2.view)?;

    {
        let mut guard = WriteEnableGuard::new(editor, [doc1.view, doc2.view]);

        guard.editor().insert_at_origin(doc1.view, "\n")?;
        if !doc1_modified {
            guard.editor().set_save_point(doc1.view)?;
        }

        guard.editor().insert_at_origin(doc2.view, "\n")?;
        if !doc2_modified {
            guard.editor().set_save_point(doc2.view)?;
        }
    }

    doc1.section.off += 1;
    doc2.section.off += 1;
    Ok(())
}

/// Paint the sub-range `doc.section` of one block. Unmatched lines take the
/// block mask; unmoved matched runs take the local-change mask; moved runs
/// take the begin/mid/end markers, or the single-line moved marker.
fn mark_section<E: EditorSession>(
    editor: &mut E,
    markers: &MarkerScheme,
    block: &BlockDiff,
    doc: &DocSide,
) -> Result<(), CompareError> {
    let end = doc.section.off + doc.section.len;
    let mut i = doc.section.off;
    let mut line = block.off + doc.section.off;

    while i < end {
        match block.info.matched_section(i) {
            None => {
                editor.add_line_marker(doc.view, line, doc.paint_mask)?;
                i += 1;
                line += 1;
            }
            Some((len, moved)) => {
                let len = len.min(doc.section.len);
                if !moved {
                    let mask = markers.local_for(doc.paint_mask);
                    for _ in 0..len {
                        editor.add_line_marker(doc.view, line, mask)?;
                        line += 1;
                    }
                    i += len;
                } else if len == 1 {
                    editor.add_line_marker(doc.view, line, markers.moved_line)?;
                    i += 1;
                    line += 1;
                } else {
                    editor.add_line_marker(doc.view, line, markers.moved_begin)?;
                    line += 1;
                    for _ in 0..len - 2 {
                        editor.add_line_marker(doc.view, line, markers.moved_mid)?;
                        line += 1;
                    }
                    editor.add_line_marker(doc.view, line, markers.moved_end)?;
                    line += 1;
                    i += len;
                }
            }
        }
    }

    Ok(())
}

/// Paint the changed marker and the differing byte ranges for the k-th
/// changed-line pair of two paired blocks.
fn mark_changed_line_pair<E: EditorSession>(
    editor: &mut E,
    markers: &MarkerScheme,
    block1: &BlockDiff,
    block2: &BlockDiff,
    change_idx: usize,
    view1: ViewId,
    view2: ViewId,
) -> Result<(), CompareError> {
    for (block, view) in [(block1, view1), (block2, view2)] {
        let change = &block.info.changed_lines[change_idx];
        let line = block.off + change.line;
        let line_start = editor.line_range(view, line)?.start;
        for section in &change.changes {
            editor.mark_changed_text(view, line_start + section.off, section.len)?;
        }
        editor.add_line_marker(view, line, markers.changed)?;
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn mark_all_diffs<E: EditorSession, P: ProgressMonitor>(
    editor: &mut E,
    progress: &mut P,
    markers: &MarkerScheme,
    blocks: &[BlockDiff],
    mut doc1: DocSide,
    mut doc2: DocSide,
    selection_compare: bool,
    alignment: &mut Vec<AlignmentPair>,
) -> Result<(), CompareError> {
    progress.set_max_count(blocks.len());

    // keep the main row bound to the main view even after the longer-first
    // swap moved doc1 to the sub view
    let swapped = doc1.view == ViewId::Sub;
    let push_row = |alignment: &mut Vec<AlignmentPair>,
                    row1: AlignmentViewData,
                    row2: AlignmentViewData| {
        if swapped {
            alignment.push(AlignmentPair {
                main: row2,
                sub: row1,
            });
        } else {
            alignment.push(AlignmentPair {
                main: row1,
                sub: row2,
            });
        }
    };

    let mut row1 = AlignmentViewData {
        line: doc1.section.off,
        diff_mask: 0,
    };
    let mut row2 = AlignmentViewData {
        line: doc2.section.off,
        diff_mask: 0,
    };

    let mut i = 0usize;
    while i < blocks.len() {
        let bd = &blocks[i];
        match bd.kind {
            SpanKind::Match => {
                row1.diff_mask = 0;
                row2.diff_mask = 0;
                push_row(alignment, row1, row2);
                row1.line += bd.len;
                row2.line += bd.len;
            }
            SpanKind::InB => {
                doc2.section.off = 0;
                doc2.section.len = bd.len;
                mark_section(editor, markers, bd, &doc2)?;

                row1.diff_mask = 0;
                row2.diff_mask = doc2.paint_mask;
                push_row(alignment, row1, row2);
                row2.line += bd.len;
            }
            SpanKind::InA => {
                if let Some(partner_idx) = bd.info.match_partner {
                    let partner = &blocks[partner_idx];
                    doc1.section.off = 0;
                    doc2.section.off = 0;

                    for j in 0..bd.info.changed_lines.len() {
                        doc1.section.len = bd.info.changed_lines[j].line - doc1.section.off;
                        doc2.section.len = partner.info.changed_lines[j].line - doc2.section.off;

                        if doc1.section.len != 0 || doc2.section.len != 0 {
                            row1.diff_mask = doc1.paint_mask;
                            row2.diff_mask = doc2.paint_mask;
                            push_row(alignment, row1, row2);

                            if doc1.section.len != 0 {
                                mark_section(editor, markers, bd, &doc1)?;
                                row1.line += doc1.section.len;
                            }
                            if doc2.section.len != 0 {
                                mark_section(editor, markers, partner, &doc2)?;
                                row2.line += doc2.section.len;
                            }
                        }

                        row1.diff_mask = markers.changed;
                        row2.diff_mask = markers.changed;
                        push_row(alignment, row1, row2);

                        mark_changed_line_pair(
                            editor, markers, bd, partner, j, doc1.view, doc2.view,
                        )?;

                        doc1.section.off = bd.info.changed_lines[j].line + 1;
                        doc2.section.off = partner.info.changed_lines[j].line + 1;
                        row1.line += 1;
                        row2.line += 1;
                    }

                    doc1.section.len = bd.len - doc1.section.off;
                    doc2.section.len = partner.len - doc2.section.off;

                    if doc1.section.len != 0 || doc2.section.len != 0 {
                        row1.diff_mask = doc1.paint_mask;
                        row2.diff_mask = doc2.paint_mask;
                        push_row(alignment, row1, row2);

                        if doc1.section.len != 0 {
                            mark_section(editor, markers, bd, &doc1)?;
                            row1.line += doc1.section.len;
                        }
                        if doc2.section.len != 0 {
                            mark_section(editor, markers, partner, &doc2)?;
                            row2.line += doc2.section.len;
                        }
                    }

                    // the partner block was handled together with this one
                    i += 1;
                } else {
                    doc1.section.off = 0;
                    doc1.section.len = bd.len;
                    mark_section(editor, markers, bd, &doc1)?;

                    row1.diff_mask = doc1.paint_mask;
                    row2.diff_mask = 0;
                    push_row(alignment, row1, row2);
                    row1.line += bd.len;
                }
            }
        }

        if !progress.advance() {
            return Err(CompareError::Cancelled);
        }
        i += 1;
    }

    if selection_compare {
        row1.diff_mask = 0;
        row2.diff_mask = 0;
        push_row(alignment, row1, row2);
    }

    if !progress.next_phase() {
        return Err(CompareError::Cancelled);
    }

    Ok(())
}
