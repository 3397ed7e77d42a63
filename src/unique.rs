//! Find-unique mode: set difference of line hashes.
//!
//! No ordering or similarity is considered; a line is unique when its hash
//! occurs in one document only. Unique lines are painted with their side's
//! block mask, in ascending line order so output is deterministic.

use rustc_hash::FxHashMap;

use crate::config::CompareConfig;
use crate::editor::EditorSession;
use crate::engine::DocSide;
use crate::hashing::is_blank_hash;
use crate::report::CompareError;

/// Paint the lines unique to each side. Returns `true` when neither side has
/// any, which means the documents hold the same line set.
pub(crate) fn mark_unique_lines<E: EditorSession>(
    editor: &mut E,
    doc1: &DocSide,
    doc2: &DocSide,
    hashes1: &[u64],
    hashes2: &[u64],
    config: &CompareConfig,
) -> Result<bool, CompareError> {
    let index1 = index_lines(hashes1, config);
    let index2 = index_lines(hashes2, config);

    let unique1: Vec<usize> = residual_lines(hashes1, &index2, config);
    let unique2: Vec<usize> = residual_lines(hashes2, &index1, config);

    if unique1.is_empty() && unique2.is_empty() {
        return Ok(true);
    }

    for &line in &unique1 {
        editor.add_line_marker(doc1.view, line + doc1.section.off, doc1.paint_mask)?;
    }
    for &line in &unique2 {
        editor.add_line_marker(doc2.view, line + doc2.section.off, doc2.paint_mask)?;
    }

    Ok(false)
}

/// Hash to line-index mapping for one document's compared section.
fn index_lines(hashes: &[u64], config: &CompareConfig) -> FxHashMap<u64, Vec<usize>> {
    let mut index: FxHashMap<u64, Vec<usize>> = FxHashMap::default();
    for (line, &hash) in hashes.iter().enumerate() {
        if config.ignore_spaces && is_blank_hash(hash) {
            continue;
        }
        index.entry(hash).or_default().push(line);
    }
    index
}

fn residual_lines(
    hashes: &[u64],
    other: &FxHashMap<u64, Vec<usize>>,
    config: &CompareConfig,
) -> Vec<usize> {
    hashes
        .iter()
        .enumerate()
        .filter(|&(_, &hash)| {
            if config.ignore_spaces && is_blank_hash(hash) {
                return false;
            }
            !other.contains_key(&hash)
        })
        .map(|(line, _)| line)
        .collect()
}
