//! Line mapping and intra-line diff for replaced block pairs.
//!
//! For an adjacent `InA`/`InB` pair the comparer scores every unmoved line
//! pair by word-level similarity, searches for the best one-to-one mapping,
//! and emits byte-accurate change ranges for each mapped line whose word
//! diff is not a single match.

use std::collections::BTreeMap;

use crate::blocks::{BlockDiff, LineChange, Section};
use crate::config::CompareConfig;
use crate::editor::{EditorSession, ViewId};
use crate::lcs::{SpanKind, diff_sequences};
use crate::report::CompareError;
use crate::words::{Word, split_words};

/// Minimum similarity (percent) for a line pair to become a candidate.
const MIN_CONVERGENCE: usize = 50;

/// A scored candidate pairing of two block-local lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ConvKey {
    pub convergence: usize,
    pub line_a: usize,
    pub line_b: usize,
}

pub(crate) fn compare_blocks<E: EditorSession>(
    editor: &E,
    views: (ViewId, ViewId),
    config: &CompareConfig,
    blocks: &mut [BlockDiff],
    idx_a: usize,
    idx_b: usize,
) -> Result<(), CompareError> {
    let chunk_a = words_for_block(editor, views.0, blocks[idx_a].off, blocks[idx_a].len, config)?;
    let chunk_b = words_for_block(editor, views.1, blocks[idx_b].off, blocks[idx_b].len, config)?;

    let candidates = collect_candidates(config, &blocks[idx_a], &blocks[idx_b], &chunk_a, &chunk_b)?;
    let mapping = select_mapping(&candidates, chunk_a.len(), chunk_b.len());

    if !mapping.is_empty() {
        emit_line_changes(config, blocks, idx_a, idx_b, &chunk_a, &chunk_b, &mapping)?;
    }

    Ok(())
}

fn words_for_block<E: EditorSession>(
    editor: &E,
    view: ViewId,
    line_offset: usize,
    line_count: usize,
    config: &CompareConfig,
) -> Result<Vec<Vec<Word>>, CompareError> {
    let mut words = Vec::with_capacity(line_count);
    for line in 0..line_count {
        let range = editor.line_range(view, line_offset + line)?;
        let bytes = editor.text(view, range)?;
        words.push(split_words(&bytes, line, config));
    }
    Ok(words)
}

/// Score every unmoved, non-empty line pair. Pairs where one word vector is
/// more than twice as long as the other are skipped outright.
fn collect_candidates(
    config: &CompareConfig,
    block_a: &BlockDiff,
    block_b: &BlockDiff,
    chunk_a: &[Vec<Word>],
    chunk_b: &[Vec<Word>],
) -> Result<Vec<ConvKey>, CompareError> {
    let mut candidates = Vec::new();

    let mut line_a = 0usize;
    while line_a < chunk_a.len() {
        if chunk_a[line_a].is_empty() {
            line_a += 1;
            continue;
        }
        if let Some((len, true)) = block_a.info.matched_section(line_a) {
            line_a += len;
            continue;
        }

        let bytes_a: usize = chunk_a[line_a].iter().map(|w| w.len).sum();

        let mut line_b = 0usize;
        while line_b < chunk_b.len() {
            if chunk_b[line_b].is_empty() {
                line_b += 1;
                continue;
            }
            if let Some((len, true)) = block_b.info.matched_section(line_b) {
                line_b += len;
                continue;
            }

            let (longer, shorter) = if chunk_a[line_a].len() < chunk_b[line_b].len() {
                (&chunk_b[line_b], &chunk_a[line_a])
            } else {
                (&chunk_a[line_a], &chunk_b[line_b])
            };
            if longer.len() > 2 * shorter.len() {
                line_b += 1;
                continue;
            }

            let spans = diff_sequences(
                longer,
                shorter,
                config.lcs_trace_cell_limit,
                &mut || false,
            )?;

            let bytes_b: usize = chunk_b[line_b].iter().map(|w| w.len).sum();
            let longer_bytes = bytes_a.max(bytes_b);

            let mut words_matched = 0usize;
            let mut bytes_matched = 0usize;
            for span in &spans {
                if span.kind == SpanKind::Match {
                    words_matched += span.len;
                    for word in &longer[span.off..span.off + span.len] {
                        bytes_matched += word.len;
                    }
                }
            }

            let by_words = words_matched * 100 / longer.len();
            let by_bytes = bytes_matched * 100 / longer_bytes;
            let convergence = by_words.max(by_bytes);

            if convergence >= MIN_CONVERGENCE {
                candidates.push(ConvKey {
                    convergence,
                    line_a,
                    line_b,
                });
            }
            line_b += 1;
        }
        line_a += 1;
    }

    candidates.sort_unstable_by(|a, b| {
        b.convergence
            .cmp(&a.convergence)
            .then(a.line_a.cmp(&b.line_a))
            .then(a.line_b.cmp(&b.line_b))
    });
    Ok(candidates)
}

/// Greedy mapping search over the sorted candidate list. Each starting
/// position yields one mapping; mappings are scored by summing convergence
/// over the pairs that stay in ascending `line_b` order, and the best score
/// wins. Later starts explore ties and crossings the first pass forces.
pub(crate) fn select_mapping(
    candidates: &[ConvKey],
    lines_a: usize,
    lines_b: usize,
) -> BTreeMap<usize, (usize, usize)> {
    let mut best_mapping = BTreeMap::new();
    let mut best_score = 0usize;

    for start in 0..candidates.len() {
        let mut mapping: BTreeMap<usize, (usize, usize)> = BTreeMap::new();
        let mut used_a = vec![false; lines_a];
        let mut used_b = vec![false; lines_b];
        let mut mapped_a = 0usize;
        let mut mapped_b = 0usize;

        for key in &candidates[start..] {
            if used_a[key.line_a] || used_b[key.line_b] {
                continue;
            }
            mapping.insert(key.line_a, (key.convergence, key.line_b));
            mapped_a += 1;
            mapped_b += 1;
            if mapped_a == lines_a || mapped_b == lines_b {
                break;
            }
            used_a[key.line_a] = true;
            used_b[key.line_b] = true;
        }

        let mut score = 0usize;
        let mut last_b: Option<usize> = None;
        for &(convergence, line_b) in mapping.values() {
            if last_b.is_none_or(|last| line_b > last) {
                score += convergence;
                last_b = Some(line_b);
            }
        }

        if score > best_score {
            best_score = score;
            best_mapping = mapping;
        }
    }

    best_mapping
}

/// Run the word diff for each mapped pair retained by the monotone filter
/// and append aligned change entries to both blocks.
fn emit_line_changes(
    config: &CompareConfig,
    blocks: &mut [BlockDiff],
    idx_a: usize,
    idx_b: usize,
    chunk_a: &[Vec<Word>],
    chunk_b: &[Vec<Word>],
    mapping: &BTreeMap<usize, (usize, usize)>,
) -> Result<(), CompareError> {
    let mut last_b: Option<usize> = None;

    for (&line_a, &(_, line_b)) in mapping {
        if last_b.is_some_and(|last| line_b <= last) {
            continue;
        }
        last_b = Some(line_b);

        // the longer word vector goes first; swapping also swaps which block
        // receives which side's changes
        let swap = chunk_a[line_a].len() < chunk_b[line_b].len();
        let (first_idx, first_line, first_words, second_idx, second_line, second_words) = if swap {
            (idx_b, line_b, &chunk_b[line_b], idx_a, line_a, &chunk_a[line_a])
        } else {
            (idx_a, line_a, &chunk_a[line_a], idx_b, line_b, &chunk_b[line_b])
        };

        let spans = diff_sequences(
            first_words,
            second_words,
            config.lcs_trace_cell_limit,
            &mut || false,
        )?;
        if spans.len() == 1 && spans[0].kind == SpanKind::Match {
            continue;
        }

        let mut first_change = LineChange {
            line: first_line,
            changes: Vec::new(),
        };
        let mut second_change = LineChange {
            line: second_line,
            changes: Vec::new(),
        };

        for span in &spans {
            match span.kind {
                SpanKind::InA => {
                    first_change.changes.push(word_span_bytes(first_words, span.off, span.len));
                }
                SpanKind::InB => {
                    second_change.changes.push(word_span_bytes(second_words, span.off, span.len));
                }
                SpanKind::Match => {}
            }
        }

        blocks[first_idx].info.changed_lines.push(first_change);
        blocks[second_idx].info.changed_lines.push(second_change);
    }

    Ok(())
}

fn word_span_bytes(words: &[Word], off: usize, len: usize) -> Section {
    let first = &words[off];
    let last = &words[off + len - 1];
    Section::new(first.pos, last.pos + last.len - first.pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(convergence: usize, line_a: usize, line_b: usize) -> ConvKey {
        ConvKey {
            convergence,
            line_a,
            line_b,
        }
    }

    #[test]
    fn single_candidate_maps_directly() {
        let mapping = select_mapping(&[key(80, 0, 0)], 1, 1);
        assert_eq!(mapping.get(&0), Some(&(80, 0)));
    }

    #[test]
    fn each_line_is_used_at_most_once() {
        let candidates = [key(90, 0, 0), key(80, 0, 1), key(70, 1, 1)];
        let mapping = select_mapping(&candidates, 2, 2);
        assert_eq!(mapping.get(&0), Some(&(90, 0)));
        assert_eq!(mapping.get(&1), Some(&(70, 1)));
    }

    #[test]
    fn crossing_pair_survives_fill_but_loses_at_scoring() {
        // the top-scored pair crosses; a later start that avoids it scores
        // higher under the monotone filter
        let candidates = [key(95, 0, 1), key(90, 1, 0), key(60, 0, 0), key(60, 1, 1)];
        let mapping = select_mapping(&candidates, 2, 2);

        // start 0 keeps (0, 1) and (1, 0) with monotone score 95; start 2
        // keeps (0, 0) and (1, 1) scoring 120, which wins
        assert_eq!(mapping.get(&0), Some(&(60, 0)));
        assert_eq!(mapping.get(&1), Some(&(60, 1)));
    }

    #[test]
    fn first_strictly_better_mapping_is_kept_on_ties() {
        // two symmetric crossings tie at 90; the first computed mapping wins
        let candidates = [key(90, 0, 1), key(90, 1, 0)];
        let mapping = select_mapping(&candidates, 2, 2);
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.get(&0), Some(&(90, 1)));
    }

    #[test]
    fn empty_candidates_give_empty_mapping() {
        assert!(select_mapping(&[], 3, 3).is_empty());
    }

    #[test]
    fn word_span_bytes_covers_first_to_last() {
        let config = CompareConfig::default();
        let words = split_words(b"alpha beta gamma", 0, &config);
        // words: [alpha][ ][beta][ ][gamma]
        let section = word_span_bytes(&words, 2, 3);
        assert_eq!(section, Section::new(6, 10));
    }
}
