//! Move detection across non-matching blocks.
//!
//! For every unmatched, non-blank line in an `InA` block the detector finds
//! the longest run around it that also occurs in `InB` blocks, then scans the
//! remaining `InA` blocks for other occurrences of the same content. The
//! anchor arithmetic decides whether the run was relocated or merely
//! duplicated: a run is moved iff the `InB` occurrences outnumber the `InA`
//! occurrences by exactly one, except for single lines matched in several
//! places.

use crate::blocks::{BlockDiff, LineMatch, Section};
use crate::hashing::is_blank_hash;
use crate::lcs::SpanKind;
use crate::progress::ProgressMonitor;
use crate::report::CompareError;

/// The best run found for one anchor line, with every occurrence that ties.
#[derive(Debug, Clone)]
struct MatchScan {
    /// Run within the source block, block local.
    section: Section,
    /// Additional `InA` occurrences as (block index, block-local offset).
    alternates: Vec<(usize, usize)>,
    /// `InB` occurrences as (block index, block-local offset).
    targets: Vec<(usize, usize)>,
}

#[derive(Debug, Clone)]
struct BestMatch {
    block: usize,
    anchor: usize,
    scan: MatchScan,
}

pub(crate) fn detect_moves<P: ProgressMonitor>(
    blocks: &mut [BlockDiff],
    hashes_a: &[u64],
    hashes_b: &[u64],
    progress: &mut P,
) -> Result<(), CompareError> {
    progress.set_max_count(blocks.len());

    for di1 in 0..blocks.len() {
        if !progress.advance() {
            return Err(CompareError::Cancelled);
        }
        if blocks[di1].kind != SpanKind::InA {
            continue;
        }

        let mut ei1 = 0usize;
        while ei1 < blocks[di1].len {
            if let Some((len, _)) = blocks[di1].info.matched_section(ei1) {
                ei1 += len;
                continue;
            }
            if is_blank_hash(hashes_a[blocks[di1].off + ei1]) {
                ei1 += 1;
                continue;
            }

            let scan = scan_targets(blocks, hashes_a, hashes_b, di1, ei1);
            if scan.section.len == 0 {
                ei1 += 1;
                continue;
            }

            let mut best = BestMatch {
                block: di1,
                anchor: ei1,
                scan,
            };
            improve_from_block(blocks, hashes_a, hashes_b, di1, &mut best);
            for di2 in di1 + 1..blocks.len() {
                if blocks[di2].kind == SpanKind::InA {
                    improve_from_block(blocks, hashes_a, hashes_b, di2, &mut best);
                }
            }

            let is_moved = best.scan.alternates.len() + 1 == best.scan.targets.len()
                && !(best.scan.section.len == 1 && best.scan.targets.len() > 1);

            let len = best.scan.section.len;
            blocks[best.block].info.matches.push(LineMatch {
                section: Section::new(best.scan.section.off, len),
                is_moved,
            });
            for &(bi, off) in &best.scan.alternates {
                blocks[bi].info.matches.push(LineMatch {
                    section: Section::new(off, len),
                    is_moved,
                });
            }
            for &(bi, off) in &best.scan.targets {
                blocks[bi].info.matches.push(LineMatch {
                    section: Section::new(off, len),
                    is_moved,
                });
            }

            if best.block == di1 && best.anchor == ei1 {
                ei1 = best.scan.section.off + len;
            }
            // otherwise the current line was not the committed anchor;
            // re-examine it against the updated match records
        }
    }

    Ok(())
}

/// Scan every `InB` block for the longest run matching the line at
/// (`src_block`, `src_line`), extending left and right while hashes agree and
/// no recorded match is crossed on the target side. Only occurrences tied
/// for the maximum length are kept.
fn scan_targets(
    blocks: &[BlockDiff],
    hashes_a: &[u64],
    hashes_b: &[u64],
    src_block: usize,
    src_line: usize,
) -> MatchScan {
    let mut scan = MatchScan {
        section: Section::default(),
        alternates: Vec::new(),
        targets: Vec::new(),
    };
    let mut min_match_len = 1usize;
    let src = &blocks[src_block];
    let anchor_hash = hashes_a[src.off + src_line];

    for (bi, block) in blocks.iter().enumerate() {
        if block.kind != SpanKind::InB {
            continue;
        }

        let mut ei2 = 0usize;
        while ei2 + min_match_len <= block.len {
            if anchor_hash != hashes_b[block.off + ei2] {
                ei2 += 1;
                continue;
            }
            if let Some((len, _)) = block.info.matched_section(ei2) {
                ei2 += len;
                continue;
            }

            let mut s1 = src_line;
            let mut s2 = ei2;
            while s1 > 0
                && s2 > 0
                && block.info.matched_section(s2 - 1).is_none()
                && hashes_a[src.off + s1 - 1] == hashes_b[block.off + s2 - 1]
            {
                s1 -= 1;
                s2 -= 1;
            }
            let mut e1 = src_line + 1;
            let mut e2 = ei2 + 1;
            while e1 < src.len
                && e2 < block.len
                && block.info.matched_section(e2).is_none()
                && hashes_a[src.off + e1] == hashes_b[block.off + e2]
            {
                e1 += 1;
                e2 += 1;
            }
            let match_len = e1 - s1;

            if scan.section.len > match_len {
                ei2 += 1;
                continue;
            }
            if scan.section.len < match_len {
                scan.section = Section::new(s1, match_len);
                scan.targets.clear();
                min_match_len = match_len;
            }
            scan.targets.push((bi, s2));
            ei2 = s2 + match_len;
        }
    }

    scan
}

/// Look for another occurrence of the current best run inside one `InA`
/// block. A strictly longer run found there takes over as the best; an
/// equal-length run with identical content is recorded as an alternate
/// source.
fn improve_from_block(
    blocks: &[BlockDiff],
    hashes_a: &[u64],
    hashes_b: &[u64],
    candidate_block: usize,
    best: &mut BestMatch,
) {
    let block = &blocks[candidate_block];
    let mut i = if candidate_block == best.block {
        best.scan.section.off + best.scan.section.len
    } else {
        0
    };

    while i + best.scan.section.len <= block.len {
        if hashes_a[block.off + i] != hashes_a[blocks[best.block].off + best.anchor] {
            i += 1;
            continue;
        }
        if let Some((len, _)) = block.info.matched_section(i) {
            i += len;
            continue;
        }

        let scan = scan_targets(blocks, hashes_a, hashes_b, candidate_block, i);
        if scan.section.len == 0 {
            i += 1;
            continue;
        }

        if best.scan.section.len < scan.section.len {
            best.block = candidate_block;
            best.anchor = i;
            best.scan = scan;
            i = best.scan.section.off + best.scan.section.len;
        } else if best.scan.section.len == scan.section.len {
            let best_off = blocks[best.block].off + best.scan.section.off;
            let cand_off = block.off + scan.section.off;
            let same_content =
                (0..scan.section.len).all(|k| hashes_a[best_off + k] == hashes_a[cand_off + k]);
            if same_content {
                best.scan.alternates.push((candidate_block, scan.section.off));
                i = scan.section.off + scan.section.len;
            } else {
                i += 1;
            }
        } else {
            i += 1;
        }
    }
}
