//! Generic longest-common-subsequence engine.
//!
//! Produces a flat span list over two sequences: `Match` spans cover a common
//! subsequence of maximal total length, `InA`/`InB` spans cover the rest.
//! At a replacement boundary the `InA` span always precedes the `InB` span.
//!
//! The search is Myers' greedy O((N+M)D) with a stored per-iteration trace.
//! The trace is the only super-linear allocation; its size is bounded and
//! exceeding the bound is reported instead of paid for.

use serde::{Deserialize, Serialize};

use crate::report::CompareError;

/// Poll the cancel hook once per this many outer search iterations.
pub(crate) const CANCEL_CHECK_STRIDE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    Match,
    InA,
    InB,
}

/// One run of the diff. `off` indexes sequence A for `Match` and `InA`
/// spans and sequence B for `InB` spans; `len` is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub kind: SpanKind,
    pub off: usize,
    pub len: usize,
}

/// Diff two sequences whose elements compare by equality (hash-backed
/// element types implement `PartialEq` accordingly).
pub fn diff_spans<T: PartialEq>(
    a: &[T],
    b: &[T],
    trace_cell_limit: usize,
) -> Result<Vec<Span>, CompareError> {
    diff_sequences(a, b, trace_cell_limit, &mut || false)
}

/// Like [`diff_spans`] but polls `cancel` between outer search iterations;
/// a `true` return aborts the diff with [`CompareError::Cancelled`].
pub(crate) fn diff_sequences<T: PartialEq>(
    a: &[T],
    b: &[T],
    trace_cell_limit: usize,
    cancel: &mut dyn FnMut() -> bool,
) -> Result<Vec<Span>, CompareError> {
    let prefix = common_prefix_len(a, b);
    let suffix = common_suffix_len(&a[prefix..], &b[prefix..]);

    let core_a = &a[prefix..a.len() - suffix];
    let core_b = &b[prefix..b.len() - suffix];

    let mut runs: Vec<MatchRun> = Vec::new();
    if prefix > 0 {
        runs.push(MatchRun {
            a: 0,
            b: 0,
            len: prefix,
        });
    }
    for run in myers_match_runs(core_a, core_b, trace_cell_limit, cancel)? {
        runs.push(MatchRun {
            a: run.a + prefix,
            b: run.b + prefix,
            len: run.len,
        });
    }
    if suffix > 0 {
        runs.push(MatchRun {
            a: a.len() - suffix,
            b: b.len() - suffix,
            len: suffix,
        });
    }

    Ok(runs_to_spans(&runs, a.len(), b.len()))
}

/// A maximal run of equal elements, located in both sequences.
#[derive(Debug, Clone, Copy)]
struct MatchRun {
    a: usize,
    b: usize,
    len: usize,
}

fn common_prefix_len<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

fn common_suffix_len<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Core Myers search. Returns the match runs of one maximal common
/// subsequence, in ascending order.
fn myers_match_runs<T: PartialEq>(
    a: &[T],
    b: &[T],
    trace_cell_limit: usize,
    cancel: &mut dyn FnMut() -> bool,
) -> Result<Vec<MatchRun>, CompareError> {
    let n = a.len();
    let m = b.len();
    if n == 0 || m == 0 {
        return Ok(Vec::new());
    }

    let max = n + m;
    let offset = max as isize;

    // v[k + offset] holds the furthest x reached on diagonal k.
    let mut v = vec![0usize; 2 * max + 1];
    // trace[d] is the band of v for k in [-d, d] after iteration d.
    let mut trace: Vec<Vec<usize>> = Vec::new();
    let mut trace_cells = 0usize;

    let found_d = 'search: {
        for d in 0..=max {
            if d % CANCEL_CHECK_STRIDE == 0 && cancel() {
                return Err(CompareError::Cancelled);
            }

            let d_i = d as isize;
            let mut k = -d_i;
            while k <= d_i {
                let idx = (k + offset) as usize;
                let mut x = if k == -d_i || (k != d_i && v[idx - 1] < v[idx + 1]) {
                    v[idx + 1]
                } else {
                    v[idx - 1] + 1
                };
                let mut y = (x as isize - k) as usize;
                while x < n && y < m && a[x] == b[y] {
                    x += 1;
                    y += 1;
                }
                v[idx] = x;
                if x >= n && y >= m {
                    break 'search d;
                }
                k += 2;
            }

            trace_cells += 2 * d + 1;
            if trace_cells > trace_cell_limit {
                return Err(CompareError::TraceLimitExceeded {
                    cells: trace_cells,
                    limit: trace_cell_limit,
                });
            }
            trace.push(v[(offset - d_i) as usize..=(offset + d_i) as usize].to_vec());
        }
        unreachable!("the edit distance is at most n + m");
    };

    // Walk the trace backwards, collecting the diagonal runs.
    let mut runs_rev: Vec<MatchRun> = Vec::new();
    let mut x = n;
    let mut y = m;
    for d in (1..=found_d).rev() {
        let band = &trace[d - 1];
        let band_at = |k: isize| band[(k + d as isize - 1) as usize];

        let k = x as isize - y as isize;
        let d_i = d as isize;
        let prev_k = if k == -d_i || (k != d_i && band_at(k - 1) < band_at(k + 1)) {
            k + 1
        } else {
            k - 1
        };
        let prev_x = band_at(prev_k);
        let prev_y = (prev_x as isize - prev_k) as usize;

        // One edit leads from (prev_x, prev_y) onto diagonal k, then a run of
        // equal elements leads to (x, y).
        let snake = if prev_k == k + 1 {
            x - prev_x
        } else {
            y - prev_y
        };
        if snake > 0 {
            runs_rev.push(MatchRun {
                a: x - snake,
                b: y - snake,
                len: snake,
            });
        }

        x = prev_x;
        y = prev_y;
    }
    if x > 0 {
        // the d = 0 leg is a pure diagonal from the origin
        runs_rev.push(MatchRun { a: 0, b: 0, len: x });
    }

    runs_rev.reverse();
    Ok(runs_rev)
}

fn runs_to_spans(runs: &[MatchRun], total_a: usize, total_b: usize) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::new();
    let mut pos_a = 0usize;
    let mut pos_b = 0usize;

    for run in runs {
        push_gap(&mut spans, pos_a, run.a, pos_b, run.b);
        if run.len > 0 {
            let merged = match spans.last_mut() {
                Some(last) if last.kind == SpanKind::Match && last.off + last.len == run.a => {
                    last.len += run.len;
                    true
                }
                _ => false,
            };
            if !merged {
                spans.push(Span {
                    kind: SpanKind::Match,
                    off: run.a,
                    len: run.len,
                });
            }
        }
        pos_a = run.a + run.len;
        pos_b = run.b + run.len;
    }
    push_gap(&mut spans, pos_a, total_a, pos_b, total_b);

    spans
}

fn push_gap(spans: &mut Vec<Span>, pos_a: usize, next_a: usize, pos_b: usize, next_b: usize) {
    if next_a > pos_a {
        spans.push(Span {
            kind: SpanKind::InA,
            off: pos_a,
            len: next_a - pos_a,
        });
    }
    if next_b > pos_b {
        spans.push(Span {
            kind: SpanKind::InB,
            off: pos_b,
            len: next_b - pos_b,
        });
    }
}
