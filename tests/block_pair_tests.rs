mod common;

use common::{compare_docs, scheme};
use text_compare::{CompareConfig, CompareResult, ViewId};

#[test]
fn similar_lines_map_one_to_one_with_byte_ranges() {
    let masks = scheme();
    let (editor, outcome) = compare_docs(
        &["alpha one", "beta two"],
        &["alpha 1", "beta 2"],
        &CompareConfig::default(),
    );

    assert_eq!(outcome.result, CompareResult::Mismatch);

    // both lines of each side carry the changed marker (shifted by the
    // origin workaround line)
    assert_eq!(editor.lines_with(ViewId::Main, masks.changed), vec![1, 2]);
    assert_eq!(editor.lines_with(ViewId::Sub, masks.changed), vec![1, 2]);

    // per-pair byte ranges: "one"/"1" then "two"/"2"
    assert_eq!(
        editor.changed_ranges,
        vec![
            (ViewId::Main, 7, 3),
            (ViewId::Sub, 7, 1),
            (ViewId::Main, 16, 3),
            (ViewId::Sub, 14, 1),
        ]
    );

    // no plain added/removed markers remain in the paired block
    assert!(editor.lines_with(ViewId::Main, masks.removed).is_empty());
    assert!(editor.lines_with(ViewId::Sub, masks.added).is_empty());
}

#[test]
fn dissimilar_replacement_stays_unpaired() {
    let masks = scheme();
    let (editor, outcome) =
        compare_docs(&["aaa bbb"], &["xxx yyy"], &CompareConfig::default());

    assert_eq!(outcome.result, CompareResult::Mismatch);
    assert_eq!(editor.lines_with(ViewId::Main, masks.removed), vec![1]);
    assert_eq!(editor.lines_with(ViewId::Sub, masks.added), vec![1]);
    assert!(editor.lines_with(ViewId::Main, masks.changed).is_empty());
    assert!(editor.changed_ranges.is_empty());
}

#[test]
fn word_count_gate_skips_lopsided_pairs() {
    let masks = scheme();
    // 13 words against 1 word is beyond the 2x gate even though "a" matches
    let (editor, _) = compare_docs(&["a b c d e f g"], &["a"], &CompareConfig::default());

    assert!(editor.lines_with(ViewId::Main, masks.changed).is_empty());
    assert!(editor.changed_ranges.is_empty());
    assert_eq!(editor.lines_with(ViewId::Main, masks.removed), vec![1]);
    assert_eq!(editor.lines_with(ViewId::Sub, masks.added), vec![1]);
}

#[test]
fn half_convergence_is_required_for_pairing() {
    let masks = scheme();
    // 1 of 5 words matches: 20 percent by words, 25 by bytes
    let (editor, _) = compare_docs(
        &["aa.bb.cc"],
        &["aa,xx,yy"],
        &CompareConfig::default(),
    );
    assert!(editor.lines_with(ViewId::Main, masks.changed).is_empty());

    // 2 of 3 words match: pairs fine
    let (editor, _) = compare_docs(&["aa.bb"], &["aa.cc"], &CompareConfig::default());
    assert_eq!(editor.lines_with(ViewId::Main, masks.changed), vec![1]);
}

#[test]
fn unbalanced_pair_emits_changes_on_one_side_only() {
    let masks = scheme();
    // the sub line only gains words, so the main line has no change range
    let (editor, outcome) = compare_docs(
        &["hello world"],
        &["hello brave world"],
        &CompareConfig::default(),
    );

    assert_eq!(outcome.result, CompareResult::Mismatch);
    assert_eq!(editor.changed_ranges, vec![(ViewId::Sub, 7, 6)]);
    assert_eq!(editor.lines_with(ViewId::Main, masks.changed), vec![1]);
    assert_eq!(editor.lines_with(ViewId::Sub, masks.changed), vec![1]);
}

#[test]
fn interleaved_unchanged_lines_split_the_alignment() {
    let masks = scheme();
    // middle lines of the replaced blocks pair up; the surrounding surplus
    // lines keep their plain masks
    let (editor, outcome) = compare_docs(
        &["start", "zzz", "value = 1", "end"],
        &["start", "value = 2", "qqq", "end"],
        &CompareConfig::default(),
    );

    assert_eq!(outcome.result, CompareResult::Mismatch);
    assert_eq!(editor.lines_with(ViewId::Main, masks.changed), vec![2]);
    assert_eq!(editor.lines_with(ViewId::Sub, masks.changed), vec![1]);
    assert_eq!(editor.lines_with(ViewId::Main, masks.removed), vec![1]);
    assert_eq!(editor.lines_with(ViewId::Sub, masks.added), vec![2]);
}

#[test]
fn ignoring_spaces_pairs_reindented_lines() {
    let config = CompareConfig {
        ignore_spaces: true,
        ..CompareConfig::default()
    };
    let masks = scheme();

    // indentation-only difference hashes equal, so the whole compare matches
    let (_, outcome) = compare_docs(&["    call();"], &["\tcall();"], &config);
    assert_eq!(outcome.result, CompareResult::Match);

    // with a real change on top, the pair maps and only the token differs
    let (editor, outcome) = compare_docs(&["    call(1);"], &["\tcall(2);"], &config);
    assert_eq!(outcome.result, CompareResult::Mismatch);
    assert_eq!(editor.lines_with(ViewId::Main, masks.changed), vec![1]);
    assert_eq!(editor.lines_with(ViewId::Sub, masks.changed), vec![1]);
}
