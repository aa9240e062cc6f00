use overtype::page::merge::{merge_fragments, Fragment, MERGE_GAP_ABSOLUTE};

#[test]
fn test_index_strictly_increasing_in_reading_order() {
    // Three lines, fragments supplied out of reading order within lines.
    let fragments = vec![
        Fragment::new(400.0, 10.0, 50.0, 20.0, "A-right"),
        Fragment::new(10.0, 100.0, 50.0, 20.0, "B-left"),
        Fragment::new(10.0, 12.0, 50.0, 20.0, "A-left"),
        Fragment::new(10.0, 200.0, 50.0, 20.0, "C"),
        Fragment::new(400.0, 102.0, 50.0, 20.0, "B-right"),
    ];

    let regions = merge_fragments(&fragments);

    let indices: Vec<u32> = regions.iter().map(|r| r.index).collect();
    assert_eq!(indices, vec![1, 2, 3, 4, 5]);

    let texts: Vec<&str> = regions.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(
        texts,
        vec!["A-left", "A-right", "B-left", "B-right", "C"]
    );
}

#[test]
fn test_gap_49_merges_under_absolute_rule() {
    // Heights of 24 cap the relative threshold at 48, so only the absolute
    // rule (gap < 50) can admit this pair.
    let regions = merge_fragments(&[
        Fragment::new(0.0, 0.0, 10.0, 24.0, "left"),
        Fragment::new(59.0, 0.0, 10.0, 24.0, "right"),
    ]);
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].text, "leftright");
}

#[test]
fn test_gap_50_does_not_merge_under_absolute_rule() {
    let regions = merge_fragments(&[
        Fragment::new(0.0, 0.0, 10.0, 24.0, "left"),
        Fragment::new(10.0 + MERGE_GAP_ABSOLUTE, 0.0, 10.0, 24.0, "right"),
    ]);
    assert_eq!(regions.len(), 2);
}

#[test]
fn test_relative_rule_fires_independently() {
    // gap = 60 >= 50 fails the absolute rule; 2 * max(35, 35) = 70 admits it.
    let merged = merge_fragments(&[
        Fragment::new(0.0, 0.0, 10.0, 35.0, "tall"),
        Fragment::new(70.0, 0.0, 10.0, 35.0, "print"),
    ]);
    assert_eq!(merged.len(), 1);

    // Same geometry with short fragments: 2 * 10 = 20 and the pair splits.
    let split = merge_fragments(&[
        Fragment::new(0.0, 0.0, 10.0, 10.0, "small"),
        Fragment::new(70.0, 0.0, 10.0, 10.0, "print"),
    ]);
    assert_eq!(split.len(), 2);
}

#[test]
fn test_end_to_end_adjacent_words_merge() {
    // gap = 45 - 40 = 5 < 50.
    let regions = merge_fragments(&[
        Fragment::new(10.0, 10.0, 30.0, 20.0, "AB"),
        Fragment::new(45.0, 12.0, 30.0, 20.0, "CD"),
    ]);

    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].text, "ABCD");
    assert_eq!(regions[0].rect.width, 65.0);
    assert_eq!(regions[0].index, 1);
}

#[test]
fn test_touching_fragments_always_merge() {
    let regions = merge_fragments(&[
        Fragment::new(0.0, 0.0, 40.0, 10.0, "touch"),
        Fragment::new(40.0, 0.0, 40.0, 10.0, "ing"),
    ]);
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].text, "touching");
    assert_eq!(regions[0].rect.width, 80.0);
}
