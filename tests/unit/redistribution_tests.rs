/*!
 * Tests for walking layouts into units and writing translations back
 */

use doctran::document::model::{ContainerKind, Layout, RunStyle};
use doctran::document::redistribute::{apply, partition, split_lengths};
use doctran::document::walker::{WalkerConfig, extract};

fn bold() -> RunStyle {
    RunStyle { bold: true, ..RunStyle::default() }
}

fn three_run_layout() -> Layout {
    let mut layout = Layout::new();
    let body = layout.add_flow(ContainerKind::Body);
    let p = layout.add_paragraph(body);
    layout.add_run(p, "ab", bold());
    layout.add_run(p, "cde", RunStyle::default());
    layout.add_run(p, "fghij", RunStyle { italic: true, ..RunStyle::default() });
    layout
}

#[test]
fn test_split_lengths_withDoubledText_shouldScaleEachRun() {
    assert_eq!(split_lengths(&[2, 3, 5], 20), vec![4, 6, 10]);
}

#[test]
fn test_split_lengths_withUnevenText_shouldGiveRemainderToLastRun() {
    let lengths = split_lengths(&[2, 3, 5], 7);
    assert_eq!(lengths, vec![1, 2, 4]);
    assert_eq!(lengths.iter().sum::<usize>(), 7);
}

#[test]
fn test_partition_anyLength_shouldConcatenateToTranslation() {
    let layout = three_run_layout();
    let unit = extract(&layout, &WalkerConfig::default()).remove(0);

    for translated in ["", "x", "二十个字符的译文测试", "A translated sentence of some length."] {
        let slices = partition(&unit, translated);
        assert_eq!(slices.len(), 3);
        let joined: String = slices.iter().map(|(_, s)| s.as_str()).collect();
        assert_eq!(joined, translated);
    }
}

#[test]
fn test_apply_shouldKeepRunOrderAndStyles() {
    let mut layout = three_run_layout();
    let unit = extract(&layout, &WalkerConfig::default()).remove(0);
    let before: Vec<RunStyle> = layout.runs.iter().map(|r| r.style.clone()).collect();

    apply(&mut layout, &unit, "ABCDEFGHIJKLMNOPQRST");

    let texts: Vec<&str> = layout.runs.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["ABCD", "EFGHIJ", "KLMNOPQRST"]);
    let after: Vec<RunStyle> = layout.runs.iter().map(|r| r.style.clone()).collect();
    assert_eq!(before, after);
}

#[test]
fn test_apply_withSingleRun_shouldReplaceWholeText() {
    let mut layout = Layout::new();
    let body = layout.add_flow(ContainerKind::Body);
    let p = layout.add_paragraph(body);
    layout.add_run(p, "Hello", RunStyle::default());
    let unit = extract(&layout, &WalkerConfig::default()).remove(0);

    apply(&mut layout, &unit, "Bonjour tout le monde");
    assert_eq!(layout.runs[0].text, "Bonjour tout le monde");
}

#[test]
fn test_extract_withBlankParagraphs_shouldSkipThem() {
    let mut layout = Layout::new();
    let body = layout.add_flow(ContainerKind::Body);
    let blank = layout.add_paragraph(body);
    layout.add_run(blank, "   ", RunStyle::default());
    let p = layout.add_paragraph(body);
    layout.add_run(p, "Text", RunStyle::default());

    let units = extract(&layout, &WalkerConfig::default());
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].text, "Text");
    assert_eq!(units[0].unit_id, 0);
}

#[test]
fn test_extract_withHeadersExcluded_shouldOnlyWalkOtherContainers() {
    let mut layout = Layout::new();
    let header = layout.add_flow(ContainerKind::Header);
    let p = layout.add_paragraph(header);
    layout.add_run(p, "Header", RunStyle::default());
    let body = layout.add_flow(ContainerKind::Body);
    let p = layout.add_paragraph(body);
    layout.add_run(p, "Body", RunStyle::default());

    let config = WalkerConfig { include_headers: false, ..WalkerConfig::default() };
    let texts: Vec<String> = extract(&layout, &config).into_iter().map(|u| u.text).collect();
    assert_eq!(texts, vec!["Body"]);
}
