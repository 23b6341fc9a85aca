use markdown_notebook_engine::{
    ANNOTATION_KEY, Cell, CellType, Code, Document, Kind, KindExpr, Mode, Segmenter, io, matches,
    select, substitute,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

fn segment(markdown: &str) -> Vec<(Option<Kind>, String)> {
    let mut doc = Document::from_markdown(markdown);
    Segmenter::new(["answer"], ["note"])
        .unwrap()
        .segment(&mut doc, &mut vec![]);
    doc.cells
        .into_iter()
        .map(|cell| (cell.kind, cell.source))
        .collect()
}

fn text(source: &str) -> (Option<Kind>, String) {
    (Some(Kind::Text), source.to_string())
}

#[test]
fn plain_text_is_trimmed_into_one_cell() {
    assert_eq!(
        segment("\n\n  First line\nsecond  \n\n"),
        vec![text("  First line\nsecond")]
    );
}

#[rstest]
#[case("```\ncode  \n```")]
#[case("~~~~ rust\n```\nnot closed by backticks\n~~~~")]
#[case("   ```\n    indented\n```")]
fn fences_come_back_verbatim(#[case] fence: &str) {
    assert_eq!(segment(fence), vec![(Some(Kind::Fence), fence.to_string())]);
}

#[test]
fn longer_closing_fence_closes() {
    assert_eq!(
        segment("```\nx\n`````\ntail"),
        vec![(Some(Kind::Fence), "```\nx\n`````".to_string()), text("tail")]
    );
}

#[test]
fn answer_marker_is_an_empty_placeholder() {
    assert_eq!(
        segment("Question?\n<!-- answer -->"),
        vec![
            text("Question?"),
            (Some(Kind::Named("answer".into())), String::new()),
        ]
    );
    assert_eq!(
        segment("<!-- answer -->"),
        vec![(Some(Kind::Named("answer".into())), String::new())]
    );
}

#[test]
fn note_block_holds_its_body() {
    assert_eq!(
        segment("<!-- note -->\n\nBody line\n\n<!-- note -->"),
        vec![(Some(Kind::Named("note".into())), "Body line".to_string())]
    );
}

#[test]
fn closing_hashes_are_not_part_of_the_heading() {
    let cells = segment("### Title ###");
    assert_eq!(
        cells[0].0,
        Some(Kind::Head {
            level: 3,
            heading: "Title".into()
        })
    );
    assert_eq!(cells[0].1, "### Title ###");
}

#[rstest]
#[case("#hashtag")]
#[case("####### seven")]
#[case("    # indented code")]
#[case("#")]
fn not_headings(#[case] line: &str) {
    assert_eq!(segment(line), vec![text(line.trim_end())]);
}

#[test]
fn segmenting_twice_changes_nothing() {
    let mut doc = Document::from_markdown("# A\ntext\n```\nc\n```\n<!-- answer -->");
    let segmenter = Segmenter::new(["answer"], ["note"]).unwrap();
    segmenter.segment(&mut doc, &mut vec![]);
    let once = doc.clone();
    segmenter.segment(&mut doc, &mut vec![]);
    assert_eq!(doc, once);
}

#[test]
fn every_cell_is_selected_by_all_and_nothing_by_invalid_tokens() {
    let doc = Document::from_cells(vec![
        Cell::markdown("# H").with_kind(Kind::Head {
            level: 1,
            heading: "H".into(),
        }),
        Cell::markdown("unsegmented"),
        Cell::code("c"),
        Cell::raw("r"),
    ]);
    let all = KindExpr::parse("all");
    let invalid = KindExpr::parse("md: cells Markdown");
    for cell in doc.iter() {
        assert!(matches(cell, &all));
        assert!(!matches(cell, &invalid));
    }
}

#[test]
fn selection_is_in_document_order_and_mutable() {
    let mut doc = Document::from_cells(vec![
        Cell::code("1"),
        Cell::markdown("m").with_kind(Kind::Text),
        Cell::code("2"),
    ]);
    for cell in select(&mut doc, &KindExpr::parse("code")) {
        cell.source.push('!');
    }
    let sources: Vec<_> = doc.iter().map(|c| c.source.as_str()).collect();
    assert_eq!(sources, ["1!", "m", "2!"]);
}

#[test]
fn mismatched_transliteration_is_skipped() {
    let mut doc = Document::from_cells(vec![Cell::markdown("a-b").with_kind(Kind::Text)]);
    let mut diagnostics = vec![];
    substitute(
        &mut doc,
        &KindExpr::all(),
        Mode::Chars,
        &[("-", "−"), ("ab", "A"), ("a", "A")],
        &mut diagnostics,
    );
    assert_eq!(doc.cells[0].source, "A−b");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, Code::BadSubstitution);
}

#[test]
fn derived_kind_replaces_stale_annotation_from_disk() {
    // a head annotation without level cannot be decoded, so the cell counts as unsegmented
    let notebook = json!({
        "cells": [{
            "cell_type": "markdown",
            "metadata": {ANNOTATION_KEY: {"kind": "head"}, "tags": ["x"]},
            "source": "Just prose"
        }],
        "metadata": {},
        "nbformat": 4,
        "nbformat_minor": 5
    });
    let mut doc = io::from_json(&notebook.to_string()).unwrap();
    assert_eq!(doc.cells[0].kind, None);

    Segmenter::new(["answer"], ["note"])
        .unwrap()
        .segment(&mut doc, &mut vec![]);

    let written: serde_json::Value = serde_json::from_str(&io::to_json(&doc).unwrap()).unwrap();
    assert_eq!(
        written["cells"][0]["metadata"],
        json!({ANNOTATION_KEY: {"kind": "text"}, "tags": ["x"]})
    );
    assert_eq!(doc.cells[0].cell_type, CellType::Markdown);
}
