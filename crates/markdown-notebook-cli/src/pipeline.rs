use std::time::Duration;

use anyhow::{Context, Result};
use markdown_notebook_config::{PipelineConfig, Step, Table};
use markdown_notebook_engine::{
    DiagnosticSink, Document, FRACTIONS, HttpResolver, KindExpr, Mode, POWERS, Segmenter, append,
    check_breaks, check_comments, check_lengths, check_levels, check_urls, expand_urls, merge,
    prepend, remove_annotations, remove_cells, remove_comments, set_cells, substitute,
};

/// A loaded pipeline: segments a document, then runs each step in order.
pub struct Pipeline {
    segmenter: Segmenter,
    steps: Vec<Step>,
    network: bool,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, network: bool) -> Result<Self> {
        let segmenter = Segmenter::new(&config.line_markers, &config.block_markers)
            .context("Invalid annotation markers in pipeline")?;
        Ok(Self {
            segmenter,
            steps: config.steps,
            network,
        })
    }

    pub fn process(&self, doc: &mut Document, sink: &mut dyn DiagnosticSink) {
        self.segmenter.segment(doc, sink);
        for step in &self.steps {
            log::debug!("step {}", step.action());
            self.run_step(step, doc, sink);
        }
    }

    fn run_step(&self, step: &Step, doc: &mut Document, sink: &mut dyn DiagnosticSink) {
        match step {
            Step::ReplaceStr {
                cells,
                pairs,
                table,
            } => {
                let expr = KindExpr::parse(cells);
                if let Some(table) = table {
                    let table = match table {
                        Table::Powers => POWERS,
                        Table::Fractions => FRACTIONS,
                    };
                    substitute(doc, &expr, Mode::Literal, table, sink);
                }
                substitute(doc, &expr, Mode::Literal, pairs, sink);
            }
            Step::ReplaceChar { cells, pairs } => {
                substitute(doc, &KindExpr::parse(cells), Mode::Chars, pairs, sink);
            }
            Step::ReplaceRe { cells, pairs } => {
                substitute(doc, &KindExpr::parse(cells), Mode::Pattern, pairs, sink);
            }
            Step::RemoveComments { cells, keep } => {
                remove_comments(doc, &KindExpr::parse(cells), keep, sink);
            }
            Step::ExpandUrls { cells, labels } => {
                expand_urls(doc, &KindExpr::parse(cells), labels, sink);
            }
            Step::CheckUrls {
                cells,
                timeout_secs,
            } => {
                if !self.network {
                    log::info!("Skipping check_urls: network checks are disabled");
                    return;
                }
                let resolver = timeout_secs
                    .map(|secs| HttpResolver::with_timeout(Duration::from_secs(secs)))
                    .unwrap_or_default();
                check_urls(doc, &KindExpr::parse(cells), &resolver, sink);
            }
            Step::CheckBreaks { cells } => {
                check_breaks(doc, &KindExpr::parse(cells), sink);
            }
            Step::CheckLevels => {
                check_levels(doc, sink);
            }
            Step::CheckLengths { cells, max } => {
                check_lengths(doc, &KindExpr::parse(cells), *max, sink);
            }
            Step::CheckComments { cells } => {
                check_comments(doc, &KindExpr::parse(cells), sink);
            }
            Step::Append { text } => {
                append(doc, text, sink);
            }
            Step::Prepend { text, target } => {
                prepend(doc, text, target, sink);
            }
            Step::Merge { cells } => {
                merge(doc, &KindExpr::parse(cells));
            }
            Step::RemoveCells { cells, pattern } => {
                remove_cells(doc, &KindExpr::parse(cells), pattern, sink);
            }
            Step::RemoveAnnotations { cells } => {
                remove_annotations(doc, &KindExpr::parse(cells));
            }
            Step::SetCells {
                cells,
                editable,
                deletable,
            } => {
                set_cells(doc, &KindExpr::parse(cells), *editable, *deletable);
            }
        }
    }
}
