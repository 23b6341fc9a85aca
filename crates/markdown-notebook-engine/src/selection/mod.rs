//! # Selection
//!
//! Classifies cells against a [`KindExpr`] and filters documents.
//!
//! Selections borrow cells straight out of the document, in document order,
//! so passes can mutate them in place without copying.

pub mod expr;

pub use expr::{KindExpr, Token};

use crate::models::{Cell, Document};

pub fn matches(cell: &Cell, expr: &KindExpr) -> bool {
    expr.matches(cell)
}

/// Exclusive references to every matching cell, in document order.
pub fn select<'a>(doc: &'a mut Document, expr: &KindExpr) -> Vec<&'a mut Cell> {
    warn_invalid(expr);
    doc.cells.iter_mut().filter(|c| expr.matches(c)).collect()
}

/// Like [`select`], paired with each cell's index in the document.
pub fn select_indexed<'a>(doc: &'a mut Document, expr: &KindExpr) -> Vec<(usize, &'a mut Cell)> {
    warn_invalid(expr);
    doc.cells
        .iter_mut()
        .enumerate()
        .filter(|(_, c)| expr.matches(c))
        .collect()
}

/// Read-only selection with document indices, for checks.
pub fn select_ref<'a>(
    doc: &'a Document,
    expr: &'a KindExpr,
) -> impl Iterator<Item = (usize, &'a Cell)> + 'a {
    warn_invalid(expr);
    doc.cells
        .iter()
        .enumerate()
        .filter(move |(_, c)| expr.matches(c))
}

fn warn_invalid(expr: &KindExpr) {
    for token in expr.invalid_tokens() {
        log::debug!("kind expression token {token:?} matches no cell");
    }
}
