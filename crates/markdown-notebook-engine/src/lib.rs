pub mod checks;
pub mod diagnostics;
pub mod editing;
pub mod io;
pub mod models;
pub mod parsing;
pub mod rewrite;
pub mod selection;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use checks::{
    HttpResolver, ResolveError, UrlResolver, check_breaks, check_comments, check_lengths,
    check_levels, check_urls,
};
pub use diagnostics::{Code, Diagnostic, DiagnosticSink, LogSink, Severity};
pub use editing::{
    Target, TargetError, append, extract_code, merge, prepend, remove_annotations, remove_cells,
    set_cells,
};
pub use io::{IoError, load_document, read_markdown, read_notebook, write_notebook};
pub use models::{ANNOTATION_KEY, Cell, CellType, Document, Kind, Metadata};
pub use parsing::{MarkerError, Markers, Segmenter, segment};
pub use rewrite::{
    CharMap, FRACTIONS, Literal, Mode, POWERS, Pattern, Rewrite, RewriteError, apply,
    expand_urls, remove_comments, substitute,
};
pub use selection::{KindExpr, Token, matches, select, select_ref};
