//! # Checks
//!
//! Read-only validators. Each walks the selected cells, reports what it
//! finds to the sink and returns the number of problems reported. None of
//! them modifies the document.

pub mod comments;
pub mod levels;
pub mod lines;
pub mod urls;

pub use comments::check_comments;
pub use levels::check_levels;
pub use lines::{check_breaks, check_lengths};
pub use urls::{HttpResolver, ResolveError, UrlResolver, check_urls};
