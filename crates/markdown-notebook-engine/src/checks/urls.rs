use std::{collections::HashMap, time::Duration};

use crate::diagnostics::{Code, Diagnostic, DiagnosticSink};
use crate::models::Document;
use crate::rewrite::links::link_targets;
use crate::selection::{KindExpr, select_ref};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("{0}")]
    Transport(String),
}

impl From<ureq::Error> for ResolveError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::Status(code, _) => ResolveError::Status(code),
            ureq::Error::Transport(t) => ResolveError::Transport(t.to_string()),
        }
    }
}

/// Decides whether a URL can be reached.
pub trait UrlResolver {
    fn resolve(&self, url: &str) -> Result<(), ResolveError>;
}

/// Resolves URLs over HTTP with a bounded timeout per request.
///
/// Tries `HEAD` first and falls back to `GET` for servers that refuse it.
pub struct HttpResolver {
    agent: ureq::Agent,
}

impl HttpResolver {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new() -> Self {
        Self::with_timeout(Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

impl Default for HttpResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlResolver for HttpResolver {
    fn resolve(&self, url: &str) -> Result<(), ResolveError> {
        match self.agent.head(url).call() {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(405, _)) => {
                log::debug!("HEAD refused by {url}, retrying with GET");
                self.agent.get(url).call()?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Resolves every `scheme://` link target in the selected cells and warns
/// about the ones that fail. Each distinct URL is resolved once per call,
/// but every occurrence of a broken one is reported.
pub fn check_urls(
    doc: &Document,
    expr: &KindExpr,
    resolver: &dyn UrlResolver,
    sink: &mut dyn DiagnosticSink,
) -> usize {
    let mut seen: HashMap<&str, Result<(), ResolveError>> = HashMap::new();
    let mut found = 0;

    for (index, cell) in select_ref(doc, expr) {
        for (line, url) in link_targets(&cell.source).filter(|(_, t)| t.contains("://")) {
            let result = seen.entry(url).or_insert_with(|| {
                log::debug!("checking {url}");
                resolver.resolve(url)
            });
            if let Err(e) = result {
                found += 1;
                sink.report(
                    Diagnostic::warning(Code::BrokenUrl, format!("{url}: {e}"))
                        .at_cell(index)
                        .at_line_index(line),
                );
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cell;
    use crate::tests::text_cell;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    /// Fails any URL containing "broken" and records every call.
    #[derive(Default)]
    struct FakeResolver {
        calls: RefCell<Vec<String>>,
    }

    impl UrlResolver for FakeResolver {
        fn resolve(&self, url: &str) -> Result<(), ResolveError> {
            self.calls.borrow_mut().push(url.to_string());
            if url.contains("broken") {
                Err(ResolveError::Status(404))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn resolves_each_url_once_and_reports_every_broken_occurrence() {
        let doc = Document::from_cells(vec![
            text_cell("[a](https://ok.org) [b](https://broken.org)"),
            text_cell("again [c](https://broken.org)\n[d](https://ok.org)"),
        ]);
        let resolver = FakeResolver::default();
        let mut diagnostics = vec![];

        assert_eq!(check_urls(&doc, &KindExpr::all(), &resolver, &mut diagnostics), 2);
        assert_eq!(
            *resolver.calls.borrow(),
            vec!["https://ok.org", "https://broken.org"]
        );
        let places: Vec<_> = diagnostics.iter().map(|d| (d.cell, d.line)).collect();
        assert_eq!(places, vec![(Some(0), Some(1)), (Some(1), Some(1))]);
        assert!(diagnostics[0].message.contains("HTTP status 404"));
    }

    #[test]
    fn skips_relative_and_label_targets() {
        let doc = Document::from_cells(vec![
            text_cell("[a](m269) [b](../x.md) [c](mailto:x@y.z)"),
            Cell::code("[d](https://broken.org)"),
        ]);
        let resolver = FakeResolver::default();
        assert_eq!(check_urls(&doc, &KindExpr::parse("md:text"), &resolver, &mut vec![]), 0);
        assert!(resolver.calls.borrow().is_empty());
    }
}
