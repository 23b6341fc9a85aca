use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata key under which a cell's derived kind is persisted.
pub const ANNOTATION_KEY: &str = "segment";

/// Derived classification of a markdown cell, assigned by the segmenter.
///
/// Non-markdown cells never carry a kind; they are classified by their
/// native [`CellType`](super::CellType) alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A single ATX heading line.
    Head {
        /// Number of `#` characters (1 to 6).
        level: u8,
        /// Title text with the closing `#` run removed.
        heading: String,
    },
    /// A fenced block, delimiters included.
    Fence,
    /// Free text between the other kinds.
    Text,
    /// A caller-supplied annotation such as `answer` or `note`.
    Named(String),
}

impl Kind {
    pub const HEAD: &'static str = "head";
    pub const FENCE: &'static str = "fence";
    pub const TEXT: &'static str = "text";
    /// Deepest heading level; `head` annotations outside `1..=6` are malformed.
    pub const MAX_LEVEL: u8 = 6;

    /// The name used by `md:<kind>` selector tokens.
    pub fn name(&self) -> &str {
        match self {
            Kind::Head { .. } => Self::HEAD,
            Kind::Fence => Self::FENCE,
            Kind::Text => Self::TEXT,
            Kind::Named(name) => name,
        }
    }

    pub fn level(&self) -> Option<u8> {
        match self {
            Kind::Head { level, .. } => Some(*level),
            _ => None,
        }
    }

    /// Encodes the kind as the metadata value stored under [`ANNOTATION_KEY`].
    pub fn to_annotation(&self) -> Value {
        let annotation = Annotation {
            kind: self.name().to_string(),
            level: self.level(),
            heading: match self {
                Kind::Head { heading, .. } => Some(heading.clone()),
                _ => None,
            },
        };
        serde_json::to_value(annotation).unwrap_or(Value::Null)
    }

    /// Decodes a metadata annotation. Returns `None` for anything malformed,
    /// including a `head` without its level and title or with a level outside
    /// `1..=6`.
    pub fn from_annotation(value: &Value) -> Option<Self> {
        let annotation = Annotation::deserialize(value).ok()?;
        match annotation.kind.as_str() {
            Self::HEAD => Some(Kind::Head {
                level: annotation
                    .level
                    .filter(|level| (1..=Self::MAX_LEVEL).contains(level))?,
                heading: annotation.heading?,
            }),
            Self::FENCE => Some(Kind::Fence),
            Self::TEXT => Some(Kind::Text),
            "" => None,
            name => Some(Kind::Named(name.to_string())),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Head { level, .. } => write!(f, "head({level})"),
            other => f.write_str(other.name()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Annotation {
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    heading: Option<String>,
}
