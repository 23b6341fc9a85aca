use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::kind::{ANNOTATION_KEY, Kind};

/// Open key/value mapping attached to cells and documents.
pub type Metadata = Map<String, Value>;

/// Native cell type, as stored in the notebook file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    Markdown,
    Code,
    Raw,
}

impl CellType {
    pub fn as_str(self) -> &'static str {
        match self {
            CellType::Markdown => "markdown",
            CellType::Code => "code",
            CellType::Raw => "raw",
        }
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown cell type: {0:?}")]
pub struct UnknownCellType(pub String);

impl FromStr for CellType {
    type Err = UnknownCellType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "markdown" => Ok(CellType::Markdown),
            "code" => Ok(CellType::Code),
            "raw" => Ok(CellType::Raw),
            other => Err(UnknownCellType(other.to_string())),
        }
    }
}

/// A typed, independently addressable block of a document.
///
/// The derived [`Kind`] is held as a typed field. On disk it lives in the
/// metadata under [`ANNOTATION_KEY`], written over any stale value so the
/// derived kind always wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawCell", into = "RawCell")]
pub struct Cell {
    pub cell_type: CellType,
    pub source: String,
    pub metadata: Metadata,
    pub kind: Option<Kind>,
    /// Notebook fields this crate does not interpret (`outputs`, `id`, ...).
    pub extra: Metadata,
}

impl Cell {
    /// Key of the nbformat 4.5 cell id among the `extra` fields.
    pub const ID_KEY: &'static str = "id";

    pub fn new(cell_type: CellType, source: impl Into<String>) -> Self {
        let mut extra = Metadata::new();
        if cell_type == CellType::Code {
            extra.insert("execution_count".into(), Value::Null);
            extra.insert("outputs".into(), Value::Array(vec![]));
        }
        Self {
            cell_type,
            source: source.into(),
            metadata: Metadata::new(),
            kind: None,
            extra,
        }
    }

    pub fn markdown(source: impl Into<String>) -> Self {
        Self::new(CellType::Markdown, source)
    }

    pub fn code(source: impl Into<String>) -> Self {
        Self::new(CellType::Code, source)
    }

    pub fn raw(source: impl Into<String>) -> Self {
        Self::new(CellType::Raw, source)
    }

    pub fn with_kind(mut self, kind: Kind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_fresh_id(mut self) -> Self {
        self.assign_fresh_id();
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.extra.get(Self::ID_KEY).and_then(Value::as_str)
    }

    /// Sets a new random id, valid under the nbformat id rules.
    pub fn assign_fresh_id(&mut self) {
        self.extra.insert(
            Self::ID_KEY.to_string(),
            Value::String(Uuid::new_v4().simple().to_string()),
        );
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn is_markdown(&self) -> bool {
        self.cell_type == CellType::Markdown
    }

    /// Name of the derived kind, if the cell has been segmented.
    pub fn kind_name(&self) -> Option<&str> {
        self.kind.as_ref().map(Kind::name)
    }

    /// Source lines split on `\n`, without a trailing `\r`. Unlike
    /// [`str::lines`] a final empty line is kept, so indices match the source.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.source
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
    }
}

/// On-disk shape of a cell. nbformat allows `source` to be one string or a
/// list of lines; it is always written back as one string.
#[derive(Serialize, Deserialize)]
struct RawCell {
    cell_type: CellType,
    #[serde(default)]
    metadata: Metadata,
    source: Source,
    #[serde(flatten)]
    extra: Metadata,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum Source {
    Text(String),
    Lines(Vec<String>),
}

impl From<Source> for String {
    fn from(source: Source) -> Self {
        match source {
            Source::Text(text) => text,
            Source::Lines(lines) => lines.concat(),
        }
    }
}

impl From<RawCell> for Cell {
    fn from(raw: RawCell) -> Self {
        let mut metadata = raw.metadata;
        let kind = match raw.cell_type {
            CellType::Markdown => metadata.get(ANNOTATION_KEY).and_then(Kind::from_annotation),
            _ => None,
        };
        if kind.is_some() {
            metadata.remove(ANNOTATION_KEY);
        }
        Cell {
            cell_type: raw.cell_type,
            source: raw.source.into(),
            metadata,
            kind,
            extra: raw.extra,
        }
    }
}

impl From<Cell> for RawCell {
    fn from(cell: Cell) -> Self {
        let mut metadata = cell.metadata;
        if let Some(kind) = &cell.kind {
            metadata.insert(ANNOTATION_KEY.to_string(), kind.to_annotation());
        }
        RawCell {
            cell_type: cell.cell_type,
            metadata,
            source: Source::Text(cell.source),
            extra: cell.extra,
        }
    }
}
