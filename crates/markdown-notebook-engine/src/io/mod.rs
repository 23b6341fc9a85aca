use crate::models::Document;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid notebook JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Extension of notebook files.
pub const NOTEBOOK_EXTENSION: &str = "ipynb";

/// Parse a notebook from nbformat-4 JSON text
pub fn from_json(text: &str) -> Result<Document, IoError> {
    Ok(serde_json::from_str(text)?)
}

/// Serialize a notebook the way Jupyter does: one-space indent, trailing
/// newline.
pub fn to_json(doc: &Document) -> Result<String, IoError> {
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b" "));
    doc.serialize(&mut serializer)?;
    out.push(b'\n');
    // serde_json only writes valid UTF-8
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Read an `.ipynb` file
pub fn read_notebook(path: &Path) -> Result<Document, IoError> {
    from_json(&read_text(path)?)
}

/// Write a document as an `.ipynb` file, creating parent directories
pub fn write_notebook(path: &Path, doc: &Document) -> Result<(), IoError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }
    fs::write(path, to_json(doc)?).map_err(IoError::Io)
}

/// Read a markdown file as a document with a single markdown cell
pub fn read_markdown(path: &Path) -> Result<Document, IoError> {
    Ok(Document::from_markdown(&read_text(path)?))
}

/// Read a notebook or, for any other extension, a markdown file
pub fn load_document(path: &Path) -> Result<Document, IoError> {
    if is_notebook(path) {
        read_notebook(path)
    } else {
        read_markdown(path)
    }
}

pub fn is_notebook(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(NOTEBOOK_EXTENSION))
}

fn read_text(path: &Path) -> Result<String, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(IoError::Io)
}
