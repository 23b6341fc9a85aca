pub mod cell;
pub mod document;
pub mod kind;

pub use cell::{Cell, CellType, Metadata, UnknownCellType};
pub use document::Document;
pub use kind::{ANNOTATION_KEY, Kind};
