//! Data model shared by the pipeline stages.
//!
//! Text stages work on plain `String`s. Once the Markdown has been rendered
//! and sanitized, the HTML becomes an owned [`Dom`] that the table, link and
//! clean-up stages mutate in place before it is serialized once.

pub mod dom;
mod document;
mod footnote;
mod table;

pub use document::{JsonFormat, Metadata, Report};
pub use dom::{Dom, Element, NodeData, NodeId};
pub use footnote::{
    is_numeric_id, safe_id, FootnoteDefinition, FootnoteReference, FootnoteRegistry,
    RegistryEntry,
};
pub use table::{Alignment, CellRef, ColumnProfile, ColumnType, TableKind, TableModel};
