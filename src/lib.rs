//! A parser for the structural layer of a PDF document: the raw-object
//! tokenizer, the xref/trailer resolver, and the indirect-object
//! materializer. It stops at `(Xref, Objects)` — page trees, content
//! streams, fonts, and encryption are out of scope.

pub mod config;
pub mod document;
pub mod error;
pub mod filters;
pub mod object;
pub mod parser;
pub mod reader;
pub mod xref;
pub mod xref_resolver;

pub use config::Config;
pub use document::Document;
pub use error::{Error, FilterError, Result, XrefError};
pub use object::{ObjectId, RawValue};
pub use xref::{Trailer, Xref};

/// `parse(buffer, config) -> (Xref, Objects)` (spec.md §6.1). The
/// top-level entry point; [`Document::parse`] wraps this into a slightly
/// friendlier accessor surface.
pub fn parse(buffer: &[u8], config: Config) -> Result<(Xref, reader::Objects)> {
    reader::parse(buffer, config)
}
