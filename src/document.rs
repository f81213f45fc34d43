//! A thin, read-only view over a parsed document (spec.md §2's "Data flows
//! upward as a tree of tagged values plus an xref/trailer record" — this is
//! that record, paired with the materialized object cache, behind a small
//! accessor surface). Grounded in the teacher's `Document`, which plays the
//! same role but also carries the mutation API this crate doesn't implement.

use crate::error::Result;
use crate::object::{dict_get, ObjectId, RawValue};
use crate::reader::Objects;
use crate::xref::{Trailer, Xref};

/// A parsed PDF: its cross-reference table and every indirect object that
/// was present and uncompressed (spec.md §4.5 step 4).
#[derive(Debug, Clone)]
pub struct Document {
    pub xref: Xref,
    pub objects: Objects,
}

impl Document {
    /// Parses `buffer` with the given [`crate::config::Config`] (spec.md
    /// §6.1).
    pub fn parse(buffer: &[u8], config: crate::config::Config) -> Result<Document> {
        let (xref, objects) = crate::reader::parse(buffer, config)?;
        Ok(Document { xref, objects })
    }

    /// Parses `buffer` with default configuration.
    pub fn parse_default(buffer: &[u8]) -> Result<Document> {
        Document::parse(buffer, crate::config::Config::default())
    }

    pub fn trailer(&self) -> &Trailer {
        &self.xref.trailer
    }

    /// The raw materialized value sequence for `id`, if it was present and
    /// uncompressed.
    pub fn get_object(&self, id: ObjectId) -> Option<&[RawValue]> {
        self.objects.get(&id).map(Vec::as_slice)
    }

    /// The first value of `id`'s sequence — the conventional "the object
    /// itself" when the sequence holds a single dict/array/scalar.
    pub fn get_object_value(&self, id: ObjectId) -> Option<&RawValue> {
        self.get_object(id).and_then(|seq| seq.first())
    }

    /// `getObjectVal` for an already-materialized document: follows one
    /// `objref` hop if `value` is a reference, otherwise returns `value`
    /// itself.
    pub fn dereference<'a>(&'a self, value: &'a RawValue) -> &'a RawValue {
        match value {
            RawValue::ObjRef(id) => self.get_object_value(*id).unwrap_or(value),
            _ => value,
        }
    }

    /// The dictionary entries of `id`, dereferencing through one `objref`
    /// hop if the stored value is itself a reference.
    pub fn get_dictionary(&self, id: ObjectId) -> Option<&[RawValue]> {
        let value = self.get_object_value(id)?;
        let value = self.dereference(value);
        value.as_dict_entries()
    }

    /// Pairwise lookup within `id`'s dictionary.
    pub fn get_dict_value(&self, id: ObjectId, key: &[u8]) -> Option<&RawValue> {
        dict_get(self.get_dictionary(id)?, key)
    }
}
