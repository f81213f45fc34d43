//! Cross-reference and trailer records (spec.md §3.2).

use indexmap::IndexMap;

use crate::object::ObjectId;

/// Document-wide pointers carried by the trailer dictionary (spec.md §3.2).
/// The *first* xref encountered (closest to EOF) owns this record; later
/// `Prev` links never overwrite it (spec.md §3.4).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trailer {
    pub size: Option<u32>,
    pub root: Option<ObjectId>,
    pub info: Option<ObjectId>,
    pub encrypt: Option<ObjectId>,
    /// Two hex-digit strings (spec.md §3.1's `Hex` payload convention — not
    /// decoded to binary here).
    pub id: Option<(Vec<u8>, Vec<u8>)>,
}

/// The cross-reference index: `"num_gen"` (or, for compressed entries,
/// `"streamobj_0_index"`) to byte offset, `-1` for compressed.
#[derive(Debug, Clone, Default)]
pub struct Xref {
    pub entries: IndexMap<String, i64>,
    pub trailer: Trailer,
}

impl Xref {
    pub fn new() -> Self {
        Xref::default()
    }

    /// Inserts an entry only if the key is not already present, matching the
    /// "insert if absent" rule both the classical and xref-stream procedures
    /// use (spec.md §4.4).
    pub fn insert_if_absent(&mut self, key: String, offset: i64) {
        self.entries.entry(key).or_insert(offset);
    }

    pub fn get(&self, num: u32, gen: u16) -> Option<i64> {
        self.entries.get(&crate::object::format_id((num, gen))).copied()
    }

    /// Folds another xref's entries into this one, keeping keys already
    /// present (spec.md §3.4: "later `Prev` xrefs only contribute
    /// previously-unknown object entries"). The trailer is never touched by
    /// a merge.
    pub fn merge(&mut self, other: Xref) {
        for (key, offset) in other.entries {
            self.entries.entry(key).or_insert(offset);
        }
    }
}
