//! The indirect-object materializer (spec.md §4.2). Grounded in the
//! teacher's own `Reader::read_object`/`get_object`, which likewise parse
//! one object body at a known offset and cache the result by id — but the
//! teacher resolves through a typed `XrefEntry`, while this materializer
//! walks the flat `"num_gen"` offset map `[crate::xref::Xref]` produces.

use log::warn;

use super::Reader;
use crate::error::{Error, Result};
use crate::object::{ObjectId, RawValue};
use crate::xref::Xref;

impl Reader<'_> {
    /// `getIndirectObject(ref, offset, decode) -> [RawValue]` (spec.md
    /// §4.2). `key` is the `"num_gen"` string the xref map uses; `id` is the
    /// same pair, already split, so callers that already have it don't pay
    /// to re-parse the key.
    pub(crate) fn get_indirect_object(&mut self, key: &str, id: ObjectId, offset: i64, decode: bool) -> Result<Vec<RawValue>> {
        let (num, gen) = id;
        if offset < 0 || offset as usize >= self.buf.len() {
            return Ok(vec![RawValue::Null]);
        }
        let mut offset = offset as usize;
        while offset < self.buf.len() && self.buf[offset] == b'0' {
            offset += 1;
        }

        let header = format!("{num} {gen} obj");
        let header_at = |pos: usize| self.buf.len() >= pos + header.len() && &self.buf[pos..pos + header.len()] == header.as_bytes();

        let header_start = if header_at(offset) {
            offset
        } else if header_at(offset + 1) {
            offset + 1
        } else {
            warn!("indirect object {key} header not found at offset {offset}, materializing as null");
            return Ok(vec![RawValue::Null]);
        };

        let mut pos = header_start + header.len();
        let mut values: Vec<RawValue> = Vec::new();
        loop {
            let (value, next) = crate::parser::next(self.buf, pos);
            let stalled = next <= pos;
            let is_end = matches!(value, RawValue::EndObj);

            match value {
                RawValue::Stream(mut payload) if decode => {
                    if let Some(RawValue::Dict(dict_entries)) = values.last() {
                        let dict_entries = dict_entries.clone();
                        let decoded = self.decode_stream_value(&dict_entries, &payload.raw)?;
                        payload.decoded = Some(decoded);
                    }
                    values.push(RawValue::Stream(payload));
                }
                value if !is_end => values.push(value),
                _ => {}
            }

            pos = next;
            if is_end || stalled || pos >= self.buf.len() {
                break;
            }
        }

        Ok(values)
    }

    fn decode_stream_value(&mut self, dict_entries: &[RawValue], raw: &[u8]) -> Result<(Vec<u8>, Vec<String>)> {
        let ignore_filter_errors = self.config.ignore_filter_errors;
        let xref = self.xref.clone();
        crate::filters::decode_stream(dict_entries, raw, ignore_filter_errors, |id| self.resolve_cached(&xref, id)).map_err(Error::from)
    }

    /// `getObjectVal(value)` (spec.md §4.2): if `value` is an `objref`,
    /// resolve it through the Objects cache, materializing with
    /// `decode=false` on a cache miss; otherwise return it unchanged. Used
    /// internally while decoding a stream's `/Filter`/`/Length` (spec.md
    /// §4.3), and by [`crate::document::Document::dereference`] for
    /// already-materialized documents.
    fn resolve_cached(&mut self, xref: &Xref, id: ObjectId) -> Option<RawValue> {
        if let Some(seq) = self.objects.get(&id) {
            return seq.first().cloned();
        }
        let key = crate::object::format_id(id);
        let offset = xref.entries.get(&key).copied()?;
        if offset <= 0 {
            return None;
        }
        let seq = self.get_indirect_object(&key, id, offset, false).ok()?;
        let first = seq.first().cloned();
        self.objects.insert(id, seq);
        first
    }
}
