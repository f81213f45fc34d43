//! The driver (spec.md §4.5): trims the buffer to `%PDF-`, resolves the
//! xref chain, and materializes every present, uncompressed indirect
//! object. Grounded in the teacher's `Reader::read`, which performs the
//! same header-trim/xref/object-load sequence — generalized here to the
//! flat offset-map xref and the materializer in [`object_loader`].

mod load;
mod object_loader;

#[cfg(test)]
mod tests;

use std::collections::HashMap;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::object::{ObjectId, RawValue};
use crate::xref::Xref;

pub type Objects = HashMap<ObjectId, Vec<RawValue>>;

pub struct Reader<'a> {
    buf: &'a [u8],
    config: Config,
    xref: Xref,
    objects: Objects,
}

/// Splits a `"num_gen"` xref key into its `(num, gen)` pair (spec.md §4.2
/// step 1).
fn split_key(key: &str) -> Result<ObjectId> {
    let (num, gen) = key.split_once('_').ok_or_else(|| Error::InvalidReference(key.to_string()))?;
    let num: u32 = num.parse().map_err(|_| Error::InvalidReference(key.to_string()))?;
    let gen: u16 = gen.parse().map_err(|_| Error::InvalidReference(key.to_string()))?;
    Ok((num, gen))
}

/// `parse(buffer, config) -> (Xref, Objects)` (spec.md §6.1, §4.5).
pub fn parse(buffer: &[u8], config: Config) -> Result<(Xref, Objects)> {
    if buffer.is_empty() {
        return Err(Error::EmptyData);
    }

    let header_pos = find(buffer, b"%PDF-").ok_or(Error::HeaderMissing)?;
    let buf = &buffer[header_pos..];

    let xref = crate::xref_resolver::resolve(buf, config.ignore_filter_errors)?;

    let mut reader = Reader { buf, config, xref: xref.clone(), objects: HashMap::new() };

    for (key, offset) in xref.entries.iter() {
        if *offset <= 0 {
            continue;
        }
        let id = split_key(key)?;
        if reader.objects.contains_key(&id) {
            continue;
        }
        let seq = reader.get_indirect_object(key, id, *offset, true)?;
        reader.objects.insert(id, seq);
    }

    Ok((xref, reader.objects))
}

fn find(buf: &[u8], pat: &[u8]) -> Option<usize> {
    buf.windows(pat.len()).position(|w| w == pat)
}
