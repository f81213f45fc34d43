//! Walks the `startxref` / `Prev` chain to a merged [`Xref`] (spec.md §3.4,
//! §4.4 steps 1–4). Grounded in the teacher's `Reader::get_xref_start` plus
//! `Reader::read_xref`, which walk the same chain but recurse through the
//! teacher's own `XrefEntry` enum rather than a flat offset map.

use std::collections::HashSet;

use crate::error::{Error, Result, XrefError};
use crate::parser::xref::{locate_startxref_at, locate_startxref_from_eof, parse_classical, parse_xref_stream};
use crate::xref::Xref;

/// Resolves the full xref chain starting from hint offset `0` (spec.md §4.4:
/// "Given an `offset` hint (0 on first call)"), following `Prev` hints until
/// exhausted. `visited` tracks *hints*, not resolved `startxref` targets —
/// the hint `0` is itself a value that can recur, so it must occupy a slot
/// in the guard just like any `Prev` value.
pub fn resolve(buf: &[u8], ignore_filter_errors: bool) -> Result<Xref> {
    let mut merged = Xref::new();
    let mut visited: HashSet<i64> = HashSet::new();
    let mut next_hint: Option<i64> = Some(0);
    let mut first_section = true;

    while let Some(hint) = next_hint {
        if !visited.insert(hint) {
            return Err(Error::Xref(XrefError::Loop(hint.max(0) as usize)));
        }

        let startxref = if hint == 0 { locate_startxref_from_eof(buf)? } else { locate_startxref_at(buf, hint as usize)? };

        let section = if crate::parser::try_obj_header_at(buf, startxref) {
            parse_xref_stream(buf, startxref, ignore_filter_errors)?
        } else {
            parse_classical(buf, startxref)?
        };

        let prev = section.prev;
        if first_section {
            merged.trailer = section.xref.trailer.clone();
            first_section = false;
        }
        merged.merge(section.xref);
        next_hint = prev;
    }

    if merged.entries.is_empty() {
        return Err(Error::Xref(XrefError::NotFound));
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pdf() -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n");
        let obj1_off = buf.len();
        buf.extend_from_slice(b"1 0 obj\n<< /Type /Catalog >>\nendobj\n");
        let xref_off = buf.len();
        buf.extend_from_slice(b"xref\n");
        buf.extend_from_slice(b"0 2\n");
        buf.extend_from_slice(b"0000000000 65535 f \n");
        buf.extend_from_slice(format!("{:010} 00000 n \n", obj1_off).as_bytes());
        buf.extend_from_slice(b"trailer\n<< /Size 2 /Root 1 0 R >>\n");
        buf.extend_from_slice(format!("startxref\n{}\n%%EOF", xref_off).as_bytes());
        buf
    }

    #[test]
    fn resolves_single_classical_section() {
        let buf = sample_pdf();
        let xref = resolve(&buf, false).unwrap();
        assert_eq!(xref.trailer.root, Some((1, 0)));
        assert!(xref.get(1, 0).unwrap() > 0);
    }

    #[test]
    fn detects_prev_loop() {
        let mut buf = sample_pdf();
        // Point `Prev` at the xref section's own offset so the second walk
        // step revisits an already-seen offset.
        let xref_off = buf.windows(4).position(|w| w == b"xref").unwrap();
        let trailer_pos = String::from_utf8_lossy(&buf).find("trailer").unwrap();
        let insertion = trailer_pos + "trailer\n<< ".len();
        let prev_field = format!("/Prev {} ", xref_off);
        buf.splice(insertion..insertion, prev_field.bytes());

        let err = resolve(&buf, false).unwrap_err();
        assert!(matches!(err, Error::Xref(XrefError::Loop(_))));
    }
}
