//! Grammar-level xref/trailer parsing (spec.md §4.4): locating `startxref`,
//! parsing one classical xref section plus its trailer, and parsing one
//! xref-stream object's dictionary and rows. None of the functions here
//! recurse through `Prev` — that walk, with its visited-offset guard, lives
//! in [`crate::xref_resolver`].

use crate::error::{Error, Result, XrefError};
use crate::filters;
use crate::object::{dict_get, format_id, RawValue};
use crate::parser::unpredict;
use crate::xref::{Trailer, Xref};

/// One parsed xref section: its entries/trailer plus an optional `Prev`
/// offset to continue the chain walk at.
pub struct XrefSection {
    pub xref: Xref,
    pub prev: Option<i64>,
}

fn skip_ws(buf: &[u8], mut pos: usize) -> usize {
    while pos < buf.len() && matches!(buf[pos], b' ' | b'\t' | b'\r' | b'\n' | 0x00 | 0x0C) {
        pos += 1;
    }
    pos
}

fn find(buf: &[u8], from: usize, pat: &[u8]) -> Option<usize> {
    if from >= buf.len() || pat.is_empty() {
        return None;
    }
    buf[from..].windows(pat.len()).position(|w| w == pat).map(|p| p + from)
}

fn rfind(buf: &[u8], pat: &[u8]) -> Option<usize> {
    if pat.is_empty() || buf.len() < pat.len() {
        return None;
    }
    buf.windows(pat.len()).rposition(|w| w == pat)
}

/// Tries to validate a `startxref\s+<offset>\s+%%EOF` tail starting exactly
/// at `pos` (i.e. `pos` is the index of the `s` in `startxref`).
fn validate_startxref_tail(buf: &[u8], pos: usize) -> Option<i64> {
    let after_kw = pos + b"startxref".len();
    let digits_start = skip_ws(buf, after_kw);
    let mut end = digits_start;
    while end < buf.len() && buf[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    let value: i64 = std::str::from_utf8(&buf[digits_start..end]).ok()?.parse().ok()?;
    let after_digits = skip_ws(buf, end);
    if buf[after_digits..].starts_with(b"%%EOF") {
        Some(value)
    } else {
        None
    }
}

/// Finds the `startxref` tail closest to EOF (spec.md §4.4 step 2).
pub fn locate_startxref_from_eof(buf: &[u8]) -> Result<usize> {
    let mut search_end = buf.len();
    loop {
        let window = &buf[..search_end];
        match rfind(window, b"startxref") {
            Some(pos) => {
                if let Some(target) = validate_startxref_tail(buf, pos) {
                    if target >= 0 && (target as usize) <= buf.len() {
                        return Ok(target as usize);
                    }
                }
                search_end = pos;
            }
            None => return Err(Error::Xref(XrefError::StartNotFound)),
        }
    }
}

/// Resolves the `startxref` offset to use for a non-zero resume point
/// (spec.md §4.4 step 3).
pub fn locate_startxref_at(buf: &[u8], offset: usize) -> Result<usize> {
    for lead in 0..=4usize.min(buf.len().saturating_sub(offset)) {
        if buf[offset + lead..].starts_with(b"xref") {
            return Ok(offset + lead);
        }
    }
    if crate::parser::try_obj_header_at(buf, offset) {
        return Ok(offset);
    }
    match find(buf, offset, b"startxref") {
        Some(pos) => validate_startxref_tail(buf, pos)
            .map(|v| v as usize)
            .ok_or(Error::Xref(XrefError::StartNotFound)),
        None => Err(Error::Xref(XrefError::StartNotFound)),
    }
}

/// Parses one classical `xref` section and its trailer (spec.md §4.4,
/// "Classical xref").
pub fn parse_classical(buf: &[u8], startxref: usize) -> Result<XrefSection> {
    let mut pos = startxref + b"xref".len();
    pos = skip_ws(buf, pos);

    let mut xref = Xref::new();
    let mut cur_num: u32 = 0;

    loop {
        match parse_one_entry_line(buf, pos) {
            Some((first, second, flag, end)) => {
                match flag {
                    Some(b'n') => {
                        let gen: u16 = second.try_into().unwrap_or(u16::MAX);
                        let key = format_id((cur_num, gen));
                        xref.insert_if_absent(key, first as i64);
                        cur_num += 1;
                    }
                    Some(b'f') => {
                        cur_num += 1;
                    }
                    _ => {
                        cur_num = first;
                    }
                }
                pos = end;
            }
            None => break,
        }
    }

    let (pairs, prev, trailer) = parse_trailer(buf, pos)?;
    let _ = pairs;
    xref.trailer = trailer;
    Ok(XrefSection { xref, prev })
}

/// Matches `(\d+) (\d+) ?([nf]?)(\r\n| ?\r|\n)` at exactly `pos`.
fn parse_one_entry_line(buf: &[u8], pos: usize) -> Option<(u32, u32, Option<u8>, usize)> {
    let mut i = pos;
    let first_start = i;
    while i < buf.len() && buf[i].is_ascii_digit() {
        i += 1;
    }
    if i == first_start {
        return None;
    }
    let first: u32 = std::str::from_utf8(&buf[first_start..i]).ok()?.parse().ok()?;

    if i >= buf.len() || buf[i] != b' ' {
        return None;
    }
    i += 1;

    let second_start = i;
    while i < buf.len() && buf[i].is_ascii_digit() {
        i += 1;
    }
    if i == second_start {
        return None;
    }
    let second: u32 = std::str::from_utf8(&buf[second_start..i]).ok()?.parse().ok()?;

    if i < buf.len() && buf[i] == b' ' {
        i += 1;
    }

    let flag = if i < buf.len() && matches!(buf[i], b'n' | b'f') {
        let f = buf[i];
        i += 1;
        Some(f)
    } else {
        None
    };

    if buf[i..].starts_with(b"\r\n") {
        i += 2;
    } else if i < buf.len() && buf[i] == b'\r' {
        i += 1;
    } else if i < buf.len() && buf[i] == b' ' && buf.get(i + 1) == Some(&b'\r') {
        i += 2;
    } else if i < buf.len() && buf[i] == b' ' && buf.get(i + 1) == Some(&b'\n') {
        i += 2;
    } else if i < buf.len() && buf[i] == b'\n' {
        i += 1;
    } else {
        return None;
    }

    Some((first, second, flag, i))
}

/// Locates `trailer\s*<<(.*)>>` (ungreedy: the first `>>` closes it) and
/// scans its body for the fields spec.md §4.4 names.
fn parse_trailer(buf: &[u8], from: usize) -> Result<(Vec<RawValue>, Option<i64>, Trailer)> {
    let kw = find(buf, from, b"trailer").ok_or(Error::Xref(XrefError::TrailerNotFound))?;
    let mut pos = skip_ws(buf, kw + b"trailer".len());
    if !buf[pos..].starts_with(b"<<") {
        return Err(Error::Xref(XrefError::TrailerNotFound));
    }
    pos += 2;
    let close = find(buf, pos, b">>").ok_or(Error::Xref(XrefError::TrailerNotFound))?;
    let body = &buf[pos..close];

    let mut pairs = Vec::new();
    let mut cursor = 0usize;
    while cursor < body.len() {
        let (value, end) = crate::parser::next(body, cursor);
        if end <= cursor {
            break;
        }
        pairs.push(value);
        cursor = end;
    }

    let trailer = build_trailer(&pairs);
    let prev = dict_get(&pairs, b"Prev").and_then(RawValue::as_i64);
    Ok((pairs, prev, trailer))
}

pub fn build_trailer(pairs: &[RawValue]) -> Trailer {
    Trailer {
        size: dict_get(pairs, b"Size").and_then(RawValue::as_u32),
        root: dict_get(pairs, b"Root").and_then(RawValue::as_objref),
        info: dict_get(pairs, b"Info").and_then(RawValue::as_objref),
        encrypt: dict_get(pairs, b"Encrypt").and_then(RawValue::as_objref),
        id: dict_get(pairs, b"ID").and_then(RawValue::as_array).and_then(|arr| match arr {
            [RawValue::Hex(a), RawValue::Hex(b)] => Some((a.clone(), b.clone())),
            _ => None,
        }),
    }
}

/// Parses one xref-stream object (spec.md §4.4, "Xref stream"): tokenizes
/// the `N G obj` header, its dictionary, and its stream body directly,
/// decodes the stream, then unpredicts and walks its rows. This does not
/// go through the full indirect-object materializer (spec.md §2's control
/// flow: the xref resolver uses the tokenizer directly for xref-stream
/// dictionaries).
pub fn parse_xref_stream(buf: &[u8], startxref: usize, ignore_filter_errors: bool) -> Result<XrefSection> {
    let (header, after_header) = crate::parser::next(buf, startxref);
    let _id = header.as_objref().or_else(|| match header {
        RawValue::Obj(id) => Some(id),
        _ => None,
    });

    let (dict_val, after_dict) = crate::parser::next(buf, after_header);
    let entries = dict_val.as_dict_entries().ok_or(Error::Xref(XrefError::NotFound))?;

    let is_xref_type = dict_get(entries, b"Type").and_then(RawValue::as_name) == Some(b"XRef");
    if !is_xref_type {
        return Ok(XrefSection { xref: Xref::new(), prev: None });
    }

    let (stream_val, _after_stream) = crate::parser::next(buf, after_dict);
    let raw = match &stream_val {
        RawValue::Stream(s) => s.raw.clone(),
        _ => return Err(Error::Xref(XrefError::NotFound)),
    };

    // An xref-stream dictionary's own `/Filter` and `/Length` are never
    // indirect references (spec.md §4.4: this object must be self-describing
    // so the resolver can read it before any object cache exists).
    let (decoded, _residual) = filters::decode_stream(entries, &raw, ignore_filter_errors, |_id| None)?;

    let widths = dict_get(entries, b"W")
        .and_then(RawValue::as_array)
        .map(|a| {
            let mut w = [1u8; 3];
            for (i, v) in a.iter().take(3).enumerate() {
                w[i] = v.as_i64().unwrap_or(1).clamp(0, 255) as u8;
            }
            w
        })
        .unwrap_or([1, 1, 1]);

    let row_width = widths.iter().map(|w| *w as usize).sum::<usize>();
    if row_width == 0 {
        return Err(Error::Xref(XrefError::UnpackFailure(widths)));
    }

    let decode_parms = dict_get(entries, b"DecodeParms").and_then(RawValue::as_dict_entries);
    let predictor = decode_parms.and_then(|dp| dict_get(dp, b"Predictor")).and_then(RawValue::as_i64).unwrap_or(1);

    // A `Predictor` of 1 (or an absent `/DecodeParms`) means the row bytes
    // are stored as-is, with no leading selector byte per row (spec.md §8's
    // boundary case). Only a declared predictor > 1 goes through the PNG
    // row-unpredictor.
    let unpredicted = if predictor > 1 {
        let columns = decode_parms
            .and_then(|dp| dict_get(dp, b"Columns"))
            .and_then(RawValue::as_i64)
            .map(|v| v.max(0) as usize)
            .unwrap_or(row_width);
        unpredict::unpredict(&decoded, columns)?
    } else {
        decoded
    };

    let index_first = dict_get(entries, b"Index")
        .and_then(RawValue::as_array)
        .and_then(|a| a.first())
        .and_then(RawValue::as_u32)
        .unwrap_or(0);

    let mut xref = Xref::new();
    let mut obj_num = index_first;
    for row in unpredicted.chunks(row_width) {
        if row.len() < row_width {
            break;
        }
        let mut off = 0usize;
        let mut read_field = |w: u8| -> u32 {
            if w == 0 {
                return 0;
            }
            let mut v: u64 = 0;
            for &b in &row[off..off + w as usize] {
                v = (v << 8) | b as u64;
            }
            off += w as usize;
            v as u32
        };
        let mut f0 = read_field(widths[0]);
        if widths[0] == 0 {
            f0 = 1;
        }
        let f1 = read_field(widths[1]);
        let f2 = read_field(widths[2]);

        match f0 {
            0 => {}
            1 => {
                let key = format_id((obj_num, f2 as u16));
                xref.insert_if_absent(key, f1 as i64);
            }
            2 => {
                let key = format!("{}_0_{}", f1, f2);
                xref.insert_if_absent(key, -1);
            }
            _ => {}
        }
        obj_num += 1;
    }

    xref.trailer = build_trailer(entries);
    let prev = dict_get(entries, b"Prev").and_then(RawValue::as_i64);

    Ok(XrefSection { xref, prev })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classical_entry_accepts_space_lf_terminator() {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"xref\n0 1\n");
        buf.extend_from_slice(b"0000000123 00000 n \n");
        buf.extend_from_slice(b"trailer\n<< /Size 1 /Root 1 0 R >>\n");
        let section = parse_classical(&buf, 0).unwrap();
        assert_eq!(section.xref.get(0, 0), Some(123));
    }

    #[test]
    fn xref_stream_row_with_no_predictor_has_no_selector_byte() {
        // spec.md §8's boundary case: /W [1 3 1], one row, no /DecodeParms.
        let mut buf = Vec::new();
        buf.extend_from_slice(b"5 0 obj\n<< /Type /XRef /W [1 3 1] /Index [1 1] /Size 2 /Length 5 >>\nstream\n");
        let row: [u8; 5] = [1, 0, 0, 0x0A, 0];
        buf.extend_from_slice(&row);
        buf.extend_from_slice(b"\nendstream\nendobj\n");

        let section = parse_xref_stream(&buf, 0, false).unwrap();
        assert_eq!(section.xref.get(1, 0), Some(10));
    }
}
