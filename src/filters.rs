//! The stream-filter collaborator (spec.md §4.3, §6.2). `spec.md` treats
//! this as an external component "specified only by interface", but a PDF
//! parser that can never decode a single stream isn't a usable library, so
//! this module gives the interface a concrete body built on the teacher's
//! own codec dependencies (`flate2`, `weezl`).

use std::io::Read;

use crate::error::{FilterError, Result};
use crate::object::{dict_get, ObjectId, RawValue};

/// Decodes one stream's payload against its dictionary, following spec.md
/// §4.3 exactly:
///
/// 1. An empty `raw_bytes` short-circuits to `("", [])`.
/// 2. `/Length` truncates `raw_bytes` if the declared length is *smaller*
///    than what was physically scanned; a larger declared length is
///    ignored.
/// 3. `/Filter` (a name, or an array of names, resolving through an
///    indirect reference via `resolve_ref` first) drives the filter
///    pipeline, applied in declared order.
/// 4. On failure, `ignore_filter_errors` swallows it: the (possibly
///    `/Length`-truncated) input bytes are returned undecoded alongside the
///    filter names that were never applied, instead of surfacing
///    `FilterError`.
pub fn decode_stream(
    dict_entries: &[RawValue], raw_bytes: &[u8], ignore_filter_errors: bool,
    mut resolve_ref: impl FnMut(ObjectId) -> Option<RawValue>,
) -> Result<(Vec<u8>, Vec<String>)> {
    if raw_bytes.is_empty() {
        return Ok((Vec::new(), Vec::new()));
    }

    let mut bytes = raw_bytes;
    if let Some(len_value) = dict_get(dict_entries, b"Length") {
        let resolved = resolve_numeric(len_value, &mut resolve_ref);
        if let Some(len) = resolved {
            if len >= 0 && (len as usize) < bytes.len() {
                bytes = &bytes[..len as usize];
            }
        }
    }

    let filter_names = match dict_get(dict_entries, b"Filter") {
        Some(RawValue::Name(n)) => vec![String::from_utf8_lossy(n).into_owned()],
        Some(RawValue::Array(items)) => items.iter().filter_map(|v| v.as_name()).map(|n| String::from_utf8_lossy(n).into_owned()).collect(),
        Some(RawValue::ObjRef(id)) => match resolve_ref(*id) {
            Some(RawValue::Name(n)) => vec![String::from_utf8_lossy(&n).into_owned()],
            Some(RawValue::Array(items)) => items.iter().filter_map(|v| v.as_name()).map(|n| String::from_utf8_lossy(n).into_owned()).collect(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    if filter_names.is_empty() {
        return Ok((bytes.to_vec(), Vec::new()));
    }

    match decode_all(&filter_names, bytes) {
        Ok(decoded) => Ok((decoded, Vec::new())),
        Err(err) => {
            if ignore_filter_errors {
                Ok((bytes.to_vec(), filter_names))
            } else {
                Err(err.into())
            }
        }
    }
}

fn resolve_numeric(value: &RawValue, resolve_ref: &mut impl FnMut(ObjectId) -> Option<RawValue>) -> Option<i64> {
    match value {
        RawValue::Numeric(_) => value.as_i64(),
        RawValue::ObjRef(id) => resolve_ref(*id).as_ref().and_then(RawValue::as_i64),
        _ => None,
    }
}

/// `decodeAll(filter_names, bytes) -> decoded_bytes` (spec.md §6.2),
/// applying each filter in declared order.
pub fn decode_all(filter_names: &[String], bytes: &[u8]) -> Result<Vec<u8>, FilterError> {
    let mut current = bytes.to_vec();
    for name in filter_names {
        current = decode_one(name, &current)?;
    }
    Ok(current)
}

fn decode_one(name: &str, bytes: &[u8]) -> Result<Vec<u8>, FilterError> {
    match name {
        "FlateDecode" | "Fl" => flate_decode(bytes),
        "ASCII85Decode" | "A85" => ascii85_decode(bytes),
        "ASCIIHexDecode" | "AHx" => ascii_hex_decode(bytes),
        "RunLengthDecode" | "RL" => run_length_decode(bytes),
        "LZWDecode" | "LZW" => lzw_decode(bytes),
        other => Err(FilterError::Unsupported(other.to_string())),
    }
}

fn flate_decode(bytes: &[u8]) -> Result<Vec<u8>, FilterError> {
    let mut decoder = flate2::read::ZlibDecoder::new(bytes);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|_| FilterError::DecodeFailed("FlateDecode".to_string()))?;
    Ok(out)
}

fn lzw_decode(bytes: &[u8]) -> Result<Vec<u8>, FilterError> {
    let mut decoder = weezl::decode::Decoder::new(weezl::BitOrder::Msb, 8);
    decoder
        .decode(bytes)
        .map_err(|_| FilterError::DecodeFailed("LZWDecode".to_string()))
}

fn ascii_hex_decode(bytes: &[u8]) -> Result<Vec<u8>, FilterError> {
    let digits: Vec<u8> = bytes
        .iter()
        .copied()
        .take_while(|&b| b != b'>')
        .filter(|b| b.is_ascii_hexdigit())
        .collect();
    Ok(crate::object::decode_hex_digits(&digits))
}

fn ascii85_decode(bytes: &[u8]) -> Result<Vec<u8>, FilterError> {
    let input: Vec<u8> = bytes.iter().copied().filter(|b| !b.is_ascii_whitespace()).collect();
    let body = input.strip_suffix(b"~>").unwrap_or(&input);

    let mut out = Vec::new();
    let mut group = [0u8; 5];
    let mut group_len = 0usize;

    let mut push_group = |group: &[u8], len: usize, out: &mut Vec<u8>| -> Result<(), FilterError> {
        if len == 0 {
            return Ok(());
        }
        let mut padded = [b'u'; 5];
        padded[..len].copy_from_slice(&group[..len]);
        let mut value: u32 = 0;
        for &c in &padded {
            if !(b'!'..=b'u').contains(&c) {
                return Err(FilterError::DecodeFailed("ASCII85Decode".to_string()));
            }
            value = value
                .checked_mul(85)
                .and_then(|v| v.checked_add((c - b'!') as u32))
                .ok_or_else(|| FilterError::DecodeFailed("ASCII85Decode".to_string()))?;
        }
        let bytes4 = value.to_be_bytes();
        out.extend_from_slice(&bytes4[..len.saturating_sub(1)]);
        Ok(())
    };

    for &b in body {
        if b == b'z' && group_len == 0 {
            out.extend_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        group[group_len] = b;
        group_len += 1;
        if group_len == 5 {
            push_group(&group, 5, &mut out)?;
            group_len = 0;
        }
    }
    if group_len > 0 {
        push_group(&group, group_len, &mut out)?;
    }

    Ok(out)
}

fn run_length_decode(bytes: &[u8]) -> Result<Vec<u8>, FilterError> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let len = bytes[i];
        i += 1;
        if len == 128 {
            break;
        } else if len < 128 {
            let count = len as usize + 1;
            if i + count > bytes.len() {
                return Err(FilterError::DecodeFailed("RunLengthDecode".to_string()));
            }
            out.extend_from_slice(&bytes[i..i + count]);
            i += count;
        } else {
            if i >= bytes.len() {
                return Err(FilterError::DecodeFailed("RunLengthDecode".to_string()));
            }
            let count = 257 - len as usize;
            out.extend(std::iter::repeat(bytes[i]).take(count));
            i += 1;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_length_round_trip() {
        // 3 literal bytes, then a run of 4 `b'x'`.
        let encoded = [2u8, b'a', b'b', b'c', 253u8, b'x', 128u8];
        let decoded = run_length_decode(&encoded).unwrap();
        assert_eq!(decoded, b"abcxxxx");
    }

    #[test]
    fn ascii_hex_round_trip() {
        let decoded = ascii_hex_decode(b"4A6F>").unwrap();
        assert_eq!(decoded, b"Jo");
    }

    #[test]
    fn unsupported_filter_errors() {
        let err = decode_all(&["Wat".to_string()], b"x").unwrap_err();
        assert_eq!(err, FilterError::Unsupported("Wat".to_string()));
    }
}
