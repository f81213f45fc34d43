//! The PNG row-predictor used to post-filter xref-stream payloads
//! (spec.md §4.4, "PNG unpredictor").

use crate::error::XrefError;
use crate::error::Result;

const NONE: u8 = 10;
const SUB: u8 = 11;
const UP: u8 = 12;
const AVERAGE: u8 = 13;
const PAETH: u8 = 14;

/// Reverses the per-row PNG predictor. `columns` is the row width in bytes
/// *not* counting the leading selector byte; a trailing short row is
/// dropped rather than partially decoded.
pub fn unpredict(data: &[u8], columns: usize) -> Result<Vec<u8>> {
    let row_width = columns + 1;
    if row_width <= 1 {
        return Ok(Vec::new());
    }

    let mut out = Vec::with_capacity(data.len());
    let mut prev_row = vec![0u8; columns];

    for row in data.chunks(row_width) {
        if row.len() < row_width {
            break;
        }
        let selector = row[0];
        let cur = &row[1..];
        let mut decoded = vec![0u8; columns];

        for i in 0..columns {
            let left = if i == 0 { 0 } else { decoded[i - 1] };
            let up = prev_row[i];
            let upleft = if i == 0 { 0 } else { prev_row[i - 1] };
            let x = cur[i];

            decoded[i] = match selector {
                NONE => x,
                SUB => x.wrapping_add(left),
                UP => x.wrapping_add(up),
                AVERAGE => x.wrapping_add(((left as u16 + up as u16) / 2) as u8),
                PAETH => x.wrapping_add(paeth(left, up, upleft)),
                other => return Err(XrefError::UnknownPredictor(other).into()),
            };
        }

        out.extend_from_slice(&decoded);
        prev_row = decoded;
    }

    Ok(out)
}

fn paeth(left: u8, up: u8, upleft: u8) -> u8 {
    let p = left as i32 + up as i32 - upleft as i32;
    let pa = (p - left as i32).abs();
    let pb = (p - up as i32).abs();
    let pc = (p - upleft as i32).abs();
    if pa <= pb && pa <= pc {
        left
    } else if pb <= pc {
        up
    } else {
        upleft
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_predictor_passes_through() {
        let row = [NONE, 1, 2, 3];
        assert_eq!(unpredict(&row, 3).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn sub_predictor_accumulates_left() {
        let row = [SUB, 1, 1, 1];
        assert_eq!(unpredict(&row, 3).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn up_predictor_uses_previous_row() {
        let data = [NONE, 5, 5, UP, 1, 1];
        assert_eq!(unpredict(&data, 2).unwrap(), vec![5, 5, 6, 6]);
    }

    #[test]
    fn unknown_selector_errors() {
        let row = [9u8, 1, 2, 3];
        assert!(unpredict(&row, 3).is_err());
    }
}
