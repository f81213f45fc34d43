//! The tagged value tree the tokenizer (see [`crate::parser`]) produces, plus
//! the small amount of bookkeeping every higher layer needs: indirect-object
//! identity, hex-digit decoding, and pairwise dictionary lookup.

use std::fmt;

/// `(object number, generation)`. Always formatted as `"{num}_{gen}"` when a
/// string key is required (xref entries, object-stream keys).
pub type ObjectId = (u32, u16);

pub fn format_id(id: ObjectId) -> String {
    format!("{}_{}", id.0, id.1)
}

/// A stream's raw payload plus, once [`crate::filters::decode_stream`] has
/// run, its decoded bytes and the names of any filters that could not be
/// applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamPayload {
    pub raw: Vec<u8>,
    pub decoded: Option<(Vec<u8>, Vec<String>)>,
}

impl StreamPayload {
    pub fn new(raw: Vec<u8>) -> Self {
        StreamPayload { raw, decoded: None }
    }
}

/// One value emitted by the tokenizer. Containers (`Array`, `Dict`) nest by
/// ordinary `Vec` recursion; there is no arena and no back-pointer, matching
/// the teacher's own `Object::Array(Vec<Object>)` representation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Name(Vec<u8>),
    /// Raw bytes between the balancing parentheses; escapes are not
    /// interpreted at this layer (spec note: deferred to a consumer).
    Literal(Vec<u8>),
    /// ASCII hex digits with whitespace stripped — *not* decoded to binary.
    Hex(Vec<u8>),
    /// Raw digit/sign/dot span; parsed to a number only on demand.
    Numeric(Vec<u8>),
    Boolean(bool),
    Null,
    Array(Vec<RawValue>),
    /// Alternating key/value pairs, in parse order. Use [`dict_get`] to look
    /// up a key the way the stream-decode and trailer-scan procedures do.
    Dict(Vec<RawValue>),
    ObjRef(ObjectId),
    Obj(ObjectId),
    EndObj,
    Stream(StreamPayload),
    EndStream,
}

impl RawValue {
    pub fn as_name(&self) -> Option<&[u8]> {
        match self {
            RawValue::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[RawValue]> {
        match self {
            RawValue::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_dict_entries(&self) -> Option<&[RawValue]> {
        match self {
            RawValue::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_objref(&self) -> Option<ObjectId> {
        match self {
            RawValue::ObjRef(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_stream(&self) -> Option<&StreamPayload> {
        match self {
            RawValue::Stream(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_stream_mut(&mut self) -> Option<&mut StreamPayload> {
        match self {
            RawValue::Stream(s) => Some(s),
            _ => None,
        }
    }

    /// Parses a `Numeric` payload as a signed integer. Consumers decide
    /// integer vs. real (spec §3.1); this is the integer half.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RawValue::Numeric(bytes) => std::str::from_utf8(bytes).ok()?.parse::<f64>().ok().map(|f| f as i64),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        self.as_i64().and_then(|v| u32::try_from(v).ok())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Numeric(bytes) => std::str::from_utf8(bytes).ok()?.parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn is_dict(&self) -> bool {
        matches!(self, RawValue::Dict(_))
    }
}

/// Pairwise dictionary lookup, the procedure spec.md §4.3 describes inline:
/// walk `entries` two at a time, return the value following the first
/// matching `/Name` key.
pub fn dict_get<'a>(entries: &'a [RawValue], key: &[u8]) -> Option<&'a RawValue> {
    let mut iter = entries.iter();
    while let (Some(k), Some(v)) = (iter.next(), iter.next()) {
        if k.as_name() == Some(key) {
            return Some(v);
        }
    }
    None
}

/// Decodes an ASCII hex-digit string (as produced by [`RawValue::Hex`]) to
/// bytes. An odd trailing nibble is padded with a low zero, per spec §3.1's
/// tolerance note.
pub fn decode_hex_digits(digits: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(digits.len().div_ceil(2));
    let mut chunks = digits.chunks(2);
    for chunk in &mut chunks {
        let hi = hex_val(chunk[0]);
        let lo = if chunk.len() == 2 { hex_val(chunk[1]) } else { 0 };
        out.push((hi << 4) | lo);
    }
    out
}

fn hex_val(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
