use super::*;
use crate::config::Config;
use crate::document::Document;
use crate::error::Error;
use crate::object::RawValue;

fn classical_fixture() -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"%PDF-1.4\n");
    let obj1_off = buf.len();
    buf.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");
    let obj2_off = buf.len();
    buf.extend_from_slice(b"2 0 obj\n<< /Type /Pages /Kids [] /Count 0 >>\nendobj\n");
    let xref_off = buf.len();
    buf.extend_from_slice(b"xref\n0 3\n");
    buf.extend_from_slice(b"0000000000 65535 f \n");
    buf.extend_from_slice(format!("{:010} 00000 n \n", obj1_off).as_bytes());
    buf.extend_from_slice(format!("{:010} 00000 n \n", obj2_off).as_bytes());
    buf.extend_from_slice(b"trailer\n<< /Size 3 /Root 1 0 R >>\n");
    buf.extend_from_slice(format!("startxref\n{}\n%%EOF", xref_off).as_bytes());
    buf
}

#[test]
fn empty_input_is_rejected() {
    let err = Document::parse_default(b"").unwrap_err();
    assert!(matches!(err, Error::EmptyData));
}

#[test]
fn missing_header_is_rejected() {
    let err = Document::parse_default(b"not a pdf at all").unwrap_err();
    assert!(matches!(err, Error::HeaderMissing));
}

#[test]
fn preamble_before_header_is_trimmed() {
    let mut buf = b"garbage-before-header".to_vec();
    buf.extend_from_slice(&classical_fixture());
    let doc = Document::parse_default(&buf).unwrap();
    assert_eq!(doc.trailer().root, Some((1, 0)));
}

#[test]
fn materializes_root_and_pages() {
    let buf = classical_fixture();
    let doc = Document::parse_default(&buf).unwrap();

    let root_id = doc.trailer().root.unwrap();
    let root = doc.get_dictionary(root_id).unwrap();
    let pages_ref = crate::object::dict_get(root, b"Pages").unwrap().as_objref().unwrap();
    assert_eq!(pages_ref, (2, 0));

    let pages = doc.get_dictionary(pages_ref).unwrap();
    let count = crate::object::dict_get(pages, b"Count").unwrap().as_i64().unwrap();
    assert_eq!(count, 0);
}

#[test]
fn missing_object_materializes_as_null() {
    // Xref entry points well past any real object header.
    let mut buf = b"%PDF-1.4\n".to_vec();
    let obj1_off = buf.len();
    buf.extend_from_slice(b"1 0 obj\n<< /Type /Catalog >>\nendobj\n");
    let xref_off = buf.len();
    buf.extend_from_slice(b"xref\n0 2\n");
    buf.extend_from_slice(b"0000000000 65535 f \n");
    // Deliberately wrong offset for object 1 (points into the middle of its own dict).
    buf.extend_from_slice(format!("{:010} 00000 n \n", obj1_off + 3).as_bytes());
    buf.extend_from_slice(b"trailer\n<< /Size 2 /Root 1 0 R >>\n");
    buf.extend_from_slice(format!("startxref\n{}\n%%EOF", xref_off).as_bytes());

    let doc = Document::parse_default(&buf).unwrap();
    let seq = doc.get_object((1, 0)).unwrap();
    assert_eq!(seq, &[RawValue::Null]);
}

#[test]
fn xref_stream_document_resolves_without_compression() {
    // No /Filter and no /DecodeParms: rows are stored with no predictor, so
    // each row is read directly as sum(W) bytes with no leading selector.
    let mut buf = Vec::new();
    buf.extend_from_slice(b"%PDF-1.5\n");
    let obj1_off = buf.len();
    buf.extend_from_slice(b"1 0 obj\n<< /Type /Catalog >>\nendobj\n");

    let xref_obj_off = buf.len();
    buf.extend_from_slice(b"5 0 obj\n<< /Type /XRef /W [1 1 1] /Index [0 2] /Size 2 /Root 1 0 R /Length 6 >>\nstream\n");
    // row 0: type 0 (free); row 1: type 1, offset=obj1_off, gen=0.
    let rows: [u8; 6] = [0, 0, 0, 1, obj1_off as u8, 0];
    buf.extend_from_slice(&rows);
    buf.extend_from_slice(b"\nendstream\nendobj\n");

    buf.extend_from_slice(format!("startxref\n{}\n%%EOF", xref_obj_off).as_bytes());

    let doc = Document::parse_default(&buf).unwrap();
    assert_eq!(doc.trailer().root, Some((1, 0)));
    let root = doc.get_dictionary((1, 0)).unwrap();
    assert_eq!(crate::object::dict_get(root, b"Type").unwrap().as_name(), Some(&b"Catalog"[..]));
}

#[test]
fn ignore_filter_errors_keeps_raw_bytes() {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"%PDF-1.4\n");
    let obj1_off = buf.len();
    buf.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Contents 2 0 R >>\nendobj\n");
    let obj2_off = buf.len();
    buf.extend_from_slice(b"2 0 obj\n<< /Filter /Nonexistent /Length 5 >>\nstream\nhello\nendstream\nendobj\n");
    let xref_off = buf.len();
    buf.extend_from_slice(b"xref\n0 3\n");
    buf.extend_from_slice(b"0000000000 65535 f \n");
    buf.extend_from_slice(format!("{:010} 00000 n \n", obj1_off).as_bytes());
    buf.extend_from_slice(format!("{:010} 00000 n \n", obj2_off).as_bytes());
    buf.extend_from_slice(b"trailer\n<< /Size 3 /Root 1 0 R >>\n");
    buf.extend_from_slice(format!("startxref\n{}\n%%EOF", xref_off).as_bytes());

    let config = Config { ignore_filter_errors: true };
    let doc = Document::parse(&buf, config).unwrap();
    let seq = doc.get_object((2, 0)).unwrap();
    let stream = seq.iter().find_map(RawValue::as_stream).unwrap();
    let (bytes, residual) = stream.decoded.clone().unwrap();
    assert_eq!(bytes, b"hello");
    assert_eq!(residual, vec!["Nonexistent".to_string()]);

    let strict = Document::parse(&buf, Config::default());
    assert!(strict.is_err());
}

#[test]
fn two_parses_of_the_same_buffer_produce_structurally_equal_results() {
    let buf = classical_fixture();
    let first = Document::parse_default(&buf).unwrap();
    let second = Document::parse_default(&buf).unwrap();
    assert_eq!(first.xref.entries, second.xref.entries);
    assert_eq!(first.objects, second.objects);
}
