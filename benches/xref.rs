use criterion::{criterion_group, criterion_main, Criterion};

use pdfcore::parser::unpredict::unpredict;
use pdfcore::xref_resolver::resolve;

fn incrementally_updated_document() -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"%PDF-1.4\n");
    let obj1_off = buf.len();
    buf.extend_from_slice(b"1 0 obj\n<< /Type /Catalog >>\nendobj\n");
    let xref1_off = buf.len();
    buf.extend_from_slice(b"xref\n0 2\n");
    buf.extend_from_slice(b"0000000000 65535 f \n");
    buf.extend_from_slice(format!("{:010} 00000 n \n", obj1_off).as_bytes());
    buf.extend_from_slice(b"trailer\n<< /Size 2 /Root 1 0 R >>\n");
    buf.extend_from_slice(format!("startxref\n{}\n%%EOF\n", xref1_off).as_bytes());

    let obj2_off = buf.len();
    buf.extend_from_slice(b"2 0 obj\n<< /Type /Catalog /Extra true >>\nendobj\n");
    let xref2_off = buf.len();
    buf.extend_from_slice(b"xref\n0 1\n");
    buf.extend_from_slice(b"0000000000 65535 f \n");
    buf.extend_from_slice(b"2 1\n");
    buf.extend_from_slice(format!("{:010} 00000 n \n", obj2_off).as_bytes());
    buf.extend_from_slice(format!("trailer\n<< /Size 3 /Root 2 0 R /Prev {} >>\n", xref1_off).as_bytes());
    buf.extend_from_slice(format!("startxref\n{}\n%%EOF", xref2_off).as_bytes());
    buf
}

fn bench_resolve_incremental_chain(c: &mut Criterion) {
    let buf = incrementally_updated_document();
    c.bench_function("resolve_incremental_xref_chain", |b| {
        b.iter(|| {
            let xref = resolve(&buf, false).unwrap();
            assert_eq!(xref.entries.len(), 2);
        });
    });
}

fn bench_png_unpredict(c: &mut Criterion) {
    // Ten rows of a Paeth-predicted 4-byte-wide xref-stream payload.
    let mut rows = Vec::new();
    for i in 0..10u8 {
        rows.extend_from_slice(&[14, i, i.wrapping_mul(2), i.wrapping_mul(3), i.wrapping_mul(5)]);
    }
    c.bench_function("png_unpredict_10_rows", |b| {
        b.iter(|| {
            let out = unpredict(&rows, 4).unwrap();
            assert_eq!(out.len(), 40);
        });
    });
}

criterion_group!(benches, bench_resolve_incremental_chain, bench_png_unpredict);
criterion_main!(benches);
