//! Convenience entry points over [`crate::document::Document::parse`]
//! (spec.md's Non-goals exclude async, password, and network loading; these
//! three are grounded in the teacher's own synchronous `load`/`load_mem`/
//! `load_from` family with those variants removed).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::config::Config;
use crate::document::Document;
use crate::error::Result;

impl Document {
    /// Reads the file at `path` into memory and parses it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Document> {
        let mut file = File::open(path)?;
        let mut buffer = Vec::with_capacity(file.metadata().map(|m| m.len() as usize).unwrap_or(0));
        file.read_to_end(&mut buffer)?;
        Document::parse_default(&buffer)
    }

    /// As [`Document::load`], with an explicit [`Config`].
    pub fn load_with_config<P: AsRef<Path>>(path: P, config: Config) -> Result<Document> {
        let mut file = File::open(path)?;
        let mut buffer = Vec::with_capacity(file.metadata().map(|m| m.len() as usize).unwrap_or(0));
        file.read_to_end(&mut buffer)?;
        Document::parse(&buffer, config)
    }

    /// Parses an in-memory buffer.
    pub fn load_mem(buffer: &[u8]) -> Result<Document> {
        Document::parse_default(buffer)
    }

    /// Reads an arbitrary [`Read`]er to completion and parses it.
    pub fn load_from<R: Read>(mut source: R) -> Result<Document> {
        let mut buffer = Vec::new();
        source.read_to_end(&mut buffer)?;
        Document::parse_default(&buffer)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn classical_fixture() -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n");
        let obj1_off = buf.len();
        buf.extend_from_slice(b"1 0 obj\n<< /Type /Catalog >>\nendobj\n");
        let xref_off = buf.len();
        buf.extend_from_slice(b"xref\n0 2\n");
        buf.extend_from_slice(b"0000000000 65535 f \n");
        buf.extend_from_slice(format!("{:010} 00000 n \n", obj1_off).as_bytes());
        buf.extend_from_slice(b"trailer\n<< /Size 2 /Root 1 0 R >>\n");
        buf.extend_from_slice(format!("startxref\n{}\n%%EOF", xref_off).as_bytes());
        buf
    }

    #[test]
    fn load_reads_a_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&classical_fixture()).unwrap();
        let doc = Document::load(file.path()).unwrap();
        assert_eq!(doc.trailer().root, Some((1, 0)));
    }

    #[test]
    fn load_with_config_is_honored() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&classical_fixture()).unwrap();
        let config = Config { ignore_filter_errors: true };
        let doc = Document::load_with_config(file.path(), config).unwrap();
        assert_eq!(doc.trailer().root, Some((1, 0)));
    }

    #[test]
    fn load_from_reads_an_arbitrary_reader() {
        let buf = classical_fixture();
        let doc = Document::load_from(std::io::Cursor::new(buf)).unwrap();
        assert_eq!(doc.trailer().root, Some((1, 0)));
    }
}
