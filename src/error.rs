use thiserror::Error as ThisError;

/// Failures raised while locating and walking the cross-reference chain.
#[derive(Debug, ThisError, Clone, PartialEq, Eq)]
pub enum XrefError {
    #[error("could not locate `startxref`")]
    StartNotFound,
    #[error("xref resolution produced no entries")]
    NotFound,
    #[error("xref table has no matching `trailer` dictionary")]
    TrailerNotFound,
    #[error("xref `Prev` chain revisits offset {0}")]
    Loop(usize),
    #[error("xref stream uses unknown PNG predictor selector {0}")]
    UnknownPredictor(u8),
    #[error("xref stream row could not be unpacked with field widths {0:?}")]
    UnpackFailure([u8; 3]),
}

/// Failures raised by the filter collaborator while decoding stream bytes.
#[derive(Debug, ThisError, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("filter `{0}` is not supported")]
    Unsupported(String),
    #[error("filter `{0}` failed to decode its input")]
    DecodeFailed(String),
}

/// All failure modes of [`crate::parse`].
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("input buffer is empty")]
    EmptyData,
    #[error("`%PDF-` header not found")]
    HeaderMissing,
    #[error("xref error: {0}")]
    Xref(#[from] XrefError),
    #[error("invalid indirect reference key `{0}`")]
    InvalidReference(String),
    #[error("filter error: {0}")]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Clone for Error {
    fn clone(&self) -> Self {
        match self {
            Error::EmptyData => Error::EmptyData,
            Error::HeaderMissing => Error::HeaderMissing,
            Error::Xref(e) => Error::Xref(e.clone()),
            Error::InvalidReference(s) => Error::InvalidReference(s.clone()),
            Error::Filter(e) => Error::Filter(e.clone()),
            Error::Io(e) => Error::Io(std::io::Error::new(e.kind(), e.to_string())),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
