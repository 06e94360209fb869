use thiserror::Error;

use crate::payload::Field;

/// A form control could not be read. Never shown to the user, the payload
/// just comes out empty.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("could not read field `{}`: {reason}", field.id())]
pub struct FieldReadError {
    pub field: Field,
    pub reason: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("payload of {length} characters does not fit into a QR code")]
    DataTooLong { length: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    #[error("rasterizing failed: {0}")]
    Rasterize(String),
    #[error("download could not be started: {0}")]
    Download(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShareError {
    /// The copy command ran but the browser refused it.
    #[error("could not copy data")]
    NotCopied,
    #[error("copy failed: {0}")]
    Platform(String),
}
