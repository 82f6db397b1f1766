//! Error type for dynamic marking operations.

use thiserror::Error;

use crate::property::PropertyId;

pub type Result<T> = std::result::Result<T, DynamicError>;

/// Recoverable conditions surfaced to callers. None of them are fatal.
#[derive(Debug, Error)]
pub enum DynamicError {
    #[error("property {0:?} is not supported by this element")]
    UnsupportedProperty(PropertyId),
    #[error("property {id:?} cannot take a {found} value")]
    TypeMismatch { id: PropertyId, found: &'static str },
    #[error("subtype index {0} is outside the dynamics catalog")]
    InvalidSubtype(i32),
    #[error("XML error: {0}")]
    Xml(String),
    #[error("archive error: {0}")]
    Archive(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<roxmltree::Error> for DynamicError {
    fn from(e: roxmltree::Error) -> Self {
        DynamicError::Xml(e.to_string())
    }
}

impl From<zip::result::ZipError> for DynamicError {
    fn from(e: zip::result::ZipError) -> Self {
        DynamicError::Archive(e.to_string())
    }
}
