//! Error taxonomy for the IGES codec.
//!
//! Every failure surfaces as one of the [`IgesError`] kinds below; there is
//! no silent recovery. Where the failing layer knows a 1-based line number
//! or record index, it is embedded in the message.

use thiserror::Error;

/// Errors produced while reading or writing IGES files
#[derive(Error, Debug)]
pub enum IgesError {
    /// Path missing, not a regular file, directory creation or write failed
    #[error("FileOpenError: {0}")]
    FileOpen(String),

    /// A physical line violates the column discipline (width, terminator)
    #[error("LineFormatError: {0}")]
    LineFormat(String),

    /// Section identifier, ordering or sequence numbering violated; a
    /// free-format record is malformed
    #[error("SectionFormatError: {0}")]
    SectionFormat(String),

    /// A scalar lexeme failed to convert, or a required field was blank
    /// without a default
    #[error("TypeConversionError: {0}")]
    TypeConversion(String),

    /// Strict DE validation failed, declared parameter counts overrun the
    /// token stream, or cross-references are inconsistent
    #[error("DataFormatError: {0}")]
    DataFormat(String),

    /// Compressed IGES input and other unimplemented format corners
    #[error("NotImplementedError: {0}")]
    NotImplemented(String),

    /// Self-consistency assertion failure inside the library
    #[error("ImplementationError: {0}")]
    Implementation(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, IgesError>;

impl From<std::io::Error> for IgesError {
    fn from(err: std::io::Error) -> Self {
        IgesError::FileOpen(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_kind() {
        let err = IgesError::LineFormat("line 3 is 79 characters long".to_string());
        assert!(err.to_string().starts_with("LineFormatError:"));

        let err = IgesError::TypeConversion("invalid integer value: 'x'".to_string());
        assert!(err.to_string().contains("invalid integer value"));
    }

    #[test]
    fn test_io_error_maps_to_file_open() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: IgesError = io.into();
        assert!(matches!(err, IgesError::FileOpen(_)));
    }
}
