use thiserror::Error;

/// Result type alias for IMD operations
pub type Result<T> = std::result::Result<T, ImdError>;

/// Errors that can occur when working with IMD files
#[derive(Debug, Error)]
pub enum ImdError {
    /// I/O error occurred while reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Header text does not match the IMD pattern, or the comment sentinel is missing
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    /// Track mode byte outside 0-5
    #[error("Invalid track mode {value} at offset {offset}")]
    InvalidMode {
        /// Byte offset of the mode byte
        offset: usize,
        /// Value found
        value: u8,
    },

    /// Sector size exponent outside 0-6
    #[error("Invalid sector size code {value} at offset {offset}")]
    InvalidSectorSize {
        /// Byte offset of the size byte
        offset: usize,
        /// Value found
        value: u8,
    },

    /// Sector record type byte outside 0-8
    #[error("Invalid sector record type {value} at offset {offset}")]
    InvalidRecordType {
        /// Byte offset of the record type byte
        offset: usize,
        /// Value found
        value: u8,
    },

    /// A structure claims more bytes than remain in the buffer
    #[error("Truncated {context} at offset {offset}: need {needed} bytes, {available} available")]
    TruncatedData {
        /// Byte offset where the structure starts
        offset: usize,
        /// Bytes the structure requires
        needed: usize,
        /// Bytes remaining in the buffer
        available: usize,
        /// What was being read
        context: &'static str,
    },

    /// Track fields are inconsistent with each other
    #[error("Invalid track: {0}")]
    InvalidTrack(String),

    /// Disk header field cannot be represented in the header text
    #[error("Invalid header field: {0}")]
    InvalidHeaderField(String),
}

impl ImdError {
    /// Create a malformed header error
    pub fn malformed_header<S: Into<String>>(message: S) -> Self {
        ImdError::MalformedHeader(message.into())
    }

    /// Create a truncation error with context
    pub fn truncated(context: &'static str, offset: usize, needed: usize, available: usize) -> Self {
        ImdError::TruncatedData {
            offset,
            needed,
            available,
            context,
        }
    }

    /// Create an invalid track error
    pub fn invalid_track<S: Into<String>>(message: S) -> Self {
        ImdError::InvalidTrack(message.into())
    }

    /// Create an invalid header field error
    pub fn invalid_header_field<S: Into<String>>(message: S) -> Self {
        ImdError::InvalidHeaderField(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ImdError::InvalidMode {
            offset: 34,
            value: 6,
        };
        assert_eq!(err.to_string(), "Invalid track mode 6 at offset 34");
    }

    #[test]
    fn test_truncated_error() {
        let err = ImdError::truncated("sector numbering map", 40, 9, 3);
        assert_eq!(
            err.to_string(),
            "Truncated sector numbering map at offset 40: need 9 bytes, 3 available"
        );
    }

    #[test]
    fn test_malformed_header() {
        let err = ImdError::malformed_header("missing 0x1A sentinel");
        assert_eq!(err.to_string(), "Malformed header: missing 0x1A sentinel");
    }
}
