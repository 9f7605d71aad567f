//! IMD format constants and header text handling

/// Format constants
pub mod constants;
/// Header line parsing and rendering
pub mod header;

pub use constants::*;
pub use header::{parse_header, ImdDate, ImdHeader, ImdTime, ImdVersion};

/// Check whether a buffer starts like an IMD image
pub fn detect_imd(magic: &[u8]) -> bool {
    magic.starts_with(IMD_SIGNATURE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_imd() {
        assert!(detect_imd(b"IMD 1.18: 05/03/2024  9:15:32\r\n"));
    }

    #[test]
    fn test_detect_invalid_format() {
        assert!(!detect_imd(b"EXTENDED CPC DSK File\r\n"));
        assert!(!detect_imd(b"IM"));
    }
}
