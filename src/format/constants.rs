//! IMD format constants

/// Marks the end of the header and comment region
pub const COMMENT_SENTINEL: u8 = 0x1A;

/// Signature every IMD header line starts with
pub const IMD_SIGNATURE: &[u8] = b"IMD ";

/// Size of the fixed track header (mode, cylinder, head, count, size code)
pub const TRACK_HEADER_SIZE: usize = 5;

/// Head byte flag: a sector cylinder map follows the numbering map
pub const CYLINDER_MAP_FLAG: u8 = 0x80;

/// Head byte flag: a sector head map follows the numbering/cylinder maps
pub const HEAD_MAP_FLAG: u8 = 0x40;

/// Head byte bits that carry the physical head
pub const HEAD_MASK: u8 = 0x01;

/// Smallest sector size; size code `n` means `SECTOR_SIZE_BASE << n`
pub const SECTOR_SIZE_BASE: usize = 128;

/// IMD sector size code to byte size mapping
/// Index: size code (0-6), Value: size in bytes
pub const IMD_SECTOR_SIZES: [usize; 7] = [
    128,  // 0
    256,  // 1
    512,  // 2
    1024, // 3
    2048, // 4
    4096, // 5
    8192, // 6
];

/// Number of defined track modes
pub const TRACK_MODE_COUNT: u8 = 6;

/// Highest defined sector record type code
pub const MAX_RECORD_TYPE: u8 = 8;

/// Version written by images created with this library
pub const DEFAULT_VERSION: (u8, u8) = (1, 18);

/// Convert an IMD size code to a byte size
#[inline]
pub fn size_code_to_bytes(size_code: u8) -> Option<usize> {
    IMD_SECTOR_SIZES.get(size_code as usize).copied()
}

/// Convert a byte size to an IMD size code
#[inline]
pub fn bytes_to_size_code(bytes: usize) -> Option<u8> {
    IMD_SECTOR_SIZES
        .iter()
        .position(|&size| size == bytes)
        .map(|code| code as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_codes() {
        assert_eq!(size_code_to_bytes(0), Some(128));
        assert_eq!(size_code_to_bytes(2), Some(512));
        assert_eq!(size_code_to_bytes(6), Some(8192));
        assert_eq!(size_code_to_bytes(7), None);
    }

    #[test]
    fn test_bytes_to_size_code() {
        assert_eq!(bytes_to_size_code(128), Some(0));
        assert_eq!(bytes_to_size_code(1024), Some(3));
        assert_eq!(bytes_to_size_code(8192), Some(6));
        assert_eq!(bytes_to_size_code(384), None);
        assert_eq!(bytes_to_size_code(16384), None);
    }

    #[test]
    fn test_size_table_is_shift_of_base() {
        for (code, &size) in IMD_SECTOR_SIZES.iter().enumerate() {
            assert_eq!(size, SECTOR_SIZE_BASE << code);
        }
    }
}
