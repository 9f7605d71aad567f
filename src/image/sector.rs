//! Sector data records

use crate::error::{ImdError, Result};
use crate::format::constants::MAX_RECORD_TYPE;
use std::fmt;

/// State of a sector record, stored as a single type byte 0-8
///
/// Code 0 means no data could be read. Every other code carries data and
/// combines three independent flags: compressed (one repeated byte),
/// deleted data address mark, and data error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectorDataRecordType {
    /// Sector data unavailable
    Unavailable,
    /// Sector data present
    Data {
        /// Payload is a single byte repeated over the whole sector
        compressed: bool,
        /// Sector was written with a deleted data address mark
        deleted: bool,
        /// Sector was read with a data error
        error: bool,
    },
}

impl SectorDataRecordType {
    /// All nine record types in code order
    pub const ALL: [SectorDataRecordType; 9] = [
        Self::Unavailable,
        Self::data(false, false, false),
        Self::data(true, false, false),
        Self::data(false, true, false),
        Self::data(true, true, false),
        Self::data(false, false, true),
        Self::data(true, false, true),
        Self::data(false, true, true),
        Self::data(true, true, true),
    ];

    /// Plain, readable, uncompressed data
    pub const NORMAL: SectorDataRecordType = Self::data(false, false, false);

    /// Plain, readable, compressed data
    pub const COMPRESSED: SectorDataRecordType = Self::data(true, false, false);

    /// Build a data-carrying type from its flags
    pub const fn data(compressed: bool, deleted: bool, error: bool) -> Self {
        SectorDataRecordType::Data {
            compressed,
            deleted,
            error,
        }
    }

    /// Decode a record type byte
    pub fn from_code(code: u8) -> Option<Self> {
        let record_type = match code {
            0 => Self::Unavailable,
            1 => Self::data(false, false, false),
            2 => Self::data(true, false, false),
            3 => Self::data(false, true, false),
            4 => Self::data(true, true, false),
            5 => Self::data(false, false, true),
            6 => Self::data(true, false, true),
            7 => Self::data(false, true, true),
            8 => Self::data(true, true, true),
            _ => return None,
        };
        Some(record_type)
    }

    /// Encode as a record type byte
    pub fn code(&self) -> u8 {
        match *self {
            Self::Unavailable => 0,
            Self::Data {
                compressed,
                deleted,
                error,
            } => match (compressed, deleted, error) {
                (false, false, false) => 1,
                (true, false, false) => 2,
                (false, true, false) => 3,
                (true, true, false) => 4,
                (false, false, true) => 5,
                (true, false, true) => 6,
                (false, true, true) => 7,
                (true, true, true) => 8,
            },
        }
    }

    /// Does the record carry any data?
    pub fn has_data(&self) -> bool {
        matches!(self, Self::Data { .. })
    }

    /// Is the payload a single repeated byte?
    pub fn is_compressed(&self) -> bool {
        matches!(self, Self::Data { compressed: true, .. })
    }

    /// Does the sector carry a deleted data address mark?
    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Data { deleted: true, .. })
    }

    /// Was the sector read with a data error?
    pub fn has_error(&self) -> bool {
        matches!(self, Self::Data { error: true, .. })
    }

    /// Data present, uncompressed and not deleted
    pub fn is_normal(&self) -> bool {
        matches!(
            self,
            Self::Data {
                compressed: false,
                deleted: false,
                ..
            }
        )
    }

    /// Number of payload bytes following the type byte
    pub fn payload_len(&self, sector_size: usize) -> usize {
        match self {
            Self::Unavailable => 0,
            Self::Data {
                compressed: true, ..
            } => 1,
            Self::Data { .. } => sector_size,
        }
    }
}

impl TryFrom<u8> for SectorDataRecordType {
    type Error = ImdError;

    fn try_from(value: u8) -> Result<Self> {
        Self::from_code(value).ok_or(ImdError::InvalidRecordType { offset: 0, value })
    }
}

impl From<SectorDataRecordType> for u8 {
    fn from(record_type: SectorDataRecordType) -> Self {
        record_type.code()
    }
}

impl fmt::Display for SectorDataRecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "Unavailable"),
            Self::Data {
                compressed,
                deleted,
                error,
            } => {
                write!(f, "{}", if *compressed { "Compressed" } else { "Normal" })?;
                if *deleted {
                    write!(f, ", Deleted")?;
                }
                if *error {
                    write!(f, ", Error")?;
                }
                Ok(())
            }
        }
    }
}

/// A sector's type byte and its stored payload
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SectorDataRecord {
    record_type: SectorDataRecordType,
    data: Vec<u8>,
}

impl SectorDataRecord {
    /// Create a record from a type and its stored payload
    ///
    /// The payload is not checked against the type here; [`crate::image::Track::new`]
    /// checks it against the track's sector size.
    pub fn new(record_type: SectorDataRecordType, data: Vec<u8>) -> Self {
        Self { record_type, data }
    }

    /// A record for a sector whose data could not be read
    pub fn unavailable() -> Self {
        Self::new(SectorDataRecordType::Unavailable, Vec::new())
    }

    /// A plain uncompressed record
    pub fn normal(data: Vec<u8>) -> Self {
        Self::new(SectorDataRecordType::NORMAL, data)
    }

    /// A plain record storing one byte repeated over the sector
    pub fn compressed(fill: u8) -> Self {
        Self::new(SectorDataRecordType::COMPRESSED, vec![fill])
    }

    /// Build a record from full sector contents, compressing uniform sectors
    pub fn from_sector_data(data: &[u8], deleted: bool, error: bool) -> Self {
        match data.split_first() {
            Some((&first, rest)) if rest.iter().all(|&b| b == first) => Self::new(
                SectorDataRecordType::data(true, deleted, error),
                vec![first],
            ),
            _ => Self::new(
                SectorDataRecordType::data(false, deleted, error),
                data.to_vec(),
            ),
        }
    }

    /// Get the record type
    pub fn record_type(&self) -> SectorDataRecordType {
        self.record_type
    }

    /// Get the stored payload (one byte when compressed)
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Size of this record's binary representation in bytes
    pub fn size(&self) -> usize {
        1 + self.data.len()
    }

    /// Does the stored payload length match what the type implies?
    pub fn is_consistent(&self, sector_size: usize) -> bool {
        self.data.len() == self.record_type.payload_len(sector_size)
    }

    /// Get the logical sector contents, expanding compressed records
    ///
    /// Returns `None` when the sector data is unavailable.
    pub fn expanded(&self, sector_size: usize) -> Option<Vec<u8>> {
        match self.record_type {
            SectorDataRecordType::Unavailable => None,
            SectorDataRecordType::Data {
                compressed: true, ..
            } => self.data.first().map(|&fill| vec![fill; sector_size]),
            SectorDataRecordType::Data { .. } => Some(self.data.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_table() {
        let expected = [
            (0, false, false, false, false),
            (1, true, false, false, false),
            (2, true, true, false, false),
            (3, true, false, true, false),
            (4, true, true, true, false),
            (5, true, false, false, true),
            (6, true, true, false, true),
            (7, true, false, true, true),
            (8, true, true, true, true),
        ];

        for (code, has_data, compressed, deleted, error) in expected {
            let record_type = SectorDataRecordType::from_code(code).unwrap();
            assert_eq!(record_type.has_data(), has_data, "code {}", code);
            assert_eq!(record_type.is_compressed(), compressed, "code {}", code);
            assert_eq!(record_type.is_deleted(), deleted, "code {}", code);
            assert_eq!(record_type.has_error(), error, "code {}", code);
        }
    }

    #[test]
    fn test_code_bijection() {
        for code in 0..=MAX_RECORD_TYPE {
            let record_type = SectorDataRecordType::from_code(code).unwrap();
            assert_eq!(record_type.code(), code);
            assert_eq!(
                SectorDataRecordType::from_code(record_type.code()),
                Some(record_type)
            );
        }
    }

    #[test]
    fn test_all_in_code_order() {
        for (code, record_type) in SectorDataRecordType::ALL.iter().enumerate() {
            assert_eq!(record_type.code() as usize, code);
        }
    }

    #[test]
    fn test_invalid_codes() {
        for code in (MAX_RECORD_TYPE + 1)..=u8::MAX {
            assert!(SectorDataRecordType::from_code(code).is_none());
        }
        assert!(matches!(
            SectorDataRecordType::try_from(9),
            Err(ImdError::InvalidRecordType { value: 9, .. })
        ));
    }

    #[test]
    fn test_payload_len() {
        assert_eq!(SectorDataRecordType::Unavailable.payload_len(512), 0);
        assert_eq!(SectorDataRecordType::NORMAL.payload_len(512), 512);
        assert_eq!(SectorDataRecordType::COMPRESSED.payload_len(512), 1);
        assert_eq!(
            SectorDataRecordType::data(false, true, true).payload_len(1024),
            1024
        );
    }

    #[test]
    fn test_is_normal() {
        assert!(SectorDataRecordType::NORMAL.is_normal());
        assert!(SectorDataRecordType::data(false, false, true).is_normal());
        assert!(!SectorDataRecordType::COMPRESSED.is_normal());
        assert!(!SectorDataRecordType::Unavailable.is_normal());
    }

    #[test]
    fn test_record_sizes() {
        assert_eq!(SectorDataRecord::unavailable().size(), 1);
        assert_eq!(SectorDataRecord::compressed(0xE5).size(), 2);
        assert_eq!(SectorDataRecord::normal(vec![0; 512]).size(), 513);
    }

    #[test]
    fn test_from_sector_data_compresses_uniform() {
        let record = SectorDataRecord::from_sector_data(&[0xE5; 256], false, false);
        assert_eq!(record.record_type(), SectorDataRecordType::COMPRESSED);
        assert_eq!(record.data(), &[0xE5]);

        let mut data = vec![0xE5; 256];
        data[10] = 0;
        let record = SectorDataRecord::from_sector_data(&data, true, false);
        assert_eq!(record.record_type().code(), 3);
        assert_eq!(record.data().len(), 256);
    }

    #[test]
    fn test_expanded() {
        let record = SectorDataRecord::compressed(0x42);
        assert_eq!(record.expanded(128), Some(vec![0x42; 128]));

        let record = SectorDataRecord::normal((0..128).collect());
        assert_eq!(record.expanded(128).unwrap()[127], 127);

        assert_eq!(SectorDataRecord::unavailable().expanded(128), None);
    }

    #[test]
    fn test_is_consistent() {
        assert!(SectorDataRecord::compressed(0).is_consistent(512));
        assert!(SectorDataRecord::normal(vec![0; 512]).is_consistent(512));
        assert!(!SectorDataRecord::normal(vec![0; 256]).is_consistent(512));
        assert!(!SectorDataRecord::new(SectorDataRecordType::Unavailable, vec![1])
            .is_consistent(512));
    }

    #[test]
    fn test_display() {
        assert_eq!(SectorDataRecordType::Unavailable.to_string(), "Unavailable");
        assert_eq!(
            SectorDataRecordType::data(true, true, true).to_string(),
            "Compressed, Deleted, Error"
        );
        assert_eq!(SectorDataRecordType::NORMAL.to_string(), "Normal");
    }
}
