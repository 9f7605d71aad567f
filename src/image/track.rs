//! Track definition, mode and sector size

use crate::error::{ImdError, Result};
use crate::format::constants::*;
use crate::image::sector::SectorDataRecord;
use std::fmt;

/// Recording mode (encoding scheme) of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordingMode {
    /// FM (Frequency Modulation) - single density
    FM,
    /// MFM (Modified Frequency Modulation) - double density
    MFM,
}

/// Data rate of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataRate {
    /// 500 kbps
    Kbps500,
    /// 300 kbps
    Kbps300,
    /// 250 kbps
    Kbps250,
}

impl DataRate {
    /// Rate in kilobits per second
    pub fn kbps(&self) -> u32 {
        match self {
            DataRate::Kbps500 => 500,
            DataRate::Kbps300 => 300,
            DataRate::Kbps250 => 250,
        }
    }
}

/// Track mode byte: recording mode combined with data rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TrackMode {
    /// FM at 500 kbps
    Fm500Kbps = 0,
    /// FM at 300 kbps
    Fm300Kbps = 1,
    /// FM at 250 kbps
    Fm250Kbps = 2,
    /// MFM at 500 kbps
    Mfm500Kbps = 3,
    /// MFM at 300 kbps
    Mfm300Kbps = 4,
    /// MFM at 250 kbps
    Mfm250Kbps = 5,
}

impl TrackMode {
    /// All modes in byte order
    pub const ALL: [TrackMode; 6] = [
        TrackMode::Fm500Kbps,
        TrackMode::Fm300Kbps,
        TrackMode::Fm250Kbps,
        TrackMode::Mfm500Kbps,
        TrackMode::Mfm300Kbps,
        TrackMode::Mfm250Kbps,
    ];

    /// Decode a mode byte
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Encode as a mode byte
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Encoding scheme
    pub fn recording_mode(&self) -> RecordingMode {
        match self {
            TrackMode::Fm500Kbps | TrackMode::Fm300Kbps | TrackMode::Fm250Kbps => {
                RecordingMode::FM
            }
            TrackMode::Mfm500Kbps | TrackMode::Mfm300Kbps | TrackMode::Mfm250Kbps => {
                RecordingMode::MFM
            }
        }
    }

    /// Data rate
    pub fn data_rate(&self) -> DataRate {
        match self {
            TrackMode::Fm500Kbps | TrackMode::Mfm500Kbps => DataRate::Kbps500,
            TrackMode::Fm300Kbps | TrackMode::Mfm300Kbps => DataRate::Kbps300,
            TrackMode::Fm250Kbps | TrackMode::Mfm250Kbps => DataRate::Kbps250,
        }
    }

    /// Canonical name, e.g. `MFM_250KBPS`
    pub fn name(&self) -> &'static str {
        match self {
            TrackMode::Fm500Kbps => "FM_500KBPS",
            TrackMode::Fm300Kbps => "FM_300KBPS",
            TrackMode::Fm250Kbps => "FM_250KBPS",
            TrackMode::Mfm500Kbps => "MFM_500KBPS",
            TrackMode::Mfm300Kbps => "MFM_300KBPS",
            TrackMode::Mfm250Kbps => "MFM_250KBPS",
        }
    }
}

impl TryFrom<u8> for TrackMode {
    type Error = ImdError;

    fn try_from(value: u8) -> Result<Self> {
        Self::from_code(value).ok_or(ImdError::InvalidMode { offset: 0, value })
    }
}

impl From<TrackMode> for u8 {
    fn from(mode: TrackMode) -> Self {
        mode.code()
    }
}

impl fmt::Display for TrackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Sector size of a track, one of 128 << n for n in 0..=6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectorSize(u8);

impl SectorSize {
    /// Create from a size code (`size = 128 << code`)
    pub fn from_code(code: u8) -> Option<Self> {
        size_code_to_bytes(code).map(|_| SectorSize(code))
    }

    /// Create from a size in bytes
    pub fn from_bytes(bytes: usize) -> Option<Self> {
        bytes_to_size_code(bytes).map(SectorSize)
    }

    /// Size code as stored in the track header
    pub fn code(&self) -> u8 {
        self.0
    }

    /// Size in bytes
    pub fn bytes(&self) -> usize {
        SECTOR_SIZE_BASE << self.0
    }
}

impl TryFrom<usize> for SectorSize {
    type Error = ImdError;

    fn try_from(bytes: usize) -> Result<Self> {
        Self::from_bytes(bytes).ok_or_else(|| {
            ImdError::invalid_track(format!(
                "sector size {} is not 128, 256, 512, 1024, 2048, 4096 or 8192",
                bytes
            ))
        })
    }
}

impl fmt::Display for SectorSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bytes())
    }
}

/// The fixed 5-byte header in front of every track
///
/// The on-disk head byte packs the head number with the two map presence
/// flags; here they are separate fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackHeader {
    /// Track mode
    pub mode: TrackMode,
    /// Physical cylinder
    pub cylinder: u8,
    /// Physical head (0 or 1)
    pub head: u8,
    /// A sector cylinder map follows the numbering map
    pub has_cylinder_map: bool,
    /// A sector head map follows the numbering (and cylinder) map
    pub has_head_map: bool,
    /// Number of sectors
    pub sector_count: u8,
    /// Sector size
    pub sector_size: SectorSize,
}

impl TrackHeader {
    /// Parse the five header bytes; `offset` is used for error reporting
    pub fn from_bytes(bytes: [u8; TRACK_HEADER_SIZE], offset: usize) -> Result<Self> {
        let [mode, cylinder, head_byte, sector_count, size_code] = bytes;

        let mode = TrackMode::from_code(mode).ok_or(ImdError::InvalidMode {
            offset,
            value: mode,
        })?;
        let sector_size = SectorSize::from_code(size_code).ok_or(ImdError::InvalidSectorSize {
            offset: offset + 4,
            value: size_code,
        })?;

        let unknown_bits = head_byte & !(CYLINDER_MAP_FLAG | HEAD_MAP_FLAG | HEAD_MASK);
        if unknown_bits != 0 {
            log::warn!(
                "Track header at offset {:#X}: ignoring head byte bits {:#04X}",
                offset,
                unknown_bits
            );
        }

        Ok(Self {
            mode,
            cylinder,
            head: head_byte & HEAD_MASK,
            has_cylinder_map: head_byte & CYLINDER_MAP_FLAG != 0,
            has_head_map: head_byte & HEAD_MAP_FLAG != 0,
            sector_count,
            sector_size,
        })
    }

    /// Reassemble the packed head byte
    pub fn head_byte(&self) -> u8 {
        let mut head = self.head & HEAD_MASK;
        if self.has_cylinder_map {
            head |= CYLINDER_MAP_FLAG;
        }
        if self.has_head_map {
            head |= HEAD_MAP_FLAG;
        }
        head
    }

    /// Serialize the five header bytes
    pub fn to_bytes(&self) -> [u8; TRACK_HEADER_SIZE] {
        [
            self.mode.code(),
            self.cylinder,
            self.head_byte(),
            self.sector_count,
            self.sector_size.code(),
        ]
    }

    /// Number of bytes taken by the maps that follow this header
    pub fn maps_len(&self) -> usize {
        let count = self.sector_count as usize;
        let mut len = count;
        if self.has_cylinder_map {
            len += count;
        }
        if self.has_head_map {
            len += count;
        }
        len
    }
}

/// A disk track: header fields, sector maps and one record per sector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    mode: TrackMode,
    cylinder: u8,
    head: u8,
    sector_size: SectorSize,
    sector_numbering_map: Vec<u8>,
    sector_cylinder_map: Option<Vec<u8>>,
    sector_head_map: Option<Vec<u8>>,
    sector_data_records: Vec<SectorDataRecord>,
}

impl Track {
    /// Create a track, checking that maps and records agree with each other
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mode: TrackMode,
        cylinder: u8,
        head: u8,
        sector_size: SectorSize,
        sector_numbering_map: Vec<u8>,
        sector_cylinder_map: Option<Vec<u8>>,
        sector_head_map: Option<Vec<u8>>,
        sector_data_records: Vec<SectorDataRecord>,
    ) -> Result<Self> {
        let count = sector_numbering_map.len();

        if count > u8::MAX as usize {
            return Err(ImdError::invalid_track(format!(
                "{} sectors on cylinder {} head {}, at most 255 allowed",
                count, cylinder, head
            )));
        }
        if head > 1 {
            return Err(ImdError::invalid_track(format!("head {} is not 0 or 1", head)));
        }
        if let Some(map) = &sector_cylinder_map {
            if map.len() != count {
                return Err(ImdError::invalid_track(format!(
                    "cylinder map has {} entries, expected {}",
                    map.len(),
                    count
                )));
            }
        }
        if let Some(map) = &sector_head_map {
            if map.len() != count {
                return Err(ImdError::invalid_track(format!(
                    "head map has {} entries, expected {}",
                    map.len(),
                    count
                )));
            }
        }
        if sector_data_records.len() != count {
            return Err(ImdError::invalid_track(format!(
                "{} sector records, expected {}",
                sector_data_records.len(),
                count
            )));
        }
        for (index, record) in sector_data_records.iter().enumerate() {
            if !record.is_consistent(sector_size.bytes()) {
                return Err(ImdError::invalid_track(format!(
                    "sector {} ({}) has {} data bytes, expected {}",
                    index,
                    record.record_type(),
                    record.data().len(),
                    record.record_type().payload_len(sector_size.bytes())
                )));
            }
        }

        Ok(Self {
            mode,
            cylinder,
            head,
            sector_size,
            sector_numbering_map,
            sector_cylinder_map,
            sector_head_map,
            sector_data_records,
        })
    }

    /// Decode a single track from the start of `bytes`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = crate::io::ByteReader::new(bytes);
        crate::io::reader::decode_track(&mut reader)
    }

    /// Encode this track
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.size());
        crate::io::writer::encode_track(self, &mut out);
        out
    }

    /// Get the header fields of this track
    pub fn header(&self) -> TrackHeader {
        TrackHeader {
            mode: self.mode,
            cylinder: self.cylinder,
            head: self.head,
            has_cylinder_map: self.sector_cylinder_map.is_some(),
            has_head_map: self.sector_head_map.is_some(),
            sector_count: self.sector_count() as u8,
            sector_size: self.sector_size,
        }
    }

    /// Track mode
    pub fn mode(&self) -> TrackMode {
        self.mode
    }

    /// Physical cylinder
    pub fn cylinder(&self) -> u8 {
        self.cylinder
    }

    /// Physical head
    pub fn head(&self) -> u8 {
        self.head
    }

    /// Sector size
    pub fn sector_size(&self) -> SectorSize {
        self.sector_size
    }

    /// Number of sectors on this track
    pub fn sector_count(&self) -> usize {
        self.sector_numbering_map.len()
    }

    /// Check if this track has no sectors
    pub fn is_empty(&self) -> bool {
        self.sector_numbering_map.is_empty()
    }

    /// Logical sector number of each physical sector
    pub fn sector_numbering_map(&self) -> &[u8] {
        &self.sector_numbering_map
    }

    /// Cylinder recorded in each sector ID, if it differs from the track's
    pub fn sector_cylinder_map(&self) -> Option<&[u8]> {
        self.sector_cylinder_map.as_deref()
    }

    /// Head recorded in each sector ID, if it differs from the track's
    pub fn sector_head_map(&self) -> Option<&[u8]> {
        self.sector_head_map.as_deref()
    }

    /// Sector records in physical order
    pub fn sector_data_records(&self) -> &[SectorDataRecord] {
        &self.sector_data_records
    }

    /// Size of this track's binary representation in bytes
    pub fn size(&self) -> usize {
        let records: usize = self.sector_data_records.iter().map(|r| r.size()).sum();
        TRACK_HEADER_SIZE + self.header().maps_len() + records
    }

    /// Cylinder a sector claims in its ID field
    pub fn sector_cylinder(&self, index: usize) -> Option<u8> {
        match &self.sector_cylinder_map {
            Some(map) => map.get(index).copied(),
            None => (index < self.sector_count()).then_some(self.cylinder),
        }
    }

    /// Head a sector claims in its ID field
    pub fn sector_head(&self, index: usize) -> Option<u8> {
        match &self.sector_head_map {
            Some(map) => map.get(index).copied(),
            None => (index < self.sector_count()).then_some(self.head),
        }
    }

    /// Physical position of a logical sector number
    pub fn position_of(&self, sector_number: u8) -> Option<usize> {
        self.sector_numbering_map
            .iter()
            .position(|&n| n == sector_number)
    }

    /// Get a record by its logical sector number
    pub fn get_record(&self, sector_number: u8) -> Option<&SectorDataRecord> {
        self.position_of(sector_number)
            .and_then(|index| self.sector_data_records.get(index))
    }

    /// Get full sector contents by logical sector number
    pub fn read_sector(&self, sector_number: u8) -> Option<Vec<u8>> {
        self.get_record(sector_number)?
            .expanded(self.sector_size.bytes())
    }

    /// Number of records flagged with a data error
    pub fn error_count(&self) -> usize {
        self.count_records(|r| r.record_type().has_error())
    }

    /// Number of records with a deleted data address mark
    pub fn deleted_count(&self) -> usize {
        self.count_records(|r| r.record_type().is_deleted())
    }

    /// Number of compressed records
    pub fn compressed_count(&self) -> usize {
        self.count_records(|r| r.record_type().is_compressed())
    }

    /// Number of records without data
    pub fn unavailable_count(&self) -> usize {
        self.count_records(|r| !r.record_type().has_data())
    }

    fn count_records<F: Fn(&SectorDataRecord) -> bool>(&self, predicate: F) -> usize {
        self.sector_data_records
            .iter()
            .filter(|r| predicate(r))
            .count()
    }
}
