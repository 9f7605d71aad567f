//! Builders for creating IMD images

use crate::error::{ImdError, Result};
use crate::format::constants::DEFAULT_VERSION;
use crate::format::{ImdHeader, ImdVersion};
use crate::image::{Disk, SectorDataRecord, SectorSize, Track, TrackMode};
use chrono::NaiveDateTime;

/// Builder for constructing disk images
pub struct DiskBuilder {
    version: ImdVersion,
    timestamp: Option<NaiveDateTime>,
    comment: Vec<u8>,
    tracks: Vec<Track>,
}

impl DiskBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            version: ImdVersion::new(DEFAULT_VERSION.0, DEFAULT_VERSION.1),
            timestamp: None,
            comment: Vec::new(),
            tracks: Vec::new(),
        }
    }

    /// Set the version written in the header
    pub fn version(mut self, major: u8, minor: u8) -> Self {
        self.version = ImdVersion::new(major, minor);
        self
    }

    /// Set the creation timestamp (defaults to the local time at build)
    pub fn timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Set the comment
    pub fn comment<C: Into<Vec<u8>>>(mut self, comment: C) -> Self {
        self.comment = comment.into();
        self
    }

    /// Append a track
    pub fn track(mut self, track: Track) -> Self {
        self.tracks.push(track);
        self
    }

    /// Build the disk image
    pub fn build(self) -> Result<Disk> {
        let timestamp = self
            .timestamp
            .unwrap_or_else(|| chrono::Local::now().naive_local());
        let header = ImdHeader::from_datetime(self.version, timestamp)?;
        Disk::new(header, self.comment, self.tracks)
    }
}

impl Default for DiskBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing a track sector by sector
pub struct TrackBuilder {
    mode: TrackMode,
    cylinder: u8,
    head: u8,
    sector_size: usize,
    numbers: Vec<u8>,
    cylinders: Vec<u8>,
    heads: Vec<u8>,
    records: Vec<SectorDataRecord>,
    force_cylinder_map: bool,
    force_head_map: bool,
}

impl TrackBuilder {
    /// Create a builder for a track at the given position
    pub fn new(mode: TrackMode, cylinder: u8, head: u8) -> Self {
        Self {
            mode,
            cylinder,
            head,
            sector_size: 512,
            numbers: Vec::new(),
            cylinders: Vec::new(),
            heads: Vec::new(),
            records: Vec::new(),
            force_cylinder_map: false,
            force_head_map: false,
        }
    }

    /// Set the sector size in bytes
    pub fn sector_size(mut self, sector_size: usize) -> Self {
        self.sector_size = sector_size;
        self
    }

    /// Add a sector whose ID matches this track's cylinder and head
    pub fn sector(self, number: u8, record: SectorDataRecord) -> Self {
        let (cylinder, head) = (self.cylinder, self.head);
        self.sector_with_id(cylinder, head, number, record)
    }

    /// Add a sector from full sector contents, compressing uniform data
    pub fn sector_data(self, number: u8, data: &[u8]) -> Self {
        self.sector(number, SectorDataRecord::from_sector_data(data, false, false))
    }

    /// Add a sector whose ID carries its own cylinder and head
    ///
    /// A cylinder or head map is written only when some sector differs
    /// from the track's own position.
    pub fn sector_with_id(
        mut self,
        cylinder: u8,
        head: u8,
        number: u8,
        record: SectorDataRecord,
    ) -> Self {
        self.numbers.push(number);
        self.cylinders.push(cylinder);
        self.heads.push(head);
        self.records.push(record);
        self
    }

    /// Always write a cylinder map, even if every entry matches the track
    pub fn with_cylinder_map(mut self) -> Self {
        self.force_cylinder_map = true;
        self
    }

    /// Always write a head map, even if every entry matches the track
    pub fn with_head_map(mut self) -> Self {
        self.force_head_map = true;
        self
    }

    /// Build the track
    pub fn build(self) -> Result<Track> {
        let sector_size = SectorSize::try_from(self.sector_size)?;

        let cylinder_map = (self.force_cylinder_map
            || self.cylinders.iter().any(|&c| c != self.cylinder))
        .then_some(self.cylinders);
        let head_map = (self.force_head_map || self.heads.iter().any(|&h| h != self.head))
            .then_some(self.heads);

        if self.numbers.len() > u8::MAX as usize {
            return Err(ImdError::invalid_track(format!(
                "{} sectors added, at most 255 allowed",
                self.numbers.len()
            )));
        }

        Track::new(
            self.mode,
            self.cylinder,
            self.head,
            sector_size,
            self.numbers,
            cylinder_map,
            head_map,
            self.records,
        )
    }
}
