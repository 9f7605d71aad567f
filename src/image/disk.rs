//! Disk image container

use crate::error::{ImdError, Result};
use crate::format::constants::COMMENT_SENTINEL;
use crate::format::{ImdDate, ImdHeader, ImdTime, ImdVersion};
use crate::image::track::{Track, TrackMode};
use chrono::NaiveDateTime;
use std::borrow::Cow;
use std::path::Path;

/// An IMD disk image: header, comment and tracks in file order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disk {
    header: ImdHeader,
    comment: Vec<u8>,
    tracks: Vec<Track>,
}

impl Disk {
    /// Create a disk image
    ///
    /// Fails if a header field does not fit the header text or the comment
    /// contains the 0x1A sentinel.
    pub fn new(header: ImdHeader, comment: Vec<u8>, tracks: Vec<Track>) -> Result<Self> {
        header.validate()?;
        if let Some(pos) = comment.iter().position(|&b| b == COMMENT_SENTINEL) {
            return Err(ImdError::invalid_header_field(format!(
                "comment contains the 0x1A sentinel at position {}",
                pos
            )));
        }

        Ok(Self {
            header,
            comment,
            tracks,
        })
    }

    /// Open an IMD file from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        crate::io::reader::read_imd(path)
    }

    /// Decode an IMD image held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        crate::io::reader::decode_disk(bytes)
    }

    /// Encode this image
    pub fn to_bytes(&self) -> Vec<u8> {
        crate::io::writer::encode_disk(self)
    }

    /// Save the image to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        crate::io::writer::write_imd(self, path)
    }

    /// Get the parsed header line
    pub fn header(&self) -> &ImdHeader {
        &self.header
    }

    /// Version of ImageDisk that wrote the image
    pub fn version(&self) -> ImdVersion {
        self.header.version
    }

    /// Creation date
    pub fn date(&self) -> ImdDate {
        self.header.date
    }

    /// Creation time
    pub fn time(&self) -> ImdTime {
        self.header.time
    }

    /// Creation date and time, if they form a valid timestamp
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        self.header.timestamp()
    }

    /// Raw comment bytes
    pub fn comment(&self) -> &[u8] {
        &self.comment
    }

    /// Comment as text, replacing invalid sequences
    pub fn comment_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.comment)
    }

    /// Tracks in file order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Number of tracks in the image
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Check if this image has no tracks
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Find a track by cylinder and head
    pub fn get_track(&self, cylinder: u8, head: u8) -> Option<&Track> {
        self.tracks
            .iter()
            .find(|t| t.cylinder() == cylinder && t.head() == head)
    }

    /// Tracks recorded on one head, in file order
    pub fn tracks_on_head(&self, head: u8) -> impl Iterator<Item = &Track> {
        self.tracks.iter().filter(move |t| t.head() == head)
    }

    /// Number of heads that have at least one track
    pub fn head_count(&self) -> usize {
        let mut seen = [false; 2];
        for track in &self.tracks {
            seen[(track.head() & 1) as usize] = true;
        }
        seen.iter().filter(|&&s| s).count()
    }

    /// Distinct track modes in the order they first appear
    pub fn modes(&self) -> Vec<TrackMode> {
        let mut modes = Vec::new();
        for track in &self.tracks {
            if !modes.contains(&track.mode()) {
                modes.push(track.mode());
            }
        }
        modes
    }

    /// Total number of sector records
    pub fn sector_count(&self) -> usize {
        self.tracks.iter().map(|t| t.sector_count()).sum()
    }

    /// Number of sector records flagged with a data error
    pub fn error_count(&self) -> usize {
        self.tracks.iter().map(|t| t.error_count()).sum()
    }

    /// Logical data capacity in bytes (sum of sector sizes)
    pub fn total_capacity(&self) -> usize {
        self.tracks
            .iter()
            .map(|t| t.sector_count() * t.sector_size().bytes())
            .sum()
    }

    /// Size of this image's binary representation in bytes
    pub fn size(&self) -> usize {
        self.header.render().len()
            + self.comment.len()
            + 1
            + self.tracks.iter().map(|t| t.size()).sum::<usize>()
    }
}
