//! IMD decoder

use crate::error::{ImdError, Result};
use crate::format::constants::*;
use crate::format::parse_header;
use crate::image::{Disk, SectorDataRecord, SectorDataRecordType, Track, TrackHeader};
use std::path::Path;

/// Cursor over an in-memory image
///
/// Every read is bounds checked and reports the absolute offset of the
/// structure that did not fit.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a reader positioned at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Create a reader whose reported offsets start at `pos`
    pub fn at(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos: pos.min(data.len()) }
    }

    /// Current offset
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Check if all input has been consumed
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Take the next `len` bytes
    pub fn take(&mut self, len: usize, context: &'static str) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(ImdError::truncated(context, self.pos, len, self.remaining()));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Take the next byte
    pub fn read_u8(&mut self, context: &'static str) -> Result<u8> {
        Ok(self.take(1, context)?[0])
    }

    /// Take the next `N` bytes as an array
    pub fn read_array<const N: usize>(&mut self, context: &'static str) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, context)?);
        Ok(out)
    }
}

/// Read an IMD file from disk
pub fn read_imd<P: AsRef<Path>>(path: P) -> Result<Disk> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    log::debug!("Read {} bytes from {}", bytes.len(), path.display());
    decode_disk(&bytes)
}

/// Decode a whole IMD image
pub fn decode_disk(bytes: &[u8]) -> Result<Disk> {
    if bytes.is_empty() {
        return Err(ImdError::malformed_header("empty input"));
    }

    let sentinel = bytes
        .iter()
        .position(|&b| b == COMMENT_SENTINEL)
        .ok_or_else(|| ImdError::malformed_header("missing 0x1A comment terminator"))?;

    let region = &bytes[..sentinel];
    let (header, line_len) = parse_header(region)?;
    let comment = region[line_len..].to_vec();

    let mut reader = ByteReader::at(bytes, sentinel + 1);
    let mut tracks = Vec::new();
    while !reader.is_empty() {
        tracks.push(decode_track(&mut reader)?);
    }

    log::debug!(
        "Decoded IMD {} image: {} tracks, {} comment bytes",
        header.version,
        tracks.len(),
        comment.len()
    );

    Disk::new(header, comment, tracks)
}

/// Decode one track at the reader's position
pub fn decode_track(reader: &mut ByteReader<'_>) -> Result<Track> {
    let offset = reader.position();
    let header = TrackHeader::from_bytes(reader.read_array("track header")?, offset)?;
    let count = header.sector_count as usize;

    log::trace!(
        "Track @ {:#X}: {} C{} H{} {} sectors of {} bytes, cylinder map: {}, head map: {}",
        offset,
        header.mode,
        header.cylinder,
        header.head,
        count,
        header.sector_size,
        header.has_cylinder_map,
        header.has_head_map
    );

    let numbering_map = reader.take(count, "sector numbering map")?.to_vec();

    let cylinder_map = if header.has_cylinder_map {
        Some(reader.take(count, "sector cylinder map")?.to_vec())
    } else {
        None
    };

    let head_map = if header.has_head_map {
        Some(reader.take(count, "sector head map")?.to_vec())
    } else {
        None
    };

    let mut records = Vec::with_capacity(count);
    for _ in 0..count {
        records.push(decode_record(reader, header.sector_size.bytes())?);
    }

    Track::new(
        header.mode,
        header.cylinder,
        header.head,
        header.sector_size,
        numbering_map,
        cylinder_map,
        head_map,
        records,
    )
}

/// Decode one sector record at the reader's position
///
/// The payload length depends on the containing track's sector size.
pub fn decode_record(reader: &mut ByteReader<'_>, sector_size: usize) -> Result<SectorDataRecord> {
    let offset = reader.position();
    let value = reader.read_u8("sector record type")?;
    let record_type = SectorDataRecordType::from_code(value)
        .ok_or(ImdError::InvalidRecordType { offset, value })?;

    let data = reader
        .take(record_type.payload_len(sector_size), "sector record data")?
        .to_vec();

    Ok(SectorDataRecord::new(record_type, data))
}
