//! IMD encoder

use crate::error::Result;
use crate::format::constants::COMMENT_SENTINEL;
use crate::image::{Disk, SectorDataRecord, Track};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Write an IMD file to disk
pub fn write_imd<P: AsRef<Path>>(disk: &Disk, path: P) -> Result<()> {
    let bytes = encode_disk(disk);
    let mut file = File::create(path.as_ref())?;
    file.write_all(&bytes)?;
    log::debug!("Wrote {} bytes to {}", bytes.len(), path.as_ref().display());
    Ok(())
}

/// Encode a whole image
pub fn encode_disk(disk: &Disk) -> Vec<u8> {
    let mut out = Vec::with_capacity(disk.size());

    out.extend_from_slice(disk.header().render().as_bytes());
    out.extend_from_slice(disk.comment());
    out.push(COMMENT_SENTINEL);

    for track in disk.tracks() {
        encode_track(track, &mut out);
    }

    out
}

/// Append the encoding of one track
pub fn encode_track(track: &Track, out: &mut Vec<u8>) {
    out.extend_from_slice(&track.header().to_bytes());
    out.extend_from_slice(track.sector_numbering_map());

    if let Some(map) = track.sector_cylinder_map() {
        out.extend_from_slice(map);
    }
    if let Some(map) = track.sector_head_map() {
        out.extend_from_slice(map);
    }

    for record in track.sector_data_records() {
        encode_record(record, out);
    }
}

/// Append the encoding of one sector record
///
/// The payload is written verbatim; its length is not checked against
/// the record type.
pub fn encode_record(record: &SectorDataRecord, out: &mut Vec<u8>) {
    out.push(record.record_type().code());
    out.extend_from_slice(record.data());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{SectorDataRecordType, SectorSize, TrackMode};

    #[test]
    fn test_encode_record() {
        let mut out = Vec::new();
        encode_record(&SectorDataRecord::compressed(0xE5), &mut out);
        encode_record(&SectorDataRecord::unavailable(), &mut out);
        encode_record(
            &SectorDataRecord::new(SectorDataRecordType::data(false, true, true), vec![1, 2]),
            &mut out,
        );
        assert_eq!(out, vec![0x02, 0xE5, 0x00, 0x07, 1, 2]);
    }

    #[test]
    fn test_encode_empty_track() {
        let track = Track::new(
            TrackMode::Mfm500Kbps,
            39,
            1,
            SectorSize::from_bytes(1024).unwrap(),
            vec![],
            None,
            None,
            vec![],
        )
        .unwrap();
        let mut out = Vec::new();
        encode_track(&track, &mut out);
        assert_eq!(out, vec![3, 39, 1, 0, 3]);
    }

    #[test]
    fn test_encode_track_map_order() {
        let track = Track::new(
            TrackMode::Fm500Kbps,
            1,
            1,
            SectorSize::from_bytes(128).unwrap(),
            vec![7],
            Some(vec![0xCC]),
            Some(vec![0xDD]),
            vec![SectorDataRecord::unavailable()],
        )
        .unwrap();
        assert_eq!(track.to_bytes(), vec![0, 1, 0xC1, 1, 0, 7, 0xCC, 0xDD, 0]);
    }
}
