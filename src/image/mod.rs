//! IMD image data structures

/// Builders for creating images
pub mod builder;
/// Disk container
pub mod disk;
/// Sector data records and record types
pub mod sector;
/// Track definition, mode and sector size
pub mod track;

pub use builder::{DiskBuilder, TrackBuilder};
pub use disk::Disk;
pub use sector::{SectorDataRecord, SectorDataRecordType};
pub use track::{DataRate, RecordingMode, SectorSize, Track, TrackHeader, TrackMode};
