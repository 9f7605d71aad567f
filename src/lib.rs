/*!
# imdmanager

A Rust library for reading and writing ImageDisk (IMD) floppy disk images.

## Features

- Decode and encode IMD images byte for byte, including the text header,
  free-form comment and every track's optional sector maps
- Typed track modes, sector sizes and the nine sector record types
- Precise error reporting with byte offsets for truncated or malformed input
- Builders for creating images from scratch
- Batch summaries of many images with per-image failure isolation

## Quick Start

```rust,no_run
use imdmanager::{Disk, DiskBuilder, SectorDataRecord, TrackBuilder, TrackMode};

// Open an existing IMD file
let disk = Disk::open("disk.imd")?;
println!("IMD {} with {} tracks", disk.version(), disk.track_count());

// Read a sector by its logical number
if let Some(track) = disk.get_track(0, 0) {
    let data = track.read_sector(1);
    println!("{:?}", data.map(|d| d.len()));
}

// Create a new image
let track = TrackBuilder::new(TrackMode::Mfm250Kbps, 0, 0)
    .sector_size(512)
    .sector(1, SectorDataRecord::compressed(0xE5))
    .build()?;
let new_disk = DiskBuilder::new().comment("Blank disk\r\n").track(track).build()?;
new_disk.save("blank.imd")?;
# Ok::<(), imdmanager::ImdError>(())
```

## IMD File Layout

An image starts with an ASCII header line such as
`IMD 1.18: 05/03/2024  9:15:32\r\n`, followed by a comment terminated by
`0x1A`, followed by tracks until the end of the file. Each track has a
five byte header, a sector numbering map, optional cylinder and head maps,
and one data record per sector.

## Modules

- `format`: Format constants and header line handling
- `image`: Core image data structures (Disk, Track, SectorDataRecord)
- `io`: Decoder and encoder
- `summary`: Per-image statistics and batch reports
- `map`: Sector map visualization
- `error`: Error types and Result alias
*/

#![warn(missing_docs)]

/// Error types and Result alias
pub mod error;
/// IMD format constants and header line handling
pub mod format;
/// Core image data structures (Disk, Track, SectorDataRecord)
pub mod image;
/// I/O operations for reading and writing IMD files
pub mod io;
/// Sector map visualization
pub mod map;
/// Per-image statistics for batch reports
pub mod summary;

// Re-export common types
pub use error::{ImdError, Result};
pub use format::{ImdDate, ImdHeader, ImdTime, ImdVersion};
pub use image::{
    DataRate, Disk, DiskBuilder, RecordingMode, SectorDataRecord, SectorDataRecordType,
    SectorSize, Track, TrackBuilder, TrackHeader, TrackMode,
};
pub use summary::{DiskSummary, ParseOutcome};
