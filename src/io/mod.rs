//! I/O operations for reading and writing IMD images

/// Decoder for IMD images
pub mod reader;
/// Encoder for IMD images
pub mod writer;

pub use reader::{decode_disk, read_imd, ByteReader};
pub use writer::{encode_disk, write_imd};
