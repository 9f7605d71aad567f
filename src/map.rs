//! Sector map visualization

use crate::image::{Disk, SectorDataRecordType};
use std::fmt::Write;

/// ANSI color codes for sector map
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BRIGHT_WHITE: &str = "\x1b[97m";
    pub const DARK_WHITE: &str = "\x1b[37m";
    pub const BRIGHT_RED: &str = "\x1b[91m";
    pub const DARK_RED: &str = "\x1b[2;31m";
    pub const BRIGHT_YELLOW: &str = "\x1b[93m";
    pub const DARK_YELLOW: &str = "\x1b[2;33m";
    pub const DARK_GREY: &str = "\x1b[90m";
}

const BLOCK_HAS_DATA: &str = "\u{2593}"; // ▓ - full sector stored
const BLOCK_COMPRESSED: &str = "\u{2591}"; // ░ - single repeated byte
const BLOCK_UNAVAILABLE: &str = "\u{00B7}"; // · - no data

/// Glyph and color for one sector record
fn cell(record_type: SectorDataRecordType) -> (&'static str, &'static str) {
    match record_type {
        SectorDataRecordType::Unavailable => (BLOCK_UNAVAILABLE, colors::DARK_GREY),
        SectorDataRecordType::Data {
            compressed,
            deleted,
            error,
        } => {
            let block = if compressed {
                BLOCK_COMPRESSED
            } else {
                BLOCK_HAS_DATA
            };
            let color = match (error, deleted, compressed) {
                (true, _, false) => colors::BRIGHT_RED,
                (true, _, true) => colors::DARK_RED,
                (false, true, false) => colors::BRIGHT_YELLOW,
                (false, true, true) => colors::DARK_YELLOW,
                (false, false, false) => colors::BRIGHT_WHITE,
                (false, false, true) => colors::DARK_WHITE,
            };
            (block, color)
        }
    }
}

/// Render a sector map for the tracks on one head
///
/// Columns are tracks in file order, rows are physical sector positions
/// with position 0 at the bottom.
pub fn render_sector_map(disk: &Disk, head: u8) -> String {
    let mut out = String::new();
    let tracks: Vec<_> = disk.tracks_on_head(head).collect();

    let max_sectors = tracks.iter().map(|t| t.sector_count()).max().unwrap_or(0);
    if max_sectors == 0 {
        let _ = writeln!(out, "No sectors found on head {}.", head);
        return out;
    }

    let _ = writeln!(out, "=== Sector Map (Head {}) ===", head);
    let _ = writeln!(
        out,
        "Legend: {}{}Data{} {}{}Compressed{} {}Error{} {}Deleted{} {}{}Unavailable{}",
        colors::BRIGHT_WHITE,
        BLOCK_HAS_DATA,
        colors::RESET,
        colors::DARK_WHITE,
        BLOCK_COMPRESSED,
        colors::RESET,
        colors::BRIGHT_RED,
        colors::RESET,
        colors::BRIGHT_YELLOW,
        colors::RESET,
        colors::DARK_GREY,
        BLOCK_UNAVAILABLE,
        colors::RESET
    );
    out.push('\n');

    for position in (0..max_sectors).rev() {
        let _ = write!(out, "{:>2} ", position);
        for track in &tracks {
            match track.sector_data_records().get(position) {
                Some(record) => {
                    let (block, color) = cell(record.record_type());
                    let _ = write!(out, "{}{}{}", color, block, colors::RESET);
                }
                None => out.push(' '),
            }
        }
        out.push('\n');
    }

    // Cylinder axis, labelled every fifth column
    out.push_str("   ");
    let mut column = 0;
    while column < tracks.len() {
        if column % 5 == 0 {
            let label = tracks[column].cylinder().to_string();
            let width = label.len().min(tracks.len() - column);
            out.push_str(&label[..width]);
            column += width;
        } else {
            out.push(' ');
            column += 1;
        }
    }
    out.push('\n');

    out
}
