//! Per-image statistics for batch reports
//!
//! A report over many captured images needs only three numbers from each
//! one: how many tracks it has, which track modes occur, and how many
//! sectors were read with errors. Images that fail to decode are reported
//! with a reason instead of aborting the batch.

use crate::error::ImdError;
use crate::image::{Disk, TrackMode};
use std::fmt;
use std::path::{Path, PathBuf};

/// Statistics derived from a decoded image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskSummary {
    /// Number of tracks
    pub track_count: usize,
    /// Distinct track modes, in the order they first appear
    pub modes: Vec<TrackMode>,
    /// Number of sector records flagged with a data error
    pub error_count: usize,
}

impl DiskSummary {
    /// Compute the summary of a decoded image
    pub fn from_disk(disk: &Disk) -> Self {
        Self {
            track_count: disk.track_count(),
            modes: disk.modes(),
            error_count: disk.error_count(),
        }
    }

    /// Mode names, e.g. `["FM_500KBPS", "MFM_500KBPS"]`
    pub fn mode_names(&self) -> Vec<&'static str> {
        self.modes.iter().map(|m| m.name()).collect()
    }
}

impl fmt::Display for DiskSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tracks, modes [{}], {} errors",
            self.track_count,
            self.mode_names().join(", "),
            self.error_count
        )
    }
}

/// Result of decoding one image for a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Image decoded
    Parsed {
        /// The decoded image
        disk: Disk,
        /// Its statistics
        summary: DiskSummary,
    },
    /// Image could not be read or decoded
    Failed {
        /// Human-readable reason
        reason: String,
    },
}

impl ParseOutcome {
    /// Decode an in-memory image
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::from_result(Disk::from_bytes(bytes))
    }

    /// Read and decode an image file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Self {
        Self::from_result(Disk::open(path))
    }

    fn from_result(result: Result<Disk, ImdError>) -> Self {
        match result {
            Ok(disk) => {
                let summary = DiskSummary::from_disk(&disk);
                ParseOutcome::Parsed { disk, summary }
            }
            Err(err) => ParseOutcome::Failed {
                reason: err.to_string(),
            },
        }
    }

    /// Did the image decode?
    pub fn is_parsed(&self) -> bool {
        matches!(self, ParseOutcome::Parsed { .. })
    }

    /// Get the statistics of a decoded image
    pub fn summary(&self) -> Option<&DiskSummary> {
        match self {
            ParseOutcome::Parsed { summary, .. } => Some(summary),
            ParseOutcome::Failed { .. } => None,
        }
    }

    /// Get the decoded image
    pub fn disk(&self) -> Option<&Disk> {
        match self {
            ParseOutcome::Parsed { disk, .. } => Some(disk),
            ParseOutcome::Failed { .. } => None,
        }
    }

    /// One line for a report
    pub fn report_line(&self) -> String {
        match self {
            ParseOutcome::Parsed { summary, .. } => summary.to_string(),
            ParseOutcome::Failed { reason } => format!("parsing failed: {}", reason),
        }
    }
}

/// Decode many image files in parallel
///
/// Results are returned in the same order as `paths`. A failure in one
/// image never affects the others.
pub fn summarize_files<P: AsRef<Path> + Sync>(paths: &[P]) -> Vec<(PathBuf, ParseOutcome)> {
    let workers = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .max(1);
    let chunk_size = paths.len().div_ceil(workers).max(1);

    let outcomes: Vec<ParseOutcome> = std::thread::scope(|scope| {
        let handles: Vec<_> = paths
            .chunks(chunk_size)
            .map(|chunk| {
                let handle = scope.spawn(move || {
                    chunk
                        .iter()
                        .map(ParseOutcome::from_file)
                        .collect::<Vec<_>>()
                });
                (chunk.len(), handle)
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|(len, handle)| {
                handle.join().unwrap_or_else(|_| {
                    vec![
                        ParseOutcome::Failed {
                            reason: "decoder thread panicked".to_string(),
                        };
                        len
                    ]
                })
            })
            .collect()
    });

    paths
        .iter()
        .map(|p| p.as_ref().to_path_buf())
        .zip(outcomes)
        .map(|(path, outcome)| {
            if let ParseOutcome::Failed { reason } = &outcome {
                log::warn!("{}: parsing failed: {}", path.display(), reason);
            }
            (path, outcome)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{DiskBuilder, SectorDataRecord, SectorDataRecordType, TrackBuilder};

    fn sample_disk() -> Disk {
        DiskBuilder::new()
            .track(
                TrackBuilder::new(TrackMode::Fm500Kbps, 0, 0)
                    .sector_size(128)
                    .sector(1, SectorDataRecord::compressed(0xE5))
                    .build()
                    .unwrap(),
            )
            .track(
                TrackBuilder::new(TrackMode::Mfm500Kbps, 1, 0)
                    .sector_size(256)
                    .sector(
                        1,
                        SectorDataRecord::new(SectorDataRecordType::data(true, false, true), vec![0]),
                    )
                    .sector(
                        2,
                        SectorDataRecord::new(
                            SectorDataRecordType::data(false, true, true),
                            vec![0; 256],
                        ),
                    )
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_summary() {
        let summary = DiskSummary::from_disk(&sample_disk());
        assert_eq!(summary.track_count, 2);
        assert_eq!(summary.mode_names(), vec!["FM_500KBPS", "MFM_500KBPS"]);
        assert_eq!(summary.error_count, 2);
        assert_eq!(
            summary.to_string(),
            "2 tracks, modes [FM_500KBPS, MFM_500KBPS], 2 errors"
        );
    }

    #[test]
    fn test_outcome_parsed() {
        let bytes = sample_disk().to_bytes();
        let outcome = ParseOutcome::from_bytes(&bytes);
        assert!(outcome.is_parsed());
        assert_eq!(outcome.summary().unwrap().track_count, 2);
        assert_eq!(outcome.disk().unwrap().to_bytes(), bytes);
    }

    #[test]
    fn test_outcome_failed() {
        let outcome = ParseOutcome::from_bytes(b"");
        assert!(!outcome.is_parsed());
        assert!(outcome.summary().is_none());
        assert_eq!(
            outcome.report_line(),
            "parsing failed: Malformed header: empty input"
        );
    }

    #[test]
    fn test_outcome_missing_file() {
        let outcome = ParseOutcome::from_file("/nonexistent/path/to/image.imd");
        assert!(outcome.report_line().starts_with("parsing failed: I/O error"));
    }
}
