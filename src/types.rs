//! Record types shared by the walker, the store and the reports
//!
//! These types are designed to be cheap to batch and to map one-to-one onto
//! the columns of the `files` table.

use std::fs::Metadata;

/// Owner name stored when a uid has no password database entry
pub const UNKNOWN_OWNER: &str = "<unknown user>";

/// Size of the unit `st_blocks` is counted in
const STAT_BLOCK_SIZE: u64 = 512;

/// One regular file observed during a walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Canonical absolute parent directory
    pub dirname: String,

    /// Base name within `dirname`
    pub filename: String,

    /// Allocated bytes on disk
    pub filesize_bytes_on_disk: u64,

    /// Logical size in bytes
    pub filesize: u64,

    /// Resolved user name, or [`UNKNOWN_OWNER`]
    pub owner: String,

    /// Modification time (whole seconds since epoch)
    pub mtime: u32,

    /// Access time (whole seconds since epoch)
    pub atime: u32,
}

impl FileRecord {
    /// Build a record from no-follow stat results.
    ///
    /// `owner` is resolved by the caller so the lookup can be cached.
    pub fn from_metadata(dirname: String, filename: String, meta: &Metadata, owner: String) -> Self {
        let stat = RawStat::from_metadata(meta);
        Self {
            dirname,
            filename,
            filesize_bytes_on_disk: stat.blocks.saturating_mul(STAT_BLOCK_SIZE),
            filesize: stat.size,
            owner,
            mtime: clamp_timestamp(stat.mtime),
            atime: clamp_timestamp(stat.atime),
        }
    }

    /// Full path of the file
    pub fn path(&self) -> String {
        if self.dirname == "/" {
            format!("/{}", self.filename)
        } else {
            format!("{}/{}", self.dirname, self.filename)
        }
    }
}

/// The stat fields a record is built from
#[derive(Debug, Clone, Copy, Default)]
pub struct RawStat {
    pub size: u64,
    pub blocks: u64,
    pub uid: u32,
    pub mtime: i64,
    pub atime: i64,
}

impl RawStat {
    #[cfg(unix)]
    pub fn from_metadata(meta: &Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;
        Self {
            size: meta.len(),
            blocks: meta.blocks(),
            uid: meta.uid(),
            mtime: meta.mtime(),
            atime: meta.atime(),
        }
    }

    #[cfg(not(unix))]
    pub fn from_metadata(meta: &Metadata) -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        let secs = |t: std::io::Result<SystemTime>| {
            t.ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map_or(0, |d| d.as_secs() as i64)
        };
        Self {
            size: meta.len(),
            blocks: meta.len().div_ceil(STAT_BLOCK_SIZE),
            uid: 0,
            mtime: secs(meta.modified()),
            atime: secs(meta.accessed()),
        }
    }
}

/// Truncate a signed epoch timestamp into the stored `u32` range
pub fn clamp_timestamp(secs: i64) -> u32 {
    secs.clamp(0, u32::MAX as i64) as u32
}

/// Per-directory aggregate over indexed files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRollup {
    pub dirname: String,
    pub file_count: u64,
    pub sum_filesize: u64,
    pub sum_filesize_on_disk: u64,
    pub max_mtime: u32,
}

/// Metric used to rank folder rollups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FolderOrder {
    /// Total logical size
    #[default]
    Size,
    /// Number of files
    Count,
}
