//! Streaming local filesystem walker
//!
//! Walks a canonical root depth-first and yields `FileRecord` batches of at
//! most `chunk_size` records. The walk is pulled one batch at a time, so
//! memory stays bounded by the chunk size however large the subtree is.
//!
//! ```text
//! WalkDir (no-follow, depth-first)
//! │
//! ├── directory ──────────────► descend, not recorded
//! ├── symlink / fifo / device ► skipped
//! ├── excluded path ──────────► skipped (the store's own files)
//! ├── unreadable entry ───────► skipped, counted
//! └── regular file ───────────► FileRecord ─► batch ─► yield when full
//! ```

use crate::path::CanonicalPath;
use crate::types::{FileRecord, RawStat};
use crate::walker::owner::OwnerCache;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Counters accumulated during a walk
#[derive(Debug, Clone, Default)]
pub struct WalkStats {
    /// Regular files recorded
    pub files: u64,
    /// Sum of logical sizes of recorded files
    pub bytes: u64,
    /// Directories entered
    pub dirs: u64,
    /// Entries skipped because they could not be read or stat'ed
    pub skipped: u64,
    /// Batches yielded
    pub batches: u64,
}

/// Lazy sequence of `FileRecord` batches under a root
pub struct Walker {
    entries: walkdir::IntoIter,
    chunk_size: usize,
    owners: OwnerCache,
    excluded: Vec<PathBuf>,
    stats: WalkStats,
    exhausted: bool,
}

impl Walker {
    pub fn new(root: &CanonicalPath, chunk_size: NonZeroUsize) -> Self {
        let entries = WalkDir::new(root.as_path())
            .follow_links(false)
            .into_iter();

        Self {
            entries,
            chunk_size: chunk_size.get(),
            owners: OwnerCache::default(),
            excluded: Vec::new(),
            stats: WalkStats::default(),
            exhausted: false,
        }
    }

    /// Never record these exact paths. They must share the root's canonical
    /// form to match.
    pub fn excluding<I>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.excluded.extend(paths);
        self
    }

    /// Counters so far
    pub fn stats(&self) -> &WalkStats {
        &self.stats
    }

    /// Turn one directory entry into a record, or `None` if it is not a
    /// regular file or cannot be stat'ed.
    fn record_for(&mut self, entry: &DirEntry) -> Option<FileRecord> {
        let file_type = entry.file_type();
        if file_type.is_dir() {
            self.stats.dirs += 1;
            return None;
        }
        if !file_type.is_file() {
            return None;
        }
        if self.excluded.iter().any(|p| p.as_path() == entry.path()) {
            debug!("Excluding {}", entry.path().display());
            return None;
        }

        // For non-followed entries this is an lstat, never a stat through a link
        let meta = match entry.metadata() {
            Ok(meta) => meta,
            Err(e) => {
                self.stats.skipped += 1;
                debug!("Skipping {}: {}", entry.path().display(), e);
                return None;
            }
        };
        if !meta.file_type().is_file() {
            return None;
        }

        let path = entry.path();
        let dirname = match path.parent() {
            Some(parent) => parent.to_string_lossy().into_owned(),
            None => return None,
        };
        let filename = entry.file_name().to_string_lossy().into_owned();

        let owner = self.owners.resolve(RawStat::from_metadata(&meta).uid);
        let record = FileRecord::from_metadata(dirname, filename, &meta, owner);

        self.stats.files += 1;
        self.stats.bytes += record.filesize;
        Some(record)
    }
}

impl Iterator for Walker {
    type Item = Vec<FileRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let mut batch = Vec::with_capacity(self.chunk_size);

        while batch.len() < self.chunk_size {
            let entry = match self.entries.next() {
                Some(Ok(entry)) => entry,
                Some(Err(e)) => {
                    self.stats.skipped += 1;
                    match e.io_error().map(|io| io.kind()) {
                        Some(std::io::ErrorKind::PermissionDenied) | Some(std::io::ErrorKind::NotFound) => {
                            debug!("Skipping entry: {}", e);
                        }
                        _ => warn!("Skipping entry: {}", e),
                    }
                    continue;
                }
                None => {
                    self.exhausted = true;
                    break;
                }
            };

            if let Some(record) = self.record_for(&entry) {
                batch.push(record);
            }
        }

        if batch.is_empty() {
            return None;
        }

        self.stats.batches += 1;
        debug!(batch = self.stats.batches, records = batch.len(), "Batch ready");
        Some(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::canonicalize;
    use std::fs;
    use tempfile::tempdir;

    fn chunk(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_batch_sizes() {
        let dir = tempdir().unwrap();
        for i in 0..7 {
            fs::write(dir.path().join(format!("f{}", i)), b"x").unwrap();
        }
        let root = canonicalize(dir.path()).unwrap();

        let sizes: Vec<usize> = Walker::new(&root, chunk(3)).map(|b| b.len()).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
    }

    #[test]
    fn test_exact_multiple_has_no_empty_batch() {
        let dir = tempdir().unwrap();
        for i in 0..4 {
            fs::write(dir.path().join(format!("f{}", i)), b"x").unwrap();
        }
        let root = canonicalize(dir.path()).unwrap();

        let sizes: Vec<usize> = Walker::new(&root, chunk(2)).map(|b| b.len()).collect();
        assert_eq!(sizes, vec![2, 2]);
    }

    #[test]
    fn test_empty_tree_yields_nothing() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();
        let root = canonicalize(dir.path()).unwrap();

        let mut walker = Walker::new(&root, chunk(10));
        assert!(walker.next().is_none());
        assert!(walker.next().is_none());
        assert_eq!(walker.stats().dirs, 2);
    }

    #[test]
    fn test_record_fields() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("c.txt"), vec![b'c'; 9000]).unwrap();
        let root = canonicalize(dir.path()).unwrap();

        let records: Vec<FileRecord> = Walker::new(&root, chunk(10)).flatten().collect();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.dirname, format!("{}/sub", root));
        assert_eq!(record.filename, "c.txt");
        assert_eq!(record.filesize, 9000);
        assert!(!record.owner.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_not_followed() {
        let dir = tempdir().unwrap();
        let real = dir.path().join("real");
        fs::create_dir(&real).unwrap();
        fs::write(real.join("data.bin"), b"12345").unwrap();
        std::os::unix::fs::symlink(&real, dir.path().join("link_dir")).unwrap();
        std::os::unix::fs::symlink(real.join("data.bin"), dir.path().join("link_file")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("nowhere"), dir.path().join("broken")).unwrap();
        let root = canonicalize(dir.path()).unwrap();

        let records: Vec<FileRecord> = Walker::new(&root, chunk(10)).flatten().collect();
        let names: Vec<&str> = records.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, vec!["data.bin"]);
    }

    #[test]
    fn test_excluded_paths_are_not_recorded() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("keep"), b"k").unwrap();
        fs::write(dir.path().join("index.db"), b"d").unwrap();
        fs::write(dir.path().join("index.db-wal"), b"w").unwrap();
        let root = canonicalize(dir.path()).unwrap();

        let excluded = vec![
            root.as_path().join("index.db"),
            root.as_path().join("index.db-wal"),
            root.as_path().join("index.db-shm"),
        ];
        let records: Vec<FileRecord> = Walker::new(&root, chunk(10)).excluding(excluded).flatten().collect();
        let names: Vec<&str> = records.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, vec!["keep"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_unstatable_entries_are_skipped_and_counted() {
        use std::os::unix::fs::PermissionsExt;

        if unsafe { libc::geteuid() } == 0 {
            eprintln!("skipping test_unstatable_entries_are_skipped_and_counted: running as root");
            return;
        }

        let dir = tempdir().unwrap();
        fs::write(dir.path().join("visible"), b"1").unwrap();
        let listed = dir.path().join("listed");
        fs::create_dir(&listed).unwrap();
        fs::write(listed.join("a"), b"2").unwrap();
        fs::write(listed.join("b"), b"3").unwrap();
        // Readable but not searchable: names can be listed, lstat fails
        fs::set_permissions(&listed, fs::Permissions::from_mode(0o400)).unwrap();
        let root = canonicalize(dir.path()).unwrap();

        let mut walker = Walker::new(&root, chunk(10));
        let records: Vec<FileRecord> = walker.by_ref().flatten().collect();
        let skipped = walker.stats().skipped;
        fs::set_permissions(&listed, fs::Permissions::from_mode(0o755)).unwrap();

        let names: Vec<&str> = records.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, vec!["visible"]);
        assert_eq!(skipped, 2);
    }

    #[test]
    fn test_stats_track_files_and_bytes() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a"), vec![0u8; 100]).unwrap();
        fs::write(dir.path().join("b"), vec![0u8; 50]).unwrap();
        let root = canonicalize(dir.path()).unwrap();

        let mut walker = Walker::new(&root, chunk(1));
        let batches = walker.by_ref().count();
        let stats = walker.stats();
        assert_eq!(batches, 2);
        assert_eq!(stats.files, 2);
        assert_eq!(stats.bytes, 150);
        assert_eq!(stats.batches, 2);
        assert_eq!(stats.skipped, 0);
    }
}
