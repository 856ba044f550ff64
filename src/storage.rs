// SPDX-License-Identifier: MPL-2.0

//! Storage for captured photos and videos
//!
//! [`MediaStore`] is the seam to wherever captured media durably lives.
//! [`DirectoryMediaStore`] implements it on a plain directory tree: the root
//! is the capture directory the gallery lists, and inserted records land in
//! relative subdirectories beneath it.

use crate::constants::{VIDEO_EXTENSIONS, mime_type_for};
use crate::errors::StorageError;
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Kind of a captured file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    /// Infer the kind from the file extension
    pub fn from_path(path: &Path) -> Self {
        let is_video = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()));
        if is_video {
            MediaKind::Video
        } else {
            MediaKind::Photo
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Photo => "Photo",
            MediaKind::Video => "Video",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A captured file, identified by its path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub path: PathBuf,
    pub kind: MediaKind,
    pub display_name: String,
    pub modified: Option<SystemTime>,
}

impl MediaItem {
    pub fn new(path: PathBuf, modified: Option<SystemTime>) -> Self {
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            kind: MediaKind::from_path(&path),
            display_name,
            modified,
            path,
        }
    }
}

/// Metadata for a new store record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMediaEntry {
    pub kind: MediaKind,
    pub display_name: String,
    pub mime_type: String,
    /// Location inside the store, e.g. "Movies/PocketCamera"
    pub relative_path: String,
}

impl NewMediaEntry {
    /// Entry for an existing file, keeping its name
    pub fn for_file(path: &Path, relative_path: &str) -> Self {
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            kind: MediaKind::from_path(path),
            mime_type: mime_type_for(path).to_string(),
            display_name,
            relative_path: relative_path.to_string(),
        }
    }
}

/// Write destination for captured bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSink {
    /// Plain file in the capture directory, registered with the store later
    File { path: PathBuf },
    /// Record allocated by the store
    Record { path: PathBuf, entry: NewMediaEntry },
}

impl MediaSink {
    pub fn path(&self) -> &Path {
        match self {
            MediaSink::File { path } | MediaSink::Record { path, .. } => path,
        }
    }

    /// True if the store already knows about this sink
    pub fn is_store_record(&self) -> bool {
        matches!(self, MediaSink::Record { .. })
    }
}

/// Durable home of captured media
pub trait MediaStore: Send + Sync {
    /// Directory direct captures are written to and the gallery lists
    fn capture_dir(&self) -> PathBuf;

    /// Allocate a new record and return the sink to write it through
    fn insert(&self, entry: &NewMediaEntry) -> Result<MediaSink, StorageError>;

    /// Open a write stream into a record
    fn open_write(&self, sink: &MediaSink) -> Result<Box<dyn Write + Send>, StorageError>;

    /// Current entries of `directory`, oldest first
    fn list(&self, directory: &Path) -> Result<Vec<MediaItem>, StorageError>;

    /// Delete one entry
    fn remove(&self, path: &Path) -> Result<(), StorageError>;
}

/// [`MediaStore`] on a directory tree
#[derive(Debug, Clone)]
pub struct DirectoryMediaStore {
    root: PathBuf,
}

impl DirectoryMediaStore {
    /// Use `root` as the store, creating it if necessary
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| StorageError::io(&root, e))?;
        info!(path = %root.display(), "Media directory ready");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_dir(&self, relative_path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(relative_path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(StorageError::InvalidPath(relative.to_path_buf()));
        }
        Ok(self.root.join(relative))
    }
}

impl MediaStore for DirectoryMediaStore {
    fn capture_dir(&self) -> PathBuf {
        self.root.clone()
    }

    fn insert(&self, entry: &NewMediaEntry) -> Result<MediaSink, StorageError> {
        let dir = self.record_dir(&entry.relative_path)?;
        fs::create_dir_all(&dir).map_err(|e| StorageError::io(&dir, e))?;

        let path =
            reserve_path(&dir, &entry.display_name).map_err(|e| StorageError::io(&dir, e))?;

        debug!(path = %path.display(), mime = %entry.mime_type, "Inserted media record");
        Ok(MediaSink::Record {
            path,
            entry: entry.clone(),
        })
    }

    fn open_write(&self, sink: &MediaSink) -> Result<Box<dyn Write + Send>, StorageError> {
        let path = sink.path();
        let file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| StorageError::io(path, e))?;
        Ok(Box::new(std::io::BufWriter::new(file)))
    }

    fn list(&self, directory: &Path) -> Result<Vec<MediaItem>, StorageError> {
        let entries = fs::read_dir(directory).map_err(|e| StorageError::io(directory, e))?;

        let mut items: Vec<MediaItem> = entries
            .flatten()
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
            .map(|entry| {
                let modified = entry.metadata().ok().and_then(|m| m.modified().ok());
                MediaItem::new(entry.path(), modified)
            })
            .collect();

        items.sort_by(|a, b| {
            a.modified
                .cmp(&b.modified)
                .then_with(|| a.display_name.cmp(&b.display_name))
        });
        Ok(items)
    }

    fn remove(&self, path: &Path) -> Result<(), StorageError> {
        fs::remove_file(path).map_err(|e| StorageError::io(path, e))?;
        info!(path = %path.display(), "Deleted media file");
        Ok(())
    }
}

/// Claim a fresh file in `dir` named `name`, or `stem_N.ext` for the first
/// free N
///
/// The empty file is created here, so two callers can never be handed the
/// same path even if neither has written to it yet.
pub fn reserve_path(dir: &Path, name: &str) -> std::io::Result<PathBuf> {
    let name_path = Path::new(name);
    let stem = name_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    let ext = name_path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let candidates = std::iter::once(dir.join(name))
        .chain((1..).map(|n| dir.join(format!("{}_{}{}", stem, n, ext))));
    for candidate in candidates {
        match fs::File::create_new(&candidate) {
            Ok(_) => return Ok(candidate),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }
    Err(std::io::Error::other("no free file name"))
}

/// Copy a finished direct-file recording into the store as a new record
///
/// Blocking; run it on a blocking worker. The source file stays where it is.
pub fn register_file(
    store: &dyn MediaStore,
    file: &Path,
    relative_path: &str,
) -> Result<PathBuf, StorageError> {
    if !file.is_file() {
        warn!(path = %file.display(), "Recorded file does not exist");
        return Err(StorageError::NotFound(file.to_path_buf()));
    }

    let entry = NewMediaEntry::for_file(file, relative_path);
    let sink = store.insert(&entry)?;

    let copy = || -> std::io::Result<()> {
        let mut source = fs::File::open(file)?;
        let mut target = store
            .open_write(&sink)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        std::io::copy(&mut source, &mut target)?;
        target.flush()
    };

    if let Err(e) = copy() {
        // Do not leave a truncated record behind
        if let Err(cleanup) = store.remove(sink.path()) {
            warn!(
                record = %sink.path().display(),
                error = %cleanup,
                "Failed to remove incomplete media record"
            );
        }
        return Err(StorageError::io(file, e));
    }

    info!(source = %file.display(), record = %sink.path().display(), "Media registered with store");
    Ok(sink.path().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(MediaKind::from_path(Path::new("a/Video_1.mp4")), MediaKind::Video);
        assert_eq!(MediaKind::from_path(Path::new("a/Video_1.MJPEG")), MediaKind::Video);
        assert_eq!(MediaKind::from_path(Path::new("a/JPEG_1.jpg")), MediaKind::Photo);
        assert_eq!(MediaKind::from_path(Path::new("a/noext")), MediaKind::Photo);
    }

    #[test]
    fn test_list_is_oldest_first_and_skips_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryMediaStore::open(dir.path()).unwrap();

        let old = dir.path().join("JPEG_1.jpg");
        let new = dir.path().join("Video_2.mp4");
        fs::write(&old, b"a").unwrap();
        fs::write(&new, b"b").unwrap();
        let earlier = SystemTime::now() - std::time::Duration::from_secs(60);
        fs::File::options()
            .write(true)
            .open(&old)
            .unwrap()
            .set_modified(earlier)
            .unwrap();
        fs::create_dir(dir.path().join("Movies")).unwrap();
        fs::write(dir.path().join(".nomedia"), b"").unwrap();

        let items = store.list(dir.path()).unwrap();
        let names: Vec<_> = items.iter().map(|i| i.display_name.as_str()).collect();
        assert_eq!(names, ["JPEG_1.jpg", "Video_2.mp4"]);
        assert_eq!(items[1].kind, MediaKind::Video);
    }

    #[test]
    fn test_insert_never_reuses_a_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryMediaStore::open(dir.path()).unwrap();
        let entry = NewMediaEntry::for_file(Path::new("Video_5.mp4"), "Movies/PocketCamera");

        let first = store.insert(&entry).unwrap();
        let second = store.insert(&entry).unwrap();

        assert_ne!(first.path(), second.path());
        assert!(first.path().starts_with(dir.path().join("Movies/PocketCamera")));
        assert!(second.path().ends_with("Video_5_1.mp4"));
    }

    #[test]
    fn test_reserve_path_claims_each_name_once() {
        let dir = tempfile::tempdir().unwrap();

        let first = reserve_path(dir.path(), "JPEG_100.jpg").unwrap();
        let second = reserve_path(dir.path(), "JPEG_100.jpg").unwrap();
        let third = reserve_path(dir.path(), "JPEG_100.jpg").unwrap();

        assert_eq!(first, dir.path().join("JPEG_100.jpg"));
        assert_eq!(second, dir.path().join("JPEG_100_1.jpg"));
        assert_eq!(third, dir.path().join("JPEG_100_2.jpg"));
        assert!(first.is_file() && second.is_file() && third.is_file());
    }

    #[test]
    fn test_reserve_path_in_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = reserve_path(&dir.path().join("gone"), "x.jpg").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_insert_rejects_escaping_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryMediaStore::open(dir.path()).unwrap();
        let entry = NewMediaEntry::for_file(Path::new("x.mp4"), "../outside");
        assert!(matches!(
            store.insert(&entry),
            Err(StorageError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_register_file_copies_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryMediaStore::open(dir.path()).unwrap();
        let recorded = dir.path().join("Video_9.mjpeg");
        fs::write(&recorded, b"frames").unwrap();

        let registered = register_file(&store, &recorded, "Movies").unwrap();

        assert_eq!(fs::read(&registered).unwrap(), b"frames");
        assert!(recorded.exists());
    }

    /// Store that allocates records but can neither write nor remove them
    struct BrokenRecordStore(DirectoryMediaStore);

    impl MediaStore for BrokenRecordStore {
        fn capture_dir(&self) -> PathBuf {
            self.0.capture_dir()
        }

        fn insert(&self, entry: &NewMediaEntry) -> Result<MediaSink, StorageError> {
            self.0.insert(entry)
        }

        fn open_write(&self, sink: &MediaSink) -> Result<Box<dyn Write + Send>, StorageError> {
            Err(StorageError::Io {
                path: sink.path().to_path_buf(),
                message: "read-only".to_string(),
            })
        }

        fn list(&self, directory: &Path) -> Result<Vec<MediaItem>, StorageError> {
            self.0.list(directory)
        }

        fn remove(&self, path: &Path) -> Result<(), StorageError> {
            Err(StorageError::Io {
                path: path.to_path_buf(),
                message: "read-only".to_string(),
            })
        }
    }

    #[test]
    fn test_register_reports_copy_error_when_cleanup_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = BrokenRecordStore(DirectoryMediaStore::open(dir.path()).unwrap());
        let recorded = dir.path().join("Video_3.mjpeg");
        fs::write(&recorded, b"frames").unwrap();

        let err = register_file(&store, &recorded, "Movies").unwrap_err();

        assert!(matches!(err, StorageError::Io { ref path, .. } if path == &recorded));
        assert!(recorded.exists());
    }

    #[test]
    fn test_register_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryMediaStore::open(dir.path()).unwrap();
        let err = register_file(&store, &dir.path().join("gone.mp4"), "Movies").unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }
}
