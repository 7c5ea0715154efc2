//! Local-disk storage for uploaded person images.
//!
//! Files are written under a single directory and published at
//! `/uploads/<filename>`. Names are `<unix-millis>-<random>[.ext]`; the file
//! is opened with create-new semantics and a fresh name is drawn when one is
//! already taken, so two uploads never share a file.

use anyhow::{Context, Result};
use rand::Rng;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Public mount point of the upload directory
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// How many names to try before giving up
const MAX_NAME_ATTEMPTS: usize = 8;

/// Upper bound (exclusive) of the random filename suffix
const RANDOM_SUFFIX_RANGE: u32 = 1_000_000_000;

/// Longest extension kept from the client filename
const MAX_EXTENSION_LEN: usize = 16;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("could not allocate a unique upload filename after {0} attempts")]
    NameExhausted(usize),

    #[error("failed to write upload: {0}")]
    Io(#[from] std::io::Error),
}

/// A file that has been written to the upload directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub filename: String,
    pub path: PathBuf,
    pub size: usize,
}

impl StoredFile {
    /// Path clients use to fetch the file
    pub fn public_url(&self) -> String {
        format!("{}/{}", UPLOADS_URL_PREFIX, self.filename)
    }
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the upload directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(dir);
        std::fs::create_dir_all(&store.dir).with_context(|| {
            format!("Failed to create upload directory: {}", store.dir.display())
        })?;
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `data` under a newly allocated name
    pub async fn save(&self, original_name: Option<&str>, data: &[u8]) -> Result<StoredFile, UploadError> {
        let extension = original_name.map(extension_of).unwrap_or_default();

        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let filename = generate_filename(&extension);
            let path = self.dir.join(&filename);

            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    warn!(filename = %filename, attempt, "Upload filename taken, retrying");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            file.write_all(data).await?;
            file.flush().await?;

            debug!(filename = %filename, size = data.len(), "Stored upload");
            return Ok(StoredFile {
                filename,
                path,
                size: data.len(),
            });
        }

        Err(UploadError::NameExhausted(MAX_NAME_ATTEMPTS))
    }
}

/// Lower-cased extension of a client filename, with its leading dot
fn extension_of(original_name: &str) -> String {
    // Browsers may send a full path; only the last component counts
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);

    Path::new(base)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| {
            !e.is_empty()
                && e.len() <= MAX_EXTENSION_LEN
                && e.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

fn generate_filename(extension: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: u32 = rand::rng().random_range(0..RANDOM_SUFFIX_RANGE);
    format!("{}-{}{}", millis, suffix, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("photo.JPG"), ".jpg");
        assert_eq!(extension_of("archive.tar.gz"), ".gz");
        assert_eq!(extension_of("C:\\Users\\me\\face.png"), ".png");
        assert_eq!(extension_of("../../etc/passwd"), "");
        assert_eq!(extension_of("noext"), "");
        assert_eq!(extension_of(".hidden"), "");
        assert_eq!(extension_of("weird.p/ng"), "");
        assert_eq!(extension_of("x.ph p"), "");
    }

    #[test]
    fn test_generated_filename_shape() {
        let name = generate_filename(".png");
        let (stem, ext) = name.split_once('.').unwrap();
        let (millis, suffix) = stem.split_once('-').unwrap();

        assert_eq!(ext, "png");
        assert!(millis.parse::<i64>().unwrap() > 0);
        assert!(suffix.parse::<u32>().unwrap() < RANDOM_SUFFIX_RANGE);
    }

    #[tokio::test]
    async fn test_save_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::open(dir.path()).unwrap();

        let stored = store.save(Some("face.PNG"), b"\x89PNG data").await.unwrap();

        assert!(stored.filename.ends_with(".png"));
        assert_eq!(stored.size, 9);
        assert_eq!(std::fs::read(&stored.path).unwrap(), b"\x89PNG data");
        assert_eq!(stored.public_url(), format!("/uploads/{}", stored.filename));
    }

    #[tokio::test]
    async fn test_save_never_reuses_a_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::open(dir.path()).unwrap();

        let mut names = std::collections::HashSet::new();
        for _ in 0..50 {
            let stored = store.save(None, b"x").await.unwrap();
            assert!(names.insert(stored.filename));
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 50);
    }

    #[tokio::test]
    async fn test_open_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("uploads");

        let store = UploadStore::open(&nested).unwrap();

        assert!(nested.is_dir());
        assert_eq!(store.dir(), nested.as_path());
    }

    #[tokio::test]
    async fn test_missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path().join("missing"));

        let err = store.save(Some("a.jpg"), b"x").await.unwrap_err();
        assert!(matches!(err, UploadError::Io(_)));
    }
}
