use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::error::{StoreError, StoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Image container detected from magic bytes.
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageFormat {
    /// Sniffs the format from the leading bytes, defaulting to JPEG.
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
            ImageFormat::Png
        } else if bytes.starts_with(b"GIF8") {
            ImageFormat::Gif
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            ImageFormat::Webp
        } else {
            ImageFormat::Jpeg
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of [`ImageStore::put`].
pub struct StoredImage {
    /// Reference usable as the report's `image_url`.
    pub url: String,
    /// `false` when identical content was already stored.
    pub created: bool,
}

/// Keeps the image of an accepted report. Staged images of duplicates never reach it.
pub trait ImageStore: Send + Sync {
    /// Stores `bytes`.
    fn put(&self, bytes: &[u8]) -> StoreResult<StoredImage>;

    /// Removes an image this store returned from `put`. Unknown references are ignored.
    fn discard(&self, url: &str) -> StoreResult<()>;
}

#[derive(Debug, Clone)]
/// Content-addressed image files: `{root}/{blake3}.{ext}`.
pub struct FileImageStore {
    root: PathBuf,
}

impl FileImageStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_root(&self) -> StoreResult<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(|_| StoreError::StorageUnavailable {
                path: self.root.clone(),
            })?;
        }
        Ok(())
    }
}

impl ImageStore for FileImageStore {
    fn put(&self, bytes: &[u8]) -> StoreResult<StoredImage> {
        self.ensure_root()?;

        let hash = blake3::hash(bytes);
        let file_name = format!("{}.{}", hash.to_hex(), ImageFormat::detect(bytes).extension());
        let final_path = self.root.join(&file_name);

        // Same content, same name: an existing file is already correct.
        let created = !final_path.exists();
        if created {
            let temp_path = self.root.join(format!("{}.tmp", file_name));
            {
                let mut file = File::create(&temp_path)?;
                file.write_all(bytes)?;
                file.sync_all()?;
            }
            fs::rename(&temp_path, &final_path)?;
        }

        Ok(StoredImage {
            url: final_path.to_string_lossy().into_owned(),
            created,
        })
    }

    fn discard(&self, url: &str) -> StoreResult<()> {
        let path = Path::new(url);
        if path.parent() != Some(self.root.as_path()) {
            return Ok(());
        }
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(any(test, feature = "mock"))]
#[derive(Default, Clone)]
/// Records stored images in memory.
pub struct MockImageStore {
    images: std::sync::Arc<parking_lot::Mutex<MockImages>>,
}

#[cfg(any(test, feature = "mock"))]
#[derive(Default)]
struct MockImages {
    puts: usize,
    stored: Vec<(String, Vec<u8>)>,
}

#[cfg(any(test, feature = "mock"))]
impl MockImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Images currently held.
    pub fn stored_count(&self) -> usize {
        self.images.lock().stored.len()
    }
}

#[cfg(any(test, feature = "mock"))]
impl ImageStore for MockImageStore {
    fn put(&self, bytes: &[u8]) -> StoreResult<StoredImage> {
        let mut images = self.images.lock();
        images.puts += 1;
        let url = format!("mock://images/{}", images.puts);
        images.stored.push((url.clone(), bytes.to_vec()));
        Ok(StoredImage { url, created: true })
    }

    fn discard(&self, url: &str) -> StoreResult<()> {
        self.images.lock().stored.retain(|(stored, _)| stored != url);
        Ok(())
    }
}
