use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use futures_util::{StreamExt, TryStreamExt, stream};
use tokio::io::AsyncReadExt;

use crate::effects::store::{ObjectBody, ObjectStore};
use crate::error::StoreError;

/// Default read size for filesystem objects (64 KiB).
pub const DEFAULT_FS_CHUNK_SIZE: usize = 64 * 1024;

/// Object store over a local directory: each bucket is a subdirectory of
/// `root` and object paths are relative to it.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root:       PathBuf,
    chunk_size: usize,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root:       root.into(),
            chunk_size: DEFAULT_FS_CHUNK_SIZE,
        }
    }

    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn root(&self) -> &Path { &self.root }

    /// Resolve `bucket/path` below the root. Anything that could escape the
    /// bucket directory resolves to `None`.
    fn resolve(&self, bucket: &str, path: &str) -> Option<PathBuf> {
        let bucket = Path::new(bucket);
        let path = Path::new(path);
        let plain = |p: &Path| {
            let mut components = p.components().peekable();
            components.peek().is_some() && components.all(|c| matches!(c, Component::Normal(_)))
        };

        if !plain(bucket) || bucket.components().count() != 1 || !plain(path) {
            return None;
        }
        Some(self.root.join(bucket).join(path))
    }
}

impl ObjectStore for FsObjectStore {
    async fn get_object(&self, bucket: &str, path: &str) -> Result<ObjectBody, StoreError> {
        let full_path = self.resolve(bucket, path).ok_or(StoreError::NotFound)?;
        let file = tokio::fs::File::open(&full_path).await?;
        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(StoreError::NotFound);
        }

        let chunk_size = self.chunk_size;
        let chunks = stream::try_unfold(file, move |mut file| async move {
            // Fill whole chunks; only the last one may be short.
            let mut buf = vec![0u8; chunk_size];
            let mut filled = 0;
            while filled < chunk_size {
                let n = file.read(&mut buf[filled..]).await?;
                if n == 0 {
                    break;
                }
                filled += n;
            }
            buf.truncate(filled);
            let next = (filled > 0).then(|| (Bytes::from(buf), file));
            Ok::<_, std::io::Error>(next)
        })
        .map_err(StoreError::transport);

        Ok(ObjectBody::new(metadata.len(), chunks.boxed()))
    }
}
