use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::Stream;

use crate::error::StoreError;

/// A boxed stream type for object bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// An opened object: its declared size and a stream of its bytes.
pub struct ObjectBody {
    /// Size the store declares for the object (e.g. `Content-Length`).
    pub content_length: u64,

    /// Object bytes in delivery order.
    pub chunks: BoxStream<'static, std::result::Result<Bytes, StoreError>>,
}

impl ObjectBody {
    pub fn new(
        content_length: u64,
        chunks: BoxStream<'static, std::result::Result<Bytes, StoreError>>,
    ) -> Self {
        Self {
            content_length,
            chunks,
        }
    }
}

impl std::fmt::Debug for ObjectBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectBody")
            .field("content_length", &self.content_length)
            .field("chunks", &"{ ... }")
            .finish()
    }
}

/// Streaming "get object" against a bucket-keyed store.
///
/// # Implementations
///
/// - [`MemoryObjectStore`](crate::MemoryObjectStore): in-process objects
/// - [`FsObjectStore`](crate::FsObjectStore): `<root>/<bucket>/<path>` on disk
/// - `HttpObjectStore`: path-style HTTP GET (feature `reqwest`)
pub trait ObjectStore: Send + Sync {
    /// Open `path` in `bucket` for streaming.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when the store has no such object;
    /// [`StoreError::Transport`] for anything else.
    fn get_object(
        &self,
        bucket: &str,
        path: &str,
    ) -> impl Future<Output = std::result::Result<ObjectBody, StoreError>> + Send;
}

impl<S: ObjectStore> ObjectStore for Arc<S> {
    fn get_object(
        &self,
        bucket: &str,
        path: &str,
    ) -> impl Future<Output = std::result::Result<ObjectBody, StoreError>> + Send {
        (**self).get_object(bucket, path)
    }
}
