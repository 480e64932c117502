use std::future::Future;

use bytes::Bytes;
use futures_util::StreamExt;

use crate::effects::store::{ObjectBody, ObjectStore};
use crate::error::{Error, Result, StoreError};

/// Receives the chunks of one object, in order.
///
/// The reader awaits each `accept` before pulling the next chunk from the
/// store.
pub trait ChunkSink: Send {
    fn accept(&mut self, chunk: Bytes) -> impl Future<Output = Result<()>> + Send;
}

/// Streams an object's bytes to a [`ChunkSink`], independent of what the sink
/// does with them.
#[derive(Debug, Clone)]
pub struct ChunkedObjectReader<S> {
    store: S,
}

impl<S: ObjectStore> ChunkedObjectReader<S> {
    pub fn new(store: S) -> Self { Self { store } }

    pub fn store(&self) -> &S { &self.store }

    /// Deliver every chunk of `bucket/path` to `sink` and return the size the
    /// store declared for the object.
    ///
    /// Store failures are not retried.
    pub async fn stream<K: ChunkSink>(&self, bucket: &str, path: &str, sink: &mut K) -> Result<u64> {
        let ObjectBody {
            content_length,
            mut chunks,
        } = self
            .store
            .get_object(bucket, path)
            .await
            .map_err(|e| store_error(e, bucket, path))?;

        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(|e| store_error(e, bucket, path))?;
            sink.accept(chunk).await?;
        }

        Ok(content_length)
    }
}

fn store_error(err: StoreError, bucket: &str, path: &str) -> Error {
    match err {
        StoreError::NotFound => Error::ObjectNotFound {
            bucket: bucket.to_string(),
            path:   path.to_string(),
        },
        StoreError::Transport(source) => Error::ObjectStore {
            bucket:  bucket.to_string(),
            path:    path.to_string(),
            message: source.to_string(),
        },
    }
}
