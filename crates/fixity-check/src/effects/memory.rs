use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use bytes::Bytes;
use futures_util::{StreamExt, stream};

use crate::effects::store::{ObjectBody, ObjectStore};
use crate::error::StoreError;

#[derive(Debug, Clone)]
struct StoredObject {
    chunks:         Vec<Bytes>,
    content_length: u64,
    failure:        Option<String>,
}

/// In-process object store.
///
/// Objects are stored pre-chunked with an explicit declared size, so
/// truncated transfers and mid-stream transport failures can be staged.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<(String, String), StoredObject>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self { Self::default() }

    /// Store `data` split into `chunk_size` pieces, declaring its true length.
    pub fn put(&self, bucket: &str, path: &str, data: impl Into<Bytes>, chunk_size: usize) {
        let data: Bytes = data.into();
        let chunk_size = chunk_size.max(1);
        let chunks = (0..data.len())
            .step_by(chunk_size)
            .map(|start| data.slice(start..(start + chunk_size).min(data.len())))
            .collect();
        self.insert(bucket, path, StoredObject {
            chunks,
            content_length: data.len() as u64,
            failure: None,
        });
    }

    /// Store explicit chunks with an arbitrary declared size.
    pub fn put_chunks<I, B>(&self, bucket: &str, path: &str, chunks: I, content_length: u64)
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        self.insert(bucket, path, StoredObject {
            chunks: chunks.into_iter().map(Into::into).collect(),
            content_length,
            failure: None,
        });
    }

    /// Like [`put_chunks`](Self::put_chunks), but the stream fails with a
    /// transport error after the last chunk.
    pub fn put_failing<I, B>(
        &self,
        bucket: &str,
        path: &str,
        chunks: I,
        content_length: u64,
        message: impl Into<String>,
    ) where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        self.insert(bucket, path, StoredObject {
            chunks: chunks.into_iter().map(Into::into).collect(),
            content_length,
            failure: Some(message.into()),
        });
    }

    pub fn remove(&self, bucket: &str, path: &str) -> bool {
        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(bucket.to_string(), path.to_string()))
            .is_some()
    }

    fn insert(&self, bucket: &str, path: &str, object: StoredObject) {
        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((bucket.to_string(), path.to_string()), object);
    }
}

impl ObjectStore for MemoryObjectStore {
    async fn get_object(&self, bucket: &str, path: &str) -> Result<ObjectBody, StoreError> {
        let object = self
            .objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
            .ok_or(StoreError::NotFound)?;

        let failure = object
            .failure
            .map(|message| Err(StoreError::transport(std::io::Error::other(message))));
        let chunks = stream::iter(object.chunks.into_iter().map(Ok)).chain(stream::iter(failure));

        Ok(ObjectBody::new(object.content_length, chunks.boxed()))
    }
}

#[cfg(test)]
mod tests {
    use futures_util::TryStreamExt;

    use super::*;

    #[tokio::test]
    async fn test_put_splits_into_chunks() {
        let store = MemoryObjectStore::new();
        store.put("b", "p", &b"abcdefghij"[..], 4);

        let body = store.get_object("b", "p").await.unwrap();
        assert_eq!(body.content_length, 10);
        let chunks: Vec<Bytes> = body.chunks.try_collect().await.unwrap();
        assert_eq!(chunks, vec![Bytes::from("abcd"), Bytes::from("efgh"), Bytes::from("ij")]);
    }

    #[tokio::test]
    async fn test_empty_object_has_no_chunks() {
        let store = MemoryObjectStore::new();
        store.put("b", "empty", Bytes::new(), 4);

        let body = store.get_object("b", "empty").await.unwrap();
        assert_eq!(body.content_length, 0);
        let chunks: Vec<Bytes> = body.chunks.try_collect().await.unwrap();
        assert!(chunks.is_empty());
    }

    #[tokio::test]
    async fn test_remove() {
        let store = MemoryObjectStore::new();
        store.put("b", "p", "x", 1);
        assert!(store.remove("b", "p"));
        assert!(!store.remove("b", "p"));
        assert!(matches!(store.get_object("b", "p").await, Err(StoreError::NotFound)));
    }
}
