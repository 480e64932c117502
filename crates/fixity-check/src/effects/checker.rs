use std::future::Future;

use bytes::Bytes;
use fixity_verify::StreamingDigest;

use crate::data::{ChecksumResult, ChunkEvent};
use crate::effects::reader::{ChunkSink, ChunkedObjectReader};
use crate::effects::store::ObjectStore;
use crate::error::{Error, Result};

/// Per-chunk hook of a running check.
///
/// Called in-line, once per chunk and in arrival order; the next chunk is not
/// requested until the returned future completes. Plain closures taking a
/// [`ChunkEvent`] implement this trait.
pub trait ChunkObserver: Send {
    fn on_chunk(&mut self, event: ChunkEvent<'_>) -> impl Future<Output = ()> + Send;
}

impl<F> ChunkObserver for F
where
    F: FnMut(ChunkEvent<'_>) + Send,
{
    fn on_chunk(&mut self, event: ChunkEvent<'_>) -> impl Future<Output = ()> + Send {
        self(event);
        std::future::ready(())
    }
}

/// Streams an object through a digest and verifies the byte count against the
/// size declared by the store.
#[derive(Debug, Clone)]
pub struct FixityChecker<S> {
    reader: ChunkedObjectReader<S>,
}

impl<S: ObjectStore> FixityChecker<S> {
    pub fn new(store: S) -> Self {
        Self {
            reader: ChunkedObjectReader::new(store),
        }
    }

    pub fn store(&self) -> &S { self.reader.store() }

    /// Digest and size of `bucket/path` under `algorithm`.
    pub async fn check(&self, bucket: &str, path: &str, algorithm: &str) -> Result<ChecksumResult> {
        self.check_with(bucket, path, algorithm, &mut |_: ChunkEvent<'_>| {})
            .await
    }

    /// Like [`check`](Self::check), reporting every chunk to `observer`.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedAlgorithm`] before the store is contacted
    /// - [`Error::ObjectNotFound`] / [`Error::ObjectStore`] from the store
    /// - [`Error::ReportedSizeMismatch`] when the bytes read differ from the
    ///   declared size, even though the stream itself ended cleanly
    pub async fn check_with<O: ChunkObserver>(
        &self,
        bucket: &str,
        path: &str,
        algorithm: &str,
        observer: &mut O,
    ) -> Result<ChecksumResult> {
        let digest = fixity_verify::for_algorithm(algorithm)?;

        let mut sink = DigestSink {
            digest,
            bytes_read: 0,
            sequence: 0,
            observer,
        };
        let reported = self.reader.stream(bucket, path, &mut sink).await?;
        let DigestSink {
            digest, bytes_read, ..
        } = sink;

        if bytes_read != reported {
            return Err(Error::ReportedSizeMismatch {
                reported,
                read: bytes_read,
            });
        }

        Ok(ChecksumResult {
            hexdigest:  digest.finalize_hex(),
            size_bytes: bytes_read,
        })
    }
}

struct DigestSink<'o, O> {
    digest:     StreamingDigest,
    bytes_read: u64,
    sequence:   u64,
    observer:   &'o mut O,
}

impl<O: ChunkObserver> ChunkSink for DigestSink<'_, O> {
    async fn accept(&mut self, chunk: Bytes) -> Result<()> {
        self.digest.update(&chunk);
        self.bytes_read += chunk.len() as u64;
        self.sequence += 1;

        self.observer
            .on_chunk(ChunkEvent {
                chunk:      &chunk,
                bytes_read: self.bytes_read,
                sequence:   self.sequence,
            })
            .await;
        Ok(())
    }
}
