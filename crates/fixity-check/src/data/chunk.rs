use bytes::Bytes;

/// One chunk as seen by a [`ChunkObserver`](crate::ChunkObserver).
///
/// Borrowed for the duration of the observer call only.
#[derive(Debug, Clone, Copy)]
pub struct ChunkEvent<'a> {
    /// Bytes of this chunk.
    pub chunk: &'a Bytes,

    /// Total bytes read so far, including this chunk.
    pub bytes_read: u64,

    /// 1-based position of this chunk in the stream.
    pub sequence: u64,
}

/// Digest and size of a fully read object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumResult {
    pub hexdigest:  String,
    pub size_bytes: u64,
}
