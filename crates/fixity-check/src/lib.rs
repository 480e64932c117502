//! Streaming fixity checks for objects in remote storage.
//!
//! An object is streamed chunk by chunk through an incremental digest, its
//! byte count is verified against the size the store declared, and the
//! outcome is persisted on a [`FixityCheckRecord`](data::FixityCheckRecord)
//! while subscribers are told about progress, completion or failure.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Records, events and request/response types
//! - [`core`] - Progress throttling and topic naming, no I/O
//! - effects - Object stores, the check engine, record stores, broadcasting
//!   and the job state machine, all behind traits
//!
//! # Example
//!
//! ```
//! use fixity_check::{FixityChecker, MemoryObjectStore};
//!
//! let store = MemoryObjectStore::new();
//! store.put_chunks("bucket", "greeting", ["hello", " world"], 11);
//!
//! let checker = FixityChecker::new(store);
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! let result = runtime.block_on(checker.check("bucket", "greeting", "md5")).unwrap();
//! assert_eq!(result.hexdigest, "5eb63bbbe01eeed093cb22bb8f5acdc3");
//! assert_eq!(result.size_bytes, 11);
//! ```

pub mod config;
pub mod core;
pub mod data;
mod effects;
mod error;

pub use effects::{
    BoxStream, Broadcaster, ChannelBroadcaster, ChunkObserver, ChunkSink, ChunkedObjectReader,
    ConfiguredService, DEFAULT_FS_CHUNK_SIZE, FixityCheckJob, FixityChecker, FixityService,
    FsObjectStore, JobOptions, MemoryObjectStore, MemoryRecordStore, ObjectBody, ObjectStore,
    ObjectStoreBackend, RecordStore, RecordStoreBackend, SledRecordStore, TracingBroadcaster,
    generate_job_identifier,
};

#[cfg(feature = "reqwest")]
pub use effects::HttpObjectStore;

pub use error::{Error, Result, StoreError};
