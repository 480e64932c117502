//! I/O behind traits: object stores, the check engine, record stores,
//! broadcasting and the job that ties them together.

mod backend;
mod broadcast;
mod checker;
mod fs;
#[cfg(feature = "reqwest")]
mod http;
mod job;
mod memory;
mod reader;
mod records;
mod service;
mod sled_records;
mod store;

pub use backend::{ObjectStoreBackend, RecordStoreBackend};
pub use broadcast::{Broadcaster, ChannelBroadcaster, TracingBroadcaster};
pub use checker::{ChunkObserver, FixityChecker};
pub use fs::{DEFAULT_FS_CHUNK_SIZE, FsObjectStore};
#[cfg(feature = "reqwest")]
pub use http::HttpObjectStore;
pub use job::{FixityCheckJob, JobOptions};
pub use memory::MemoryObjectStore;
pub use reader::{ChunkSink, ChunkedObjectReader};
pub use records::{MemoryRecordStore, RecordStore};
pub use service::{ConfiguredService, FixityService, generate_job_identifier};
pub use sled_records::SledRecordStore;
pub use store::{BoxStream, ObjectBody, ObjectStore};
