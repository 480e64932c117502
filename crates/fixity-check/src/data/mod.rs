//! Immutable data types for fixity checks.
//!
//! Records, broadcast events, request/response shapes and the transient
//! values that flow between the engine and its observers.

pub mod chunk;
pub mod event;
pub mod record;
pub mod request;

pub use chunk::{ChecksumResult, ChunkEvent};
pub use event::FixityCheckEvent;
pub use record::{FixityCheckRecord, FixityCheckStatus, NewFixityCheck, RecordId, RecordUpdate};
pub use request::{CheckFailure, CheckReport, CheckRequest};
