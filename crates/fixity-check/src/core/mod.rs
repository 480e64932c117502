//! Pure decision logic with no I/O.

mod throttle;
mod topic;

pub use throttle::{ProgressPolicy, ProgressThrottle};
pub use topic::{FIXITY_CHECK_STREAM, stream_name};
