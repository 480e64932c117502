use serde::{Deserialize, Serialize};

use crate::data::chunk::ChecksumResult;
use crate::data::record::{FixityCheckRecord, NewFixityCheck};

/// Parameters of a fixity check request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRequest {
    pub bucket_name:             String,
    pub object_path:             String,
    pub checksum_algorithm_name: String,
}

impl CheckRequest {
    pub fn new(
        bucket_name: impl Into<String>,
        object_path: impl Into<String>,
        checksum_algorithm_name: impl Into<String>,
    ) -> Self {
        Self {
            bucket_name:             bucket_name.into(),
            object_path:             object_path.into(),
            checksum_algorithm_name: checksum_algorithm_name.into(),
        }
    }

    pub fn into_new_check(self, job_identifier: impl Into<String>) -> NewFixityCheck {
        NewFixityCheck {
            job_identifier:          job_identifier.into(),
            bucket_name:             self.bucket_name,
            object_path:             self.object_path,
            checksum_algorithm_name: self.checksum_algorithm_name,
        }
    }

    pub fn report(&self, result: ChecksumResult) -> CheckReport {
        CheckReport {
            bucket_name:             self.bucket_name.clone(),
            object_path:             self.object_path.clone(),
            checksum_algorithm_name: self.checksum_algorithm_name.clone(),
            checksum_hexdigest:      result.hexdigest,
            object_size:             result.size_bytes,
        }
    }

    pub fn failure(&self, error_message: impl Into<String>) -> CheckFailure {
        CheckFailure {
            error_message:           error_message.into(),
            bucket_name:             self.bucket_name.clone(),
            object_path:             self.object_path.clone(),
            checksum_algorithm_name: self.checksum_algorithm_name.clone(),
        }
    }
}

impl From<&FixityCheckRecord> for CheckRequest {
    fn from(record: &FixityCheckRecord) -> Self {
        Self::new(
            &record.bucket_name,
            &record.object_path,
            &record.checksum_algorithm_name,
        )
    }
}

/// Outcome of a successful check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    pub bucket_name:             String,
    pub object_path:             String,
    pub checksum_algorithm_name: String,
    pub checksum_hexdigest:      String,
    pub object_size:             u64,
}

/// Outcome of a failed check. Echoes the request next to the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckFailure {
    pub error_message:           String,
    pub bucket_name:             String,
    pub object_path:             String,
    pub checksum_algorithm_name: String,
}
