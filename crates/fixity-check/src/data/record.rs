use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::chunk::ChecksumResult;
use crate::error::{Error, Result};

/// Store-assigned identifier of a [`FixityCheckRecord`].
pub type RecordId = u64;

/// Lifecycle of a fixity check run.
///
/// Runs move `Pending -> InProgress -> {Success | Failure}` and never leave a
/// terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixityCheckStatus {
    #[default]
    Pending,
    InProgress,
    Success,
    Failure,
}

impl FixityCheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }

    pub fn is_terminal(&self) -> bool { matches!(self, Self::Success | Self::Failure) }

    pub fn can_transition_to(&self, next: FixityCheckStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::InProgress)
                | (Self::InProgress, Self::Success)
                | (Self::InProgress, Self::Failure)
        )
    }

    /// Validated transition to `next`.
    pub fn transition(self, next: FixityCheckStatus) -> Result<FixityCheckStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(Error::InvalidTransition { from: self, to: next })
        }
    }
}

impl fmt::Display for FixityCheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Caller-supplied fields of a check about to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFixityCheck {
    pub job_identifier:          String,
    pub bucket_name:             String,
    pub object_path:             String,
    pub checksum_algorithm_name: String,
}

/// Persistent unit of work for one fixity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixityCheckRecord {
    pub id:                      RecordId,
    pub job_identifier:          String,
    pub bucket_name:             String,
    pub object_path:             String,
    pub checksum_algorithm_name: String,
    pub checksum_hexdigest:      Option<String>,
    pub object_size:             Option<u64>,
    pub status:                  FixityCheckStatus,
    pub error_message:           Option<String>,
    pub created_at:              DateTime<Utc>,
    pub updated_at:              DateTime<Utc>,
}

impl FixityCheckRecord {
    /// A fresh `pending` record.
    pub fn new(id: RecordId, new: NewFixityCheck, now: DateTime<Utc>) -> Self {
        Self {
            id,
            job_identifier: new.job_identifier,
            bucket_name: new.bucket_name,
            object_path: new.object_path,
            checksum_algorithm_name: new.checksum_algorithm_name,
            checksum_hexdigest: None,
            object_size: None,
            status: FixityCheckStatus::Pending,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update, refreshing `updated_at`.
    ///
    /// The record is left untouched when the update is rejected.
    pub fn apply(&mut self, update: RecordUpdate, now: DateTime<Utc>) -> Result<()> {
        let status = match update.status {
            Some(next) => self.status.transition(next)?,
            None => self.status,
        };

        let sets_result = update.checksum_hexdigest.is_some() || update.object_size.is_some();
        if sets_result && update.status != Some(FixityCheckStatus::Success) {
            return Err(Error::InvalidUpdate("digest and size are only written on success"));
        }
        if update.status == Some(FixityCheckStatus::Success)
            && (update.checksum_hexdigest.is_none() || update.object_size.is_none())
        {
            return Err(Error::InvalidUpdate("success requires a digest and a size"));
        }
        if update.error_message.is_some() && update.status != Some(FixityCheckStatus::Failure) {
            return Err(Error::InvalidUpdate("error message is only written on failure"));
        }
        if update.status == Some(FixityCheckStatus::Failure) && update.error_message.is_none() {
            return Err(Error::InvalidUpdate("failure requires an error message"));
        }

        self.status = status;
        if let Some(digest) = update.checksum_hexdigest {
            self.checksum_hexdigest = Some(digest);
        }
        if let Some(size) = update.object_size {
            self.object_size = Some(size);
        }
        if let Some(message) = update.error_message {
            self.error_message = Some(message);
        }
        self.updated_at = now;
        Ok(())
    }
}

/// Partial update of a [`FixityCheckRecord`]. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordUpdate {
    pub status:             Option<FixityCheckStatus>,
    pub checksum_hexdigest: Option<String>,
    pub object_size:        Option<u64>,
    pub error_message:      Option<String>,
}

impl RecordUpdate {
    /// Heartbeat: only refreshes `updated_at`.
    pub fn touch() -> Self { Self::default() }

    pub fn start() -> Self {
        Self {
            status: Some(FixityCheckStatus::InProgress),
            ..Self::default()
        }
    }

    pub fn success(result: &ChecksumResult) -> Self {
        Self {
            status: Some(FixityCheckStatus::Success),
            checksum_hexdigest: Some(result.hexdigest.clone()),
            object_size: Some(result.size_bytes),
            ..Self::default()
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: Some(FixityCheckStatus::Failure),
            error_message: Some(message.into()),
            ..Self::default()
        }
    }
}
