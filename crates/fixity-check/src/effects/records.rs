use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;

use crate::data::{FixityCheckRecord, NewFixityCheck, RecordId, RecordUpdate};
use crate::error::{Error, Result};

/// Persistence for [`FixityCheckRecord`]s.
///
/// `update` must be atomic per record: the transition guard in
/// [`FixityCheckRecord::apply`] runs against the stored state, so two racing
/// runs of one record cannot both leave `pending`.
pub trait RecordStore: Send + Sync {
    /// Persist a new `pending` record and assign its id.
    ///
    /// Fails with [`Error::DuplicateJobIdentifier`] if any stored record
    /// already uses the job identifier.
    fn insert(&self, new: NewFixityCheck) -> impl Future<Output = Result<FixityCheckRecord>> + Send;

    fn find(&self, id: RecordId) -> impl Future<Output = Result<Option<FixityCheckRecord>>> + Send;

    /// Apply `update` to the stored record and return the new state.
    fn update(
        &self,
        id: RecordId,
        update: RecordUpdate,
    ) -> impl Future<Output = Result<FixityCheckRecord>> + Send;
}

impl<R: RecordStore> RecordStore for std::sync::Arc<R> {
    fn insert(&self, new: NewFixityCheck) -> impl Future<Output = Result<FixityCheckRecord>> + Send {
        (**self).insert(new)
    }

    fn find(&self, id: RecordId) -> impl Future<Output = Result<Option<FixityCheckRecord>>> + Send {
        (**self).find(id)
    }

    fn update(
        &self,
        id: RecordId,
        update: RecordUpdate,
    ) -> impl Future<Output = Result<FixityCheckRecord>> + Send {
        (**self).update(id, update)
    }
}

#[derive(Debug, Default)]
struct Table {
    last_id: RecordId,
    rows:    BTreeMap<RecordId, FixityCheckRecord>,
}

/// Process-local [`RecordStore`].
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    table: Mutex<Table>,
}

impl MemoryRecordStore {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.lock().rows.len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    fn lock(&self) -> std::sync::MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RecordStore for MemoryRecordStore {
    async fn insert(&self, new: NewFixityCheck) -> Result<FixityCheckRecord> {
        let mut table = self.lock();
        if table.rows.values().any(|r| r.job_identifier == new.job_identifier) {
            return Err(Error::DuplicateJobIdentifier(new.job_identifier));
        }

        table.last_id += 1;
        let record = FixityCheckRecord::new(table.last_id, new, Utc::now());
        table.rows.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find(&self, id: RecordId) -> Result<Option<FixityCheckRecord>> {
        Ok(self.lock().rows.get(&id).cloned())
    }

    async fn update(&self, id: RecordId, update: RecordUpdate) -> Result<FixityCheckRecord> {
        let mut table = self.lock();
        let record = table.rows.get_mut(&id).ok_or(Error::RecordNotFound(id))?;

        // Apply to a copy so a rejected update leaves the row as it was.
        let mut next = record.clone();
        next.apply(update, Utc::now())?;
        *record = next.clone();
        Ok(next)
    }
}
