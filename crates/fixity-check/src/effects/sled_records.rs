use std::path::Path;

use chrono::Utc;
use sled::transaction::{ConflictableTransactionError, abort};

use crate::data::{FixityCheckRecord, NewFixityCheck, RecordId, RecordUpdate};
use crate::effects::records::RecordStore;
use crate::error::{Error, Result};

/// [`RecordStore`] backed by an embedded sled database.
///
/// Records are postcard-encoded under `fc:record:<id>`; `fc:job:<job>` indexes
/// job identifiers to keep them unique.
#[derive(Debug, Clone)]
pub struct SledRecordStore {
    db: sled::Db,
}

struct DbKeys;

impl DbKeys {
    fn record(id: RecordId) -> Vec<u8> { format!("fc:record:{id:020}").into_bytes() }

    fn job(job_identifier: &str) -> Vec<u8> {
        let mut key = b"fc:job:".to_vec();
        key.extend_from_slice(job_identifier.as_bytes());
        key
    }
}

impl SledRecordStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// A throwaway database removed when the store is dropped.
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    /// Block until every write so far is on disk.
    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

fn decode(bytes: &[u8]) -> std::result::Result<FixityCheckRecord, ConflictableTransactionError<Error>> {
    postcard::from_bytes(bytes).map_err(|e| ConflictableTransactionError::Abort(e.into()))
}

fn encode(record: &FixityCheckRecord) -> std::result::Result<Vec<u8>, ConflictableTransactionError<Error>> {
    postcard::to_allocvec(record).map_err(|e| ConflictableTransactionError::Abort(e.into()))
}

impl RecordStore for SledRecordStore {
    async fn insert(&self, new: NewFixityCheck) -> Result<FixityCheckRecord> {
        // sled ids start at zero; record ids start at one.
        let id = self.db.generate_id()? + 1;
        let job_key = DbKeys::job(&new.job_identifier);
        let record_key = DbKeys::record(id);

        let record = self.db.transaction(|tx| {
            if tx.get(&job_key)?.is_some() {
                return abort(Error::DuplicateJobIdentifier(new.job_identifier.clone()));
            }
            let record = FixityCheckRecord::new(id, new.clone(), Utc::now());
            tx.insert(record_key.as_slice(), encode(&record)?)?;
            tx.insert(job_key.as_slice(), id.to_be_bytes().to_vec())?;
            Ok(record)
        })?;

        tracing::debug!(id, job = %record.job_identifier, "inserted fixity check record");
        Ok(record)
    }

    async fn find(&self, id: RecordId) -> Result<Option<FixityCheckRecord>> {
        match self.db.get(DbKeys::record(id))? {
            Some(bytes) => Ok(Some(postcard::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn update(&self, id: RecordId, update: RecordUpdate) -> Result<FixityCheckRecord> {
        let key = DbKeys::record(id);

        let record = self.db.transaction(|tx| {
            let Some(bytes) = tx.get(&key)? else {
                return abort(Error::RecordNotFound(id));
            };
            let mut record = decode(&bytes)?;
            if let Err(e) = record.apply(update.clone(), Utc::now()) {
                return abort(e);
            }
            tx.insert(key.as_slice(), encode(&record)?)?;
            Ok(record)
        })?;

        Ok(record)
    }
}
