//! Runtime-selected collaborators, built from [`Settings`](crate::config::Settings).

use crate::config::{DatabaseSettings, StoreSettings};
use crate::data::{FixityCheckRecord, NewFixityCheck, RecordId, RecordUpdate};
use crate::effects::fs::FsObjectStore;
#[cfg(feature = "reqwest")]
use crate::effects::http::HttpObjectStore;
use crate::effects::memory::MemoryObjectStore;
use crate::effects::records::{MemoryRecordStore, RecordStore};
use crate::effects::sled_records::SledRecordStore;
use crate::effects::store::{ObjectBody, ObjectStore};
use crate::error::{Error, Result, StoreError};

#[derive(Debug)]
pub enum ObjectStoreBackend {
    Memory(MemoryObjectStore),
    Fs(FsObjectStore),
    #[cfg(feature = "reqwest")]
    Http(HttpObjectStore),
}

impl ObjectStoreBackend {
    pub fn from_settings(settings: &StoreSettings) -> Result<Self> {
        match settings {
            StoreSettings::Memory => Ok(Self::Memory(MemoryObjectStore::new())),
            StoreSettings::Fs { root, chunk_size } => Ok(Self::Fs(
                FsObjectStore::new(root).with_chunk_size(*chunk_size),
            )),
            #[cfg(feature = "reqwest")]
            StoreSettings::Http { endpoint } => Ok(Self::Http(HttpObjectStore::new(endpoint)?)),
            #[cfg(not(feature = "reqwest"))]
            StoreSettings::Http { .. } => Err(Error::Config(
                "the http object store needs the `reqwest` feature".to_string(),
            )),
        }
    }
}

impl ObjectStore for ObjectStoreBackend {
    async fn get_object(&self, bucket: &str, path: &str) -> std::result::Result<ObjectBody, StoreError> {
        match self {
            Self::Memory(store) => store.get_object(bucket, path).await,
            Self::Fs(store) => store.get_object(bucket, path).await,
            #[cfg(feature = "reqwest")]
            Self::Http(store) => store.get_object(bucket, path).await,
        }
    }
}

#[derive(Debug)]
pub enum RecordStoreBackend {
    Memory(MemoryRecordStore),
    Sled(SledRecordStore),
}

impl RecordStoreBackend {
    pub fn from_settings(settings: &DatabaseSettings) -> Result<Self> {
        match &settings.path {
            Some(path) => {
                let store = SledRecordStore::open(path)
                    .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
                Ok(Self::Sled(store))
            }
            None => Ok(Self::Memory(MemoryRecordStore::new())),
        }
    }
}

impl RecordStore for RecordStoreBackend {
    async fn insert(&self, new: NewFixityCheck) -> Result<FixityCheckRecord> {
        match self {
            Self::Memory(store) => store.insert(new).await,
            Self::Sled(store) => store.insert(new).await,
        }
    }

    async fn find(&self, id: RecordId) -> Result<Option<FixityCheckRecord>> {
        match self {
            Self::Memory(store) => store.find(id).await,
            Self::Sled(store) => store.find(id).await,
        }
    }

    async fn update(&self, id: RecordId, update: RecordUpdate) -> Result<FixityCheckRecord> {
        match self {
            Self::Memory(store) => store.update(id, update).await,
            Self::Sled(store) => store.update(id, update).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backends() {
        let store = ObjectStoreBackend::from_settings(&StoreSettings::Memory).unwrap();
        assert!(matches!(store.get_object("b", "p").await, Err(StoreError::NotFound)));

        let records = RecordStoreBackend::from_settings(&DatabaseSettings::default()).unwrap();
        assert!(matches!(records, RecordStoreBackend::Memory(_)));
        assert_eq!(records.find(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_fs_and_sled_backends() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("bucket")).unwrap();
        std::fs::write(dir.path().join("bucket/object"), b"hello world").unwrap();

        let store = ObjectStoreBackend::from_settings(&StoreSettings::Fs {
            root:       dir.path().to_path_buf(),
            chunk_size: 4,
        })
        .unwrap();
        let body = store.get_object("bucket", "object").await.unwrap();
        assert_eq!(body.content_length, 11);

        let records = RecordStoreBackend::from_settings(&DatabaseSettings {
            path: Some(dir.path().join("db")),
        })
        .unwrap();
        assert!(matches!(records, RecordStoreBackend::Sled(_)));
    }

    #[cfg(feature = "reqwest")]
    #[test]
    fn test_http_backend_rejects_bad_endpoint() {
        let err = ObjectStoreBackend::from_settings(&StoreSettings::Http {
            endpoint: "not a url".into(),
        })
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
