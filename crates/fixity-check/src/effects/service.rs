use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::Instrument;

use crate::config::Settings;
use crate::data::{CheckFailure, CheckReport, CheckRequest, FixityCheckRecord, RecordId};
use crate::effects::backend::{ObjectStoreBackend, RecordStoreBackend};
use crate::effects::broadcast::{Broadcaster, ChannelBroadcaster};
use crate::effects::checker::FixityChecker;
use crate::effects::job::FixityCheckJob;
use crate::effects::records::RecordStore;
use crate::effects::store::ObjectStore;
use crate::error::{Error, Result};

/// Service wired from [`Settings`].
pub type ConfiguredService = FixityService<ObjectStoreBackend, RecordStoreBackend, ChannelBroadcaster>;

/// Entry points for callers outside the core: synchronous checks, job
/// creation and dispatch, lookups and topic subscriptions.
pub struct FixityService<S, R, B> {
    job:        FixityCheckJob<S, R, B>,
    run_inline: bool,
}

impl<S, R, B> Clone for FixityService<S, R, B> {
    fn clone(&self) -> Self {
        Self {
            job:        self.job.clone(),
            run_inline: self.run_inline,
        }
    }
}

impl<S, R, B> FixityService<S, R, B>
where
    S: ObjectStore + 'static,
    R: RecordStore + 'static,
    B: Broadcaster + 'static,
{
    pub fn new(job: FixityCheckJob<S, R, B>) -> Self {
        Self {
            job,
            run_inline: false,
        }
    }

    /// Await jobs in [`create`](Self::create) instead of spawning them.
    #[must_use]
    pub fn run_inline(mut self, run_inline: bool) -> Self {
        self.run_inline = run_inline;
        self
    }

    pub fn job(&self) -> &FixityCheckJob<S, R, B> { &self.job }

    pub fn checker(&self) -> &Arc<FixityChecker<S>> { self.job.checker() }

    /// Check an object and answer directly, without a record or broadcasts.
    ///
    /// A failure echoes the request next to the message.
    pub async fn check_now(&self, request: &CheckRequest) -> std::result::Result<CheckReport, CheckFailure> {
        let outcome = self
            .job
            .checker()
            .check(
                &request.bucket_name,
                &request.object_path,
                &request.checksum_algorithm_name,
            )
            .await;

        match outcome {
            Ok(result) => Ok(request.report(result)),
            Err(err) => {
                tracing::debug!(%err, bucket = %request.bucket_name, path = %request.object_path, "synchronous fixity check failed");
                Err(request.failure(err.to_string()))
            }
        }
    }

    /// Store a `pending` record for `request`.
    ///
    /// A missing or blank `job_identifier` is replaced by a fresh UUID.
    pub async fn register(
        &self,
        request: CheckRequest,
        job_identifier: Option<String>,
    ) -> Result<FixityCheckRecord> {
        let job_identifier = job_identifier
            .filter(|job| !job.trim().is_empty())
            .unwrap_or_else(generate_job_identifier);
        self.job.records().insert(request.into_new_check(job_identifier)).await
    }

    /// Run a registered record to completion in the current task.
    pub async fn run(&self, id: RecordId) -> Result<FixityCheckRecord> { self.job.run(id).await }

    /// Register a check and dispatch its job.
    ///
    /// Returns the `pending` record as stored before the job started, unless
    /// jobs run inline, in which case the terminal record is returned.
    pub async fn create(
        &self,
        request: CheckRequest,
        job_identifier: Option<String>,
    ) -> Result<FixityCheckRecord> {
        let record = self.register(request, job_identifier).await?;

        if self.run_inline {
            return self.job.run(record.id).await;
        }

        let job = self.job.clone();
        let id = record.id;
        let span = tracing::info_span!("fixity_check_job", id, job = %record.job_identifier);
        tokio::spawn(
            async move {
                if let Err(err) = job.run(id).await {
                    tracing::error!(%err, "fixity check job aborted");
                }
            }
            .instrument(span),
        );
        Ok(record)
    }

    pub async fn show(&self, id: RecordId) -> Result<FixityCheckRecord> {
        self.job.records().find(id).await?.ok_or(Error::RecordNotFound(id))
    }

    /// Broadcast topic for `job_identifier`, or `None` when it is blank.
    pub fn topic(&self, job_identifier: &str) -> Option<String> {
        if job_identifier.trim().is_empty() {
            None
        } else {
            Some(self.job.topic(job_identifier))
        }
    }
}

impl<S, R> FixityService<S, R, ChannelBroadcaster>
where
    S: ObjectStore + 'static,
    R: RecordStore + 'static,
{
    /// Listen for the events of `job_identifier`'s runs.
    pub fn subscribe(&self, job_identifier: &str) -> Option<broadcast::Receiver<Arc<str>>> {
        let topic = self.topic(job_identifier)?;
        tracing::debug!(%topic, "subscribed");
        Some(self.job.broadcaster().subscribe(&topic))
    }

    /// Release the topic of `job_identifier` once its receivers are dropped.
    ///
    /// Topics are also released by their terminal event.
    pub fn unsubscribe(&self, job_identifier: &str) -> bool {
        self.topic(job_identifier)
            .is_some_and(|topic| self.job.broadcaster().unsubscribe(&topic))
    }
}

impl ConfiguredService {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let store = ObjectStoreBackend::from_settings(&settings.store)?;
        let records = RecordStoreBackend::from_settings(&settings.database)?;
        let job = FixityCheckJob::new(
            Arc::new(FixityChecker::new(store)),
            Arc::new(records),
            Arc::new(ChannelBroadcaster::default()),
            settings.job_options(),
        );
        Ok(Self::new(job).run_inline(settings.run_inline))
    }
}

/// Fresh random job identifier.
pub fn generate_job_identifier() -> String { uuid::Uuid::new_v4().to_string() }

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::data::{FixityCheckEvent, FixityCheckStatus};
    use crate::effects::job::JobOptions;
    use crate::effects::memory::MemoryObjectStore;
    use crate::effects::records::MemoryRecordStore;

    type TestService = FixityService<MemoryObjectStore, MemoryRecordStore, ChannelBroadcaster>;

    fn service() -> TestService {
        let store = MemoryObjectStore::new();
        store.put_chunks("bucket", "example", ["aaaaa", "bbbbb", "c"], 11);
        FixityService::new(FixityCheckJob::new(
            Arc::new(FixityChecker::new(store)),
            Arc::new(MemoryRecordStore::new()),
            Arc::new(ChannelBroadcaster::default()),
            JobOptions::default(),
        ))
    }

    #[tokio::test]
    async fn test_check_now_success() {
        let report = service()
            .check_now(&CheckRequest::new("bucket", "example", "sha256"))
            .await
            .unwrap();
        assert_eq!(report.object_size, 11);
        assert_eq!(
            report.checksum_hexdigest,
            "b8bdfd212dc6c4fb964e166e5ef7a0b57b1e60ec4d4e9b154c695aa5a942373f"
        );
    }

    #[tokio::test]
    async fn test_check_now_echoes_request_on_failure() {
        let failure = service()
            .check_now(&CheckRequest::new("bucket", "example", "sha1024"))
            .await
            .unwrap_err();
        assert_eq!(failure, CheckFailure {
            error_message:           "Unsupported checksum algorithm: sha1024".into(),
            bucket_name:             "bucket".into(),
            object_path:             "example".into(),
            checksum_algorithm_name: "sha1024".into(),
        });
    }

    #[tokio::test]
    async fn test_register_generates_identifier() {
        let service = service();
        let request = CheckRequest::new("bucket", "example", "md5");

        let generated = service.register(request.clone(), None).await.unwrap();
        assert!(uuid::Uuid::parse_str(&generated.job_identifier).is_ok());

        let blank = service.register(request.clone(), Some("  ".into())).await.unwrap();
        assert_ne!(blank.job_identifier.trim(), "");

        let named = service.register(request.clone(), Some("mine".into())).await.unwrap();
        assert_eq!(named.job_identifier, "mine");
        assert_eq!(named.status, FixityCheckStatus::Pending);

        let dup = service.register(request, Some("mine".into())).await.unwrap_err();
        assert!(matches!(dup, Error::DuplicateJobIdentifier(_)));
    }

    #[tokio::test]
    async fn test_create_dispatches_job() {
        let service = service();
        let mut events = service.subscribe("spawned").unwrap();

        let record = service
            .create(CheckRequest::new("bucket", "example", "crc32c"), Some("spawned".into()))
            .await
            .unwrap();
        assert_eq!(record.job_identifier, "spawned");

        let message = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .unwrap()
            .unwrap();
        let event: FixityCheckEvent = serde_json::from_str(&message).unwrap();
        assert!(matches!(event, FixityCheckEvent::Complete(ref report) if report.object_size == 11));

        let stored = service.show(record.id).await.unwrap();
        assert_eq!(stored.status, FixityCheckStatus::Success);
    }

    #[tokio::test]
    async fn test_create_inline_returns_terminal_record() {
        let service = service().run_inline(true);
        let record = service
            .create(CheckRequest::new("bucket", "missing", "sha256"), None)
            .await
            .unwrap();
        assert_eq!(record.status, FixityCheckStatus::Failure);
        assert_eq!(
            record.error_message.as_deref(),
            Some("Could not find object: bucket=bucket, path=missing")
        );
    }

    #[tokio::test]
    async fn test_show_missing() {
        assert!(matches!(service().show(7).await, Err(Error::RecordNotFound(7))));
    }

    #[test]
    fn test_blank_identifier_has_no_topic() {
        let service = service();
        assert!(service.subscribe("").is_none());
        assert!(service.subscribe("   ").is_none());
        assert_eq!(service.topic("abc").as_deref(), Some("fixity_check:abc"));

        let rx = service.subscribe("abc").unwrap();
        assert!(!service.unsubscribe("abc"));
        drop(rx);
        assert!(service.unsubscribe("abc"));
    }

    #[tokio::test]
    async fn test_from_settings() {
        let settings = Settings::from_toml("stream_prefix = \"p:\"\n[store]\nkind = \"memory\"\n").unwrap();
        let service = ConfiguredService::from_settings(&settings).unwrap();
        assert_eq!(service.topic("x").as_deref(), Some("p:fixity_check:x"));

        let record = service
            .create(CheckRequest::new("b", "p", "sha256"), Some("x".into()))
            .await
            .unwrap();
        assert_eq!(service.show(record.id).await.unwrap().job_identifier, "x");
    }
}
