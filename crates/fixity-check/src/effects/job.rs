use std::sync::Arc;
use std::time::Instant;

use crate::core::{ProgressPolicy, ProgressThrottle, stream_name};
use crate::data::{
    CheckRequest, ChunkEvent, FixityCheckEvent, FixityCheckRecord, RecordId, RecordUpdate,
};
use crate::effects::broadcast::Broadcaster;
use crate::effects::checker::{ChunkObserver, FixityChecker};
use crate::effects::records::RecordStore;
use crate::effects::store::ObjectStore;
use crate::error::{Error, Result};

/// Deployment knobs of [`FixityCheckJob`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobOptions {
    /// Prepended to every broadcast topic.
    pub stream_prefix: String,
    pub progress:      ProgressPolicy,
}

/// Drives one fixity check run for a stored record.
///
/// Persists `pending -> in_progress -> success | failure` and broadcasts
/// heartbeats plus exactly one terminal event on the record's topic.
pub struct FixityCheckJob<S, R, B> {
    checker:     Arc<FixityChecker<S>>,
    records:     Arc<R>,
    broadcaster: Arc<B>,
    options:     JobOptions,
}

impl<S, R, B> Clone for FixityCheckJob<S, R, B> {
    fn clone(&self) -> Self {
        Self {
            checker:     self.checker.clone(),
            records:     self.records.clone(),
            broadcaster: self.broadcaster.clone(),
            options:     self.options.clone(),
        }
    }
}

impl<S, R, B> FixityCheckJob<S, R, B>
where
    S: ObjectStore,
    R: RecordStore,
    B: Broadcaster,
{
    pub fn new(
        checker: Arc<FixityChecker<S>>,
        records: Arc<R>,
        broadcaster: Arc<B>,
        options: JobOptions,
    ) -> Self {
        Self {
            checker,
            records,
            broadcaster,
            options,
        }
    }

    pub fn checker(&self) -> &Arc<FixityChecker<S>> { &self.checker }

    pub fn records(&self) -> &Arc<R> { &self.records }

    pub fn broadcaster(&self) -> &Arc<B> { &self.broadcaster }

    pub fn options(&self) -> &JobOptions { &self.options }

    /// Broadcast topic of `job_identifier`.
    pub fn topic(&self, job_identifier: &str) -> String {
        stream_name(&self.options.stream_prefix, job_identifier)
    }

    /// Run the check for record `id` and return its terminal state.
    ///
    /// Check failures of any kind end in `failure` and are not returned as
    /// errors. `Err` means the run never started (the record is missing or
    /// already left `pending`) or the record store rejected the terminal
    /// update. Once streaming started, an `error` event is broadcast even when
    /// the terminal update cannot be stored.
    pub async fn run(&self, id: RecordId) -> Result<FixityCheckRecord> {
        let record = self.records.find(id).await?.ok_or(Error::RecordNotFound(id))?;
        let topic = self.topic(&record.job_identifier);
        let request = CheckRequest::from(&record);

        self.records.update(id, RecordUpdate::start()).await?;
        tracing::info!(
            id,
            %topic,
            bucket = %request.bucket_name,
            path = %request.object_path,
            algorithm = %request.checksum_algorithm_name,
            "fixity check started"
        );

        let mut observer = ProgressObserver {
            id,
            topic: &topic,
            records: &*self.records,
            broadcaster: &*self.broadcaster,
            throttle: ProgressThrottle::new(self.options.progress, Instant::now()),
        };
        let outcome = self
            .checker
            .check_with(
                &request.bucket_name,
                &request.object_path,
                &request.checksum_algorithm_name,
                &mut observer,
            )
            .await;

        let err = match outcome {
            Ok(result) => match self.records.update(id, RecordUpdate::success(&result)).await {
                Ok(record) => {
                    tracing::info!(id, %topic, digest = %result.hexdigest, size = result.size_bytes, "fixity check succeeded");
                    self.broadcaster
                        .publish(&topic, &FixityCheckEvent::Complete(request.report(result)));
                    return Ok(record);
                }
                Err(err) => {
                    tracing::warn!(%err, id, %topic, "failed to store fixity check result");
                    err
                }
            },
            Err(err) => {
                tracing::warn!(%err, id, %topic, "fixity check failed");
                err
            }
        };

        self.fail(id, &topic, &request, err.to_string()).await
    }

    /// Store `failure` and broadcast the `error` event, whether or not the
    /// store accepted it.
    async fn fail(
        &self,
        id: RecordId,
        topic: &str,
        request: &CheckRequest,
        message: String,
    ) -> Result<FixityCheckRecord> {
        let stored = self.records.update(id, RecordUpdate::failure(&message)).await;
        if let Err(err) = &stored {
            tracing::error!(%err, id, topic, "failed to store fixity check failure");
        }
        self.broadcaster
            .publish(topic, &FixityCheckEvent::Error(request.failure(message)));
        stored
    }
}

/// Heartbeat side of a run: touches the record and broadcasts `in_progress`
/// whenever the throttle allows.
struct ProgressObserver<'a, R, B> {
    id:          RecordId,
    topic:       &'a str,
    records:     &'a R,
    broadcaster: &'a B,
    throttle:    ProgressThrottle,
}

impl<R: RecordStore, B: Broadcaster> ChunkObserver for ProgressObserver<'_, R, B> {
    async fn on_chunk(&mut self, event: ChunkEvent<'_>) {
        if !self.throttle.should_emit(Instant::now()) {
            return;
        }

        tracing::debug!(id = self.id, topic = self.topic, bytes_read = event.bytes_read, "fixity check heartbeat");
        if let Err(err) = self.records.update(self.id, RecordUpdate::touch()).await {
            tracing::warn!(%err, id = self.id, "failed to refresh fixity check record");
        }
        self.broadcaster.publish(self.topic, &FixityCheckEvent::InProgress);
    }
}
