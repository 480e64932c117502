//! End-to-end fixity checks: filesystem objects, sled records and channel
//! subscribers wired together the way a deployment is.

use std::num::NonZeroU64;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use fixity_check::config::{DatabaseSettings, Settings, StoreSettings};
use fixity_check::core::ProgressPolicy;
use fixity_check::data::{CheckRequest, FixityCheckEvent, FixityCheckStatus};
use fixity_check::{
    ChannelBroadcaster, ConfiguredService, Error, FixityCheckJob, FixityChecker, FixityService,
    FsObjectStore, JobOptions, MemoryObjectStore, MemoryRecordStore, RecordStore, SledRecordStore,
};
use sha2::{Digest, Sha256, Sha512};

fn write_object(root: &Path, bucket: &str, path: &str, data: &[u8]) {
    let file = root.join(bucket).join(path);
    std::fs::create_dir_all(file.parent().unwrap()).unwrap();
    std::fs::write(file, data).unwrap();
}

fn settings(root: &Path, chunk_size: usize) -> Settings {
    Settings {
        stream_prefix: "it:".into(),
        progress: ProgressPolicy::every_chunks(NonZeroU64::new(10).unwrap()),
        store: StoreSettings::Fs {
            root: root.join("objects"),
            chunk_size,
        },
        database: DatabaseSettings {
            path: Some(root.join("records")),
        },
        ..Settings::default()
    }
}

async fn drain(rx: &mut tokio::sync::broadcast::Receiver<Arc<str>>) -> Vec<FixityCheckEvent> {
    let mut events = Vec::new();
    loop {
        let message = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("timed out waiting for events")
            .expect("channel closed");
        let event: FixityCheckEvent = serde_json::from_str(&message).unwrap();
        let done = event.is_terminal();
        events.push(event);
        if done {
            return events;
        }
    }
}

#[tokio::test]
async fn test_fs_object_sled_records_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let data: Vec<u8> = (0..25_600u32).map(|i| (i * 7 % 256) as u8).collect();
    write_object(&dir.path().join("objects"), "archive", "av/reel-01.mov", &data);

    let service = ConfiguredService::from_settings(&settings(dir.path(), 256)).unwrap();
    let mut rx = service.subscribe("reel-01").unwrap();

    let record = service
        .create(CheckRequest::new("archive", "av/reel-01.mov", "sha512"), Some("reel-01".into()))
        .await
        .unwrap();
    assert_eq!(record.status, FixityCheckStatus::Pending);

    // 100 chunks of 256 bytes, one heartbeat every 10 chunks.
    let events = drain(&mut rx).await;
    let heartbeats = events.iter().filter(|e| !e.is_terminal()).count();
    assert_eq!(heartbeats, 10);

    let expected = hex::encode(Sha512::digest(&data));
    match events.last().unwrap() {
        FixityCheckEvent::Complete(report) => {
            assert_eq!(report.bucket_name, "archive");
            assert_eq!(report.object_path, "av/reel-01.mov");
            assert_eq!(report.checksum_algorithm_name, "sha512");
            assert_eq!(report.checksum_hexdigest, expected);
            assert_eq!(report.object_size, data.len() as u64);
        }
        other => panic!("expected completion, got {other:?}"),
    }

    // The terminal event goes out after the record is persisted.
    let stored = service.show(record.id).await.unwrap();
    assert_eq!(stored.status, FixityCheckStatus::Success);
    assert_eq!(stored.checksum_hexdigest.as_deref(), Some(expected.as_str()));
    assert_eq!(stored.object_size, Some(data.len() as u64));
    assert!(stored.updated_at >= stored.created_at);

    // The terminal event already released the topic.
    assert_eq!(service.job().broadcaster().topic_count(), 0);
    assert!(!service.unsubscribe("reel-01"));
    drop(rx);
}

#[tokio::test]
async fn test_failure_is_broadcast_and_persisted() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("objects/archive")).unwrap();

    let service = ConfiguredService::from_settings(&settings(dir.path(), 1024)).unwrap();
    let mut rx = service.subscribe("lost").unwrap();
    let record = service
        .create(CheckRequest::new("archive", "gone.tif", "md5"), Some("lost".into()))
        .await
        .unwrap();

    let events = drain(&mut rx).await;
    assert_eq!(events.len(), 1);
    match &events[0] {
        FixityCheckEvent::Error(failure) => {
            assert_eq!(failure.error_message, "Could not find object: bucket=archive, path=gone.tif");
            assert_eq!(failure.checksum_algorithm_name, "md5");
        }
        other => panic!("expected error, got {other:?}"),
    }

    let stored = service.show(record.id).await.unwrap();
    assert_eq!(stored.status, FixityCheckStatus::Failure);
    assert_eq!(stored.checksum_hexdigest, None);
    assert_eq!(stored.object_size, None);
}

#[tokio::test]
async fn test_terminal_record_cannot_be_rerun() {
    let dir = tempfile::tempdir().unwrap();
    write_object(dir.path(), "bucket", "a.bin", b"hello world");

    let records = Arc::new(SledRecordStore::temporary().unwrap());
    let service = FixityService::new(FixityCheckJob::new(
        Arc::new(FixityChecker::new(FsObjectStore::new(dir.path()))),
        records.clone(),
        Arc::new(ChannelBroadcaster::default()),
        JobOptions::default(),
    ))
    .run_inline(true);

    let done = service
        .create(CheckRequest::new("bucket", "a.bin", "sha256"), None)
        .await
        .unwrap();
    assert_eq!(done.status, FixityCheckStatus::Success);
    assert_eq!(
        done.checksum_hexdigest.as_deref(),
        Some("b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9")
    );

    // Even after the object changes, the stored outcome stays.
    write_object(dir.path(), "bucket", "a.bin", b"bit rot");
    let err = service.run(done.id).await.unwrap_err();
    assert!(matches!(err, Error::InvalidTransition { from: FixityCheckStatus::Success, .. }));
    assert_eq!(records.find(done.id).await.unwrap(), Some(done));
}

#[tokio::test]
async fn test_concurrent_runs_do_not_interfere() {
    let store = MemoryObjectStore::new();
    let mut expected = Vec::new();
    for i in 0..8u8 {
        let data = vec![i; 4096 + usize::from(i)];
        expected.push(hex::encode(Sha256::digest(&data)));
        store.put("bucket", &format!("obj-{i}"), data, 100);
    }

    let service = FixityService::new(FixityCheckJob::new(
        Arc::new(FixityChecker::new(store)),
        Arc::new(MemoryRecordStore::new()),
        Arc::new(ChannelBroadcaster::default()),
        JobOptions::default(),
    ));

    let mut receivers = Vec::new();
    for i in 0..8u8 {
        let job = format!("job-{i}");
        let rx = service.subscribe(&job).unwrap();
        service
            .create(CheckRequest::new("bucket", format!("obj-{i}"), "sha256"), Some(job))
            .await
            .unwrap();
        receivers.push(rx);
    }

    for (i, mut rx) in receivers.into_iter().enumerate() {
        match drain(&mut rx).await.pop() {
            Some(FixityCheckEvent::Complete(report)) => {
                assert_eq!(report.object_path, format!("obj-{i}"));
                assert_eq!(report.checksum_hexdigest, expected[i]);
            }
            other => panic!("expected completion, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_check_now_is_side_effect_free() {
    let dir = tempfile::tempdir().unwrap();
    write_object(dir.path(), "bucket", "c.txt", b"123456789");

    let records = Arc::new(MemoryRecordStore::new());
    let service = FixityService::new(FixityCheckJob::new(
        Arc::new(FixityChecker::new(FsObjectStore::new(dir.path()).with_chunk_size(2))),
        records.clone(),
        Arc::new(ChannelBroadcaster::default()),
        JobOptions::default(),
    ));

    let report = service
        .check_now(&CheckRequest::new("bucket", "c.txt", "crc32c"))
        .await
        .unwrap();
    assert_eq!(report.checksum_hexdigest, "e3069283");
    assert_eq!(report.object_size, 9);

    let failure = service
        .check_now(&CheckRequest::new("bucket", "../c.txt", "crc32c"))
        .await
        .unwrap_err();
    assert_eq!(failure.object_path, "../c.txt");
    assert!(records.is_empty());
}
