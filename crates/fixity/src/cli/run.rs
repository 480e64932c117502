use std::sync::Arc;

use clap::Args;
use fixity_check::ConfiguredService;
use fixity_check::data::{CheckRequest, FixityCheckEvent, FixityCheckStatus};
use tokio::sync::broadcast::{self, error::RecvError};

use super::{Target, print_json};

/// Record a check, run it here and stream its events as JSON lines.
///
/// The final record is printed last.
#[derive(Debug, Args)]
pub struct Run {
    #[command(flatten)]
    pub target: Target,

    /// Job identifier; a UUID is generated when omitted.
    #[arg(long)]
    pub job_id: Option<String>,
}

impl Run {
    pub async fn run(self, service: &ConfiguredService) -> anyhow::Result<i32> {
        let record = service
            .register(CheckRequest::from(self.target), self.job_id)
            .await?;
        tracing::info!(id = record.id, job = %record.job_identifier, "registered fixity check");

        let printer = service
            .subscribe(&record.job_identifier)
            .map(|rx| tokio::spawn(print_events(rx)));

        let outcome = service.run(record.id).await;
        if let Some(printer) = printer {
            // A terminal event closes the topic; a run that never started
            // leaves it open and the printer waiting.
            if outcome.is_err() && topic_open(service, &record.job_identifier) {
                printer.abort();
            } else if let Err(err) = printer.await {
                tracing::warn!(%err, "event printer failed");
            }
        }
        service.unsubscribe(&record.job_identifier);

        let record = outcome?;
        print_json(&record)?;
        Ok(if record.status == FixityCheckStatus::Success { 0 } else { 1 })
    }
}

fn topic_open(service: &ConfiguredService, job_identifier: &str) -> bool {
    service
        .topic(job_identifier)
        .is_some_and(|topic| service.job().broadcaster().subscriber_count(&topic) > 0)
}

/// Print messages until the run's terminal event.
async fn print_events(mut rx: broadcast::Receiver<Arc<str>>) {
    loop {
        match rx.recv().await {
            Ok(message) => {
                println!("{message}");
                let terminal = serde_json::from_str::<FixityCheckEvent>(&message)
                    .is_ok_and(|event| event.is_terminal());
                if terminal {
                    return;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "missed fixity check events");
            }
            Err(RecvError::Closed) => return,
        }
    }
}
