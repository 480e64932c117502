use clap::Args;
use fixity_check::ConfiguredService;
use fixity_check::data::CheckRequest;

use super::{Target, print_json};

/// Check an object now and print the report.
///
/// Exits with 1 and prints the failure, request included, when the check fails.
#[derive(Debug, Args)]
pub struct Check {
    #[command(flatten)]
    pub target: Target,
}

impl Check {
    pub async fn run(self, service: &ConfiguredService) -> anyhow::Result<i32> {
        let request = CheckRequest::from(self.target);
        match service.check_now(&request).await {
            Ok(report) => {
                print_json(&report)?;
                Ok(0)
            }
            Err(failure) => {
                print_json(&failure)?;
                Ok(1)
            }
        }
    }
}
