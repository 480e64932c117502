use clap::Args;
use fixity_check::ConfiguredService;
use fixity_check::data::RecordId;

use super::print_json;

/// Print a stored fixity check record.
#[derive(Debug, Args)]
pub struct Show {
    pub id: RecordId,
}

impl Show {
    pub async fn run(self, service: &ConfiguredService) -> anyhow::Result<i32> {
        let record = service.show(self.id).await?;
        print_json(&record)?;
        Ok(0)
    }
}
