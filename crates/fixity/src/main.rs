use clap::Parser;
use fixity_check::ConfiguredService;
use fixity_check::config::Settings;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let service = ConfiguredService::from_settings(&settings)?;

    let code = match cli.command {
        Command::Check(cmd) => cmd.run(&service).await?,
        Command::Run(cmd) => cmd.run(&service).await?,
        Command::Show(cmd) => cmd.run(&service).await?,
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` wins over
/// `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fixity={level},fixity_check={level}")));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
