use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use fixity_check::data::CheckRequest;
use serde::Serialize;

mod check;
mod run;
mod show;

#[derive(Debug, Parser)]
#[command(name = "fixity", version = env!("CARGO_PKG_VERSION"), about = "Verify the fixity of stored objects", propagate_version = true)]
pub struct Cli {
    /// TOML settings file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase logging (-vv reaches trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(alias = "c", name = "check")]
    Check(check::Check),
    #[command(alias = "r", name = "run")]
    Run(run::Run),
    #[command(alias = "s", name = "show")]
    Show(show::Show),
}

/// Object and algorithm shared by `check` and `run`.
#[derive(Debug, Clone, Args)]
pub struct Target {
    #[arg(long)]
    pub bucket: String,

    #[arg(long)]
    pub path: String,

    /// sha256, sha512, md5 or crc32c.
    #[arg(long, default_value = "sha256")]
    pub algorithm: String,
}

impl From<Target> for CheckRequest {
    fn from(target: Target) -> Self { CheckRequest::new(target.bucket, target.path, target.algorithm) }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
