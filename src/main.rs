pub mod analyze;
pub mod cert;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod download;
pub mod fingerprint;
pub mod harvest;
pub mod index;
pub mod log;
pub mod output;
pub mod scrape;
pub mod serial;
pub mod store;
pub mod time;
pub mod transport;
pub mod util;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    log::init_logger(&cli)?;
    tracing::debug!("rocascan v{} started at {}", env!("CARGO_PKG_VERSION"), time::get_sysdate());

    let no_stdout = cli.no_stdout;
    let output = cli.output.clone();
    let result = match cli.command {
        Command::Scan(args) => cmd::scan::run(args, no_stdout, output).await,
        Command::Analyze(args) => cmd::analyze::run(args, no_stdout, output),
        Command::Index(args) => cmd::index::run(args, no_stdout, output),
    };
    if let Err(e) = &result {
        tracing::error!("{:#}", e);
    }
    result
}
