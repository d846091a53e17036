//! RBW CLI - river biodiversity and water-quality scoring from the command line.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "rbw-cli",
    version,
    about = "River biodiversity and water-quality scoring toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: rbw_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("rbw-cli {}", env!("CARGO_PKG_VERSION"));
    rbw_cmd::run(cli.command).await
}
