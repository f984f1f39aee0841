use clap::Parser;

use fxpeer::adapter::inbound::cli::{self, command::Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    cli::run(cli).await?;
    Ok(())
}
