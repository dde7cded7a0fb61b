//! `emo` - BOCCO emo Platform API from the command line.

use clap::Parser;
use emo_app::utils::logging;
use emo_app::Cli;
use tracing::debug;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();
    logging::init_tracing();
    match dotenv {
        Ok(path) => debug!(path = %path.display(), "Loaded .env"),
        Err(e) => debug!(error = %e, "No .env loaded"),
    }

    let cli = Cli::parse();
    if let Some(output) = emo_app::run(cli).await? {
        println!("{}", serde_json::to_string_pretty(&output)?);
    }
    Ok(())
}
