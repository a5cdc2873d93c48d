mod audio;
mod capture;
mod cli;
mod config;
mod deck;
mod dictionary;
mod forvo;
mod git;
mod http;
mod lang;
mod translate;

pub const USER_AGENT: &str = concat!("vocab/", env!("CARGO_PKG_VERSION"));

use clap::Parser;
use tracing::info;

use capture::{Services, format_detection, format_report};
use cli::Cli;
use config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = if cli.verbose { "vocab=debug" } else { "vocab=warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.parse()?),
        )
        .init();

    let mut config = Config::from_env();
    if let Some(repo) = &cli.repo {
        config.repo_dir = repo.clone();
    }

    let services = Services::from_config(&config, http::build_client()?);

    if cli.detect {
        let detection = services.detect(&cli.term()).await;
        println!("{}", format_detection(&detection));
        return Ok(());
    }

    let report = services
        .capture(&config, &cli.request())
        .await
        .inspect_err(|e| tracing::error!("capture failed: {e}"))?;

    print!("{}", format_report(&report));
    info!(file = %report.deck_file.display(), "done");
    Ok(())
}
