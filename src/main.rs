mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use devthoughts::config::{Cli, Config};
use devthoughts::{ApiClient, ClientError, SessionStore};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging; stderr keeps command output clean
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        report(&e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let data_dir = Config::data_dir(&cli);
    std::fs::create_dir_all(&data_dir)?;
    tracing::debug!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;
    let session = SessionStore::open(&config.session_path())?;
    let client = ApiClient::new(&config, session)?;
    tracing::debug!(base_url = %client.base_url(), "API client ready");

    commands::run(&client, cli.command).await
}

fn report(e: &anyhow::Error) {
    match e.downcast_ref::<ClientError>() {
        Some(client_error) => {
            eprintln!("error: {}", client_error.user_message());
            match client_error.field_errors() {
                Some(fields) if fields.len() > 1 => {
                    for (field, message) in fields.iter() {
                        eprintln!("  {}: {}", field, message);
                    }
                }
                _ => {}
            }
        }
        None => eprintln!("error: {:#}", e),
    }
}
