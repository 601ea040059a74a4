use std::path::PathBuf;
use bucket_store::config::{Backend, Config};
use bucket_store::sdk;
use clap::Parser;
use log::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    #[arg(short, long)]
    backend: Option<String>,
}

#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let backend = args.backend.map(|b| b.parse::<Backend>()).transpose()?;
    let config = Config::from_env()?.with_overrides(args.data_dir, backend)?;

    env_logger::Builder::new()
        .filter_level(config.log_level)
        .parse_default_env()
        .init();

    let store = sdk::new(&config)?;
    info!(
        "Bucket store started: backend={} data_dir={} buckets={}",
        config.backend,
        config.data_dir.display(),
        store.buckets()?.len()
    );

    let waited = shutdown_signal().await;
    info!("Shutdown signal received. Closing store...");

    if let Err(e) = store.close() {
        error!("Failed to close store: {}", e);
        return Err(e.into());
    }
    info!("Store closed. Exiting.");

    waited?;
    Ok(())
}
