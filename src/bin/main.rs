//! Barque IMAP server binary

use barque::repository::sqlite::SqliteRepository;
use barque::server::ImapServer;
use futures::prelude::*;
use signal_hook::consts::signal::*;
use signal_hook_tokio::Signals;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let data_dir = PathBuf::from("./data");
    let db_path = data_dir.join("mails.db");

    std::fs::create_dir_all(&data_dir)?;

    log::info!("Opening mail store at {}", db_path.display());
    let repository = SqliteRepository::new(&db_path).await?;

    log::info!("Seeding sample messages if the store is empty...");
    repository.seed_sample_messages().await?;

    let server = ImapServer::new(repository);

    let addr = "127.0.0.1:1143";
    log::info!("Starting IMAP server on {}", addr);
    log::info!("Any non-empty username and password are accepted");

    // Set up signal handling for graceful shutdown
    let signals = Signals::new([SIGTERM, SIGINT, SIGHUP])?;
    let handle = signals.handle();

    let _server_task = tokio::spawn(async move {
        if let Err(e) = server.listen(addr).await {
            log::error!("IMAP server error: {}", e);
        }
    });

    // Wait for shutdown signal
    let mut signals = signals.fuse();
    if let Some(signal) = signals.next().await {
        let signal_name = match signal {
            SIGTERM => "SIGTERM",
            SIGINT => "SIGINT",
            SIGHUP => "SIGHUP",
            _ => "unknown signal",
        };
        log::info!(
            "Received {} signal, initiating graceful shutdown...",
            signal_name
        );
    }

    handle.close();

    log::info!("Shutdown complete");
    Ok(())
}
