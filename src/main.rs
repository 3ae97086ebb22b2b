use homework_bot::{Error, logging};
use log::{error, info};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    if let Err(e) = logging::init() {
        eprintln!("Failed to initialize logging: {e}");
    }

    let token = CancellationToken::new();
    let shutdown = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C, shutting down");
            shutdown.cancel();
        }
    });

    match homework_bot::start(|key| dotenvy::var(key).ok(), token).await {
        // Already logged at startup
        Ok(()) | Err(Error::MissingCredential(_)) => {}
        Err(e) => error!("Homework monitoring failed: {e}"),
    }
}
