use std::sync::Arc;
use std::time::Instant;

use structopt::StructOpt;

use measurelog::chart::PngRenderer;
use measurelog::cliopt::CliOpt;
use measurelog::http::app_server::{AppServer, AppState};
use measurelog::store::{FileStore, TokenRegistry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let now = Instant::now();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let opt = CliOpt::from_args();
    opt.validate()?;

    let store = Arc::new(FileStore::open(&opt.data_dir)?);
    let tokens = Arc::new(TokenRegistry::open(&opt.data_dir)?);
    let renderer = Arc::new(PngRenderer::new(opt.chart_width, opt.chart_height)?);

    let app = AppServer::new(AppState::new(store, tokens, renderer, &opt.base_url));

    let listener = tokio::net::TcpListener::bind(opt.listen).await?;

    tracing::info!("Server started in {}ms", now.elapsed().as_millis());
    tracing::info!("Server listening on {}", opt.listen);

    axum::serve(listener, app.router)
        .with_graceful_shutdown(shutdown())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

async fn shutdown() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping server...");
}
