use crate::app_config::AppConfig;
use crate::http::router;
use crate::store::LocationStore;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, instrument};

#[instrument(skip_all)]
pub async fn serve(config: Arc<AppConfig>, store: Arc<dyn LocationStore>) -> Result<(), ServerError> {
    let address = config.server().address();
    info!("🌐 Binding to {}...", address);
    let listener = TcpListener::bind(&address).await.map_err(|source| ServerError::Bind {
        address: address.clone(),
        source,
    })?;
    info!("🌐 Binding to {}... OK", address);

    let app = router(config, store).into_make_service_with_connect_info::<SocketAddr>();
    info!("🔥 {} is up and running", env!("CARGO_PKG_NAME"));

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await.map_err(ServerError::Serve)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("🛑 Received Ctrl+C, shutting down"),
            Err(err) => {
                error!("🔴 Could not listen for Ctrl+C: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("🛑 Received terminate signal, shutting down");
            }
            Err(err) => {
                error!("🔴 Could not listen for the terminate signal: {}", err);
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
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("could not bind to {address}: {source}")]
    Bind { address: String, source: io::Error },
    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}
