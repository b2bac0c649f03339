mod charts;
mod clients;
mod config;
mod error;
mod filters;
mod forms;
mod helpers;
mod models;
mod page;
mod pagination;
mod routes;
mod session;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use clients::BackendClient;
use session::CookieSettings;
use state::ViewStore;

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<BackendClient>,
    pub views: Arc<ViewStore>,
    pub config: Arc<config::Config>,
}

impl AppState {
    pub fn new(config: config::Config, backend: BackendClient) -> Self {
        Self {
            backend: Arc::new(backend),
            views: Arc::new(ViewStore::new(config.view_ttl())),
            config: Arc::new(config),
        }
    }

    pub fn cookies(&self) -> CookieSettings {
        CookieSettings::from_config(&self.config)
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("fleet_console=info")),
        )
        .init();

    let config_path = std::env::args()
        .skip(1)
        .zip(std::env::args().skip(2))
        .find_map(|(k, v)| (k == "-config" || k == "--config").then_some(v))
        .or_else(|| std::env::args().nth(1).filter(|a| !a.starts_with('-')))
        .unwrap_or_else(|| "/etc/fleet-console/config.yaml".to_string());

    let cfg = config::Config::load(&PathBuf::from(&config_path)).unwrap_or_else(|e| {
        eprintln!("error loading config {}: {}", config_path, e);
        std::process::exit(1);
    });

    let backend = BackendClient::new(cfg.backend.base_url.clone(), cfg.backend_timeout()).unwrap_or_else(|e| {
        eprintln!("failed to build backend client: {}", e);
        std::process::exit(1);
    });
    info!("using backend {}", backend.base_url());

    let state = AppState::new(cfg, backend);

    // Shutdown signal
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(());

    // Expire idle page views
    let views = state.views.clone();
    tokio::spawn(async move {
        views.run_sweeper(shutdown_rx).await;
    });

    let listen_addr = state.config.listen_addr();
    let router = routes::build_router(state);

    let listener = TcpListener::bind(&listen_addr).await.unwrap_or_else(|e| {
        eprintln!("failed to bind {}: {}", listen_addr, e);
        std::process::exit(1);
    });

    info!("fleet-console listening on {}", listen_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(());
        })
        .await
        .unwrap_or_else(|e| {
            eprintln!("server error: {}", e);
            std::process::exit(1);
        });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl+c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {}", e);
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
