mod api;
mod auth;
mod config;
mod state;
mod utils;

use std::sync::Arc;

use api::app_router;
use auth::AdminAuth;
use catalog::Catalog;
use config::{apply_env_overrides, config_path_from_env, load_or_create_config, resolve_path};
use state::AppState;
use tower_http::request_id::{MakeRequestUuid, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config_path = config_path_from_env();
    let (mut config, created) = load_or_create_config(&config_path)?;
    if created {
        info!("Created default config at {:?}", config_path);
    } else {
        info!("Loaded config from {:?}", config_path);
    }
    apply_env_overrides(&mut config);

    if !config.admin_configured() {
        warn!(
            "Admin credentials are not configured; set admin_username, admin_password_hash \
             and jwt_secret (or ADMIN_USERNAME, ADMIN_PASSWORD_HASH and JWT_SECRET) to enable writes."
        );
    }
    if config.production {
        info!("Running in production mode");
    }

    let data_dir = resolve_path(&config_path, config.data_dir.trim());
    let media_root = resolve_path(&config_path, config.media_root.trim());
    if !media_root.exists() {
        warn!("Media root {:?} does not exist; /public will serve nothing", media_root);
    }
    let catalog = Catalog::open(&data_dir)?.with_media_root(media_root);
    info!("Catalog data in {:?}", data_dir);

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let state = AppState {
        catalog,
        auth: AdminAuth::from_config(&config),
        config: Arc::new(config),
    };

    let app = app_router(state)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on {}", bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = match signal(SignalKind::terminate()) {
            Ok(signal) => signal,
            Err(err) => {
                warn!("Failed to install terminate signal handler: {}", err);
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for ctrl-c: {}", err);
        }
    }

    info!("Shutdown signal received.");
}
