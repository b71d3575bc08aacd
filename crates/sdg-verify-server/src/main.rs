//! SDG verification HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use sdgverify::config::Config;
use sdgverify::lifecycle::ServiceLifecycle;
use sdgverify::service::VerificationService;
use sdgverify_server::gateway::{HandlerState, HealthResponse, create_router_with_state};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        mode = ?config.pipeline_mode,
        max_upload_bytes = config.max_upload_bytes,
        "SDG verification service starting"
    );

    let lifecycle = Arc::new(ServiceLifecycle::new());
    let app = create_router_with_state(HandlerState::from_config(&config, lifecycle.clone()));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    spawn_model_loading(config, lifecycle.clone());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(lifecycle))
        .await?;

    tracing::info!("SDG verification service shutdown complete");
    Ok(())
}

/// Loads the models off the async runtime and flips the ready flag once.
/// Until then (or if loading fails) submissions get 503.
fn spawn_model_loading(config: Config, lifecycle: Arc<ServiceLifecycle<VerificationService>>) {
    tokio::task::spawn_blocking(move || {
        tracing::info!("Loading models...");
        match VerificationService::load(&config) {
            Ok(service) => {
                if let Err(e) = lifecycle.mark_ready(service) {
                    tracing::warn!(error = %e, "Models loaded after shutdown began");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load models; service stays unavailable");
            }
        }
    });
}

/// `0` when the local server answers `/health` with `service_ready: true`.
fn run_health_check() -> i32 {
    let port = std::env::var(Config::ENV_PORT)
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8000);

    let url = format!("http://127.0.0.1:{}/health", port);

    let Ok(rt) = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    else {
        return 1;
    };

    rt.block_on(async {
        let Ok(client) = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
        else {
            return 1;
        };

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => match res.json::<HealthResponse>().await {
                Ok(health) if health.service_ready => 0,
                _ => 1,
            },
            _ => 1,
        }
    })
}

async fn shutdown_signal(lifecycle: Arc<ServiceLifecycle<VerificationService>>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }

    lifecycle.teardown();
}
