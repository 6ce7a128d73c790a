use axum::Router;
use axum_server::Handle;
use std::{net::SocketAddr, time::Duration};
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Serve `app` on every interface until Ctrl-C, letting in-flight
/// requests finish within `SHUTDOWN_GRACE`
pub(crate) fn spawn_http_server(port: u16, app: Router) -> JoinHandle<()> {
    let handle = Handle::new();

    let shutdown = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutting down");
            shutdown.graceful_shutdown(Some(SHUTDOWN_GRACE));
        }
    });

    tokio::spawn(async move {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        tracing::info!(%addr, "Qepo listening");
        if let Err(e) = axum_server::bind(addr)
            .handle(handle)
            .serve(app.into_make_service())
            .await
        {
            tracing::error!(error = %e, "HTTP server stopped");
        }
    })
}

pub(crate) fn init_tracing(app_name: &str) {
    let default_filter = if cfg!(debug_assertions) {
        format!("qepo_axum=debug,qepo=debug,{app_name}=debug,tower_http=info,info")
    } else {
        "info".to_string()
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
