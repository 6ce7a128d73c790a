mod server;

use qepo_axum::{AuthEvent, qepo_router, subscribe_auth_events};
use tokio::sync::broadcast::error::RecvError;

use server::{init_tracing, spawn_http_server};

/// Log sign-ups, sign-ins and sign-outs as the auth provider reports them
fn spawn_auth_event_logger() {
    let mut events = subscribe_auth_events();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(AuthEvent::SignedUp { user_id }) => tracing::info!(user_id = %user_id, "User signed up"),
                Ok(AuthEvent::SignedIn { user_id }) => tracing::info!(user_id = %user_id, "User signed in"),
                Ok(AuthEvent::SignedOut) => tracing::info!("User signed out"),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Auth event logger fell behind")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing("demo_qepo");

    qepo_axum::init().await?;
    spawn_auth_event_logger();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3001);

    spawn_http_server(port, qepo_router()).await?;
    Ok(())
}
