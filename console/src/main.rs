use anyhow::Result;
use arcade_console::backend::{initialize_backend, AppState};
use log::{error, info, warn};
use tracing_subscriber::EnvFilter;

const USERNAME_ENV: &str = "ARCADE_CONSOLE_USERNAME";
const PASSWORD_ENV: &str = "ARCADE_CONSOLE_PASSWORD";
const WATCH_ENV: &str = "ARCADE_CONSOLE_WATCH";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut app_state = initialize_backend()?;
    info!("Data directory: {}", app_state.store.base_directory().display());

    sign_in(&mut app_state).await;
    info!("Status: {}", app_state.coordinator.status_summary());

    if std::env::var(WATCH_ENV).map(|v| v == "1").unwrap_or(false) {
        watch(app_state).await;
    }

    Ok(())
}

/// Resume a stored session, or sign in with credentials from the environment
async fn sign_in(app_state: &mut AppState) {
    let coordinator = &mut app_state.coordinator;

    if let Some(session) = coordinator.session() {
        info!("Resuming session for {} ({})", session.username, session.role);
        coordinator.refresh_all().await;
        return;
    }

    let (Ok(username), Ok(password)) = (std::env::var(USERNAME_ENV), std::env::var(PASSWORD_ENV)) else {
        warn!("Not signed in; set {} and {} to sign in", USERNAME_ENV, PASSWORD_ENV);
        return;
    };

    match coordinator.login(&username, &password).await {
        Ok(session) => info!("Signed in as {} with role {}", session.username, session.role),
        Err(e) => error!("Sign-in failed: {}", e),
    }
}

/// Follow changes made by other console instances until Ctrl-C
async fn watch(mut app_state: AppState) {
    let (handle, mut changes) = app_state.storage_watcher().spawn();
    info!("Watching for changes from other consoles (Ctrl-C to stop)");

    loop {
        tokio::select! {
            change = changes.recv() => {
                let Some(change) = change else { break };
                app_state.coordinator.apply_storage_change(change);
                info!("Status: {}", app_state.coordinator.status_summary());
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }

        app_state.coordinator.expire_undo();
    }

    handle.abort();
}
