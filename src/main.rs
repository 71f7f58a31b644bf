//! Lazy Sleep - schedule a delayed shutdown and watch it count down
//!
//! This is the main entry point: it wires the session to the OS shutdown
//! command and exposes the control API for the front-end.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use lazy_sleep::{
    api::{create_router, AppContext},
    config::Config,
    services::{
        check_shutdown_available, local_username, DryRunShutdown, PromptBoard, RemoteWindow,
        ShutdownAction, SystemClock, SystemShutdown, ThemeStore,
    },
    state::{Collaborators, Session},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("lazy_sleep={},tower_http=info", config.log_level()))
        .init();

    info!("Starting lazy-sleep v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, dry_run={}, fire_grace={}s",
        config.host, config.port, config.dry_run, config.fire_grace
    );

    let shutdown: Arc<dyn ShutdownAction> = if config.dry_run {
        Arc::new(DryRunShutdown)
    } else {
        if let Err(e) = check_shutdown_available().await {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
        Arc::new(SystemShutdown)
    };

    let prompts = Arc::new(PromptBoard::new(config.prompt_timeout()));
    let window = Arc::new(RemoteWindow::new());

    let session = Session::new(
        Collaborators {
            shutdown,
            dialogs: prompts.clone(),
            window: window.clone(),
            clock: Arc::new(SystemClock),
        },
        config.session_settings(),
    );
    session.start();

    let context = Arc::new(AppContext::new(
        Arc::clone(&session),
        prompts,
        window,
        ThemeStore::new(config.config_dir()),
        &local_username(),
        config.host.clone(),
        config.port,
    ));
    let app = create_router(context);

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Control API running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /input/source  - Switch between slider and custom input");
    info!("  POST /input/slider  - Move the preset slider");
    info!("  POST /input/custom  - Set custom hours/minutes");
    info!("  POST /schedule      - Schedule the shutdown");
    info!("  POST /cancel        - Cancel the scheduled shutdown");
    info!("  POST /presence      - Enable/disable invisibility");
    info!("  POST /window/*      - Report pointer and window bounds");
    info!("  GET  /prompt        - Pending confirmation (POST /prompt/:id to answer)");
    info!("  GET  /status        - Current session state");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    session.close();
    info!("lazy-sleep stopped");
    Ok(())
}
