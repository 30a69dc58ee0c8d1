//! Maintenance Desk binary entry point

use maintenance_desk::api::AuthGateway;
use maintenance_desk::service::FocusController;
use maintenance_desk::{DeskContext, config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application entry point
///
/// # Setup
/// 1. Load configuration from file and environment
/// 2. Initialize tracing/logging from `config.logging`
/// 3. Initialize metrics
/// 4. Initialize DeskContext (restores the session)
/// 5. Open the dashboard and run one focus refresh
/// 6. Log the summary and the filtered ticket list
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration
    let config = config::AppConfig::load()?;

    // 2. Initialize tracing/logging; RUST_LOG still wins when set
    init_tracing(&config.logging);
    tracing::info!("Starting Maintenance Desk...");
    tracing::info!(
        base_url = %config.api.base_url,
        filter = %config.dashboard.default_filter,
        "Configuration loaded"
    );

    // 3. Initialize metrics
    maintenance_desk::metrics::init_metrics();

    // 4. Initialize context
    let context = DeskContext::new(config).await?;
    if !context.session.is_authenticated().await {
        tracing::warn!("No stored session; requests will be sent without a token");
    } else if let Err(e) = AuthGateway::new(context.api.clone()).me().await {
        tracing::warn!(error = %e, "Could not load the signed-in user");
    }

    // 5. Dashboard
    let mut dashboard = FocusController::new(context.dashboard());
    dashboard.on_focus().await?;

    let screen = dashboard.screen();
    let summary = screen.summary();
    tracing::info!(
        total = summary.total,
        active = summary.active,
        resolved = summary.resolved,
        filter = %screen.filter(),
        "Tickets loaded"
    );

    for ticket in screen.visible() {
        tracing::info!(
            reference = %ticket.reference,
            status = %ticket.status.label(),
            priority = %ticket.priority,
            created = %ticket.created_display(),
            "{}",
            ticket.title
        );
    }

    dashboard.unmount();
    Ok(())
}

fn init_tracing(logging: &config::LoggingConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.filter_directive().into());

    if logging.is_json() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
