use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use fortune_bot::{
    config::Config,
    api::routes::create_router,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Load configuration
    let config = Config::load()?;
    let server_addr = config.server_addr;
    info!(
        addr = %server_addr,
        model = %config.llm.model,
        fetch_timeout = ?config.fetch_timeout,
        "configuration loaded"
    );

    // Create application state
    let app_state = AppState::from_config(&config)?;
    info!(signs = app_state.horoscope.catalog().len(), "horoscope sources ready");

    // Build the router with routes
    let app = create_router(app_state);

    // Create the listener
    let listener = TcpListener::bind(server_addr).await?;

    // Start the server
    info!(addr = %server_addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
