use habit_tracker_backend::{config, create_router, initialize_backend, logging};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();

    let config = config::load_config()?;
    let cors_origin = config.cors_origin()?;

    let app_state = initialize_backend(&config).await?;
    let app = create_router(app_state, cors_origin);

    let addr = config.bind_address();
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
