use clap::Parser;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ga4ghr::{
    Config,
    datamodel::{DataRepository, load_reference_set},
    handlers::{AppState, create_router},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| config.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build the data repository
    let mut repository = DataRepository::simulated(&config.simulation_params())?;
    if let Some(path) = &config.reference_fasta {
        repository.add_reference_set(load_reference_set(path)?)?;
    }
    tracing::info!(
        datasets = repository.datasets().len(),
        reference_sets = repository.reference_sets().len(),
        "Data repository ready"
    );

    let state = AppState::new(
        repository,
        config.max_response_length,
        config.default_page_size,
    );
    let app = create_router(state);

    let app = if config.cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    };

    let addr = config.bind_address();
    tracing::info!("Starting ga4ghr server on {}", addr);
    tracing::info!("Max response length: {} bytes", config.max_response_length);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
