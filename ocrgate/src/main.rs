use clap::Parser;

use ocrgate::api::{create_router, AppState};
use ocrgate::config::Config;
use ocrgate::logging::init_logging;
use ocrgate::vision::VisionProvider;

#[derive(Parser)]
#[command(name = "ocrgate")]
#[command(about = "HTTP gateway for image text extraction with a hosted vision model")]
struct Args {
    /// Validate configuration, print the summary and exit
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    let config = Config::from_env();
    init_logging(&config.logging)?;

    if let Err(errors) = config.validate() {
        for error in &errors {
            tracing::error!("Configuration Error: {}", error);
        }
        return Err(anyhow::anyhow!("Configuration validation failed!"));
    }

    config.log_summary();

    if args.check_config {
        return Ok(());
    }

    let vision = VisionProvider::new(&config.vision)?;
    tracing::info!("Vision model configured: {}", config.vision.model);

    let addr = config.server.bind_addr();
    tracing::info!("Starting {} v{}", config.app.name, config.app.version);

    let state = AppState::new(config, vision);
    let app = create_router(state);

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("  API docs: http://{}/docs", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping server...");
}
