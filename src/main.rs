use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use custom_error_pages::cli::Cli;
use custom_error_pages::http::HttpServer;
use custom_error_pages::lifecycle::{wait_for_signal, Shutdown};
use custom_error_pages::observability::{init_logging, MetricsSink, NoopSink, PrometheusSink};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.resolve()?;

    init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "custom-error-pages starting"
    );
    tracing::info!(
        bind_address = %config.listener.bind_address,
        template_directory = %config.pages.template_directory.display(),
        template_policy = ?config.pages.template_policy,
        hide_details = config.pages.hide_details,
        metrics_enabled = config.observability.metrics_enabled,
        "Configuration loaded"
    );

    let metrics: Arc<dyn MetricsSink> = if config.observability.metrics_enabled {
        Arc::new(PrometheusSink::new()?)
    } else {
        Arc::new(NoopSink)
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    HttpServer::new(config, metrics)
        .run(listener, server_shutdown)
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
