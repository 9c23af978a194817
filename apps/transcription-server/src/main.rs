use anyhow::Result;
use clap::Parser;
use prometheus::Registry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{filter::EnvFilter, fmt::format::JsonFields, layer::SubscriberExt, util::SubscriberInitExt, Layer};
use transcription_queue::{CommandEngine, QueueManager, TranscriptionEngine};
use transcription_server::{app, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
	dotenvy::dotenv().ok();

	let config = Config::parse();
	config.validate().map_err(anyhow::Error::msg)?;

	init_tracing(&config)?;

	let engine: Arc<dyn TranscriptionEngine> = Arc::new(CommandEngine::new(config.whisper_cmd.clone(), config.whisper_args()));
	let registry = Registry::new();
	let manager = Arc::new(QueueManager::new(&config.queue, engine, &registry)?);
	manager.start();

	info!(
		workers = config.queue.queue_workers,
		max_queue_size = config.queue.max_queue_size,
		whisper_cmd = %config.whisper_cmd,
		"Starting transcription server"
	);

	let router = app(AppState::new(Arc::clone(&manager), registry), config.max_upload_bytes());
	let listener = TcpListener::bind(config.socket_addr()).await?;
	info!("listening on {}", listener.local_addr()?);

	let shutdown_token = CancellationToken::new();
	let signal_token = shutdown_token.clone();
	tokio::spawn(async move {
		wait_for_shutdown_signal().await;
		info!("Shutdown signal received (SIGTERM/SIGINT)");
		signal_token.cancel();
	});

	let server_token = shutdown_token.clone();
	axum::serve(listener, router)
		.with_graceful_shutdown(async move {
			server_token.cancelled().await;
		})
		.await?;
	info!("Server stopped accepting requests");

	// In-flight engine runs are bounded by the timeout; queued jobs are failed by the pool.
	match tokio::time::timeout(config.shutdown_timeout(), manager.shutdown()).await {
		Ok(()) => info!("Graceful shutdown completed"),
		Err(_) => error!(timeout_secs = config.shutdown_timeout_secs, "Shutdown timeout - abandoning in-flight jobs"),
	}

	Ok(())
}

async fn wait_for_shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = signal::ctrl_c().await {
			error!(error = %e, "Failed to listen for Ctrl+C");
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut sigterm) => {
				sigterm.recv().await;
			}
			Err(e) => {
				error!(error = %e, "Failed to install SIGTERM handler");
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		() = ctrl_c => {},
		() = terminate => {},
	}
}

fn init_tracing(config: &Config) -> Result<()> {
	let filter = match config.rust_log.as_deref() {
		Some(directives) => EnvFilter::try_new(directives)?,
		None => EnvFilter::new("info,tower_http=debug"),
	};

	tracing_subscriber::registry()
		.with(if config.log_json {
			Box::new(
				tracing_subscriber::fmt::layer()
					.fmt_fields(JsonFields::default())
					.event_format(tracing_subscriber::fmt::format().json().flatten_event(true).with_span_list(false))
					.with_filter(filter),
			) as Box<dyn Layer<_> + Send + Sync>
		} else {
			Box::new(
				tracing_subscriber::fmt::layer()
					.event_format(tracing_subscriber::fmt::format().pretty())
					.with_filter(filter),
			)
		})
		.try_init()?;
	Ok(())
}
