use crate::AppState;
use axum::{extract::State, http::header::CONTENT_TYPE, http::StatusCode, response::IntoResponse};
use prometheus::{Encoder, TextEncoder};

pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
	// Sampled on scrape so the gauge is fresh even when nothing was submitted lately.
	state.manager.refresh_gauges();

	let encoder = TextEncoder::new();
	let mut buffer = Vec::new();
	match encoder.encode(&state.registry.gather(), &mut buffer) {
		Ok(()) => (StatusCode::OK, [(CONTENT_TYPE, encoder.format_type().to_owned())], buffer).into_response(),
		Err(e) => {
			tracing::error!("Failed to gather metrics: {}", e);
			(StatusCode::INTERNAL_SERVER_ERROR, "Failed to gather metrics").into_response()
		}
	}
}
