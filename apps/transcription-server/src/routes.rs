use crate::handlers::{health, jobs, metrics};
use crate::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn job_routes(max_upload_bytes: usize) -> Router<AppState> {
	Router::new()
		.route("/transcribe", post(jobs::submit).layer(DefaultBodyLimit::max(max_upload_bytes)))
		.route("/jobs/:id", get(jobs::status))
		.route("/jobs/:id/result", get(jobs::result))
		.route("/queue", get(jobs::queue_info))
}

pub fn service_routes() -> Router<AppState> {
	Router::new()
		.route("/", get(health::root))
		.route("/health", get(health::health))
		.route("/metrics", get(metrics::metrics_handler))
}

/// Full application router. Any origin may call it, as browsers upload directly.
pub fn app(state: AppState, max_upload_bytes: usize) -> Router {
	Router::new()
		.merge(job_routes(max_upload_bytes))
		.merge(service_routes())
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive())
		.with_state(state)
}
