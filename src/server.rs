use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::BoardResult;
use crate::handlers::{self, AppState};

const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";

pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]);

        Router::new()
            .route("/leaderboard/top14", get(handlers::current_leaderboard))
            .route("/leaderboard/prev", get(handlers::previous_leaderboard))
            .route("/health", get(handlers::health))
            .layer(cors)
            // CorsLayer only sends these on preflight, clients expect them on every response.
            .layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static(ALLOWED_METHODS),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static("content-type"),
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    pub async fn serve(self, addr: &str) -> BoardResult<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Running on {}", addr);

        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}
