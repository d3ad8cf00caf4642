mod handlers;
use crate::ApiState;
use axum::routing::{get, post};
use axum::Router;
pub use handlers::*;
use std::sync::Arc;
use tokengate_auth::AuthLayer;
pub struct RestRouter {
    state: Arc<ApiState>,
}
impl RestRouter {
    pub fn new(state: Arc<ApiState>) -> Self {
        Self { state }
    }
    pub fn build(self) -> Router {
        let protected_routes = Router::new()
            .route("/protected", get(handlers::protected))
            .route_layer(AuthLayer::new(self.state.gate.clone()));
        let api_routes = Router::new()
            .route("/signin", post(handlers::signin))
            .route("/signout", post(handlers::signout))
            .merge(protected_routes)
            .with_state(self.state.clone());
        Router::new()
            .nest("/v1", api_routes)
            .route("/health", get(handlers::health))
    }
}
