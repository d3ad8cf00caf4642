use std::sync::Arc;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use tokengate_auth::AuthGate;

use crate::rest::RestRouter;

#[derive(Clone)]
pub struct ApiState {
    pub gate: Arc<AuthGate>,
}

impl ApiState {
    pub fn new(gate: Arc<AuthGate>) -> Self {
        Self { gate }
    }
}

pub struct ApiRouter {
    state: Arc<ApiState>,
    cors_origin: Option<String>,
}

impl ApiRouter {
    pub fn new(state: Arc<ApiState>) -> Self {
        Self {
            state,
            cors_origin: None,
        }
    }

    /// Origin allowed to make credentialed cross-origin calls. Without one,
    /// no CORS headers are sent.
    pub fn with_cors_origin(mut self, origin: impl Into<String>) -> Self {
        self.cors_origin = Some(origin.into());
        self
    }

    pub fn build(self) -> Router {
        let app = RestRouter::new(self.state.clone()).build();

        let cors = match self
            .cors_origin
            .as_deref()
            .and_then(|origin| HeaderValue::from_str(origin).ok())
        {
            Some(origin) => CorsLayer::new()
                .allow_origin(AllowOrigin::exact(origin))
                .allow_credentials(true)
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::PUT])
                .allow_headers([
                    HeaderName::from_static("x-requested-with"),
                    CONTENT_TYPE,
                    AUTHORIZATION,
                ]),
            None => CorsLayer::new(),
        };

        app.layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
    }
}
