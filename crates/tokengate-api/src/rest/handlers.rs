use std::sync::Arc;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Serialize;
use tokengate_auth::Authenticated;
use tokengate_core::{Claims, Error, IssueTokenRequest, IssueTokenResponse};
use crate::ApiState;
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
/// Maps gate errors onto HTTP. Authentication failures all look alike and
/// backend details stay in the logs.
#[derive(Debug)]
pub struct ApiError(pub Error);
impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            Error::Validation(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),
            Error::MalformedHeader(_) | Error::NotFound => {
                (StatusCode::UNAUTHORIZED, "unauthorized".to_string())
            }
            Error::StoreRead(_) | Error::StoreWrite(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "token store unavailable".to_string(),
            ),
            Error::Generation(_) | Error::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".to_string(),
            ),
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
/// Credentials are checked upstream; this only mints the token.
pub async fn signin(
    State(state): State<Arc<ApiState>>,
    Json(body): Json<IssueTokenRequest>,
) -> Result<Json<IssueTokenResponse>, ApiError> {
    let token = state.gate.issue_token(body.claims, body.ttl_seconds).await?;
    Ok(Json(IssueTokenResponse {
        token: token.into_string(),
    }))
}
pub async fn protected(Extension(Authenticated(record)): Extension<Authenticated>) -> Json<Claims> {
    Json(record.flatten())
}
pub async fn signout(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());
    state.gate.revoke_token(header.as_deref()).await?;
    Ok(StatusCode::NO_CONTENT)
}
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "healthy"}))
}
