use crate::AuthGate;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE};
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokengate_core::SessionRecord;
use tower::{Layer, Service};

/// Request extension carrying the session record of a verified request.
#[derive(Debug, Clone)]
pub struct Authenticated(pub SessionRecord);

#[derive(Clone)]
pub struct AuthLayer {
    gate: Arc<AuthGate>,
}

impl AuthLayer {
    pub fn new(gate: Arc<AuthGate>) -> Self {
        Self { gate }
    }
}

impl<I> Layer<I> for AuthLayer {
    type Service = AuthService<I>;
    fn layer(&self, inner: I) -> Self::Service {
        AuthService {
            inner,
            gate: self.gate.clone(),
        }
    }
}

/// Lets a request through only if its bearer token resolves to a live
/// session. Every failure produces the same 401; the reason is logged by
/// the gate, never returned.
#[derive(Clone)]
pub struct AuthService<I> {
    inner: I,
    gate: Arc<AuthGate>,
}

impl<I> Service<Request<Body>> for AuthService<I>
where
    I: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    I::Future: Send,
{
    type Response = Response;
    type Error = I::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let gate = self.gate.clone();
        // Swap in the clone so the instance that was polled ready serves
        // this request.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        Box::pin(async move {
            let header = req
                .headers()
                .get(AUTHORIZATION)
                .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());
            let record = match gate.verify(header.as_deref()).await {
                Ok(record) => record,
                Err(_) => return Ok(unauthorized_response()),
            };
            req.extensions_mut().insert(Authenticated(record));
            inner.call(req).await
        })
    }
}

fn unauthorized_response() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [
            (CONTENT_TYPE, "application/json"),
            (WWW_AUTHENTICATE, "Bearer"),
        ],
        r#"{"error":"unauthorized"}"#,
    )
        .into_response()
}
