use std::future::Future;

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

tokio::task_local! {
    static REQUEST_ID: String;
}

/// Request id of the request currently being handled, if any. Error payloads
/// read this so clients can quote an id when reporting problems.
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|rid| rid.clone()).ok()
}

/// Run `fut` with `id` as the ambient request id. Exposed for tests.
pub async fn scope_request_id<F>(id: impl Into<String>, fut: F) -> F::Output
where
    F: Future,
{
    REQUEST_ID.scope(id.into(), fut).await
}

/// Ensures every request carries a request id: honors an incoming
/// `x-request-id` header, otherwise generates one, and echoes it back on the
/// response.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let rid = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut response = REQUEST_ID.scope(rid.clone(), next.run(request)).await;

    if let Ok(value) = HeaderValue::from_str(&rid) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
