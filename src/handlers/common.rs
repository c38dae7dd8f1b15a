use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

pub fn success<T: Serialize>(body: T) -> impl IntoResponse {
    (StatusCode::OK, Json(body))
}

pub fn created<T: Serialize>(body: T) -> impl IntoResponse {
    (StatusCode::CREATED, Json(body))
}

pub fn no_content() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

/// Query parameters for paginated listings. Pages are zero-based.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PaginationParams {
    #[serde(default)]
    pub page_no: u64,
    pub page_size: Option<u64>,
    pub sort_by: Option<String>,
    /// "asc" (default) or "desc".
    pub order: Option<String>,
}

impl PaginationParams {
    pub fn descending(&self) -> bool {
        matches!(self.order.as_deref(), Some("desc"))
    }
}
