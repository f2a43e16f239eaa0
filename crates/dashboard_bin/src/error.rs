use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use dashboard::DashboardError;
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "bad_request: {}", msg),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

// No-data conditions are rendered as views before `?` is reached, so only
// rejected selections arrive here.
impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> ApiError {
        match err {
            DashboardError::InvalidSelection(msg) => ApiError::BadRequest(msg),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}
