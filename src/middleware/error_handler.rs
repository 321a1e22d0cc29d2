use actix_web::{
    error::{JsonPayloadError, QueryPayloadError},
    web, HttpRequest,
};

use crate::core::AppError;

/// Largest accepted JSON body
pub const JSON_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Map body extraction failures onto the shared error envelope
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(path = %req.path(), error = %err, "Rejected JSON body");

    let message = match &err {
        JsonPayloadError::ContentType => "Content type must be application/json".to_string(),
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            "Request body is too large".to_string()
        }
        JsonPayloadError::Deserialize(e) => format!("Malformed JSON: {}", e),
        other => format!("Invalid request body: {}", other),
    };

    AppError::bad_request(message).into()
}

/// Map query string failures onto the shared error envelope
pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(path = %req.path(), error = %err, "Rejected query string");
    AppError::bad_request(format!("Invalid query parameters: {}", err)).into()
}

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT_BYTES)
        .error_handler(json_error_handler)
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(query_error_handler)
}
