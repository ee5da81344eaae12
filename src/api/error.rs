use axum::{http::StatusCode, Json};
use log::error;
use serde::{Deserialize, Serialize};

use crate::error::DevfileError;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn status_for(err: &DevfileError) -> StatusCode {
    match err {
        DevfileError::NotFound(_) => StatusCode::NOT_FOUND,
        DevfileError::Conflict(_) => StatusCode::CONFLICT,
        DevfileError::NullArgument(_)
        | DevfileError::Validation(_)
        | DevfileError::BadRequest(_) => StatusCode::BAD_REQUEST,
        DevfileError::Forbidden(_) => StatusCode::FORBIDDEN,
        DevfileError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Maps a domain error onto its HTTP status and error body.
pub fn api_error(err: DevfileError) -> ApiError {
    let status = status_for(&err);
    if status.is_server_error() {
        error!("Request failed: {}", err);
    }
    (status, Json(ErrorResponse::new(&err.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (DevfileError::not_found_by_id("x"), StatusCode::NOT_FOUND),
            (DevfileError::Conflict("c".into()), StatusCode::CONFLICT),
            (DevfileError::NullArgument("Devfile"), StatusCode::BAD_REQUEST),
            (DevfileError::Validation("v".into()), StatusCode::BAD_REQUEST),
            (DevfileError::BadRequest("b".into()), StatusCode::BAD_REQUEST),
            (DevfileError::Forbidden("f".into()), StatusCode::FORBIDDEN),
            (DevfileError::Storage("s".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(status_for(&err), expected);
        }
    }

    #[test]
    fn test_error_body_carries_message() {
        let (status, Json(body)) = api_error(DevfileError::not_found_by_id("abc"));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.message, "Devfile with id 'abc' doesn't exist");
    }
}
