use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

use crate::api::error::ApiError;
use crate::model::UserContext;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";

/// Axum extractor for UserContext from request headers
///
/// This extractor looks for user information in request headers:
/// - X-User-Id: user identifier
/// - X-User-Name: optional user name, defaults to the id
///
/// For development/testing, if no headers are present, returns a default user.
#[async_trait]
impl<S> FromRequestParts<S> for UserContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(user_from_headers(&parts.headers))
    }
}

pub fn user_from_headers(headers: &HeaderMap) -> UserContext {
    match extract_header_value(headers, USER_ID_HEADER) {
        Some(user_id) => {
            let user_name =
                extract_header_value(headers, USER_NAME_HEADER).unwrap_or_else(|| user_id.clone());
            UserContext::new(user_id, user_name)
        }
        None => UserContext::default_user(),
    }
}

/// Extract header value as string
fn extract_header_value(headers: &HeaderMap, header_name: &str) -> Option<String> {
    headers
        .get(header_name)
        .and_then(|value| value.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
