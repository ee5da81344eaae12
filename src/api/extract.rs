use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::de::DeserializeOwned;

use crate::api::error::{ApiError, ErrorResponse};

/// `Query` whose rejection carries an [`ErrorResponse`] body.
#[derive(Debug, Clone)]
pub struct ApiQuery<T>(pub T);

/// `Json` whose rejection carries an [`ErrorResponse`] body.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

fn rejection(status: StatusCode, message: String) -> ApiError {
    (status, Json(ErrorResponse::new(&message)))
}

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| ApiQuery(value))
            .map_err(|e| rejection(e.status(), e.body_text()))
    }
}

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| ApiJson(value))
            .map_err(|e| rejection(e.status(), e.body_text()))
    }
}
