use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    Json,
};
use serde::de::DeserializeOwned;

use crate::api::error::{api_error, ApiError, ErrorResponse};
use crate::error::{DevfileError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Json,
    Yaml,
}

impl BodyFormat {
    /// JSON unless the content type names YAML. A missing content type is JSON.
    pub fn from_headers(headers: &HeaderMap) -> std::result::Result<Self, ApiError> {
        let Some(value) = headers.get(CONTENT_TYPE) else {
            return Ok(BodyFormat::Json);
        };
        let mime = value
            .to_str()
            .unwrap_or_default()
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match mime.as_str() {
            "" | "application/json" => Ok(BodyFormat::Json),
            "text/yaml" | "text/x-yaml" | "application/x-yaml" | "application/yaml" => {
                Ok(BodyFormat::Yaml)
            }
            other => Err((
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                Json(ErrorResponse::new(&format!(
                    "Unsupported content type '{}'",
                    other
                ))),
            )),
        }
    }

    pub fn parse<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        match self {
            BodyFormat::Json => serde_json::from_slice(bytes)
                .map_err(|e| DevfileError::BadRequest(format!("Invalid JSON body: {}", e))),
            BodyFormat::Yaml => serde_yaml::from_slice(bytes)
                .map_err(|e| DevfileError::BadRequest(format!("Invalid YAML body: {}", e))),
        }
    }
}

/// Request body accepted as JSON or YAML. An empty body yields `None`.
#[derive(Debug, Clone)]
pub struct DocumentBody<T>(pub Option<T>);

impl<T> DocumentBody<T> {
    /// Fails with [`DevfileError::NullArgument`] when the body was empty.
    pub fn require(self, subject: &'static str) -> Result<T> {
        self.0.ok_or(DevfileError::NullArgument(subject))
    }
}

#[async_trait]
impl<S, T> FromRequest<S> for DocumentBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let format = BodyFormat::from_headers(req.headers())?;
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| api_error(DevfileError::BadRequest(e.body_text())))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(DocumentBody(None));
        }
        format.parse(&bytes).map(|doc| DocumentBody(Some(doc))).map_err(api_error)
    }
}
