use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("It is unable to resolve relative reference '{0}' without a base location")]
    Unresolvable(String),

    #[error("Failed to fetch content from '{url}': {message}")]
    Fetch { url: String, message: String },
}

/// Fetches the content of files referenced from a devfile.
#[async_trait::async_trait]
pub trait FileContentProvider: Send + Sync {
    async fn fetch_content(&self, reference: &str) -> Result<String, ContentError>;
}

/// Fetches references over HTTP. Relative references are resolved against
/// the configured base location.
#[derive(Debug, Clone)]
pub struct UrlFileContentProvider {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl UrlFileContentProvider {
    pub fn new(base_url: Option<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client, base_url })
    }

    pub fn resolve(&self, reference: &str) -> Result<String, ContentError> {
        if is_absolute(reference) {
            return Ok(reference.to_string());
        }
        match &self.base_url {
            Some(base) => Ok(format!(
                "{}/{}",
                base.trim_end_matches('/'),
                reference.trim_start_matches('/')
            )),
            None => Err(ContentError::Unresolvable(reference.to_string())),
        }
    }
}

fn is_absolute(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

#[async_trait::async_trait]
impl FileContentProvider for UrlFileContentProvider {
    async fn fetch_content(&self, reference: &str) -> Result<String, ContentError> {
        let url = self.resolve(reference)?;
        let fetch_error = |e: reqwest::Error| ContentError::Fetch {
            url: url.clone(),
            message: e.to_string(),
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(fetch_error)?;

        response.text().await.map_err(fetch_error)
    }
}

/// Wraps a provider so that each reference is fetched at most once.
///
/// Meant to live for a single request; failures are not cached.
pub struct CachedFileContentProvider {
    inner: Arc<dyn FileContentProvider>,
    cache: Mutex<HashMap<String, String>>,
}

impl CachedFileContentProvider {
    pub fn new(inner: Arc<dyn FileContentProvider>) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait::async_trait]
impl FileContentProvider for CachedFileContentProvider {
    async fn fetch_content(&self, reference: &str) -> Result<String, ContentError> {
        let cached = self.cache.lock().get(reference).cloned();
        if let Some(content) = cached {
            return Ok(content);
        }

        let content = self.inner.fetch_content(reference).await?;
        self.cache
            .lock()
            .insert(reference.to_string(), content.clone());
        Ok(content)
    }
}
