use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};
use crate::preload::window::Priority;
use crate::utils::{GalleryConfig, GalleryError, GalleryResult};

/// Downloads image bytes for the preload cache.
#[async_trait]
pub trait ImageFetcher: Send + Sync + 'static {
    async fn fetch(&self, url: &str, priority: Priority) -> GalleryResult<Vec<u8>>;
}

/// Plain GET over reqwest. Priority only affects scheduling in the cache.
#[derive(Clone)]
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new(config: &GalleryConfig) -> GalleryResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| GalleryError::config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str, priority: Priority) -> GalleryResult<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GalleryError::server(status.as_u16(), None));
        }
        let bytes = response.bytes().await?;
        debug!("Fetched {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}
