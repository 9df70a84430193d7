use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Response, Url};
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};
use crate::api::{ImageApi, ImagePage, ListRequest};
use crate::auth::Session;
use crate::core::UploadFile;
use crate::utils::{GalleryConfig, GalleryError, GalleryResult};

/// reqwest-backed client for the gallery REST API.
#[derive(Clone)]
pub struct HttpImageApi {
    client: Client,
    base_url: Url,
}

impl HttpImageApi {
    pub fn new(config: &GalleryConfig) -> GalleryResult<Self> {
        config.validate()?;
        let base_url = Url::parse(&config.api_base_url)
            .map_err(|e| GalleryError::config(format!("invalid API base URL: {}", e)))?;
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| GalleryError::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    /// Base URL with `segments` appended as escaped path segments.
    fn endpoint(&self, segments: &[&str]) -> GalleryResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GalleryError::config(format!("API base URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn list_url(&self, user_id: &str, request: &ListRequest) -> GalleryResult<Url> {
        let mut url = self.endpoint(&["images", user_id])?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(cursor) = &request.cursor {
                query.append_pair("lastKey", &serde_json::to_string(cursor)?);
            }
            query.append_pair("limit", &request.limit.to_string());
            if let Some(search) = request.query.as_deref().filter(|q| !q.is_empty()) {
                query.append_pair("query", search);
            }
            if !request.tags.is_empty() {
                query.append_pair("tags", &serde_json::to_string(&request.tags)?);
            }
        }
        Ok(url)
    }

    fn auth_headers(session: &Session) -> GalleryResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&format!("Bearer {}", session.access_token))
            .map_err(|e| GalleryError::auth(format!("invalid access token: {}", e)))?;
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }
}

/// Maps non-2xx responses onto [`GalleryError::Server`].
async fn check_status(response: Response) -> GalleryResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!("API responded with {}: {}", status, body);
    Err(GalleryError::server(status.as_u16(), error_message(&body)))
}

/// Pulls `error` or `message` out of a JSON error body.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .or_else(|| value.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn transport(err: reqwest::Error) -> GalleryError {
    GalleryError::transport(err.to_string())
}

#[async_trait]
impl ImageApi for HttpImageApi {
    #[instrument(name = "api_list", skip_all, fields(first_page = request.is_first_page()))]
    async fn list(&self, session: &Session, request: &ListRequest) -> GalleryResult<ImagePage> {
        let url = self.list_url(&session.user.user_id, request)?;
        debug!("GET {}", url.path());
        let response = self
            .client
            .get(url)
            .headers(Self::auth_headers(session)?)
            .send()
            .await
            .map_err(transport)?;

        check_status(response)
            .await?
            .json::<ImagePage>()
            .await
            .map_err(|e| GalleryError::decode(e.to_string()))
    }

    #[instrument(name = "api_upload", skip_all, fields(file = %file.name))]
    async fn upload(&self, session: &Session, file: &UploadFile) -> GalleryResult<Value> {
        let url = self.endpoint(&["upload"])?;
        let body = json!({
            "userId": session.user.user_id,
            "fileName": file.name,
            "imageData": file.to_base64(),
        });
        let response = self
            .client
            .post(url)
            .headers(Self::auth_headers(session)?)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        let bytes = check_status(response).await?.bytes().await.map_err(transport)?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    #[instrument(name = "api_delete_one", skip(self, session))]
    async fn delete_one(&self, session: &Session, image_id: &str) -> GalleryResult<()> {
        let url = self.endpoint(&["images", &session.user.user_id, image_id])?;
        let response = self
            .client
            .delete(url)
            .headers(Self::auth_headers(session)?)
            .send()
            .await
            .map_err(transport)?;
        check_status(response).await?;
        Ok(())
    }

    #[instrument(name = "api_delete_batch", skip_all, fields(count = image_ids.len()))]
    async fn delete_batch(&self, session: &Session, image_ids: &[String]) -> GalleryResult<()> {
        let url = self.endpoint(&["images", &session.user.user_id])?;
        let response = self
            .client
            .delete(url)
            .headers(Self::auth_headers(session)?)
            .json(&json!({ "imageIds": image_ids }))
            .send()
            .await
            .map_err(transport)?;
        check_status(response).await?;
        Ok(())
    }
}
