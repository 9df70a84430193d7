//! Remote image API.
//!
//! [`ImageApi`] is the seam between the engine and the backend: the engine
//! only ever talks to the trait, [`HttpImageApi`] is the production
//! implementation and tests substitute an in-memory fake.

mod http;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use crate::auth::Session;
use crate::core::{RawImageRecord, UploadFile};
use crate::utils::GalleryResult;

pub use http::HttpImageApi;

/// Parameters of one list call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListRequest {
    /// Opaque cursor from the previous page; `None` requests page one
    pub cursor: Option<Value>,
    pub limit: usize,
    pub query: Option<String>,
    pub tags: Vec<String>,
}

impl ListRequest {
    pub fn first_page(limit: usize) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }

    pub fn is_first_page(&self) -> bool {
        self.cursor.is_none()
    }
}

/// One page of the list endpoint: `{images: [...], lastEvaluatedKey?}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImagePage {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub images: Vec<RawImageRecord>,
    /// Cursor for the next page; absent on the last page
    #[serde(default, rename = "lastEvaluatedKey", skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<RawImageRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<RawImageRecord>>::deserialize(deserializer)?.unwrap_or_default())
}

#[async_trait]
pub trait ImageApi: Send + Sync {
    /// `GET /images/{userId}`
    async fn list(&self, session: &Session, request: &ListRequest) -> GalleryResult<ImagePage>;

    /// `POST /upload`; returns whatever record the server echoed back
    async fn upload(&self, session: &Session, file: &UploadFile) -> GalleryResult<Value>;

    /// `DELETE /images/{userId}/{imageId}`
    async fn delete_one(&self, session: &Session, image_id: &str) -> GalleryResult<()>;

    /// `DELETE /images/{userId}` with all ids in one body
    async fn delete_batch(&self, session: &Session, image_ids: &[String]) -> GalleryResult<()>;
}
