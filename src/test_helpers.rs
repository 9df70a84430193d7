//! Builders and in-memory fakes shared by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::{Value, json};
use crate::api::{ImageApi, ImagePage, ListRequest};
use crate::auth::{Session, SessionProvider, UserProfile};
use crate::core::{ImageRecord, RawImageRecord, UploadFile};
use crate::utils::{GalleryError, GalleryResult};

pub fn image(id: &str, name: &str, tags: &[&str]) -> ImageRecord {
    ImageRecord {
        id: id.to_string(),
        file_name: name.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        upload_date: None,
        size: 0,
        url: format!("https://cdn.test/{id}"),
        thumbnail_url: None,
    }
}

pub fn image_at(id: &str, name: &str, date: DateTime<Utc>) -> ImageRecord {
    ImageRecord {
        upload_date: Some(date),
        ..image(id, name, &[])
    }
}

pub fn raw(id: &str, name: &str, tags: &[&str]) -> RawImageRecord {
    RawImageRecord(json!({
        "imageId": id,
        "fileName": name,
        "tags": tags,
        "url": format!("https://cdn.test/{id}"),
    }))
}

pub fn names(images: &[ImageRecord]) -> Vec<String> {
    images.iter().map(|image| image.file_name.clone()).collect()
}

pub fn session(user_id: &str) -> Session {
    Session {
        user: UserProfile {
            user_id: user_id.to_string(),
            username: user_id.to_string(),
            email: None,
        },
        access_token: format!("token-{user_id}"),
    }
}

/// Unsigned JWT-shaped token carrying `payload` as its claims.
pub fn fake_id_token(payload: &str) -> String {
    format!("header.{}.signature", URL_SAFE_NO_PAD.encode(payload))
}

pub struct StaticSession(Mutex<Option<Session>>);

impl StaticSession {
    pub fn signed_in(user_id: &str) -> Self {
        Self(Mutex::new(Some(session(user_id))))
    }

    pub fn signed_out() -> Self {
        Self(Mutex::new(None))
    }
}

impl SessionProvider for StaticSession {
    fn current_session(&self) -> Option<Session> {
        self.0.lock().clone()
    }
}

/// Scripted [`ImageApi`] that records every call.
///
/// List calls pop pages in order and return an empty last page once the
/// script runs out.
#[derive(Default)]
pub struct FakeImageApi {
    pages: Mutex<VecDeque<GalleryResult<ImagePage>>>,
    list_delay: Mutex<Option<Duration>>,
    delete_delay: Mutex<Option<Duration>>,
    list_calls: AtomicUsize,
    list_requests: Mutex<Vec<ListRequest>>,
    upload_failures: Mutex<HashMap<String, GalleryError>>,
    uploaded: Mutex<Vec<String>>,
    delete_failure: Mutex<Option<GalleryError>>,
    single_deletes: Mutex<Vec<String>>,
    batch_deletes: Mutex<Vec<Vec<String>>>,
}

impl FakeImageApi {
    pub fn push_page(&self, page: GalleryResult<ImagePage>) {
        self.pages.lock().push_back(page);
    }

    pub fn set_list_delay(&self, delay: Duration) {
        *self.list_delay.lock() = Some(delay);
    }

    pub fn set_delete_delay(&self, delay: Duration) {
        *self.delete_delay.lock() = Some(delay);
    }

    async fn delete_pause(&self) {
        let delay = *self.delete_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    pub fn fail_upload(&self, name: &str, error: GalleryError) {
        self.upload_failures.lock().insert(name.to_string(), error);
    }

    /// Makes every delete call fail with `error`.
    pub fn fail_delete(&self, error: GalleryError) {
        *self.delete_failure.lock() = Some(error);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn list_requests(&self) -> Vec<ListRequest> {
        self.list_requests.lock().clone()
    }

    /// Names of files that reached the upload endpoint, in call order.
    pub fn uploaded(&self) -> Vec<String> {
        self.uploaded.lock().clone()
    }

    pub fn single_deletes(&self) -> Vec<String> {
        self.single_deletes.lock().clone()
    }

    pub fn batch_deletes(&self) -> Vec<Vec<String>> {
        self.batch_deletes.lock().clone()
    }
}

#[async_trait]
impl ImageApi for FakeImageApi {
    async fn list(&self, _session: &Session, request: &ListRequest) -> GalleryResult<ImagePage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.list_requests.lock().push(request.clone());
        let delay = *self.list_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.pages.lock().pop_front();
        next.unwrap_or_else(|| Ok(ImagePage::default()))
    }

    async fn upload(&self, _session: &Session, file: &UploadFile) -> GalleryResult<Value> {
        self.uploaded.lock().push(file.name.clone());
        let failure = self.upload_failures.lock().get(&file.name).cloned();
        match failure {
            Some(error) => Err(error),
            None => Ok(json!({ "fileName": file.name })),
        }
    }

    async fn delete_one(&self, _session: &Session, image_id: &str) -> GalleryResult<()> {
        self.single_deletes.lock().push(image_id.to_string());
        self.delete_pause().await;
        let failure = self.delete_failure.lock().clone();
        failure.map_or(Ok(()), Err)
    }

    async fn delete_batch(&self, _session: &Session, image_ids: &[String]) -> GalleryResult<()> {
        self.batch_deletes.lock().push(image_ids.to_vec());
        self.delete_pause().await;
        let failure = self.delete_failure.lock().clone();
        failure.map_or(Ok(()), Err)
    }
}
