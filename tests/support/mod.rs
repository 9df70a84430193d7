#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use async_trait::async_trait;
use gallery_client::{
    GalleryError, GalleryResult, ImageApi, ImagePage, ListRequest, RawImageRecord, Session,
    SessionProvider, UploadFile, UserProfile,
};
use parking_lot::Mutex;
use serde_json::{Value, json};

pub fn record(id: &str, name: &str, tags: Value) -> RawImageRecord {
    RawImageRecord(json!({
        "imageId": id,
        "fileName": name,
        "tags": tags,
        "url": format!("https://images.test/{id}.png"),
    }))
}

pub fn session(user_id: &str) -> Session {
    Session {
        user: UserProfile {
            user_id: user_id.to_string(),
            username: user_id.to_string(),
            email: None,
        },
        access_token: "access-token".to_string(),
    }
}

pub struct FixedSession(pub Option<Session>);

impl SessionProvider for FixedSession {
    fn current_session(&self) -> Option<Session> {
        self.0.clone()
    }
}

/// In-memory backend: list returns whatever was stored, uploads add to it.
#[derive(Default)]
pub struct MemoryApi {
    pub stored: Mutex<Vec<RawImageRecord>>,
    pub scripted_pages: Mutex<VecDeque<ImagePage>>,
    pub rejected_uploads: Mutex<Vec<String>>,
    pub list_calls: AtomicUsize,
    pub upload_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl MemoryApi {
    pub fn with_records(records: Vec<RawImageRecord>) -> Self {
        Self {
            stored: Mutex::new(records),
            ..Default::default()
        }
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageApi for MemoryApi {
    async fn list(&self, _session: &Session, _request: &ListRequest) -> GalleryResult<ImagePage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(page) = self.scripted_pages.lock().pop_front() {
            return Ok(page);
        }
        Ok(ImagePage {
            images: self.stored.lock().clone(),
            next_cursor: None,
        })
    }

    async fn upload(&self, _session: &Session, file: &UploadFile) -> GalleryResult<Value> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        if self.rejected_uploads.lock().contains(&file.name) {
            return Err(GalleryError::server(400, Some("Invalid image".to_string())));
        }
        let mut stored = self.stored.lock();
        let id = format!("up-{}", stored.len());
        stored.push(record(&id, &file.name, json!([])));
        Ok(json!({ "imageId": id }))
    }

    async fn delete_one(&self, _session: &Session, image_id: &str) -> GalleryResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.stored.lock().retain(|r| r.normalize().id != image_id);
        Ok(())
    }

    async fn delete_batch(&self, _session: &Session, image_ids: &[String]) -> GalleryResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.stored.lock().retain(|r| !image_ids.contains(&r.normalize().id));
        Ok(())
    }
}
