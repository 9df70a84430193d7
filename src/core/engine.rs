use std::collections::BTreeSet;
use std::sync::Arc;
use parking_lot::Mutex;
use tokio::sync::{Notify, broadcast};
use tracing::{debug, info, instrument, warn};
use crate::api::{HttpImageApi, ImageApi, ListRequest};
use crate::auth::{Session, SessionProvider};
use crate::core::progress::GalleryEvent;
use crate::core::state::{GallerySnapshot, GalleryState};
use crate::core::task::UploadFile;
use crate::core::types::{DateRange, RawImageRecord, SortKey, SortOrder, UploadFailure, UploadSummary};
use crate::processing::UploadBatchProcessor;
use crate::utils::{Debouncer, GalleryConfig, GalleryError, GalleryResult};

const EVENT_CAPACITY: usize = 64;

struct EngineInner {
    state: GalleryState,
    /// One list request at a time
    list_in_flight: bool,
    /// Network operations currently running; drives the loading flag
    pending: usize,
    /// Bumped by `reset()`; results from an older generation are dropped
    generation: u64,
}

impl EngineInner {
    fn begin(&mut self) {
        self.pending += 1;
        self.state.set_loading(true);
        self.state.clear_error();
    }

    fn end(&mut self) {
        self.pending = self.pending.saturating_sub(1);
        self.state.set_loading(self.pending > 0);
    }

    /// Ends an operation started in `generation`. Returns false, leaving the
    /// state alone, when a reset happened in between.
    fn end_current(&mut self, generation: u64) -> bool {
        if self.generation != generation {
            return false;
        }
        self.end();
        true
    }
}

/// Gallery state engine.
///
/// Owns a [`GalleryState`] behind a mutex that is only held for synchronous
/// sections, so the host can read and change filters while a request is
/// pending. Every mutation is followed by [`GalleryEvent::Changed`].
pub struct GalleryEngine {
    api: Arc<dyn ImageApi>,
    sessions: Arc<dyn SessionProvider>,
    config: GalleryConfig,
    inner: Mutex<EngineInner>,
    /// Woken whenever `list_in_flight` is cleared
    list_finished: Notify,
    search: Debouncer<String>,
    events: broadcast::Sender<GalleryEvent>,
}

impl GalleryEngine {
    pub fn new(
        api: Arc<dyn ImageApi>,
        sessions: Arc<dyn SessionProvider>,
        config: GalleryConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            api,
            sessions,
            search: Debouncer::new(config.search_debounce()),
            config,
            inner: Mutex::new(EngineInner {
                state: GalleryState::new(),
                list_in_flight: false,
                pending: 0,
                generation: 0,
            }),
            list_finished: Notify::new(),
            events,
        }
    }

    /// Engine backed by the HTTP client for `config.api_base_url`.
    pub fn from_config(config: GalleryConfig, sessions: Arc<dyn SessionProvider>) -> GalleryResult<Self> {
        let api = HttpImageApi::new(&config)?;
        Ok(Self::new(Arc::new(api), sessions, config))
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GalleryEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: GalleryEvent) {
        // no receivers is fine
        let _ = self.events.send(event);
    }

    fn session(&self) -> Option<Session> {
        self.sessions.current_session().filter(Session::is_usable)
    }

    /// Records `error` in the state and broadcasts it.
    fn fail(&self, error: &GalleryError) {
        let message = error.to_string();
        self.inner.lock().state.set_error(message.clone());
        self.emit(GalleryEvent::Changed);
        self.emit(GalleryEvent::Error(message));
    }

    /// Runs a synchronous state change and notifies subscribers.
    fn mutate<R>(&self, f: impl FnOnce(&mut GalleryState) -> R) -> R {
        let result = f(&mut self.inner.lock().state);
        self.emit(GalleryEvent::Changed);
        result
    }

    /// Read access to the current state.
    pub fn with_state<R>(&self, f: impl FnOnce(&GalleryState) -> R) -> R {
        f(&self.inner.lock().state)
    }

    pub fn snapshot(&self) -> GallerySnapshot {
        self.inner.lock().state.snapshot()
    }

    pub fn set_images(&self, raw: Vec<RawImageRecord>) {
        self.mutate(|state| state.set_images(raw));
    }

    pub fn append_images(&self, raw: Vec<RawImageRecord>) {
        self.mutate(|state| state.append_images(raw));
    }

    pub fn set_search_query(&self, query: &str) {
        self.mutate(|state| state.set_search_query(query));
    }

    /// Applies `query` after the configured debounce delay unless a newer
    /// search arrived first. Returns whether it was applied.
    pub async fn search(&self, query: &str) -> bool {
        match self.search.debounce(query.to_string()).await {
            Some(query) => {
                self.set_search_query(&query);
                true
            }
            None => false,
        }
    }

    pub fn toggle_tag(&self, tag: &str) {
        self.mutate(|state| state.toggle_tag(tag));
    }

    pub fn set_date_range(&self, range: Option<DateRange>) {
        self.mutate(|state| state.set_date_range(range));
    }

    pub fn set_sort_by(&self, key: SortKey) {
        self.mutate(|state| state.set_sort_by(key));
    }

    pub fn set_sort_order(&self, order: SortOrder) {
        self.mutate(|state| state.set_sort_order(order));
    }

    pub fn clear_filters(&self) {
        self.search.cancel();
        self.mutate(GalleryState::clear_filters);
    }

    pub fn toggle_select_mode(&self) {
        self.mutate(GalleryState::toggle_select_mode);
    }

    pub fn toggle_image_selection(&self, id: &str) -> bool {
        self.mutate(|state| state.toggle_image_selection(id))
    }

    pub fn clear_selection(&self) {
        self.mutate(GalleryState::clear_selection);
    }

    pub fn view_image(&self, id: &str) -> bool {
        self.mutate(|state| state.view_image(id))
    }

    pub fn close_image_view(&self) {
        self.mutate(GalleryState::close_image_view);
    }

    pub fn clear_error(&self) {
        self.mutate(GalleryState::clear_error);
    }

    /// Fetches the next page, or page one when no cursor is stored.
    ///
    /// A call made while another list request is in flight returns
    /// immediately without touching the network.
    #[instrument(skip(self))]
    pub async fn fetch_images(&self) -> GalleryResult<()> {
        self.list_page(false).await.unwrap_or_else(|| {
            debug!("List request already in flight, skipping");
            Ok(())
        })
    }

    /// Discards the cursor and fetches page one.
    ///
    /// Waits for a list request already in flight to finish first, so a
    /// refresh is never swallowed by a concurrent `load_more`.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> GalleryResult<()> {
        loop {
            let finished = self.list_finished.notified();
            if let Some(outcome) = self.list_page(true).await {
                return outcome;
            }
            debug!("Waiting for the in-flight list request before refreshing");
            finished.await;
        }
    }

    /// Runs one list request. `None` means another one was in flight.
    async fn list_page(&self, from_start: bool) -> Option<GalleryResult<()>> {
        let Some(session) = self.session() else {
            warn!("Fetch attempted without a session");
            self.fail(&GalleryError::Unauthenticated);
            return Some(Err(GalleryError::Unauthenticated));
        };

        let (request, generation) = {
            let mut inner = self.inner.lock();
            if inner.list_in_flight {
                return None;
            }
            if from_start {
                inner.state.rewind();
            }
            inner.list_in_flight = true;
            inner.begin();
            let request = ListRequest {
                cursor: inner.state.cursor().cloned(),
                ..ListRequest::first_page(self.config.page_size)
            };
            (request, inner.generation)
        };
        self.emit(GalleryEvent::Changed);

        let result = self.api.list(&session, &request).await;

        let outcome = {
            let mut inner = self.inner.lock();
            if !inner.end_current(generation) {
                debug!("Discarding list result from before reset");
                return Some(Ok(()));
            }
            inner.list_in_flight = false;
            match result {
                Ok(page) => {
                    debug!("Fetched {} images (more: {})", page.images.len(), page.next_cursor.is_some());
                    inner.state.apply_page(page, request.is_first_page());
                    Ok(())
                }
                Err(e) => {
                    warn!("Failed to fetch images: {}", e);
                    inner.state.set_error(e.to_string());
                    Err(e)
                }
            }
        };
        self.list_finished.notify_waiters();

        self.emit(GalleryEvent::Changed);
        if let Err(e) = &outcome {
            self.emit(GalleryEvent::Error(e.to_string()));
        }
        Some(outcome)
    }

    /// Fetches the next page if the server reported one.
    pub async fn load_more(&self) -> GalleryResult<()> {
        if !self.inner.lock().state.has_more() {
            debug!("No more pages to load");
            return Ok(());
        }
        self.fetch_images().await
    }

    /// Uploads `files` one after another and refreshes once if any succeeded.
    #[instrument(skip_all, fields(files = files.len()))]
    pub async fn upload_images(&self, files: Vec<UploadFile>) -> UploadSummary {
        let Some(session) = self.session() else {
            warn!("Upload attempted without a session");
            let error = GalleryError::Unauthenticated;
            self.fail(&error);
            return UploadSummary {
                success: Vec::new(),
                failed: files
                    .into_iter()
                    .map(|file| UploadFailure {
                        name: file.name,
                        error: error.to_string(),
                    })
                    .collect(),
            };
        };

        let generation = {
            let mut inner = self.inner.lock();
            inner.begin();
            inner.generation
        };
        self.emit(GalleryEvent::Changed);

        let processor = UploadBatchProcessor::new(Arc::clone(&self.api), self.config.max_upload_bytes);
        let summary = processor
            .process_batch(&session, &files, |progress| self.emit(GalleryEvent::Upload(progress)))
            .await;

        if self.inner.lock().generation != generation {
            debug!("Gallery reset during upload, skipping refresh");
            return summary;
        }

        if summary.any_succeeded() {
            info!("{} of {} uploads succeeded, refreshing", summary.success.len(), summary.total());
            // a failed refresh is already recorded in the error field
            let _ = self.refresh().await;
        }

        if self.inner.lock().end_current(generation) {
            self.emit(GalleryEvent::Changed);
        }
        summary
    }

    /// Single-file convenience wrapper around [`Self::upload_images`].
    pub async fn upload_image(&self, file: UploadFile) -> bool {
        self.upload_images(vec![file]).await.any_succeeded()
    }

    #[instrument(skip(self))]
    pub async fn delete_image(&self, id: &str) -> GalleryResult<()> {
        let Some(session) = self.session() else {
            self.fail(&GalleryError::Unauthenticated);
            return Err(GalleryError::Unauthenticated);
        };

        let generation = {
            let mut inner = self.inner.lock();
            inner.begin();
            inner.generation
        };
        self.emit(GalleryEvent::Changed);

        let result = self.api.delete_one(&session, id).await;

        {
            let mut inner = self.inner.lock();
            if !inner.end_current(generation) {
                debug!("Gallery reset during delete of {}", id);
                return result;
            }
            match &result {
                Ok(()) => {
                    let ids = BTreeSet::from([id.to_string()]);
                    inner.state.remove_images(&ids);
                    info!("Deleted image {}", id);
                }
                Err(e) => {
                    warn!("Failed to delete image {}: {}", id, e);
                    inner.state.set_error(e.to_string());
                }
            }
        }

        self.emit(GalleryEvent::Changed);
        if let Err(e) = &result {
            self.emit(GalleryEvent::Error(e.to_string()));
        }
        result
    }

    /// Deletes every selected image with a single request.
    ///
    /// Returns the number of records removed. An empty selection or a
    /// missing session is reported without a network call and without
    /// touching the error field.
    #[instrument(skip(self))]
    pub async fn batch_delete_images(&self) -> GalleryResult<usize> {
        let Some(session) = self.session() else {
            return Err(GalleryError::Unauthenticated);
        };

        let (ids, generation) = {
            let mut inner = self.inner.lock();
            let ids = inner.state.selected_images().clone();
            if ids.is_empty() {
                return Err(GalleryError::EmptySelection);
            }
            inner.begin();
            (ids, inner.generation)
        };
        self.emit(GalleryEvent::Changed);

        let request: Vec<String> = ids.iter().cloned().collect();
        let result = self.api.delete_batch(&session, &request).await;

        let outcome = {
            let mut inner = self.inner.lock();
            if !inner.end_current(generation) {
                debug!("Gallery reset during batch delete");
                return result.map(|()| 0);
            }
            match result {
                Ok(()) => {
                    let removed = inner.state.finish_batch_delete(&ids);
                    info!("Batch deleted {} images", removed);
                    Ok(removed)
                }
                Err(e) => {
                    warn!("Batch delete of {} images failed: {}", ids.len(), e);
                    inner.state.set_error(e.to_string());
                    Err(e)
                }
            }
        };

        self.emit(GalleryEvent::Changed);
        if let Err(e) = &outcome {
            self.emit(GalleryEvent::Error(e.to_string()));
        }
        outcome
    }

    /// Returns to the initial state. Fetches still in flight are ignored
    /// when they complete.
    pub fn reset(&self) {
        self.search.cancel();
        {
            let mut inner = self.inner.lock();
            inner.state.reset();
            inner.generation += 1;
            inner.list_in_flight = false;
            inner.pending = 0;
        }
        self.list_finished.notify_waiters();
        debug!("Gallery state reset");
        self.emit(GalleryEvent::Changed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ImagePage;
    use crate::test_helpers::{FakeImageApi, StaticSession, names, raw};
    use serde_json::json;
    use std::time::Duration;

    fn engine(api: &Arc<FakeImageApi>) -> GalleryEngine {
        GalleryEngine::new(api.clone(), Arc::new(StaticSession::signed_in("u1")), GalleryConfig::default())
    }

    fn page(records: &[(&str, &str)], cursor: Option<serde_json::Value>) -> ImagePage {
        ImagePage {
            images: records.iter().map(|(id, name)| raw(id, name, &[])).collect(),
            next_cursor: cursor,
        }
    }

    #[tokio::test]
    async fn fetch_without_session_makes_no_call() {
        let api = Arc::new(FakeImageApi::default());
        let engine = GalleryEngine::new(api.clone(), Arc::new(StaticSession::signed_out()), GalleryConfig::default());

        assert_eq!(engine.fetch_images().await, Err(GalleryError::Unauthenticated));
        assert_eq!(api.list_calls(), 0);
        assert_eq!(
            engine.snapshot().error.as_deref(),
            Some("User ID not found. Please log in again.")
        );
    }

    #[tokio::test]
    async fn pages_replace_then_append() {
        let api = Arc::new(FakeImageApi::default());
        api.push_page(Ok(page(&[("1", "a.png")], Some(json!({"k": 1})))));
        api.push_page(Ok(page(&[("2", "b.png")], None)));
        let engine = engine(&api);

        engine.fetch_images().await.unwrap();
        engine.load_more().await.unwrap();
        engine.load_more().await.unwrap();

        assert_eq!(api.list_calls(), 2);
        let requests = api.list_requests();
        assert_eq!(requests[0].cursor, None);
        assert_eq!(requests[1].cursor, Some(json!({"k": 1})));
        assert_eq!(requests[0].limit, 100);

        let snapshot = engine.snapshot();
        assert_eq!(names(&snapshot.images), vec!["a.png", "b.png"]);
        assert!(!snapshot.has_more);
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_collection_and_cursor() {
        let api = Arc::new(FakeImageApi::default());
        api.push_page(Ok(page(&[("1", "a.png")], Some(json!("next")))));
        api.push_page(Err(GalleryError::server(500, None)));
        let engine = engine(&api);
        let mut events = engine.subscribe();

        engine.fetch_images().await.unwrap();
        assert!(engine.fetch_images().await.is_err());

        engine.with_state(|state| {
            assert_eq!(state.images().len(), 1);
            assert_eq!(state.cursor(), Some(&json!("next")));
            assert_eq!(state.error(), Some("HTTP error! status: 500"));
        });

        let mut saw_error = false;
        while let Ok(event) = events.try_recv() {
            saw_error |= event == GalleryEvent::Error("HTTP error! status: 500".into());
        }
        assert!(saw_error);
    }

    #[tokio::test]
    async fn concurrent_fetch_is_a_no_op() {
        let api = Arc::new(FakeImageApi::default());
        api.set_list_delay(Duration::from_millis(20));
        api.push_page(Ok(page(&[("1", "a.png")], None)));
        let engine = engine(&api);

        let (first, second) = tokio::join!(engine.fetch_images(), engine.fetch_images());
        assert!(first.is_ok() && second.is_ok());
        assert_eq!(api.list_calls(), 1);
    }

    #[tokio::test]
    async fn reset_discards_in_flight_result() {
        let api = Arc::new(FakeImageApi::default());
        api.set_list_delay(Duration::from_millis(20));
        api.push_page(Ok(page(&[("1", "a.png")], None)));
        let engine = engine(&api);

        let reset = async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            engine.reset();
        };
        let (result, ()) = tokio::join!(engine.fetch_images(), reset);

        assert!(result.is_ok());
        let snapshot = engine.snapshot();
        assert!(snapshot.images.is_empty());
        assert!(snapshot.has_more);
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn refresh_after_upload_waits_for_load_more() {
        let api = Arc::new(FakeImageApi::default());
        api.push_page(Ok(page(&[("1", "a.png")], Some(json!({"k": 1})))));
        api.push_page(Ok(page(&[("2", "b.png")], None)));
        api.push_page(Ok(page(&[("1", "a.png"), ("2", "b.png"), ("3", "new.png")], None)));
        let engine = engine(&api);
        engine.fetch_images().await.unwrap();
        api.set_list_delay(Duration::from_millis(20));

        let (more, summary) = tokio::join!(
            engine.load_more(),
            engine.upload_images(vec![UploadFile::new("new.png", vec![1])])
        );

        assert!(more.is_ok());
        assert_eq!(summary.success, vec!["new.png"]);
        assert_eq!(api.list_calls(), 3);
        assert_eq!(api.list_requests()[2].cursor, None);
        let snapshot = engine.snapshot();
        assert_eq!(names(&snapshot.images), vec!["a.png", "b.png", "new.png"]);
        assert!(!snapshot.has_more);
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn delete_finishing_after_reset_keeps_new_fetch_loading() {
        let api = Arc::new(FakeImageApi::default());
        api.set_delete_delay(Duration::from_millis(30));
        api.set_list_delay(Duration::from_millis(100));
        api.push_page(Ok(page(&[("2", "b.png")], None)));
        let engine = engine(&api);
        engine.set_images(vec![raw("1", "a.png", &[])]);

        let after_reset = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            engine.reset();
            let check = async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                engine.snapshot().loading
            };
            tokio::join!(engine.fetch_images(), check)
        };
        let (deleted, (fetched, loading_after_delete)) =
            tokio::join!(engine.delete_image("1"), after_reset);

        assert!(deleted.is_ok());
        assert!(fetched.is_ok());
        assert!(loading_after_delete);
        let snapshot = engine.snapshot();
        assert_eq!(names(&snapshot.images), vec!["b.png"]);
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn filters_apply_to_fetched_images() {
        let api = Arc::new(FakeImageApi::default());
        api.push_page(Ok(page(&[("1", "Cat.png"), ("2", "dog.png")], None)));
        let engine = engine(&api);
        engine.set_search_query("CAT");

        engine.refresh().await.unwrap();
        assert_eq!(names(&engine.snapshot().filtered_images), vec!["Cat.png"]);
    }

    #[tokio::test]
    async fn batch_delete_preconditions_make_no_call() {
        let api = Arc::new(FakeImageApi::default());
        let engine = engine(&api);

        assert_eq!(engine.batch_delete_images().await, Err(GalleryError::EmptySelection));
        assert!(api.batch_deletes().is_empty());
        assert!(engine.snapshot().error.is_none());

        let signed_out = GalleryEngine::new(api.clone(), Arc::new(StaticSession::signed_out()), GalleryConfig::default());
        assert_eq!(signed_out.batch_delete_images().await, Err(GalleryError::Unauthenticated));
        assert!(api.batch_deletes().is_empty());
    }

    #[tokio::test]
    async fn batch_delete_sends_one_request() {
        let api = Arc::new(FakeImageApi::default());
        let engine = engine(&api);
        engine.set_images(vec![raw("1", "a.png", &[]), raw("2", "b.png", &[]), raw("3", "c.png", &[])]);
        engine.toggle_select_mode();
        engine.toggle_image_selection("3");
        engine.toggle_image_selection("1");

        assert_eq!(engine.batch_delete_images().await, Ok(2));
        assert_eq!(api.batch_deletes(), vec![vec!["1".to_string(), "3".to_string()]]);

        let snapshot = engine.snapshot();
        assert_eq!(names(&snapshot.filtered_images), vec!["b.png"]);
        assert!(!snapshot.select_mode);
        assert!(snapshot.selected_images.is_empty());
    }

    #[tokio::test]
    async fn failed_batch_delete_keeps_selection() {
        let api = Arc::new(FakeImageApi::default());
        api.fail_delete(GalleryError::transport("connection refused"));
        let engine = engine(&api);
        engine.set_images(vec![raw("1", "a.png", &[])]);
        engine.toggle_select_mode();
        engine.toggle_image_selection("1");

        assert!(engine.batch_delete_images().await.is_err());
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.images.len(), 1);
        assert_eq!(snapshot.selected_images, vec!["1"]);
        assert!(snapshot.select_mode);
        assert_eq!(
            snapshot.error.as_deref(),
            Some("Unable to connect to server: connection refused")
        );
    }

    #[tokio::test]
    async fn delete_image_removes_record_and_closes_viewer() {
        let api = Arc::new(FakeImageApi::default());
        let engine = engine(&api);
        engine.set_images(vec![raw("1", "a.png", &[]), raw("2", "b.png", &[])]);
        engine.view_image("1");

        engine.delete_image("1").await.unwrap();
        assert_eq!(api.single_deletes(), vec!["1"]);
        let snapshot = engine.snapshot();
        assert_eq!(names(&snapshot.images), vec!["b.png"]);
        assert!(snapshot.viewing_image.is_none());
    }

    #[tokio::test]
    async fn mixed_upload_refreshes_exactly_once() {
        let api = Arc::new(FakeImageApi::default());
        api.fail_upload("bad.png", GalleryError::server(413, Some("Too large".into())));
        api.push_page(Ok(page(&[("1", "good.png")], None)));
        let engine = engine(&api);
        let mut events = engine.subscribe();

        let summary = engine
            .upload_images(vec![
                UploadFile::new("good.png", vec![1]),
                UploadFile::new("bad.png", vec![1]),
            ])
            .await;

        assert_eq!(summary.success, vec!["good.png"]);
        assert_eq!(summary.failed[0].error, "Too large");
        assert_eq!(api.list_calls(), 1);
        assert_eq!(names(&engine.snapshot().images), vec!["good.png"]);

        let mut uploads = 0;
        while let Ok(event) = events.try_recv() {
            if matches!(event, GalleryEvent::Upload(_)) {
                uploads += 1;
            }
        }
        // start, two files, complete
        assert_eq!(uploads, 4);
    }

    #[tokio::test]
    async fn all_failed_upload_skips_refresh() {
        let api = Arc::new(FakeImageApi::default());
        let engine = engine(&api);

        assert!(!engine.upload_image(UploadFile::new("notes.txt", vec![1])).await);
        assert_eq!(api.list_calls(), 0);
        assert!(api.uploaded().is_empty());
    }

    #[tokio::test]
    async fn upload_without_session_fails_every_file() {
        let api = Arc::new(FakeImageApi::default());
        let engine = GalleryEngine::new(api.clone(), Arc::new(StaticSession::signed_out()), GalleryConfig::default());

        let summary = engine
            .upload_images(vec![UploadFile::new("a.png", vec![1]), UploadFile::new("b.png", vec![1])])
            .await;
        assert!(summary.success.is_empty());
        assert_eq!(summary.failed.len(), 2);
        assert!(api.uploaded().is_empty());
        assert!(engine.snapshot().error.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn search_applies_only_latest_query() {
        let api = Arc::new(FakeImageApi::default());
        let engine = engine(&api);
        engine.set_images(vec![raw("1", "cat.png", &[]), raw("2", "dog.png", &[])]);

        let (first, second) = tokio::join!(engine.search("ca"), async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            engine.search("dog").await
        });

        assert!(!first);
        assert!(second);
        assert_eq!(names(&engine.snapshot().filtered_images), vec!["dog.png"]);
    }
}
