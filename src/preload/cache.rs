use std::collections::HashMap;
use std::sync::Arc;
use lru::LruCache;
use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use crate::core::ImageRecord;
use crate::preload::fetcher::{HttpImageFetcher, ImageFetcher};
use crate::preload::window::{Priority, window};
use crate::utils::{GalleryConfig, GalleryResult, PreloadConfig};

/// Where the host should load an image from.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// Bytes already downloaded by the cache
    Cached(Arc<Vec<u8>>),
    /// Not cached yet; use the original URL
    Remote(String),
}

struct InFlight {
    ticket: u64,
    handle: JoinHandle<()>,
}

/// Ordering between the high and low priority fetches of one focus pass.
enum Gate {
    /// Released when the high-priority fetch settles or is aborted
    Holds(OwnedSemaphorePermit),
    /// Waits until every high-priority fetch of the pass released its permit
    Waits(Arc<Semaphore>, u32),
}

struct CacheInner {
    cached: LruCache<String, Arc<Vec<u8>>>,
    cached_bytes: usize,
    max_bytes: usize,
    in_flight: HashMap<String, InFlight>,
    next_ticket: u64,
}

impl CacheInner {
    fn new(max_bytes: usize) -> Self {
        Self {
            cached: LruCache::unbounded(),
            cached_bytes: 0,
            max_bytes,
            in_flight: HashMap::new(),
            next_ticket: 0,
        }
    }

    /// Stores `bytes` and evicts least recently used entries over budget.
    fn insert(&mut self, url: String, bytes: Vec<u8>) {
        let size = bytes.len();
        if size > self.max_bytes {
            debug!("Not caching {} ({} bytes exceeds budget of {})", url, size, self.max_bytes);
            return;
        }

        if let Some(replaced) = self.cached.put(url, Arc::new(bytes)) {
            self.cached_bytes = self.cached_bytes.saturating_sub(replaced.len());
        }
        self.cached_bytes = self.cached_bytes.saturating_add(size);

        while self.cached_bytes > self.max_bytes {
            match self.cached.pop_lru() {
                Some((evicted, bytes)) => {
                    debug!("Evicting {} from preload cache", evicted);
                    self.cached_bytes = self.cached_bytes.saturating_sub(bytes.len());
                }
                None => break,
            }
        }
    }

    fn clear(&mut self) {
        for (_, fetch) in self.in_flight.drain() {
            fetch.handle.abort();
        }
        self.cached.clear();
        self.cached_bytes = 0;
    }
}

/// Keeps the images around the viewer's focus downloaded.
///
/// Each fetch runs as its own tokio task. Moving the focus aborts fetches
/// that fell out of the window. Within one [`focus`](Self::focus) call the
/// low-priority fetches start only after every high-priority fetch started
/// by that call has finished or been aborted, on any runtime flavor. Cached
/// bytes are held within `max_bytes`, evicting the least recently used
/// image first. Must be used inside a tokio runtime.
pub struct PreloadCache<F: ImageFetcher> {
    fetcher: Arc<F>,
    config: PreloadConfig,
    inner: Arc<Mutex<CacheInner>>,
}

impl PreloadCache<HttpImageFetcher> {
    pub fn from_config(config: &GalleryConfig) -> GalleryResult<Self> {
        Ok(Self::new(HttpImageFetcher::new(config)?, config.preload))
    }
}

impl<F: ImageFetcher> PreloadCache<F> {
    pub fn new(fetcher: F, config: PreloadConfig) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            inner: Arc::new(Mutex::new(CacheInner::new(config.max_bytes))),
            config,
        }
    }

    /// Moves the window to `index`. Returns how many fetches were started.
    pub fn focus(&self, images: &[ImageRecord], index: usize) -> usize {
        let wanted: Vec<(String, Priority)> = window(images.len(), index, self.config.ahead, self.config.behind)
            .into_iter()
            .map(|target| (images[target.index].url.clone(), target.priority))
            .filter(|(url, _)| !url.is_empty())
            .collect();

        let mut inner = self.inner.lock();

        let stale: Vec<String> = inner
            .in_flight
            .keys()
            .filter(|url| !wanted.iter().any(|(w, _)| w == *url))
            .cloned()
            .collect();
        for url in stale {
            if let Some(fetch) = inner.in_flight.remove(&url) {
                debug!("Aborting preload of {}", url);
                fetch.handle.abort();
            }
        }

        let mut to_start: Vec<(String, Priority)> = Vec::new();
        for (url, priority) in wanted {
            if inner.cached.contains(&url) {
                inner.cached.promote(&url);
            } else if !inner.in_flight.contains_key(&url) && !to_start.iter().any(|(u, _)| *u == url) {
                to_start.push((url, priority));
            }
        }

        let high = to_start.iter().filter(|(_, p)| *p == Priority::High).count();
        let permits = u32::try_from(high).unwrap_or(u32::MAX);
        let gate = Arc::new(Semaphore::new(permits as usize));

        for (url, priority) in &to_start {
            let gate = match priority {
                Priority::High => match Arc::clone(&gate).try_acquire_owned() {
                    Ok(permit) => Some(Gate::Holds(permit)),
                    Err(_) => None,
                },
                Priority::Low => Some(Gate::Waits(Arc::clone(&gate), permits)),
            };
            inner.next_ticket += 1;
            let ticket = inner.next_ticket;
            let handle = tokio::spawn(Self::run(
                Arc::clone(&self.fetcher),
                Arc::clone(&self.inner),
                url.clone(),
                *priority,
                ticket,
                gate,
            ));
            inner.in_flight.insert(url.clone(), InFlight { ticket, handle });
        }

        if !to_start.is_empty() {
            debug!("Started {} preloads around index {}", to_start.len(), index);
        }
        to_start.len()
    }

    async fn run(
        fetcher: Arc<F>,
        inner: Arc<Mutex<CacheInner>>,
        url: String,
        priority: Priority,
        ticket: u64,
        gate: Option<Gate>,
    ) {
        // a held permit is released when this future completes or is dropped
        let _permit = match gate {
            Some(Gate::Waits(semaphore, permits)) => {
                drop(semaphore.acquire_many_owned(permits).await);
                None
            }
            Some(Gate::Holds(permit)) => Some(permit),
            None => None,
        };

        let result = fetcher.fetch(&url, priority).await;

        let mut inner = inner.lock();
        if !inner.in_flight.get(&url).is_some_and(|fetch| fetch.ticket == ticket) {
            return;
        }
        inner.in_flight.remove(&url);

        match result {
            Ok(bytes) => {
                debug!("Preloaded {} ({} bytes)", url, bytes.len());
                inner.insert(url, bytes);
            }
            Err(e) => warn!("Failed to preload {}: {}", url, e),
        }
    }

    /// Cached bytes for `url`; counts as a use for eviction.
    pub fn get(&self, url: &str) -> Option<Arc<Vec<u8>>> {
        self.inner.lock().cached.get(url).cloned()
    }

    pub fn is_cached(&self, url: &str) -> bool {
        self.inner.lock().cached.contains(url)
    }

    pub fn is_loading(&self, url: &str) -> bool {
        self.inner.lock().in_flight.contains_key(url)
    }

    /// Cached bytes when available, otherwise the original URL.
    pub fn resolve_url(&self, url: &str) -> ImageSource {
        match self.get(url) {
            Some(bytes) => ImageSource::Cached(bytes),
            None => ImageSource::Remote(url.to_string()),
        }
    }

    pub fn cached_count(&self) -> usize {
        self.inner.lock().cached.len()
    }

    pub fn cached_bytes(&self) -> usize {
        self.inner.lock().cached_bytes
    }

    /// Aborts every fetch and empties the cache.
    pub fn clear(&self) {
        self.inner.lock().clear();
        debug!("Preload cache cleared");
    }
}

impl<F: ImageFetcher> Drop for PreloadCache<F> {
    fn drop(&mut self) {
        for (_, fetch) in self.inner.lock().in_flight.drain() {
            fetch.handle.abort();
        }
    }
}
