use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// Trailing-edge debouncer for rapidly changing inputs such as the search box.
///
/// Each call to [`Debouncer::debounce`] waits for the configured delay and
/// returns the value only if no newer call started in the meantime. Clones
/// share the same generation counter.
pub struct Debouncer<T> {
    delay: Duration,
    generation: Arc<AtomicU64>,
    _value: PhantomData<fn(T) -> T>,
}

impl<T> Clone for Debouncer<T> {
    fn clone(&self) -> Self {
        Self {
            delay: self.delay,
            generation: Arc::clone(&self.generation),
            _value: PhantomData,
        }
    }
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
            _value: PhantomData,
        }
    }

    /// Resolves to `Some(value)` if this was the last call within the delay.
    pub async fn debounce(&self, value: T) -> Option<T> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;

        if self.generation.load(Ordering::SeqCst) == ticket {
            Some(value)
        } else {
            debug!("Debounced call {} superseded", ticket);
            None
        }
    }

    /// Drops whatever call is currently waiting.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}
