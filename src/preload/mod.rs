//! Viewer-side image preloading.
//!
//! [`window`] picks which neighbours of the focused image to fetch,
//! [`PreloadCache`] runs and cancels the fetches, and [`ImageFetcher`] is the
//! download seam ([`HttpImageFetcher`] in production).

mod cache;
mod fetcher;
mod window;

pub use cache::{ImageSource, PreloadCache};
pub use fetcher::{HttpImageFetcher, ImageFetcher};
pub use window::{PreloadTarget, Priority, window};
