// Module declarations in dependency order
pub mod utils;
pub mod auth;
pub mod core;
pub mod api;
pub mod processing;
pub mod preload;

#[cfg(test)]
mod test_helpers;

// Public exports for external consumers
pub use api::{HttpImageApi, ImageApi, ImagePage, ListRequest};
pub use auth::{AuthEvent, AuthTokens, IdentityProvider, Session, SessionProvider, SessionStore, UserProfile};
pub use core::{
    DateRange, FilterCriteria, GalleryEngine, GalleryEvent, GallerySnapshot, GalleryState,
    ImageRecord, Progress, ProgressType, RawImageRecord, SortKey, SortOrder, UploadFailure,
    UploadFile, UploadSummary,
};
pub use preload::{HttpImageFetcher, ImageFetcher, ImageSource, PreloadCache};
pub use utils::{GalleryConfig, GalleryError, GalleryResult, init_tracing};
