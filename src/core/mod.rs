//! Core gallery types, state and the engine that sequences network calls.
//!
//! - [`GalleryEngine`]: owns the state and talks to the image API
//! - [`GalleryState`]: collection, filter criteria, derived view, selection
//! - [`ImageRecord`] / [`RawImageRecord`]: normalized and wire-form records
//! - [`UploadFile`]: a file queued for upload
//! - [`Progress`] / [`GalleryEvent`]: notifications for the host

mod engine;
mod progress;
mod state;
mod task;
mod types;

pub use engine::GalleryEngine;
pub use progress::{GalleryEvent, Progress, ProgressType};
pub use state::{GallerySnapshot, GalleryState};
pub use task::UploadFile;
pub use types::{
    DateRange, FilterCriteria, ImageRecord, RawImageRecord, SortKey, SortOrder, UploadFailure,
    UploadSummary,
};
