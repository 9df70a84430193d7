pub mod error;
pub mod config;
pub mod debounce;
pub mod formats;
pub mod fs;
pub mod logging;

pub use error::{GalleryError, GalleryResult, ValidationError};
pub use config::{GalleryConfig, PreloadConfig};
pub use debounce::Debouncer;
pub use formats::{ImageFormat, format_from_file_name};
pub use fs::read_upload_file;
pub use logging::init_tracing;
