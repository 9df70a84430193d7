pub mod batch;
pub mod filter;
pub mod validation;

pub use batch::UploadBatchProcessor;
pub use filter::{apply_filters, available_tags};
pub use validation::validate_upload;
