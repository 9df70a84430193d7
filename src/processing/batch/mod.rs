mod processor;

pub use processor::UploadBatchProcessor;
