//! Upload task definition.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use crate::utils::{ImageFormat, ValidationError, format_from_file_name};

/// A single file queued for upload.
///
/// Holds the original file name (used for result attribution) and the raw
/// bytes that are base64-encoded into the upload request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadFile {
    /// Original file name, reported back in the upload summary
    pub name: String,
    /// File contents
    pub data: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn format(&self) -> Result<ImageFormat, ValidationError> {
        format_from_file_name(&self.name)
    }

    /// Payload as sent in the `imageData` field (standard base64, no data-URL prefix).
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }
}
