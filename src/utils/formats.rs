use serde::{Deserialize, Serialize};
use std::str::FromStr;
use crate::utils::ValidationError;

/// Image formats the upload endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    JPEG,
    PNG,
    GIF,
}

impl ImageFormat {
    /// Get file extensions associated with this format
    pub fn extensions(&self) -> &[&str] {
        match self {
            Self::JPEG => &["jpg", "jpeg"],
            Self::PNG => &["png"],
            Self::GIF => &["gif"],
        }
    }

    /// Check if the extension matches this format
    pub fn matches_extension(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        self.extensions().contains(&ext.as_str())
    }

    /// MIME type sent to hosts that need one (e.g. object URLs)
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::JPEG => "image/jpeg",
            Self::PNG => "image/png",
            Self::GIF => "image/gif",
        }
    }
}

impl FromStr for ImageFormat {
    type Err = ValidationError;

    fn from_str(ext: &str) -> Result<Self, Self::Err> {
        [Self::JPEG, Self::PNG, Self::GIF]
            .into_iter()
            .find(|format| format.matches_extension(ext))
            .ok_or_else(|| ValidationError::UnsupportedFormat(ext.to_lowercase()))
    }
}

/// Get format from a file name's extension
pub fn format_from_file_name(name: &str) -> Result<ImageFormat, ValidationError> {
    let ext = std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| ValidationError::UnsupportedFormat(name.to_string()))?;

    ImageFormat::from_str(ext)
}
