use crate::core::UploadFile;
use crate::utils::{ImageFormat, ValidationError};

/// Validates a file before it is sent to the upload endpoint.
///
/// Checks, in order: supported extension, non-empty payload, size limit.
pub fn validate_upload(file: &UploadFile, max_bytes: u64) -> Result<ImageFormat, ValidationError> {
    let format = file.format()?;

    if file.data.is_empty() {
        return Err(ValidationError::Empty(file.name.clone()));
    }

    if file.size() > max_bytes {
        return Err(ValidationError::TooLarge {
            name: file.name.clone(),
            size: file.size(),
            limit: max_bytes,
        });
    }

    Ok(format)
}
