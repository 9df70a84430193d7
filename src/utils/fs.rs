use std::path::Path;
use tokio::fs;
use crate::core::UploadFile;
use crate::utils::{GalleryError, GalleryResult};

/// Reads a file from disk into an upload payload named after its file name.
pub async fn read_upload_file(path: impl AsRef<Path>) -> GalleryResult<UploadFile> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| GalleryError::Io(format!("Not a file: {}", path.display())))?;

    let data = fs::read(path)
        .await
        .map_err(|e| GalleryError::Io(format!("Failed to read {}: {}", path.display(), e)))?;

    Ok(UploadFile::new(name, data))
}
