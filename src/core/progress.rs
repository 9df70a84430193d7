use serde::{Deserialize, Serialize};

/// Progress message type
#[derive(Debug, Deserialize, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ProgressType {
    Start,
    Progress,
    Complete,
    Error,
}

/// Upload batch progress broadcast to the host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Progress type (start, progress, complete, error)
    pub progress_type: ProgressType,
    /// Number of files attempted so far
    pub completed_tasks: usize,
    /// Total number of files in the batch
    pub total_tasks: usize,
    /// Progress percentage (0-100)
    pub progress_percentage: usize,
    /// Current status message
    pub status: String,
    /// File the update refers to
    #[serde(default)]
    pub file_name: Option<String>,
    /// Failure reason for `Error` updates
    #[serde(default)]
    pub error: Option<String>,
}

impl Progress {
    /// Create a new Progress instance with basic information
    pub fn new(
        progress_type: ProgressType,
        completed_tasks: usize,
        total_tasks: usize,
        status: &str,
    ) -> Self {
        let progress_percentage = if total_tasks > 0 {
            (completed_tasks * 100) / total_tasks
        } else {
            0
        };

        Self {
            progress_type,
            completed_tasks,
            total_tasks,
            progress_percentage,
            status: status.to_string(),
            file_name: None,
            error: None,
        }
    }

    pub fn with_file(mut self, file_name: &str) -> Self {
        self.file_name = Some(file_name.to_string());
        self
    }

    pub fn with_error(mut self, error: &str) -> Self {
        self.error = Some(error.to_string());
        self
    }
}

/// Notifications emitted by the engine; the host re-renders on `Changed`.
#[derive(Debug, Clone, PartialEq)]
pub enum GalleryEvent {
    /// Collection, criteria, selection or flags changed
    Changed,
    /// An operation failed; carries the user-facing message
    Error(String),
    /// Per-file upload progress
    Upload(Progress),
}
