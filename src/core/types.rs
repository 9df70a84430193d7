//! Core types for the gallery collection, filter criteria and batch results.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single image in the gallery, as held by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    /// Server-assigned identifier, unique within the collection
    pub id: String,
    /// Display name (original file name)
    pub file_name: String,
    /// Tags as provided by the server, never absent
    pub tags: Vec<String>,
    /// Upload time, if the server sent a parsable one
    pub upload_date: Option<DateTime<Utc>>,
    /// Stored size in bytes
    pub size: u64,
    /// Source URL of the full image
    pub url: String,
    /// Cached thumbnail URL, if any
    pub thumbnail_url: Option<String>,
}

impl ImageRecord {
    /// Thumbnail URL when one exists, otherwise the source URL.
    pub fn display_url(&self) -> &str {
        self.thumbnail_url.as_deref().unwrap_or(&self.url)
    }

    pub fn has_tag_ignore_case(&self, tag: &str) -> bool {
        let tag = tag.to_lowercase();
        self.tags.iter().any(|t| t.to_lowercase() == tag)
    }
}

/// Image record exactly as the list endpoint returned it.
///
/// The backend is loosely typed (tags may be missing or wrapped in
/// attribute-value objects, dates may be strings or epoch millis), so the
/// record is kept as JSON until [`RawImageRecord::normalize`] turns it into
/// an [`ImageRecord`]. Normalization never fails; bad fields get defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawImageRecord(pub Value);

impl From<Value> for RawImageRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl RawImageRecord {
    pub fn normalize(&self) -> ImageRecord {
        let file_name = string_field(&self.0, "fileName")
            .or_else(|| string_field(&self.0, "name"))
            .unwrap_or_default();
        let url = string_field(&self.0, "url").unwrap_or_default();
        let id = id_field(&self.0, "imageId")
            .or_else(|| Some(url.clone()).filter(|u| !u.is_empty()))
            .unwrap_or_else(|| file_name.clone());

        ImageRecord {
            id,
            tags: normalize_tags(self.0.get("tags")),
            upload_date: self.0.get("uploadDate").and_then(parse_timestamp),
            size: self.0.get("size").and_then(Value::as_u64).unwrap_or(0),
            thumbnail_url: string_field(&self.0, "thumbnailUrl").filter(|u| !u.is_empty()),
            file_name,
            url,
        }
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn id_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Tags arrive either as plain strings or as `{"S": "tag"}` attribute values.
fn normalize_tags(tags: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = tags else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Object(map) => map.get("S").and_then(Value::as_str).map(str::to_string),
            _ => None,
        })
        .collect()
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        }
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

/// Field the filtered view is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    #[serde(rename = "date")]
    UploadDate,
    Name,
    Size,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[serde(rename = "asc")]
    Ascending,
    #[default]
    #[serde(rename = "desc")]
    Descending,
}

impl SortOrder {
    pub fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Inclusive upload-date window; a missing bound is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Records without a timestamp never match an active range.
    pub fn contains(&self, timestamp: Option<DateTime<Utc>>) -> bool {
        let Some(ts) = timestamp else {
            return false;
        };
        self.start.is_none_or(|start| ts >= start) && self.end.is_none_or(|end| ts <= end)
    }
}

/// Everything the filtered view depends on besides the collection itself.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub query: String,
    /// Selected tags in toggle order; all must match
    pub tags: Vec<String>,
    pub date_range: Option<DateRange>,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
}

/// Per-file failure in an upload batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadFailure {
    pub name: String,
    pub error: String,
}

/// Outcome of an upload batch, in input order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UploadSummary {
    pub success: Vec<String>,
    pub failed: Vec<UploadFailure>,
}

impl UploadSummary {
    pub fn any_succeeded(&self) -> bool {
        !self.success.is_empty()
    }

    pub fn total(&self) -> usize {
        self.success.len() + self.failed.len()
    }
}
