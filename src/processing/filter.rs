//! Filter and sort pipeline for the derived gallery view.
//!
//! [`apply_filters`] is a pure function of the collection and the criteria:
//! query, then tags, then date range, then a stable sort. Running it twice on
//! the same inputs yields the same view.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;
use crate::core::{FilterCriteria, ImageRecord, SortKey, SortOrder};

pub fn apply_filters(images: &[ImageRecord], criteria: &FilterCriteria) -> Vec<ImageRecord> {
    let query = criteria.query.to_lowercase();

    let mut filtered: Vec<ImageRecord> = images
        .iter()
        .filter(|image| query.is_empty() || matches_query(image, &query))
        .filter(|image| criteria.tags.iter().all(|tag| image.has_tag_ignore_case(tag)))
        .filter(|image| {
            criteria
                .date_range
                .is_none_or(|range| range.contains(image.upload_date))
        })
        .cloned()
        .collect();

    // sort_by is stable, so equal keys keep collection order in both directions
    filtered.sort_by(|a, b| {
        let ordering = compare_by(a, b, criteria.sort_by);
        match criteria.sort_order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });

    filtered
}

/// Substring match against the name or any tag; `query` must be lowercase.
fn matches_query(image: &ImageRecord, query: &str) -> bool {
    image.file_name.to_lowercase().contains(query)
        || image.tags.iter().any(|tag| tag.to_lowercase().contains(query))
}

fn compare_by(a: &ImageRecord, b: &ImageRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::UploadDate => a.upload_date.cmp(&b.upload_date),
        SortKey::Name => locale_compare(&a.file_name, &b.file_name),
        SortKey::Size => a.size.cmp(&b.size),
    }
}

/// Collation in three levels: base letters, then accents, then case.
///
/// Base letters are the NFD decomposition with combining marks removed, so
/// `éclair` sorts between `apple` and `zebra`. Unaccented sorts before
/// accented and lowercase before uppercase when everything else ties.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(&base_letters(b))
        .then_with(|| decomposed_lowercase(a).cmp(&decomposed_lowercase(b)))
        .then_with(|| b.nfd().cmp(a.nfd()))
}

fn base_letters(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn decomposed_lowercase(s: &str) -> String {
    s.nfd().flat_map(char::to_lowercase).collect()
}

/// Sorted, deduplicated tags across the collection.
pub fn available_tags(images: &[ImageRecord]) -> Vec<String> {
    images
        .iter()
        .flat_map(|image| image.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
