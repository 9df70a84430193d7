//! Gallery state owned by the engine.
//!
//! Everything here is synchronous; network sequencing lives in
//! [`GalleryEngine`](super::GalleryEngine).

use std::collections::BTreeSet;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use crate::api::ImagePage;
use crate::core::types::{DateRange, FilterCriteria, ImageRecord, RawImageRecord, SortKey, SortOrder};
use crate::processing::filter;

/// Collection, criteria, derived view, selection and status flags.
#[derive(Debug, Clone)]
pub struct GalleryState {
    images: Vec<ImageRecord>,
    filtered: Vec<ImageRecord>,
    criteria: FilterCriteria,
    selected: BTreeSet<String>,
    select_mode: bool,
    viewing: Option<String>,
    cursor: Option<Value>,
    has_more: bool,
    loading: bool,
    error: Option<String>,
}

impl Default for GalleryState {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            filtered: Vec::new(),
            criteria: FilterCriteria::default(),
            selected: BTreeSet::new(),
            select_mode: false,
            viewing: None,
            cursor: None,
            has_more: true,
            loading: false,
            error: None,
        }
    }
}

/// Read-only copy of the visible state, handed to the host for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GallerySnapshot {
    pub images: Vec<ImageRecord>,
    pub filtered_images: Vec<ImageRecord>,
    pub criteria: FilterCriteria,
    pub available_tags: Vec<String>,
    pub selected_images: Vec<String>,
    pub select_mode: bool,
    pub viewing_image: Option<ImageRecord>,
    pub has_more: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub total_bytes: u64,
}

impl GalleryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    pub fn filtered_images(&self) -> &[ImageRecord] {
        &self.filtered
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn selected_images(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn is_select_mode(&self) -> bool {
        self.select_mode
    }

    pub fn cursor(&self) -> Option<&Value> {
        self.cursor.as_ref()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The record open in the full-size viewer, if it still exists.
    pub fn viewing_image(&self) -> Option<&ImageRecord> {
        let id = self.viewing.as_deref()?;
        self.images.iter().find(|image| image.id == id)
    }

    /// Replaces the collection with the normalized records.
    pub fn set_images<I>(&mut self, raw: I)
    where
        I: IntoIterator<Item = RawImageRecord>,
    {
        self.images.clear();
        self.merge(raw);
        self.prune_dangling();
        self.apply_filters();
    }

    /// Extends the collection. A record whose id is already present
    /// replaces the existing one in place.
    pub fn append_images<I>(&mut self, raw: I)
    where
        I: IntoIterator<Item = RawImageRecord>,
    {
        self.merge(raw);
        self.apply_filters();
    }

    fn merge<I>(&mut self, raw: I)
    where
        I: IntoIterator<Item = RawImageRecord>,
    {
        for record in raw {
            let image = record.normalize();
            match self.images.iter_mut().find(|existing| existing.id == image.id) {
                Some(existing) => {
                    debug!("Replacing duplicate image {}", image.id);
                    *existing = image;
                }
                None => self.images.push(image),
            }
        }
    }

    /// Stores a list page: page one replaces, later pages append.
    pub(crate) fn apply_page(&mut self, page: ImagePage, first_page: bool) {
        self.has_more = page.next_cursor.is_some();
        self.cursor = page.next_cursor;
        if first_page {
            self.set_images(page.images);
        } else {
            self.append_images(page.images);
        }
    }

    /// Forgets the cursor so the next fetch requests page one.
    pub(crate) fn rewind(&mut self) {
        self.cursor = None;
        self.has_more = true;
    }

    pub fn set_search_query(&mut self, query: &str) {
        self.criteria.query = query.to_string();
        self.apply_filters();
    }

    /// Adds the tag to the filter set, or removes it if already selected.
    pub fn toggle_tag(&mut self, tag: &str) {
        if tag.is_empty() {
            return;
        }
        match self.criteria.tags.iter().position(|t| t == tag) {
            Some(index) => {
                self.criteria.tags.remove(index);
            }
            None => self.criteria.tags.push(tag.to_string()),
        }
        self.apply_filters();
    }

    pub fn set_date_range(&mut self, range: Option<DateRange>) {
        self.criteria.date_range = range;
        self.apply_filters();
    }

    pub fn set_sort_by(&mut self, key: SortKey) {
        self.criteria.sort_by = key;
        self.apply_filters();
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.criteria.sort_order = order;
        self.apply_filters();
    }

    pub fn clear_filters(&mut self) {
        self.criteria = FilterCriteria::default();
        self.apply_filters();
    }

    /// Recomputes the derived view from the collection and criteria.
    pub fn apply_filters(&mut self) {
        self.filtered = filter::apply_filters(&self.images, &self.criteria);
    }

    pub fn available_tags(&self) -> Vec<String> {
        filter::available_tags(&self.images)
    }

    pub fn total_bytes(&self) -> u64 {
        self.images.iter().map(|image| image.size).sum()
    }

    /// Switches select mode. The selection is cleared either way.
    pub fn toggle_select_mode(&mut self) {
        self.select_mode = !self.select_mode;
        self.selected.clear();
    }

    /// Flips membership of `id` in the selection. Returns whether the
    /// selection changed.
    pub fn toggle_image_selection(&mut self, id: &str) -> bool {
        if !self.select_mode || !self.images.iter().any(|image| image.id == id) {
            return false;
        }
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Opens the viewer on `id`. Unknown ids are ignored.
    pub fn view_image(&mut self, id: &str) -> bool {
        if self.images.iter().any(|image| image.id == id) {
            self.viewing = Some(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn close_image_view(&mut self) {
        self.viewing = None;
    }

    /// Drops the given ids from the collection, selection and viewer in one
    /// pass. Returns how many records were removed.
    pub(crate) fn remove_images(&mut self, ids: &BTreeSet<String>) -> usize {
        let before = self.images.len();
        self.images.retain(|image| !ids.contains(&image.id));
        self.prune_dangling();
        self.apply_filters();
        before - self.images.len()
    }

    /// Completes a batch delete: removes the ids and leaves select mode.
    pub(crate) fn finish_batch_delete(&mut self, ids: &BTreeSet<String>) -> usize {
        let removed = self.remove_images(ids);
        self.selected.clear();
        self.select_mode = false;
        removed
    }

    fn prune_dangling(&mut self) {
        let images = &self.images;
        self.selected.retain(|id| images.iter().any(|image| &image.id == id));
        if self.viewing.as_ref().is_some_and(|id| !images.iter().any(|image| &image.id == id)) {
            self.viewing = None;
        }
    }

    pub(crate) fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub(crate) fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Back to the initial state: empty collection, default criteria.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn snapshot(&self) -> GallerySnapshot {
        GallerySnapshot {
            images: self.images.clone(),
            filtered_images: self.filtered.clone(),
            criteria: self.criteria.clone(),
            available_tags: self.available_tags(),
            selected_images: self.selected.iter().cloned().collect(),
            select_mode: self.select_mode,
            viewing_image: self.viewing_image().cloned(),
            has_more: self.has_more,
            loading: self.loading,
            error: self.error.clone(),
            total_bytes: self.total_bytes(),
        }
    }
}
