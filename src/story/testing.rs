//! Test doubles for the document and map collaborators.

use std::time::Duration;

use super::actions::{ExcludedEffect, MarkerFilter};
use super::engine::FeatureQuery;
use super::progress::ElementBounds;
use super::survey::SectionAnchor;
use super::{DocumentLayout, MapView};

/// Document with fixed section bounds.
#[derive(Debug, Clone)]
pub struct FakeDocument {
    window: Option<f64>,
    client: f64,
    anchors: Vec<SectionAnchor>,
}

impl FakeDocument {
    pub fn new(window: f64) -> Self {
        Self {
            window: Some(window),
            client: window,
            anchors: Vec::new(),
        }
    }

    pub fn with_section(mut self, id: &str, top: f64, height: f64) -> Self {
        self.anchors.push(SectionAnchor::new(id, ElementBounds::new(top, height)));
        self
    }
}

impl DocumentLayout for FakeDocument {
    fn section_anchors(&self) -> Vec<SectionAnchor> {
        self.anchors.clone()
    }

    fn element_bounds(&self, id: &str) -> Option<ElementBounds> {
        self.anchors.iter().find(|a| a.id == id).map(|a| a.bounds)
    }

    fn window_height(&self) -> Option<f64> {
        self.window
    }

    fn client_height(&self) -> f64 {
        self.client
    }
}

/// Map that records every call.
#[derive(Debug, Default)]
pub struct RecordingMap {
    pub bookmarks: usize,
    pub filters: Vec<MarkerFilter>,
    pub transitions: Vec<(usize, Duration)>,
    pub hiking: Vec<bool>,
    pub queries: Vec<FeatureQuery>,
}

impl RecordingMap {
    pub fn with_bookmarks(bookmarks: usize) -> Self {
        Self {
            bookmarks,
            ..Self::default()
        }
    }
}

impl MapView for RecordingMap {
    fn bookmark_count(&self) -> usize {
        self.bookmarks
    }

    fn go_to(&mut self, index: usize, duration: Duration) {
        self.transitions.push((index, duration));
    }

    fn set_marker_effect(&mut self, filter: &MarkerFilter, _excluded: ExcludedEffect) {
        self.filters.push(filter.clone());
    }

    fn set_secondary_layer_visible(&mut self, visible: bool) {
        self.hiking.push(visible);
    }

    fn query_feature_ids(&mut self, query: FeatureQuery) {
        self.queries.push(query);
    }
}
