//! The terminal map panel's model: camera, marker effect, layer visibility.
//!
//! Implements [`MapView`] for the story engine.  Camera transitions and
//! feature-id queries return immediately; their effects arrive later through
//! [`CameraTween::tick`] and the [`MapUpdate`] channel.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::story::{
    actions::{ExcludedEffect, MarkerFilter},
    engine::FeatureQuery,
    route::{FeatureId, MapPoint},
    script::Bookmark,
    MapView,
};

use super::camera::{CameraTween, Viewpoint};
use super::map_runtime::{self, MapUpdate};

/// Map panel state.
pub struct TerminalMap {
    bookmarks: Vec<Bookmark>,
    pub camera: CameraTween,
    /// Active marker filter; non-matching markers use `excluded`.
    pub filter: MarkerFilter,
    pub excluded: ExcludedEffect,
    pub hiking_visible: bool,
    /// Set once the animated route layer has been added.
    pub route_visible: bool,
    /// Route feature ids in load order, answered to queries.
    route_ids: Vec<FeatureId>,
    tx: mpsc::UnboundedSender<MapUpdate>,
}

impl TerminalMap {
    /// A map showing the first bookmark (or `fallback` when there are none).
    pub fn new(
        bookmarks: Vec<Bookmark>,
        route_ids: Vec<FeatureId>,
        fallback: Viewpoint,
        tx: mpsc::UnboundedSender<MapUpdate>,
    ) -> Self {
        let initial = bookmarks
            .first()
            .map_or(fallback, |b| Viewpoint::new(b.center, b.extent));
        Self {
            bookmarks,
            camera: CameraTween::new(initial),
            filter: MarkerFilter::Everything,
            excluded: ExcludedEffect::default(),
            hiking_visible: false,
            route_visible: false,
            route_ids,
            tx,
        }
    }

    /// Name of the bookmark the camera is at or heading to, if any.
    pub fn bookmark_name(&self) -> Option<&str> {
        let target = self.camera.target();
        self.bookmarks
            .iter()
            .find(|b| b.center == target.center && b.extent == target.extent)
            .map(|b| b.name.as_str())
    }
}

impl MapView for TerminalMap {
    fn bookmark_count(&self) -> usize {
        self.bookmarks.len()
    }

    fn go_to(&mut self, index: usize, duration: Duration) {
        let Some(bookmark) = self.bookmarks.get(index) else {
            return;
        };
        tracing::debug!(bookmark = %bookmark.name, ?duration, "camera transition");
        self.camera.start(
            Viewpoint::new(bookmark.center, bookmark.extent),
            duration,
            Instant::now(),
        );
    }

    fn set_marker_effect(&mut self, filter: &MarkerFilter, excluded: ExcludedEffect) {
        self.filter = filter.clone();
        self.excluded = excluded;
    }

    fn set_secondary_layer_visible(&mut self, visible: bool) {
        self.hiking_visible = visible;
    }

    fn query_feature_ids(&mut self, query: FeatureQuery) {
        map_runtime::spawn_feature_query(self.tx.clone(), query, self.route_ids.clone());
    }
}

/// Viewpoint framing all of `points`, for stories without bookmarks.
pub fn framing_viewpoint(points: impl IntoIterator<Item = MapPoint>) -> Viewpoint {
    let mut iter = points.into_iter();
    let Some(first) = iter.next() else {
        return Viewpoint::new(MapPoint::new(0.0, 0.0), 1.0);
    };
    let (lo, hi) = iter.fold((first, first), |(lo, hi), p| {
        (
            MapPoint::new(lo.x.min(p.x), lo.y.min(p.y)),
            MapPoint::new(hi.x.max(p.x), hi.y.max(p.y)),
        )
    });
    let extent = ((hi.x - lo.x).max(hi.y - lo.y) / 2.0 * 1.2).max(0.01);
    Viewpoint::new(lo.lerp(hi, 0.5), extent)
}
