//! Story engine: scroll survey, section state machine, progress maths and
//! progressive route drawing.
//!
//! Nothing in this module depends on any TUI or rendering crate.  The document
//! and the map are reached only through the [`DocumentLayout`] and [`MapView`]
//! traits, which the terminal host (and the tests) implement.

pub mod actions;
pub mod animator;
pub mod engine;
pub mod error;
pub mod progress;
pub mod route;
pub mod script;
pub mod survey;

#[cfg(test)]
pub(crate) mod testing;

use std::time::Duration;

use self::actions::{ExcludedEffect, MarkerFilter};
use self::engine::FeatureQuery;
use self::progress::ElementBounds;
use self::survey::SectionAnchor;

/// Read-only view of the narrative document's current layout.
pub trait DocumentLayout {
    /// Every section, measured now, in document order.
    fn section_anchors(&self) -> Vec<SectionAnchor>;

    /// Bounds of the section with `id`, or `None` if it is not in the document.
    fn element_bounds(&self, id: &str) -> Option<ElementBounds>;

    /// Window height, when the host knows it.
    fn window_height(&self) -> Option<f64>;

    /// Fallback height of the document's client area.
    fn client_height(&self) -> f64;
}

/// The map collaborator driven by section entries and route progress.
pub trait MapView {
    /// Number of entries in the bookmark list.
    fn bookmark_count(&self) -> usize;

    /// Start an animated camera transition to bookmark `index`.  Returns
    /// immediately; a new call supersedes a transition still in flight.
    fn go_to(&mut self, index: usize, duration: Duration);

    /// Highlight POIs matching `filter`; dim the rest with `excluded`.
    fn set_marker_effect(&mut self, filter: &MarkerFilter, excluded: ExcludedEffect);

    /// Show or hide the secondary (hiking) layer.
    fn set_secondary_layer_visible(&mut self, visible: bool);

    /// Ask for the route's feature ids.  The answer is delivered later through
    /// [`engine::StoryController::resolve_feature_ids`] with the same ticket.
    fn query_feature_ids(&mut self, query: FeatureQuery);
}
