//! The scroll coordination engine.
//!
//! Every scroll event runs the same two-stage pipeline: [`StoryController::survey`]
//! re-measures the sections, then [`StoryController::tick`] compares the
//! current section with the one whose entry action last ran:
//!
//! * different → **entry branch**: record it and apply its entry action once;
//! * same      → **progress branch**: ask the map for the route feature ids.
//!   When they arrive, [`StoryController::resolve_feature_ids`] measures the
//!   section and seeks the animated route to its scroll progress.
//!
//! The feature-id query is fire-and-forget.  A resolution that lands after a
//! newer section has been entered is still applied unless
//! `discard_stale_seeks` is enabled.

use std::collections::HashMap;

use super::actions::SectionActionTable;
use super::animator::AnimatedLayer;
use super::error::StoryError;
use super::progress::{compute_progress, effective_viewport_height};
use super::route::FeatureId;
use super::survey::{self, SectionRegistry};
use super::{DocumentLayout, MapView};

// ───────────────────────────────────────── outcomes ──────────

/// Ticket carried by an outstanding feature-id query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureQuery {
    /// Section that was current when the query was issued.
    pub section: String,
    /// Entry generation at issue time.
    pub generation: u64,
}

/// What a single tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No section has ever been current.
    Idle,
    /// A new section became current; `applied` is false when it has no
    /// registered entry action.
    Entered { section: String, applied: bool },
    /// Same section; a feature-id query was issued.
    ProgressRequested { section: String, ordinal: usize },
    /// Same section, but it drives no animation.
    NoAnimation { section: String },
    /// Same section, but the animated layer is not ready yet.
    AnimationPending { section: String },
}

/// What a feature-id resolution did.
#[derive(Debug, Clone, PartialEq)]
pub enum SeekOutcome {
    Applied { feature: FeatureId, progress: f64 },
    /// Discarded because a newer section was entered since the query.
    Stale,
    /// Nothing to seek: no layer, no current animation, no feature at the
    /// configured ordinal or no measurable anchor.
    Skipped,
}

// ───────────────────────────────────────── controller ────────

/// All per-session scroll state.  One instance per story; nothing is global.
#[derive(Debug)]
pub struct StoryController {
    actions: SectionActionTable,
    /// Section id → ordinal into the queried route feature ids.
    animation_index: HashMap<String, usize>,
    current: Option<String>,
    previous: Option<String>,
    registry: SectionRegistry,
    animated: Option<AnimatedLayer>,
    /// Bumped on every section entry.
    generation: u64,
    discard_stale_seeks: bool,
}

impl StoryController {
    pub fn new(actions: SectionActionTable, animation_index: HashMap<String, usize>) -> Self {
        Self {
            actions,
            animation_index,
            current: None,
            previous: None,
            registry: SectionRegistry::default(),
            animated: None,
            generation: 0,
            discard_stale_seeks: false,
        }
    }

    pub fn set_discard_stale_seeks(&mut self, discard: bool) {
        self.discard_stale_seeks = discard;
    }

    pub fn discard_stale_seeks(&self) -> bool {
        self.discard_stale_seeks
    }

    /// Install the animated route once its readiness signal has resolved.
    pub fn attach_animated_layer(&mut self, layer: AnimatedLayer) {
        self.animated = Some(layer);
    }

    pub fn animated_layer(&self) -> Option<&AnimatedLayer> {
        self.animated.as_ref()
    }

    pub fn current_section(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn previous_section(&self) -> Option<&str> {
        self.previous.as_deref()
    }

    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Handle one scroll event: survey, then tick.
    pub fn on_scroll(
        &mut self,
        doc: &dyn DocumentLayout,
        map: &mut dyn MapView,
    ) -> Result<TickOutcome, StoryError> {
        self.survey(doc);
        self.tick(map)
    }

    /// Rebuild the section registry and update the current section.
    pub fn survey(&mut self, doc: &dyn DocumentLayout) -> &SectionRegistry {
        let height = survey::survey_height(doc.window_height(), doc.client_height());
        self.registry = survey::survey(&doc.section_anchors(), height, &mut self.current);
        &self.registry
    }

    /// Advance the state machine by one tick.  Runs at most one branch.
    pub fn tick(&mut self, map: &mut dyn MapView) -> Result<TickOutcome, StoryError> {
        let Some(current) = self.current.clone() else {
            return Ok(TickOutcome::Idle);
        };

        if self.previous.as_deref() == Some(current.as_str()) {
            return Ok(self.progress_branch(current, map));
        }

        self.previous = Some(current.clone());
        self.generation = self.generation.wrapping_add(1);
        let applied = self.actions.apply(&current, map)?;
        Ok(TickOutcome::Entered {
            section: current,
            applied,
        })
    }

    fn progress_branch(&mut self, section: String, map: &mut dyn MapView) -> TickOutcome {
        let Some(&ordinal) = self.animation_index.get(&section) else {
            return TickOutcome::NoAnimation { section };
        };
        if self.animated.is_none() {
            return TickOutcome::AnimationPending { section };
        }
        map.query_feature_ids(FeatureQuery {
            section: section.clone(),
            generation: self.generation,
        });
        TickOutcome::ProgressRequested { section, ordinal }
    }

    /// Finish a progress branch once the map has answered its feature-id query.
    ///
    /// Reads the section that is current *now*, not the one that issued the
    /// query, and measures its anchor fresh.
    pub fn resolve_feature_ids(
        &mut self,
        query: &FeatureQuery,
        ids: &[FeatureId],
        doc: &dyn DocumentLayout,
    ) -> SeekOutcome {
        if self.discard_stale_seeks && query.generation != self.generation {
            tracing::debug!(section = %query.section, "discarding stale feature-id query");
            return SeekOutcome::Stale;
        }
        let Some(animated) = self.animated.as_mut() else {
            return SeekOutcome::Skipped;
        };
        let Some(section) = self.current.as_deref() else {
            return SeekOutcome::Skipped;
        };
        let Some(&ordinal) = self.animation_index.get(section) else {
            return SeekOutcome::Skipped;
        };
        let Some(&feature) = ids.get(ordinal) else {
            tracing::debug!(section, ordinal, available = ids.len(), "no route feature at ordinal");
            return SeekOutcome::Skipped;
        };
        let Some(bounds) = doc.element_bounds(section) else {
            tracing::debug!(section, "section anchor missing; seek skipped");
            return SeekOutcome::Skipped;
        };

        let viewport = effective_viewport_height(doc.window_height(), doc.client_height());
        let progress = compute_progress(bounds, viewport);
        animated.seek(progress, feature);
        SeekOutcome::Applied { feature, progress }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::actions::{EntryAction, MarkerFilter};
    use crate::story::route::{LineLayer, MapPoint};
    use crate::story::testing::{FakeDocument, RecordingMap};

    const WINDOW: f64 = 1000.0;

    fn controller(animated: &[(&str, usize)]) -> StoryController {
        let mut actions = SectionActionTable::new();
        for (i, id) in ["A", "B"].iter().enumerate() {
            actions.insert(
                *id,
                EntryAction {
                    filter: MarkerFilter::Everything,
                    bookmark: i,
                    show_hiking: false,
                },
            );
        }
        let index = animated.iter().map(|(s, o)| (s.to_string(), *o)).collect();
        StoryController::new(actions, index)
    }

    fn ready(mut c: StoryController) -> StoryController {
        let route = LineLayer::from_paths(vec![
            (None, vec![MapPoint::new(0.0, 0.0), MapPoint::new(4.0, 0.0)]),
            (None, vec![MapPoint::new(0.0, 1.0), MapPoint::new(4.0, 1.0)]),
        ]);
        c.attach_animated_layer(AnimatedLayer::from_source(route));
        c
    }

    /// Two stacked sections; `b_top` decides which one is current.
    fn doc(a_top: f64, b_top: f64) -> FakeDocument {
        FakeDocument::new(WINDOW).with_section("A", a_top, 600.0).with_section("B", b_top, 600.0)
    }

    #[test]
    fn test_idle_before_any_section_qualifies() {
        let mut c = controller(&[]);
        let mut map = RecordingMap::with_bookmarks(2);
        let outcome = c.on_scroll(&doc(800.0, 1400.0), &mut map).unwrap();
        assert_eq!(outcome, TickOutcome::Idle);
        assert!(map.transitions.is_empty());
    }

    #[test]
    fn test_entry_and_progress_alternate() {
        let mut c = ready(controller(&[("A", 0), ("B", 1)]));
        let mut map = RecordingMap::with_bookmarks(2);
        // Sections: A, A, B, B, B, A
        let docs = [
            doc(100.0, 900.0),
            doc(50.0, 850.0),
            doc(-500.0, 300.0),
            doc(-550.0, 250.0),
            doc(-600.0, 200.0),
            doc(0.0, 800.0),
        ];

        let mut entries = Vec::new();
        let mut progress = Vec::new();
        for (i, d) in docs.iter().enumerate() {
            match c.on_scroll(d, &mut map).unwrap() {
                TickOutcome::Entered { .. } => entries.push(i),
                TickOutcome::ProgressRequested { .. } => progress.push(i),
                other => panic!("unexpected outcome at {i}: {other:?}"),
            }
        }
        assert_eq!(entries, vec![0, 2, 5]);
        assert_eq!(progress, vec![1, 3, 4]);
        assert_eq!(map.transitions.iter().map(|t| t.0).collect::<Vec<_>>(), vec![0, 1, 0]);
        assert_eq!(map.queries.len(), 3);
    }

    #[test]
    fn test_section_without_animation_does_nothing() {
        let mut c = ready(controller(&[("B", 0)]));
        let mut map = RecordingMap::with_bookmarks(2);
        c.on_scroll(&doc(100.0, 900.0), &mut map).unwrap();
        let outcome = c.on_scroll(&doc(90.0, 890.0), &mut map).unwrap();
        assert_eq!(outcome, TickOutcome::NoAnimation { section: "A".into() });
        assert!(map.queries.is_empty());
    }

    #[test]
    fn test_progress_is_noop_until_layer_ready() {
        let mut c = controller(&[("A", 0)]);
        let mut map = RecordingMap::with_bookmarks(2);
        c.on_scroll(&doc(100.0, 900.0), &mut map).unwrap();
        let outcome = c.on_scroll(&doc(90.0, 890.0), &mut map).unwrap();
        assert_eq!(outcome, TickOutcome::AnimationPending { section: "A".into() });
        assert!(map.queries.is_empty());
    }

    #[test]
    fn test_resolution_seeks_to_scroll_progress() {
        let mut c = ready(controller(&[("A", 1)]));
        let mut map = RecordingMap::with_bookmarks(2);
        c.on_scroll(&doc(100.0, 900.0), &mut map).unwrap();
        // Effective viewport = 650; A top 500, height 600 → 150 / 600.
        let d = doc(500.0, 1300.0);
        c.on_scroll(&d, &mut map).unwrap();
        let query = map.queries.pop().unwrap();
        let outcome = c.resolve_feature_ids(&query, &[1, 2], &d);
        assert_eq!(outcome, SeekOutcome::Applied { feature: 2, progress: 0.25 });
        assert_eq!(c.animated_layer().unwrap().drawn_fraction(2), Some(0.25));
        assert_eq!(c.animated_layer().unwrap().drawn_fraction(1), Some(0.0));
    }

    #[test]
    fn test_resolution_skips_missing_feature_and_anchor() {
        let mut c = ready(controller(&[("A", 5)]));
        let mut map = RecordingMap::with_bookmarks(2);
        let d = doc(100.0, 900.0);
        c.on_scroll(&d, &mut map).unwrap();
        c.on_scroll(&d, &mut map).unwrap();
        let query = map.queries.pop().unwrap();
        assert_eq!(c.resolve_feature_ids(&query, &[1, 2], &d), SeekOutcome::Skipped);

        let mut c = ready(controller(&[("A", 0)]));
        c.on_scroll(&d, &mut map).unwrap();
        c.on_scroll(&d, &mut map).unwrap();
        let query = map.queries.pop().unwrap();
        let empty = FakeDocument::new(WINDOW);
        assert_eq!(c.resolve_feature_ids(&query, &[1, 2], &empty), SeekOutcome::Skipped);
    }

    #[test]
    fn test_stale_resolution_applied_by_default() {
        let mut c = ready(controller(&[("A", 0), ("B", 1)]));
        let mut map = RecordingMap::with_bookmarks(2);
        let on_a = doc(100.0, 900.0);
        c.on_scroll(&on_a, &mut map).unwrap();
        c.on_scroll(&on_a, &mut map).unwrap();
        let query = map.queries.pop().unwrap();

        let on_b = doc(-500.0, 300.0);
        c.on_scroll(&on_b, &mut map).unwrap();
        // Resolves against B, the section current at resolution time.
        let outcome = c.resolve_feature_ids(&query, &[1, 2], &on_b);
        assert!(matches!(outcome, SeekOutcome::Applied { feature: 2, .. }));
    }

    #[test]
    fn test_stale_resolution_discarded_when_enabled() {
        let mut c = ready(controller(&[("A", 0), ("B", 1)]));
        c.set_discard_stale_seeks(true);
        let mut map = RecordingMap::with_bookmarks(2);
        let on_a = doc(100.0, 900.0);
        c.on_scroll(&on_a, &mut map).unwrap();
        c.on_scroll(&on_a, &mut map).unwrap();
        let query = map.queries.pop().unwrap();

        let on_b = doc(-500.0, 300.0);
        c.on_scroll(&on_b, &mut map).unwrap();
        assert_eq!(c.resolve_feature_ids(&query, &[1, 2], &on_b), SeekOutcome::Stale);
        assert_eq!(c.animated_layer().unwrap().drawn_fraction(2), Some(0.0));
    }

    #[test]
    fn test_bookmark_error_propagates_from_tick() {
        let mut c = controller(&[]);
        let mut map = RecordingMap::with_bookmarks(1);
        c.on_scroll(&doc(100.0, 900.0), &mut map).unwrap();
        let err = c.on_scroll(&doc(-500.0, 300.0), &mut map).unwrap_err();
        assert!(matches!(err, StoryError::BookmarkOutOfRange { index: 1, .. }));
    }

    #[test]
    fn test_independent_controllers() {
        let mut first = controller(&[]);
        let second = controller(&[]);
        let mut map = RecordingMap::with_bookmarks(2);
        first.on_scroll(&doc(100.0, 900.0), &mut map).unwrap();
        assert_eq!(first.current_section(), Some("A"));
        assert_eq!(second.current_section(), None);
    }
}
