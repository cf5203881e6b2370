//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).

use std::time::Instant;

use ratatui::layout::Rect;
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::story::{
    engine::{SeekOutcome, StoryController, TickOutcome},
    error::StoryError,
    script::StoryScript,
};
use crate::ui::layout::AppLayout;

use super::document::{DocumentView, StoryDocument};
use super::map_runtime::MapUpdate;
use super::map_view::{framing_viewpoint, TerminalMap};

/// Which view / overlay is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Story,
    SettingsMenu,
    ControlsSubmenu,
}

/// Top-level application state.
pub struct AppState {
    pub script: StoryScript,
    /// The narrative laid out for the current terminal size.
    pub document: StoryDocument,
    /// First document row shown at the top of the window.
    pub scroll: usize,
    /// Rows of the window the document is measured against.
    pub window_rows: u16,
    pub controller: StoryController,
    pub map: TerminalMap,
    /// Outcome of the most recent tick (shown in the survey overlay).
    pub last_outcome: Option<TickOutcome>,
    /// Outcome of the most recent feature-id resolution.
    pub last_seek: Option<SeekOutcome>,
    /// Set when an entry action hits a fatal configuration error.
    pub fatal: Option<StoryError>,
    /// Controls the main event loop.
    pub should_quit: bool,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
    pub active_view: ActiveView,
    pub config: AppConfig,
    /// Currently highlighted item in the settings menu.
    pub settings_selected: usize,
    /// Currently highlighted item in the controls submenu.
    pub controls_selected: usize,
    /// When `true`, the controls submenu is waiting for the user to press
    /// a key to rebind the action at `controls_selected`.
    pub awaiting_rebind: bool,
    /// Full terminal area, updated on resize.
    pub terminal_area: Rect,
    /// Monotonic frame counter (drives the loading spinner).
    pub tick: u64,
}

impl AppState {
    pub fn new(
        script: StoryScript,
        config: AppConfig,
        terminal_area: Rect,
        map_tx: mpsc::UnboundedSender<MapUpdate>,
    ) -> Self {
        let mut controller = script.controller();
        controller.set_discard_stale_seeks(config.discard_stale_seeks);

        let fallback = framing_viewpoint(
            script
                .route
                .features
                .iter()
                .flat_map(|f| f.path.points().iter().copied())
                .chain(script.pois.iter().map(|p| p.at)),
        );
        let map = TerminalMap::new(
            script.bookmarks.clone(),
            script.route.feature_ids(),
            fallback,
            map_tx,
        );

        let mut state = Self {
            script,
            document: StoryDocument::default(),
            scroll: 0,
            window_rows: 0,
            controller,
            map,
            last_outcome: None,
            last_seek: None,
            fatal: None,
            should_quit: false,
            status_message: None,
            active_view: ActiveView::default(),
            config,
            settings_selected: 0,
            controls_selected: 0,
            awaiting_rebind: false,
            terminal_area: Rect::default(),
            tick: 0,
        };
        state.resize(terminal_area);
        state
    }

    /// Re-lay out the document for a new terminal size.  The scroll position
    /// is kept proportional so the reader stays in the same place.
    pub fn resize(&mut self, area: Rect) {
        let old_total = self.document.total_rows().max(1);
        let layout = AppLayout::from_area(area);
        self.terminal_area = area;
        self.window_rows = layout.window_rows();
        self.document = StoryDocument::layout(&self.script, layout.story_area.width.saturating_sub(4), self.window_rows);
        self.scroll = self.scroll * self.document.total_rows() / old_total;
        self.scroll = self.scroll.min(self.document.max_scroll(self.window_rows));
    }

    /// Scroll to `row` (clamped) and run one survey + tick if it moved.
    pub fn scroll_to(&mut self, row: usize) {
        let row = row.min(self.document.max_scroll(self.window_rows));
        if row == self.scroll {
            return;
        }
        self.scroll = row;
        self.on_scroll();
    }

    pub fn scroll_by(&mut self, delta: isize) {
        self.scroll_to(self.scroll.saturating_add_signed(delta));
    }

    /// Rows of the story window on screen.
    fn visible_rows(&self) -> u16 {
        AppLayout::from_area(self.terminal_area).story_area.height
    }

    /// The scroll pipeline: survey, then tick.
    fn on_scroll(&mut self) {
        let view = DocumentView::new(&self.document, self.scroll, self.window_rows)
            .with_client_rows(self.visible_rows());
        match self.controller.on_scroll(&view, &mut self.map) {
            Ok(outcome) => {
                if let TickOutcome::Entered { section, .. } = &outcome {
                    self.status_message = self
                        .script
                        .sections
                        .iter()
                        .find(|s| &s.id == section)
                        .map(|s| s.title.clone());
                }
                self.last_outcome = Some(outcome);
            }
            Err(err) => {
                tracing::error!("{err}");
                self.fatal = Some(err);
                self.should_quit = true;
            }
        }
    }

    /// Finish a feature-id query or install the animated route.
    pub fn apply_map_update(&mut self, update: MapUpdate) {
        match update {
            MapUpdate::AnimatedLayerReady(Ok(layer)) => {
                self.controller.attach_animated_layer(layer);
                self.map.route_visible = true;
                tracing::debug!("animated route layer ready");
            }
            MapUpdate::AnimatedLayerReady(Err(err)) => {
                tracing::error!("{err}");
                self.fatal = Some(err);
                self.should_quit = true;
            }
            MapUpdate::FeatureIds { query, ids } => {
                let view = DocumentView::new(&self.document, self.scroll, self.window_rows)
                    .with_client_rows(self.visible_rows());
                let seek = self.controller.resolve_feature_ids(&query, &ids, &view);
                self.last_seek = Some(seek);
            }
        }
    }

    /// Advance animations by one frame.
    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        if self.map.camera.is_animating() {
            self.map.camera.tick(Instant::now());
        }
    }

    /// Scroll so the next section (after the current one) becomes current.
    pub fn jump_section(&mut self, forward: bool) {
        let current = self
            .controller
            .current_section()
            .and_then(|id| self.document.section_index(id));
        let target = match (current, forward) {
            (None, true) => Some(0),
            (None, false) => None,
            (Some(i), true) => Some(i + 1),
            (Some(i), false) => i.checked_sub(1),
        };
        let Some(start) = target.and_then(|i| self.document.sections.get(i)).map(|b| b.start) else {
            return;
        };
        // Section top lands mid-window, above the activation line.
        let lead = usize::from(self.window_rows / 2);
        self.scroll_to(start.saturating_sub(lead));
    }

    pub fn set_discard_stale_seeks(&mut self, discard: bool) {
        self.config.discard_stale_seeks = discard;
        self.controller.set_discard_stale_seeks(discard);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::camera::Viewpoint;
    use crate::story::{animator::AnimatedLayer, route::MapPoint};

    fn state() -> (AppState, mpsc::UnboundedReceiver<MapUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let script = StoryScript::builtin().unwrap();
        let state = AppState::new(script, AppConfig::default(), Rect::new(0, 0, 100, 41), tx);
        (state, rx)
    }

    #[test]
    fn test_starts_idle_at_top() {
        let (state, _rx) = state();
        assert_eq!(state.scroll, 0);
        assert_eq!(state.window_rows, 40);
        assert_eq!(state.controller.current_section(), None);
    }

    #[tokio::test]
    async fn test_jump_section_enters_sections_in_order() {
        let (mut state, _rx) = state();
        state.jump_section(true);
        assert_eq!(state.controller.current_section(), Some("section-0"));
        assert!(matches!(state.last_outcome, Some(TickOutcome::Entered { .. })));
        state.jump_section(true);
        assert_eq!(state.controller.current_section(), Some("section-1"));
        assert!(state.map.camera.is_animating());
        state.jump_section(false);
        assert_eq!(state.controller.current_section(), Some("section-0"));
    }

    #[tokio::test]
    async fn test_scrolling_within_animated_section_draws_route() {
        let (mut state, mut rx) = state();
        let route = state.script.route.clone();
        state.apply_map_update(MapUpdate::AnimatedLayerReady(Ok(AnimatedLayer::from_source(route))));
        assert!(state.map.route_visible);

        state.jump_section(true);
        state.jump_section(true);
        assert_eq!(state.controller.current_section(), Some("section-1"));
        state.scroll_by(4);
        assert!(matches!(state.last_outcome, Some(TickOutcome::ProgressRequested { .. })));

        let update = rx.recv().await.unwrap();
        assert!(matches!(update, MapUpdate::FeatureIds { .. }));
        state.apply_map_update(update);
        assert!(matches!(state.last_seek, Some(SeekOutcome::Applied { feature: 1, .. })));
        let drawn = state.controller.animated_layer().unwrap().drawn_fraction(1).unwrap();
        assert!(drawn > 0.0);
    }

    #[tokio::test]
    async fn test_missing_bookmark_aborts_the_story() {
        let (mut state, _rx) = state();
        let (tx, _map_rx) = mpsc::unbounded_channel();
        // A map with no bookmarks: section-0's camera move cannot resolve.
        state.map = TerminalMap::new(
            Vec::new(),
            Vec::new(),
            Viewpoint::new(MapPoint::new(0.0, 0.0), 1.0),
            tx,
        );

        state.jump_section(true);
        assert!(state.should_quit);
        assert!(matches!(
            state.fatal,
            Some(StoryError::BookmarkOutOfRange { index: 0, available: 0, .. })
        ));
    }
}
