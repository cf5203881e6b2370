//! Layout helpers: split the terminal area into regions.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Share of the story window covered by the map panel, measured from the
/// bottom.  Progress is computed against the uncovered 65%.
const MAP_SHARE: u16 = 35;

/// Screen layout: the narrative fills everything above the status bar and
/// the map panel floats over the bottom of it.
pub struct AppLayout {
    pub story_area: Rect,
    pub map_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Compute the layout from the full terminal area.
    pub fn from_area(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // story window
                Constraint::Length(1), // status bar
            ])
            .split(area);
        let story_area = chunks[0];

        let overlay = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(100 - MAP_SHARE),
                Constraint::Percentage(MAP_SHARE),
            ])
            .split(story_area);

        Self {
            story_area,
            map_area: overlay[1],
            status_area: chunks[1],
        }
    }

    /// Height of the story window in rows.
    pub fn window_rows(&self) -> u16 {
        self.story_area.height
    }
}
