//! Renders the laid-out narrative, scrolled, with the current section
//! highlighted.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

use crate::app::document::{DocRow, StoryDocument};

use super::theme::Theme;

/// Left/right padding inside the story area.
const MARGIN: u16 = 2;

pub struct StoryWidget<'a> {
    pub document: &'a StoryDocument,
    /// First document row to show.
    pub scroll: usize,
    /// Index of the current section in `document.sections`, if any.
    pub current: Option<usize>,
}

impl StoryWidget<'_> {
    fn line(&self, row: &DocRow) -> Line<'static> {
        match row {
            DocRow::Blank => Line::raw(""),
            DocRow::Heading(text) => Line::from(Span::styled(text.clone(), Theme::heading_style())),
            DocRow::Title { section, text } => Line::from(Span::styled(
                text.clone(),
                Theme::section_title_style(self.current == Some(*section)),
            )),
            DocRow::Text { section, text } => Line::from(Span::styled(
                text.clone(),
                Theme::text_style(self.current == Some(*section)),
            )),
        }
    }
}

impl Widget for StoryWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width <= MARGIN * 2 {
            return;
        }
        let width = area.width - MARGIN * 2;
        let rows = self.document.rows.iter().skip(self.scroll).take(usize::from(area.height));
        for (y, row) in (area.y..).zip(rows) {
            buf.set_line(area.x + MARGIN, y, &self.line(row), width);
        }
    }
}
