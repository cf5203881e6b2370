//! Terminal document layout: the narrative as a column of wrapped rows.
//!
//! One terminal row is one layout unit, so section bounds, scroll offsets and
//! window heights are all measured in rows.  The layout is rebuilt whenever
//! the terminal is resized.

use crate::story::{
    progress::ElementBounds,
    script::StoryScript,
    survey::SectionAnchor,
    DocumentLayout,
};

/// Sections are at least this fraction of the window tall, so each one owns
/// the viewport for a while.
const MIN_SECTION_FRACTION: f64 = 0.6;

/// One rendered row of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocRow {
    Blank,
    /// Story title (top of the document).
    Heading(String),
    /// Section title; `section` indexes [`StoryDocument::sections`].
    Title { section: usize, text: String },
    Text { section: usize, text: String },
}

/// Position of one section in document rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionBlock {
    pub id: String,
    /// First row of the section.
    pub start: usize,
    pub height: usize,
}

/// The laid-out narrative.
#[derive(Debug, Clone, Default)]
pub struct StoryDocument {
    pub rows: Vec<DocRow>,
    pub sections: Vec<SectionBlock>,
}

impl StoryDocument {
    /// Lay out `script` for a text column of `width` cells in a window of
    /// `window_rows` rows.
    pub fn layout(script: &StoryScript, width: u16, window_rows: u16) -> Self {
        let width = usize::from(width.max(8));
        let window = usize::from(window_rows.max(1));
        let min_height = (window as f64 * MIN_SECTION_FRACTION).ceil() as usize;

        let mut rows = Vec::new();
        // Lead-in: the story title sits mid-window before any section.
        rows.extend(std::iter::repeat(DocRow::Blank).take(window / 3));
        for line in wrap_words(&script.title, width) {
            rows.push(DocRow::Heading(line));
        }
        rows.extend(std::iter::repeat(DocRow::Blank).take(window / 2));

        let mut sections = Vec::with_capacity(script.sections.len());
        for (index, section) in script.sections.iter().enumerate() {
            let start = rows.len();
            for line in wrap_words(&section.title, width) {
                rows.push(DocRow::Title {
                    section: index,
                    text: line,
                });
            }
            for paragraph in &section.paragraphs {
                rows.push(DocRow::Blank);
                for line in wrap_words(paragraph, width) {
                    rows.push(DocRow::Text {
                        section: index,
                        text: line,
                    });
                }
            }
            while rows.len() - start < min_height {
                rows.push(DocRow::Blank);
            }
            sections.push(SectionBlock {
                id: section.id.clone(),
                start,
                height: rows.len() - start,
            });
        }

        // Tail so the last section can scroll all the way up.
        rows.extend(std::iter::repeat(DocRow::Blank).take(window));
        Self { rows, sections }
    }

    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    /// Largest useful scroll offset for a window of `window_rows`.
    pub fn max_scroll(&self, window_rows: u16) -> usize {
        self.rows.len().saturating_sub(usize::from(window_rows))
    }

    pub fn section_index(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }
}

// ───────────────────────────────────────── measured view ─────

/// The document scrolled to `scroll`, as seen through a window.
#[derive(Debug, Clone, Copy)]
pub struct DocumentView<'a> {
    doc: &'a StoryDocument,
    scroll: usize,
    window_rows: u16,
    /// Rows of the viewport that are on screen; the fallback measure when
    /// the window height is unavailable.
    client_rows: u16,
}

impl<'a> DocumentView<'a> {
    pub fn new(doc: &'a StoryDocument, scroll: usize, window_rows: u16) -> Self {
        Self {
            doc,
            scroll,
            window_rows,
            client_rows: window_rows,
        }
    }

    pub fn with_client_rows(mut self, rows: u16) -> Self {
        self.client_rows = rows;
        self
    }

    fn bounds(&self, block: &SectionBlock) -> ElementBounds {
        ElementBounds::new(
            block.start as f64 - self.scroll as f64,
            block.height as f64,
        )
    }
}

impl DocumentLayout for DocumentView<'_> {
    fn section_anchors(&self) -> Vec<SectionAnchor> {
        self.doc
            .sections
            .iter()
            .map(|block| SectionAnchor::new(block.id.clone(), self.bounds(block)))
            .collect()
    }

    fn element_bounds(&self, id: &str) -> Option<ElementBounds> {
        self.doc
            .sections
            .iter()
            .find(|block| block.id == id)
            .map(|block| self.bounds(block))
    }

    fn window_height(&self) -> Option<f64> {
        (self.window_rows > 0).then(|| f64::from(self.window_rows))
    }

    fn client_height(&self) -> f64 {
        f64::from(self.client_rows)
    }
}

// ───────────────────────────────────────── wrapping ──────────

/// Greedy word wrap to `width` columns.  Words longer than a line are split.
pub fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if line_len > 0 {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        if word.is_empty() {
            continue;
        }
        let needed = if line_len == 0 { word.len() } else { line_len + 1 + word.len() };
        if needed > width {
            lines.push(std::mem::take(&mut line));
            line_len = 0;
        }
        if line_len > 0 {
            line.push(' ');
            line_len += 1;
        }
        line.extend(word.iter());
        line_len += word.len();
    }
    if line_len > 0 {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::progress::effective_viewport_height;

    fn script() -> StoryScript {
        StoryScript::parse(
            "title = T\n\
             [bookmark]\ncenter = 0 0\nextent = 1\n\
             [section a]\ntext = alpha beta gamma delta\nbookmark = 0\n\
             [section b]\ntext = short\n",
        )
        .unwrap()
    }

    #[test]
    fn test_wrap_words() {
        assert_eq!(wrap_words("alpha beta gamma", 10), vec!["alpha beta", "gamma"]);
        assert_eq!(wrap_words("abcdefghijkl", 5), vec!["abcde", "fghij", "kl"]);
        assert!(wrap_words("   ", 5).is_empty());
    }

    #[test]
    fn test_sections_are_stacked_with_min_height() {
        let doc = StoryDocument::layout(&script(), 40, 20);
        assert_eq!(doc.sections.len(), 2);
        let (a, b) = (&doc.sections[0], &doc.sections[1]);
        assert_eq!(a.height, 12);
        assert_eq!(b.start, a.start + a.height);
        assert_eq!(doc.rows[a.start], DocRow::Title { section: 0, text: "a".into() });
        assert_eq!(doc.section_index("b"), Some(1));
    }

    #[test]
    fn test_view_measures_relative_to_scroll() {
        let doc = StoryDocument::layout(&script(), 40, 20);
        let start = doc.sections[1].start;
        let view = DocumentView::new(&doc, start, 20);
        let bounds = view.element_bounds("b").unwrap();
        assert_eq!(bounds.top, 0.0);
        assert_eq!(view.section_anchors().len(), 2);
        assert_eq!(view.window_height(), Some(20.0));
        assert!(view.element_bounds("missing").is_none());
    }

    #[test]
    fn test_client_height_is_the_viewport_not_the_document() {
        let doc = StoryDocument::layout(&script(), 40, 20);
        assert_eq!(DocumentView::new(&doc, 0, 20).client_height(), 20.0);

        // Without a window height, measurement falls back to the viewport rows.
        let view = DocumentView::new(&doc, 0, 0).with_client_rows(20);
        assert_eq!(view.window_height(), None);
        let viewport = effective_viewport_height(view.window_height(), view.client_height());
        assert_eq!(viewport, 20.0);
        assert!(viewport < doc.total_rows() as f64);
    }

    #[test]
    fn test_max_scroll_lets_last_section_reach_top() {
        let doc = StoryDocument::layout(&script(), 40, 20);
        assert!(doc.max_scroll(20) >= doc.sections[1].start);
    }
}
