//! Section entry actions: what happens once when a section becomes current.
//!
//! Each registered section maps to a marker filter, a bookmark ordinal and a
//! hiking-layer visibility flag.  Applying an entry fires three independent
//! side effects on the map; there is no rollback if a later one fails.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use super::error::StoryError;
use super::MapView;

/// Duration of every camera transition started by a section entry.
pub const TRANSITION_DURATION: Duration = Duration::from_millis(1500);

// ───────────────────────────────────────── filter ────────────

/// Predicate over the POI `name` attribute.  Markers that do not match are
/// dimmed with the [`ExcludedEffect`], never hidden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerFilter {
    /// Matches POIs whose name is in the list.
    NameIn(Vec<String>),
    /// Matches nothing; every marker is dimmed.
    Nothing,
    /// Matches every marker.
    Everything,
}

impl MarkerFilter {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::NameIn(names) => names.iter().any(|n| n == name),
            Self::Nothing => false,
            Self::Everything => true,
        }
    }
}

impl fmt::Display for MarkerFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameIn(names) => write!(f, "name in ({})", names.join(", ")),
            Self::Nothing => f.write_str("none"),
            Self::Everything => f.write_str("all"),
        }
    }
}

/// Visual effect for markers excluded by the filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExcludedEffect {
    /// 0 = full colour, 1 = fully desaturated.
    pub grayscale: f64,
    pub opacity: f64,
}

impl Default for ExcludedEffect {
    fn default() -> Self {
        Self {
            grayscale: 1.0,
            opacity: 0.3,
        }
    }
}

// ───────────────────────────────────────── table ─────────────

/// One-time action applied when a section becomes current.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryAction {
    pub filter: MarkerFilter,
    /// Ordinal into the map's bookmark list.
    pub bookmark: usize,
    /// Visibility of the secondary (hiking) layer.
    pub show_hiking: bool,
}

/// Static section id → [`EntryAction`] mapping.
#[derive(Debug, Clone, Default)]
pub struct SectionActionTable {
    entries: HashMap<String, EntryAction>,
}

impl SectionActionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, section: impl Into<String>, action: EntryAction) {
        self.entries.insert(section.into(), action);
    }

    pub fn get(&self, section: &str) -> Option<&EntryAction> {
        self.entries.get(section)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check every bookmark ordinal against the number of bookmarks.
    pub fn validate(&self, bookmark_count: usize) -> Result<(), StoryError> {
        // Sorted so the reported section is deterministic.
        let mut sections: Vec<_> = self.entries.iter().collect();
        sections.sort_by(|a, b| a.0.cmp(b.0));
        for (section, action) in sections {
            check_bookmark(section, action.bookmark, bookmark_count)?;
        }
        Ok(())
    }

    /// Apply the entry action registered for `section`.
    ///
    /// Returns `Ok(false)` for unregistered sections (silent no-op) and an
    /// error when the bookmark ordinal is out of range.  The bookmark check
    /// runs before any side effect.
    pub fn apply(&self, section: &str, map: &mut dyn MapView) -> Result<bool, StoryError> {
        let Some(action) = self.entries.get(section) else {
            tracing::debug!(section, "no entry action registered");
            return Ok(false);
        };
        check_bookmark(section, action.bookmark, map.bookmark_count())?;

        map.set_marker_effect(&action.filter, ExcludedEffect::default());
        map.go_to(action.bookmark, TRANSITION_DURATION);
        map.set_secondary_layer_visible(action.show_hiking);
        tracing::info!(
            section,
            filter = %action.filter,
            bookmark = action.bookmark,
            hiking = action.show_hiking,
            "entered section"
        );
        Ok(true)
    }
}

fn check_bookmark(section: &str, index: usize, available: usize) -> Result<(), StoryError> {
    if index >= available {
        return Err(StoryError::BookmarkOutOfRange {
            section: section.to_string(),
            index,
            available,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::testing::RecordingMap;

    fn table() -> SectionActionTable {
        let mut table = SectionActionTable::new();
        table.insert(
            "section-0",
            EntryAction {
                filter: MarkerFilter::NameIn(vec!["Coronado Island".into()]),
                bookmark: 0,
                show_hiking: false,
            },
        );
        table.insert(
            "section-2",
            EntryAction {
                filter: MarkerFilter::Nothing,
                bookmark: 2,
                show_hiking: true,
            },
        );
        table
    }

    #[test]
    fn test_filter_matching() {
        let f = MarkerFilter::NameIn(vec!["A".into(), "B".into()]);
        assert!(f.matches("A"));
        assert!(!f.matches("C"));
        assert!(!MarkerFilter::Nothing.matches("A"));
        assert!(MarkerFilter::Everything.matches("A"));
    }

    #[test]
    fn test_filter_display() {
        let f = MarkerFilter::NameIn(vec!["A".into(), "B".into()]);
        assert_eq!(f.to_string(), "name in (A, B)");
        assert_eq!(MarkerFilter::Nothing.to_string(), "none");
    }

    #[test]
    fn test_apply_fires_all_three_effects() {
        let mut map = RecordingMap::with_bookmarks(3);
        assert!(table().apply("section-2", &mut map).unwrap());
        assert_eq!(map.filters, vec![MarkerFilter::Nothing]);
        assert_eq!(map.transitions, vec![(2, TRANSITION_DURATION)]);
        assert_eq!(map.hiking, vec![true]);
    }

    #[test]
    fn test_unknown_section_is_noop() {
        let mut map = RecordingMap::with_bookmarks(3);
        assert!(!table().apply("epilogue", &mut map).unwrap());
        assert!(map.filters.is_empty());
        assert!(map.transitions.is_empty());
        assert!(map.hiking.is_empty());
    }

    #[test]
    fn test_out_of_range_bookmark_is_fatal() {
        let mut map = RecordingMap::with_bookmarks(2);
        let err = table().apply("section-2", &mut map).unwrap_err();
        assert!(matches!(
            err,
            StoryError::BookmarkOutOfRange { index: 2, available: 2, .. }
        ));
        assert!(map.filters.is_empty());
    }

    #[test]
    fn test_validate() {
        assert!(table().validate(3).is_ok());
        let err = table().validate(1).unwrap_err();
        assert!(err.to_string().contains("section-2"));
    }
}
