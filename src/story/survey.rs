//! Section survey: measure every section and pick the one owning the viewport.
//!
//! The registry is rebuilt from scratch on every scroll tick; nothing from the
//! previous tick is patched or reused.

use super::progress::ElementBounds;

/// A section is "current" once its top edge rises above this fraction of the
/// window height.
pub const ACTIVATION_THRESHOLD: f64 = 0.7;

// ───────────────────────────────────────── types ─────────────

/// A section element as measured by the document host.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionAnchor {
    pub id: String,
    pub bounds: ElementBounds,
}

impl SectionAnchor {
    pub fn new(id: impl Into<String>, bounds: ElementBounds) -> Self {
        Self {
            id: id.into(),
            bounds,
        }
    }
}

/// Per-tick measurement of one section.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: String,
    /// Top edge relative to the window top.
    pub top: f64,
    /// `top / window height`; negative once the section has scrolled past.
    pub percentage_top: f64,
}

/// All sections of the current tick, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionRegistry {
    pub sections: Vec<Section>,
}

impl SectionRegistry {
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

// ───────────────────────────────────────── survey ────────────

/// Window height used for `percentage_top`: the full window height, or the
/// client height when the window height is unavailable.
pub fn survey_height(window_height: Option<f64>, client_height: f64) -> f64 {
    match window_height {
        Some(h) if h > 0.0 => h,
        _ => client_height,
    }
}

/// Measure `anchors` and update `current`.
///
/// `current` becomes the id of the **last** section (in document order) whose
/// `percentage_top` is below [`ACTIVATION_THRESHOLD`].  When no section
/// qualifies `current` keeps its previous value.
pub fn survey(
    anchors: &[SectionAnchor],
    window_height: f64,
    current: &mut Option<String>,
) -> SectionRegistry {
    let sections = anchors
        .iter()
        .map(|anchor| {
            let top = anchor.bounds.top;
            let percentage_top = top / window_height;
            if percentage_top < ACTIVATION_THRESHOLD {
                *current = Some(anchor.id.clone());
            }
            Section {
                id: anchor.id.clone(),
                top,
                percentage_top,
            }
        })
        .collect();

    SectionRegistry { sections }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Anchors whose `percentage_top` equals the given fractions of a
    /// 1000-row window.
    fn anchors_at(fractions: &[f64]) -> Vec<SectionAnchor> {
        fractions
            .iter()
            .enumerate()
            .map(|(i, f)| SectionAnchor::new(format!("section-{i}"), ElementBounds::new(f * 1000.0, 400.0)))
            .collect()
    }

    #[test]
    fn test_only_qualifier_becomes_current() {
        let mut current = None;
        let registry = survey(&anchors_at(&[0.2, 0.8, 0.9]), 1000.0, &mut current);
        assert_eq!(current.as_deref(), Some("section-0"));
        assert_eq!(registry.len(), 3);
        assert!((registry.sections[1].percentage_top - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_last_qualifier_wins() {
        let mut current = Some("section-0".to_string());
        survey(&anchors_at(&[-0.1, 0.5, 0.9]), 1000.0, &mut current);
        assert_eq!(current.as_deref(), Some("section-1"));
    }

    #[test]
    fn test_current_is_sticky_when_nothing_qualifies() {
        let mut current = Some("section-2".to_string());
        let registry = survey(&anchors_at(&[0.75, 0.9, 1.3]), 1000.0, &mut current);
        assert_eq!(current.as_deref(), Some("section-2"));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut current = None;
        survey(&anchors_at(&[0.7]), 1000.0, &mut current);
        assert_eq!(current, None);
    }

    #[test]
    fn test_empty_document() {
        let mut current = Some("intro".to_string());
        let registry = survey(&[], 1000.0, &mut current);
        assert!(registry.is_empty());
        assert_eq!(current.as_deref(), Some("intro"));
    }

    #[test]
    fn test_survey_height_fallback() {
        assert_eq!(survey_height(Some(900.0), 500.0), 900.0);
        assert_eq!(survey_height(None, 500.0), 500.0);
    }
}
