//! Scroll progress: how far a section has travelled through the viewport.
//!
//! The map panel covers the bottom part of the window, so progress is
//! measured against a reduced "effective" viewport: a section starts making
//! progress once its top edge passes [`VIEWPORT_COVERAGE`] of the window
//! height, and is fully scrolled once its bottom edge passes the same line.

/// Fraction of the window height left visible above the map panel.
pub const VIEWPORT_COVERAGE: f64 = 0.65;

/// Lower clamp for the un-normalised progress.  Progress is never exactly
/// zero so consumers can treat any value as "started".
pub const PROGRESS_FLOOR: f64 = 0.01;

// ───────────────────────────────────────── bounds ────────────

/// Measured bounding box of a document element, relative to the window top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementBounds {
    /// Distance from the window top to the element's top edge.  Negative
    /// once the element has scrolled past the top.
    pub top: f64,
    /// Element height.
    pub height: f64,
}

impl ElementBounds {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }
}

// ───────────────────────────────────────── maths ─────────────

/// Viewport height used for progress measurement.
///
/// Uses [`VIEWPORT_COVERAGE`] of the window height; when the window height
/// is unavailable (absent or zero) the document client height is used as-is.
pub fn effective_viewport_height(window_height: Option<f64>, client_height: f64) -> f64 {
    match window_height {
        Some(h) if h > 0.0 => VIEWPORT_COVERAGE * h,
        _ => client_height,
    }
}

/// Normalised progress of `bounds` through a viewport of `viewport_height`.
///
/// Returns a value in `(0, 1]`: `clamp(viewport - top, 0.01, height) / height`.
pub fn compute_progress(bounds: ElementBounds, viewport_height: f64) -> f64 {
    if bounds.height <= 0.0 {
        return 1.0;
    }
    let travelled = (viewport_height - bounds.top)
        .max(PROGRESS_FLOOR)
        .min(bounds.height);
    travelled / bounds.height
}
