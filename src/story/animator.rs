//! Progressive line drawing: reveal a route feature up to a fraction of its
//! path length.
//!
//! [`LineLayerAnimation`] wraps a source line layer and asynchronously
//! derives an [`AnimatedLayer`] from it.  That future resolving is the
//! readiness signal: only the animated layer can be seeked, so nothing can be
//! drawn before it exists.

use super::error::StoryError;
use super::route::{FeatureId, LineFeature, LineLayer, MapPoint};

// ───────────────────────────────────────── builder ───────────

/// Pending animation over a source line layer.
#[derive(Debug)]
pub struct LineLayerAnimation {
    source: LineLayer,
}

impl LineLayerAnimation {
    pub fn new(source: LineLayer) -> Self {
        Self { source }
    }

    /// Resolve once the animated layer has been derived from the source.
    ///
    /// Path measurement runs on the blocking pool so large routes never stall
    /// the event loop.
    pub async fn when_animated_layer(self) -> Result<AnimatedLayer, StoryError> {
        let source = self.source;
        let layer = tokio::task::spawn_blocking(move || AnimatedLayer::from_source(source)).await?;
        Ok(layer)
    }
}

// ───────────────────────────────────────── animated layer ────

/// How much of one feature is currently drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationCursor {
    pub feature: FeatureId,
    /// Drawn fraction of the path length, in `[0, 1]`.
    pub fraction: f64,
}

/// A line layer whose features are drawn only up to their cursor.
#[derive(Debug, Clone)]
pub struct AnimatedLayer {
    features: Vec<LineFeature>,
    /// Parallel to `features`.
    cursors: Vec<AnimationCursor>,
}

impl AnimatedLayer {
    /// Derive the animated layer.  Every feature starts undrawn.
    pub fn from_source(source: LineLayer) -> Self {
        let cursors = source
            .features
            .iter()
            .map(|f| AnimationCursor {
                feature: f.id,
                fraction: 0.0,
            })
            .collect();
        Self {
            features: source.features,
            cursors,
        }
    }

    /// Draw exactly `progress` of feature `id`'s path; the rest is hidden.
    ///
    /// Seeking backwards retracts the line.  `progress` is clamped to
    /// `[0, 1]`; unknown ids are ignored.
    pub fn seek(&mut self, progress: f64, id: FeatureId) {
        let Some(cursor) = self.cursors.iter_mut().find(|c| c.feature == id) else {
            tracing::debug!(feature = id, "seek on unknown feature ignored");
            return;
        };
        let fraction = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        cursor.fraction = fraction;
    }

    /// Current drawn fraction of feature `id`.
    pub fn drawn_fraction(&self, id: FeatureId) -> Option<f64> {
        self.cursor(id).map(|c| c.fraction)
    }

    pub fn cursor(&self, id: FeatureId) -> Option<&AnimationCursor> {
        self.cursors.iter().find(|c| c.feature == id)
    }

    /// The drawn part of feature `id`, ending on an interpolated vertex.
    /// Empty while nothing is drawn.
    pub fn visible_path(&self, id: FeatureId) -> Option<Vec<MapPoint>> {
        let index = self.features.iter().position(|f| f.id == id)?;
        let fraction = self.cursors[index].fraction;
        if fraction <= 0.0 {
            return Some(Vec::new());
        }
        Some(self.features[index].path.prefix(fraction))
    }

    /// Leading end of the drawn part of feature `id`, while anything is drawn.
    pub fn head(&self, id: FeatureId) -> Option<MapPoint> {
        let fraction = self.drawn_fraction(id).filter(|&f| f > 0.0)?;
        let feature = self.features.iter().find(|f| f.id == id)?;
        feature.path.point_at(fraction)
    }

    /// Ids of all features in source order.
    pub fn feature_ids(&self) -> impl Iterator<Item = FeatureId> + '_ {
        self.features.iter().map(|f| f.id)
    }
}
