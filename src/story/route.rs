//! Line geometry: polylines, path length and partial-path extraction.
//!
//! Coordinates are plain map-space `f64` pairs (longitude/latitude in the
//! built-in story).  Lengths are planar; the animator only needs them to be
//! consistent along a single feature.

// ───────────────────────────────────────── points ────────────

/// A map-space coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapPoint {
    pub x: f64,
    pub y: f64,
}

impl MapPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: MapPoint) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Linear interpolation: `t = 0` is `self`, `t = 1` is `other`.
    pub fn lerp(self, other: MapPoint, t: f64) -> MapPoint {
        MapPoint::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

// ───────────────────────────────────────── polyline ──────────

/// An open polyline with precomputed cumulative segment lengths.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    points: Vec<MapPoint>,
    /// `cumulative[i]` = path length from the first vertex to vertex `i`.
    cumulative: Vec<f64>,
}

impl Polyline {
    pub fn new(points: Vec<MapPoint>) -> Self {
        let mut cumulative = Vec::with_capacity(points.len());
        let mut acc = 0.0;
        for (i, p) in points.iter().enumerate() {
            if i > 0 {
                acc += points[i - 1].distance(*p);
            }
            cumulative.push(acc);
        }
        Self { points, cumulative }
    }

    pub fn points(&self) -> &[MapPoint] {
        &self.points
    }

    /// Total path length.
    pub fn length(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// The vertex at `fraction` of the path length.
    pub fn point_at(&self, fraction: f64) -> Option<MapPoint> {
        self.prefix(fraction).last().copied()
    }

    /// The leading part of the path covering `fraction` of its length.
    ///
    /// The result ends on an interpolated vertex when the cut falls inside a
    /// segment.  `fraction <= 0` yields just the first vertex; `fraction >= 1`
    /// yields the full path.
    pub fn prefix(&self, fraction: f64) -> Vec<MapPoint> {
        let Some(&first) = self.points.first() else {
            return Vec::new();
        };
        let total = self.length();
        if fraction >= 1.0 {
            return self.points.clone();
        }
        if fraction <= 0.0 || total <= 0.0 {
            return vec![first];
        }

        let target = fraction * total;
        // First vertex strictly beyond the cut.
        let end = self.cumulative.partition_point(|&d| d <= target);
        let mut out = self.points[..end].to_vec();
        if end < self.points.len() {
            let seg_start = self.cumulative[end - 1];
            let seg_len = self.cumulative[end] - seg_start;
            if seg_len > 0.0 && target > seg_start {
                let t = (target - seg_start) / seg_len;
                out.push(self.points[end - 1].lerp(self.points[end], t));
            }
        }
        out
    }
}

// ───────────────────────────────────────── features ──────────

/// Collaborator-assigned identifier of one geometry record.
pub type FeatureId = u64;

/// One line feature of a layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LineFeature {
    pub id: FeatureId,
    /// Optional `type` attribute (e.g. `"road"` in the hiking layer).
    pub kind: Option<String>,
    pub path: Polyline,
}

/// An ordered set of line features.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineLayer {
    pub features: Vec<LineFeature>,
}

impl LineLayer {
    /// Build a layer from raw paths, assigning ids `1..=n` in load order.
    pub fn from_paths(paths: Vec<(Option<String>, Vec<MapPoint>)>) -> Self {
        let features = paths
            .into_iter()
            .zip(1..)
            .map(|((kind, points), id)| LineFeature {
                id,
                kind,
                path: Polyline::new(points),
            })
            .collect();
        Self { features }
    }

    /// Feature ids in stable load order.
    pub fn feature_ids(&self) -> Vec<FeatureId> {
        self.features.iter().map(|f| f.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l_shape() -> Polyline {
        // 3 units right, then 1 unit up: total length 4.
        Polyline::new(vec![
            MapPoint::new(0.0, 0.0),
            MapPoint::new(3.0, 0.0),
            MapPoint::new(3.0, 1.0),
        ])
    }

    #[test]
    fn test_length() {
        assert!((l_shape().length() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_prefix_interpolates_inside_segment() {
        let prefix = l_shape().prefix(0.25);
        assert_eq!(prefix, vec![MapPoint::new(0.0, 0.0), MapPoint::new(1.0, 0.0)]);
    }

    #[test]
    fn test_prefix_on_vertex_boundary() {
        let prefix = l_shape().prefix(0.75);
        assert_eq!(prefix, vec![MapPoint::new(0.0, 0.0), MapPoint::new(3.0, 0.0)]);
    }

    #[test]
    fn test_prefix_crosses_corner() {
        let prefix = l_shape().prefix(0.875);
        assert_eq!(prefix.len(), 3);
        let end = prefix[2];
        assert!((end.x - 3.0).abs() < 1e-12);
        assert!((end.y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_prefix_extremes() {
        let line = l_shape();
        assert_eq!(line.prefix(0.0), vec![MapPoint::new(0.0, 0.0)]);
        assert_eq!(line.prefix(1.0), line.points().to_vec());
        assert_eq!(line.prefix(7.0), line.points().to_vec());
        assert!(Polyline::new(Vec::new()).prefix(0.5).is_empty());
    }

    #[test]
    fn test_point_at() {
        let p = l_shape().point_at(0.5).unwrap();
        assert!((p.x - 2.0).abs() < 1e-12);
        assert_eq!(p.y, 0.0);
    }

    #[test]
    fn test_layer_ids_follow_load_order() {
        let layer = LineLayer::from_paths(vec![
            (None, vec![MapPoint::new(0.0, 0.0)]),
            (Some("road".into()), vec![MapPoint::new(1.0, 1.0)]),
        ]);
        assert_eq!(layer.feature_ids(), vec![1, 2]);
        assert_eq!(layer.features[1].kind.as_deref(), Some("road"));
    }
}
