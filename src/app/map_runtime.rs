//! Background map jobs, so the event loop never waits on the map.
//!
//! Results come back over an unbounded channel and are applied by the main
//! loop in whatever order they finish.

use tokio::sync::mpsc;

use crate::story::{
    animator::{AnimatedLayer, LineLayerAnimation},
    engine::FeatureQuery,
    error::StoryError,
    route::{FeatureId, LineLayer},
};

pub enum MapUpdate {
    /// The animated route layer is ready to be added to the map.
    AnimatedLayerReady(Result<AnimatedLayer, StoryError>),
    /// Answer to a feature-id query issued by a progress tick.
    FeatureIds {
        query: FeatureQuery,
        ids: Vec<FeatureId>,
    },
}

/// Derive the animated route layer in the background.
pub fn spawn_animated_layer(tx: mpsc::UnboundedSender<MapUpdate>, source: LineLayer) {
    tokio::spawn(async move {
        let result = LineLayerAnimation::new(source).when_animated_layer().await;
        let _ = tx.send(MapUpdate::AnimatedLayerReady(result));
    });
}

/// Answer a feature-id query asynchronously.
pub fn spawn_feature_query(
    tx: mpsc::UnboundedSender<MapUpdate>,
    query: FeatureQuery,
    ids: Vec<FeatureId>,
) {
    tokio::spawn(async move {
        // Always resolve after the current tick has finished.
        tokio::task::yield_now().await;
        let _ = tx.send(MapUpdate::FeatureIds { query, ids });
    });
}
