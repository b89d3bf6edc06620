use std::collections::HashSet;

use api::camera::Camera;
use api::mediakit::MediaInfo;

/// Ids of every stream the media server reports, whatever its schema or app.
pub fn active_ids(media: &[MediaInfo]) -> HashSet<String> {
    media
        .iter()
        .filter(|m| !m.stream.is_empty())
        .map(|m| m.stream.clone())
        .collect()
}

/// Eligible cameras without a running stream, in registry order.
///
/// A camera listed twice by the registry is only planned once.
pub fn plan(cameras: &[Camera], active: &HashSet<String>) -> Vec<Camera> {
    let mut seen = HashSet::new();
    cameras
        .iter()
        .filter(|c| c.is_eligible())
        .filter(|c| !active.contains(&c.id))
        .filter(|c| seen.insert(c.id.clone()))
        .cloned()
        .collect()
}
