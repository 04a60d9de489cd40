use crate::foundation::error::{StageError, StageResult};
use crate::scene::model::BatchDef;
use crate::scene::waypoint::Waypoint;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Immutable waypoint batch for one document load.
///
/// Parsing fails only when the input is not JSON or not a waypoint list at all; individual
/// malformed fields inside waypoints resolve to defaults.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct WaypointBatch {
    waypoints: Vec<Waypoint>,
}

impl WaypointBatch {
    /// Wrap already-normalized waypoints, preserving their order.
    pub fn new(waypoints: Vec<Waypoint>) -> Self {
        Self { waypoints }
    }

    /// Parse a batch from a JSON reader.
    #[tracing::instrument(skip(r))]
    pub fn from_reader<R: std::io::Read>(r: R) -> StageResult<Self> {
        let def: BatchDef = serde_json::from_reader(r)
            .map_err(|e| StageError::serde(format!("parse waypoint batch JSON: {e}")))?;
        Ok(Self::from_def(def))
    }

    /// Parse a batch from a JSON string.
    pub fn from_json_str(s: &str) -> StageResult<Self> {
        let def: BatchDef = serde_json::from_str(s)
            .map_err(|e| StageError::serde(format!("parse waypoint batch JSON: {e}")))?;
        Ok(Self::from_def(def))
    }

    /// Parse a batch from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> StageResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            StageError::validation(format!("open waypoint batch '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Waypoints in authoring order.
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Number of waypoints.
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Return `true` when the batch has no waypoints.
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Pairs of waypoint ids whose activation windows overlap.
    ///
    /// Overlaps are legal (the earlier waypoint wins) but usually indicate an authoring slip, so
    /// batch loading logs them.
    pub fn overlapping_windows(&self) -> Vec<(&str, &str)> {
        let mut out = Vec::new();
        for (i, a) in self.waypoints.iter().enumerate() {
            for b in &self.waypoints[i + 1..] {
                if a.activation_start < b.activation_end() && b.activation_start < a.activation_end()
                {
                    out.push((a.id.as_str(), b.id.as_str()));
                }
            }
        }
        out
    }

    fn from_def(def: BatchDef) -> Self {
        let waypoints: Vec<Waypoint> = def
            .waypoints
            .into_iter()
            .enumerate()
            .map(|(i, w)| Waypoint::from_def(i, w))
            .collect();
        let batch = Self { waypoints };
        for (a, b) in batch.overlapping_windows() {
            tracing::warn!(first = a, second = b, "waypoint windows overlap; first wins");
        }
        tracing::debug!(waypoints = batch.len(), "loaded waypoint batch");
        batch
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/batch.rs"]
mod tests;
