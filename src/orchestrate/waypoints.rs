use crate::scene::batch::WaypointBatch;
use crate::scene::waypoint::{Scene, Waypoint};

/// Emitted when the resolved waypoint changes.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneChange {
    /// Previously active waypoint id.
    pub previous: Option<String>,
    /// Newly active waypoint id (`None` when no window matches).
    pub current: Option<String>,
    /// Scroll fraction that triggered the change.
    pub scroll_fraction: f64,
}

/// Subscriber for [`SceneChange`] events.
pub type ChangeHandler = Box<dyn FnMut(&SceneChange)>;

/// Resolves the single active waypoint for a scroll fraction.
///
/// Waypoints are scanned in batch order and the first window containing the fraction wins, so
/// overlapping windows resolve by authoring order. Change events fire only when the resolved id
/// differs from the previous resolution.
pub struct WaypointOrchestrator {
    batch: WaypointBatch,
    active: Option<usize>,
    last_fraction: Option<f64>,
    handlers: Vec<ChangeHandler>,
    changes: u64,
}

impl std::fmt::Debug for WaypointOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaypointOrchestrator")
            .field("waypoints", &self.batch.len())
            .field("active", &self.active_id())
            .field("last_fraction", &self.last_fraction)
            .field("changes", &self.changes)
            .finish()
    }
}

impl Default for WaypointOrchestrator {
    fn default() -> Self {
        Self::new(WaypointBatch::default())
    }
}

impl WaypointOrchestrator {
    /// Orchestrator over `batch`, initially resolving nothing.
    pub fn new(batch: WaypointBatch) -> Self {
        Self {
            batch,
            active: None,
            last_fraction: None,
            handlers: Vec::new(),
            changes: 0,
        }
    }

    /// Swap in the batch for a new document load.
    ///
    /// Resolution state resets silently; the next [`WaypointOrchestrator::update`] emits a change
    /// if it resolves anything. Subscribers are kept.
    pub fn replace_batch(&mut self, batch: WaypointBatch) {
        self.batch = batch;
        self.active = None;
        self.last_fraction = None;
    }

    /// Register a change subscriber.
    pub fn on_change(&mut self, handler: ChangeHandler) {
        self.handlers.push(handler);
    }

    /// Resolve `scroll_fraction` and return the active `(scene, waypoint id)`.
    ///
    /// Non-finite input keeps the previous resolution.
    pub fn update(&mut self, scroll_fraction: f64) -> (Option<&Scene>, Option<&str>) {
        if scroll_fraction.is_finite() {
            self.last_fraction = Some(scroll_fraction);
            let next = self
                .batch
                .waypoints()
                .iter()
                .position(|w| w.contains(scroll_fraction));
            // Windows sharing an id are one scene to subscribers.
            let changed = self.id_at(next) != self.id_at(self.active);
            let previous = self.id_at(self.active).map(str::to_owned);
            self.active = next;
            if changed {
                let change = SceneChange {
                    previous,
                    current: self.active_id().map(str::to_owned),
                    scroll_fraction,
                };
                self.changes += 1;
                tracing::debug!(
                    previous = ?change.previous,
                    current = ?change.current,
                    scroll_fraction,
                    "active scene changed"
                );
                for handler in &mut self.handlers {
                    handler(&change);
                }
            }
        }
        (self.active_scene(), self.active_id())
    }

    /// Currently active waypoint.
    pub fn active(&self) -> Option<&Waypoint> {
        self.active.and_then(|i| self.batch.waypoints().get(i))
    }

    /// Scene of the currently active waypoint.
    pub fn active_scene(&self) -> Option<&Scene> {
        self.active().map(|w| &w.scene)
    }

    /// Id of the currently active waypoint.
    pub fn active_id(&self) -> Option<&str> {
        self.id_at(self.active)
    }

    /// Last finite fraction passed to [`WaypointOrchestrator::update`].
    pub fn last_fraction(&self) -> Option<f64> {
        self.last_fraction
    }

    /// Number of change events emitted so far.
    pub fn change_count(&self) -> u64 {
        self.changes
    }

    /// The batch being orchestrated.
    pub fn batch(&self) -> &WaypointBatch {
        &self.batch
    }

    fn id_at(&self, idx: Option<usize>) -> Option<&str> {
        idx.and_then(|i| self.batch.waypoints().get(i))
            .map(|w| w.id.as_str())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/orchestrate/waypoints.rs"]
mod tests;
