use crate::foundation::core::Point;
use std::collections::{HashMap, VecDeque};

/// Bounded ring of recent positions for one entity, oldest first.
#[derive(Clone, Debug)]
pub struct TrailBuffer {
    cap: usize,
    points: VecDeque<Point>,
}

impl TrailBuffer {
    /// Empty buffer holding at most `cap` positions (at least one).
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            cap,
            points: VecDeque::with_capacity(cap),
        }
    }

    /// Append a position, evicting the oldest when full. Non-finite positions are ignored.
    pub fn push(&mut self, p: Point) {
        if !p.x.is_finite() || !p.y.is_finite() {
            return;
        }
        if self.points.len() == self.cap {
            self.points.pop_front();
        }
        self.points.push_back(p);
    }

    /// Number of stored positions.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Return `true` when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Maximum number of stored positions.
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Positions, oldest first.
    pub fn points(&self) -> impl ExactSizeIterator<Item = Point> + '_ {
        self.points.iter().copied()
    }

    /// Drop all positions.
    pub fn clear(&mut self) {
        self.points.clear();
    }
}

/// Trail buffers keyed by entity id, owned by one renderer instance.
#[derive(Clone, Debug, Default)]
pub(crate) struct TrailStore {
    cap: usize,
    by_entity: HashMap<String, TrailBuffer>,
}

impl TrailStore {
    pub(crate) fn new(cap: usize) -> Self {
        Self {
            cap,
            by_entity: HashMap::new(),
        }
    }

    pub(crate) fn record(&mut self, entity_id: &str, p: Point) -> &TrailBuffer {
        let cap = self.cap;
        let buf = self
            .by_entity
            .entry(entity_id.to_owned())
            .or_insert_with(|| TrailBuffer::new(cap));
        buf.push(p);
        buf
    }

    pub(crate) fn get(&self, entity_id: &str) -> Option<&TrailBuffer> {
        self.by_entity.get(entity_id)
    }

    pub(crate) fn len(&self) -> usize {
        self.by_entity.len()
    }

    pub(crate) fn reset(&mut self) {
        self.by_entity.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/trail.rs"]
mod tests;
