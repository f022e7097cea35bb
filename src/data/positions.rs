//! Per-vertex geometry: current and target positions.
//!
//! Positions live outside the complex, slot-indexed parallel to the vertex
//! arena. Each vertex carries a `current` position (where it is) and a
//! `target` position (where the caller wants it); the motion pass moves
//! current toward target under the inversion guard.

use crate::mesh_error::MeshMorphError;
use crate::phase::{Dimension, Phase};
use crate::topology::delta::MutationDelta;
use crate::topology::handle::VertexId;

#[derive(Debug, Clone, Copy)]
struct VertexPosition {
    current: [f64; 2],
    target: [f64; 2],
}

/// Current/target position pairs for every live vertex.
#[derive(Debug, Clone, Default)]
pub struct PositionState {
    slots: Vec<Option<VertexPosition>>,
}

impl PositionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a vertex with `current == target == position`.
    pub fn insert(&mut self, v: VertexId, position: [f64; 2]) {
        let slot = v.slot() as usize;
        if slot >= self.slots.len() {
            self.slots.resize(slot + 1, None);
        }
        self.slots[slot] = Some(VertexPosition {
            current: position,
            target: position,
        });
    }

    pub fn remove(&mut self, v: VertexId) {
        if let Some(entry) = self.slots.get_mut(v.slot() as usize) {
            *entry = None;
        }
    }

    fn entry(&self, v: VertexId) -> Result<&VertexPosition, MeshMorphError> {
        self.slots
            .get(v.slot() as usize)
            .and_then(|e| e.as_ref())
            .ok_or(MeshMorphError::StaleVertex(v))
    }

    fn entry_mut(&mut self, v: VertexId) -> Result<&mut VertexPosition, MeshMorphError> {
        self.slots
            .get_mut(v.slot() as usize)
            .and_then(|e| e.as_mut())
            .ok_or(MeshMorphError::StaleVertex(v))
    }

    /// Current position of a vertex.
    pub fn current(&self, v: VertexId) -> Result<[f64; 2], MeshMorphError> {
        Ok(self.entry(v)?.current)
    }

    /// Target position of a vertex.
    pub fn target(&self, v: VertexId) -> Result<[f64; 2], MeshMorphError> {
        Ok(self.entry(v)?.target)
    }

    pub fn set_current(&mut self, v: VertexId, position: [f64; 2]) -> Result<(), MeshMorphError> {
        self.entry_mut(v)?.current = position;
        Ok(())
    }

    pub fn set_target(&mut self, v: VertexId, position: [f64; 2]) -> Result<(), MeshMorphError> {
        self.entry_mut(v)?.target = position;
        Ok(())
    }

    /// Current positions of a phase's vertices, in phase (local) order.
    pub fn phase_current(&self, phase: &Phase) -> Result<Vec<[f64; 2]>, MeshMorphError> {
        phase.vertices().iter().map(|&v| self.current(v)).collect()
    }

    /// Set target positions for a phase's vertices, in phase (local) order.
    pub fn set_phase_targets(
        &mut self,
        phase: &Phase,
        targets: &[[f64; 2]],
    ) -> Result<(), MeshMorphError> {
        if targets.len() != phase.vertex_count() {
            return Err(MeshMorphError::SubRangeLengthMismatch {
                dimension: Dimension::Vertex,
                expected: phase.vertex_count(),
                found: targets.len(),
            });
        }
        for (&v, &target) in phase.vertices().iter().zip(targets) {
            self.set_target(v, target)?;
        }
        Ok(())
    }

    /// Replay a committed topology mutation: seed created vertices, place
    /// moved survivors (current and target both land on the placement), and
    /// drop removed vertices.
    pub fn apply_delta(&mut self, delta: &MutationDelta) {
        for &(v, position) in &delta.created_vertices {
            self.insert(v, position);
        }
        for &(v, position) in &delta.moved_vertices {
            self.insert(v, position);
        }
        for &v in &delta.removed_vertices {
            self.remove(v);
        }
    }
}
