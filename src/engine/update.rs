//! The five-pass update step.
//!
//! One `update()` call runs, in order: motion, refine/coarsen to a bounded
//! fixed point, contact resolution, and quality flips. Every pass walks
//! elements in ascending handle order over a snapshot taken at pass entry,
//! so the step is deterministic for a given mesh and parameters.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::debug_invariants::DebugInvariants;
use crate::engine::{MeshEngine, Parameters};
use crate::geometry::{diagonal_min_angle_deg, distance, segments_intersect, signed_area};
use crate::mesh_error::MeshMorphError;
use crate::phase::PhaseLabel;
use crate::topology::handle::{EdgeId, VertexId};

/// Operation counts for one update step.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateReport {
    /// Vertices moved the full way to their target.
    pub moved: usize,
    /// Vertices moved a bisected partial step.
    pub substepped: usize,
    /// Vertices whose motion was skipped after exhausting the bisection
    /// budget.
    pub motion_rejected: usize,
    /// Edge splits applied by refinement.
    pub splits: usize,
    /// Edge collapses applied by coarsening.
    pub collapses: usize,
    /// Coarsening collapses rejected by the topology guards.
    pub skipped_collapses: usize,
    /// Cross-gap merges applied by the contact pass.
    pub contact_merges: usize,
    /// Min-angle-improving flips applied by the quality pass.
    pub quality_flips: usize,
    /// Refine/coarsen iterations run before the fixed point (or the bound).
    pub adapt_passes: u32,
}

impl UpdateReport {
    /// True when the step changed nothing.
    pub fn is_quiescent(&self) -> bool {
        self.moved == 0
            && self.substepped == 0
            && self.splits == 0
            && self.collapses == 0
            && self.contact_merges == 0
            && self.quality_flips == 0
    }
}

impl MeshEngine {
    /// Run one adaptive update step.
    ///
    /// Parameters are validated first; sizing-attribute bindings must have
    /// been resolved by the caller if configured.
    pub fn update(&mut self, params: &Parameters) -> Result<UpdateReport, MeshMorphError> {
        params.validate()?;
        self.sparse_edge_attributes = params.use_sparse_edge_attributes;
        let mut report = UpdateReport::default();

        self.motion_pass(params, &mut report)?;

        for pass in 0..params.max_passes {
            let before = (report.splits, report.collapses);
            self.refine_pass(params, &mut report)?;
            self.coarsen_pass(params, &mut report)?;
            report.adapt_passes = pass + 1;
            if (report.splits, report.collapses) == before {
                break;
            }
        }

        if params.contact_enabled {
            self.contact_pass(params, &mut report)?;
        }
        if params.quality_flips {
            self.quality_pass(&mut report)?;
        }

        debug!(
            "update step done: {} moved, {} splits, {} collapses, {} merges, {} flips",
            report.moved, report.splits, report.collapses, report.contact_merges,
            report.quality_flips
        );
        self.debug_assert_invariants();
        Ok(report)
    }

    // --- pass 1: motion ---------------------------------------------------

    fn motion_pass(
        &mut self,
        params: &Parameters,
        report: &mut UpdateReport,
    ) -> Result<(), MeshMorphError> {
        let vertices: Vec<VertexId> = self.complex.vertices().collect();
        for v in vertices {
            let current = self.positions.current(v)?;
            let target = self.positions.target(v)?;
            if current == target {
                continue;
            }

            let mut step = 1.0;
            let mut accepted = None;
            for _ in 0..=params.max_substep_bisections {
                let candidate = [
                    current[0] + step * (target[0] - current[0]),
                    current[1] + step * (target[1] - current[1]),
                ];
                if self.move_keeps_orientation(v, candidate)? {
                    accepted = Some((step, candidate));
                    break;
                }
                step *= 0.5;
            }

            match accepted {
                Some((step, candidate)) => {
                    self.positions.set_current(v, candidate)?;
                    if step == 1.0 {
                        report.moved += 1;
                    } else {
                        report.substepped += 1;
                    }
                }
                None => {
                    warn!("motion of vertex {v} rejected after bisection budget");
                    report.motion_rejected += 1;
                }
            }
        }
        Ok(())
    }

    /// Whether moving `v` to `candidate` keeps every incident triangle
    /// positively oriented.
    fn move_keeps_orientation(
        &self,
        v: VertexId,
        candidate: [f64; 2],
    ) -> Result<bool, MeshMorphError> {
        for t in self.complex.vertex_triangles(v)? {
            let verts = self.complex.triangle_vertices(t)?;
            let mut pts = [[0.0; 2]; 3];
            for (i, &vertex) in verts.iter().enumerate() {
                pts[i] = if vertex == v {
                    candidate
                } else {
                    self.positions.current(vertex)?
                };
            }
            if signed_area(pts[0], pts[1], pts[2]) <= 0.0 {
                return Ok(false);
            }
        }
        Ok(true)
    }

    // --- pass 2: refinement -----------------------------------------------

    fn refine_pass(
        &mut self,
        params: &Parameters,
        report: &mut UpdateReport,
    ) -> Result<(), MeshMorphError> {
        let edges: Vec<EdgeId> = self.complex.edges().collect();
        for e in edges {
            if !self.complex.contains_edge(e) {
                continue;
            }
            let threshold = self.refine_threshold_for(params, e)?;
            if !(self.edge_length(e)? > threshold) {
                continue;
            }

            let [a, b] = self.complex.edge_vertices(e)?;
            let pa = self.positions.current(a)?;
            let pb = self.positions.current(b)?;
            let r = params.split_ratio;
            let position = [pa[0] + r * (pb[0] - pa[0]), pa[1] + r * (pb[1] - pa[1])];
            match self.split_edge(e, position) {
                Ok(_) => report.splits += 1,
                Err(MeshMorphError::SplitWouldDegenerate(_)) => {
                    debug!("refinement split of edge {e} skipped: degenerate children");
                }
                Err(other) => return Err(other),
            }
        }
        Ok(())
    }

    /// Per-edge refinement threshold: a bound sizing attribute with a
    /// positive finite value overrides the scalar; otherwise the tightest
    /// per-label scalar applies.
    fn refine_threshold_for(
        &self,
        params: &Parameters,
        e: EdgeId,
    ) -> Result<f64, MeshMorphError> {
        if let Some(attr) = params.resolved_upper {
            let value = self.attributes.value(attr, e)?;
            if value.is_finite() && value > 0.0 {
                return Ok(value);
            }
        }
        Ok(self
            .complex
            .edge_labels(e)?
            .into_iter()
            .map(|label| params.refine_threshold(label))
            .fold(f64::INFINITY, f64::min))
    }

    // --- pass 3: coarsening -----------------------------------------------

    fn coarsen_pass(
        &mut self,
        params: &Parameters,
        report: &mut UpdateReport,
    ) -> Result<(), MeshMorphError> {
        let edges: Vec<EdgeId> = self.complex.edges().collect();
        for e in edges {
            if !self.complex.contains_edge(e) {
                continue;
            }
            // Cross-phase edges belong to the contact pass.
            let labels = self.complex.edge_labels(e)?;
            if labels.len() != 1 {
                continue;
            }
            let threshold = self.coarsen_threshold_for(params, e, labels[0])?;
            if !(self.edge_length(e)? < threshold) {
                continue;
            }

            let (survivor, placement) = self.collapse_placement(e)?;
            match self.collapse_edge(e, survivor, placement) {
                Ok(_) => report.collapses += 1,
                Err(
                    MeshMorphError::CollapseNonManifold(_)
                    | MeshMorphError::CollapseWouldInvert(_),
                ) => {
                    debug!("coarsening collapse of edge {e} skipped");
                    report.skipped_collapses += 1;
                }
                Err(other) => return Err(other),
            }
        }
        Ok(())
    }

    fn coarsen_threshold_for(
        &self,
        params: &Parameters,
        e: EdgeId,
        label: PhaseLabel,
    ) -> Result<f64, MeshMorphError> {
        if let Some(attr) = params.resolved_lower {
            let value = self.attributes.value(attr, e)?;
            if value.is_finite() && value > 0.0 {
                return Ok(value);
            }
        }
        Ok(params.coarsen_threshold(label))
    }

    /// Survivor and placement for a coarsening collapse: an interface or
    /// boundary endpoint survives in place; when both or neither qualify,
    /// the lower-handle endpoint survives at the edge midpoint.
    fn collapse_placement(
        &self,
        e: EdgeId,
    ) -> Result<(VertexId, [f64; 2]), MeshMorphError> {
        let [a, b] = self.complex.edge_vertices(e)?;
        let a_pinned = self.complex.is_interface_vertex(a)?;
        let b_pinned = self.complex.is_interface_vertex(b)?;
        match (a_pinned, b_pinned) {
            (true, false) => Ok((a, self.positions.current(a)?)),
            (false, true) => Ok((b, self.positions.current(b)?)),
            _ => {
                let survivor = if a <= b { a } else { b };
                let pa = self.positions.current(a)?;
                let pb = self.positions.current(b)?;
                Ok((survivor, [(pa[0] + pb[0]) / 2.0, (pa[1] + pb[1]) / 2.0]))
            }
        }
    }

    // --- pass 4: contact --------------------------------------------------

    /// Labels of moving phases touching `v`.
    fn moving_phases(
        &self,
        params: &Parameters,
        v: VertexId,
    ) -> Result<Vec<PhaseLabel>, MeshMorphError> {
        Ok(self
            .complex
            .vertex_labels(v)?
            .into_iter()
            .filter(|&label| !params.is_ambient(label))
            .collect())
    }

    /// Whether two vertices lie on interfaces of disjoint moving phases
    /// within contact range.
    fn in_contact(
        &self,
        params: &Parameters,
        u: VertexId,
        w: VertexId,
    ) -> Result<bool, MeshMorphError> {
        let phases_u = self.moving_phases(params, u)?;
        if phases_u.is_empty() {
            return Ok(false);
        }
        let phases_w = self.moving_phases(params, w)?;
        if phases_w.is_empty() || phases_u.iter().any(|l| phases_w.contains(l)) {
            return Ok(false);
        }
        let gap = distance(self.positions.current(u)?, self.positions.current(w)?);
        Ok(gap < params.contact_distance)
    }

    /// Resolve approaching interfaces: first flip gap-interior edges whose
    /// opposite vertices are in contact (exposing a cross-gap edge), then
    /// collapse every short cross-gap edge at its midpoint so the two
    /// interfaces share a conforming vertex.
    fn contact_pass(
        &mut self,
        params: &Parameters,
        report: &mut UpdateReport,
    ) -> Result<(), MeshMorphError> {
        let edges: Vec<EdgeId> = self.complex.edges().collect();
        for e in edges {
            if !self.complex.contains_edge(e) {
                continue;
            }
            let labels = self.complex.edge_labels(e)?;
            if !labels.iter().all(|&l| params.is_ambient(l)) {
                continue;
            }
            let tris = self.complex.edge_triangles(e)?;
            let [t0, t1] = match tris {
                &[t0, t1] => [t0, t1],
                _ => continue,
            };
            let p = self.complex.opposite_vertex(t0, e)?;
            let q = self.complex.opposite_vertex(t1, e)?;
            if self.complex.edge_between(p, q).is_some() || !self.in_contact(params, p, q)? {
                continue;
            }
            // The cross-gap edge only exists after the flip if it actually
            // crosses the edge it replaces.
            let [s, t] = self.complex.edge_vertices(e)?;
            if !segments_intersect(
                self.positions.current(s)?,
                self.positions.current(t)?,
                self.positions.current(p)?,
                self.positions.current(q)?,
            ) {
                continue;
            }
            match self.flip_edge(e) {
                Ok(_) => debug!("contact: flipped gap edge {e}"),
                Err(
                    MeshMorphError::FlipWouldInvert(_)
                    | MeshMorphError::FlipLabelMismatch(_)
                    | MeshMorphError::FlipDuplicateEdge(_)
                    | MeshMorphError::FlipBoundaryEdge(_),
                ) => continue,
                Err(other) => return Err(other),
            }
        }

        let edges: Vec<EdgeId> = self.complex.edges().collect();
        for e in edges {
            if !self.complex.contains_edge(e) {
                continue;
            }
            let [u, w] = self.complex.edge_vertices(e)?;
            if !self.in_contact(params, u, w)? {
                continue;
            }
            let survivor = if u <= w { u } else { w };
            let pu = self.positions.current(u)?;
            let pw = self.positions.current(w)?;
            let midpoint = [(pu[0] + pw[0]) / 2.0, (pu[1] + pw[1]) / 2.0];
            match self.collapse_edge(e, survivor, midpoint) {
                Ok(_) => report.contact_merges += 1,
                Err(
                    MeshMorphError::CollapseNonManifold(_)
                    | MeshMorphError::CollapseWouldInvert(_),
                ) => {
                    debug!("contact merge of edge {e} skipped");
                }
                Err(other) => return Err(other),
            }
        }
        Ok(())
    }

    // --- pass 5: quality --------------------------------------------------

    fn quality_pass(&mut self, report: &mut UpdateReport) -> Result<(), MeshMorphError> {
        let edges: Vec<EdgeId> = self.complex.edges().collect();
        for e in edges {
            if !self.complex.contains_edge(e) {
                continue;
            }
            let tris = self.complex.edge_triangles(e)?;
            let [t0, t1] = match tris {
                &[t0, t1] => [t0, t1],
                _ => continue,
            };
            if self.complex.triangle_label(t0)? != self.complex.triangle_label(t1)? {
                continue;
            }

            let [a, b] = self.complex.edge_vertices(e)?;
            let p = self.complex.opposite_vertex(t0, e)?;
            let q = self.complex.opposite_vertex(t1, e)?;
            let [pa, pb] = [self.positions.current(a)?, self.positions.current(b)?];
            let [pp, pq] = [self.positions.current(p)?, self.positions.current(q)?];

            let current_min = diagonal_min_angle_deg(pa, pb, pp, pq);
            let flipped_min = diagonal_min_angle_deg(pp, pq, pb, pa);
            if !(flipped_min > current_min + 1e-12) {
                continue;
            }

            match self.flip_edge(e) {
                Ok(_) => report.quality_flips += 1,
                Err(
                    MeshMorphError::FlipWouldInvert(_)
                    | MeshMorphError::FlipDuplicateEdge(_)
                    | MeshMorphError::FlipBoundaryEdge(_)
                    | MeshMorphError::FlipLabelMismatch(_),
                ) => continue,
                Err(other) => return Err(other),
            }
        }
        Ok(())
    }
}
