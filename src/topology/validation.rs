//! Structural invariant audits for the simplicial complex.
//!
//! These walks are O(elements) and intended for tests and the
//! `check-invariants` feature, not for per-operation use.

use hashbrown::HashMap;

use crate::data::positions::PositionState;
use crate::geometry::signed_area;
use crate::mesh_error::MeshMorphError;
use crate::topology::complex::SimplicialComplex;

impl SimplicialComplex {
    /// Audit the purely topological invariants: incidence symmetry, the
    /// 1-or-2 triangles-per-edge bound, unique edges per vertex pair, and
    /// no dangling handles. Returns the first violation found.
    pub fn validate_invariants(&self) -> Result<(), MeshMorphError> {
        // Edges: live endpoints, triangle counts, back-references.
        let mut pair_owner = HashMap::new();
        for e in self.edges() {
            let edge = self.edge(e)?;
            for v in edge.vertices {
                if !self.contains_vertex(v) {
                    return Err(MeshMorphError::DanglingReference {
                        from: format!("edge {e} references dead vertex {v}"),
                    });
                }
                if !self.vertex(v)?.edges.contains(&e) {
                    return Err(MeshMorphError::DanglingReference {
                        from: format!("vertex {v} does not list incident edge {e}"),
                    });
                }
            }

            let count = edge.tris.len();
            if count == 0 || count > 2 {
                return Err(MeshMorphError::EdgeTriangleCount { edge: e, count });
            }
            for &t in &edge.tris {
                if !self.contains_triangle(t) {
                    return Err(MeshMorphError::DanglingReference {
                        from: format!("edge {e} references dead triangle {t}"),
                    });
                }
                if !self.tri(t)?.edges.contains(&e) {
                    return Err(MeshMorphError::DanglingReference {
                        from: format!("triangle {t} does not list incident edge {e}"),
                    });
                }
            }

            let [a, b] = edge.vertices;
            let key = super::complex::canonical_pair(a, b);
            if pair_owner.insert(key, e).is_some() {
                return Err(MeshMorphError::DuplicateEdge { v0: a, v1: b });
            }
        }

        // Triangles: live vertices, edge triple matches the vertex triple.
        for t in self.triangles() {
            let tri = self.tri(t)?;
            for v in tri.vertices {
                if !self.contains_vertex(v) {
                    return Err(MeshMorphError::DanglingReference {
                        from: format!("triangle {t} references dead vertex {v}"),
                    });
                }
            }
            for i in 0..3 {
                let a = tri.vertices[i];
                let b = tri.vertices[(i + 1) % 3];
                let e = tri.edges[i];
                let edge = self.edge(e)?;
                let [x, y] = edge.vertices;
                if !((x == a && y == b) || (x == b && y == a)) {
                    return Err(MeshMorphError::DanglingReference {
                        from: format!("triangle {t} edge slot {i} does not join its vertices"),
                    });
                }
                if !edge.tris.contains(&t) {
                    return Err(MeshMorphError::DanglingReference {
                        from: format!("edge {e} does not list incident triangle {t}"),
                    });
                }
            }
        }

        // Vertices: every listed edge is live and actually incident.
        for v in self.vertices() {
            for &e in &self.vertex(v)?.edges {
                if !self.contains_edge(e) {
                    return Err(MeshMorphError::DanglingReference {
                        from: format!("vertex {v} references dead edge {e}"),
                    });
                }
                if !self.edge(e)?.vertices.contains(&v) {
                    return Err(MeshMorphError::DanglingReference {
                        from: format!("vertex {v} lists edge {e} it is not an endpoint of"),
                    });
                }
            }
        }

        Ok(())
    }

    /// Audit that every stored triangle triple is CCW under the current
    /// positions.
    pub fn validate_orientation(
        &self,
        positions: &PositionState,
    ) -> Result<(), MeshMorphError> {
        for t in self.triangles() {
            let [a, b, c] = self.tri(t)?.vertices;
            let area = signed_area(
                positions.current(a)?,
                positions.current(b)?,
                positions.current(c)?,
            );
            if area <= 0.0 {
                return Err(MeshMorphError::TriangleNotCcw { tri: t });
            }
        }
        Ok(())
    }
}
