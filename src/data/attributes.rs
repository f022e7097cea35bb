//! Named per-simplex attribute columns.
//!
//! Attributes are registered once by name and dimension; afterwards all
//! access goes through the opaque typed keys ([`VertexAttr`], [`EdgeAttr`],
//! [`TriAttr`]), so the string never appears on hot paths. Columns are
//! slot-indexed parallel to the element arenas and grow lazily: a slot a
//! column has never stored reads as the column default.

use serde::{Deserialize, Serialize};

use crate::mesh_error::MeshMorphError;
use crate::phase::{Dimension, Phase};
use crate::topology::delta::{EdgeAttrOrigin, MutationDelta, TriAttrOrigin};
use crate::topology::handle::{EdgeId, TriId, VertexId};

macro_rules! attr_key {
    ($(#[$doc:meta])* $name:ident, $element:ty, $dimension:expr, $elements:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(u32);

        impl AttrKey for $name {
            type Element = $element;
            const DIMENSION: Dimension = $dimension;

            fn from_index(index: u32) -> Self {
                Self(index)
            }

            fn index(self) -> u32 {
                self.0
            }

            fn element_slot(element: Self::Element) -> u32 {
                element.slot()
            }

            fn phase_elements(phase: &Phase) -> &[Self::Element] {
                phase.$elements()
            }
        }
    };
}

/// Typed key of a registered attribute column.
pub trait AttrKey: Copy {
    type Element: Copy;
    const DIMENSION: Dimension;

    fn from_index(index: u32) -> Self;
    fn index(self) -> u32;
    fn element_slot(element: Self::Element) -> u32;
    fn phase_elements(phase: &Phase) -> &[Self::Element];
}

attr_key!(
    /// Key of a per-vertex attribute column.
    VertexAttr,
    VertexId,
    Dimension::Vertex,
    vertices
);
attr_key!(
    /// Key of a per-edge attribute column.
    EdgeAttr,
    EdgeId,
    Dimension::Edge,
    edges
);
attr_key!(
    /// Key of a per-triangle attribute column.
    TriAttr,
    TriId,
    Dimension::Triangle,
    triangles
);

#[derive(Debug, Clone, Default)]
struct Column {
    name: String,
    default: f64,
    values: Vec<f64>,
}

impl Column {
    fn read(&self, slot: u32) -> f64 {
        self.values
            .get(slot as usize)
            .copied()
            .unwrap_or(self.default)
    }

    fn write(&mut self, slot: u32, value: f64) {
        let slot = slot as usize;
        if slot >= self.values.len() {
            self.values.resize(slot + 1, self.default);
        }
        self.values[slot] = value;
    }
}

/// Registry and storage of all attribute columns, one set per dimension.
#[derive(Debug, Clone, Default)]
pub struct AttributeStore {
    columns: [Vec<Column>; 3],
}

impl AttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new attribute column with a per-slot default.
    ///
    /// # Errors
    /// [`MeshMorphError::DuplicateAttribute`] if the (name, dimension) pair
    /// is already registered.
    pub fn register<K: AttrKey>(
        &mut self,
        name: &str,
        default: f64,
    ) -> Result<K, MeshMorphError> {
        let columns = &mut self.columns[K::DIMENSION as usize];
        if columns.iter().any(|c| c.name == name) {
            return Err(MeshMorphError::DuplicateAttribute {
                name: name.to_owned(),
                dimension: K::DIMENSION,
            });
        }
        columns.push(Column {
            name: name.to_owned(),
            default,
            values: Vec::new(),
        });
        Ok(K::from_index(columns.len() as u32 - 1))
    }

    /// Look up a registered column by name.
    pub fn lookup<K: AttrKey>(&self, name: &str) -> Option<K> {
        self.columns[K::DIMENSION as usize]
            .iter()
            .position(|c| c.name == name)
            .map(|index| K::from_index(index as u32))
    }

    fn column<K: AttrKey>(&self, key: K) -> Result<&Column, MeshMorphError> {
        self.columns[K::DIMENSION as usize]
            .get(key.index() as usize)
            .ok_or(MeshMorphError::UnknownAttribute {
                dimension: K::DIMENSION,
                slot: key.index(),
            })
    }

    fn column_mut<K: AttrKey>(&mut self, key: K) -> Result<&mut Column, MeshMorphError> {
        self.columns[K::DIMENSION as usize]
            .get_mut(key.index() as usize)
            .ok_or(MeshMorphError::UnknownAttribute {
                dimension: K::DIMENSION,
                slot: key.index(),
            })
    }

    /// Value stored for `element`, or the column default.
    ///
    /// Columns are slot-indexed; whether `element` is live is the caller's
    /// concern.
    pub fn value<K: AttrKey>(&self, key: K, element: K::Element) -> Result<f64, MeshMorphError> {
        Ok(self.column(key)?.read(K::element_slot(element)))
    }

    pub fn set_value<K: AttrKey>(
        &mut self,
        key: K,
        element: K::Element,
        value: f64,
    ) -> Result<(), MeshMorphError> {
        self.column_mut(key)?.write(K::element_slot(element), value);
        Ok(())
    }

    /// Reset every slot of the column (and its default) to `value`.
    pub fn clear<K: AttrKey>(&mut self, key: K, value: f64) -> Result<(), MeshMorphError> {
        let column = self.column_mut(key)?;
        column.default = value;
        column.values.clear();
        Ok(())
    }

    /// Values for a phase's elements of the key's dimension, in phase order.
    pub fn get_sub_range<K: AttrKey>(
        &self,
        key: K,
        phase: &Phase,
    ) -> Result<Vec<f64>, MeshMorphError> {
        let column = self.column(key)?;
        Ok(K::phase_elements(phase)
            .iter()
            .map(|&element| column.read(K::element_slot(element)))
            .collect())
    }

    /// Write values for a phase's elements, in phase order, with a strict
    /// length check.
    pub fn set_sub_range<K: AttrKey>(
        &mut self,
        key: K,
        phase: &Phase,
        values: &[f64],
    ) -> Result<(), MeshMorphError> {
        let elements = K::phase_elements(phase);
        if values.len() != elements.len() {
            return Err(MeshMorphError::SubRangeLengthMismatch {
                dimension: K::DIMENSION,
                expected: elements.len(),
                found: values.len(),
            });
        }
        let column = self.column_mut(key)?;
        for (&element, &value) in elements.iter().zip(values) {
            column.write(K::element_slot(element), value);
        }
        Ok(())
    }

    /// Replay a committed topology mutation on every column.
    ///
    /// All parent values are read before any new element is written, so
    /// inheritance is safe even when a created element reuses the arena
    /// slot of a removed parent. With `sparse_edges` set, edges tagged for
    /// the triangle-average take the column default instead.
    pub fn apply_delta(&mut self, delta: &MutationDelta, sparse_edges: bool) {
        for column in &mut self.columns[Dimension::Vertex as usize] {
            // New vertices always start from the column default; the slot
            // may have belonged to a removed vertex.
            for &(v, _) in &delta.created_vertices {
                let default = column.default;
                column.write(v.slot(), default);
            }
        }

        for column in &mut self.columns[Dimension::Edge as usize] {
            let planned: Vec<(u32, f64)> = delta
                .created_edges
                .iter()
                .map(|&(e, origin)| {
                    let value = match origin {
                        EdgeAttrOrigin::Default => column.default,
                        EdgeAttrOrigin::Inherit(parent) => column.read(parent.slot()),
                        EdgeAttrOrigin::Average(parents) => {
                            if sparse_edges {
                                column.default
                            } else {
                                parents.iter().map(|p| column.read(p.slot())).sum::<f64>()
                                    / 3.0
                            }
                        }
                    };
                    (e.slot(), value)
                })
                .collect();
            for (slot, value) in planned {
                column.write(slot, value);
            }
        }

        for column in &mut self.columns[Dimension::Triangle as usize] {
            let planned: Vec<(u32, f64)> = delta
                .created_triangles
                .iter()
                .map(|&(t, origin)| {
                    let value = match origin {
                        TriAttrOrigin::Default => column.default,
                        TriAttrOrigin::Inherit(parent) => column.read(parent.slot()),
                    };
                    (t.slot(), value)
                })
                .collect();
            for (slot, value) in planned {
                column.write(slot, value);
            }
        }
    }

    /// Check that no column has outgrown its arena.
    pub fn validate(
        &self,
        slot_counts: [usize; 3],
    ) -> Result<(), MeshMorphError> {
        for (dimension_columns, &bound) in self.columns.iter().zip(slot_counts.iter()) {
            for column in dimension_columns {
                if column.values.len() > bound {
                    return Err(MeshMorphError::ColumnLengthMismatch {
                        name: column.name.clone(),
                        expected: bound,
                        found: column.values.len(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::{PhaseLabel, make_phase_all};
    use crate::topology::complex::SimplicialComplex;

    fn unit_square() -> (SimplicialComplex, crate::data::positions::PositionState) {
        SimplicialComplex::from_static_mesh(
            &[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            &[[0, 1, 2], [0, 2, 3]],
            &[PhaseLabel(1), PhaseLabel(1)],
        )
        .unwrap()
    }

    #[test]
    fn register_and_lookup() {
        let mut store = AttributeStore::new();
        let density: EdgeAttr = store.register("density", 1.0).unwrap();
        assert_eq!(store.lookup::<EdgeAttr>("density"), Some(density));
        assert_eq!(store.lookup::<EdgeAttr>("missing"), None);
        // Same name is free for a different dimension.
        let _: VertexAttr = store.register("density", 0.0).unwrap();

        let err = store.register::<EdgeAttr>("density", 2.0).unwrap_err();
        assert!(matches!(
            err,
            MeshMorphError::DuplicateAttribute {
                dimension: Dimension::Edge,
                ..
            }
        ));
    }

    #[test]
    fn defaults_and_overwrites() {
        let (complex, _) = unit_square();
        let mut store = AttributeStore::new();
        let size: EdgeAttr = store.register("size", 0.5).unwrap();

        let e = complex.edges().next().unwrap();
        assert_eq!(store.value(size, e).unwrap(), 0.5);
        store.set_value(size, e, 2.0).unwrap();
        assert_eq!(store.value(size, e).unwrap(), 2.0);

        store.clear(size, 9.0).unwrap();
        assert_eq!(store.value(size, e).unwrap(), 9.0);
    }

    #[test]
    fn sub_range_round_trip() {
        let (complex, _) = unit_square();
        let phase = make_phase_all(&complex).unwrap();
        let mut store = AttributeStore::new();
        let mass: VertexAttr = store.register("mass", 0.0).unwrap();

        let values: Vec<f64> = (0..phase.vertex_count()).map(|i| i as f64).collect();
        store.set_sub_range(mass, &phase, &values).unwrap();
        assert_eq!(store.get_sub_range(mass, &phase).unwrap(), values);

        let err = store.set_sub_range(mass, &phase, &values[..1]).unwrap_err();
        assert!(matches!(
            err,
            MeshMorphError::SubRangeLengthMismatch {
                dimension: Dimension::Vertex,
                ..
            }
        ));
    }

    #[test]
    fn split_inheritance() {
        let (mut complex, positions) = unit_square();
        let mut store = AttributeStore::new();
        let size: EdgeAttr = store.register("size", 1.0).unwrap();
        let area: TriAttr = store.register("area", 0.0).unwrap();

        let v0 = complex.vertices().next().unwrap();
        let v2 = complex.vertices().nth(2).unwrap();
        let diagonal = complex.edge_between(v0, v2).unwrap();
        store.set_value(size, diagonal, 7.0).unwrap();
        let t0 = complex.triangles().next().unwrap();
        store.set_value(area, t0, 3.0).unwrap();

        let (mid, delta) = complex
            .split_edge(diagonal, [0.5, 0.5], &positions)
            .unwrap();
        store.apply_delta(&delta, false);

        // Halves inherit the split edge even though one of them reuses its
        // freed arena slot.
        for endpoint in [v0, v2] {
            let half = complex.edge_between(mid, endpoint).unwrap();
            assert_eq!(store.value(size, half).unwrap(), 7.0);
        }
        // Spokes average the parent triangle's edges: two boundary edges at
        // the default 1.0 plus the diagonal at 7.0.
        let v1 = complex.vertices().nth(1).unwrap();
        let spoke = complex.edge_between(mid, v1).unwrap();
        assert_eq!(store.value(size, spoke).unwrap(), 3.0);

        // Children of the first parent inherit its triangle value.
        let children: Vec<_> = delta
            .created_triangles
            .iter()
            .filter(|(_, origin)| *origin == TriAttrOrigin::Inherit(t0))
            .map(|&(t, _)| t)
            .collect();
        assert_eq!(children.len(), 2);
        for t in children {
            assert_eq!(store.value(area, t).unwrap(), 3.0);
        }
    }

    #[test]
    fn sparse_split_takes_defaults_for_spokes() {
        let (mut complex, positions) = unit_square();
        let mut store = AttributeStore::new();
        let size: EdgeAttr = store.register("size", 1.0).unwrap();

        let v0 = complex.vertices().next().unwrap();
        let v2 = complex.vertices().nth(2).unwrap();
        let diagonal = complex.edge_between(v0, v2).unwrap();
        store.set_value(size, diagonal, 7.0).unwrap();

        let (mid, delta) = complex
            .split_edge(diagonal, [0.5, 0.5], &positions)
            .unwrap();
        store.apply_delta(&delta, true);

        let v1 = complex.vertices().nth(1).unwrap();
        let spoke = complex.edge_between(mid, v1).unwrap();
        assert_eq!(store.value(size, spoke).unwrap(), 1.0);
        // Halves still inherit.
        let half = complex.edge_between(mid, v0).unwrap();
        assert_eq!(store.value(size, half).unwrap(), 7.0);
    }

    #[test]
    fn new_vertex_resets_reused_slot() {
        let (mut complex, positions) = unit_square();
        let mut store = AttributeStore::new();
        let mass: VertexAttr = store.register("mass", 0.0).unwrap();

        // Collapse frees a vertex slot with a stale stored value.
        let diagonal = {
            let v0 = complex.vertices().next().unwrap();
            let v2 = complex.vertices().nth(2).unwrap();
            complex.edge_between(v0, v2).unwrap()
        };
        let (mid, delta) = complex
            .split_edge(diagonal, [0.5, 0.5], &positions)
            .unwrap();
        store.apply_delta(&delta, false);
        store.set_value(mass, mid, 42.0).unwrap();

        let mut positions = positions.clone();
        positions.insert(mid, [0.5, 0.5]);
        let v0 = complex.vertices().next().unwrap();
        let spoke = complex.edge_between(mid, v0).unwrap();
        let (_, delta) = complex
            .collapse_edge(spoke, v0, [0.0, 0.0], &positions)
            .unwrap();
        store.apply_delta(&delta, false);

        // A later split reuses the freed vertex slot; the new vertex must
        // read as the default, not the stale 42.0.
        let v2 = complex.vertices().nth(2).unwrap();
        let diagonal = complex.edge_between(v0, v2).unwrap();
        let (fresh, delta) = complex
            .split_edge(diagonal, [0.5, 0.5], &positions)
            .unwrap();
        store.apply_delta(&delta, false);
        assert_eq!(fresh.slot(), mid.slot());
        assert_eq!(store.value(mass, fresh).unwrap(), 0.0);
    }
}
