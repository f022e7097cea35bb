//! Composable simplex predicates.
//!
//! Selection criteria for [`filter`](super::filter) are values implementing
//! [`SimplexPredicate`], combined with `and`/`or`/`not` instead of being
//! dispatched by name. Classification queries that would fail on a stale
//! handle simply report a non-match.

use crate::phase::{Dimension, PhaseLabel};
use crate::topology::complex::SimplicialComplex;
use crate::topology::handle::{EdgeId, TriId, VertexId};

/// A simplex of any dimension, by handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimplexRef {
    Vertex(VertexId),
    Edge(EdgeId),
    Triangle(TriId),
}

impl SimplexRef {
    pub fn dimension(self) -> Dimension {
        match self {
            SimplexRef::Vertex(_) => Dimension::Vertex,
            SimplexRef::Edge(_) => Dimension::Edge,
            SimplexRef::Triangle(_) => Dimension::Triangle,
        }
    }
}

/// Selection criterion over simplices of the complex.
pub trait SimplexPredicate {
    fn matches(&self, complex: &SimplicialComplex, simplex: SimplexRef) -> bool;

    /// Both predicates must match.
    fn and<Q: SimplexPredicate>(self, other: Q) -> And<Self, Q>
    where
        Self: Sized,
    {
        And(self, other)
    }

    /// Either predicate matches.
    fn or<Q: SimplexPredicate>(self, other: Q) -> Or<Self, Q>
    where
        Self: Sized,
    {
        Or(self, other)
    }

    /// Negation.
    fn not(self) -> Not<Self>
    where
        Self: Sized,
    {
        Not(self)
    }
}

impl<F> SimplexPredicate for F
where
    F: Fn(&SimplicialComplex, SimplexRef) -> bool,
{
    fn matches(&self, complex: &SimplicialComplex, simplex: SimplexRef) -> bool {
        self(complex, simplex)
    }
}

/// Conjunction combinator.
#[derive(Debug, Clone, Copy)]
pub struct And<P, Q>(pub P, pub Q);

impl<P: SimplexPredicate, Q: SimplexPredicate> SimplexPredicate for And<P, Q> {
    fn matches(&self, complex: &SimplicialComplex, simplex: SimplexRef) -> bool {
        self.0.matches(complex, simplex) && self.1.matches(complex, simplex)
    }
}

/// Disjunction combinator.
#[derive(Debug, Clone, Copy)]
pub struct Or<P, Q>(pub P, pub Q);

impl<P: SimplexPredicate, Q: SimplexPredicate> SimplexPredicate for Or<P, Q> {
    fn matches(&self, complex: &SimplicialComplex, simplex: SimplexRef) -> bool {
        self.0.matches(complex, simplex) || self.1.matches(complex, simplex)
    }
}

/// Negation combinator.
#[derive(Debug, Clone, Copy)]
pub struct Not<P>(pub P);

impl<P: SimplexPredicate> SimplexPredicate for Not<P> {
    fn matches(&self, complex: &SimplicialComplex, simplex: SimplexRef) -> bool {
        !self.0.matches(complex, simplex)
    }
}

/// Matches simplices belonging to the given phase: triangles carrying the
/// label, and edges/vertices incident to such a triangle.
#[derive(Debug, Clone, Copy)]
pub struct InPhase(pub PhaseLabel);

impl SimplexPredicate for InPhase {
    fn matches(&self, complex: &SimplicialComplex, simplex: SimplexRef) -> bool {
        match simplex {
            SimplexRef::Vertex(v) => complex
                .vertex_labels(v)
                .is_ok_and(|labels| labels.contains(&self.0)),
            SimplexRef::Edge(e) => complex
                .edge_labels(e)
                .is_ok_and(|labels| labels.contains(&self.0)),
            SimplexRef::Triangle(t) => {
                complex.triangle_label(t).is_ok_and(|label| label == self.0)
            }
        }
    }
}

/// Matches simplices of one dimension.
#[derive(Debug, Clone, Copy)]
pub struct IsDimension(pub Dimension);

impl SimplexPredicate for IsDimension {
    fn matches(&self, _complex: &SimplicialComplex, simplex: SimplexRef) -> bool {
        simplex.dimension() == self.0
    }
}

/// Matches simplices on the domain boundary: edges with a single incident
/// triangle, their vertices, and triangles owning such an edge.
#[derive(Debug, Clone, Copy)]
pub struct OnDomainBoundary;

impl SimplexPredicate for OnDomainBoundary {
    fn matches(&self, complex: &SimplicialComplex, simplex: SimplexRef) -> bool {
        match simplex {
            SimplexRef::Vertex(v) => complex.is_boundary_vertex(v).unwrap_or(false),
            SimplexRef::Edge(e) => complex.is_boundary_edge(e).unwrap_or(false),
            SimplexRef::Triangle(t) => complex.triangle_edges(t).is_ok_and(|edges| {
                edges
                    .iter()
                    .any(|&e| complex.is_boundary_edge(e).unwrap_or(false))
            }),
        }
    }
}

/// Matches simplices on a phase interface: edges separating phases (or on
/// the domain boundary), their vertices, and triangles owning one.
#[derive(Debug, Clone, Copy)]
pub struct OnInterface;

impl SimplexPredicate for OnInterface {
    fn matches(&self, complex: &SimplicialComplex, simplex: SimplexRef) -> bool {
        match simplex {
            SimplexRef::Vertex(v) => complex.is_interface_vertex(v).unwrap_or(false),
            SimplexRef::Edge(e) => complex.is_interface_edge(e).unwrap_or(false),
            SimplexRef::Triangle(t) => complex.triangle_edges(t).is_ok_and(|edges| {
                edges
                    .iter()
                    .any(|&e| complex.is_interface_edge(e).unwrap_or(false))
            }),
        }
    }
}
