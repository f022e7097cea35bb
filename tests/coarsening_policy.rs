//! Coarsening policy: survivor selection, cross-phase skips, and guard
//! rejections.

use mesh_morph::prelude::*;

fn params(lower: f64) -> Parameters {
    Parameters {
        labels: vec![PhaseLabel(1), PhaseLabel(2)],
        upper_threshold: 100.0,
        lower_threshold: lower,
        ..Parameters::default()
    }
}

#[test]
fn interface_endpoint_survives_in_place() {
    // Two-phase strip with an interior right-phase vertex close to the
    // interface vertex at (1, 1).
    let mut engine = MeshEngine::from_static_mesh(
        &[
            [0.0, 0.0],
            [1.0, 0.0],
            [2.0, 0.0],
            [2.0, 1.0],
            [1.0, 1.0],
            [0.0, 1.0],
            [1.2, 0.5],
        ],
        &[
            [0, 1, 4],
            [0, 4, 5],
            [1, 2, 6],
            [2, 3, 6],
            [3, 4, 6],
            [1, 6, 4],
        ],
        &[
            PhaseLabel(1),
            PhaseLabel(1),
            PhaseLabel(2),
            PhaseLabel(2),
            PhaseLabel(2),
            PhaseLabel(2),
        ],
    )
    .unwrap();
    let interior = engine.complex().vertices().nth(6).unwrap();
    let interface_bottom = engine.complex().vertices().nth(1).unwrap();
    let interface_top = engine.complex().vertices().nth(4).unwrap();

    // Both edges from the interior vertex to the interface are short
    // (~0.54); the interface endpoint must survive without moving.
    let report = engine.update(&params(0.6)).unwrap();
    assert_eq!(report.collapses, 1);
    assert!(!engine.complex().contains_vertex(interior));
    assert_eq!(
        engine.positions().current(interface_bottom).unwrap(),
        [1.0, 0.0]
    );
    assert_eq!(
        engine.positions().current(interface_top).unwrap(),
        [1.0, 1.0]
    );
    engine.validate_invariants().unwrap();

    // The interface itself is untouched.
    assert!(
        engine
            .complex()
            .edge_between(interface_bottom, interface_top)
            .is_some()
    );
}

#[test]
fn tied_endpoints_collapse_to_the_midpoint() {
    // Fan over the unit square; splitting a boundary edge leaves three
    // short edges whose endpoints tie under the survivor policy.
    let mut engine = MeshEngine::from_static_mesh(
        &[
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
            [0.0, 1.0],
            [0.5, 0.5],
        ],
        &[[0, 1, 4], [1, 2, 4], [2, 3, 4], [3, 0, 4]],
        &[PhaseLabel(1); 4],
    )
    .unwrap();
    let v0 = engine.complex().vertices().next().unwrap();
    let v1 = engine.complex().vertices().nth(1).unwrap();
    let bottom = engine.complex().edge_between(v0, v1).unwrap();
    engine.split_edge(bottom, [0.5, 0.0]).unwrap();

    let mut p = params(0.52);
    p.labels = vec![PhaseLabel(1)];
    let report = engine.update(&p).unwrap();

    // One half collapses onto the boundary midpoint; the rest of the fan
    // is back above the threshold.
    assert_eq!(report.collapses, 1);
    assert_eq!(engine.complex().vertex_count(), 5);
    engine.validate_invariants().unwrap();
    let survivor = engine
        .complex()
        .vertices()
        .map(|v| engine.positions().current(v).unwrap())
        .find(|p| p[1] == 0.0 && p[0] > 0.0 && p[0] < 1.0)
        .unwrap();
    assert!(survivor[0] == 0.25 || survivor[0] == 0.75);
}

#[test]
fn cross_phase_edges_are_never_coarsened() {
    // Short interface edge between the two phases; everything else is
    // comfortably long.
    let mut engine = MeshEngine::from_static_mesh(
        &[
            [0.0, 0.0],
            [1.0, 0.0],
            [2.0, 0.0],
            [2.0, 1.0],
            [1.0, 0.3],
            [0.0, 1.0],
        ],
        &[[0, 1, 4], [0, 4, 5], [1, 2, 3], [1, 3, 4]],
        &[PhaseLabel(1), PhaseLabel(1), PhaseLabel(2), PhaseLabel(2)],
    )
    .unwrap();
    let v1 = engine.complex().vertices().nth(1).unwrap();
    let v4 = engine.complex().vertices().nth(4).unwrap();
    let interface = engine.complex().edge_between(v1, v4).unwrap();
    assert!(engine.complex().is_interface_edge(interface).unwrap());

    let report = engine.update(&params(0.4)).unwrap();
    assert_eq!(report.collapses, 0);
    assert!(report.is_quiescent());
    assert!(engine.complex().contains_edge(interface));
}

#[test]
fn pinch_rejection_is_counted_not_fatal() {
    // Thin rhombus whose interior diagonal is the only short edge; both
    // diagonal endpoints lie on the boundary, so collapsing it would pinch
    // the surface apart.
    let mut engine = MeshEngine::from_static_mesh(
        &[
            [0.0, 0.0],
            [0.15, -1.0],
            [0.3, 0.0],
            [0.15, 1.0],
        ],
        &[[0, 1, 2], [0, 2, 3]],
        &[PhaseLabel(1), PhaseLabel(1)],
    )
    .unwrap();

    let mut p = params(0.4);
    p.labels = vec![PhaseLabel(1)];
    let report = engine.update(&p).unwrap();
    assert_eq!(report.collapses, 0);
    assert_eq!(report.skipped_collapses, 1);
    assert_eq!(engine.complex().vertex_count(), 4);
    assert_eq!(engine.complex().triangle_count(), 2);
    engine.validate_invariants().unwrap();
}
