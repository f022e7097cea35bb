//! Contact resolution: two moving interfaces approaching through a gap of
//! ambient material end up sharing conforming vertices and edges.

use mesh_morph::prelude::*;

fn contact_params() -> Parameters {
    Parameters {
        labels: vec![PhaseLabel(1), PhaseLabel(2)],
        use_ambient: true,
        ambient_label: PhaseLabel(0),
        upper_threshold: 100.0,
        lower_threshold: 0.0,
        contact_enabled: true,
        contact_distance: 0.05,
        ..Parameters::default()
    }
}

fn shared_interface(engine: &MeshEngine) -> Phase {
    let both = InPhase(PhaseLabel(1)).and(InPhase(PhaseLabel(2)));
    filter(engine.complex(), &both).unwrap()
}

fn shared_interface_vertices(engine: &MeshEngine) -> usize {
    shared_interface(engine).vertex_count()
}

#[test]
fn direct_cross_gap_edge_is_merged() {
    // Phase-1 tip at (1, 0.5) and phase-2 tip at (1.02, 0.5) joined by a
    // short edge through the ambient gap.
    let mut engine = MeshEngine::from_static_mesh(
        &[
            [0.0, 0.0],  // 0: left base
            [0.0, 1.0],  // 1: left base
            [1.0, 0.5],  // 2: phase-1 tip
            [1.02, 0.5], // 3: phase-2 tip
            [2.0, 0.0],  // 4: right base
            [2.0, 1.0],  // 5: right base
        ],
        &[
            [0, 2, 1], // phase 1
            [4, 5, 3], // phase 2
            [0, 4, 3],
            [0, 3, 2],
            [1, 2, 3],
            [1, 3, 5],
        ],
        &[
            PhaseLabel(1),
            PhaseLabel(2),
            PhaseLabel(0),
            PhaseLabel(0),
            PhaseLabel(0),
            PhaseLabel(0),
        ],
    )
    .unwrap();
    assert_eq!(shared_interface_vertices(&engine), 0);

    let report = engine.update(&contact_params()).unwrap();
    assert_eq!(report.contact_merges, 1);
    engine.validate_invariants().unwrap();

    // The tips merged at the gap midpoint; both phases now meet there.
    assert_eq!(shared_interface_vertices(&engine), 1);
    let tip = engine.complex().vertices().nth(2).unwrap();
    assert_eq!(engine.positions().current(tip).unwrap(), [1.01, 0.5]);
}

#[test]
fn gap_edge_is_flipped_before_the_merge() {
    // Same two tips, but separated by an ambient edge (s, t) whose flip
    // exposes the cross-gap edge first.
    let mut engine = MeshEngine::from_static_mesh(
        &[
            [0.0, 0.0],  // 0: left base
            [0.0, 1.0],  // 1: left base
            [1.0, 0.5],  // 2: phase-1 tip
            [1.02, 0.5], // 3: phase-2 tip
            [1.01, 0.2], // 4: s, below the gap
            [1.01, 0.8], // 5: t, above the gap
            [2.0, 0.0],  // 6: right base
            [2.0, 1.0],  // 7: right base
        ],
        &[
            [0, 2, 1], // phase 1
            [6, 7, 3], // phase 2
            [0, 4, 2],
            [0, 6, 4],
            [6, 3, 4],
            [4, 3, 5],
            [4, 5, 2],
            [7, 5, 3],
            [1, 2, 5],
            [1, 5, 7],
        ],
        &[
            PhaseLabel(1),
            PhaseLabel(2),
            PhaseLabel(0),
            PhaseLabel(0),
            PhaseLabel(0),
            PhaseLabel(0),
            PhaseLabel(0),
            PhaseLabel(0),
            PhaseLabel(0),
            PhaseLabel(0),
        ],
    )
    .unwrap();
    let u = engine.complex().vertices().nth(2).unwrap();
    let w = engine.complex().vertices().nth(3).unwrap();
    let s = engine.complex().vertices().nth(4).unwrap();
    let t = engine.complex().vertices().nth(5).unwrap();
    assert!(engine.complex().edge_between(s, t).is_some());
    assert!(engine.complex().edge_between(u, w).is_none());

    let report = engine.update(&contact_params()).unwrap();
    assert_eq!(report.contact_merges, 1);
    engine.validate_invariants().unwrap();

    // The separating edge is gone, the tips merged, and both gap vertices
    // survive around the new contact vertex.
    assert!(engine.complex().edge_between(s, t).is_none());
    assert!(!engine.complex().contains_vertex(w));
    assert_eq!(engine.positions().current(u).unwrap(), [1.01, 0.5]);
    assert_eq!(shared_interface_vertices(&engine), 1);
}

#[test]
fn closing_fronts_share_a_conforming_boundary_edge() {
    // Two straight fronts 0.02 apart across an ambient strip, three vertex
    // pairs each joined by a direct cross-gap edge. Resolving contact must
    // merge every pair and leave the phases sharing whole edges, not just
    // isolated vertices.
    let mut engine = MeshEngine::from_static_mesh(
        &[
            [0.0, 0.0],  // 0: left base
            [0.0, 1.0],  // 1: left base
            [1.0, 0.0],  // 2: phase-1 front, bottom
            [1.0, 0.5],  // 3: phase-1 front, middle
            [1.0, 1.0],  // 4: phase-1 front, top
            [1.02, 0.0], // 5: phase-2 front, bottom
            [1.02, 0.5], // 6: phase-2 front, middle
            [1.02, 1.0], // 7: phase-2 front, top
            [2.0, 0.0],  // 8: right base
            [2.0, 1.0],  // 9: right base
        ],
        &[
            [0, 2, 3], // phase 1
            [0, 3, 1],
            [1, 3, 4],
            [8, 6, 5], // phase 2
            [8, 9, 6],
            [9, 7, 6],
            [2, 5, 6], // ambient strip
            [2, 6, 3],
            [3, 6, 7],
            [3, 7, 4],
        ],
        &[
            PhaseLabel(1),
            PhaseLabel(1),
            PhaseLabel(1),
            PhaseLabel(2),
            PhaseLabel(2),
            PhaseLabel(2),
            PhaseLabel(0),
            PhaseLabel(0),
            PhaseLabel(0),
            PhaseLabel(0),
        ],
    )
    .unwrap();
    assert_eq!(shared_interface_vertices(&engine), 0);
    assert_eq!(shared_interface(&engine).edge_count(), 0);

    let report = engine.update(&contact_params()).unwrap();
    assert_eq!(report.contact_merges, 3);
    engine.validate_invariants().unwrap();

    // The gap is fully consumed: no ambient triangles remain, the three
    // merged vertices sit at the strip centerline, and the contact surface
    // is two conforming shared edges.
    let ambient = make_phase(engine.complex(), PhaseLabel(0)).unwrap();
    assert_eq!(ambient.triangle_count(), 0);
    let contact = shared_interface(&engine);
    assert_eq!(contact.vertex_count(), 3);
    assert_eq!(contact.edge_count(), 2);
    let middle = engine.complex().vertices().nth(3).unwrap();
    assert_eq!(engine.positions().current(middle).unwrap(), [1.01, 0.5]);
}

#[test]
fn distant_interfaces_are_left_alone() {
    // Tips 0.2 apart with contact range 0.05: nothing to do.
    let mut engine = MeshEngine::from_static_mesh(
        &[
            [0.0, 0.0],
            [0.0, 1.0],
            [0.9, 0.5],
            [1.1, 0.5],
            [2.0, 0.0],
            [2.0, 1.0],
        ],
        &[
            [0, 2, 1],
            [4, 5, 3],
            [0, 4, 3],
            [0, 3, 2],
            [1, 2, 3],
            [1, 3, 5],
        ],
        &[
            PhaseLabel(1),
            PhaseLabel(2),
            PhaseLabel(0),
            PhaseLabel(0),
            PhaseLabel(0),
            PhaseLabel(0),
        ],
    )
    .unwrap();

    let report = engine.update(&contact_params()).unwrap();
    assert_eq!(report.contact_merges, 0);
    assert!(report.is_quiescent());
    assert_eq!(shared_interface_vertices(&engine), 0);
}
