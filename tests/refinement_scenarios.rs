//! Refinement scenarios: threshold sources, split inheritance, and the
//! refine/coarsen fixed point.

use mesh_morph::prelude::*;

/// Four-triangle fan over the unit square with an interior center vertex.
fn fan() -> MeshEngine {
    MeshEngine::from_static_mesh(
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
    .unwrap()
}

fn base_params() -> Parameters {
    Parameters {
        labels: vec![PhaseLabel(1)],
        upper_threshold: 100.0,
        lower_threshold: 0.0,
        ..Parameters::default()
    }
}

#[test]
fn global_threshold_drives_splits_to_fixed_point() {
    let mut engine = fan();
    let params = Parameters {
        upper_threshold: 0.6,
        max_passes: 10,
        ..base_params()
    };

    let report = engine.update(&params).unwrap();
    assert!(report.splits > 0);
    engine.validate_invariants().unwrap();
    for e in engine.complex().edges().collect::<Vec<_>>() {
        let [a, b] = engine.complex().edge_vertices(e).unwrap();
        let pa = engine.positions().current(a).unwrap();
        let pb = engine.positions().current(b).unwrap();
        let length = ((pb[0] - pa[0]).powi(2) + (pb[1] - pa[1]).powi(2)).sqrt();
        assert!(length <= 0.6 + 1e-12, "edge {e} still has length {length}");
    }

    // A second step at the same thresholds is quiescent.
    let report = engine.update(&params).unwrap();
    assert!(report.is_quiescent(), "second step did work: {report:?}");
}

#[test]
fn per_label_override_refines_only_that_phase() {
    // Two-phase strip: label 1 on the left square, label 2 on the right.
    let mut engine = MeshEngine::from_static_mesh(
        &[
            [0.0, 0.0],
            [1.0, 0.0],
            [2.0, 0.0],
            [2.0, 1.0],
            [1.0, 1.0],
            [0.0, 1.0],
        ],
        &[[0, 1, 4], [0, 4, 5], [1, 2, 3], [1, 3, 4]],
        &[PhaseLabel(1), PhaseLabel(1), PhaseLabel(2), PhaseLabel(2)],
    )
    .unwrap();

    let mut params = Parameters {
        labels: vec![PhaseLabel(1), PhaseLabel(2)],
        max_passes: 1,
        ..base_params()
    };
    // Only label 2 gets a threshold that triggers.
    params.upper_overrides.insert(2, 0.9);

    let report = engine.update(&params).unwrap();
    assert!(report.splits > 0);
    engine.validate_invariants().unwrap();

    let left_phase = make_phase(engine.complex(), PhaseLabel(1)).unwrap();
    let right_phase = make_phase(engine.complex(), PhaseLabel(2)).unwrap();
    assert!(right_phase.vertex_count() > 4);
    // Splits only touched label-2 edges and the shared interface at x = 1,
    // so every left-phase vertex still sits on x = 0 or x = 1.
    for &v in left_phase.vertices() {
        let p = engine.positions().current(v).unwrap();
        assert!(
            p[0] <= 1e-12 || p[0] >= 1.0 - 1e-12,
            "unexpected left-phase vertex at {p:?}"
        );
    }
}

#[test]
fn sizing_attribute_beats_scalar_threshold() {
    let mut engine = fan();
    let sizing: EdgeAttr = engine.attributes_mut().register("sizing", 0.0).unwrap();

    // Tight sizing on the spokes only; scalar threshold never triggers.
    let center = engine.complex().vertices().nth(4).unwrap();
    let spokes = engine.complex().vertex_edges(center).unwrap().to_vec();
    for &e in &spokes {
        engine.attributes_mut().set_value(sizing, e, 0.5).unwrap();
    }

    let mut params = Parameters {
        upper_threshold_attribute: Some("sizing".to_owned()),
        max_passes: 1,
        ..base_params()
    };
    params.resolve_bindings(engine.attributes()).unwrap();

    let report = engine.update(&params).unwrap();
    assert_eq!(report.splits, spokes.len());
    engine.validate_invariants().unwrap();
}

#[test]
fn split_children_inherit_and_new_vertex_takes_default() {
    let mut engine = fan();
    let size: EdgeAttr = engine.attributes_mut().register("size", 1.0).unwrap();
    let mass: VertexAttr = engine.attributes_mut().register("mass", 0.25).unwrap();
    let density: TriAttr = engine.attributes_mut().register("density", 0.0).unwrap();

    let center = engine.complex().vertices().nth(4).unwrap();
    let v0 = engine.complex().vertices().next().unwrap();
    let spoke = engine.complex().edge_between(v0, center).unwrap();
    engine.attributes_mut().set_value(size, spoke, 8.0).unwrap();
    let parents = engine.complex().edge_triangles(spoke).unwrap().to_vec();
    for t in parents {
        engine.attributes_mut().set_value(density, t, 2.0).unwrap();
    }

    let mid = engine.split_edge(spoke, [0.25, 0.25]).unwrap();

    // Halves inherit the split edge's value.
    for end in [v0, center] {
        let half = engine.complex().edge_between(mid, end).unwrap();
        assert_eq!(engine.attributes().value(size, half).unwrap(), 8.0);
    }
    // Children inherit the parent triangle's value.
    for t in engine.complex().vertex_triangles(mid).unwrap() {
        assert_eq!(engine.attributes().value(density, t).unwrap(), 2.0);
    }
    // The new vertex always takes the registered column default.
    assert_eq!(engine.attributes().value(mass, mid).unwrap(), 0.25);
    engine.validate_invariants().unwrap();
}

#[test]
fn sparse_edge_attributes_skip_the_average() {
    let mut engine = fan();
    // Default 0.0 means "unset": those edges fall back to the scalar.
    let size: EdgeAttr = engine.attributes_mut().register("size", 0.0).unwrap();

    let center = engine.complex().vertices().nth(4).unwrap();
    let v0 = engine.complex().vertices().next().unwrap();
    let spoke = engine.complex().edge_between(v0, center).unwrap();
    engine.attributes_mut().set_value(size, spoke, 0.5).unwrap();

    let mut params = Parameters {
        upper_threshold_attribute: Some("size".to_owned()),
        use_sparse_edge_attributes: true,
        max_passes: 1,
        ..base_params()
    };
    params.resolve_bindings(engine.attributes()).unwrap();

    // Only the tagged spoke (length ~0.707 > 0.5) splits.
    let report = engine.update(&params).unwrap();
    assert_eq!(report.splits, 1);

    let mid = engine
        .complex()
        .vertices()
        .find(|&v| engine.positions().current(v).unwrap() == [0.25, 0.25])
        .unwrap();
    // Spoke edges created toward the opposite vertices take the column
    // default, not the incident-edge average.
    let v1 = engine.complex().vertices().nth(1).unwrap();
    let v3 = engine.complex().vertices().nth(3).unwrap();
    for opposite in [v1, v3] {
        let created = engine.complex().edge_between(mid, opposite).unwrap();
        assert_eq!(engine.attributes().value(size, created).unwrap(), 0.0);
    }
    // The halves still inherit the split edge's value.
    let half = engine.complex().edge_between(mid, v0).unwrap();
    assert_eq!(engine.attributes().value(size, half).unwrap(), 0.5);
}
