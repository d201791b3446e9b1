use super::grid_tin;
use crate::geom::{Point3, area2};
use crate::tin::{Tin, TinError};

fn assert_close(a: f64, b: f64, eps: f64) {
    assert!((a - b).abs() <= eps, "{a} != {b} (eps {eps})");
}

fn square() -> Tin {
    Tin::new(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 2.0),
            Point3::new(0.0, 1.0, 1.0),
        ],
        &[[0, 1, 2], [0, 2, 3]],
    )
    .expect("square")
}

#[test]
fn edges_record_both_triangles() {
    let tin = square();
    assert_eq!(tin.edges().len(), 5);
    let interior: Vec<_> = tin.edges().iter().filter(|e| e.is_interior()).collect();
    assert_eq!(interior.len(), 1);

    let diagonal = interior[0];
    assert_eq!((diagonal.a, diagonal.b), (2, 0));
    assert_eq!(diagonal.tria, Some(0));
    assert_eq!(diagonal.trib, Some(1));
    assert_eq!(diagonal.other_triangle(0), Some(1));
    assert_eq!(diagonal.other_triangle(7), None);

    for (t, tri) in tin.triangles().iter().enumerate() {
        for side in 0..3 {
            let edge = tin.edge(tri.edges[side]);
            let from = tri.corners[side];
            if tri.forward[side] {
                assert_eq!(edge.a, from);
                assert_eq!(edge.tria, Some(t as u32));
            } else {
                assert_eq!(edge.b, from);
                assert_eq!(edge.trib, Some(t as u32));
            }
        }
    }
}

#[test]
fn clockwise_input_is_stored_counter_clockwise() {
    let tin = Tin::new(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ],
        &[[0, 2, 1]],
    )
    .expect("triangle");
    let [a, b, c] = tin.corner_positions(0);
    assert!(area2(a, b, c) > 0.0);
    assert!(tin.edges().iter().all(|e| e.tria == Some(0) && e.trib.is_none()));
}

#[test]
fn invalid_meshes_are_rejected() {
    let p = |x, y| Point3::new(x, y, 0.0);
    assert!(matches!(
        Tin::new(vec![p(0.0, 0.0), p(1.0, 0.0)], &[[0, 1, 0]]),
        Err(TinError::TooFewPoints { count: 2 })
    ));
    let three = vec![p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0)];
    assert!(matches!(Tin::new(three.clone(), &[]), Err(TinError::EmptyMesh)));
    assert!(matches!(
        Tin::new(three.clone(), &[[0, 1, 5]]),
        Err(TinError::VertexOutOfRange { triangle: 0, vertex: 5 })
    ));
    assert!(matches!(
        Tin::new(vec![p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0)], &[[0, 1, 2]]),
        Err(TinError::DegenerateTriangle { triangle: 0 })
    ));
    assert!(matches!(
        Tin::new(
            vec![p(0.0, 0.0), p(1.0, 0.0), Point3::new(0.0, f64::NAN, 0.0)],
            &[[0, 1, 2]]
        ),
        Err(TinError::NonFiniteVertex { index: 2 })
    ));

    // Three triangles on edge 0-1.
    let fan = vec![p(0.0, 0.0), p(1.0, 0.0), p(0.5, 1.0), p(0.5, -1.0), p(0.5, 2.0)];
    assert!(matches!(
        Tin::new(fan, &[[0, 1, 2], [0, 1, 3], [0, 1, 4]]),
        Err(TinError::NonManifoldEdge { a: 0, b: 1 })
    ));
}

#[test]
fn triangles_agree_along_shared_edge() {
    let mut tin = square();
    tin.set_gradient(0, [1.5, -0.5]);
    tin.set_gradient(2, [-2.0, 0.25]);

    let p0 = tin.point(0);
    let p2 = tin.point(2);
    let diagonal = tin
        .edges()
        .iter()
        .position(|e| e.is_interior())
        .expect("diagonal") as u32;
    for s in [0.1, 0.3, 0.5, 0.85] {
        // The diagonal runs from point 2 to point 0.
        let q = p2.lerp(p0, s);
        let via_edge = tin.edge_elevation(diagonal, s);
        assert_close(tin.triangle_elevation(0, q), via_edge, 1e-12);
        assert_close(tin.triangle_elevation(1, q), via_edge, 1e-12);
    }
}

#[test]
fn estimated_gradients_keep_a_plane_planar() {
    let plane = |x: f64, y: f64| 2.0 * x - 3.0 * y + 1.0;
    let mut tin = grid_tin(4, plane);
    tin.estimate_gradients();
    for point in tin.points() {
        let [gx, gy] = point.gradient.expect("gradient");
        assert_close(gx, 2.0, 1e-12);
        assert_close(gy, -3.0, 1e-12);
    }
    for (x, y) in [(0.3, 0.7), (1.5, 2.25), (3.9, 0.1)] {
        let z = tin.elevation_at(Point3::new(x, y, 0.0)).expect("on mesh");
        assert_close(z, plane(x, y), 1e-9);
    }
    assert_eq!(tin.elevation_at(Point3::new(-1.0, 2.0, 0.0)), None);
}

#[test]
fn centre_override_moves_interior_only() {
    let mut tin = square();
    let inside = Point3::new(0.7, 0.3, 0.0);
    let on_side = Point3::new(0.5, 0.0, 0.0);
    let before = (tin.triangle_elevation(0, inside), tin.triangle_elevation(0, on_side));
    let centre = tin.triangle(0).patch().center();
    tin.set_center_elevation(0, centre + 3.0);
    assert!(tin.triangle_elevation(0, inside) > before.0);
    assert_close(tin.triangle_elevation(0, on_side), before.1, 1e-12);
}

#[test]
fn elevation_range_bounds_the_surface() {
    let mut tin = grid_tin(3, |x, y| (x * 1.3).sin() * 4.0 + y * y * 0.5);
    tin.estimate_gradients();
    let (lo, hi) = tin.elevation_range();
    for t in 0..tin.triangles().len() as u32 {
        let [a, b, c] = tin.corner_positions(t);
        for (u, v) in [(0.2, 0.2), (0.6, 0.1), (0.1, 0.7), (1.0 / 3.0, 1.0 / 3.0)] {
            let q = Point3::new(
                a.x + u * (b.x - a.x) + v * (c.x - a.x),
                a.y + u * (b.y - a.y) + v * (c.y - a.y),
                0.0,
            );
            let z = tin.triangle_elevation(t, q);
            assert!(z >= lo - 1e-12 && z <= hi + 1e-12);
        }
    }
}

#[test]
fn triangulate_builds_delaunay_mesh() {
    let tin = Tin::triangulate(vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(2.0, 0.0, 1.0),
        Point3::new(2.0, 2.0, 2.0),
        Point3::new(0.0, 2.0, 1.0),
        Point3::new(1.1, 0.9, 5.0),
    ])
    .expect("triangulation");
    assert_eq!(tin.triangles().len(), 4);
    assert_eq!(tin.edges().len(), 8);
    assert_eq!(tin.edges().iter().filter(|e| e.is_interior()).count(), 4);

    let collinear = Tin::triangulate(vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(2.0, 2.0, 0.0),
    ]);
    assert!(matches!(collinear, Err(TinError::EmptyMesh)));
}

#[test]
fn transverse_clip_spans_the_triangle() {
    let tin = Tin::new(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 4.0),
            Point3::new(0.0, 4.0, 0.0),
        ],
        &[[0, 1, 2]],
    )
    .expect("triangle");
    let (a, b) = tin
        .transverse_clip(0, Point3::new(1.0, 1.0, 0.0), 0.0)
        .expect("line crosses triangle");
    assert_close(a.x, 0.0, 1e-12);
    assert_close(a.y, 1.0, 1e-12);
    assert_close(b.x, 3.0, 1e-12);
    assert_close(b.y, 1.0, 1e-12);
    // z = x on this facet.
    assert_close(a.z, 0.0, 1e-12);
    assert_close(b.z, 3.0, 1e-12);

    assert!(tin.transverse_clip(0, Point3::new(10.0, 10.0, 0.0), 0.0).is_none());
}
