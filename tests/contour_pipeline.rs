use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tin_contour::contour::{ContourSet, Polyline};
use tin_contour::{
    ContourOptions, Point3, QuadIndex, SmoothOptions, Tin, extract_contours, smooth_contours,
};

const SIZE: f64 = 100.0;

fn terrain(x: f64, y: f64) -> f64 {
    20.0 * (x / 15.0).sin() * (y / 20.0).cos() + 0.1 * x
}

/// Scattered samples of a rolling surface over a square, corners included so
/// the hull is the whole square.
fn random_tin(seed: u64, count: usize) -> Tin {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut points = vec![
        Point3::new(0.0, 0.0, terrain(0.0, 0.0)),
        Point3::new(SIZE, 0.0, terrain(SIZE, 0.0)),
        Point3::new(SIZE, SIZE, terrain(SIZE, SIZE)),
        Point3::new(0.0, SIZE, terrain(0.0, SIZE)),
    ];
    for _ in 0..count {
        let x = rng.random_range(1.0..SIZE - 1.0);
        let y = rng.random_range(1.0..SIZE - 1.0);
        points.push(Point3::new(x, y, terrain(x, y)));
    }
    let mut tin = Tin::triangulate(points).expect("triangulate");
    tin.estimate_gradients();
    tin
}

fn distance_to_segment(p: Point3, a: Point3, b: Point3) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / (dx * dx + dy * dy)).clamp(0.0, 1.0);
    (p.x - a.x - t * dx).hypot(p.y - a.y - t * dy)
}

fn on_mesh_boundary(tin: &Tin, p: Point3) -> bool {
    tin.edges()
        .iter()
        .filter(|e| !e.is_interior())
        .any(|e| distance_to_segment(p, tin.point(e.a), tin.point(e.b)) < 1e-9)
}

#[test]
fn random_terrain_contours_are_consistent() {
    let tin = random_tin(7, 300);
    let extraction = extract_contours(&tin, ContourOptions::new(2.5)).expect("extract");
    let diagnostics = &extraction.diagnostics;
    assert!(diagnostics.is_clean(), "{diagnostics}");
    assert_eq!(diagnostics.contour_count(), extraction.contours.len());
    assert!(extraction.contours.len() > 10);

    for (level, contours) in extraction.contours.levels() {
        let elevation = extraction.contours.elevation_of(level);
        for contour in contours {
            assert_eq!(contour.elevation(), elevation);
            if contour.is_closed() {
                assert!(contour.len() >= 3);
                assert_ne!(contour.first(), contour.last());
            } else {
                assert!(contour.len() >= 2);
                for end in [contour.first(), contour.last()].into_iter().flatten() {
                    assert!(on_mesh_boundary(&tin, end), "{end:?} at {elevation}");
                }
            }
            for &p in contour.points() {
                if let Some(z) = tin.elevation_at(p) {
                    assert!((z - elevation).abs() < 1e-6, "{z} != {elevation}");
                }
            }
        }
    }
}

#[test]
fn extraction_is_deterministic() {
    let a = extract_contours(&random_tin(11, 150), ContourOptions::new(4.0)).expect("extract");
    let b = extract_contours(&random_tin(11, 150), ContourOptions::new(4.0)).expect("extract");
    assert_eq!(a.contours, b.contours);
    assert_eq!(a.diagnostics.summary(), b.diagnostics.summary());
}

#[test]
fn contour_sets_serialize_by_level() {
    let tin = random_tin(3, 80);
    let contours: ContourSet<Polyline> =
        extract_contours(&tin, ContourOptions::new(5.0)).expect("extract").contours;
    let json = serde_json::to_value(&contours).expect("serialize");
    assert_eq!(json["interval"], 5.0);

    let levels = json["levels"].as_object().expect("levels map");
    assert_eq!(levels.len(), contours.levels().count());
    let (level, first) = contours.levels().next().expect("a level");
    let listed = levels[&level.to_string()].as_array().expect("contours");
    assert_eq!(listed.len(), first.len());
    assert_eq!(listed[0]["closed"], first[0].is_closed());
    assert_eq!(
        listed[0]["points"].as_array().map(Vec::len),
        Some(first[0].len())
    );
}

#[test]
fn smoothing_keeps_contours_on_their_level() {
    let tin = random_tin(5, 200);
    let extraction = extract_contours(&tin, ContourOptions::new(5.0)).expect("extract");
    let index = QuadIndex::build(&tin);
    let result =
        smooth_contours(&index, &extraction.contours, SmoothOptions::default()).expect("smooth");

    assert_eq!(result.contours.len(), extraction.contours.len());
    assert_eq!(result.diagnostics.contours, extraction.contours.len());
    let mut inserted = 0;
    for (raw, smooth) in extraction.contours.iter().zip(result.contours.iter()) {
        assert_eq!(raw.is_closed(), smooth.is_closed());
        assert!(smooth.points().len() >= raw.len());
        inserted += smooth.points().len() - raw.len();
        for &p in smooth.points() {
            assert_eq!(p.z, smooth.elevation());
            if let Some(z) = tin.elevation_at(p) {
                assert!((z - smooth.elevation()).abs() < 1e-6);
            }
        }
        let drawn = smooth.densify(1.0);
        assert!(drawn.len() >= smooth.points().len().min(2));
    }
    assert_eq!(inserted, result.diagnostics.inserted_points);
    println!("{}", result.diagnostics.summary());
}
