
use crate::geom::Point3;
use crate::tin::Tin;

/// Unit-cell grid over `[lo, hi]` in both axes, cells split along the rising
/// diagonal.
pub(crate) fn grid_tin(lo: i32, hi: i32, z: impl Fn(f64, f64) -> f64) -> Tin {
    let side = (hi - lo + 1) as u32;
    let points: Vec<Point3> = (lo..=hi)
        .flat_map(|j| (lo..=hi).map(move |i| (f64::from(i), f64::from(j))))
        .map(|(x, y)| Point3::new(x, y, z(x, y)))
        .collect();
    let mut triangles = Vec::new();
    for j in 0..side - 1 {
        for i in 0..side - 1 {
            let p00 = j * side + i;
            let p10 = p00 + 1;
            let p01 = p00 + side;
            let p11 = p01 + 1;
            triangles.push([p00, p10, p11]);
            triangles.push([p00, p11, p01]);
        }
    }
    Tin::new(points, &triangles).expect("grid mesh")
}

/// `z = x^2 + y^2` over `[-4, 4]` with estimated slopes; exact inside
/// `|x|, |y| < 4`.
pub(crate) fn bowl() -> Tin {
    let mut tin = grid_tin(-4, 4, |x, y| x * x + y * y);
    tin.estimate_gradients();
    tin
}

/// Unit equilateral triangle with the given corner elevations.
pub(crate) fn single_triangle(z: [f64; 3]) -> Tin {
    Tin::new(
        vec![
            Point3::new(0.0, 0.0, z[0]),
            Point3::new(1.0, 0.0, z[1]),
            Point3::new(0.5, 3.0_f64.sqrt() / 2.0, z[2]),
        ],
        &[[0, 1, 2]],
    )
    .expect("triangle")
}

/// Shoelace area, positive for counter-clockwise rings.
pub(crate) fn signed_area(points: &[Point3]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (a, b) = (points[i], points[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum::<f64>()
        / 2.0
}
