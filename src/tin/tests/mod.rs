mod test_tin_basic;

use crate::geom::Point3;
use crate::tin::Tin;

/// `n` by `n` unit cells, each split along its rising diagonal, with
/// elevations from `z`.
pub(crate) fn grid_tin(n: u32, z: impl Fn(f64, f64) -> f64) -> Tin {
    let side = n + 1;
    let points: Vec<Point3> = (0..side)
        .flat_map(|j| (0..side).map(move |i| (f64::from(i), f64::from(j))))
        .map(|(x, y)| Point3::new(x, y, z(x, y)))
        .collect();
    let mut triangles = Vec::new();
    for j in 0..n {
        for i in 0..n {
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
