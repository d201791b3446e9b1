//! Cubic Bézier triangle patches.
//!
//! Control net layout, indexed by the corner exponents `ijk` (`i + j + k = 3`):
//! `[300, 030, 003, 210, 120, 021, 012, 102, 201, 111]`. Side `s` of a triangle
//! runs from corner `s` to corner `(s + 1) % 3`; its two inner controls are
//! stored near-start first in [`SIDE_CONTROLS`].

use crate::geom::vcurve;

/// Control-net slots of the two inner controls of each side, near-start first.
pub const SIDE_CONTROLS: [[usize; 2]; 3] = [[3, 4], [5, 6], [7, 8]];
const CENTER: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierPatch {
    ctrl: [f64; 10],
}

impl BezierPatch {
    /// Build a patch from corner elevations, the inner controls of each side
    /// (near-start first) and an optional centre control. Without an explicit
    /// centre the quadratic-precision value `sum(edge)/4 - sum(corner)/6` is used,
    /// which reproduces a plane exactly.
    #[must_use]
    pub fn new(corners: [f64; 3], sides: [[f64; 2]; 3], center: Option<f64>) -> Self {
        let mut ctrl = [0.0; 10];
        ctrl[..3].copy_from_slice(&corners);
        for (side, slots) in SIDE_CONTROLS.iter().enumerate() {
            ctrl[slots[0]] = sides[side][0];
            ctrl[slots[1]] = sides[side][1];
        }
        let edge_sum: f64 = ctrl[3..9].iter().sum();
        let corner_sum: f64 = corners.iter().sum();
        ctrl[CENTER] = center.unwrap_or(edge_sum / 4.0 - corner_sum / 6.0);
        Self { ctrl }
    }

    /// Elevation at barycentric coordinates `(u, v, w)` of corners 0, 1, 2.
    #[must_use]
    pub fn evaluate(&self, [u, v, w]: [f64; 3]) -> f64 {
        let c = &self.ctrl;
        u * u * u * c[0]
            + v * v * v * c[1]
            + w * w * w * c[2]
            + 3.0 * u * u * v * c[3]
            + 3.0 * u * v * v * c[4]
            + 3.0 * v * v * w * c[5]
            + 3.0 * v * w * w * c[6]
            + 3.0 * u * w * w * c[7]
            + 3.0 * u * u * w * c[8]
            + 6.0 * u * v * w * c[CENTER]
    }

    #[must_use]
    pub const fn center(&self) -> f64 {
        self.ctrl[CENTER]
    }

    /// `(min, max)` over the control net; the patch lies within this range.
    #[must_use]
    pub fn control_range(&self) -> (f64, f64) {
        self.ctrl
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &z| (lo.min(z), hi.max(z)))
    }
}

/// Inner controls of the cubic along an edge from `za` to `zb` over the plan
/// displacement `(dx, dy)`. A missing gradient leaves that end linear.
#[must_use]
pub fn edge_controls(
    za: f64,
    zb: f64,
    grad_a: Option<[f64; 2]>,
    grad_b: Option<[f64; 2]>,
    (dx, dy): (f64, f64),
) -> [f64; 2] {
    let near_a = match grad_a {
        Some([gx, gy]) => za + (gx * dx + gy * dy) / 3.0,
        None => (2.0 * za + zb) / 3.0,
    };
    let near_b = match grad_b {
        Some([gx, gy]) => zb - (gx * dx + gy * dy) / 3.0,
        None => (za + 2.0 * zb) / 3.0,
    };
    [near_a, near_b]
}

/// Elevation at fraction `s` along an edge cubic.
#[must_use]
pub fn edge_cubic(za: f64, controls: [f64; 2], zb: f64, s: f64) -> f64 {
    vcurve(za, controls[0], controls[1], zb, s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planar_patch() -> BezierPatch {
        // z = 10u + 20v + 40w
        let sides = [
            [(2.0 * 10.0 + 20.0) / 3.0, (10.0 + 2.0 * 20.0) / 3.0],
            [(2.0 * 20.0 + 40.0) / 3.0, (20.0 + 2.0 * 40.0) / 3.0],
            [(2.0 * 40.0 + 10.0) / 3.0, (40.0 + 2.0 * 10.0) / 3.0],
        ];
        BezierPatch::new([10.0, 20.0, 40.0], sides, None)
    }

    #[test]
    fn planar_controls_reproduce_plane() {
        let patch = planar_patch();
        for bary in [[1.0, 0.0, 0.0], [0.2, 0.3, 0.5], [1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0]] {
            let expected = 10.0 * bary[0] + 20.0 * bary[1] + 40.0 * bary[2];
            assert!((patch.evaluate(bary) - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn raised_center_bulges_interior_only() {
        let flat = planar_patch();
        let raised = BezierPatch::new(
            [10.0, 20.0, 40.0],
            [
                [(2.0 * 10.0 + 20.0) / 3.0, (10.0 + 2.0 * 20.0) / 3.0],
                [(2.0 * 20.0 + 40.0) / 3.0, (20.0 + 2.0 * 40.0) / 3.0],
                [(2.0 * 40.0 + 10.0) / 3.0, (40.0 + 2.0 * 10.0) / 3.0],
            ],
            Some(flat.center() + 9.0),
        );
        let mid = [1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0];
        assert!((raised.evaluate(mid) - flat.evaluate(mid) - 9.0 * 6.0 / 27.0).abs() < 1e-12);
        let on_side = [0.5, 0.5, 0.0];
        assert_eq!(raised.evaluate(on_side), flat.evaluate(on_side));
    }

    #[test]
    fn gradient_controls_follow_slope() {
        let controls = edge_controls(0.0, 3.0, Some([1.0, 0.0]), Some([1.0, 0.0]), (3.0, 0.0));
        assert_eq!(controls, [1.0, 2.0]);
        assert!((edge_cubic(0.0, controls, 3.0, 0.5) - 1.5).abs() < 1e-12);

        let linear = edge_controls(0.0, 3.0, None, None, (3.0, 0.0));
        assert_eq!(linear, [1.0, 2.0]);
    }

    #[test]
    fn control_range_bounds_patch() {
        let (lo, hi) = planar_patch().control_range();
        assert_eq!((lo, hi), (10.0, 40.0));
    }
}
