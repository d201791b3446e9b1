//! Spiral arcs: clothoid segments whose curvature varies linearly with length.
//!
//! A [`SpiralArc`] joins two terrain points and leaves/arrives along given
//! bearings. The plan shape is solved in chord-relative form: the tangent
//! angle is the quadratic `phi(t) = a + b*t + c*t^2` over the normalised length
//! `t` in `[0, 1]`, with `c` chosen so the curve ends exactly on the chord. A
//! circular arc (`c = 0`) and a straight line (`a = b = c = 0`) are special
//! cases. Elevation along the arc follows a cubic vertical curve.

use super::{Point3, Tolerance, Vec3, wrap_angle};

/// Gauss-Legendre nodes and weights on `[-1, 1]`, positive half.
const GL_NODES: [f64; 4] = [
    0.183_434_642_495_649_8,
    0.525_532_409_916_329_0,
    0.796_666_477_413_626_7,
    0.960_289_856_497_536_3,
];
const GL_WEIGHTS: [f64; 4] = [
    0.362_683_783_378_362_0,
    0.313_706_645_877_887_3,
    0.222_381_034_453_374_5,
    0.101_228_536_290_376_3,
];

/// Panels per unit of normalised length used when integrating the tangent.
const PANELS: usize = 4;
const MAX_NEWTON_STEPS: usize = 12;

/// Cubic Bézier vertical curve through `start` and `end` with two inner controls.
#[must_use]
pub fn vcurve(start: f64, control1: f64, control2: f64, end: f64, p: f64) -> f64 {
    let q = 1.0 - p;
    q * q * q * start + 3.0 * q * q * p * control1 + 3.0 * q * p * p * control2 + p * p * p * end
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpiralArc {
    start: Point3,
    end: Point3,
    chord_bearing: f64,
    chord: f64,
    a: f64,
    b: f64,
    c: f64,
    length: f64,
    control1: f64,
    control2: f64,
}

impl SpiralArc {
    /// Straight segment from `start` to `end`.
    #[must_use]
    pub fn line(start: Point3, end: Point3) -> Self {
        let bearing = start.bearing_to(end);
        Self::new(start, end, bearing, bearing)
    }

    /// Clothoid from `start` to `end` leaving along `start_bearing` and arriving
    /// along `end_bearing` (radians, counter-clockwise from east).
    ///
    /// When the bearings cannot be met by a clothoid that advances along the
    /// chord the result is not [`valid`](Self::is_valid); callers fall back to
    /// [`SpiralArc::line`].
    #[must_use]
    pub fn new(start: Point3, end: Point3, start_bearing: f64, end_bearing: f64) -> Self {
        let chord = start.planar_distance(end);
        let chord_bearing = start.bearing_to(end);
        let mut arc = Self {
            start,
            end,
            chord_bearing,
            chord,
            a: 0.0,
            b: 0.0,
            c: 0.0,
            length: chord,
            control1: (2.0 * start.z + end.z) / 3.0,
            control2: (start.z + 2.0 * end.z) / 3.0,
        };
        if Tolerance::ZERO_LENGTH.is_zero_length(chord) {
            return arc;
        }

        let alpha = wrap_angle(start_bearing - chord_bearing);
        let beta = wrap_angle(end_bearing - chord_bearing);
        let turn = beta - alpha;

        // Small-angle solution of  integral(sin phi) = 0,  refined by Newton.
        let mut c = 3.0 * (alpha + beta);
        for _ in 0..MAX_NEWTON_STEPS {
            let b = turn - c;
            let (g, dg) = closure_residual(alpha, b, c);
            if g.abs() <= Tolerance::ROOT.eps {
                break;
            }
            if dg == 0.0 || !dg.is_finite() {
                break;
            }
            c -= g / dg;
        }

        arc.a = alpha;
        arc.c = c;
        arc.b = turn - c;
        let (cos_int, _) = integrate_tangent(arc.a, arc.b, arc.c, 1.0);
        arc.length = if cos_int > 0.0 { chord / cos_int } else { f64::NAN };
        arc
    }

    /// False when the requested bearings do not describe a forward-running spiral.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.length.is_finite()
    }

    #[must_use]
    pub const fn start(&self) -> Point3 {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> Point3 {
        self.end
    }

    /// Arc length in plan.
    #[must_use]
    pub const fn length(&self) -> f64 {
        self.length
    }

    #[must_use]
    pub const fn chord_length(&self) -> f64 {
        self.chord
    }

    #[must_use]
    pub const fn chord_bearing(&self) -> f64 {
        self.chord_bearing
    }

    #[must_use]
    pub fn start_bearing(&self) -> f64 {
        self.chord_bearing + self.a
    }

    #[must_use]
    pub fn end_bearing(&self) -> f64 {
        self.chord_bearing + self.a + self.b + self.c
    }

    /// Total change of bearing from start to end.
    #[must_use]
    pub fn delta(&self) -> f64 {
        self.b + self.c
    }

    /// Rate of change of curvature with length.
    #[must_use]
    pub fn clothance(&self) -> f64 {
        2.0 * self.c / (self.length * self.length)
    }

    #[must_use]
    pub fn bearing_at(&self, along: f64) -> f64 {
        let t = along / self.length;
        self.chord_bearing + self.a + self.b * t + self.c * t * t
    }

    #[must_use]
    pub fn curvature(&self, along: f64) -> f64 {
        let t = along / self.length;
        (self.b + 2.0 * self.c * t) / self.length
    }

    /// Elevation at `along` on the vertical curve.
    #[must_use]
    pub fn elevation(&self, along: f64) -> f64 {
        vcurve(
            self.start.z,
            self.control1,
            self.control2,
            self.end.z,
            along / self.length,
        )
    }

    /// Point at arc length `along` from the start. NaN when the arc is
    /// degenerate (zero or invalid length).
    #[must_use]
    pub fn station(&self, along: f64) -> Point3 {
        if self.length.is_nan() || self.length <= 0.0 {
            return Point3::NAN;
        }
        let t = along / self.length;
        let (cx, sy) = integrate_tangent(self.a, self.b, self.c, t);
        let forward = Vec3::from_bearing(self.chord_bearing);
        let left = Vec3::new(-forward.y, forward.x, 0.0);
        let offset = forward * (cx * self.length) + left * (sy * self.length);
        Point3::new(
            self.start.x + offset.x,
            self.start.y + offset.y,
            self.elevation(along),
        )
    }

    #[must_use]
    pub fn midpoint(&self) -> Point3 {
        self.station(self.length / 2.0)
    }
}

/// `(integral of cos phi, integral of sin phi)` over `[0, upper]`.
fn integrate_tangent(a: f64, b: f64, c: f64, upper: f64) -> (f64, f64) {
    let mut cos_sum = 0.0;
    let mut sin_sum = 0.0;
    let width = upper / PANELS as f64;
    for panel in 0..PANELS {
        let mid = (panel as f64 + 0.5) * width;
        let half = width / 2.0;
        for (node, weight) in GL_NODES.iter().zip(GL_WEIGHTS) {
            for t in [mid - half * node, mid + half * node] {
                let phi = a + b * t + c * t * t;
                cos_sum += weight * half * phi.cos();
                sin_sum += weight * half * phi.sin();
            }
        }
    }
    (cos_sum, sin_sum)
}

/// Lateral miss at the end of the chord and its derivative with respect to `c`
/// (with `b = turn - c`, so `d phi / d c = t^2 - t`).
fn closure_residual(a: f64, b: f64, c: f64) -> (f64, f64) {
    let mut g = 0.0;
    let mut dg = 0.0;
    let width = 1.0 / PANELS as f64;
    for panel in 0..PANELS {
        let mid = (panel as f64 + 0.5) * width;
        let half = width / 2.0;
        for (node, weight) in GL_NODES.iter().zip(GL_WEIGHTS) {
            for t in [mid - half * node, mid + half * node] {
                let phi = a + b * t + c * t * t;
                g += weight * half * phi.sin();
                dg += weight * half * phi.cos() * (t * t - t);
            }
        }
    }
    (g, dg)
}
