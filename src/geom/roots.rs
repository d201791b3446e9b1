use super::Tolerance;

const MAX_STEPS: usize = 40;

/// Root of `f` on `[0, 1]` by the Illinois variant of regula falsi, given the
/// end values `f0 = f(0)` and `f1 = f(1)` of opposite sign (zero counts as
/// either). Returns `None` when the ends do not bracket a root or a value is
/// not finite.
#[must_use]
pub fn regula_falsi(f: impl Fn(f64) -> f64, f0: f64, f1: f64) -> Option<f64> {
    if !f0.is_finite() || !f1.is_finite() {
        return None;
    }
    if f0 == 0.0 {
        return Some(0.0);
    }
    if f1 == 0.0 {
        return Some(1.0);
    }
    if f0.signum() == f1.signum() {
        return None;
    }

    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    let (mut flo, mut fhi) = (f0, f1);
    let mut t = lo;
    let mut side = 0_i8;
    for _ in 0..MAX_STEPS {
        t = (lo * fhi - hi * flo) / (fhi - flo);
        let ft = f(t);
        if !ft.is_finite() {
            return None;
        }
        if ft == 0.0 || (hi - lo).abs() <= Tolerance::ROOT.eps {
            break;
        }
        if ft.signum() == fhi.signum() {
            hi = t;
            fhi = ft;
            if side == 1 {
                flo /= 2.0;
            }
            side = 1;
        } else {
            lo = t;
            flo = ft;
            if side == -1 {
                fhi /= 2.0;
            }
            side = -1;
        }
    }
    Some(t.clamp(0.0, 1.0))
}
