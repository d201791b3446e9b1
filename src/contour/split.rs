//! Where to split a contour segment whose curve strays from the surface.
//!
//! A segment is sampled at the two Gauss-Legendre points of its length,
//! `CCHALONG` from either end. For a cubic error curve these two samples see
//! the extremes. The sampled deviations choose the split point through
//! [`SPLIT_TABLE`].

/// `(3 - √3) / 6`: the first two-point Gauss-Legendre node on `[0, 1]`.
pub const CCHALONG: f64 = 0.211_324_865_405_187_1;

/// Split fraction from the near end, indexed by `round(32 * (ratio + 1))`
/// where `ratio` relates the smaller sampled deviation to the larger. The ratio
/// is of magnitudes, so only entries `32..=64` are ever read.
pub const SPLIT_TABLE: [f64; 65] = [
    0.2113, 0.2123, 0.2134, 0.2145, 0.2156, 0.2167, 0.2179, 0.2191, 0.2204, 0.2216, 0.2229,
    0.2244, 0.2257, 0.2272, 0.2288, 0.2303, 0.2319, 0.2337, 0.2354, 0.2372, 0.2390, 0.2410,
    0.2430, 0.2451, 0.2472, 0.2495, 0.2519, 0.2544, 0.2570, 0.2597, 0.2625, 0.2654, 0.2684,
    0.2716, 0.2750, 0.2786, 0.2823, 0.2861, 0.2902, 0.2945, 0.2990, 0.3038, 0.3088, 0.3141,
    0.3198, 0.3258, 0.3320, 0.3386, 0.3454, 0.3527, 0.3605, 0.3687, 0.3773, 0.3862, 0.3955,
    0.4053, 0.4153, 0.4256, 0.4362, 0.4469, 0.4577, 0.4684, 0.4792, 0.4897, 0.5000,
];

/// Fraction along a segment at which to split it, given the deviations at the
/// left (`CCHALONG`) and right (`1 - CCHALONG`) sample points; `0.0` means no split.
///
/// A missing deviation (NaN) splits right at that sample point. Deviations both
/// within `tolerance * 23/27` need no split. Otherwise the split leans towards
/// the sample with the larger deviation, by how lopsided the two are.
#[must_use]
pub fn split_point(left: f64, right: f64, tolerance: f64) -> f64 {
    if left.is_nan() {
        return CCHALONG;
    }
    if right.is_nan() {
        return 1.0 - CCHALONG;
    }
    let (l, r) = (left.abs(), right.abs());
    if l * 27.0 <= tolerance * 23.0 && r * 27.0 <= tolerance * 23.0 {
        return 0.0;
    }
    let right_larger = r > l;
    let ratio = if right_larger { l / r } else { r / l };
    let index = ((ratio + 1.0) * 32.0).round();
    let index = if index.is_finite() {
        (index as usize).min(SPLIT_TABLE.len() - 1)
    } else {
        SPLIT_TABLE.len() - 1
    };
    let near = SPLIT_TABLE[index];
    if right_larger { 1.0 - near } else { near }
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// A stride coprime to `n`, near `n` times the golden section, so that
/// stepping `i = (i + stride) % n` visits every index once per `n` steps and
/// consecutive visits land far apart.
#[must_use]
pub fn relprime(n: usize) -> usize {
    if n <= 2 {
        return 1;
    }
    let target = (n as f64 * (5.0_f64.sqrt() - 1.0) / 2.0).round() as usize;
    for distance in 0..n {
        for candidate in [target.checked_sub(distance), target.checked_add(distance)] {
            if let Some(c) = candidate.filter(|&c| c > 0 && c < n) {
                if gcd(c, n) == 1 {
                    return c;
                }
            }
        }
    }
    1
}
