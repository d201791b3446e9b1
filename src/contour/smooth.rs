//! Adaptive refinement of traced contours into spiral-arc chains.
//!
//! Each contour is refined twice: first as straight segments against a coarse
//! tolerance, then as spiral arcs against a fine one. A segment is split when
//! its curve strays from the surface at either sample point (see
//! [`split_point`]) and it is longer than the contour interval. The split
//! point is moved onto the true contour across the segment's chord.

use std::f64::consts::FRAC_PI_2;

use super::diagnostics::{Anomaly, RejectedSplit, SmoothDiagnostics};
use super::polyline::{CurveChain, PolySpiral, Polyline};
use super::registry::ContourError;
use super::set::ContourSet;
use super::split::{CCHALONG, relprime, split_point};
use crate::geom::{Point3, SpiralArc, regula_falsi};
use crate::tin::{QuadIndex, TriIdx};

/// Samples taken along the transverse transect when placing a split point.
const TRANSECT_SAMPLES: usize = 16;

/// Options for [`CurveSmoother`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothOptions {
    /// Straight-segment pass tolerance is `interval / coarse_divisor`.
    pub coarse_divisor: f64,
    /// Spiral pass tolerance is `interval / fine_divisor`.
    pub fine_divisor: f64,
    /// A pass stops splitting once a contour has this many times its
    /// starting segment count.
    pub max_growth: usize,
    /// Keep every rejected split in [`SmoothDiagnostics::rejected`].
    pub record_rejections: bool,
}

impl SmoothOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            coarse_divisor: 2.0,
            fine_divisor: 10.0,
            max_growth: 64,
            record_rejections: false,
        }
    }

    #[must_use]
    pub const fn coarse_divisor(mut self, divisor: f64) -> Self {
        self.coarse_divisor = divisor;
        self
    }

    #[must_use]
    pub const fn fine_divisor(mut self, divisor: f64) -> Self {
        self.fine_divisor = divisor;
        self
    }

    #[must_use]
    pub const fn max_growth(mut self, growth: usize) -> Self {
        self.max_growth = growth;
        self
    }

    #[must_use]
    pub const fn record_rejections(mut self, record: bool) -> Self {
        self.record_rejections = record;
        self
    }

    /// # Errors
    /// Returns [`ContourError::InvalidTolerance`] for non-positive divisors or
    /// a zero growth cap.
    pub fn validate(&self) -> Result<(), ContourError> {
        for (name, divisor) in [
            ("coarse_divisor", self.coarse_divisor),
            ("fine_divisor", self.fine_divisor),
        ] {
            if !(divisor.is_finite() && divisor > 0.0) {
                return Err(ContourError::InvalidTolerance {
                    reason: format!("{name} must be finite and positive, got {divisor}"),
                });
            }
        }
        if self.max_growth == 0 {
            return Err(ContourError::InvalidTolerance {
                reason: "max_growth must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for SmoothOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of [`CurveSmoother::smooth`].
#[derive(Debug, Clone)]
pub struct SmoothResult {
    pub contours: ContourSet<PolySpiral>,
    pub diagnostics: SmoothDiagnostics,
}

#[derive(Debug, Clone)]
pub struct CurveSmoother<'i, 'a> {
    index: &'i QuadIndex<'a>,
    interval: f64,
    options: SmoothOptions,
}

impl<'i, 'a> CurveSmoother<'i, 'a> {
    /// # Errors
    /// Returns an error for an invalid interval or options.
    pub fn new(
        index: &'i QuadIndex<'a>,
        interval: f64,
        options: SmoothOptions,
    ) -> Result<Self, ContourError> {
        if !(interval.is_finite() && interval > 0.0) {
            return Err(ContourError::InvalidInterval { interval });
        }
        options.validate()?;
        Ok(Self {
            index,
            interval,
            options,
        })
    }

    #[must_use]
    pub const fn options(&self) -> &SmoothOptions {
        &self.options
    }

    /// Smooth every contour of `contours`, keeping levels and order.
    #[must_use]
    pub fn smooth(&self, contours: &ContourSet<Polyline>) -> SmoothResult {
        let mut smoothed = ContourSet::new(contours.interval());
        let mut diagnostics = SmoothDiagnostics::new();
        for (level, polylines) in contours.levels() {
            for (i, polyline) in polylines.iter().enumerate() {
                smoothed.insert(level, self.smooth_contour(polyline, i, &mut diagnostics));
            }
        }
        log::debug!("smoothing: {}", diagnostics.summary());
        SmoothResult {
            contours: smoothed,
            diagnostics,
        }
    }

    /// Both refinement passes over one contour; `contour` labels diagnostics.
    pub fn smooth_contour(
        &self,
        polyline: &Polyline,
        contour: usize,
        diagnostics: &mut SmoothDiagnostics,
    ) -> PolySpiral {
        let before = diagnostics.inserted_points;
        let mut straight = polyline.clone();
        self.refine(
            &mut straight,
            self.interval / self.options.coarse_divisor,
            contour,
            diagnostics,
        );
        let mut spiral = PolySpiral::from_polyline(&straight);
        self.refine(
            &mut spiral,
            self.interval / self.options.fine_divisor,
            contour,
            diagnostics,
        );
        diagnostics.contours += 1;
        log::trace!(
            "contour {contour} at {}: {} -> {} points",
            polyline.elevation(),
            polyline.len(),
            polyline.len() + diagnostics.inserted_points - before
        );
        spiral
    }

    /// Split segments of `chain` until every one is within `tolerance` of the
    /// surface, too short to split, or the growth cap is reached.
    ///
    /// Segments are visited with a stride coprime to the segment count; after
    /// each insertion the sweep starts over. Once the chain has more than
    /// twice its starting segments the tolerance widens in proportion.
    pub fn refine<C: CurveChain>(
        &self,
        chain: &mut C,
        tolerance: f64,
        contour: usize,
        diagnostics: &mut SmoothDiagnostics,
    ) {
        let original = chain.segment_count();
        if original == 0 {
            return;
        }
        let limit = original.saturating_mul(self.options.max_growth);
        let mut count = original;
        let mut n = 0;
        let mut unchanged = 0;
        while unchanged < count {
            if count >= limit {
                break;
            }
            n = (n + relprime(count)) % count;
            unchanged += 1;
            let arc = chain.segment(n);
            let length = arc.length();
            if length.is_nan() || length <= self.interval {
                continue;
            }
            let widen = if count > 2 * original {
                count as f64 / original as f64
            } else {
                1.0
            };
            let fraction = self.split_fraction(&arc, tolerance * widen, diagnostics);
            if fraction == 0.0 {
                continue;
            }
            if let Some(p) = self.place_split(&arc, fraction, chain.elevation(), contour, diagnostics)
            {
                chain.split_segment(n, p);
                count = chain.segment_count();
                diagnostics.inserted_points += 1;
                unchanged = 0;
            }
        }
    }

    /// Surface elevation under `p` from whichever triangle contains it.
    fn surface_elevation(&self, p: Point3) -> Option<f64> {
        let tri = self.index.locate(p)?;
        Some(self.index.tin().triangle_elevation(tri, p))
    }

    /// Where to split `arc`, or `0.0` to leave it.
    fn split_fraction(
        &self,
        arc: &SpiralArc,
        tolerance: f64,
        diagnostics: &mut SmoothDiagnostics,
    ) -> f64 {
        let length = arc.length();
        let left = arc.station(length * CCHALONG);
        let right = arc.station(length * (1.0 - CCHALONG));
        if !left.is_finite() || !right.is_finite() {
            return 0.0;
        }

        let tin = self.index.tin();
        let mid = arc.start().midpoint(arc.end());
        let located = self.index.locate(mid);
        if let Some(tri) = located {
            let shared = [arc.start(), arc.end(), left, right]
                .into_iter()
                .all(|p| tin.contains(tri, p));
            if shared {
                return split_point(
                    left.z - tin.triangle_elevation(tri, left),
                    right.z - tin.triangle_elevation(tri, right),
                    tolerance,
                );
            }
        }

        let left_surface = self.surface_elevation(left);
        let right_surface = self.surface_elevation(right);
        let recovered = left_surface.is_some() || right_surface.is_some();
        if located.is_none() {
            diagnostics.location_fallbacks += 1;
            diagnostics.record(Anomaly::LocationFailure { at: mid, recovered });
        }
        if !recovered {
            diagnostics.default_splits += 1;
            if located.is_some() {
                diagnostics.record(Anomaly::LocationFailure {
                    at: mid,
                    recovered: false,
                });
            }
            return 0.5;
        }
        split_point(
            left_surface.map_or(f64::NAN, |z| left.z - z),
            right_surface.map_or(f64::NAN, |z| right.z - z),
            tolerance,
        )
    }

    /// The contour point across the chord of `arc` at `fraction`, found on a
    /// transverse line through the containing triangle.
    fn place_split(
        &self,
        arc: &SpiralArc,
        fraction: f64,
        level: f64,
        contour: usize,
        diagnostics: &mut SmoothDiagnostics,
    ) -> Option<Point3> {
        let at = arc.start().lerp(arc.end(), fraction).with_z(level);
        let mut transect = None;
        let placed = self.index.locate(at).and_then(|tri| {
            let ends = self
                .index
                .tin()
                .transverse_clip(tri, at, arc.chord_bearing() + FRAC_PI_2)?;
            transect = Some(ends);
            self.nearest_crossing(tri, ends, at, level)
        });
        let placed = placed.filter(|p| {
            p.is_finite()
                && !p.same_plan_position(arc.start())
                && !p.same_plan_position(arc.end())
        });
        if placed.is_none() {
            diagnostics.rejected_count += 1;
            if self.options.record_rejections {
                diagnostics.rejected.push(RejectedSplit {
                    contour,
                    elevation: level,
                    at,
                    transect,
                });
            }
        }
        placed
    }

    fn nearest_crossing(
        &self,
        tri: TriIdx,
        (p0, p1): (Point3, Point3),
        near: Point3,
        level: f64,
    ) -> Option<Point3> {
        let tin = self.index.tin();
        let value = |t: f64| tin.triangle_elevation(tri, p0.lerp(p1, t)) - level;
        let mut best: Option<(f64, Point3)> = None;
        let mut prev_t = 0.0;
        let mut prev_v = value(0.0);
        for k in 1..=TRANSECT_SAMPLES {
            let t = k as f64 / TRANSECT_SAMPLES as f64;
            let v = value(t);
            if (prev_v >= 0.0) != (v >= 0.0) {
                let span = |u: f64| prev_t + (t - prev_t) * u;
                if let Some(u) = regula_falsi(|u| value(span(u)), prev_v, v) {
                    let p = p0.lerp(p1, span(u)).with_z(level);
                    let d = p.planar_distance(near);
                    if best.is_none_or(|(best_d, _)| d < best_d) {
                        best = Some((d, p));
                    }
                }
            }
            prev_t = t;
            prev_v = v;
        }
        best.map(|(_, p)| p)
    }
}

/// Smooth `contours` against the surface indexed by `index`, at the set's
/// own interval.
///
/// # Errors
/// Returns an error for invalid options.
pub fn smooth_contours(
    index: &QuadIndex<'_>,
    contours: &ContourSet<Polyline>,
    options: SmoothOptions,
) -> Result<SmoothResult, ContourError> {
    Ok(CurveSmoother::new(index, contours.interval(), options)?.smooth(contours))
}
