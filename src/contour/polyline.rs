//! Contour curves: raw polylines from the tracer and the spiral-arc chains
//! the smoother turns them into.

use serde::Serialize;

use crate::geom::{Point3, SpiralArc, wrap_angle};

/// An ordered run of segments the smoother can refine.
pub trait CurveChain {
    fn elevation(&self) -> f64;

    fn vertex_count(&self) -> usize;

    fn is_closed(&self) -> bool;

    /// Segments between consecutive vertices, plus the closing one on a
    /// closed chain.
    fn segment_count(&self) -> usize {
        let n = self.vertex_count();
        if self.is_closed() {
            if n >= 2 { n } else { 0 }
        } else {
            n.saturating_sub(1)
        }
    }

    fn segment(&self, n: usize) -> SpiralArc;

    /// Insert `p` as a new vertex inside segment `n`.
    fn split_segment(&mut self, n: usize, p: Point3);
}

/// Points of equal elevation; closed polylines do not repeat the first point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polyline {
    elevation: f64,
    points: Vec<Point3>,
    closed: bool,
}

impl Polyline {
    #[must_use]
    pub const fn new(elevation: f64) -> Self {
        Self {
            elevation,
            points: Vec::new(),
            closed: false,
        }
    }

    #[must_use]
    pub fn from_points(elevation: f64, points: Vec<Point3>, closed: bool) -> Self {
        Self {
            elevation,
            points,
            closed,
        }
    }

    #[must_use]
    pub const fn elevation(&self) -> f64 {
        self.elevation
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> Option<Point3> {
        self.points.first().copied()
    }

    #[must_use]
    pub fn last(&self) -> Option<Point3> {
        self.points.last().copied()
    }

    pub fn push(&mut self, p: Point3) {
        self.points.push(p);
    }

    pub fn set_closed(&mut self, closed: bool) {
        self.closed = closed;
    }

    /// Drop consecutive repeats, and on a closed polyline trailing copies of
    /// the first point.
    pub fn dedup(&mut self) {
        self.points.dedup();
        if self.closed {
            while self.points.len() > 1 && self.points.last() == self.points.first() {
                self.points.pop();
            }
        }
    }

    /// Plan length, including the closing segment of a closed polyline.
    #[must_use]
    pub fn length(&self) -> f64 {
        let open: f64 = self
            .points
            .windows(2)
            .map(|w| w[0].planar_distance(w[1]))
            .sum();
        match (self.closed, self.points.first(), self.points.last()) {
            (true, Some(&first), Some(&last)) => open + last.planar_distance(first),
            _ => open,
        }
    }
}

impl CurveChain for Polyline {
    fn elevation(&self) -> f64 {
        self.elevation
    }

    fn vertex_count(&self) -> usize {
        self.points.len()
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn segment(&self, n: usize) -> SpiralArc {
        let next = (n + 1) % self.points.len();
        SpiralArc::line(self.points[n], self.points[next])
    }

    fn split_segment(&mut self, n: usize, p: Point3) {
        self.points.insert(n + 1, p);
    }
}

/// A contour as a chain of spiral arcs through its vertices.
///
/// Each vertex carries a tangent bearing bisecting its two chords. The free
/// ends of an open chain take the bearing mirrored across the end chord, which
/// makes the end segments circular arcs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolySpiral {
    elevation: f64,
    points: Vec<Point3>,
    bearings: Vec<f64>,
    closed: bool,
}

impl PolySpiral {
    #[must_use]
    pub fn from_polyline(polyline: &Polyline) -> Self {
        let mut chain = Self {
            elevation: polyline.elevation,
            points: polyline.points.clone(),
            bearings: vec![0.0; polyline.points.len()],
            closed: polyline.closed,
        };
        for i in 0..chain.points.len() {
            chain.smooth_vertex(i);
        }
        chain.smooth_ends();
        chain
    }

    #[must_use]
    pub const fn elevation(&self) -> f64 {
        self.elevation
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Tangent bearing at each vertex.
    #[must_use]
    pub fn bearings(&self) -> &[f64] {
        &self.bearings
    }

    #[must_use]
    pub fn arcs(&self) -> impl Iterator<Item = SpiralArc> + '_ {
        (0..self.segment_count()).map(|n| self.segment(n))
    }

    /// Plan length along the arcs.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.arcs().map(|arc| arc.length()).sum()
    }

    /// Points along the chain no further apart than `spacing`, for drawing.
    #[must_use]
    pub fn densify(&self, spacing: f64) -> Vec<Point3> {
        let mut out = Vec::new();
        for arc in self.arcs() {
            let steps = if spacing > 0.0 {
                (arc.length() / spacing).ceil().max(1.0) as usize
            } else {
                1
            };
            out.push(arc.start());
            for k in 1..steps {
                let p = arc.station(arc.length() * k as f64 / steps as f64);
                if p.is_finite() {
                    out.push(p);
                }
            }
        }
        if !self.closed {
            if let Some(&last) = self.points.last() {
                out.push(last);
            }
        }
        out
    }

    fn chord_bearing(&self, i: usize) -> f64 {
        let next = (i + 1) % self.points.len();
        self.points[i].bearing_to(self.points[next])
    }

    fn smooth_vertex(&mut self, i: usize) {
        let n = self.points.len();
        if n < 2 {
            return;
        }
        let interior = self.closed || (i > 0 && i + 1 < n);
        if !interior {
            return;
        }
        let prev = (i + n - 1) % n;
        let incoming = self.chord_bearing(prev);
        let outgoing = self.chord_bearing(i);
        self.bearings[i] = incoming + wrap_angle(outgoing - incoming) / 2.0;
    }

    fn smooth_ends(&mut self) {
        let n = self.points.len();
        if self.closed || n < 2 {
            return;
        }
        if n == 2 {
            let chord = self.chord_bearing(0);
            self.bearings = vec![chord, chord];
            return;
        }
        let first = self.chord_bearing(0);
        self.bearings[0] = first - wrap_angle(self.bearings[1] - first);
        let last = self.chord_bearing(n - 2);
        self.bearings[n - 1] = last - wrap_angle(self.bearings[n - 2] - last);
    }
}

impl CurveChain for PolySpiral {
    fn elevation(&self) -> f64 {
        self.elevation
    }

    fn vertex_count(&self) -> usize {
        self.points.len()
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    /// The spiral between vertices `n` and `n + 1`; a straight segment when
    /// the tangents cannot be joined by a forward-running spiral.
    fn segment(&self, n: usize) -> SpiralArc {
        let next = (n + 1) % self.points.len();
        let arc = SpiralArc::new(
            self.points[n],
            self.points[next],
            self.bearings[n],
            self.bearings[next],
        );
        if arc.is_valid() {
            arc
        } else {
            SpiralArc::line(self.points[n], self.points[next])
        }
    }

    fn split_segment(&mut self, n: usize, p: Point3) {
        let at = n + 1;
        self.points.insert(at, p);
        self.bearings.insert(at, 0.0);
        let len = self.points.len();
        for i in [at + len - 1, at, at + 1] {
            self.smooth_vertex(i % len);
        }
        self.smooth_ends();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_4;

    fn square() -> Polyline {
        Polyline::from_points(
            5.0,
            vec![
                Point3::new(0.0, 0.0, 5.0),
                Point3::new(1.0, 0.0, 5.0),
                Point3::new(1.0, 1.0, 5.0),
                Point3::new(0.0, 1.0, 5.0),
            ],
            true,
        )
    }

    #[test]
    fn dedup_removes_repeats_and_closing_copy() {
        let mut pl = square();
        pl.points.insert(1, Point3::new(0.0, 0.0, 5.0));
        pl.push(Point3::new(0.0, 0.0, 5.0));
        pl.dedup();
        assert_eq!(pl.len(), 4);
        assert_eq!(pl.segment_count(), 4);
        assert!((pl.length() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn closed_square_tangents_bisect_corners() {
        let chain = PolySpiral::from_polyline(&square());
        // Corner (1, 0): in from the west, out to the north.
        assert!((chain.bearings()[1] - FRAC_PI_4).abs() < 1e-12);
        assert_eq!(chain.segment_count(), 4);
        for arc in chain.arcs() {
            assert!(arc.is_valid());
            assert!(arc.length() > arc.chord_length());
        }
    }

    #[test]
    fn open_ends_mirror_the_neighbouring_tangent() {
        let pl = Polyline::from_points(
            0.0,
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 1.0, 0.0),
            ],
            false,
        );
        let chain = PolySpiral::from_polyline(&pl);
        let b = chain.bearings();
        assert!((b[1] - FRAC_PI_4 / 2.0).abs() < 1e-12);
        assert!((b[0] + FRAC_PI_4 / 2.0).abs() < 1e-12);
        assert!((b[2] - (FRAC_PI_4 + FRAC_PI_4 / 2.0)).abs() < 1e-12);
        // End segments are circular.
        assert!(chain.segment(0).clothance().abs() < 1e-9);
    }

    #[test]
    fn split_keeps_chain_through_all_vertices() {
        let mut chain = PolySpiral::from_polyline(&square());
        chain.split_segment(3, Point3::new(-0.1, 0.5, 5.0));
        assert_eq!(chain.vertex_count(), 5);
        assert_eq!(chain.points()[4], Point3::new(-0.1, 0.5, 5.0));
        let last = chain.segment(4);
        assert_eq!(last.end(), chain.points()[0]);
        assert!(chain.densify(0.1).len() > 40);
    }

    #[test]
    fn straight_polyline_segments_are_lines() {
        let mut pl = Polyline::new(2.0);
        pl.push(Point3::new(0.0, 0.0, 2.0));
        pl.push(Point3::new(3.0, 4.0, 2.0));
        assert_eq!(pl.segment_count(), 1);
        assert!((pl.segment(0).length() - 5.0).abs() < 1e-12);
        pl.split_segment(0, Point3::new(1.5, 2.0, 2.0));
        assert_eq!(pl.len(), 3);
    }
}
