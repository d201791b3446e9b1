//! Where a contour level passes through one triangle.
//!
//! A [`CrossingLocator`] samples the triangle's patch on the shared lattice
//! (see [`lattice`](super::lattice)), classifies every lattice point as high
//! (`value >= level`) or low, and answers the per-sub-segment questions the
//! tracers ask: is it crossed, which way does the contour run through it,
//! where exactly is the crossing, and which mesh-edge crossing is it.

use std::cell::OnceCell;

use super::handle::{MAX_CROSSINGS_PER_EDGE, OrientedEdgeHandle};
use super::lattice::{SUBDIVISIONS, lattice};
use crate::geom::{Point3, regula_falsi};
use crate::tin::{Tin, TriIdx};

/// Upper bound on sub-segment steps in one walk through a triangle.
pub const MAX_WALK_STEPS: usize = 256;

const N: usize = SUBDIVISIONS;

/// Outcome of advancing one sub-segment along the contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Moved on to this sub-segment.
    Progressed(usize),
    /// The contour leaves the triangle through the current sub-segment.
    Exited,
    /// Back at the sub-segment the walk started from.
    Closed,
    /// No way forward: the sub-segment is not crossed, or the walk ran out
    /// of steps.
    Stalled,
}

#[derive(Debug, Clone)]
pub struct CrossingLocator<'a> {
    tin: &'a Tin,
    triangle: TriIdx,
    level: f64,
    values: Vec<f64>,
    positions: Vec<Point3>,
}

impl<'a> CrossingLocator<'a> {
    /// Sample `triangle` for contour `level`.
    ///
    /// Lattice points on a side take the shared edge cubic at the edge's own
    /// parameter, so both triangles on an edge see the same values.
    #[must_use]
    pub fn new(tin: &'a Tin, triangle: TriIdx, level: f64) -> Self {
        let lat = lattice();
        let tri = tin.triangle(triangle);
        let corners = tin.corner_positions(triangle);
        let mut values = Vec::with_capacity(lat.points.len());
        let mut positions = Vec::with_capacity(lat.points.len());
        for p in 0..lat.points.len() {
            match lat.point_side(p) {
                Some((side, pos)) => {
                    let edge = tri.edges[side];
                    let k = if tri.forward[side] { pos } else { N - pos };
                    let s = k as f64 / N as f64;
                    values.push(tin.edge_elevation(edge, s));
                    positions.push(tin.edge_position(edge, s));
                }
                None => {
                    let [u, v, w] = lat.barycentric(p);
                    values.push(tri.patch().evaluate([u, v, w]));
                    positions.push(Point3::new(
                        u * corners[0].x + v * corners[1].x + w * corners[2].x,
                        u * corners[0].y + v * corners[1].y + w * corners[2].y,
                        level,
                    ));
                }
            }
        }
        Self {
            tin,
            triangle,
            level,
            values,
            positions,
        }
    }

    #[must_use]
    pub const fn triangle(&self) -> TriIdx {
        self.triangle
    }

    #[must_use]
    pub const fn level(&self) -> f64 {
        self.level
    }

    #[must_use]
    pub fn segment_count(&self) -> usize {
        lattice().segments.len()
    }

    fn is_high(&self, point: usize) -> bool {
        self.values[point] >= self.level
    }

    /// Whether the contour passes through sub-segment `sub`.
    #[must_use]
    pub fn crosses(&self, sub: usize) -> bool {
        let [p, q] = lattice().segments[sub].ends;
        self.is_high(p) != self.is_high(q)
    }

    /// The sub-triangle the contour runs into after crossing `sub`: the one to
    /// the right of the low-to-high direction. `None` when not crossed;
    /// `Some(None)` when the contour leaves the triangle there.
    fn travel_face(&self, sub: usize) -> Option<Option<usize>> {
        if !self.crosses(sub) {
            return None;
        }
        let seg = lattice().segments[sub];
        Some(if self.is_high(seg.ends[1]) {
            seg.faces[1]
        } else {
            seg.faces[0]
        })
    }

    /// True when the contour enters this triangle through `sub`. Of the two
    /// triangles on an edge exactly one sees a given crossing as upleft.
    #[must_use]
    pub fn upleft(&self, sub: usize) -> bool {
        matches!(self.travel_face(sub), Some(Some(_)))
    }

    /// Advance from `sub` to the next crossed sub-segment along the contour.
    #[must_use]
    pub fn proceed(&self, sub: usize) -> Step {
        let face = match self.travel_face(sub) {
            None => return Step::Stalled,
            Some(None) => return Step::Exited,
            Some(Some(face)) => face,
        };
        lattice().faces[face]
            .iter()
            .copied()
            .find(|&s| s != sub && self.crosses(s))
            .map_or(Step::Stalled, Step::Progressed)
    }

    /// Follow the contour from `start` until it leaves the triangle, closes,
    /// or stalls.
    #[must_use]
    pub fn walk(&self, start: usize) -> TriangleWalk<'_, 'a> {
        TriangleWalk {
            locator: self,
            start,
            current: start,
            steps: 0,
            done: false,
        }
    }

    /// Crossing point on `sub` at the contour level. NaN when `sub` is not
    /// crossed or the crossing cannot be resolved.
    #[must_use]
    pub fn contourcept(&self, sub: usize) -> Point3 {
        if !self.crosses(sub) {
            return Point3::NAN;
        }
        let lat = lattice();
        let seg = lat.segments[sub];
        let level = self.level;

        if let Some((side, pos)) = seg.side {
            let tri = self.tin.triangle(self.triangle);
            let edge = tri.edges[side];
            let k0 = if tri.forward[side] { pos } else { N - 1 - pos };
            let s0 = k0 as f64 / N as f64;
            let s1 = (k0 + 1) as f64 / N as f64;
            let along = |t: f64| s0 + (s1 - s0) * t;
            let f = |t: f64| self.tin.edge_elevation(edge, along(t)) - level;
            return regula_falsi(f, f(0.0), f(1.0)).map_or(Point3::NAN, |t| {
                self.tin.edge_position(edge, along(t)).with_z(level)
            });
        }

        let [p, q] = seg.ends;
        let (bp, bq) = (lat.barycentric(p), lat.barycentric(q));
        let patch = self.tin.triangle(self.triangle).patch();
        let f = |t: f64| {
            patch.evaluate(std::array::from_fn(|i| bp[i] + (bq[i] - bp[i]) * t)) - level
        };
        regula_falsi(f, self.values[p] - level, self.values[q] - level).map_or(
            Point3::NAN,
            |t| self.positions[p].lerp(self.positions[q], t).with_z(level),
        )
    }

    /// Crossed sub-segments on `side`, as positions along the mesh edge
    /// counted from its `a` end.
    fn side_crossings(&self, side: usize) -> impl Iterator<Item = usize> + '_ {
        let forward = self.tin.triangle(self.triangle).forward[side];
        let segments = &lattice().side_segments[side];
        (0..N).filter(move |&k| {
            let pos = if forward { k } else { N - 1 - k };
            self.crosses(segments[pos])
        })
    }

    /// The mesh-edge crossing `sub` lies on. `None` for interior
    /// sub-segments, uncrossed ones, and crossings past the third on an edge.
    #[must_use]
    pub fn edgepart(&self, sub: usize) -> Option<OrientedEdgeHandle> {
        let (side, pos) = lattice().segments[sub].side?;
        let tri = self.tin.triangle(self.triangle);
        let k = if tri.forward[side] { pos } else { N - 1 - pos };
        let ordinal = self.side_crossings(side).position(|c| c == k)?;
        if ordinal >= MAX_CROSSINGS_PER_EDGE {
            return None;
        }
        Some(OrientedEdgeHandle::new(tri.edges[side], ordinal as u8))
    }

    /// The sub-segment of this triangle holding the crossing `handle`.
    #[must_use]
    pub fn subdir(&self, handle: OrientedEdgeHandle) -> Option<usize> {
        let tri = self.tin.triangle(self.triangle);
        let side = tri.side_of(handle.edge)?;
        let k = self.side_crossings(side).nth(usize::from(handle.side))?;
        let pos = if tri.forward[side] { k } else { N - 1 - k };
        Some(lattice().side_segments[side][pos])
    }
}

/// Bounded walk along the contour inside one triangle; see
/// [`CrossingLocator::walk`]. Yields each step, ending after the first
/// non-[`Progressed`](Step::Progressed) one.
#[derive(Debug)]
pub struct TriangleWalk<'l, 'a> {
    locator: &'l CrossingLocator<'a>,
    start: usize,
    current: usize,
    steps: usize,
    done: bool,
}

impl Iterator for TriangleWalk<'_, '_> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        if self.done {
            return None;
        }
        if self.steps >= MAX_WALK_STEPS {
            self.done = true;
            return Some(Step::Stalled);
        }
        self.steps += 1;
        let step = match self.locator.proceed(self.current) {
            Step::Progressed(next) if next == self.start => Step::Closed,
            other => other,
        };
        match step {
            Step::Progressed(next) => self.current = next,
            _ => self.done = true,
        }
        Some(step)
    }
}

/// Locators for every triangle at one contour level, built on first use.
#[derive(Debug)]
pub struct LevelView<'a> {
    tin: &'a Tin,
    level: f64,
    locators: Vec<OnceCell<CrossingLocator<'a>>>,
}

impl<'a> LevelView<'a> {
    #[must_use]
    pub fn new(tin: &'a Tin, level: f64) -> Self {
        Self {
            tin,
            level,
            locators: (0..tin.triangles().len()).map(|_| OnceCell::new()).collect(),
        }
    }

    #[must_use]
    pub const fn tin(&self) -> &'a Tin {
        self.tin
    }

    #[must_use]
    pub const fn level(&self) -> f64 {
        self.level
    }

    #[must_use]
    pub fn locator(&self, triangle: TriIdx) -> &CrossingLocator<'a> {
        self.locators[triangle as usize]
            .get_or_init(|| CrossingLocator::new(self.tin, triangle, self.level))
    }
}
