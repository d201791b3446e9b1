//! Triangulated irregular network (TIN) over which contours are traced.
//!
//! Points carry an elevation and an optional slope. Every triangle is a cubic
//! Bézier patch whose side cubics depend only on the side's two end points, so
//! the two triangles sharing an edge agree exactly along it. Without slopes
//! each patch is the flat facet through its corners.
//!
//! Edges record the triangle on either side: `tria` is the triangle whose
//! counter-clockwise boundary runs `a -> b`, `trib` the one running `b -> a`
//! (`None` on the outer boundary of the mesh).

mod qindex;
mod surface;

use std::collections::HashMap;

use serde::Serialize;

use crate::geom::{BBox, Point3, Tolerance, area2};

pub use qindex::QuadIndex;
pub use surface::{BezierPatch, edge_controls, edge_cubic};

/// Index into [`Tin::points`].
pub type PointIdx = u32;
/// Index into [`Tin::edges`].
pub type EdgeIdx = u32;
/// Index into [`Tin::triangles`].
pub type TriIdx = u32;

/// Barycentric coordinates may dip this far below zero and still count as inside.
const INSIDE_EPS: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TinPoint {
    pub position: Point3,
    /// Surface slope `(dz/dx, dz/dy)` at the point, if known.
    pub gradient: Option<[f64; 2]>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TinEdge {
    pub a: PointIdx,
    pub b: PointIdx,
    pub tria: Option<TriIdx>,
    pub trib: Option<TriIdx>,
    controls: [f64; 2],
}

impl TinEdge {
    /// Interior edges have a triangle on both sides.
    #[must_use]
    pub const fn is_interior(&self) -> bool {
        self.tria.is_some() && self.trib.is_some()
    }

    /// The triangle across this edge from `tri`.
    #[must_use]
    pub fn other_triangle(&self, tri: TriIdx) -> Option<TriIdx> {
        if self.tria == Some(tri) {
            self.trib
        } else if self.trib == Some(tri) {
            self.tria
        } else {
            None
        }
    }

    /// Any triangle bordering the edge, `tria` first.
    #[must_use]
    pub fn any_triangle(&self) -> Option<TriIdx> {
        self.tria.or(self.trib)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TinTriangle {
    /// Corners in counter-clockwise order.
    pub corners: [PointIdx; 3],
    /// `edges[s]` joins `corners[s]` to `corners[(s + 1) % 3]`.
    pub edges: [EdgeIdx; 3],
    /// Whether side `s` runs in the same direction as its edge (`a -> b`).
    pub forward: [bool; 3],
    center_override: Option<f64>,
    patch: BezierPatch,
}

impl TinTriangle {
    /// Side index of `edge` in this triangle.
    #[must_use]
    pub fn side_of(&self, edge: EdgeIdx) -> Option<usize> {
        self.edges.iter().position(|&e| e == edge)
    }

    #[must_use]
    pub const fn patch(&self) -> &BezierPatch {
        &self.patch
    }
}

/// Errors raised while building a [`Tin`].
#[derive(Debug, thiserror::Error)]
pub enum TinError {
    #[error("mesh has no triangles")]
    EmptyMesh,

    #[error("at least 3 points are required, got {count}")]
    TooFewPoints { count: usize },

    #[error("point {index} has non-finite coordinates")]
    NonFiniteVertex { index: usize },

    #[error("triangle {triangle} references missing point {vertex}")]
    VertexOutOfRange { triangle: usize, vertex: u32 },

    #[error("triangle {triangle} has zero area")]
    DegenerateTriangle { triangle: usize },

    #[error("edge {a}-{b} is shared by more than two triangles or inconsistently oriented")]
    NonManifoldEdge { a: u32, b: u32 },
}

#[derive(Debug, Clone)]
pub struct Tin {
    points: Vec<TinPoint>,
    edges: Vec<TinEdge>,
    triangles: Vec<TinTriangle>,
}

impl Tin {
    /// Build a TIN from points and triangle corner indices.
    ///
    /// Triangles may be given in either winding; they are stored
    /// counter-clockwise. Edges are numbered in order of first appearance.
    ///
    /// # Errors
    /// Returns an error for empty input, non-finite points, out-of-range
    /// indices, zero-area triangles and edges shared by more than two triangles.
    pub fn new(points: Vec<Point3>, triangles: &[[PointIdx; 3]]) -> Result<Self, TinError> {
        if points.len() < 3 {
            return Err(TinError::TooFewPoints { count: points.len() });
        }
        if triangles.is_empty() {
            return Err(TinError::EmptyMesh);
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(TinError::NonFiniteVertex { index });
        }

        let mut tin = Self {
            points: points
                .into_iter()
                .map(|position| TinPoint { position, gradient: None })
                .collect(),
            edges: Vec::new(),
            triangles: Vec::with_capacity(triangles.len()),
        };

        let mut edge_lookup: HashMap<(PointIdx, PointIdx), EdgeIdx> = HashMap::new();
        for (t, &corners) in triangles.iter().enumerate() {
            if let Some(&vertex) = corners.iter().find(|&&c| c as usize >= tin.points.len()) {
                return Err(TinError::VertexOutOfRange { triangle: t, vertex });
            }
            let [p0, p1, p2] = corners.map(|c| tin.points[c as usize].position);
            let area = area2(p0, p1, p2);
            if area == 0.0 || !area.is_finite() {
                return Err(TinError::DegenerateTriangle { triangle: t });
            }
            let corners = if area < 0.0 {
                [corners[0], corners[2], corners[1]]
            } else {
                corners
            };

            let tri = t as TriIdx;
            let mut edges = [0; 3];
            let mut forward = [true; 3];
            for side in 0..3 {
                let from = corners[side];
                let to = corners[(side + 1) % 3];
                let key = (from.min(to), from.max(to));
                match edge_lookup.get(&key) {
                    None => {
                        let idx = tin.edges.len() as EdgeIdx;
                        tin.edges.push(TinEdge {
                            a: from,
                            b: to,
                            tria: Some(tri),
                            trib: None,
                            controls: [0.0; 2],
                        });
                        edge_lookup.insert(key, idx);
                        edges[side] = idx;
                    }
                    Some(&idx) => {
                        let edge = &mut tin.edges[idx as usize];
                        if edge.a != to || edge.trib.is_some() {
                            return Err(TinError::NonManifoldEdge { a: key.0, b: key.1 });
                        }
                        edge.trib = Some(tri);
                        edges[side] = idx;
                        forward[side] = false;
                    }
                }
            }

            tin.triangles.push(TinTriangle {
                corners,
                edges,
                forward,
                center_override: None,
                patch: BezierPatch::new([0.0; 3], [[0.0; 2]; 3], None),
            });
        }

        tin.rebuild_surface();
        log::debug!(
            "built TIN: {} points, {} edges, {} triangles",
            tin.points.len(),
            tin.edges.len(),
            tin.triangles.len()
        );
        Ok(tin)
    }

    /// Delaunay-triangulate `points` in plan and build the TIN.
    ///
    /// # Errors
    /// Returns [`TinError::EmptyMesh`] when the points are collinear or too few
    /// to form a triangle, and the errors of [`Tin::new`].
    pub fn triangulate(points: Vec<Point3>) -> Result<Self, TinError> {
        if points.len() < 3 {
            return Err(TinError::TooFewPoints { count: points.len() });
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(TinError::NonFiniteVertex { index });
        }
        let plan: Vec<delaunator::Point> = points
            .iter()
            .map(|p| delaunator::Point { x: p.x, y: p.y })
            .collect();
        let triangulation = delaunator::triangulate(&plan);
        let triangles: Vec<[PointIdx; 3]> = triangulation
            .triangles
            .chunks_exact(3)
            .map(|c| [c[0] as PointIdx, c[1] as PointIdx, c[2] as PointIdx])
            .collect();
        Self::new(points, &triangles)
    }

    #[must_use]
    pub fn points(&self) -> &[TinPoint] {
        &self.points
    }

    #[must_use]
    pub fn edges(&self) -> &[TinEdge] {
        &self.edges
    }

    #[must_use]
    pub fn triangles(&self) -> &[TinTriangle] {
        &self.triangles
    }

    #[must_use]
    pub fn point(&self, idx: PointIdx) -> Point3 {
        self.points[idx as usize].position
    }

    #[must_use]
    pub fn edge(&self, idx: EdgeIdx) -> &TinEdge {
        &self.edges[idx as usize]
    }

    #[must_use]
    pub fn triangle(&self, idx: TriIdx) -> &TinTriangle {
        &self.triangles[idx as usize]
    }

    /// Corner positions of a triangle, counter-clockwise.
    #[must_use]
    pub fn corner_positions(&self, tri: TriIdx) -> [Point3; 3] {
        self.triangle(tri).corners.map(|c| self.point(c))
    }

    /// Set the slope at a point and refresh the affected patches.
    pub fn set_gradient(&mut self, point: PointIdx, gradient: [f64; 2]) {
        self.points[point as usize].gradient = Some(gradient);
        self.rebuild_surface();
    }

    /// Override the centre control of a triangle's patch, raising or lowering
    /// its interior without touching its sides.
    pub fn set_center_elevation(&mut self, tri: TriIdx, elevation: f64) {
        self.triangles[tri as usize].center_override = Some(elevation);
        self.rebuild_surface();
    }

    /// Estimate a slope at every point as the area-weighted mean of the facet
    /// slopes around it.
    pub fn estimate_gradients(&mut self) {
        let mut sums = vec![(0.0, 0.0, 0.0); self.points.len()];
        for tri in &self.triangles {
            let [p0, p1, p2] = tri.corners.map(|c| self.points[c as usize].position);
            let det = area2(p0, p1, p2);
            let gx = ((p1.z - p0.z) * (p2.y - p0.y) - (p2.z - p0.z) * (p1.y - p0.y)) / det;
            let gy = ((p1.x - p0.x) * (p2.z - p0.z) - (p2.x - p0.x) * (p1.z - p0.z)) / det;
            let weight = det.abs();
            for &c in &tri.corners {
                let s = &mut sums[c as usize];
                s.0 += gx * weight;
                s.1 += gy * weight;
                s.2 += weight;
            }
        }
        for (point, (gx, gy, w)) in self.points.iter_mut().zip(sums) {
            if w > 0.0 {
                point.gradient = Some([gx / w, gy / w]);
            }
        }
        self.rebuild_surface();
    }

    fn rebuild_surface(&mut self) {
        for edge in &mut self.edges {
            let a = self.points[edge.a as usize];
            let b = self.points[edge.b as usize];
            edge.controls = edge_controls(
                a.position.z,
                b.position.z,
                a.gradient,
                b.gradient,
                (b.position.x - a.position.x, b.position.y - a.position.y),
            );
        }
        for tri in &mut self.triangles {
            let corners = tri.corners.map(|c| self.points[c as usize].position.z);
            let sides: [[f64; 2]; 3] = std::array::from_fn(|s| {
                let controls = self.edges[tri.edges[s] as usize].controls;
                if tri.forward[s] {
                    controls
                } else {
                    [controls[1], controls[0]]
                }
            });
            tri.patch = BezierPatch::new(corners, sides, tri.center_override);
        }
    }

    /// Elevation at fraction `s` along an edge, measured from `a` towards `b`.
    #[must_use]
    pub fn edge_elevation(&self, edge: EdgeIdx, s: f64) -> f64 {
        let e = self.edge(edge);
        edge_cubic(self.point(e.a).z, e.controls, self.point(e.b).z, s)
    }

    /// Plan position at fraction `s` along an edge, measured from `a`.
    #[must_use]
    pub fn edge_position(&self, edge: EdgeIdx, s: f64) -> Point3 {
        let e = self.edge(edge);
        self.point(e.a).lerp(self.point(e.b), s)
    }

    /// Barycentric coordinates of `p` in a triangle.
    #[must_use]
    pub fn barycentric(&self, tri: TriIdx, p: Point3) -> [f64; 3] {
        let [a, b, c] = self.corner_positions(tri);
        let total = area2(a, b, c);
        [
            area2(p, b, c) / total,
            area2(a, p, c) / total,
            area2(a, b, p) / total,
        ]
    }

    /// Whether `p` lies in the triangle (boundary included).
    #[must_use]
    pub fn contains(&self, tri: TriIdx, p: Point3) -> bool {
        p.is_finite() && self.barycentric(tri, p).iter().all(|&l| l >= -INSIDE_EPS)
    }

    /// Elevation of the triangle's patch at the plan position of `p`. The
    /// patch is extrapolated when `p` lies outside the triangle.
    #[must_use]
    pub fn triangle_elevation(&self, tri: TriIdx, p: Point3) -> f64 {
        self.triangle(tri).patch.evaluate(self.barycentric(tri, p))
    }

    /// First triangle containing `p`, by exhaustive search.
    #[must_use]
    pub fn find_triangle(&self, p: Point3) -> Option<TriIdx> {
        (0..self.triangles.len() as TriIdx).find(|&t| self.contains(t, p))
    }

    /// Mesh-wide elevation query; `None` off the surface.
    #[must_use]
    pub fn elevation_at(&self, p: Point3) -> Option<f64> {
        self.find_triangle(p).map(|t| self.triangle_elevation(t, p))
    }

    /// `(lowest, highest)` elevation the surface can reach.
    #[must_use]
    pub fn elevation_range(&self) -> (f64, f64) {
        self.triangles
            .iter()
            .map(|t| t.patch.control_range())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (l, h)| {
                (lo.min(l), hi.max(h))
            })
    }

    #[must_use]
    pub fn bbox(&self) -> BBox {
        let first = self.points[0].position;
        self.points
            .iter()
            .fold(BBox::new(first, first), |b, p| b.expand_point(p.position))
    }

    /// Clip the line through `p` along `bearing` to a triangle. Returns the two
    /// ends with their surface elevations, or `None` when the line misses the
    /// triangle.
    #[must_use]
    pub fn transverse_clip(&self, tri: TriIdx, p: Point3, bearing: f64) -> Option<(Point3, Point3)> {
        let corners = self.corner_positions(tri);
        let (dx, dy) = (bearing.cos(), bearing.sin());
        let mut lo = f64::NEG_INFINITY;
        let mut hi = f64::INFINITY;
        for side in 0..3 {
            let a = corners[side];
            let b = corners[(side + 1) % 3];
            let (ex, ey) = (b.x - a.x, b.y - a.y);
            // Inside is to the left of each side: cross(e, x - a) >= 0.
            let base = ex * (p.y - a.y) - ey * (p.x - a.x);
            let rate = ex * dy - ey * dx;
            if Tolerance::ZERO_LENGTH.is_zero_length(rate) {
                if base < 0.0 {
                    return None;
                }
                continue;
            }
            let s = -base / rate;
            if rate > 0.0 {
                lo = lo.max(s);
            } else {
                hi = hi.min(s);
            }
        }
        if !lo.is_finite() || !hi.is_finite() || lo >= hi {
            return None;
        }
        let at = |s: f64| {
            let q = Point3::new(p.x + s * dx, p.y + s * dy, 0.0);
            q.with_z(self.triangle_elevation(tri, q))
        };
        Some((at(lo), at(hi)))
    }
}

#[cfg(test)]
mod tests;
