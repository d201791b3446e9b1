//! Contour extraction and smoothing over a [`Tin`](crate::tin::Tin).
//!
//! # Pipeline
//!
//! 1. [`extract_contours`] sweeps every level `i * interval` within the
//!    surface's elevation range. For each level it finds seed crossings
//!    ([`find_seeds`]), traces each unvisited seed across the mesh
//!    ([`trace`]), and adds loops lying inside single triangles
//!    ([`trace_interior`]).
//! 2. [`CurveSmoother`] refines every traced polyline into a [`PolySpiral`],
//!    splitting segments wherever the curve strays from the surface.
//!
//! ```ignore
//! use tin_contour::contour::{extract_contours, smooth_contours, ContourOptions, SmoothOptions};
//! use tin_contour::tin::{QuadIndex, Tin};
//!
//! let tin = Tin::triangulate(points)?;
//! let extraction = extract_contours(&tin, ContourOptions::new(5.0))?;
//! let index = QuadIndex::build(&tin);
//! let smoothed = smooth_contours(&index, &extraction.contours, SmoothOptions::default())?;
//! ```

mod crossing;
mod diagnostics;
mod handle;
mod lattice;
mod polyline;
mod registry;
mod seed;
mod set;
mod smooth;
mod split;
mod trace;

pub use crossing::{CrossingLocator, LevelView, MAX_WALK_STEPS, Step, TriangleWalk};
pub use diagnostics::{Anomaly, RejectedSplit, SmoothDiagnostics, TraceDiagnostics, TraceFault};
pub use handle::{MAX_CROSSINGS_PER_EDGE, OrientedEdgeHandle, VisitMarks};
pub use lattice::SUBDIVISIONS;
pub use polyline::{CurveChain, PolySpiral, Polyline};
pub use registry::{
    ContourError, ContourExtraction, ContourOptions, ContourRegistry, MAX_LEVELS, extract,
    extract_contours,
};
pub use seed::find_seeds;
pub use set::ContourSet;
pub use smooth::{CurveSmoother, SmoothOptions, SmoothResult, smooth_contours};
pub use split::{CCHALONG, SPLIT_TABLE, relprime, split_point};
pub use trace::{trace, trace_interior};

#[cfg(test)]
mod tests;
