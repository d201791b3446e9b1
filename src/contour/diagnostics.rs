//! Diagnostics for contour extraction and smoothing.
//!
//! Nothing in the contouring loops aborts a run. Problems met along the way
//! are recorded here as [`Anomaly`] values (and logged) while the sweep
//! carries on with the remaining seeds, triangles and contours.
//!
//! ```ignore
//! let result = extract_contours(&tin, ContourOptions::new(5.0))?;
//! if !result.diagnostics.is_clean() {
//!     for anomaly in &result.diagnostics.anomalies {
//!         eprintln!("{anomaly}");
//!     }
//! }
//! ```

use std::fmt;

use serde::Serialize;

use crate::geom::Point3;
use crate::tin::{EdgeIdx, TriIdx};

/// What went wrong while walking a contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TraceFault {
    /// A crossing point repeated its predecessor.
    RepeatedPoint,
    /// The walk left a triangle through the edge crossing it entered by.
    StalledEdge,
    /// The walk stopped inside a triangle, away from any mesh edge crossing.
    MidTriangleStop,
    /// The walk inside one triangle used up its step budget.
    IterationCap,
    /// The walk ran into a crossing already traced by another contour.
    MergedTrace,
    /// The neighbouring triangle does not see the crossing being handed over.
    MissingCrossing,
}

impl TraceFault {
    /// Whether the fault ends the trace early. A repeated point is only
    /// skipped.
    #[must_use]
    pub const fn cuts_trace(self) -> bool {
        !matches!(self, Self::RepeatedPoint)
    }
}

impl fmt::Display for TraceFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::RepeatedPoint => "repeated point",
            Self::StalledEdge => "stalled edge transition",
            Self::MidTriangleStop => "mid-triangle stop",
            Self::IterationCap => "iteration cap exceeded",
            Self::MergedTrace => "ran into another contour",
            Self::MissingCrossing => "crossing missing in neighbour",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Anomaly {
    /// A crossing point could not be resolved and was left out.
    DegenerateCrossing { elevation: f64, triangle: TriIdx },
    /// Inconsistent data met while tracing. Unless the fault is a repeated
    /// point the trace was cut short and kept as an open contour.
    TracingAnomaly {
        elevation: f64,
        fault: TraceFault,
        triangle: TriIdx,
        edge: Option<EdgeIdx>,
    },
    /// No triangle contains a point the smoother needed; `recovered` tells
    /// whether a mesh-wide query stood in for it.
    LocationFailure { at: Point3, recovered: bool },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateCrossing { elevation, triangle } => {
                write!(f, "degenerate crossing at {elevation} in triangle {triangle}")
            }
            Self::TracingAnomaly {
                elevation,
                fault,
                triangle,
                edge,
            } => {
                write!(f, "{fault} at {elevation} in triangle {triangle}")?;
                if let Some(edge) = edge {
                    write!(f, " (edge {edge})")?;
                }
                Ok(())
            }
            Self::LocationFailure { at, recovered } => {
                write!(f, "no triangle at ({}, {})", at.x, at.y)?;
                if *recovered {
                    f.write_str(", used mesh-wide query")?;
                } else {
                    f.write_str(", used default split")?;
                }
                Ok(())
            }
        }
    }
}

fn report(anomalies: &mut Vec<Anomaly>, anomaly: Anomaly) {
    match &anomaly {
        Anomaly::DegenerateCrossing { .. } => log::trace!("{anomaly}"),
        _ => log::warn!("{anomaly}"),
    }
    anomalies.push(anomaly);
}

/// Counters and anomalies from [`extract_contours`](super::extract_contours).
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct TraceDiagnostics {
    /// Contour levels swept.
    pub levels: usize,
    /// Seeds found over all levels.
    pub seeds: usize,
    /// Seeds actually traced (not already reached by an earlier trace).
    pub traced: usize,
    pub open_contours: usize,
    pub closed_contours: usize,
    /// Closed contours lying inside a single triangle.
    pub interior_loops: usize,
    /// Traces too short to keep.
    pub discarded_degenerate: usize,
    pub anomalies: Vec<Anomaly>,
}

impl TraceDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, anomaly: Anomaly) {
        report(&mut self.anomalies, anomaly);
    }

    /// Contours emitted, open and closed.
    #[must_use]
    pub const fn contour_count(&self) -> usize {
        self.open_contours + self.closed_contours
    }

    /// True when no trace was cut short.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        !self.anomalies.iter().any(|a| {
            matches!(a, Anomaly::TracingAnomaly { fault, .. } if fault.cuts_trace())
        })
    }

    pub fn merge(&mut self, other: &TraceDiagnostics) {
        self.levels += other.levels;
        self.seeds += other.seeds;
        self.traced += other.traced;
        self.open_contours += other.open_contours;
        self.closed_contours += other.closed_contours;
        self.interior_loops += other.interior_loops;
        self.discarded_degenerate += other.discarded_degenerate;
        self.anomalies.extend(other.anomalies.iter().cloned());
    }

    /// Short one-line summary for logging.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!(
            "levels:{} open:{} closed:{}",
            self.levels, self.open_contours, self.closed_contours
        )];
        if self.interior_loops > 0 {
            parts.push(format!("interior:{}", self.interior_loops));
        }
        if self.discarded_degenerate > 0 {
            parts.push(format!("discarded:{}", self.discarded_degenerate));
        }
        if !self.anomalies.is_empty() {
            parts.push(format!("anomalies:{}", self.anomalies.len()));
        }
        parts.join(" ")
    }
}

impl fmt::Display for TraceDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Contour Diagnostics:")?;
        writeln!(f, "  Levels: {}", self.levels)?;
        writeln!(f, "  Seeds: {} ({} traced)", self.seeds, self.traced)?;
        writeln!(f, "  Open contours: {}", self.open_contours)?;
        writeln!(
            f,
            "  Closed contours: {} ({} inside one triangle)",
            self.closed_contours, self.interior_loops
        )?;
        if self.discarded_degenerate > 0 {
            writeln!(f, "  Discarded: {}", self.discarded_degenerate)?;
        }
        if !self.anomalies.is_empty() {
            writeln!(f, "  Anomalies:")?;
            for anomaly in &self.anomalies {
                writeln!(f, "    - {anomaly}")?;
            }
        }
        Ok(())
    }
}

/// A split the smoother wanted but could not place on the surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedSplit {
    /// Index of the contour within its level.
    pub contour: usize,
    pub elevation: f64,
    /// Proposed point on the segment chord.
    pub at: Point3,
    /// Transverse line searched for the contour, when one was clipped.
    pub transect: Option<(Point3, Point3)>,
}

/// Counters and anomalies from [`CurveSmoother::smooth`](super::CurveSmoother::smooth).
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct SmoothDiagnostics {
    pub contours: usize,
    pub inserted_points: usize,
    /// Deviation samples answered by the mesh-wide query.
    pub location_fallbacks: usize,
    /// Segments split at the default fraction because the surface was
    /// unavailable at both sample points.
    pub default_splits: usize,
    /// Kept only when the smoother is asked to record rejections.
    pub rejected: Vec<RejectedSplit>,
    pub rejected_count: usize,
    pub anomalies: Vec<Anomaly>,
}

impl SmoothDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, anomaly: Anomaly) {
        report(&mut self.anomalies, anomaly);
    }

    pub fn merge(&mut self, other: &SmoothDiagnostics) {
        self.contours += other.contours;
        self.inserted_points += other.inserted_points;
        self.location_fallbacks += other.location_fallbacks;
        self.default_splits += other.default_splits;
        self.rejected.extend(other.rejected.iter().cloned());
        self.rejected_count += other.rejected_count;
        self.anomalies.extend(other.anomalies.iter().cloned());
    }

    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "contours:{} inserted:{} rejected:{} fallbacks:{}",
            self.contours, self.inserted_points, self.rejected_count, self.location_fallbacks
        )
    }
}
