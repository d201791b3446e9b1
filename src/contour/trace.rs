//! Walking a contour level across the mesh.

use super::crossing::{LevelView, Step};
use super::diagnostics::{Anomaly, TraceDiagnostics, TraceFault};
use super::handle::{OrientedEdgeHandle, VisitMarks};
use super::polyline::Polyline;
use crate::geom::Point3;
use crate::tin::TriIdx;

fn tracing_anomaly(
    view: &LevelView<'_>,
    fault: TraceFault,
    triangle: TriIdx,
    handle: Option<OrientedEdgeHandle>,
) -> Anomaly {
    Anomaly::TracingAnomaly {
        elevation: view.level(),
        fault,
        triangle,
        edge: handle.map(|h| h.edge),
    }
}

/// Trace the contour through `seed` from triangle to triangle.
///
/// The trace starts in the triangle the contour enters through the seed and
/// ends when it leaves the mesh (open) or comes back to the seed (closed).
/// Every edge crossing it passes is marked. A boundary crossing through which
/// the contour leaves the mesh starts nothing: the result is empty and the
/// crossing stays unmarked until the trace that ends there reaches it.
///
/// Traces cut short by inconsistent data are returned open, with the cause
/// recorded in `diagnostics`.
pub fn trace(
    view: &LevelView<'_>,
    marks: &mut VisitMarks,
    seed: OrientedEdgeHandle,
    diagnostics: &mut TraceDiagnostics,
) -> Polyline {
    let tin = view.tin();
    let level = view.level();
    let mut polyline = Polyline::new(level);

    let edge = tin.edge(seed.edge);
    let entry = [edge.tria, edge.trib].into_iter().flatten().find_map(|tri| {
        let locator = view.locator(tri);
        locator
            .subdir(seed)
            .filter(|&sub| locator.upleft(sub))
            .map(|sub| (tri, sub))
    });
    let Some((mut tri, mut sub)) = entry else {
        return polyline;
    };

    marks.mark(seed);
    let first = view.locator(tri).contourcept(sub);
    if !first.is_finite() {
        diagnostics.record(Anomaly::DegenerateCrossing {
            elevation: level,
            triangle: tri,
        });
        return polyline;
    }
    polyline.push(first);
    let mut last = first;
    let mut previous = seed;

    let closed = loop {
        let locator = view.locator(tri);

        let mut exit = sub;
        let mut walked_out = false;
        for step in locator.walk(sub) {
            match step {
                Step::Progressed(next) => {
                    exit = next;
                    let p = locator.contourcept(next);
                    if !p.is_finite() {
                        diagnostics.record(Anomaly::DegenerateCrossing {
                            elevation: level,
                            triangle: tri,
                        });
                        continue;
                    }
                    if p == last {
                        diagnostics.record(tracing_anomaly(
                            view,
                            TraceFault::RepeatedPoint,
                            tri,
                            None,
                        ));
                        continue;
                    }
                    polyline.push(p);
                    last = p;
                }
                Step::Exited => walked_out = true,
                Step::Closed | Step::Stalled => {}
            }
        }
        if !walked_out {
            diagnostics.record(tracing_anomaly(view, TraceFault::IterationCap, tri, None));
            break false;
        }

        // The exit lies on a side but past the third crossing there.
        let Some(handle) = locator.edgepart(exit) else {
            diagnostics.record(tracing_anomaly(
                view,
                TraceFault::MidTriangleStop,
                tri,
                None,
            ));
            break false;
        };

        if handle == previous {
            diagnostics.record(tracing_anomaly(
                view,
                TraceFault::StalledEdge,
                tri,
                Some(handle),
            ));
            break false;
        }

        if marks.is_marked(handle) {
            if handle != seed {
                diagnostics.record(tracing_anomaly(
                    view,
                    TraceFault::MergedTrace,
                    tri,
                    Some(handle),
                ));
            }
            break handle == seed;
        }

        let p = locator.contourcept(exit);
        if p.is_finite() {
            if p != last && p != first {
                polyline.push(p);
            }
            last = p;
        }
        marks.mark(handle);

        let Some(next) = tin.edge(handle.edge).other_triangle(tri) else {
            break false;
        };
        let Some(next_sub) = view.locator(next).subdir(handle) else {
            diagnostics.record(tracing_anomaly(
                view,
                TraceFault::MissingCrossing,
                next,
                Some(handle),
            ));
            break false;
        };
        tri = next;
        sub = next_sub;
        previous = handle;
    };

    polyline.set_closed(closed);
    polyline
}

/// A contour loop lying wholly inside `triangle`, if there is one.
///
/// Each crossed sub-segment is tried as a start. A walk that leaves the
/// triangle belongs to a boundary trace; one that reaches a sub-segment
/// numbered below its start retraces a loop already tried.
#[must_use]
pub fn trace_interior(
    view: &LevelView<'_>,
    triangle: TriIdx,
    diagnostics: &mut TraceDiagnostics,
) -> Option<Polyline> {
    let locator = view.locator(triangle);
    for start in 0..locator.segment_count() {
        if !locator.crosses(start) {
            continue;
        }
        let mut visited = vec![start];
        let mut closed = false;
        for step in locator.walk(start) {
            match step {
                Step::Progressed(next) if next < start => break,
                Step::Progressed(next) => visited.push(next),
                Step::Closed => closed = true,
                Step::Exited => {}
                Step::Stalled => diagnostics.record(tracing_anomaly(
                    view,
                    TraceFault::IterationCap,
                    triangle,
                    None,
                )),
            }
        }
        if !closed {
            continue;
        }

        let points: Vec<Point3> = visited
            .iter()
            .map(|&s| locator.contourcept(s))
            .filter(|p| p.is_finite())
            .collect();
        let mut polyline = Polyline::from_points(view.level(), points, true);
        polyline.dedup();
        return Some(polyline);
    }
    None
}
