#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::many_single_char_names
)]

//! Contour lines for triangulated terrain.
//!
//! [`tin`] holds the surface: a triangulated irregular network whose triangles
//! are cubic patches, with a quadtree for point location. [`contour`] traces
//! the contour lines of that surface level by level and smooths them into
//! chains of spiral arcs. [`geom`] has the small geometry kernel both share.

pub mod contour;
pub mod geom;
pub mod tin;

pub use contour::{
    Anomaly, ContourError, ContourExtraction, ContourOptions, ContourSet, CurveSmoother,
    PolySpiral, Polyline, SmoothDiagnostics, SmoothOptions, SmoothResult, TraceDiagnostics,
    extract, extract_contours, smooth_contours,
};
pub use geom::{Point3, SpiralArc};
pub use tin::{QuadIndex, Tin, TinError};

/// Route `log` output to stderr, honouring `RUST_LOG`. Safe to call more than
/// once.
#[cfg(feature = "debug_logs")]
pub fn init_logger() {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("tin_contour=debug"),
    )
    .try_init();
}

#[cfg(not(feature = "debug_logs"))]
pub fn init_logger() {
    // no-op fallback when debug logs are disabled
}
