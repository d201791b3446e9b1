//! Full contour extraction: every level over the surface's elevation range.

use std::ops::RangeInclusive;

use super::crossing::LevelView;
use super::diagnostics::TraceDiagnostics;
use super::handle::VisitMarks;
use super::polyline::Polyline;
use super::seed::find_seeds;
use super::set::ContourSet;
use super::trace::{trace, trace_interior};
use crate::tin::{Tin, TriIdx};

/// Refuse intervals that would sweep more levels than this.
pub const MAX_LEVELS: u64 = 1 << 20;

/// Errors raised before contouring starts.
#[derive(Debug, thiserror::Error)]
pub enum ContourError {
    #[error("contour interval must be finite and positive, got {interval}")]
    InvalidInterval { interval: f64 },

    #[error("surface has no finite elevation range")]
    EmptyMesh,

    #[error("interval {interval} over elevations {low}..{high} gives {count} levels")]
    TooManyLevels {
        interval: f64,
        low: f64,
        high: f64,
        count: u64,
    },

    #[error("invalid smoothing tolerance: {reason}")]
    InvalidTolerance { reason: String },
}

/// Options for contour extraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourOptions {
    /// Elevation difference between successive contour levels.
    pub interval: f64,
    /// Closed contours with fewer points are dropped.
    pub min_closed_points: usize,
    /// Open contours with fewer points are dropped.
    pub min_open_points: usize,
}

impl ContourOptions {
    #[must_use]
    pub const fn new(interval: f64) -> Self {
        Self {
            interval,
            min_closed_points: 3,
            min_open_points: 2,
        }
    }

    #[must_use]
    pub const fn min_closed_points(mut self, count: usize) -> Self {
        self.min_closed_points = count;
        self
    }

    #[must_use]
    pub const fn min_open_points(mut self, count: usize) -> Self {
        self.min_open_points = count;
        self
    }

    /// # Errors
    /// Returns [`ContourError::InvalidInterval`] unless the interval is finite
    /// and positive.
    pub fn validate(&self) -> Result<(), ContourError> {
        if self.interval.is_finite() && self.interval > 0.0 {
            Ok(())
        } else {
            Err(ContourError::InvalidInterval {
                interval: self.interval,
            })
        }
    }
}

impl Default for ContourOptions {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Result of [`extract_contours`].
#[derive(Debug, Clone)]
pub struct ContourExtraction {
    pub contours: ContourSet<Polyline>,
    pub diagnostics: TraceDiagnostics,
}

/// Drives the seed finder and tracers level by level, owning the visit marks
/// of the level being swept.
#[derive(Debug)]
pub struct ContourRegistry<'a> {
    tin: &'a Tin,
    options: ContourOptions,
    levels: RangeInclusive<i64>,
    marks: VisitMarks,
}

impl<'a> ContourRegistry<'a> {
    /// # Errors
    /// Returns an error for an invalid interval, a surface without a finite
    /// elevation range, or a range that needs more than [`MAX_LEVELS`] levels.
    pub fn new(tin: &'a Tin, options: ContourOptions) -> Result<Self, ContourError> {
        options.validate()?;
        let (low, high) = tin.elevation_range();
        if !low.is_finite() || !high.is_finite() {
            return Err(ContourError::EmptyMesh);
        }
        let first = (low / options.interval).floor();
        let last = (high / options.interval).ceil();
        let span = last - first + 1.0;
        if span.is_nan() || span > MAX_LEVELS as f64 {
            return Err(ContourError::TooManyLevels {
                interval: options.interval,
                low,
                high,
                count: span as u64,
            });
        }
        Ok(Self {
            tin,
            options,
            levels: (first as i64)..=(last as i64),
            marks: VisitMarks::new(tin.edges().len()),
        })
    }

    #[must_use]
    pub const fn options(&self) -> &ContourOptions {
        &self.options
    }

    /// Level indices swept by [`extract`](Self::extract).
    #[must_use]
    pub fn level_range(&self) -> RangeInclusive<i64> {
        self.levels.clone()
    }

    /// Marks left by the most recent level sweep.
    #[must_use]
    pub const fn marks(&self) -> &VisitMarks {
        &self.marks
    }

    /// Contours at level `index` (elevation `index * interval`).
    pub fn sweep_level(&mut self, index: i64, diagnostics: &mut TraceDiagnostics) -> Vec<Polyline> {
        let level = index as f64 * self.options.interval;
        let view = LevelView::new(self.tin, level);
        let seeds = find_seeds(&view);
        self.marks.clear();
        diagnostics.levels += 1;
        diagnostics.seeds += seeds.len();

        let mut contours = Vec::new();
        for seed in seeds {
            if self.marks.is_marked(seed) {
                continue;
            }
            let mut polyline = trace(&view, &mut self.marks, seed, diagnostics);
            if polyline.is_empty() {
                continue;
            }
            diagnostics.traced += 1;
            polyline.dedup();
            self.keep(polyline, &mut contours, diagnostics);
        }

        for tri in 0..self.tin.triangles().len() as TriIdx {
            if let Some(polyline) = trace_interior(&view, tri, diagnostics) {
                if self.keep(polyline, &mut contours, diagnostics) {
                    diagnostics.interior_loops += 1;
                }
            }
        }

        log::debug!("level {level}: {} contours", contours.len());
        contours
    }

    fn keep(
        &self,
        polyline: Polyline,
        contours: &mut Vec<Polyline>,
        diagnostics: &mut TraceDiagnostics,
    ) -> bool {
        let minimum = if polyline.is_closed() {
            self.options.min_closed_points
        } else {
            self.options.min_open_points
        };
        if polyline.len() < minimum.max(1) {
            diagnostics.discarded_degenerate += 1;
            return false;
        }
        if polyline.is_closed() {
            diagnostics.closed_contours += 1;
        } else {
            diagnostics.open_contours += 1;
        }
        contours.push(polyline);
        true
    }

    /// Sweep every level in the surface's elevation range.
    pub fn extract(&mut self) -> ContourExtraction {
        let mut contours = ContourSet::new(self.options.interval);
        let mut diagnostics = TraceDiagnostics::new();
        for index in self.level_range() {
            for polyline in self.sweep_level(index, &mut diagnostics) {
                contours.insert(index, polyline);
            }
        }
        log::debug!("contours: {}", diagnostics.summary());
        ContourExtraction {
            contours,
            diagnostics,
        }
    }
}

/// Extract contours of `tin` at every multiple of `options.interval` within
/// its elevation range.
///
/// # Errors
/// See [`ContourRegistry::new`].
pub fn extract_contours(
    tin: &Tin,
    options: ContourOptions,
) -> Result<ContourExtraction, ContourError> {
    Ok(ContourRegistry::new(tin, options)?.extract())
}

/// [`extract_contours`] with default options at `interval`.
///
/// # Errors
/// See [`ContourRegistry::new`].
pub fn extract(tin: &Tin, interval: f64) -> Result<ContourSet<Polyline>, ContourError> {
    Ok(extract_contours(tin, ContourOptions::new(interval))?.contours)
}
