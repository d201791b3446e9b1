use std::collections::BTreeMap;

use serde::Serialize;

/// Contours grouped by level. Level `i` lies at elevation `i * interval`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContourSet<C> {
    interval: f64,
    levels: BTreeMap<i64, Vec<C>>,
}

impl<C> ContourSet<C> {
    #[must_use]
    pub const fn new(interval: f64) -> Self {
        Self {
            interval,
            levels: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn interval(&self) -> f64 {
        self.interval
    }

    #[must_use]
    pub fn elevation_of(&self, level: i64) -> f64 {
        level as f64 * self.interval
    }

    pub fn insert(&mut self, level: i64, contour: C) {
        self.levels.entry(level).or_default().push(contour);
    }

    /// Contours at one level, empty when there are none.
    #[must_use]
    pub fn level(&self, level: i64) -> &[C] {
        self.levels.get(&level).map(Vec::as_slice).unwrap_or_default()
    }

    /// Non-empty levels in ascending order, as `(level, contours)`.
    pub fn levels(&self) -> impl Iterator<Item = (i64, &[C])> + '_ {
        self.levels.iter().map(|(&level, c)| (level, c.as_slice()))
    }

    /// Every contour, lowest level first.
    pub fn iter(&self) -> impl Iterator<Item = &C> + '_ {
        self.levels.values().flatten()
    }

    /// Total number of contours.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.values().all(Vec::is_empty)
    }
}
