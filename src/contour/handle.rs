//! Directed references to contour crossings on mesh edges, and the per-level
//! set of crossings already traced.

use serde::Serialize;

use crate::tin::EdgeIdx;

/// A cubic edge crosses a level at most three times.
pub const MAX_CROSSINGS_PER_EDGE: usize = 3;

/// One crossing of a contour level over a mesh edge.
///
/// `side` is the ordinal of the crossing along the edge, counted from the
/// edge's `a` end. The direction of travel through the crossing follows from
/// the surface (higher ground on the left), so it is not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OrientedEdgeHandle {
    pub edge: EdgeIdx,
    pub side: u8,
}

impl OrientedEdgeHandle {
    #[must_use]
    pub const fn new(edge: EdgeIdx, side: u8) -> Self {
        Self { edge, side }
    }

    fn bit(self) -> usize {
        self.edge as usize * MAX_CROSSINGS_PER_EDGE + self.side as usize
    }
}

/// Crossings traced during the current level's sweep, three bits per edge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitMarks {
    bits: Vec<u8>,
    edge_count: usize,
    set: usize,
}

impl VisitMarks {
    #[must_use]
    pub fn new(edge_count: usize) -> Self {
        Self {
            bits: vec![0; (edge_count * MAX_CROSSINGS_PER_EDGE).div_ceil(8)],
            edge_count,
            set: 0,
        }
    }

    /// Bit of `handle`, if it names a crossing on one of the marked edges.
    fn slot(&self, handle: OrientedEdgeHandle) -> Option<usize> {
        let in_range = (handle.edge as usize) < self.edge_count
            && usize::from(handle.side) < MAX_CROSSINGS_PER_EDGE;
        in_range.then(|| handle.bit())
    }

    /// Mark a crossing; returns `false` when it was already marked.
    pub fn mark(&mut self, handle: OrientedEdgeHandle) -> bool {
        let Some(bit) = self.slot(handle) else {
            return false;
        };
        let Some(byte) = self.bits.get_mut(bit / 8) else {
            return false;
        };
        let mask = 1 << (bit % 8);
        if *byte & mask != 0 {
            return false;
        }
        *byte |= mask;
        self.set += 1;
        true
    }

    #[must_use]
    pub fn is_marked(&self, handle: OrientedEdgeHandle) -> bool {
        let Some(bit) = self.slot(handle) else {
            return false;
        };
        self.bits
            .get(bit / 8)
            .is_some_and(|byte| byte & (1 << (bit % 8)) != 0)
    }

    /// Forget every mark; called before each level.
    pub fn clear(&mut self) {
        self.bits.fill(0);
        self.set = 0;
    }

    /// Number of crossings marked since the last clear.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_are_set_once_and_cleared() {
        let mut marks = VisitMarks::new(5);
        let h = OrientedEdgeHandle::new(4, 2);
        assert!(!marks.is_marked(h));
        assert!(marks.mark(h));
        assert!(!marks.mark(h));
        assert!(marks.is_marked(h));
        assert!(!marks.is_marked(OrientedEdgeHandle::new(4, 1)));
        assert_eq!(marks.count(), 1);

        marks.clear();
        assert!(!marks.is_marked(h));
        assert_eq!(marks.count(), 0);
    }

    #[test]
    fn out_of_range_handles_are_never_marked() {
        let mut marks = VisitMarks::new(1);
        let h = OrientedEdgeHandle::new(10, 0);
        assert!(!marks.mark(h));
        assert!(!marks.is_marked(h));
    }

    #[test]
    fn padding_bits_past_the_last_edge_are_not_marks() {
        // One edge uses three bits of a whole byte.
        let mut marks = VisitMarks::new(1);
        for h in [OrientedEdgeHandle::new(1, 0), OrientedEdgeHandle::new(2, 0)] {
            assert!(!marks.mark(h));
            assert!(!marks.is_marked(h));
        }
        assert!(!marks.mark(OrientedEdgeHandle::new(0, 3)));
        assert_eq!(marks.count(), 0);

        assert!(marks.mark(OrientedEdgeHandle::new(0, 2)));
        assert!(!marks.is_marked(OrientedEdgeHandle::new(1, 0)));
        assert_eq!(marks.count(), 1);
    }
}
