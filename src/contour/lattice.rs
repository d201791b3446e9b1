//! Sub-segment lattice shared by every triangle.
//!
//! A triangle is cut into `SUBDIVISIONS²` sub-triangles by a regular lattice
//! of points `(a, b)`, `a + b <= N`, at barycentric weights
//! `((N - a - b) / N, a / N, b / N)` of corners 0, 1, 2. Sub-segments are the
//! lattice edges. Three families, each indexed by the cell `(a, b)` with
//! `a + b <= N - 1`:
//!
//! - family 0: `(a, b) - (a + 1, b)`
//! - family 1: `(a, b) - (a, b + 1)`
//! - family 2: `(a + 1, b) - (a, b + 1)`
//!
//! Side 0 of the triangle (corner 0 to corner 1) is family 0 with `b = 0`,
//! side 1 (corner 1 to corner 2) is family 2 with `a + b = N - 1`, side 2
//! (corner 2 to corner 0) is family 1 with `a = 0`.

use std::sync::OnceLock;

/// Lattice divisions along each side of a triangle. A power of two keeps every
/// lattice fraction exact in binary, so both triangles on an edge compute
/// identical edge parameters.
pub const SUBDIVISIONS: usize = 8;

const N: usize = SUBDIVISIONS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatticeSegment {
    /// Lattice point indices.
    pub ends: [usize; 2],
    /// Sub-triangles to the left and right of `ends[0] -> ends[1]`.
    pub faces: [Option<usize>; 2],
    /// `(side, position)` when the segment lies on a side of the triangle;
    /// position counts from the side's starting corner.
    pub side: Option<(usize, usize)>,
}

#[derive(Debug)]
pub struct Lattice {
    /// `(a, b)` lattice coordinates.
    pub points: Vec<(usize, usize)>,
    pub segments: Vec<LatticeSegment>,
    /// Sub-triangles as three segment indices.
    pub faces: Vec<[usize; 3]>,
    /// `side_segments[side][position]`.
    pub side_segments: [[usize; N]; 3],
}

impl Lattice {
    fn build() -> Self {
        let mut point_index = [[usize::MAX; N + 1]; N + 1];
        let mut points = Vec::with_capacity((N + 1) * (N + 2) / 2);
        for b in 0..=N {
            for a in 0..=(N - b) {
                point_index[a][b] = points.len();
                points.push((a, b));
            }
        }

        let cells: Vec<(usize, usize)> = (0..N)
            .flat_map(|b| (0..(N - b)).map(move |a| (a, b)))
            .collect();
        let cell_count = cells.len();
        let mut cell_index = [[usize::MAX; N]; N];
        for (i, &(a, b)) in cells.iter().enumerate() {
            cell_index[a][b] = i;
        }
        let seg = |family: usize, a: usize, b: usize| family * cell_count + cell_index[a][b];

        let mut segments = Vec::with_capacity(3 * cell_count);
        for family in 0..3 {
            for &(a, b) in &cells {
                let ends = match family {
                    0 => [point_index[a][b], point_index[a + 1][b]],
                    1 => [point_index[a][b], point_index[a][b + 1]],
                    _ => [point_index[a + 1][b], point_index[a][b + 1]],
                };
                let side = match family {
                    0 if b == 0 => Some((0, a)),
                    2 if a + b == N - 1 => Some((1, b)),
                    1 if a == 0 => Some((2, N - 1 - b)),
                    _ => None,
                };
                segments.push(LatticeSegment {
                    ends,
                    faces: [None, None],
                    side,
                });
            }
        }

        let mut faces = Vec::with_capacity(N * N);
        for &(a, b) in &cells {
            // Upward sub-triangle (a,b), (a+1,b), (a,b+1).
            faces.push(([seg(0, a, b), seg(1, a, b), seg(2, a, b)], point_index[a][b]));
            if a + b + 2 <= N {
                // Downward sub-triangle (a+1,b), (a+1,b+1), (a,b+1).
                faces.push((
                    [seg(2, a, b), seg(1, a + 1, b), seg(0, a, b + 1)],
                    point_index[a + 1][b + 1],
                ));
            }
        }

        // A face is left of a segment when its remaining corner is.
        let mut face_segments = Vec::with_capacity(faces.len());
        for (f, (segs, _)) in faces.iter().enumerate() {
            let corner_set = face_corners(&segments, segs);
            for &s in segs {
                let [p, q] = segments[s].ends;
                let Some(&r) = corner_set.iter().find(|&&c| c != p && c != q) else {
                    continue;
                };
                let slot = if orient(points[p], points[q], points[r]) > 0 { 0 } else { 1 };
                segments[s].faces[slot] = Some(f);
            }
            face_segments.push(*segs);
        }

        let mut side_segments = [[0; N]; 3];
        for (i, s) in segments.iter().enumerate() {
            if let Some((side, pos)) = s.side {
                side_segments[side][pos] = i;
            }
        }

        Self {
            points,
            segments,
            faces: face_segments,
            side_segments,
        }
    }

    /// Barycentric weights of a lattice point.
    #[must_use]
    pub fn barycentric(&self, point: usize) -> [f64; 3] {
        let (a, b) = self.points[point];
        let n = N as f64;
        [(N - a - b) as f64 / n, a as f64 / n, b as f64 / n]
    }

    /// `(side, position)` of a lattice point on a triangle side, positions
    /// counting `0..=N` from the side's starting corner. Corners 0 and 1 report
    /// the side they start, corner 2 the end of side 1.
    #[must_use]
    pub fn point_side(&self, point: usize) -> Option<(usize, usize)> {
        let (a, b) = self.points[point];
        if b == 0 && a < N {
            Some((0, a))
        } else if a + b == N {
            Some((1, b))
        } else if a == 0 {
            Some((2, N - b))
        } else {
            None
        }
    }
}

fn face_corners(segments: &[LatticeSegment], segs: &[usize; 3]) -> Vec<usize> {
    let mut corners: Vec<usize> = segs.iter().flat_map(|&s| segments[s].ends).collect();
    corners.sort_unstable();
    corners.dedup();
    corners
}

fn orient(p: (usize, usize), q: (usize, usize), r: (usize, usize)) -> i64 {
    let (px, py) = (p.0 as i64, p.1 as i64);
    let (qx, qy) = (q.0 as i64, q.1 as i64);
    let (rx, ry) = (r.0 as i64, r.1 as i64);
    (qx - px) * (ry - py) - (qy - py) * (rx - px)
}

/// The process-wide lattice.
pub fn lattice() -> &'static Lattice {
    static LATTICE: OnceLock<Lattice> = OnceLock::new();
    LATTICE.get_or_init(Lattice::build)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_match_subdivision() {
        let l = lattice();
        assert_eq!(l.points.len(), (N + 1) * (N + 2) / 2);
        assert_eq!(l.segments.len(), 3 * N * (N + 1) / 2);
        assert_eq!(l.faces.len(), N * N);
    }

    #[test]
    fn side_segments_have_one_face_interior_segments_two() {
        let l = lattice();
        for s in &l.segments {
            let faces = s.faces.iter().flatten().count();
            if s.side.is_some() {
                assert_eq!(faces, 1);
            } else {
                assert_eq!(faces, 2);
            }
        }
    }

    #[test]
    fn side_segments_are_inside_on_the_left_of_the_side_direction() {
        let l = lattice();
        for side in 0..3 {
            for pos in 0..N {
                let s = l.segments[l.side_segments[side][pos]];
                let along = |point: usize| {
                    let (a, b) = l.points[point];
                    match side {
                        0 => a,
                        1 => b,
                        _ => N - b,
                    }
                };
                // Whichever way the segment is stored, the single face must lie on
                // the side running counter-clockwise around the triangle.
                let forward = along(s.ends[1]) > along(s.ends[0]);
                let inside_slot = if forward { 0 } else { 1 };
                assert!(s.faces[inside_slot].is_some(), "side {side} pos {pos}");
            }
        }
    }

    #[test]
    fn side_positions_walk_from_start_corner() {
        let l = lattice();
        let first = l.segments[l.side_segments[0][0]];
        assert!(first.ends.contains(&0));
        let last_side2 = l.segments[l.side_segments[2][N - 1]];
        assert!(last_side2.ends.contains(&0));
    }
}
