//! Quadtree point location over a [`Tin`].
//!
//! Each leaf remembers one triangle near its cell; a query descends to the
//! leaf and walks across triangle neighbours from that hint to the triangle
//! containing the point.

use super::{Tin, TriIdx};
use crate::geom::{BBox, Point3};

#[derive(Debug, Clone)]
enum Node {
    Interior { children: Box<[Node; 4]> },
    Leaf { triangle: TriIdx },
}

#[derive(Debug, Clone)]
pub struct QuadIndex<'a> {
    tin: &'a Tin,
    bounds: BBox,
    center: (f64, f64),
    half: f64,
    root: Node,
    depth: usize,
}

const MAX_DEPTH: usize = 16;
const LEAF_SIZE: usize = 1;

#[derive(Debug, Clone, Copy)]
struct Member {
    tri: TriIdx,
    centroid: (f64, f64),
}

impl<'a> QuadIndex<'a> {
    /// Index every triangle of `tin` by its centroid.
    #[must_use]
    pub fn build(tin: &'a Tin) -> Self {
        let bbox = tin.bbox();
        let center = (
            (bbox.min.x + bbox.max.x) / 2.0,
            (bbox.min.y + bbox.max.y) / 2.0,
        );
        let half = (bbox.plan_span() / 2.0).max(f64::MIN_POSITIVE);
        let members: Vec<Member> = (0..tin.triangles().len() as TriIdx)
            .map(|tri| {
                let [a, b, c] = tin.corner_positions(tri);
                Member {
                    tri,
                    centroid: ((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0),
                }
            })
            .collect();

        let mut depth = 0;
        let root = build_node(center, half, &members, 0, 0, &mut depth);
        log::debug!(
            "quad index over {} triangles, depth {depth}",
            tin.triangles().len()
        );
        Self {
            tin,
            bounds: bbox,
            center,
            half,
            root,
            depth,
        }
    }

    #[must_use]
    pub const fn tin(&self) -> &'a Tin {
        self.tin
    }

    /// Deepest level reached while building.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Triangle containing the plan position of `p`, or `None` off the mesh.
    #[must_use]
    pub fn locate(&self, p: Point3) -> Option<TriIdx> {
        if !p.x.is_finite() || !p.y.is_finite() {
            return None;
        }
        let hint = self.leaf_hint(p);
        match self.walk(hint, p) {
            Walk::Found(tri) => Some(tri),
            Walk::Outside => None,
            Walk::Lost => {
                // Concave outline or cycling walk: settle it exhaustively.
                if self.bounds.contains_plan(p) {
                    self.tin.find_triangle(p)
                } else {
                    None
                }
            }
        }
    }

    fn leaf_hint(&self, p: Point3) -> TriIdx {
        let mut node = &self.root;
        let (mut cx, mut cy) = self.center;
        let mut half = self.half;
        loop {
            match node {
                Node::Leaf { triangle } => return *triangle,
                Node::Interior { children } => {
                    half /= 2.0;
                    let quadrant = quadrant_of((cx, cy), (p.x, p.y));
                    let (ox, oy) = quadrant_offset(quadrant);
                    cx += ox * half;
                    cy += oy * half;
                    node = &children[quadrant];
                }
            }
        }
    }

    fn walk(&self, start: TriIdx, p: Point3) -> Walk {
        let tin = self.tin;
        let mut tri = start;
        for _ in 0..=tin.triangles().len() {
            let bary = tin.barycentric(tri, p);
            let (worst, &lowest) = bary
                .iter()
                .enumerate()
                .min_by(|a, b| a.1.total_cmp(b.1))
                .unwrap_or((0, &0.0));
            if lowest >= -super::INSIDE_EPS {
                return Walk::Found(tri);
            }
            // Cross the side opposite the most negative coordinate.
            let side = (worst + 1) % 3;
            let edge = tin.triangle(tri).edges[side];
            match tin.edge(edge).other_triangle(tri) {
                Some(next) => tri = next,
                None if self.bounds.contains_plan(p) => return Walk::Lost,
                None => return Walk::Outside,
            }
        }
        Walk::Lost
    }
}

enum Walk {
    Found(TriIdx),
    Outside,
    Lost,
}

fn quadrant_of(center: (f64, f64), p: (f64, f64)) -> usize {
    usize::from(p.0 >= center.0) | (usize::from(p.1 >= center.1) << 1)
}

fn quadrant_offset(quadrant: usize) -> (f64, f64) {
    let ox = if quadrant & 1 == 1 { 1.0 } else { -1.0 };
    let oy = if quadrant & 2 == 2 { 1.0 } else { -1.0 };
    (ox, oy)
}

fn build_node(
    center: (f64, f64),
    half: f64,
    members: &[Member],
    inherited: TriIdx,
    level: usize,
    depth: &mut usize,
) -> Node {
    *depth = (*depth).max(level);
    let nearest = members
        .iter()
        .min_by(|a, b| {
            let da = (a.centroid.0 - center.0).hypot(a.centroid.1 - center.1);
            let db = (b.centroid.0 - center.0).hypot(b.centroid.1 - center.1);
            da.total_cmp(&db)
        })
        .map_or(inherited, |m| m.tri);

    if members.len() <= LEAF_SIZE || level >= MAX_DEPTH {
        return Node::Leaf { triangle: nearest };
    }

    let mut buckets: [Vec<Member>; 4] = Default::default();
    for m in members {
        buckets[quadrant_of(center, m.centroid)].push(*m);
    }
    let quarter = half / 2.0;
    let children: [Node; 4] = std::array::from_fn(|q| {
        let (ox, oy) = quadrant_offset(q);
        build_node(
            (center.0 + ox * quarter, center.1 + oy * quarter),
            quarter,
            &buckets[q],
            nearest,
            level + 1,
            depth,
        )
    });
    Node::Interior {
        children: Box::new(children),
    }
}
