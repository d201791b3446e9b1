use super::crossing::LevelView;
use super::handle::{MAX_CROSSINGS_PER_EDGE, OrientedEdgeHandle};
use crate::tin::EdgeIdx;

/// Every edge crossing that can start a contour trace at the view's level.
///
/// Boundary edges come first and contribute all their crossings, since nothing
/// can walk onto them from outside. Interior edges follow and contribute only
/// the crossings through which the contour enters `tria`, so each undirected
/// crossing is seeded once. Within each pass edges are taken in storage order.
#[must_use]
pub fn find_seeds(view: &LevelView<'_>) -> Vec<OrientedEdgeHandle> {
    let tin = view.tin();
    let mut seeds = Vec::new();
    for interior_pass in [false, true] {
        for (idx, edge) in tin.edges().iter().enumerate() {
            if edge.is_interior() != interior_pass {
                continue;
            }
            let Some(tri) = edge.any_triangle() else {
                continue;
            };
            let locator = view.locator(tri);
            for side in 0..MAX_CROSSINGS_PER_EDGE {
                let handle = OrientedEdgeHandle::new(idx as EdgeIdx, side as u8);
                let Some(sub) = locator.subdir(handle) else {
                    break;
                };
                if !interior_pass || locator.upleft(sub) {
                    seeds.push(handle);
                }
            }
        }
    }
    log::trace!("level {}: {} seeds", view.level(), seeds.len());
    seeds
}
