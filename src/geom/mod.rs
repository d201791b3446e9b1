mod core;
mod roots;
mod spiral;

pub use core::{BBox, Point3, Tolerance, Vec3, area2, wrap_angle};
pub use roots::regula_falsi;
pub use spiral::{SpiralArc, vcurve};
