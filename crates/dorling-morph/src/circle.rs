use dorling_geo::path::PathWriter;
use dorling_geo::{Point, Ring, point};
use std::f64::consts::TAU;

/// Radius floor for the polygonal approximation so tiny circles still have distinct vertices.
pub const MIN_APPROX_RADIUS: f64 = 0.5;
pub const DEFAULT_CIRCLE_POINTS: usize = 20;

/// Vertex count for a region's approximate circle: the configured value, or enough points to
/// give every outline part at least two.
pub fn circle_point_count(part_count: usize, configured: Option<usize>) -> usize {
    configured
        .unwrap_or_else(|| DEFAULT_CIRCLE_POINTS.max(part_count * 2))
        .max(3)
}

/// `points` vertices on the circle, starting at the top and advancing by `2π / points`.
pub fn approximate_circle(center: Point, radius: f64, points: usize) -> Ring {
    let r = radius.max(MIN_APPROX_RADIUS);
    let n = points.max(3);
    (0..n)
        .map(|i| {
            let angle = TAU * (i as f64 / n as f64 + 0.75);
            point(center.x + r * angle.cos(), center.y + r * angle.sin())
        })
        .collect()
}

/// Two half-circle arcs; renders as a true circle.
pub fn exact_circle_path(center: Point, radius: f64, precision: u8) -> String {
    let r = radius.max(0.0);
    let mut w = PathWriter::new(precision);
    w.move_to(point(center.x - r, center.y))
        .arc_by(r, r * 2.0, 0.0)
        .arc_by(r, -(r * 2.0), 0.0)
        .close();
    w.finish()
}
