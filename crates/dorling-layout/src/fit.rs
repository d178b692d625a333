use crate::error::Result;
use dorling_geo::geom::validate_size;
use dorling_geo::{Point, Size, Vector, point, vector};

/// Extents at or below this are treated as empty on that axis.
const MIN_EXTENT: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

/// A uniform scale followed by a translation: `p' = p * scale + translate`, `r' = r * scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitTransform {
    pub scale: f64,
    pub translate: Vector,
}

impl Default for FitTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl FitTransform {
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            translate: vector(0.0, 0.0),
        }
    }

    pub fn apply_point(&self, p: Point) -> Point {
        point(
            p.x * self.scale + self.translate.x,
            p.y * self.scale + self.translate.y,
        )
    }

    pub fn apply_radius(&self, r: f64) -> f64 {
        r * self.scale
    }

    pub fn apply(&self, circles: &mut [Circle]) {
        for c in circles {
            c.center = self.apply_point(c.center);
            c.radius = self.apply_radius(c.radius);
        }
    }
}

/// Computes the transform that fits all circle extents (`center ± radius`) into the canvas.
///
/// If the circles' bounding box is wider than the canvas aspect, the width is filled and the
/// layout is centered vertically; otherwise the height is filled and it is centered
/// horizontally. When the extent is empty on both axes (no circles, or a single zero-radius
/// circle), the identity transform is returned.
pub fn fit_to_viewport(circles: &[Circle], size: Size) -> Result<FitTransform> {
    validate_size(size)?;

    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for c in circles {
        min_x = min_x.min(c.center.x - c.radius);
        min_y = min_y.min(c.center.y - c.radius);
        max_x = max_x.max(c.center.x + c.radius);
        max_y = max_y.max(c.center.y + c.radius);
    }
    if circles.is_empty() {
        return Ok(FitTransform::identity());
    }

    let bw = max_x - min_x;
    let bh = max_y - min_y;
    let has_w = bw > MIN_EXTENT;
    let has_h = bh > MIN_EXTENT;
    if !has_w && !has_h {
        return Ok(FitTransform::identity());
    }

    let fill_width = !has_h || (has_w && bw / bh > size.width / size.height);
    let t = if fill_width {
        let scale = size.width / bw;
        let cy = (min_y + max_y) / 2.0;
        FitTransform {
            scale,
            translate: vector(-min_x * scale, size.height / 2.0 - cy * scale),
        }
    } else {
        let scale = size.height / bh;
        let cx = (min_x + max_x) / 2.0;
        FitTransform {
            scale,
            translate: vector(size.width / 2.0 - cx * scale, -min_y * scale),
        }
    };
    Ok(t)
}
