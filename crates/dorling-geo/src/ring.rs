use crate::geom::{Point, point};

/// An open ring: the closing vertex is implied, never stored.
pub type Ring = Vec<Point>;

/// One projected polygon part: an exterior ring and zero or more holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub exterior: Ring,
    pub holes: Vec<Ring>,
}

impl Polygon {
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        std::iter::once(&self.exterior).chain(self.holes.iter())
    }

    /// Unsigned area of the exterior minus the unsigned areas of the holes.
    pub fn area(&self) -> f64 {
        let holes: f64 = self.holes.iter().map(|h| signed_area(h).abs()).sum();
        signed_area(&self.exterior).abs() - holes
    }
}

/// Drops a trailing vertex equal to the first one, and consecutive duplicates.
pub fn open_ring(points: impl IntoIterator<Item = Point>) -> Ring {
    let mut out: Ring = Vec::new();
    for p in points {
        if out.last() != Some(&p) {
            out.push(p);
        }
    }
    while out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out
}

/// Shoelace area; positive for counter-clockwise rings in a y-up frame (clockwise on screen).
pub fn signed_area(ring: &[Point]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        sum += a.x * b.y - b.x * a.y;
    }
    sum / 2.0
}

/// Area-weighted centroid accumulator for a ring, returned as `(|area|, cx * |area|, cy * |area|)`.
pub(crate) fn centroid_moment(ring: &[Point]) -> (f64, f64, f64) {
    let n = ring.len();
    if n < 3 {
        return (0.0, 0.0, 0.0);
    }
    let mut a = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let p = ring[i];
        let q = ring[(i + 1) % n];
        let cross = p.x * q.y - q.x * p.y;
        a += cross;
        cx += (p.x + q.x) * cross;
        cy += (p.y + q.y) * cross;
    }
    if a == 0.0 {
        return (0.0, 0.0, 0.0);
    }
    // cx / (3a) is the centroid; scaled by |a|/2 it becomes the moment.
    let sign = a.signum();
    (a.abs() / 2.0, cx * sign / 6.0, cy * sign / 6.0)
}

pub fn perimeter(ring: &[Point]) -> f64 {
    let n = ring.len();
    if n < 2 {
        return 0.0;
    }
    (0..n).map(|i| (ring[(i + 1) % n] - ring[i]).length()).sum()
}

/// Arithmetic mean of the vertices, used when the area is zero.
pub fn vertex_mean<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Point> {
    let mut n = 0usize;
    let mut sx = 0.0;
    let mut sy = 0.0;
    for p in points {
        n += 1;
        sx += p.x;
        sy += p.y;
    }
    (n > 0).then(|| point(sx / n as f64, sy / n as f64))
}
