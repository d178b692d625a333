//! Vertex-correspondence morph between two rings.
//!
//! Both rings are normalized (opened, padded to a triangle, oriented the same way, long edges
//! bisected), the shorter one receives extra vertices spread evenly along its perimeter, and the
//! target is rotated so vertex `i` of each ring are as close as possible. The morph itself is
//! then a per-vertex linear blend.

use dorling_geo::ring::{open_ring, perimeter, signed_area};
use dorling_geo::{Point, Ring, point};

#[derive(Debug, Clone, PartialEq)]
pub struct RingMorph {
    from: Ring,
    to: Ring,
}

impl RingMorph {
    /// `max_segment_length` of `None` (or a non-positive value) skips bisection.
    pub fn new(from: &[Point], to: &[Point], max_segment_length: Option<f64>) -> Self {
        let mut from = normalize(from, max_segment_length);
        let mut to = normalize(to, max_segment_length);
        let (n_from, n_to) = (from.len(), to.len());
        if n_from < n_to {
            add_points(&mut from, n_to - n_from);
        } else if n_to < n_from {
            add_points(&mut to, n_from - n_to);
        }
        rotate_to_match(&mut to, &from);
        Self { from, to }
    }

    /// Runs the same correspondence backwards; `reversed().points_at(1 - t) == points_at(t)`.
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.from.len()
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_empty()
    }

    pub fn from_ring(&self) -> &Ring {
        &self.from
    }

    pub fn to_ring(&self) -> &Ring {
        &self.to
    }

    pub fn points_at(&self, t: f64) -> Ring {
        let t = t.clamp(0.0, 1.0);
        self.from
            .iter()
            .zip(&self.to)
            .map(|(a, b)| a.lerp(*b, t))
            .collect()
    }
}

/// Opened, at least three vertices, clockwise on screen, no edge longer than `max_segment_length`.
pub(crate) fn normalize(ring: &[Point], max_segment_length: Option<f64>) -> Ring {
    let mut out = open_ring(ring.iter().copied());
    match out.last().copied() {
        None => out = vec![point(0.0, 0.0); 3],
        Some(last) => {
            while out.len() < 3 {
                out.push(last);
            }
        }
    }
    if signed_area(&out) > 0.0 {
        out.reverse();
    }
    if let Some(max) = max_segment_length.filter(|m| m.is_finite() && *m > 0.0) {
        bisect(&mut out, max);
    }
    out
}

fn bisect(ring: &mut Ring, max: f64) {
    let mut i = 0;
    while i < ring.len() {
        let a = ring[i];
        let mut b = ring[(i + 1) % ring.len()];
        while (b - a).length() > max {
            b = a.lerp(b, 0.5);
            ring.insert(i + 1, b);
        }
        i += 1;
    }
}

/// Inserts `count` vertices at even arc-length steps, the first half a step in.
pub(crate) fn add_points(ring: &mut Ring, count: usize) {
    if count == 0 || ring.is_empty() {
        return;
    }
    let desired = ring.len() + count;
    let step = perimeter(ring) / count as f64;
    let mut i = 0;
    let mut cursor = 0.0;
    let mut insert_at = step / 2.0;
    while ring.len() < desired {
        let a = ring[i];
        let b = ring[(i + 1) % ring.len()];
        let segment = (b - a).length();
        let last = i + 1 >= ring.len();
        if insert_at <= cursor + segment || last {
            let p = if segment > 0.0 {
                a.lerp(b, ((insert_at - cursor) / segment).clamp(0.0, 1.0))
            } else {
                a
            };
            ring.insert(i + 1, p);
            insert_at += step;
            continue;
        }
        cursor += segment;
        i += 1;
    }
}

/// Rotates `ring` so the sum of squared distances to `reference`, vertex by vertex, is minimal.
/// The lowest offset wins ties.
pub(crate) fn rotate_to_match(ring: &mut Ring, reference: &[Point]) {
    let n = ring.len();
    if n == 0 {
        return;
    }
    let mut best = 0;
    let mut min = f64::INFINITY;
    for offset in 0..n {
        let sum: f64 = reference
            .iter()
            .enumerate()
            .map(|(i, p)| (ring[(offset + i) % n] - *p).square_length())
            .sum();
        if sum < min {
            min = sum;
            best = offset;
        }
    }
    ring.rotate_left(best);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(s: f64) -> Ring {
        vec![point(0.0, 0.0), point(s, 0.0), point(s, s), point(0.0, s)]
    }

    #[test]
    fn normalize_bisects_long_edges() {
        let r = normalize(&square(10.0), Some(3.0));
        // Each 10-unit edge halves twice to 2.5.
        assert_eq!(r.len(), 16);
        let n = r.len();
        for i in 0..n {
            assert!((r[(i + 1) % n] - r[i]).length() <= 3.0);
        }
    }

    #[test]
    fn normalize_orients_consistently() {
        let mut ccw = square(4.0);
        ccw.reverse();
        assert!(signed_area(&normalize(&square(4.0), None)) <= 0.0);
        assert!(signed_area(&normalize(&ccw, None)) <= 0.0);
    }

    #[test]
    fn normalize_pads_degenerate_rings() {
        let r = normalize(&[point(1.0, 2.0)], None);
        assert_eq!(r, vec![point(1.0, 2.0); 3]);
    }

    #[test]
    fn add_points_spreads_along_perimeter() {
        let mut r = square(4.0);
        add_points(&mut r, 4);
        assert_eq!(r.len(), 8);
        assert!(r.contains(&point(2.0, 0.0)));
        assert!(r.contains(&point(4.0, 2.0)));
        assert!((perimeter(&r) - 16.0).abs() < 1e-9);
    }

    #[test]
    fn rotation_aligns_matching_vertices() {
        let reference = square(4.0);
        let mut rotated = square(4.0);
        rotated.rotate_left(2);
        rotate_to_match(&mut rotated, &reference);
        assert_eq!(rotated, reference);
    }

    #[test]
    fn morph_hits_both_rings_and_reverses() {
        let small = square(2.0);
        let big: Ring = square(8.0);
        let m = RingMorph::new(&small, &big, None);
        assert_eq!(m.points_at(0.0), *m.from_ring());
        assert_eq!(m.points_at(1.0), *m.to_ring());
        let back = m.reversed();
        assert_eq!(back.points_at(0.75), m.points_at(0.25));
    }

    #[test]
    fn shorter_ring_is_padded_on_either_side() {
        let triangle = vec![point(0.0, 0.0), point(6.0, 0.0), point(3.0, 5.0)];
        let dense = normalize(&square(8.0), Some(3.0));

        let grow = RingMorph::new(&triangle, &square(8.0), Some(3.0));
        assert_eq!(grow.len(), dense.len());
        assert_eq!(grow.from_ring().len(), grow.to_ring().len());

        let shrink = RingMorph::new(&square(8.0), &triangle, Some(3.0));
        assert_eq!(shrink.len(), dense.len());
        assert_eq!(shrink.to_ring().len(), dense.len());
    }
}
