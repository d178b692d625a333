//! SVG path-data serialization.

use crate::geom::Point;
use crate::ring::{Polygon, Ring};
use std::fmt::Write as _;

pub const DEFAULT_PRECISION: u8 = 3;

/// Formats a path coordinate with at most `precision` fractional digits.
///
/// Rounds half-up (`floor(v * 10^p + 0.5)`), trims trailing zeros and never prints `-0`.
pub fn fmt_path(v: f64, precision: u8) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let factor = 10f64.powi(i32::from(precision));
    let half_ulp = 0.5 / factor;
    if v.abs() < half_ulp {
        return "0".to_string();
    }

    let r = (v * factor + 0.5).floor() / factor;
    let mut s = format!("{r:.prec$}", prec = usize::from(precision));
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" { "0".to_string() } else { s }
}

/// Incremental path builder (`M`/`L`/`Z` plus relative arcs).
#[derive(Debug, Clone)]
pub struct PathWriter {
    out: String,
    precision: u8,
}

impl Default for PathWriter {
    fn default() -> Self {
        Self::new(DEFAULT_PRECISION)
    }
}

impl PathWriter {
    pub fn new(precision: u8) -> Self {
        Self {
            out: String::new(),
            precision,
        }
    }

    fn xy(&mut self, p: Point) {
        let x = fmt_path(p.x, self.precision);
        let y = fmt_path(p.y, self.precision);
        let _ = write!(self.out, "{x},{y}");
    }

    pub fn move_to(&mut self, p: Point) -> &mut Self {
        self.out.push('M');
        self.xy(p);
        self
    }

    pub fn line_to(&mut self, p: Point) -> &mut Self {
        self.out.push('L');
        self.xy(p);
        self
    }

    /// Relative elliptical arc with equal radii, `large-arc=1`, `sweep=0`.
    pub fn arc_by(&mut self, r: f64, dx: f64, dy: f64) -> &mut Self {
        let p = self.precision;
        let r = fmt_path(r, p);
        let _ = write!(
            self.out,
            "a{r},{r} 0 1,0 {},{}",
            fmt_path(dx, p),
            fmt_path(dy, p)
        );
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.out.push('Z');
        self
    }

    /// Appends one closed sub-path. Rings with no vertices are skipped.
    pub fn ring(&mut self, ring: &[Point]) -> &mut Self {
        let Some((first, rest)) = ring.split_first() else {
            return self;
        };
        self.move_to(*first);
        for p in rest {
            self.line_to(*p);
        }
        self.close()
    }

    pub fn polygon(&mut self, polygon: &Polygon) -> &mut Self {
        for r in polygon.rings() {
            self.ring(r);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    pub fn finish(self) -> String {
        self.out
    }
}

pub fn ring_path(ring: &Ring, precision: u8) -> String {
    let mut w = PathWriter::new(precision);
    w.ring(ring);
    w.finish()
}

pub fn polygons_path(polygons: &[Polygon], precision: u8) -> String {
    let mut w = PathWriter::new(precision);
    for p in polygons {
        w.polygon(p);
    }
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::point;

    #[test]
    fn fmt_path_rounds_and_trims() {
        assert_eq!(fmt_path(1.0, 3), "1");
        assert_eq!(fmt_path(1.23456, 3), "1.235");
        assert_eq!(fmt_path(-0.0001, 3), "0");
        assert_eq!(fmt_path(2.5, 0), "3");
        assert_eq!(fmt_path(f64::NAN, 3), "0");
    }

    #[test]
    fn ring_path_is_closed_move_line_sequence() {
        let r = vec![point(0.0, 0.0), point(10.0, 0.0), point(10.0, 5.5)];
        assert_eq!(ring_path(&r, 3), "M0,0L10,0L10,5.5Z");
        assert_eq!(ring_path(&Vec::new(), 3), "");
    }
}
