//! CSS colors and hue-saturation-lightness blending.
//!
//! Conventions follow d3-color / d3-interpolate: achromatic colors carry a `NaN` hue (and white
//! and black a `NaN` saturation), and a `NaN` channel takes the other endpoint's value for the
//! whole interpolation instead of blending toward zero.

use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    /// Channels in `0..=255`.
    pub r: f64,
    pub g: f64,
    pub b: f64,
    /// Opacity in `0..=1`.
    pub a: f64,
}

impl Rgba {
    /// Parses any CSS color `svgtypes` understands (named, `#rgb`, `#rrggbb`, `rgb()`, `hsl()` …).
    pub fn parse(s: &str) -> Option<Self> {
        let c = svgtypes::Color::from_str(s.trim()).ok()?;
        Some(Self {
            r: f64::from(c.red),
            g: f64::from(c.green),
            b: f64::from(c.blue),
            a: f64::from(c.alpha) / 255.0,
        })
    }

    /// `rgb(r, g, b)` when opaque, `rgba(r, g, b, a)` otherwise.
    pub fn to_css(self) -> String {
        let ch = |v: f64| {
            let v = (v + 0.5).floor();
            if v.is_nan() { 0.0 } else { v.clamp(0.0, 255.0) }
        };
        let a = if self.a.is_nan() {
            1.0
        } else {
            self.a.clamp(0.0, 1.0)
        };
        if a == 1.0 {
            format!("rgb({}, {}, {})", ch(self.r), ch(self.g), ch(self.b))
        } else {
            format!("rgba({}, {}, {}, {a})", ch(self.r), ch(self.g), ch(self.b))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsla {
    /// Degrees; `NaN` when achromatic.
    pub h: f64,
    pub s: f64,
    pub l: f64,
    pub a: f64,
}

impl From<Rgba> for Hsla {
    fn from(c: Rgba) -> Self {
        let r = c.r / 255.0;
        let g = c.g / 255.0;
        let b = c.b / 255.0;
        let min = r.min(g).min(b);
        let max = r.max(g).max(b);
        let mut h = f64::NAN;
        let mut s = max - min;
        let l = (max + min) / 2.0;
        if s != 0.0 {
            h = if r == max {
                (g - b) / s + if g < b { 6.0 } else { 0.0 }
            } else if g == max {
                (b - r) / s + 2.0
            } else {
                (r - g) / s + 4.0
            };
            s /= if l < 0.5 { max + min } else { 2.0 - max - min };
            h *= 60.0;
        } else {
            s = if l > 0.0 && l < 1.0 { 0.0 } else { f64::NAN };
        }
        Self { h, s, l, a: c.a }
    }
}

impl From<Hsla> for Rgba {
    fn from(c: Hsla) -> Self {
        let h = c.h % 360.0 + if c.h < 0.0 { 360.0 } else { 0.0 };
        let s = if h.is_nan() || c.s.is_nan() { 0.0 } else { c.s };
        let l = c.l;
        let m2 = l + if l < 0.5 { l } else { 1.0 - l } * s;
        let m1 = 2.0 * l - m2;
        Self {
            r: channel(if h >= 240.0 { h - 240.0 } else { h + 120.0 }, m1, m2),
            g: channel(h, m1, m2),
            b: channel(if h < 120.0 { h + 240.0 } else { h - 120.0 }, m1, m2),
            a: c.a,
        }
    }
}

fn channel(h: f64, m1: f64, m2: f64) -> f64 {
    let v = if h < 60.0 {
        m1 + (m2 - m1) * h / 60.0
    } else if h < 180.0 {
        m2
    } else if h < 240.0 {
        m1 + (m2 - m1) * (240.0 - h) / 60.0
    } else {
        m1
    };
    v * 255.0
}

/// One interpolated channel: constant when the endpoints agree or one of them is `NaN`.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Channel {
    Constant(f64),
    Linear { start: f64, delta: f64 },
}

impl Channel {
    fn linear(a: f64, b: f64) -> Self {
        let d = b - a;
        if d != 0.0 && !d.is_nan() {
            Self::Linear { start: a, delta: d }
        } else {
            Self::Constant(if a.is_nan() { b } else { a })
        }
    }

    /// Like [`Channel::linear`], but takes the shorter way around the color wheel.
    fn hue(a: f64, b: f64) -> Self {
        let d = b - a;
        if d != 0.0 && !d.is_nan() {
            let d = if !(-180.0..=180.0).contains(&d) {
                d - 360.0 * (d / 360.0).round()
            } else {
                d
            };
            Self::Linear { start: a, delta: d }
        } else {
            Self::Constant(if a.is_nan() { b } else { a })
        }
    }

    fn at(self, t: f64) -> f64 {
        match self {
            Self::Constant(v) => v,
            Self::Linear { start, delta } => start + delta * t,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HslInterpolator {
    h: Channel,
    s: Channel,
    l: Channel,
    a: Channel,
}

impl HslInterpolator {
    pub fn new(from: Rgba, to: Rgba) -> Self {
        let a = Hsla::from(from);
        let b = Hsla::from(to);
        Self {
            h: Channel::hue(a.h, b.h),
            s: Channel::linear(a.s, b.s),
            l: Channel::linear(a.l, b.l),
            a: Channel::linear(a.a, b.a),
        }
    }

    pub fn at(&self, t: f64) -> Rgba {
        Rgba::from(Hsla {
            h: self.h.at(t),
            s: self.s.at(t),
            l: self.l.at(t),
            a: self.a.at(t),
        })
    }
}
