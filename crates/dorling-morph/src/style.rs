//! Per-key interpolation between two style dictionaries.

use crate::color::{HslInterpolator, Rgba};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A rendered style value. Hosts usually hand these over as JSON, so both numbers and strings
/// deserialize directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Number(f64),
    Text(String),
}

impl StyleValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }

    /// The numeric value, accepting CSS lengths such as `"1.5px"`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(s) => svgtypes::Length::from_str(s.trim()).ok().map(|l| l.number),
        }
    }

    fn is_none_sentinel(&self) -> bool {
        self.as_str()
            .is_some_and(|s| s.trim().eq_ignore_ascii_case("none"))
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for StyleValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for StyleValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Insertion-ordered, so rendered attributes come out in the order the accessor wrote them.
pub type StyleDict = IndexMap<String, StyleValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleKeyKind {
    Color,
    Numeric,
}

impl StyleKeyKind {
    pub fn classify(key: &str) -> Self {
        match key {
            "fill" | "stroke" => Self::Color,
            _ => Self::Numeric,
        }
    }

    /// What an absent side of the transition starts from (or ends at).
    pub fn default_value(self) -> StyleValue {
        match self {
            Self::Color => StyleValue::Text("white".to_string()),
            Self::Numeric => StyleValue::Number(0.0),
        }
    }
}

/// Interpolator for one style key. `at(0)` and `at(1)` return the endpoint values verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleInterpolator {
    /// One side is the `none` color; the key stays `none` throughout.
    None,
    Color {
        from: StyleValue,
        to: StyleValue,
        hsl: HslInterpolator,
    },
    Number {
        from: StyleValue,
        to: StyleValue,
        a: f64,
        b: f64,
    },
    /// Values that cannot be blended switch halfway through.
    Discrete { from: StyleValue, to: StyleValue },
}

impl StyleInterpolator {
    pub fn new(kind: StyleKeyKind, from: Option<&StyleValue>, to: Option<&StyleValue>) -> Self {
        let from = from.cloned().unwrap_or_else(|| kind.default_value());
        let to = to.cloned().unwrap_or_else(|| kind.default_value());
        match kind {
            StyleKeyKind::Color => {
                if from.is_none_sentinel() || to.is_none_sentinel() {
                    return Self::None;
                }
                let parsed = from
                    .as_str()
                    .and_then(Rgba::parse)
                    .zip(to.as_str().and_then(Rgba::parse));
                match parsed {
                    Some((a, b)) => Self::Color {
                        hsl: HslInterpolator::new(a, b),
                        from,
                        to,
                    },
                    None => Self::Discrete { from, to },
                }
            }
            StyleKeyKind::Numeric => match (from.as_number(), to.as_number()) {
                (Some(a), Some(b)) => Self::Number { from, to, a, b },
                _ => Self::Discrete { from, to },
            },
        }
    }

    pub fn at(&self, t: f64) -> StyleValue {
        let (from, to) = match self {
            Self::None => return StyleValue::Text("none".to_string()),
            Self::Color { from, to, .. }
            | Self::Number { from, to, .. }
            | Self::Discrete { from, to } => (from, to),
        };
        if t <= 0.0 {
            return from.clone();
        }
        if t >= 1.0 {
            return to.clone();
        }
        match self {
            Self::Color { hsl, .. } => StyleValue::Text(hsl.at(t).to_css()),
            Self::Number { a, b, .. } => StyleValue::Number(a + (b - a) * t),
            _ if t < 0.5 => from.clone(),
            _ => to.clone(),
        }
    }
}

/// Interpolators for the union of two dictionaries' keys: `from`'s keys in order, then keys
/// only `to` has.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleMorph {
    keys: IndexMap<String, StyleInterpolator>,
}

impl StyleMorph {
    pub fn between(from: &StyleDict, to: &StyleDict) -> Self {
        let mut keys = IndexMap::with_capacity(from.len().max(to.len()));
        for key in from.keys().chain(to.keys()) {
            if keys.contains_key(key) {
                continue;
            }
            let kind = StyleKeyKind::classify(key);
            keys.insert(
                key.clone(),
                StyleInterpolator::new(kind, from.get(key), to.get(key)),
            );
        }
        Self { keys }
    }

    /// The same transition run backwards.
    pub fn reversed(&self) -> Self {
        let keys = self
            .keys
            .iter()
            .map(|(k, i)| {
                let r = match i {
                    StyleInterpolator::None => StyleInterpolator::None,
                    StyleInterpolator::Color { from, to, .. } => {
                        StyleInterpolator::new(StyleKeyKind::Color, Some(to), Some(from))
                    }
                    StyleInterpolator::Number { from, to, .. }
                    | StyleInterpolator::Discrete { from, to } => {
                        StyleInterpolator::new(StyleKeyKind::classify(k), Some(to), Some(from))
                    }
                };
                (k.clone(), r)
            })
            .collect();
        Self { keys }
    }

    pub fn get(&self, key: &str) -> Option<&StyleInterpolator> {
        self.keys.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn at(&self, t: f64) -> StyleDict {
        self.keys
            .iter()
            .map(|(k, i)| (k.clone(), i.at(t)))
            .collect()
    }
}
