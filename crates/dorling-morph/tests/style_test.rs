use dorling_morph::{StyleDict, StyleInterpolator, StyleKeyKind, StyleMorph, StyleValue};

fn dict(v: serde_json::Value) -> StyleDict {
    serde_json::from_value(v).unwrap()
}

#[test]
fn endpoints_return_the_dictionary_values() {
    let from = dict(serde_json::json!({ "fill": "gold", "stroke": "black", "stroke-width": 1 }));
    let to = dict(serde_json::json!({ "fill": "steelblue", "opacity": 0.5 }));
    let m = StyleMorph::between(&from, &to);

    let start = m.at(0.0);
    let end = m.at(1.0);
    for (k, v) in &from {
        assert_eq!(&start[k], v, "{k} at 0");
    }
    for (k, v) in &to {
        assert_eq!(&end[k], v, "{k} at 1");
    }
    // Keys missing on one side fall back to white / 0.
    assert_eq!(end["stroke"], StyleValue::Text("white".into()));
    assert_eq!(end["stroke-width"], StyleValue::Number(0.0));
    assert_eq!(start["opacity"], StyleValue::Number(0.0));
}

#[test]
fn none_color_stays_none_throughout() {
    let from = dict(serde_json::json!({ "fill": "none", "stroke": "black" }));
    let to = dict(serde_json::json!({ "fill": "gold", "stroke": "none" }));
    let m = StyleMorph::between(&from, &to);
    for t in [0.0, 0.3, 0.5, 1.0] {
        let s = m.at(t);
        assert_eq!(s["fill"], StyleValue::Text("none".into()), "fill at {t}");
        assert_eq!(s["stroke"], StyleValue::Text("none".into()), "stroke at {t}");
    }
}

#[test]
fn colors_blend_in_hsl() {
    let m = StyleMorph::between(
        &dict(serde_json::json!({ "fill": "red" })),
        &dict(serde_json::json!({ "fill": "blue" })),
    );
    // Red (0°) to blue (240°) goes the short way, through magenta (300°).
    assert_eq!(m.at(0.5)["fill"], StyleValue::Text("rgb(255, 0, 255)".into()));
    match m.get("fill") {
        Some(StyleInterpolator::Color { .. }) => {}
        other => panic!("unexpected interpolator {other:?}"),
    }
}

#[test]
fn translucent_colors_render_rgba() {
    let i = StyleInterpolator::new(
        StyleKeyKind::Color,
        Some(&StyleValue::from("rgba(0, 0, 0, 0)")),
        Some(&StyleValue::from("black")),
    );
    assert_eq!(i.at(0.5), StyleValue::Text("rgba(0, 0, 0, 0.5)".into()));
}

#[test]
fn numbers_blend_linearly() {
    let m = StyleMorph::between(
        &dict(serde_json::json!({ "stroke-width": 1 })),
        &dict(serde_json::json!({ "stroke-width": 3 })),
    );
    assert_eq!(m.at(0.5)["stroke-width"], StyleValue::Number(2.0));
    assert_eq!(m.at(0.5)["stroke-width"].to_string(), "2");
}
