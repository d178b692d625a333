use dorling::{
    Advance, Cartogram, CartogramOptions, DataRow, DriverState, Easing, Frame, Geometry,
    LayoutSnapshot, MapFeature, Mode, Projection, SettledLayout, SizeBy, SnapshotKey,
    StyleAccessors, StyleDict, StyleValue, TransitionDriver, TransitionOptions, TransitionStart,
};
use std::sync::Arc;

fn square(x: f64, y: f64, s: f64) -> Vec<[f64; 2]> {
    vec![[x, y], [x + s, y], [x + s, y + s], [x, y + s], [x, y]]
}

fn apart() -> Vec<MapFeature> {
    vec![
        MapFeature::new("a", Geometry::Polygon(vec![square(0.0, 0.0, 10.0)])),
        MapFeature::new("b", Geometry::Polygon(vec![square(20.0, 0.0, 10.0)])),
    ]
}

fn cartogram() -> Cartogram {
    let mut cart = Cartogram::new(
        apart(),
        CartogramOptions {
            size: [300.0, 100.0],
            projection: Projection::Identity,
            zoom_to_fit: false,
            ..CartogramOptions::default()
        },
    )
    .unwrap();
    cart.set_transition(TransitionOptions {
        duration: 1.0,
        easing: Easing::Linear,
    });
    cart
}

fn frame(advance: Advance) -> Frame {
    match advance {
        Advance::Frame(f) => f,
        other => panic!("expected a frame, got {other:?}"),
    }
}

fn paths(frame: &Frame) -> Vec<String> {
    frame.features.iter().map(|f| f.path.clone()).collect()
}

#[test]
fn first_display_is_immediate() {
    let mut cart = cartogram();
    let TransitionStart::Immediate(f) = cart.set_mode(Mode::Circles).unwrap() else {
        panic!("first display should not animate");
    };
    let snap = cart.snapshot().unwrap();
    assert!(f.terminal);
    assert_eq!(f.features[0].path, snap.regions()[0].circle_path_exact);
    assert_eq!(cart.driver().state(), DriverState::Settled);
    assert_eq!(cart.driver().frames_issued(), 0);
    assert!(matches!(cart.advance(0.1), Advance::Idle));
}

#[test]
fn zero_duration_settles_without_frames() {
    let mut cart = cartogram();
    cart.show().unwrap();
    cart.set_transition(TransitionOptions {
        duration: 0.0,
        ..TransitionOptions::default()
    });
    let start = cart.set_mode(Mode::Circles).unwrap();
    let TransitionStart::Immediate(f) = start else {
        panic!("zero duration should settle immediately");
    };
    assert!(f.terminal);
    assert_eq!(f.mode, Mode::Circles);
    assert_eq!(cart.driver().frames_issued(), 0);
    assert_eq!(cart.driver().state(), DriverState::Settled);
}

#[test]
fn map_to_circles_follows_the_region_morph_and_ends_exact() {
    let mut cart = cartogram();
    cart.show().unwrap();
    let TransitionStart::Started(token) = cart.set_mode(Mode::Circles).unwrap() else {
        panic!("expected an animated transition");
    };
    let snap = cart.snapshot().unwrap();
    let a = &snap.regions()[0];

    let mid = frame(cart.advance(0.5));
    assert!(!mid.terminal);
    assert_eq!(mid.progress, 0.5);
    assert_eq!(mid.features[0].path, a.morph_to_circle(0.5));
    assert_eq!(
        cart.driver().state(),
        DriverState::Transitioning { progress: 0.5 }
    );

    let end = frame(cart.advance(0.5));
    assert!(end.terminal);
    assert_eq!(end.features[0].path, a.circle_path_exact);
    assert_eq!(end.features[0].label_anchor, a.position);
    assert_eq!(cart.driver().state(), DriverState::Settled);
    assert_eq!(cart.driver().frames_issued(), 2);
    assert!(!token.is_cancelled());
    assert!(matches!(cart.advance(0.1), Advance::Idle));
}

#[test]
fn circles_to_map_ends_on_the_outline() {
    let mut cart = cartogram();
    cart.set_mode(Mode::Circles).unwrap();
    cart.set_mode(Mode::Map).unwrap();
    let snap = cart.snapshot().unwrap();
    let a = &snap.regions()[0];

    let mid = frame(cart.advance_to(0.25));
    assert_eq!(mid.features[0].path, a.morph_to_map(0.25));
    let end = frame(cart.advance_to(1.0));
    assert_eq!(end.features[0].path, a.outline_path);
    assert_eq!(end.features[0].label_anchor, a.centroid);
}

#[test]
fn easing_shapes_progress() {
    let mut cart = cartogram();
    cart.set_transition(TransitionOptions {
        duration: 2.0,
        easing: Easing::QuadOut,
    });
    cart.show().unwrap();
    cart.set_mode(Mode::Circles).unwrap();
    let f = frame(cart.advance(1.0));
    assert_eq!(f.progress, 0.75);
}

#[test]
fn cancelling_freezes_the_last_frame() {
    let mut cart = cartogram();
    cart.show().unwrap();
    let TransitionStart::Started(token) = cart.set_mode(Mode::Circles).unwrap() else {
        panic!("expected an animated transition");
    };
    let last = frame(cart.advance(0.25));

    token.cancel();
    assert!(matches!(cart.advance(0.25), Advance::Cancelled));
    assert_eq!(cart.driver().state(), DriverState::Idle);
    assert_eq!(paths(&cart.current()), paths(&last));
    assert!(matches!(cart.advance(0.25), Advance::Idle));
    assert!(!cart.cancel());
}

#[test]
fn new_request_restarts_from_the_drawn_state() {
    let mut cart = cartogram();
    cart.show().unwrap();
    let TransitionStart::Started(first) = cart.set_mode(Mode::Circles).unwrap() else {
        panic!("expected an animated transition");
    };
    let mid = frame(cart.advance(0.5));

    let TransitionStart::Started(second) = cart.set_mode(Mode::Map).unwrap() else {
        panic!("expected an animated transition");
    };
    assert!(first.is_cancelled());
    assert!(!second.is_cancelled());
    assert_eq!(cart.mode(), Mode::Map);

    let restart = frame(cart.advance_to(0.0));
    assert_eq!(paths(&restart), paths(&mid));
    assert_eq!(restart.features[0].label_anchor, mid.features[0].label_anchor);

    let end = frame(cart.advance(1.0));
    let snap = cart.snapshot().unwrap();
    assert_eq!(end.features[0].path, snap.regions()[0].outline_path);
}

#[test]
fn data_change_animates_in_the_current_mode() {
    let mut cart = cartogram();
    cart.set_mode(Mode::Circles).unwrap();
    cart.set_size_by(SizeBy::field("v")).unwrap();
    let start = cart
        .set_data(vec![DataRow::new("a").with("v", 20)])
        .unwrap();
    assert!(matches!(start, Some(TransitionStart::Started(_))));

    let end = frame(cart.advance(1.0));
    let snap = cart.snapshot().unwrap();
    assert_eq!(snap.regions()[0].radius, 20.0);
    assert_eq!(end.mode, Mode::Circles);
    assert_eq!(end.features[0].path, snap.regions()[0].circle_path_exact);
}

#[test]
fn failed_mode_change_keeps_the_current_mode() {
    let mut cart = cartogram();
    cart.show().unwrap();
    let mut impossible = cart.options().clone();
    impossible.simulation.overlap_slack = -1.0;
    assert!(cart.set_options(impossible).is_err());

    let err = cart.set_mode(Mode::Circles).unwrap_err();
    assert!(matches!(
        err,
        dorling::Error::Layout(dorling::layout::Error::ResidualOverlap { .. })
    ));
    assert_eq!(cart.mode(), Mode::Map);
    assert_eq!(cart.driver().mode(), Mode::Map);
    assert_eq!(cart.driver().state(), DriverState::Settled);
}

#[test]
fn restyling_in_place_animates_from_the_drawn_style() {
    let mut fill = StyleDict::new();
    fill.insert("fill".into(), StyleValue::from("red"));
    let mut cart = cartogram();
    cart.set_mode(Mode::Circles).unwrap();
    let start = cart
        .set_styles(StyleAccessors::fixed(StyleDict::new(), fill.clone()))
        .unwrap();
    assert!(matches!(start, Some(TransitionStart::Started(_))));
    let end = frame(cart.advance(1.0));
    assert_eq!(end.features[0].style, fill);
    assert_eq!(cart.cache().misses(), 1);
}

#[test]
fn input_changes_before_display_are_lazy() {
    let mut cart = cartogram();
    let start = cart.set_data(vec![DataRow::new("a").with("v", 3)]).unwrap();
    assert!(start.is_none());
    assert_eq!(cart.cache().misses(), 0);
}

#[test]
fn style_keys_interpolate_between_states() {
    let mut map_style = StyleDict::new();
    map_style.insert("fill".into(), StyleValue::from("red"));
    map_style.insert("stroke-width".into(), StyleValue::from(1.0));
    let mut circle_style = StyleDict::new();
    circle_style.insert("fill".into(), StyleValue::from("blue"));
    circle_style.insert("stroke-width".into(), StyleValue::from(3.0));

    let mut cart = cartogram();
    cart.set_styles(StyleAccessors::fixed(map_style.clone(), circle_style.clone()))
        .unwrap();
    cart.show().unwrap();
    cart.set_mode(Mode::Circles).unwrap();

    let mid = frame(cart.advance(0.5));
    let style = &mid.features[0].style;
    assert_eq!(style["fill"], StyleValue::from("rgb(255, 0, 255)"));
    assert_eq!(style["stroke-width"], StyleValue::from(2.0));

    let end = frame(cart.advance(0.5));
    assert_eq!(end.features[0].style, circle_style);
}

fn snapshot_of(features: &[MapFeature], serial: u64) -> LayoutSnapshot {
    let opts = CartogramOptions {
        size: [300.0, 100.0],
        projection: Projection::Identity,
        zoom_to_fit: false,
        ..CartogramOptions::default()
    };
    let map = dorling::geo::preprocess(features, opts.canvas(), opts.projection, 3).unwrap();
    let layout = SettledLayout::settle(serial, &map, &[], &SizeBy::default(), &opts).unwrap();
    let layout = Arc::new(layout);
    let key = SnapshotKey::new(&layout, 0, &opts);
    LayoutSnapshot::build(key, layout, &map, &[], &StyleAccessors::default(), &opts).unwrap()
}

fn islands(id: &str, count: usize) -> MapFeature {
    let parts = (0..count)
        .map(|i| vec![square(i as f64 * 4.0, 0.0, 2.0)])
        .collect();
    MapFeature::new(id, Geometry::MultiPolygon(parts))
}

#[test]
fn regions_without_a_counterpart_appear_at_once() {
    let before = snapshot_of(&apart()[..1], 1);
    let mut features = apart();
    features.push(MapFeature::new(
        "c",
        Geometry::Polygon(vec![square(10.0, 5.0, 5.0)]),
    ));
    let after = snapshot_of(&features, 2);

    let mut driver = TransitionDriver::default();
    driver.show(&before, Mode::Map);
    let start = driver
        .request(&after, Mode::Map, &TransitionOptions::default())
        .unwrap();
    assert!(matches!(start, TransitionStart::Started(_)));

    let Advance::Frame(f) = driver.advance(0.1) else {
        panic!("expected a frame");
    };
    assert_eq!(f.features.len(), 3);
    assert_eq!(f.features[2].id, "c");
    assert_eq!(f.features[2].path, after.regions()[2].outline_path);
    assert_eq!(f.features[1].path, after.regions()[1].outline_path);
    assert_ne!(f.features[0].path, after.regions()[0].outline_path);
}

#[test]
fn mismatched_part_counts_cannot_morph_between_maps() {
    let before = snapshot_of(&[islands("a", 2)], 1);
    let after = snapshot_of(&[islands("a", 3)], 2);

    let mut driver = TransitionDriver::default();
    driver.show(&before, Mode::Map);
    let err = driver
        .request(&after, Mode::Map, &TransitionOptions::default())
        .unwrap_err();
    assert!(matches!(
        err,
        dorling::Error::Morph(dorling::morph::Error::MorphTopologyMismatch {
            from_parts: 2,
            to_parts: 3
        })
    ));

    let to_one = snapshot_of(&[islands("a", 1)], 3);
    assert!(
        driver
            .request(&to_one, Mode::Map, &TransitionOptions::default())
            .is_ok()
    );
}

#[test]
fn multi_part_regions_combine_into_one_circle() {
    let snap = snapshot_of(&[islands("a", 3)], 1);
    let mut driver = TransitionDriver::default();
    driver.show(&snap, Mode::Map);
    driver
        .request(&snap, Mode::Circles, &TransitionOptions::default())
        .unwrap();
    let Advance::Frame(mid) = driver.advance(0.5) else {
        panic!("expected a frame");
    };
    assert_eq!(mid.features[0].path.matches('M').count(), 3);
    let Advance::Frame(end) = driver.advance(1.0) else {
        panic!("expected a frame");
    };
    assert_eq!(end.features[0].path, snap.regions()[0].circle_path_exact);
}
