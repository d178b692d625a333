use dorling_geo::geom::bounds;
use dorling_geo::{
    Edge, Error, Geometry, MapFeature, NeighborRef, Projection, point, preprocess, size,
};

fn square(x: f64, y: f64, s: f64) -> Vec<[f64; 2]> {
    vec![[x, y], [x + s, y], [x + s, y + s], [x, y + s], [x, y]]
}

fn two_squares() -> Vec<MapFeature> {
    vec![
        MapFeature::new("a", Geometry::Polygon(vec![square(0.0, 0.0, 10.0)]))
            .with_neighbors([NeighborRef::Id("b".into())]),
        MapFeature::new("b", Geometry::Polygon(vec![square(10.0, 0.0, 10.0)]))
            .with_neighbors([NeighborRef::Index(0)]),
    ]
}

#[test]
fn preprocess_projects_outlines_and_centroids() {
    let map = preprocess(&two_squares(), size(100.0, 50.0), Projection::Identity, 3).unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map.projection.scale, 5.0);
    assert_eq!(map.regions[0].outline_path, "M0,0L50,0L50,50L0,50Z");
    assert_eq!(map.regions[0].centroid, point(25.0, 25.0));
    assert_eq!(map.regions[1].centroid, point(75.0, 25.0));
    assert_eq!(map.index_of("b"), Some(1));
}

#[test]
fn preprocess_dedups_symmetric_neighbor_hints() {
    let map = preprocess(&two_squares(), size(100.0, 50.0), Projection::Identity, 3).unwrap();
    assert_eq!(map.edges, vec![Edge { source: 0, target: 1 }]);
    assert_eq!(map.regions[0].neighbors, vec![1]);
    assert_eq!(map.regions[1].neighbors, vec![0]);
}

#[test]
fn preprocess_drops_self_loops_and_unknown_neighbors() {
    let features = vec![
        MapFeature::new("a", Geometry::Polygon(vec![square(0.0, 0.0, 1.0)])).with_neighbors([
            NeighborRef::Index(0),
            NeighborRef::Index(7),
            NeighborRef::Id("nowhere".into()),
        ]),
        MapFeature::new("b", Geometry::Polygon(vec![square(2.0, 0.0, 1.0)])),
    ];
    let map = preprocess(&features, size(30.0, 10.0), Projection::Identity, 3).unwrap();
    assert!(map.edges.is_empty());
}

#[test]
fn fit_fills_the_constraining_axis_without_overflow() {
    let features = vec![MapFeature::new(
        "wide",
        Geometry::Polygon(vec![vec![[-20.0, 10.0], [40.0, 10.0], [40.0, 30.0], [-20.0, 30.0]]]),
    )];
    for projection in [Projection::Mercator, Projection::Equirectangular, Projection::Identity] {
        let map = preprocess(&features, size(200.0, 200.0), projection, 3).unwrap();
        let pts: Vec<_> = map.regions[0].polygons[0].exterior.clone();
        let b = bounds(&pts).unwrap();
        assert!(b.min.x >= -1e-9 && b.min.y >= -1e-9, "{projection:?} {b:?}");
        assert!(b.max.x <= 200.0 + 1e-9 && b.max.y <= 200.0 + 1e-9, "{projection:?} {b:?}");
        let fills_x = b.min.x.abs() < 1e-9 && (b.max.x - 200.0).abs() < 1e-9;
        let fills_y = b.min.y.abs() < 1e-9 && (b.max.y - 200.0).abs() < 1e-9;
        assert!(fills_x || fills_y, "{projection:?} {b:?}");
    }
}

#[test]
fn multipolygon_parts_are_ordered_largest_ring_first() {
    let small = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]];
    let large = vec![[5.0, 0.0], [6.0, 0.0], [7.0, 1.0], [6.0, 2.0], [5.0, 1.0], [5.0, 0.0]];
    let f = MapFeature::new("m", Geometry::MultiPolygon(vec![vec![small], vec![large]]));
    let a = preprocess(std::slice::from_ref(&f), size(70.0, 20.0), Projection::Identity, 3).unwrap();
    let b = preprocess(std::slice::from_ref(&f), size(70.0, 20.0), Projection::Identity, 3).unwrap();
    assert_eq!(a.regions[0].polygons[0].exterior.len(), 5);
    assert_eq!(a.regions[0].polygons[1].exterior.len(), 3);
    assert_eq!(a.regions[0].outline_path, b.regions[0].outline_path);
}

#[test]
fn holes_shift_the_centroid_away() {
    let outer = square(0.0, 0.0, 4.0);
    let hole = square(2.0, 1.0, 2.0);
    let f = MapFeature::new("h", Geometry::Polygon(vec![outer, hole]));
    let map = preprocess(&[f], size(4.0, 4.0), Projection::Identity, 3).unwrap();
    let c = map.regions[0].centroid;
    // 16 at x=2 minus 4 at x=3.
    assert!((c.x - 20.0 / 12.0).abs() < 1e-9, "{c:?}");
    assert!((c.y - 2.0).abs() < 1e-9, "{c:?}");
    assert!(map.regions[0].outline_path.matches('M').count() == 2);
}

#[test]
fn empty_region_geometry_is_an_error() {
    let mut features = two_squares();
    features.push(MapFeature::new("empty", Geometry::Polygon(vec![vec![]])));
    let err = preprocess(&features, size(100.0, 50.0), Projection::Identity, 3).unwrap_err();
    assert!(matches!(err, Error::DegenerateGeometry { ref id } if id == "empty"), "{err}");
}

#[test]
fn non_positive_canvas_is_rejected() {
    let err = preprocess(&two_squares(), size(0.0, 50.0), Projection::Identity, 3).unwrap_err();
    assert!(matches!(err, Error::InvalidSize { .. }));
}

#[test]
fn features_deserialize_from_geojson_with_numeric_ids() {
    let json = serde_json::json!([
        {
            "id": 1,
            "geometry": { "type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 1]]] },
            "properties": { "name": "one", "neighbors": ["2"] }
        },
        {
            "id": "2",
            "geometry": { "type": "MultiPolygon", "coordinates": [[[[1, 0], [2, 0], [2, 1], [1, 1]]]] },
            "properties": { "neighbors": [0] }
        }
    ]);
    let features: Vec<MapFeature> = serde_json::from_value(json).unwrap();
    assert_eq!(features[0].id, "1");
    assert_eq!(features[0].neighbor_refs(), vec![NeighborRef::Id("2".into())]);
    let map = preprocess(&features, size(20.0, 10.0), Projection::Identity, 3).unwrap();
    assert_eq!(map.edges, vec![Edge { source: 0, target: 1 }]);
    assert_eq!(map.regions[0].properties["name"], "one");
}
