use narwhal::{
    CancelToken, Graph, LayeredLayout, LayoutDirection, LayoutSettings, Point, recover_layers,
};

fn sample() -> Graph {
    let mut g = Graph::new();
    for i in 0..7 {
        g.add_node(30.0 + 5.0 * i as f64, 20.0);
    }
    for (s, t) in [(0, 1), (0, 2), (1, 3), (2, 3), (3, 4), (0, 5), (5, 6), (2, 6)] {
        g.connect(s, t);
    }
    g
}

fn layout(g: &Graph, direction: LayoutDirection) -> narwhal::LayoutResult {
    let mut l = LayeredLayout::new(
        g,
        LayoutSettings {
            direction,
            ..LayoutSettings::default()
        },
    )
    .unwrap();
    l.run(&CancelToken::new()).unwrap()
}

#[test]
fn recovery_round_trips_layers() {
    let g = sample();
    for direction in [
        LayoutDirection::TopToBottom,
        LayoutDirection::BottomToTop,
        LayoutDirection::LeftToRight,
        LayoutDirection::RightToLeft,
    ] {
        let r = layout(&g, direction);
        let recovered = recover_layers(&g, &r.centers).expect("clean layers");
        assert_eq!(recovered.direction, direction);
        assert_eq!(recovered.layering.as_slice(), r.layer_arrays.y());
        assert!(recovered.layer_separation >= 30.0 - 1e-6);
    }
}

#[test]
fn recovery_rejects_overlapping_drawings() {
    let mut g = Graph::new();
    g.add_node(40.0, 40.0);
    g.add_node(40.0, 40.0);
    g.connect(0, 1);
    let centers = [Point::new(0.0, 0.0), Point::new(10.0, 10.0)];
    assert!(recover_layers(&g, &centers).is_none());
    assert!(recover_layers(&g, &centers[..1]).is_none());
}

#[test]
fn recovered_engine_lays_out_with_the_same_layers() {
    let g = sample();
    let first = layout(&g, LayoutDirection::TopToBottom);
    let (mut engine, again) =
        LayeredLayout::recover(&g, &first.centers, LayoutSettings::default(), &CancelToken::new())
            .unwrap()
            .expect("recoverable");
    assert_eq!(again.layer_arrays.y(), first.layer_arrays.y());
    // Within each layer the order follows the old x coordinates.
    for layer in again.layer_arrays.layers() {
        for w in layer.windows(2) {
            assert!(first.centers[w[0]].x < first.centers[w[1]].x);
        }
    }
    let resized = engine.incremental_update(3, 80.0, 20.0).unwrap();
    assert_eq!(resized.centers.len(), g.node_count());
}

#[test]
fn recovery_reverses_edges_that_point_up() {
    let mut g = Graph::new();
    for _ in 0..3 {
        g.add_node(20.0, 20.0);
    }
    g.connect(0, 1);
    g.connect(1, 2);
    g.connect(2, 0);
    let centers = [
        Point::new(0.0, 100.0),
        Point::new(0.0, 50.0),
        Point::new(0.0, 0.0),
    ];
    let (_, r) = LayeredLayout::recover(&g, &centers, LayoutSettings::default(), &CancelToken::new())
        .unwrap()
        .expect("recoverable");
    assert_eq!(r.layer_arrays.y(), &[2, 1, 0]);
    assert!(r.centers[0].y > r.centers[1].y && r.centers[1].y > r.centers[2].y);
}
