//! End-to-end isochrone scenarios on toy grid networks

use geo::{Contains, Point};
use reachmap::prelude::*;

/// Square n x n lattice of bidirectional streets with uniform edge cost,
/// `spacing` degrees apart, bottom-left corner at the origin
fn grid_network(n: usize, spacing: f64, weight: f64) -> RoadGraph {
    let mut network = RoadGraph::new();
    let mut nodes = Vec::with_capacity(n * n);
    for j in 0..n {
        for i in 0..n {
            nodes.push(network.add_node(RoadNode {
                id: (j * n + i) as i64,
                geometry: Point::new(i as f64 * spacing, j as f64 * spacing),
            }));
        }
    }
    for j in 0..n {
        for i in 0..n {
            let here = nodes[j * n + i];
            if i + 1 < n {
                connect(&mut network, here, nodes[j * n + i + 1], weight);
            }
            if j + 1 < n {
                connect(&mut network, here, nodes[(j + 1) * n + i], weight);
            }
        }
    }
    network.build_index();
    network
}

fn connect(
    network: &mut RoadGraph,
    a: petgraph::graph::NodeIndex,
    b: petgraph::graph::NodeIndex,
    weight: f64,
) {
    let pa = network.graph[a].geometry;
    let pb = network.graph[b].geometry;
    network.add_edge(a, b, RoadEdge::straight(weight, pa, pb));
    network.add_edge(b, a, RoadEdge::straight(weight, pb, pa));
}

fn fine_config() -> IsochroneConfig {
    IsochroneConfig {
        grid_resolution: 30.0,
        ..IsochroneConfig::default()
    }
}

fn covered(map: &IsochroneMap, value: f64, point: Point<f64>) -> bool {
    map.isochrones()
        .iter()
        .filter(|isochrone| isochrone.value() == value)
        .any(|isochrone| isochrone.geometry().contains(&point))
}

fn total_area(map: &IsochroneMap, value: f64) -> f64 {
    map.isochrones()
        .iter()
        .filter(|isochrone| isochrone.value() == value)
        .map(|isochrone| isochrone.area())
        .sum()
}

#[test]
fn single_isochrone_covers_the_adjacent_edges() {
    // 3x3 unit-cost grid, center in the middle, budget 1: the isochrone
    // spans the four orthogonally adjacent edge buffers
    let network = grid_network(3, 0.001, 1.0);
    let center = Point::new(0.001, 0.001);
    let request = IsochroneRequest::new(center, 1.0);

    let map = build_isochrone_map(&network, &AcceptAllEdges, &request, &fine_config()).unwrap();

    assert!(!map.is_empty());
    assert!(map.isochrones().iter().all(|i| i.value() == 1.0));
    assert!(total_area(&map, 1.0) > 0.0);

    assert!(covered(&map, 1.0, center));
    // halfway along each adjacent edge, cost 0.5
    for (dx, dy) in [(0.0005, 0.0), (-0.0005, 0.0), (0.0, 0.0005), (0.0, -0.0005)] {
        assert!(covered(&map, 1.0, Point::new(center.x() + dx, center.y() + dy)));
    }
    // halfway along a border edge, cost 1.5, beyond the budget
    assert!(!covered(&map, 1.0, Point::new(0.002, 0.0015)));
    // diagonal corner node, cost 2
    assert!(!covered(&map, 1.0, Point::new(0.002, 0.002)));
}

#[test]
fn intervals_produce_nested_rings() {
    let network = grid_network(5, 0.001, 5.0);
    let center = Point::new(0.002, 0.002);
    let mut request = IsochroneRequest::new(center, 10.0);
    request.interval = 5.0;

    let map = build_isochrone_map(&network, &AcceptAllEdges, &request, &fine_config()).unwrap();

    let mut values: Vec<f64> = map.isochrones().iter().map(|i| i.value()).collect();
    values.dedup();
    assert_eq!(values, vec![5.0, 10.0]);

    // inner cost 2.5 lies in both rings, cost 7.5 only in the outer one
    let inner = Point::new(0.0025, 0.002);
    let outer = Point::new(0.0035, 0.002);
    assert!(covered(&map, 5.0, inner));
    assert!(covered(&map, 10.0, inner));
    assert!(!covered(&map, 5.0, outer));
    assert!(covered(&map, 10.0, outer));

    assert!(total_area(&map, 5.0) < total_area(&map, 10.0));
}

#[test]
fn final_ring_value_is_the_budget_itself() {
    let network = grid_network(5, 0.001, 5.0);
    let mut request = IsochroneRequest::new(Point::new(0.002, 0.002), 12.0);
    request.interval = 5.0;

    let map = build_isochrone_map(&network, &AcceptAllEdges, &request, &fine_config()).unwrap();

    let mut values: Vec<f64> = map.isochrones().iter().map(|i| i.value()).collect();
    values.dedup();
    assert_eq!(values, vec![5.0, 10.0, 12.0]);
}

#[test]
fn repeated_builds_are_identical() {
    let network = grid_network(3, 0.001, 1.0);
    let request = IsochroneRequest::new(Point::new(0.001, 0.001), 1.5);
    let config = fine_config();

    let first = build_isochrone_map(&network, &AcceptAllEdges, &request, &config).unwrap();
    let second = build_isochrone_map(&network, &AcceptAllEdges, &request, &config).unwrap();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.isochrones().iter().zip(second.isochrones()) {
        assert_eq!(a.value(), b.value());
        assert_eq!(a.geometry(), b.geometry());
    }
}

#[test]
fn grid_and_tin_roughly_agree() {
    // dense lattice so both strategies see the same reachable region;
    // the bound is coarse since the strategies sample differently
    let network = grid_network(5, 0.001, 1.0);
    let center = Point::new(0.002, 0.002);
    let config = IsochroneConfig {
        grid_resolution: 60.0,
        ..IsochroneConfig::default()
    };

    let mut request = IsochroneRequest::new(center, 2.5);
    request.method = IsolineMethod::RecursiveGrid;
    let grid_map = build_isochrone_map(&network, &AcceptAllEdges, &request, &config).unwrap();

    request.method = IsolineMethod::Tin;
    let tin_map = build_isochrone_map(&network, &AcceptAllEdges, &request, &config).unwrap();

    let grid_area = total_area(&grid_map, 2.5);
    let tin_area = total_area(&tin_map, 2.5);
    assert!(grid_area > 0.0);
    assert!(tin_area > 0.0);
    let deviation = (grid_area - tin_area).abs() / grid_area.max(tin_area);
    assert!(deviation < 0.35, "areas deviate by {deviation}");
}

#[test]
fn zero_budget_does_not_crash() {
    let network = grid_network(3, 0.001, 1.0);
    let request = IsochroneRequest::new(Point::new(0.001, 0.001), 0.0);

    // without the search margin nothing beyond the source settles
    let strict = IsochroneConfig {
        cost_margin: 0.0,
        ..fine_config()
    };
    let map = build_isochrone_map(&network, &AcceptAllEdges, &request, &strict).unwrap();
    assert!(map.is_empty());

    // with the default margin the build still succeeds; the polygon at
    // threshold 0 is degenerate or absent
    let map = build_isochrone_map(&network, &AcceptAllEdges, &request, &fine_config()).unwrap();
    assert!(map.isochrones().iter().all(|i| i.value() == 0.0));
}

#[test]
fn blocked_profile_yields_an_empty_map() {
    let network = grid_network(3, 0.001, 1.0);
    let request = IsochroneRequest::new(Point::new(0.001, 0.001), 600.0);
    let blocked = |_: &RoadEdge| false;

    let map = build_isochrone_map(&network, &blocked, &request, &fine_config()).unwrap();
    assert!(map.is_empty());
    assert_eq!(map.len(), 0);
}

#[test]
fn unsnappable_location_is_a_client_error() {
    let network = grid_network(3, 0.001, 1.0);
    // about 110 km away from the lattice
    let request = IsochroneRequest::new(Point::new(1.0, 1.0), 600.0);

    let result = build_isochrone_map(&network, &AcceptAllEdges, &request, &fine_config());
    assert!(matches!(result, Err(Error::NoStartNode)));
}

#[test]
fn method_names_select_the_strategy() {
    let network = grid_network(3, 0.001, 1.0);
    let mut request = IsochroneRequest::new(Point::new(0.001, 0.001), 1.5);
    request.method = "TIN".parse().unwrap();

    let map = build_isochrone_map(&network, &AcceptAllEdges, &request, &fine_config()).unwrap();
    assert!(!map.is_empty());

    assert!(matches!(
        "marchingcubes".parse::<IsolineMethod>(),
        Err(Error::UnknownMethod(_))
    ));
}

#[test]
fn bulk_requests_keep_their_order() {
    let network = grid_network(3, 0.001, 1.0);
    let mut first = IsochroneRequest::new(Point::new(0.001, 0.001), 1.0);
    first.traveller_id = 0;
    let mut second = IsochroneRequest::new(Point::new(0.0, 0.0), 1.0);
    second.traveller_id = 1;

    let maps = bulk_isochrone_maps(
        &network,
        &AcceptAllEdges,
        &[first, second],
        &fine_config(),
    )
    .unwrap();

    assert_eq!(maps.len(), 2);
    assert_eq!(maps[0].traveller_id(), 0);
    assert_eq!(maps[1].traveller_id(), 1);
    assert!(!maps[0].is_empty());
    assert!(!maps[1].is_empty());
}

#[test]
fn geojson_export_mirrors_the_map() {
    let network = grid_network(5, 0.001, 5.0);
    let mut request = IsochroneRequest::new(Point::new(0.002, 0.002), 10.0);
    request.interval = 5.0;
    request.traveller_id = 7;

    let map = build_isochrone_map(&network, &AcceptAllEdges, &request, &fine_config()).unwrap();
    let collection = map.to_geojson();

    assert_eq!(collection.features.len(), map.len());
    let properties = collection.features[0].properties.as_ref().unwrap();
    assert_eq!(properties["group_index"], serde_json::json!(7));
    assert_eq!(properties["value"], serde_json::json!(5.0));
    assert!(collection.bbox.is_some());
}
