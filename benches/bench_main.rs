use criterion::{Criterion, criterion_group, criterion_main};
use geo::Point;
use reachmap::prelude::*;

/// 30x30 lattice of bidirectional streets, one minute per edge
fn lattice() -> RoadGraph {
    let n = 30;
    let spacing = 0.001;
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
                let next = nodes[j * n + i + 1];
                let (a, b) = (network.graph[here].geometry, network.graph[next].geometry);
                network.add_edge(here, next, RoadEdge::straight(60.0, a, b));
                network.add_edge(next, here, RoadEdge::straight(60.0, b, a));
            }
            if j + 1 < n {
                let next = nodes[(j + 1) * n + i];
                let (a, b) = (network.graph[here].geometry, network.graph[next].geometry);
                network.add_edge(here, next, RoadEdge::straight(60.0, a, b));
                network.add_edge(next, here, RoadEdge::straight(60.0, b, a));
            }
        }
    }
    network.build_index();
    network
}

fn bench_isochrones(c: &mut Criterion) {
    let network = lattice();
    let center = Point::new(0.015, 0.015);
    let config = IsochroneConfig::default();

    let mut group = c.benchmark_group("isochrone");
    group.bench_function("grid_10min", |b| {
        let request = IsochroneRequest::new(center, 600.0);
        b.iter(|| {
            std::hint::black_box(
                build_isochrone_map(&network, &AcceptAllEdges, &request, &config).unwrap(),
            )
        });
    });
    group.bench_function("tin_10min", |b| {
        let mut request = IsochroneRequest::new(center, 600.0);
        request.method = IsolineMethod::Tin;
        b.iter(|| {
            std::hint::black_box(
                build_isochrone_map(&network, &AcceptAllEdges, &request, &config).unwrap(),
            )
        });
    });
    group.finish();
}

criterion_group!(benches, bench_isochrones);
criterion_main!(benches);
