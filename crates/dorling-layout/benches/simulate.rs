use criterion::{Criterion, criterion_group, criterion_main};
use dorling_geo::{Edge, point};
use dorling_layout::{LayoutGraph, Node, SimulationOptions, layout};
use std::hint::black_box;

/// A `side x side` grid of touching cells with 4-neighborhood edges and varied radii.
fn grid_graph(side: usize) -> LayoutGraph {
    let mut nodes = Vec::with_capacity(side * side);
    let mut edges = Vec::new();
    for row in 0..side {
        for col in 0..side {
            let idx = row * side + col;
            nodes.push(Node {
                anchor: point(col as f64 * 10.0, row as f64 * 10.0),
                radius: 3.0 + ((idx * 7) % 11) as f64,
            });
            if col + 1 < side {
                edges.push(Edge {
                    source: idx,
                    target: idx + 1,
                });
            }
            if row + 1 < side {
                edges.push(Edge {
                    source: idx,
                    target: idx + side,
                });
            }
        }
    }
    LayoutGraph { nodes, edges }
}

fn bench_simulate(c: &mut Criterion) {
    let opts = SimulationOptions::default();
    for side in [7usize, 15] {
        let g = grid_graph(side);
        c.bench_function(&format!("layout_grid_{}", side * side), |b| {
            b.iter(|| layout(black_box(&g), black_box(&opts)).unwrap())
        });
    }
}

criterion_group!(benches, bench_simulate);
criterion_main!(benches);
