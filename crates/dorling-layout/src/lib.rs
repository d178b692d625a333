#![forbid(unsafe_code)]

//! Headless circle packing for Dorling cartograms.
//!
//! `dorling-layout` relaxes circles toward their geographic anchors with a d3-force style
//! particle simulation (link springs, anchor pull, collision) for a fixed number of ticks, then
//! removes residual overlap and optionally rescales the result into a viewport.

pub mod error;
pub mod fit;
pub mod force;
pub mod graph;
pub mod options;
pub mod overlap;
pub mod random;
pub mod simulation;

pub use error::{Error, Result};
pub use fit::{Circle, FitTransform, fit_to_viewport};
pub use graph::{LayoutGraph, LayoutResult, Node};
pub use options::SimulationOptions;
pub use simulation::{Bodies, Simulation};

/// Headless layout entry point: runs the full tick budget, then the overlap pass.
///
/// The result never has circles overlapping by more than `overlap_slack`; a layout that cannot
/// be cleared is reported as [`Error::ResidualOverlap`].
pub fn layout(graph: &LayoutGraph, opts: &SimulationOptions) -> Result<LayoutResult> {
    let span = tracing::debug_span!(
        "dorling.layout",
        regions = graph.nodes.len(),
        edges = graph.edges.len()
    );
    let _guard = span.enter();
    let start = std::time::Instant::now();

    let mut sim = Simulation::new(graph, opts)?;
    sim.run(opts.iterations);

    let radii: Vec<f64> = graph.nodes.iter().map(|n| n.radius).collect();
    let slack = opts.overlap_slack;
    let bodies = sim.bodies_mut();
    let sweeps = opts.overlap_passes.saturating_add(radii.len());
    let mut max_overlap =
        overlap::resolve_overlaps(&mut bodies.x, &mut bodies.y, &radii, sweeps, slack);
    if max_overlap > slack {
        let factor = overlap::spread_to_clear(&mut bodies.x, &mut bodies.y, &radii, slack);
        tracing::debug!(
            sweeps,
            residual = max_overlap,
            factor,
            "overlap sweeps did not converge; spreading layout"
        );
        max_overlap = overlap::max_overlap(&bodies.x, &bodies.y, &radii);
    }
    if max_overlap > slack {
        return Err(Error::ResidualOverlap {
            overlap: max_overlap,
        });
    }

    let positions = sim.bodies().positions();
    tracing::debug!(
        ticks = opts.iterations,
        max_overlap,
        elapsed = ?start.elapsed(),
        "layout settled"
    );

    Ok(LayoutResult {
        positions,
        ticks: opts.iterations,
        max_overlap,
    })
}
