use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationOptions {
    /// Fixed tick budget. There is no convergence test.
    pub iterations: usize,
    /// Rest length of the adjacency springs.
    pub link_distance: f64,
    pub link_strength: f64,
    /// Pull toward each region's centroid, per axis.
    pub anchor_strength: f64,
    pub collide_strength: f64,
    pub collide_iterations: usize,
    /// Fraction of velocity removed per tick (d3's `velocityDecay`).
    pub velocity_decay: f64,
    /// Alpha after 300 ticks; determines the per-tick alpha decay.
    pub alpha_min: f64,
    /// Base budget of position-based overlap sweeps after the simulation; one more sweep is
    /// allowed per node. Whatever is left afterwards is cleared by spreading the layout.
    pub overlap_passes: usize,
    /// Largest overlap still counted as touching.
    pub overlap_slack: f64,
    /// Seed for the jiggle applied to exactly coincident bodies.
    pub seed: u32,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            iterations: 500,
            link_distance: 30.0,
            link_strength: 1.0,
            anchor_strength: 1.0,
            collide_strength: 1.0,
            collide_iterations: 1,
            velocity_decay: 0.4,
            alpha_min: 0.001,
            overlap_passes: 64,
            overlap_slack: 1e-6,
            seed: 1,
        }
    }
}

impl SimulationOptions {
    pub fn alpha_decay(&self) -> f64 {
        1.0 - self.alpha_min.powf(1.0 / 300.0)
    }
}
