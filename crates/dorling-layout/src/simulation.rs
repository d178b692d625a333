use crate::error::Result;
use crate::force::{AnchorForce, CollideForce, Force, LinkForce};
use crate::graph::LayoutGraph;
use crate::options::SimulationOptions;
use crate::random::Lcg;
use dorling_geo::{Point, point};

/// Simulation state, one slot per region index.
///
/// Forces only write velocities; positions move in [`Bodies::integrate`]. Every force in a tick
/// therefore reads the positions of tick `n` and the integration produces tick `n + 1`.
#[derive(Debug, Clone)]
pub struct Bodies {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub vx: Vec<f64>,
    pub vy: Vec<f64>,
    version: u64,
}

impl Bodies {
    pub fn at_rest(positions: impl IntoIterator<Item = Point>) -> Self {
        let (x, y): (Vec<f64>, Vec<f64>) = positions.into_iter().map(|p| (p.x, p.y)).unzip();
        let n = x.len();
        Self {
            x,
            y,
            vx: vec![0.0; n],
            vy: vec![0.0; n],
            version: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Number of integrations applied so far.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn positions(&self) -> Vec<Point> {
        self.x
            .iter()
            .zip(&self.y)
            .map(|(&x, &y)| point(x, y))
            .collect()
    }

    /// Damps velocities by `retain` and advances positions by the damped velocity.
    pub fn integrate(&mut self, retain: f64) {
        for i in 0..self.len() {
            self.vx[i] *= retain;
            self.vy[i] *= retain;
            self.x[i] += self.vx[i];
            self.y[i] += self.vy[i];
        }
        self.version += 1;
    }
}

#[derive(Debug, Clone)]
pub struct Simulation {
    bodies: Bodies,
    link: LinkForce,
    anchor: AnchorForce,
    collide: CollideForce,
    alpha: f64,
    alpha_target: f64,
    alpha_decay: f64,
    velocity_decay: f64,
    rng: Lcg,
}

impl Simulation {
    /// Bodies start at rest on their anchors.
    pub fn new(graph: &LayoutGraph, opts: &SimulationOptions) -> Result<Self> {
        graph.validate()?;

        let anchors: Vec<Point> = graph.nodes.iter().map(|n| n.anchor).collect();
        let radii: Vec<f64> = graph.nodes.iter().map(|n| n.radius).collect();

        Ok(Self {
            bodies: Bodies::at_rest(anchors.iter().copied()),
            link: LinkForce::new(
                &graph.edges,
                graph.nodes.len(),
                opts.link_distance,
                opts.link_strength,
            ),
            anchor: AnchorForce::new(anchors, opts.anchor_strength),
            collide: CollideForce::new(radii, opts.collide_strength, opts.collide_iterations),
            alpha: 1.0,
            alpha_target: 0.0,
            alpha_decay: opts.alpha_decay(),
            velocity_decay: opts.velocity_decay,
            rng: Lcg::new(opts.seed),
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn bodies(&self) -> &Bodies {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut Bodies {
        &mut self.bodies
    }

    /// One step: cool alpha, apply link, anchor and collide forces in that order, integrate.
    pub fn tick(&mut self) {
        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;

        let forces: [&mut dyn Force; 3] = [&mut self.link, &mut self.anchor, &mut self.collide];
        for force in forces {
            force.apply(&mut self.bodies, self.alpha, &mut self.rng);
        }

        self.bodies.integrate(1.0 - self.velocity_decay);
    }

    pub fn run(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.tick();
        }
    }
}
