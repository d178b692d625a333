/// Linear congruential generator (Numerical Recipes constants), as used by d3-force.
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    const A: u32 = 1_664_525;
    const C: u32 = 1_013_904_223;

    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_mul(Self::A).wrapping_add(Self::C);
        f64::from(self.state) / 4_294_967_296.0
    }

    /// A tiny non-zero offset used to separate bodies sitting exactly on top of each other.
    pub fn jiggle(&mut self) -> f64 {
        (self.next_f64() - 0.5) * 1e-6
    }
}
