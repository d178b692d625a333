/// Golden angle in radians; spreads separation directions for coincident pairs.
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// Position-based cleanup after the velocity simulation.
///
/// Sweeps all pairs in index order and moves overlapping pairs apart until they just touch,
/// splitting the move by squared radius like [`crate::force::CollideForce`]. Stops after a
/// sweep with no correction or after `passes` sweeps. Returns the largest remaining overlap.
pub fn resolve_overlaps(
    x: &mut [f64],
    y: &mut [f64],
    radii: &[f64],
    passes: usize,
    slack: f64,
) -> f64 {
    let n = radii.len();
    for _ in 0..passes {
        let mut moved = false;
        for i in 0..n {
            for j in (i + 1)..n {
                let need = radii[i] + radii[j];
                let dx = x[j] - x[i];
                let dy = y[j] - y[i];
                let d = dx.hypot(dy);
                if d >= need - slack {
                    continue;
                }
                let (ux, uy) = if d > 0.0 {
                    (dx / d, dy / d)
                } else {
                    let theta = (j - i) as f64 * GOLDEN_ANGLE;
                    (theta.cos(), theta.sin())
                };
                let ri2 = radii[i] * radii[i];
                let rj2 = radii[j] * radii[j];
                let share_i = rj2 / (ri2 + rj2);
                let push = need - d;
                x[i] -= ux * push * share_i;
                y[i] -= uy * push * share_i;
                x[j] += ux * push * (1.0 - share_i);
                y[j] += uy * push * (1.0 - share_i);
                moved = true;
            }
        }
        if !moved {
            break;
        }
    }
    max_overlap(x, y, radii)
}

/// Spreads all centers away from their mean by the smallest factor that clears every remaining
/// overlap, keeping radii and relative arrangement. Returns the factor applied (1 when nothing
/// overlaps). Coincident overlapping centers cannot be cleared this way and are left alone.
pub fn spread_to_clear(x: &mut [f64], y: &mut [f64], radii: &[f64], slack: f64) -> f64 {
    let n = radii.len();
    let mut factor = 1.0f64;
    for i in 0..n {
        for j in (i + 1)..n {
            let need = radii[i] + radii[j];
            let d = (x[j] - x[i]).hypot(y[j] - y[i]);
            if d >= need - slack || d <= 0.0 {
                continue;
            }
            factor = factor.max(need / d);
        }
    }
    if factor <= 1.0 || !factor.is_finite() {
        return 1.0;
    }
    // A hair past touching so rounding in the rescale cannot reopen an overlap.
    let factor = factor * (1.0 + 1e-9);
    let cx = x.iter().sum::<f64>() / n as f64;
    let cy = y.iter().sum::<f64>() / n as f64;
    for (xi, yi) in x.iter_mut().zip(y.iter_mut()) {
        *xi = cx + (*xi - cx) * factor;
        *yi = cy + (*yi - cy) * factor;
    }
    factor
}

pub fn max_overlap(x: &[f64], y: &[f64], radii: &[f64]) -> f64 {
    let n = radii.len();
    let mut worst = 0.0f64;
    for i in 0..n {
        for j in (i + 1)..n {
            let d = (x[j] - x[i]).hypot(y[j] - y[i]);
            worst = worst.max(radii[i] + radii[j] - d);
        }
    }
    worst
}
