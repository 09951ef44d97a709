//! ForceAtlas2 simulation step.
//!
//! Each step accumulates three forces per node and then moves every node by
//! an adaptive speed:
//!
//! - **Repulsion** between all pairs, `k * m1 * m2 / d` (mass is `1 + degree`),
//!   exact or through a Barnes-Hut quadtree
//! - **Gravity** toward the centroid, `k * g * m / d` or `k * g * m` when strong
//! - **Attraction** along edges, linear or logarithmic, optionally divided
//!   by the source mass so hubs do not collapse their neighborhoods
//!
//! Speed shrinks for nodes whose force keeps changing direction (swinging)
//! and grows for nodes moving steadily (traction).

use super::quadtree::QuadTree;
use super::{LayoutSettings, LayoutState, LayoutStrategy};

/// Displacement cap per step when sizes are adjusted.
const MAX_DISPLACEMENT: f64 = 10.0;

/// Repulsion multiplier for overlapping nodes in anti-collision mode.
const OVERLAP_REPULSION: f64 = 100.0;

/// Repulsion factor for two bodies `(dx, dy)` apart; the force on the first
/// is `(dx, dy) * factor`.
///
/// With `margin` (the summed radii) the distance is taken between borders and
/// overlapping bodies get a constant strong push.
pub(super) fn repulsion_factor(
    dx: f64,
    dy: f64,
    mass_product: f64,
    k: f64,
    margin: Option<f64>,
) -> f64 {
    match margin {
        Some(margin) => {
            let distance = dx.hypot(dy) - margin;
            if distance < 0.0 {
                OVERLAP_REPULSION * k * mass_product
            } else if distance > 0.0 {
                k * mass_product / (distance * distance)
            } else {
                0.0
            }
        }
        None => {
            let dist_sq = dx * dx + dy * dy;
            if dist_sq > 0.0 {
                k * mass_product / dist_sq
            } else {
                0.0
            }
        }
    }
}

/// ForceAtlas2 layout strategy.
///
/// Keeps the previous step's forces to compute swinging and traction, so one
/// instance should be used for a single run.
#[derive(Debug, Clone, Default)]
pub struct ForceAtlas2 {
    forces: Vec<(f64, f64)>,
    previous: Vec<(f64, f64)>,
}

impl ForceAtlas2 {
    fn reset(&mut self, n: usize) {
        if self.previous.len() != n {
            self.previous = vec![(0.0, 0.0); n];
        } else {
            std::mem::swap(&mut self.previous, &mut self.forces);
        }
        self.forces.clear();
        self.forces.resize(n, (0.0, 0.0));
    }

    fn repulsion_exact(&mut self, state: &LayoutState, settings: &LayoutSettings) {
        let n = state.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (p1, p2) = (state.positions[i], state.positions[j]);
                let (dx, dy) = (p1.x - p2.x, p1.y - p2.y);
                let margin = settings
                    .adjust_sizes
                    .then(|| state.sizes[i] + state.sizes[j]);
                let factor = repulsion_factor(
                    dx,
                    dy,
                    state.masses[i] * state.masses[j],
                    settings.scaling_ratio,
                    margin,
                );

                self.forces[i].0 += dx * factor;
                self.forces[i].1 += dy * factor;
                self.forces[j].0 -= dx * factor;
                self.forces[j].1 -= dy * factor;
            }
        }
    }

    fn repulsion_barnes_hut(&mut self, state: &LayoutState, settings: &LayoutSettings) {
        let tree = QuadTree::build(&state.positions, &state.masses);
        let sizes = settings.adjust_sizes.then_some(state.sizes.as_slice());
        for i in 0..state.len() {
            let (fx, fy) = tree.repulsion(
                i,
                &state.positions,
                &state.masses,
                sizes,
                settings.theta,
                settings.scaling_ratio,
            );
            self.forces[i].0 += fx;
            self.forces[i].1 += fy;
        }
    }

    fn gravity(&mut self, state: &LayoutState, settings: &LayoutSettings) {
        #[allow(clippy::cast_precision_loss)]
        let n = state.len() as f64;
        let (sx, sy) = state
            .positions
            .iter()
            .fold((0.0, 0.0), |(x, y), p| (x + p.x, y + p.y));
        let (cx, cy) = (sx / n, sy / n);
        let k = settings.scaling_ratio * settings.gravity;

        for (i, p) in state.positions.iter().enumerate() {
            let (dx, dy) = (p.x - cx, p.y - cy);
            let factor = if settings.strong_gravity {
                k * state.masses[i]
            } else {
                let distance = dx.hypot(dy);
                if distance > 0.0 {
                    k * state.masses[i] / distance
                } else {
                    0.0
                }
            };
            self.forces[i].0 -= dx * factor;
            self.forces[i].1 -= dy * factor;
        }
    }

    fn attraction(&mut self, state: &LayoutState, settings: &LayoutSettings) {
        #[allow(clippy::cast_precision_loss)]
        let coefficient = if settings.outbound_attraction_distribution {
            state.masses.iter().sum::<f64>() / state.len() as f64
        } else {
            1.0
        };

        for &(s, t, weight) in &state.edges {
            let (p1, p2) = (state.positions[s], state.positions[t]);
            let (dx, dy) = (p1.x - p2.x, p1.y - p2.y);
            let influence = if settings.edge_weight_influence.abs() < f64::EPSILON {
                1.0
            } else {
                weight.powf(settings.edge_weight_influence)
            };
            let source_mass = if settings.outbound_attraction_distribution {
                state.masses[s]
            } else {
                1.0
            };

            let distance = if settings.adjust_sizes {
                dx.hypot(dy) - state.sizes[s] - state.sizes[t]
            } else {
                dx.hypot(dy)
            };

            let factor = if settings.lin_log_mode {
                if distance > 0.0 {
                    -coefficient * influence * distance.ln_1p() / distance / source_mass
                } else {
                    0.0
                }
            } else if settings.adjust_sizes && distance <= 0.0 {
                0.0
            } else {
                -coefficient * influence / source_mass
            };

            self.forces[s].0 += dx * factor;
            self.forces[s].1 += dy * factor;
            self.forces[t].0 -= dx * factor;
            self.forces[t].1 -= dy * factor;
        }
    }

    fn apply(&self, state: &mut LayoutState, settings: &LayoutSettings) {
        for (i, p) in state.positions.iter_mut().enumerate() {
            let (dx, dy) = self.forces[i];
            let (old_dx, old_dy) = self.previous[i];

            let swinging = state.masses[i] * (old_dx - dx).hypot(old_dy - dy);
            let traction = (old_dx + dx).hypot(old_dy + dy) / 2.0;
            let speed = 0.1 * traction.ln_1p() / (1.0 + swinging.sqrt());

            let speed = if settings.adjust_sizes {
                let force = dx.hypot(dy);
                if force > 0.0 {
                    (speed * force).min(MAX_DISPLACEMENT) / force
                } else {
                    0.0
                }
            } else {
                speed
            };
            let factor = speed / settings.slow_down;

            let (x, y) = (p.x + dx * factor, p.y + dy * factor);
            if x.is_finite() && y.is_finite() {
                p.x = x;
                p.y = y;
            }
        }
    }
}

impl LayoutStrategy for ForceAtlas2 {
    fn step(&mut self, state: &mut LayoutState, settings: &LayoutSettings) {
        if state.is_empty() {
            return;
        }
        self.reset(state.len());

        if settings.barnes_hut {
            self.repulsion_barnes_hut(state, settings);
        } else {
            self.repulsion_exact(state, settings);
        }
        self.gravity(state, settings);
        self.attraction(state, settings);
        self.apply(state, settings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::LayoutEngine;
    use crate::types::Position;
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

    fn settings(barnes_hut: bool) -> LayoutSettings {
        let mut settings = LayoutEngine::new(LayoutConfig::default()).settings_for(30);
        settings.barnes_hut = barnes_hut;
        settings
    }

    fn random_state(n: usize, seed: u64) -> LayoutState {
        let mut rng = StdRng::seed_from_u64(seed);
        let positions = (0..n)
            .map(|_| Position::new(rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0)))
            .collect();
        let edges = (1..n).map(|i| (i - 1, i, 1.0)).collect();
        LayoutState {
            positions,
            masses: (0..n).map(|i| if i == 0 || i == n - 1 { 2.0 } else { 3.0 }).collect(),
            sizes: vec![3.0; n],
            edges,
        }
    }

    #[test]
    fn barnes_hut_matches_exact_with_tiny_theta() {
        let mut exact_settings = settings(false);
        exact_settings.theta = 1e-9;
        let mut approx_settings = settings(true);
        approx_settings.theta = 1e-9;

        let mut exact = random_state(30, 11);
        let mut approx = exact.clone();
        ForceAtlas2::default().step(&mut exact, &exact_settings);
        ForceAtlas2::default().step(&mut approx, &approx_settings);

        for (a, b) in exact.positions.iter().zip(&approx.positions) {
            assert!(a.distance(b) < 1e-6, "{a:?} vs {b:?}");
        }
    }

    #[test]
    fn barnes_hut_matches_exact_with_adjusted_sizes() {
        let mut exact_settings = settings(false);
        exact_settings.theta = 1e-9;
        exact_settings.adjust_sizes = true;
        let mut approx_settings = exact_settings.clone();
        approx_settings.barnes_hut = true;

        let mut exact = LayoutState {
            positions: vec![
                Position::new(0.0, 0.0),
                Position::new(4.0, 0.0),
                Position::new(2.0, 5.0),
            ],
            masses: vec![1.0, 2.0, 1.0],
            sizes: vec![3.0; 3],
            edges: Vec::new(),
        };
        let mut approx = exact.clone();
        ForceAtlas2::default().step(&mut exact, &exact_settings);
        ForceAtlas2::default().step(&mut approx, &approx_settings);

        assert!(exact.positions[0].x < -1.0, "overlap pushes body 0 away");
        for (a, b) in exact.positions.iter().zip(&approx.positions) {
            assert!(a.distance(b) < 1e-6, "{a:?} vs {b:?}");
        }
    }

    #[test]
    fn edge_pulls_endpoints_together() {
        let run = |edges: Vec<(usize, usize, f64)>| {
            let mut state = LayoutState {
                positions: vec![
                    Position::new(-50.0, 0.0),
                    Position::new(50.0, 0.0),
                    Position::new(0.0, -50.0),
                ],
                masses: vec![2.0, 2.0, 1.0],
                sizes: vec![1.0; 3],
                edges,
            };
            let s = settings(false);
            let mut fa2 = ForceAtlas2::default();
            for _ in 0..300 {
                fa2.step(&mut state, &s);
            }
            state.positions[0].distance(&state.positions[1])
        };

        let linked = run(vec![(0, 1, 1.0)]);
        let unlinked = run(Vec::new());

        assert!(linked < unlinked, "linked {linked} vs unlinked {unlinked}");
    }

    #[test]
    fn coincident_nodes_stay_finite() {
        let mut state = LayoutState {
            positions: vec![Position::new(1.0, 1.0); 3],
            masses: vec![1.0; 3],
            sizes: vec![1.0; 3],
            edges: vec![(0, 1, 1.0)],
        };

        for barnes_hut in [false, true] {
            let s = settings(barnes_hut);
            let mut fa2 = ForceAtlas2::default();
            for _ in 0..10 {
                fa2.step(&mut state, &s);
            }
        }

        assert!(state.positions.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    }

    #[test]
    fn option_modes_stay_finite() {
        let mut s = settings(false);
        s.adjust_sizes = true;
        s.lin_log_mode = true;
        s.strong_gravity = true;
        s.outbound_attraction_distribution = false;
        let mut state = random_state(20, 5);
        let mut fa2 = ForceAtlas2::default();

        for _ in 0..50 {
            fa2.step(&mut state, &s);
        }

        assert!(state.positions.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    }
}
