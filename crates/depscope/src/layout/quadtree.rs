//! Barnes-Hut quadtree for approximate repulsion.
//!
//! Regions live in a flat arena. Children are always allocated after their
//! parent, so a reverse sweep over the arena visits children before parents
//! when accumulating mass.

use super::force_atlas::repulsion_factor;
use crate::types::Position;

/// Depth at which regions stop splitting and hold several bodies.
const MAX_DEPTH: usize = 24;

#[derive(Debug, Clone)]
struct Region {
    /// Lower-left corner of the square.
    x0: f64,
    y0: f64,
    /// Side length of the square.
    size: f64,
    /// Total mass of bodies inside.
    mass: f64,
    /// Center of mass.
    cx: f64,
    cy: f64,
    /// Index of the first of four consecutive children, if split.
    first_child: Option<usize>,
    /// Bodies held directly (leaves only).
    bodies: Vec<usize>,
}

impl Region {
    fn new(x0: f64, y0: f64, size: f64) -> Self {
        Self {
            x0,
            y0,
            size,
            mass: 0.0,
            cx: 0.0,
            cy: 0.0,
            first_child: None,
            bodies: Vec::new(),
        }
    }

    fn contains(&self, p: Position) -> bool {
        p.x >= self.x0 && p.x < self.x0 + self.size && p.y >= self.y0 && p.y < self.y0 + self.size
    }

    fn quadrant(&self, p: Position) -> usize {
        let half = self.size / 2.0;
        let right = usize::from(p.x >= self.x0 + half);
        let top = usize::from(p.y >= self.y0 + half);
        right + 2 * top
    }
}

/// A quadtree over body positions with per-region mass and center of mass.
#[derive(Debug, Clone)]
pub(crate) struct QuadTree {
    regions: Vec<Region>,
}

impl QuadTree {
    /// Build a tree over `positions` weighted by `masses`.
    pub(crate) fn build(positions: &[Position], masses: &[f64]) -> Self {
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in positions {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        let size = if positions.is_empty() {
            1.0
        } else {
            // Pad so bodies on the max edge still fall inside
            ((max_x - min_x).max(max_y - min_y) * 1.01).max(1e-6)
        };
        let (x0, y0) = if positions.is_empty() {
            (0.0, 0.0)
        } else {
            (min_x, min_y)
        };

        let mut tree = Self {
            regions: vec![Region::new(x0, y0, size)],
        };
        for body in 0..positions.len() {
            tree.insert(body, positions);
        }
        tree.accumulate(positions, masses);
        tree
    }

    fn insert(&mut self, body: usize, positions: &[Position]) {
        let mut region = 0;
        let mut depth = 0;
        loop {
            if let Some(first) = self.regions[region].first_child {
                region = first + self.regions[region].quadrant(positions[body]);
                depth += 1;
                continue;
            }
            if self.regions[region].bodies.is_empty() || depth >= MAX_DEPTH {
                self.regions[region].bodies.push(body);
                return;
            }

            // Occupied leaf: split and push the resident body down
            let first = self.subdivide(region);
            let residents = std::mem::take(&mut self.regions[region].bodies);
            for resident in residents {
                let q = self.regions[region].quadrant(positions[resident]);
                self.regions[first + q].bodies.push(resident);
            }
        }
    }

    fn subdivide(&mut self, region: usize) -> usize {
        let Region { x0, y0, size, .. } = self.regions[region];
        let half = size / 2.0;
        let first = self.regions.len();
        self.regions.push(Region::new(x0, y0, half));
        self.regions.push(Region::new(x0 + half, y0, half));
        self.regions.push(Region::new(x0, y0 + half, half));
        self.regions.push(Region::new(x0 + half, y0 + half, half));
        self.regions[region].first_child = Some(first);
        first
    }

    fn accumulate(&mut self, positions: &[Position], masses: &[f64]) {
        for index in (0..self.regions.len()).rev() {
            let (mass, wx, wy) = match self.regions[index].first_child {
                Some(first) => self.regions[first..first + 4]
                    .iter()
                    .fold((0.0, 0.0, 0.0), |(m, x, y), child| {
                        (m + child.mass, x + child.cx * child.mass, y + child.cy * child.mass)
                    }),
                None => self.regions[index]
                    .bodies
                    .iter()
                    .fold((0.0, 0.0, 0.0), |(m, x, y), &b| {
                        (
                            m + masses[b],
                            x + positions[b].x * masses[b],
                            y + positions[b].y * masses[b],
                        )
                    }),
            };
            let region = &mut self.regions[index];
            region.mass = mass;
            if mass > 0.0 {
                region.cx = wx / mass;
                region.cy = wy / mass;
            }
        }
    }

    /// Approximate repulsion on `body` from every other body.
    ///
    /// Distant regions whose side over distance is below `theta` act as a
    /// single mass at their center; a region containing `body` is always
    /// opened. With `sizes`, distances are measured between node borders and
    /// overlapping bodies push apart with a constant strong force. Returns the
    /// force as `(fx, fy)`.
    pub(crate) fn repulsion(
        &self,
        body: usize,
        positions: &[Position],
        masses: &[f64],
        sizes: Option<&[f64]>,
        theta: f64,
        coefficient: f64,
    ) -> (f64, f64) {
        let p = positions[body];
        let m = masses[body];
        let own_size = sizes.map(|s| s[body]);
        let theta_sq = theta * theta;
        let (mut fx, mut fy) = (0.0, 0.0);
        let mut stack = vec![0usize];

        while let Some(index) = stack.pop() {
            let region = &self.regions[index];
            if region.mass <= 0.0 {
                continue;
            }
            match region.first_child {
                None => {
                    for &other in &region.bodies {
                        if other == body {
                            continue;
                        }
                        let (dx, dy) = (p.x - positions[other].x, p.y - positions[other].y);
                        let margin = sizes.map(|s| s[body] + s[other]);
                        let factor =
                            repulsion_factor(dx, dy, m * masses[other], coefficient, margin);
                        fx += dx * factor;
                        fy += dy * factor;
                    }
                }
                Some(first) => {
                    let (dx, dy) = (p.x - region.cx, p.y - region.cy);
                    let dist_sq = dx * dx + dy * dy;
                    let far = dist_sq > 0.0 && region.size * region.size / dist_sq < theta_sq;
                    if far && !region.contains(p) {
                        let factor =
                            repulsion_factor(dx, dy, m * region.mass, coefficient, own_size);
                        fx += dx * factor;
                        fy += dy * factor;
                    } else {
                        stack.extend(first..first + 4);
                    }
                }
            }
        }
        (fx, fy)
    }
}
