//! Fire-front ring maintenance.
//!
//! The front is a closed simple polygon in the local metric plane, stored as
//! an open ring (the closing edge is implicit). After each wavelet step the
//! ring is resampled to keep vertex spacing between the merge and split
//! thresholds, cleaned of self-intersections with the rubber-band rule, and
//! re-wound counter-clockwise.

use nalgebra::{Point2, Vector2};

/// Edges longer than this are subdivided during resampling (m).
pub const MAX_VERTEX_SPACING_M: f64 = 30.0;
/// Neighbor pairs closer than this are merged during resampling (m).
pub const MIN_VERTEX_SPACING_M: f64 = 5.0;

const EPS: f64 = 1e-9;

/// Single vertex of the active fire front (local metric plane).
#[derive(Debug, Clone, Copy)]
pub struct FireVertex {
    pub position: Point2<f64>,
    /// Cleared by the rubber-band cleanup for vertices caught in a cut loop
    pub active: bool,
}

impl FireVertex {
    fn at(position: Point2<f64>) -> Self {
        Self {
            position,
            active: true,
        }
    }
}

/// Closed fire-front polygon.
#[derive(Debug, Clone)]
pub struct Perimeter {
    vertices: Vec<FireVertex>,
}

impl Perimeter {
    /// Seed a regular `n`-gon of the given radius around a center point,
    /// wound counter-clockwise.
    pub fn seed(center: Point2<f64>, radius: f64, n: usize) -> Self {
        let vertices = (0..n)
            .map(|i| {
                let phi = 2.0 * std::f64::consts::PI * (i as f64) / (n as f64);
                FireVertex::at(Point2::new(
                    center.x + radius * phi.cos(),
                    center.y + radius * phi.sin(),
                ))
            })
            .collect();
        Self { vertices }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vertex positions in ring order (closing edge implicit).
    pub fn positions(&self) -> impl Iterator<Item = Point2<f64>> + '_ {
        self.vertices.iter().map(|v| v.position)
    }

    fn pos(&self, i: usize) -> Point2<f64> {
        self.vertices[i].position
    }

    /// Replace all vertex positions, keeping ring order. Lengths must match.
    pub fn set_positions(&mut self, positions: &[Point2<f64>]) {
        debug_assert_eq!(positions.len(), self.vertices.len());
        for (v, p) in self.vertices.iter_mut().zip(positions) {
            v.position = *p;
        }
    }

    /// Signed shoelace area (m²); positive for counter-clockwise winding.
    pub fn signed_area_m2(&self) -> f64 {
        let n = self.vertices.len();
        if n < 3 {
            return 0.0;
        }
        let mut sum = 0.0;
        for i in 0..n {
            let p = self.pos(i);
            let q = self.pos((i + 1) % n);
            sum += p.x * q.y - q.x * p.y;
        }
        sum / 2.0
    }

    /// Enclosed area (m²); zero for degenerate rings.
    pub fn area_m2(&self) -> f64 {
        if self.is_degenerate() {
            0.0
        } else {
            self.signed_area_m2().abs()
        }
    }

    /// Reverse the ring if it is wound clockwise.
    pub fn enforce_ccw(&mut self) {
        if self.signed_area_m2() < 0.0 {
            self.vertices.reverse();
        }
    }

    /// A ring with fewer than three distinct vertices no longer encloses
    /// area and is reported as degenerate.
    pub fn is_degenerate(&self) -> bool {
        if self.vertices.len() < 3 {
            return true;
        }
        let mut distinct = 1usize;
        let first = self.pos(0);
        let mut last = first;
        for i in 1..self.vertices.len() {
            let p = self.pos(i);
            if (p - last).norm() > EPS && !(i == self.vertices.len() - 1 && (p - first).norm() <= EPS)
            {
                distinct += 1;
                last = p;
            }
        }
        distinct < 3
    }

    /// Outward unit normal at each vertex: the bisector of the two adjacent
    /// edge normals. Requires counter-clockwise winding.
    pub fn outward_normals(&self) -> Vec<Vector2<f64>> {
        let n = self.vertices.len();
        let mut normals = Vec::with_capacity(n);
        for i in 0..n {
            let prev = self.pos((i + n - 1) % n);
            let cur = self.pos(i);
            let next = self.pos((i + 1) % n);
            let n1 = edge_normal(prev, cur);
            let n2 = edge_normal(cur, next);
            let sum = n1 + n2;
            let normal = if sum.norm() > EPS {
                sum.normalize()
            } else if n2.norm() > EPS {
                // 180° fold; either edge normal is as good as the other
                n2
            } else {
                n1
            };
            normals.push(normal);
        }
        normals
    }

    /// Resample to keep neighbor spacing within the configured band:
    /// split edges longer than [`MAX_VERTEX_SPACING_M`], then merge pairs
    /// closer than [`MIN_VERTEX_SPACING_M`] into their midpoint.
    pub fn resample(&mut self) {
        let n = self.vertices.len();
        if n < 3 {
            return;
        }

        let mut split = Vec::with_capacity(n);
        for i in 0..n {
            let p = self.pos(i);
            let q = self.pos((i + 1) % n);
            split.push(p);
            let len = (q - p).norm();
            if len > MAX_VERTEX_SPACING_M {
                let pieces = (len / MAX_VERTEX_SPACING_M).ceil() as usize;
                for s in 1..pieces {
                    let t = (s as f64) / (pieces as f64);
                    split.push(p + (q - p) * t);
                }
            }
        }

        let mut merged: Vec<Point2<f64>> = Vec::with_capacity(split.len());
        let mut i = 0;
        while i < split.len() {
            if i + 1 < split.len() && (split[i + 1] - split[i]).norm() < MIN_VERTEX_SPACING_M {
                merged.push(nalgebra::center(&split[i], &split[i + 1]));
                i += 2;
            } else {
                merged.push(split[i]);
                i += 1;
            }
        }
        // wraparound pair
        if merged.len() > 3 {
            let first = merged[0];
            let last = merged[merged.len() - 1];
            if (first - last).norm() < MIN_VERTEX_SPACING_M {
                merged.pop();
            }
        }

        self.vertices = merged.into_iter().map(FireVertex::at).collect();
    }

    /// Rubber-band cleanup: while any two non-adjacent edges cross, replace
    /// the shorter of the two arcs between them with the intersection point.
    /// Returns the number of loops cut.
    pub fn remove_self_intersections(&mut self) -> usize {
        let mut cuts = 0;
        // Each cut strictly shrinks the ring, so this terminates; the cap
        // guards against degenerate floating-point cycling.
        let max_passes = self.vertices.len().max(16);
        for _ in 0..max_passes {
            match self.first_crossing() {
                Some((i, j, x)) => {
                    self.cut_loop(i, j, x);
                    cuts += 1;
                }
                None => break,
            }
        }
        cuts
    }

    fn first_crossing(&self) -> Option<(usize, usize, Point2<f64>)> {
        let n = self.vertices.len();
        if n < 4 {
            return None;
        }
        for i in 0..n {
            for j in (i + 2)..n {
                if i == 0 && j == n - 1 {
                    continue; // adjacent through the closing edge
                }
                let x = segment_intersection(
                    self.pos(i),
                    self.pos((i + 1) % n),
                    self.pos(j),
                    self.pos((j + 1) % n),
                );
                if let Some(x) = x {
                    return Some((i, j, x));
                }
            }
        }
        None
    }

    fn cut_loop(&mut self, i: usize, j: usize, x: Point2<f64>) {
        let n = self.vertices.len();
        let inner = j - i; // vertices i+1..=j
        let outer = n - inner;
        if inner <= outer {
            for v in &mut self.vertices[i + 1..=j] {
                v.active = false;
            }
        } else {
            for v in &mut self.vertices[j + 1..] {
                v.active = false;
            }
            for v in &mut self.vertices[..=i] {
                v.active = false;
            }
        }
        self.vertices.insert(j + 1, FireVertex::at(x));
        self.vertices.retain(|v| v.active);
    }
}

fn edge_normal(p: Point2<f64>, q: Point2<f64>) -> Vector2<f64> {
    let d = q - p;
    let len = d.norm();
    if len < EPS {
        Vector2::zeros()
    } else {
        // Right-hand normal: outward for a counter-clockwise ring
        Vector2::new(d.y, -d.x) / len
    }
}

/// Proper interior crossing of two segments, if any.
fn segment_intersection(
    p1: Point2<f64>,
    p2: Point2<f64>,
    p3: Point2<f64>,
    p4: Point2<f64>,
) -> Option<Point2<f64>> {
    let d1 = p2 - p1;
    let d2 = p4 - p3;
    let denom = d1.x * d2.y - d1.y * d2.x;
    if denom.abs() < EPS {
        return None; // parallel or collinear
    }
    let w = p3 - p1;
    let t = (w.x * d2.y - w.y * d2.x) / denom;
    let u = (w.x * d1.y - w.y * d1.x) / denom;
    if t > EPS && t < 1.0 - EPS && u > EPS && u < 1.0 - EPS {
        Some(p1 + d1 * t)
    } else {
        None
    }
}
