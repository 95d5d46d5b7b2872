// Copyright 2025 Lars Brubaker
// License: MIT
//
// Mean-value coordinates of a point with respect to a closed polygon.

use crate::error::{CloneError, Result};
use crate::geom::{signed_angle, Point2, Real};

/// Mean-value coordinates of `p` against `boundary`, one weight per boundary
/// vertex, summing to 1.
///
/// A point within `eps` of a boundary vertex gets the one-hot vector of the
/// first such vertex.  A point on a boundary edge (but on no vertex) gets
/// the linear weights of that edge's endpoints, which is the limit of the
/// general formula there.
pub fn mean_value_coordinates(p: Point2, boundary: &[Point2], eps: Real) -> Result<Vec<Real>> {
    let n = boundary.len();
    let mut weights = vec![0.0; n];

    if let Some(i) = boundary.iter().position(|q| q.dist(p) <= eps) {
        weights[i] = 1.0;
        return Ok(weights);
    }

    let dirs: Vec<Point2> = boundary.iter().map(|&q| q - p).collect();
    let dists: Vec<Real> = dirs.iter().map(|d| d.norm()).collect();

    for i in 0..n {
        let j = (i + 1) % n;
        let (a, b) = (dirs[i], dirs[j]);
        if a.cross(b).abs() <= eps * dists[i].max(dists[j]) && a.dot(b) < 0.0 {
            let len = dists[i] + dists[j];
            weights[i] = dists[j] / len;
            weights[j] = dists[i] / len;
            return Ok(weights);
        }
    }

    // tan(angle/2) of the wedge between consecutive vertices, seen from p.
    let half_tan: Vec<Real> = (0..n)
        .map(|i| (signed_angle(dirs[i], dirs[(i + 1) % n]) / 2.0).tan())
        .collect();

    let mut total = 0.0;
    for i in 0..n {
        let prev = half_tan[(i + n - 1) % n];
        let next = half_tan[i];
        let w = (prev + next) / dists[i];
        weights[i] = w;
        total += w;
    }

    if total == 0.0 || !total.is_finite() {
        return Err(CloneError::DegenerateWeight {
            x: p.x,
            y: p.y,
            total,
        });
    }
    for w in &mut weights {
        *w /= total;
    }
    Ok(weights)
}
