// Copyright 2025 Lars Brubaker
// Ear-clipping triangulation of a simple polygon.

use super::VertIdx;
use crate::error::{CloneError, Result};
use crate::geom::{orient, polygon_signed_area, Point2};

/// Closed-triangle containment, used to reject ears that swallow a vertex.
fn in_closed_triangle(a: Point2, b: Point2, c: Point2, p: Point2) -> bool {
    orient(a, b, p) >= 0.0 && orient(b, c, p) >= 0.0 && orient(c, a, p) >= 0.0
}

/// Triangulate a simple polygon given in either orientation.
///
/// Triangles index into `poly` and are always counter-clockwise.  Collinear
/// runs are tolerated; a polygon that never yields an ear (self-touching or
/// fully degenerate) is reported as an invalid boundary.
pub fn triangulate_polygon(poly: &[Point2]) -> Result<Vec<[VertIdx; 3]>> {
    let n = poly.len();
    if n < 3 {
        return Err(CloneError::invalid_boundary(format!(
            "polygon has {} points, need at least 3",
            n
        )));
    }
    let area = polygon_signed_area(poly);
    if area == 0.0 {
        return Err(CloneError::invalid_boundary("polygon has zero area"));
    }

    // Work on a CCW ordering.
    let order: Vec<VertIdx> = if area > 0.0 {
        (0..n as VertIdx).collect()
    } else {
        (0..n as VertIdx).rev().collect()
    };
    let mut prev: Vec<usize> = (0..n).map(|i| (i + n - 1) % n).collect();
    let mut next: Vec<usize> = (0..n).map(|i| (i + 1) % n).collect();
    let pt = |slot: usize| poly[order[slot] as usize];

    let mut tris = Vec::with_capacity(n - 2);
    let mut remaining = n;
    let mut cur = 0usize;
    let mut stall = 0usize;

    while remaining > 3 {
        let p = prev[cur];
        let q = next[cur];
        let (a, b, c) = (pt(p), pt(cur), pt(q));

        let mut is_ear = orient(a, b, c) > 0.0;
        if is_ear {
            let mut k = next[q];
            while k != p {
                let v = pt(k);
                // Coincident copies of the ear's own corners do not block it.
                if v != a && v != b && v != c && in_closed_triangle(a, b, c, v) {
                    is_ear = false;
                    break;
                }
                k = next[k];
            }
        }

        if is_ear {
            tris.push([order[p], order[cur], order[q]]);
            next[p] = q;
            prev[q] = p;
            remaining -= 1;
            stall = 0;
            cur = q;
        } else {
            stall += 1;
            // A full lap without an ear.
            if stall > remaining {
                return Err(CloneError::invalid_boundary(
                    "polygon is not simple (no ear found)",
                ));
            }
            cur = q;
        }
    }

    let p = prev[cur];
    let q = next[cur];
    if orient(pt(p), pt(cur), pt(q)) > 0.0 {
        tris.push([order[p], order[cur], order[q]]);
    } else {
        return Err(CloneError::invalid_boundary(
            "polygon leaves a degenerate final triangle",
        ));
    }
    Ok(tris)
}
