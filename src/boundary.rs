// Copyright 2025 Lars Brubaker
// License: MIT
//
// Boundary polygon of a mask region: Moore-neighbour contour tracing plus the
// simplicity checks every polygon goes through before it is meshed.

use std::collections::HashSet;

use image::GrayImage;
use tracing::debug;

use crate::error::{CloneError, Result};
use crate::geom::{orient, polygon_signed_area, segments_intersect, Point2, PointKey};

/// 8-neighbour offsets, clockwise on screen (y down), starting west.
const DIRS: [(i64, i64); 8] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
];

fn dir_index(dx: i64, dy: i64) -> usize {
    DIRS.iter()
        .position(|&d| d == (dx, dy))
        .unwrap_or(0)
}

struct Foreground<'a> {
    mask: &'a GrayImage,
    threshold: u8,
}

impl Foreground<'_> {
    fn at(&self, x: i64, y: i64) -> bool {
        let (w, h) = self.mask.dimensions();
        x >= 0
            && y >= 0
            && x < w as i64
            && y < h as i64
            && self.mask.get_pixel(x as u32, y as u32)[0] > self.threshold
    }
}

/// Trace the outer contour of the first foreground region of `mask`.
///
/// Foreground is any value above `threshold`.  The region found first in
/// raster order is traced with Moore-neighbour tracing and one point per
/// contour pixel is returned, in the reverse of the tracing order.
pub fn extract_boundary(mask: &GrayImage, threshold: u8) -> Result<Vec<Point2>> {
    let (width, height) = mask.dimensions();
    let fg = Foreground { mask, threshold };

    let start = (0..height as i64)
        .flat_map(|y| (0..width as i64).map(move |x| (x, y)))
        .find(|&(x, y)| fg.at(x, y))
        .ok_or_else(|| CloneError::InvalidMask {
            reason: format!("no pixel above {} in the {}x{} mask", threshold, width, height),
        })?;

    // The raster-first pixel always has background to its west.
    let mut contour = vec![start];
    let mut cur = start;
    let mut back = 0usize;
    let limit = 4 * (width as usize) * (height as usize) + 8;

    for _ in 0..limit {
        let found = (1..=8).map(|k| (back + k) % 8).find_map(|d| {
            let n = (cur.0 + DIRS[d].0, cur.1 + DIRS[d].1);
            fg.at(n.0, n.1).then_some((d, n))
        });
        let Some((dir, next)) = found else {
            break;
        };
        // Last background pixel checked becomes the backtrack of `next`.
        let checked = DIRS[(dir + 7) % 8];
        let pc = (cur.0 + checked.0, cur.1 + checked.1);
        back = dir_index(pc.0 - next.0, pc.1 - next.1);

        if cur == start && contour.len() >= 2 && next == contour[1] {
            break;
        }
        contour.push(next);
        cur = next;
    }
    if contour.len() > 1 && contour.last() == Some(&start) {
        contour.pop();
    }

    if contour.len() < 3 {
        return Err(CloneError::invalid_boundary(format!(
            "mask contour has {} points, need at least 3",
            contour.len()
        )));
    }

    contour.reverse();
    debug!(points = contour.len(), "traced mask boundary");
    Ok(contour
        .into_iter()
        .map(|(x, y)| Point2::new(x as f64, y as f64))
        .collect())
}

/// Check that `poly` is a simple polygon with at least three distinct points.
pub fn validate_boundary(poly: &[Point2]) -> Result<()> {
    let n = poly.len();
    if n < 3 {
        return Err(CloneError::invalid_boundary(format!(
            "boundary has {} points, need at least 3",
            n
        )));
    }
    if let Some(i) = poly.iter().position(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(CloneError::invalid_boundary(format!(
            "boundary point {} is not finite",
            i
        )));
    }

    let mut seen: HashSet<PointKey> = HashSet::with_capacity(n);
    for (i, p) in poly.iter().enumerate() {
        if !seen.insert(p.key()) {
            return Err(CloneError::invalid_boundary(format!(
                "boundary point {} ({}, {}) repeats an earlier point",
                i, p.x, p.y
            )));
        }
    }
    if polygon_signed_area(poly) == 0.0 {
        return Err(CloneError::invalid_boundary("boundary encloses no area"));
    }

    // Adjacent segments may only fold back onto each other.
    for i in 0..n {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        let c = poly[(i + 2) % n];
        if orient(a, b, c) == 0.0 && (b - a).dot(c - b) < 0.0 {
            return Err(CloneError::invalid_boundary(format!(
                "boundary folds back on itself at point {}",
                (i + 1) % n
            )));
        }
    }

    let bbox = |i: usize| {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        (a.x.min(b.x), a.x.max(b.x), a.y.min(b.y), a.y.max(b.y))
    };
    let boxes: Vec<_> = (0..n).map(bbox).collect();
    for i in 0..n {
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let (ax0, ax1, ay0, ay1) = boxes[i];
            let (bx0, bx1, by0, by1) = boxes[j];
            if ax1 < bx0 || bx1 < ax0 || ay1 < by0 || by1 < ay0 {
                continue;
            }
            if segments_intersect(poly[i], poly[(i + 1) % n], poly[j], poly[(j + 1) % n]) {
                return Err(CloneError::invalid_boundary(format!(
                    "boundary edges {} and {} intersect",
                    i, j
                )));
            }
        }
    }
    Ok(())
}
