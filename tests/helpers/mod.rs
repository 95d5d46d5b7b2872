// Copyright 2025 Lars Brubaker
// Shared test utilities for mvc-clone tests.

#![allow(dead_code)]

use image::{GrayImage, Luma, Rgb, RgbImage};
use mvc_clone::geom::{bounded_side, orient, BoundedSide};
use mvc_clone::{AdaptiveMesh, Point2, Real};

/// Polygon from integer pixel coordinates.
pub fn polygon(points: &[(i32, i32)]) -> Vec<Point2> {
    points.iter().copied().map(Point2::from).collect()
}

pub fn square(side: i32) -> Vec<Point2> {
    polygon(&[(0, 0), (side, 0), (side, side), (0, side)])
}

/// An L-shaped (non-convex) polygon.
pub fn l_shape() -> Vec<Point2> {
    polygon(&[(0, 0), (40, 0), (40, 16), (16, 16), (16, 40), (0, 40)])
}

/// Signed area of a triangle given 3 vertices (2D).
pub fn triangle_area(a: Point2, b: Point2, c: Point2) -> Real {
    0.5 * orient(a, b, c)
}

/// Compute total absolute area of all mesh triangles.
pub fn total_mesh_area(mesh: &AdaptiveMesh) -> Real {
    mesh.triangles()
        .iter()
        .map(|t| triangle_area(t.a, t.b, t.c).abs())
        .sum()
}

pub fn polygon_area(poly: &[Point2]) -> Real {
    mvc_clone::geom::polygon_signed_area(poly).abs()
}

/// Verify that a created mesh is structurally sound: valid half-edge
/// topology, positive triangles, and the whole polygon covered.
pub fn verify_valid_mesh(mesh: &AdaptiveMesh, boundary: &[Point2]) {
    assert!(mesh.mesh().is_valid(), "half-edge structure is inconsistent");
    for (i, t) in mesh.triangles().iter().enumerate() {
        assert!(
            orient(t.a, t.b, t.c) > 0.0,
            "triangle {} is not counter-clockwise: {:?}",
            i,
            t
        );
    }
    let mesh_area = total_mesh_area(mesh);
    let poly_area = polygon_area(boundary);
    assert!(
        (mesh_area - poly_area).abs() < 1e-6 * poly_area.max(1.0),
        "mesh area {} differs from polygon area {}",
        mesh_area,
        poly_area
    );
}

/// Mask with 255 on every integer point inside or on `poly`.
pub fn polygon_mask(width: u32, height: u32, poly: &[Point2]) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        let p = Point2::new(x as Real, y as Real);
        if bounded_side(poly, p) == BoundedSide::Outside {
            Luma([0])
        } else {
            Luma([255])
        }
    })
}

pub fn solid(width: u32, height: u32, color: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(color))
}

/// Smooth color ramp, so every pixel differs from its neighbours.
pub fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 7 % 256) as u8,
            (y * 5 % 256) as u8,
            ((x + y) * 3 % 256) as u8,
        ])
    })
}

/// Integer points strictly inside `poly`, clipped to `width` x `height`.
pub fn interior_pixels(width: u32, height: u32, poly: &[Point2]) -> Vec<(u32, u32)> {
    let mut out = Vec::new();
    for y in 0..height {
        for x in 0..width {
            let p = Point2::new(x as Real, y as Real);
            if bounded_side(poly, p) == BoundedSide::Inside {
                out.push((x, y));
            }
        }
    }
    out
}
