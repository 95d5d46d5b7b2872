// Copyright 2025 Lars Brubaker
// Tests for AdaptiveMesh construction, refinement and point location.

mod helpers;

use image::{GrayImage, Luma};
use mvc_clone::geom::on_segment;
use mvc_clone::{extract_boundary, AdaptiveMesh, CloneError, MeshCriteria, Point2};

fn build(boundary: &[Point2]) -> AdaptiveMesh {
    let mut mesh = AdaptiveMesh::new();
    mesh.create_mesh(boundary)
        .unwrap_or_else(|e| panic!("create_mesh failed: {}", e));
    mesh
}

fn disc_mask(size: u32, radius: f64) -> GrayImage {
    let c = size as f64 / 2.0;
    GrayImage::from_fn(size, size, |x, y| {
        let dx = x as f64 - c;
        let dy = y as f64 - c;
        if dx * dx + dy * dy <= radius * radius {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Every constrained edge must lie on one input boundary segment.
fn assert_constraints_on_boundary(mesh: &AdaptiveMesh, boundary: &[Point2]) {
    let n = boundary.len();
    let mut perimeter = 0.0;
    for (a, b) in mesh.constrained_edges() {
        let on_some = (0..n).any(|i| {
            let s = boundary[i];
            let t = boundary[(i + 1) % n];
            on_segment(s, t, a) && on_segment(s, t, b)
        });
        assert!(on_some, "constrained edge {:?} -> {:?} is off the boundary", a, b);
        perimeter += a.dist(b);
    }
    let expected: f64 = (0..n).map(|i| boundary[i].dist(boundary[(i + 1) % n])).sum();
    assert!(
        (perimeter - expected).abs() < 1e-9,
        "constrained length {} != boundary length {}",
        perimeter,
        expected
    );
}

#[test]
fn square_mesh_is_valid() {
    let boundary = helpers::square(64);
    let mesh = build(&boundary);
    helpers::verify_valid_mesh(&mesh, &boundary);
    assert_constraints_on_boundary(&mesh, &boundary);
    assert!(mesh.vertex_count() > boundary.len(), "64px square should be refined");
}

#[test]
fn vertices_start_with_the_boundary() {
    let boundary = helpers::l_shape();
    let mesh = build(&boundary);
    let verts = mesh.vertices();
    assert_eq!(&verts[..boundary.len()], boundary.as_slice());
    for p in &boundary {
        assert!(mesh.face(*p).is_ok(), "boundary vertex {:?} not located", p);
    }
}

#[test]
fn non_convex_polygon_is_covered_exactly() {
    let boundary = helpers::l_shape();
    let mesh = build(&boundary);
    helpers::verify_valid_mesh(&mesh, &boundary);
    assert_constraints_on_boundary(&mesh, &boundary);
    // The notch is outside the mesh.
    assert!(matches!(
        mesh.face(Point2::new(30.0, 30.0)),
        Err(CloneError::PointNotFound { .. })
    ));
}

#[test]
fn clockwise_boundary_is_accepted() {
    let mut boundary = helpers::l_shape();
    boundary.reverse();
    let mesh = build(&boundary);
    helpers::verify_valid_mesh(&mesh, &boundary);
    assert_eq!(&mesh.vertices()[..boundary.len()], boundary.as_slice());
}

#[test]
fn create_mesh_is_idempotent() {
    let boundary = helpers::l_shape();
    let mut mesh = AdaptiveMesh::new();
    mesh.create_mesh(&boundary).unwrap();
    let first_verts = mesh.vertices();
    let first_edges = mesh.constrained_edges();
    mesh.create_mesh(&boundary).unwrap();
    assert_eq!(mesh.vertices(), first_verts);
    assert_eq!(mesh.constrained_edges(), first_edges);
    assert_eq!(build(&boundary).vertices(), first_verts);
}

#[test]
fn vertices_are_a_copy() {
    let mut mesh = AdaptiveMesh::new();
    mesh.create_mesh(&helpers::square(40)).unwrap();
    let before = mesh.vertices();
    mesh.create_mesh(&helpers::square(10)).unwrap();
    assert!(before.len() > mesh.vertex_count());
    assert_eq!(before[..4], helpers::square(40)[..]);
}

#[test]
fn smaller_size_bound_gives_finer_mesh() {
    let boundary = helpers::square(48);
    let coarse = build(&boundary);
    let mut fine = AdaptiveMesh::with_criteria(MeshCriteria::default().with_size_bound(6.0));
    fine.create_mesh(&boundary).unwrap();
    helpers::verify_valid_mesh(&fine, &boundary);
    assert!(fine.vertex_count() > coarse.vertex_count());
    for t in fine.triangles() {
        let longest = t.a.dist(t.b).max(t.b.dist(t.c)).max(t.c.dist(t.a));
        let shortest = t.a.dist(t.b).min(t.b.dist(t.c)).min(t.c.dist(t.a));
        assert!(
            longest <= 6.0 + 1e-9 || shortest < 0.5,
            "triangle {:?} exceeds the size bound",
            t
        );
    }
}

#[test]
fn traced_disc_locates_every_interior_pixel() {
    let mask = disc_mask(48, 18.0);
    let boundary = extract_boundary(&mask, 0).unwrap();
    let mesh = build(&boundary);
    helpers::verify_valid_mesh(&mesh, &boundary);
    assert_constraints_on_boundary(&mesh, &boundary);

    let interior = helpers::interior_pixels(48, 48, &boundary);
    assert!(!interior.is_empty());
    for (x, y) in interior {
        let p = Point2::new(x as f64, y as f64);
        let t = mesh
            .face(p)
            .unwrap_or_else(|e| panic!("pixel ({}, {}) not located: {}", x, y, e));
        let w = t.barycentric(p).unwrap();
        assert!(w.iter().all(|&c| c >= -1e-9), "pixel ({}, {}) weights {:?}", x, y, w);
    }
}

#[test]
fn invalid_boundaries_are_rejected() {
    let mut mesh = AdaptiveMesh::new();
    let bow_tie = helpers::polygon(&[(0, 0), (10, 10), (10, 0), (0, 10)]);
    assert!(matches!(
        mesh.create_mesh(&bow_tie),
        Err(CloneError::InvalidBoundary { .. })
    ));
    let repeated = helpers::polygon(&[(0, 0), (10, 0), (10, 10), (10, 0)]);
    assert!(mesh.create_mesh(&repeated).is_err());
    assert!(mesh.create_mesh(&helpers::square(10)[..2]).is_err());
}
