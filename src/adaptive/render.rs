// Copyright 2025 Lars Brubaker
// Mesh overlay for diagnostics.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;

use super::AdaptiveMesh;

/// Edge color of the overlay.
pub const MESH_EDGE_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

impl AdaptiveMesh {
    /// Copy of `backdrop` with every triangulation edge drawn on top.
    pub fn render(&self, backdrop: &RgbImage) -> RgbImage {
        let mut canvas = backdrop.clone();
        let mesh = &self.mesh;
        for e in mesh.edge_ids() {
            let a = mesh.org_point(e);
            let b = mesh.dst_point(e);
            draw_line_segment_mut(
                &mut canvas,
                (a.x as f32, a.y as f32),
                (b.x as f32, b.y as f32),
                MESH_EDGE_COLOR,
            );
        }
        canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point2;

    #[test]
    fn draws_boundary_edges() {
        let mut mesh = AdaptiveMesh::new();
        let square: Vec<Point2> = [(2, 2), (12, 2), (12, 12), (2, 12)]
            .into_iter()
            .map(Point2::from)
            .collect();
        mesh.create_mesh(&square).unwrap();
        let backdrop = RgbImage::new(16, 16);
        let out = mesh.render(&backdrop);
        assert_eq!(out.dimensions(), (16, 16));
        assert_eq!(*out.get_pixel(7, 2), MESH_EDGE_COLOR);
        assert_eq!(*out.get_pixel(2, 7), MESH_EDGE_COLOR);
        assert_eq!(*out.get_pixel(0, 0), Rgb([0, 0, 0]));
        // Backdrop is untouched.
        assert_eq!(*backdrop.get_pixel(7, 2), Rgb([0, 0, 0]));
    }
}
