// Copyright 2025 Lars Brubaker
// Uniform bucket grid for point-in-triangle queries.

use super::{FaceIdx, Mesh};
use crate::geom::{orient, Point2, Real};

/// Faces bucketed by bounding box so a query only tests a handful of
/// triangles.  Built once after refinement; the mesh must not change after.
#[derive(Clone, Debug, Default)]
pub struct FaceGrid {
    origin: Point2,
    cell: Real,
    cols: usize,
    rows: usize,
    buckets: Vec<Vec<FaceIdx>>,
    tris: Vec<[Point2; 3]>,
    tolerance: Real,
}

impl FaceGrid {
    pub fn build(mesh: &Mesh) -> FaceGrid {
        let tris: Vec<[Point2; 3]> = mesh.face_ids().map(|f| mesh.face_points(f)).collect();
        if tris.is_empty() {
            return FaceGrid::default();
        }

        let mut lo = Point2::new(Real::INFINITY, Real::INFINITY);
        let mut hi = Point2::new(Real::NEG_INFINITY, Real::NEG_INFINITY);
        let mut longest2: Real = 0.0;
        for t in &tris {
            for k in 0..3 {
                let p = t[k];
                lo = Point2::new(lo.x.min(p.x), lo.y.min(p.y));
                hi = Point2::new(hi.x.max(p.x), hi.y.max(p.y));
                longest2 = longest2.max(p.dist2(t[(k + 1) % 3]));
            }
        }

        let w = (hi.x - lo.x).max(1.0);
        let h = (hi.y - lo.y).max(1.0);
        let cell = ((w * h) / tris.len() as Real).sqrt().max(1e-6);
        let cols = ((w / cell).floor() as usize + 1).min(4096);
        let rows = ((h / cell).floor() as usize + 1).min(4096);
        let cell = (w / cols as Real).max(h / rows as Real).max(cell);

        let mut grid = FaceGrid {
            origin: lo,
            cell,
            cols,
            rows,
            buckets: vec![Vec::new(); cols * rows],
            tris,
            tolerance: -1e-10 * longest2.max(1.0),
        };

        for (f, t) in grid.tris.iter().enumerate() {
            let min_x = t[0].x.min(t[1].x).min(t[2].x);
            let max_x = t[0].x.max(t[1].x).max(t[2].x);
            let min_y = t[0].y.min(t[1].y).min(t[2].y);
            let max_y = t[0].y.max(t[1].y).max(t[2].y);
            let (c0, r0) = grid.cell_of(Point2::new(min_x, min_y));
            let (c1, r1) = grid.cell_of(Point2::new(max_x, max_y));
            for r in r0..=r1 {
                for c in c0..=c1 {
                    grid.buckets[r * grid.cols + c].push(f as FaceIdx);
                }
            }
        }
        grid
    }

    fn cell_of(&self, p: Point2) -> (usize, usize) {
        let c = ((p.x - self.origin.x) / self.cell).floor();
        let r = ((p.y - self.origin.y) / self.cell).floor();
        let c = c.clamp(0.0, (self.cols - 1) as Real) as usize;
        let r = r.clamp(0.0, (self.rows - 1) as Real) as usize;
        (c, r)
    }

    /// First face (in face order) whose closed triangle contains p.
    pub fn locate(&self, p: Point2) -> Option<FaceIdx> {
        if self.tris.is_empty() || !p.x.is_finite() || !p.y.is_finite() {
            return None;
        }
        let (c, r) = self.cell_of(p);
        self.buckets[r * self.cols + c]
            .iter()
            .copied()
            .find(|&f| self.contains(f, p))
    }

    pub fn triangle(&self, f: FaceIdx) -> [Point2; 3] {
        self.tris[f as usize]
    }

    pub fn len(&self) -> usize {
        self.tris.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tris.is_empty()
    }

    fn contains(&self, f: FaceIdx, p: Point2) -> bool {
        let [a, b, c] = self.tris[f as usize];
        orient(a, b, p) >= self.tolerance
            && orient(b, c, p) >= self.tolerance
            && orient(c, a, p) >= self.tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locates_interior_edge_and_vertex_points() {
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ];
        let mesh = Mesh::from_triangles(&pts, &[[0, 1, 2], [0, 2, 3]]).unwrap();
        let grid = FaceGrid::build(&mesh);
        assert_eq!(grid.len(), 2);

        assert_eq!(grid.locate(Point2::new(8.0, 2.0)), Some(0));
        assert_eq!(grid.locate(Point2::new(2.0, 8.0)), Some(1));
        // On the shared diagonal either face is acceptable.
        assert!(grid.locate(Point2::new(5.0, 5.0)).is_some());
        for p in pts {
            assert!(grid.locate(p).is_some(), "corner {:?} not found", p);
        }
        assert_eq!(grid.locate(Point2::new(11.0, 5.0)), None);
        assert_eq!(grid.locate(Point2::new(-0.5, -0.5)), None);
    }

    #[test]
    fn empty_mesh_finds_nothing() {
        let grid = FaceGrid::build(&Mesh::new());
        assert!(grid.is_empty());
        assert_eq!(grid.locate(Point2::new(0.0, 0.0)), None);
    }
}
