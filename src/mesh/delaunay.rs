// Copyright 2025 Lars Brubaker
// Lawson flipping for the constrained Delaunay property.

use super::{EdgeIdx, FaceIdx, Mesh};
use crate::geom::{in_circle, orient};

impl Mesh {
    /// Check if an edge is locally Delaunay.  Boundary and constrained edges
    /// always are.
    pub fn edge_is_locally_delaunay(&self, e: EdgeIdx) -> bool {
        if !self.edge_is_internal(e) || self.edges[e as usize].constrained {
            return true;
        }
        let a = self.org_point(e);
        let b = self.dst_point(e);
        let c = self.org_point(self.lprev(e));
        let d = self.org_point(self.lprev(e ^ 1));
        in_circle(a, b, c, d) <= 0.0
    }

    /// Both triangles stay counter-clockwise after flipping e.
    fn flip_is_convex(&self, e: EdgeIdx) -> bool {
        let a = self.org_point(e);
        let b = self.dst_point(e);
        let c = self.org_point(self.lprev(e));
        let d = self.org_point(self.lprev(e ^ 1));
        orient(c, d, b) > 0.0 && orient(d, c, a) > 0.0
    }

    /// Refine a valid triangulation into a Constrained Delaunay Triangulation.
    pub fn refine_delaunay(&mut self) {
        let all: Vec<EdgeIdx> = self.edge_ids().collect();
        self.legalize(all);
    }

    /// Flip edges from `seeds` (and whatever they expose) until every
    /// examined edge is locally Delaunay.  Returns the faces that changed.
    pub fn legalize(&mut self, seeds: impl IntoIterator<Item = EdgeIdx>) -> Vec<FaceIdx> {
        let mut stack: Vec<EdgeIdx> = Vec::new();
        for e in seeds {
            if !self.edges[e as usize].mark && self.edge_is_internal(e) {
                self.edges[e as usize].mark = true;
                self.edges[(e ^ 1) as usize].mark = true;
                stack.push(e);
            }
        }

        let mut touched: Vec<FaceIdx> = Vec::new();
        let max_iter = stack.len() * stack.len() + 4 * self.edges.len() + 16;
        let mut iter = 0;

        while let Some(e) = stack.pop() {
            self.edges[e as usize].mark = false;
            self.edges[(e ^ 1) as usize].mark = false;
            if iter >= max_iter {
                continue;
            }
            iter += 1;

            if !self.edge_is_locally_delaunay(e) && self.flip_is_convex(e) {
                let neighbors = [
                    self.lnext(e),
                    self.lprev(e),
                    self.lnext(e ^ 1),
                    self.lprev(e ^ 1),
                ];
                touched.push(self.edges[e as usize].lface);
                touched.push(self.rface(e));
                self.flip_edge(e);
                for &nb in &neighbors {
                    if !self.edges[nb as usize].mark && self.edge_is_internal(nb) {
                        self.edges[nb as usize].mark = true;
                        self.edges[(nb ^ 1) as usize].mark = true;
                        stack.push(nb);
                    }
                }
            }
        }

        touched.sort_unstable();
        touched.dedup();
        touched
    }
}

#[cfg(test)]
mod tests {
    use crate::geom::Point2;
    use crate::mesh::Mesh;

    #[test]
    fn thin_diagonal_gets_flipped() {
        // The 0-2 diagonal of this kite is the long one.
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, -0.5),
            Point2::new(4.0, 0.0),
            Point2::new(2.0, 0.5),
        ];
        let mut mesh = Mesh::from_triangles(&pts, &[[0, 1, 2], [0, 2, 3]]).unwrap();
        let diag = mesh.find_edge(0, 2).unwrap();
        assert!(!mesh.edge_is_locally_delaunay(diag));

        mesh.refine_delaunay();
        assert!(mesh.is_valid());
        assert!(mesh.find_edge(0, 2).is_none());
        for e in mesh.edge_ids() {
            assert!(mesh.edge_is_locally_delaunay(e), "edge {} not Delaunay", e);
        }
    }

    #[test]
    fn constrained_edge_is_never_flipped() {
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, -0.5),
            Point2::new(4.0, 0.0),
            Point2::new(2.0, 0.5),
        ];
        let mut mesh = Mesh::from_triangles(&pts, &[[0, 1, 2], [0, 2, 3]]).unwrap();
        assert!(mesh.constrain(0, 2));
        mesh.refine_delaunay();
        assert!(mesh.find_edge(0, 2).is_some());
    }
}
