// Copyright 2025 Lars Brubaker
// License: MIT
//
// AdaptiveMesh: a quality-refined constrained Delaunay triangulation of one
// boundary polygon, with point location and a vertex list.

mod render;

use tracing::debug;

use crate::boundary::validate_boundary;
use crate::config::MeshCriteria;
use crate::error::{CloneError, Result};
use crate::geom::{barycentric, Point2, Real};
use crate::mesh::locate::FaceGrid;
use crate::mesh::{triangulate_polygon, Mesh, RefineStats, VertIdx};

/// A mesh triangle, counter-clockwise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub a: Point2,
    pub b: Point2,
    pub c: Point2,
}

impl Triangle {
    pub fn points(&self) -> [Point2; 3] {
        [self.a, self.b, self.c]
    }

    /// Barycentric weights of p with respect to (a, b, c).
    pub fn barycentric(&self, p: Point2) -> Option<[Real; 3]> {
        barycentric(&self.points(), p)
    }
}

impl From<[Point2; 3]> for Triangle {
    fn from(t: [Point2; 3]) -> Self {
        Triangle {
            a: t[0],
            b: t[1],
            c: t[2],
        }
    }
}

/// Refined triangulation of a boundary polygon.
#[derive(Clone, Debug, Default)]
pub struct AdaptiveMesh {
    criteria: MeshCriteria,
    mesh: Mesh,
    grid: FaceGrid,
    vertices: Vec<Point2>,
    stats: RefineStats,
}

impl AdaptiveMesh {
    /// Create an empty mesh with the default criteria.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_criteria(criteria: MeshCriteria) -> Self {
        Self {
            criteria,
            ..Self::default()
        }
    }

    pub fn criteria(&self) -> &MeshCriteria {
        &self.criteria
    }

    /// Rebuild the mesh from `boundary`.
    ///
    /// Every boundary point becomes a vertex and every boundary edge
    /// (including last to first) a constrained edge; the triangulation is
    /// then refined until the criteria hold.  On error the mesh is left
    /// empty.
    pub fn create_mesh(&mut self, boundary: &[Point2]) -> Result<()> {
        self.mesh = Mesh::new();
        self.grid = FaceGrid::default();
        self.vertices.clear();
        self.stats = RefineStats::default();

        self.criteria.validate()?;
        validate_boundary(boundary)?;

        let tris = triangulate_polygon(boundary)?;
        let mut mesh = Mesh::from_triangles(boundary, &tris)?;
        let n = boundary.len();
        for i in 0..n {
            let (a, b) = (i as VertIdx, ((i + 1) % n) as VertIdx);
            if !mesh.constrain(a, b) {
                return Err(CloneError::invalid_boundary(format!(
                    "boundary edge {} is missing from the triangulation",
                    i
                )));
            }
        }
        mesh.refine_delaunay();
        let stats = mesh.refine_quality(&self.criteria);

        self.vertices = mesh.verts.iter().map(|v| v.p).collect();
        self.grid = FaceGrid::build(&mesh);
        self.mesh = mesh;
        self.stats = stats;

        debug!(
            boundary = n,
            vertices = self.vertices.len(),
            faces = self.mesh.faces.len(),
            steiner = self.stats.steiner_points(),
            "adaptive mesh created"
        );
        Ok(())
    }

    /// Triangle containing `p` (edges and corners count as inside).
    pub fn face(&self, p: Point2) -> Result<Triangle> {
        if self.grid.is_empty() {
            return Err(CloneError::EmptyMesh);
        }
        self.grid
            .locate(p)
            .map(|f| Triangle::from(self.grid.triangle(f)))
            .ok_or(CloneError::PointNotFound { x: p.x, y: p.y })
    }

    /// All mesh vertices: the boundary points in input order, then Steiner
    /// points in insertion order.
    pub fn vertices(&self) -> Vec<Point2> {
        self.vertices.clone()
    }

    pub fn triangles(&self) -> Vec<Triangle> {
        self.mesh
            .face_ids()
            .map(|f| Triangle::from(self.mesh.face_points(f)))
            .collect()
    }

    /// Boundary sub-segments, each once.
    pub fn constrained_edges(&self) -> Vec<(Point2, Point2)> {
        self.mesh
            .edge_ids()
            .filter(|&e| self.mesh.edges[e as usize].constrained)
            .map(|e| (self.mesh.org_point(e), self.mesh.dst_point(e)))
            .collect()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.mesh.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mesh.faces.is_empty()
    }

    pub fn stats(&self) -> RefineStats {
        self.stats
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }
}
