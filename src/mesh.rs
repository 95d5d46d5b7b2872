// Copyright 2025 Lars Brubaker
// License: MIT
//
// Half-edge triangulation of a polygonal domain.
//
// Pointers are u32 indices into Vec arenas:
//   - INVALID: u32::MAX  (null pointer equivalent)
//   - Half-edges are allocated in pairs: edges[i] and edges[i^1] are always a
//     pair.  sym(e) = e ^ 1.
//   - A half-edge whose lface is INVALID lies on the outside of the domain.
//     Only interior half-edges keep an lnext ring; every face is a triangle
//     whose three half-edges run counter-clockwise (positive `orient`).
//
// Arenas only grow: splits reuse the split face and append new ones, flips
// reuse both faces and the flipped edge pair.

mod delaunay;
pub mod locate;
mod refine;
mod triangulate;

use std::collections::HashMap;

use crate::error::{CloneError, Result};
use crate::geom::{orient, Point2, Real};

pub use refine::RefineStats;
pub use triangulate::triangulate_polygon;

pub const INVALID: u32 = u32::MAX;

/// Index into Mesh::verts
pub type VertIdx = u32;
/// Index into Mesh::faces
pub type FaceIdx = u32;
/// Index into Mesh::edges
pub type EdgeIdx = u32;

/// Compute the symmetric half-edge index (always the other half of the pair).
#[inline(always)]
pub fn sym(e: EdgeIdx) -> EdgeIdx {
    e ^ 1
}

#[derive(Clone, Debug)]
pub struct Vertex {
    pub p: Point2,
    /// Some half-edge whose origin is this vertex.
    pub an_edge: EdgeIdx,
    /// True for vertices of the input polygon, false for Steiner points.
    pub input: bool,
}

#[derive(Clone, Debug)]
pub struct HalfEdge {
    /// Origin vertex index.
    pub org: VertIdx,
    /// Next edge CCW around the left face (INVALID outside the domain).
    pub lnext: EdgeIdx,
    /// Left face index (INVALID outside the domain).
    pub lface: FaceIdx,
    /// Boundary sub-segment; never flipped.
    pub constrained: bool,
    /// Queued for a Delaunay check.
    pub mark: bool,
}

impl Default for HalfEdge {
    fn default() -> Self {
        Self {
            org: INVALID,
            lnext: INVALID,
            lface: INVALID,
            constrained: false,
            mark: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Face {
    pub an_edge: EdgeIdx,
}

/// The half-edge triangulation.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub verts: Vec<Vertex>,
    pub faces: Vec<Face>,
    pub edges: Vec<HalfEdge>,
}

impl Mesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mesh from counter-clockwise triangles over `points`.
    ///
    /// Every point becomes an input vertex.  Fails if an oriented edge is
    /// used twice (the triangles are not a manifold triangulation).
    pub fn from_triangles(points: &[Point2], tris: &[[VertIdx; 3]]) -> Result<Mesh> {
        let mut m = Mesh {
            verts: points
                .iter()
                .map(|&p| Vertex {
                    p,
                    an_edge: INVALID,
                    input: true,
                })
                .collect(),
            faces: Vec::with_capacity(tris.len()),
            edges: Vec::with_capacity(tris.len() * 3 + 6),
        };

        let mut directed: HashMap<(VertIdx, VertIdx), EdgeIdx> = HashMap::new();
        for tri in tris {
            let f = m.faces.len() as FaceIdx;
            let mut ring = [INVALID; 3];
            for k in 0..3 {
                let a = tri[k];
                let b = tri[(k + 1) % 3];
                if directed.contains_key(&(a, b)) {
                    return Err(CloneError::invalid_boundary(format!(
                        "triangulation repeats oriented edge {}→{}",
                        a, b
                    )));
                }
                let e = match directed.get(&(b, a)) {
                    Some(&twin) => twin ^ 1,
                    None => m.make_edge_pair(a, b),
                };
                directed.insert((a, b), e);
                ring[k] = e;
            }
            m.faces.push(Face { an_edge: ring[0] });
            m.link_face(f, ring);
            for &e in &ring {
                let org = m.edges[e as usize].org;
                m.verts[org as usize].an_edge = e;
            }
        }
        Ok(m)
    }

    // ──────────────── Navigation helpers ────────────────

    /// Destination vertex of e (= org of Sym).
    #[inline]
    pub fn dst(&self, e: EdgeIdx) -> VertIdx {
        self.edges[(e ^ 1) as usize].org
    }

    /// Right face of e (= lface of Sym).
    #[inline]
    pub fn rface(&self, e: EdgeIdx) -> FaceIdx {
        self.edges[(e ^ 1) as usize].lface
    }

    #[inline]
    pub fn lnext(&self, e: EdgeIdx) -> EdgeIdx {
        self.edges[e as usize].lnext
    }

    /// Lprev: for a triangle this is Lnext applied twice.
    #[inline]
    pub fn lprev(&self, e: EdgeIdx) -> EdgeIdx {
        self.lnext(self.lnext(e))
    }

    #[inline]
    pub fn point(&self, v: VertIdx) -> Point2 {
        self.verts[v as usize].p
    }

    #[inline]
    pub fn org_point(&self, e: EdgeIdx) -> Point2 {
        self.point(self.edges[e as usize].org)
    }

    #[inline]
    pub fn dst_point(&self, e: EdgeIdx) -> Point2 {
        self.point(self.dst(e))
    }

    /// EdgeIsInternal: both sides of e are triangles of the domain.
    #[inline]
    pub fn edge_is_internal(&self, e: EdgeIdx) -> bool {
        self.edges[e as usize].lface != INVALID && self.rface(e) != INVALID
    }

    /// The three half-edges of face f, starting at its anchor edge.
    #[inline]
    pub fn face_edges(&self, f: FaceIdx) -> [EdgeIdx; 3] {
        let e0 = self.faces[f as usize].an_edge;
        let e1 = self.lnext(e0);
        [e0, e1, self.lnext(e1)]
    }

    #[inline]
    pub fn face_verts(&self, f: FaceIdx) -> [VertIdx; 3] {
        self.face_edges(f).map(|e| self.edges[e as usize].org)
    }

    #[inline]
    pub fn face_points(&self, f: FaceIdx) -> [Point2; 3] {
        self.face_verts(f).map(|v| self.point(v))
    }

    /// Even half of every edge pair, i.e. each undirected edge once.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeIdx> + '_ {
        (0..self.edges.len() as EdgeIdx).step_by(2)
    }

    pub fn face_ids(&self) -> impl Iterator<Item = FaceIdx> {
        0..self.faces.len() as FaceIdx
    }

    pub fn num_steiner(&self) -> usize {
        self.verts.iter().filter(|v| !v.input).count()
    }

    /// Mark the edge between a and b as a constrained boundary sub-segment.
    /// Returns false if the two vertices are not joined by an edge.
    pub fn constrain(&mut self, a: VertIdx, b: VertIdx) -> bool {
        match self.find_edge(a, b) {
            Some(e) => {
                self.edges[e as usize].constrained = true;
                self.edges[(e ^ 1) as usize].constrained = true;
                true
            }
            None => false,
        }
    }

    /// Find a half-edge a→b by scanning the triangles around a.
    pub fn find_edge(&self, a: VertIdx, b: VertIdx) -> Option<EdgeIdx> {
        self.star(a).into_iter().find(|&e| self.dst(e) == b)
    }

    /// Every half-edge leaving v, in counter-clockwise order when the star
    /// is closed.
    pub fn star(&self, v: VertIdx) -> Vec<EdgeIdx> {
        let mut out = Vec::new();
        let start = self.verts[v as usize].an_edge;
        if start == INVALID {
            return out;
        }
        // The star may be open at the boundary, so walk it both ways.
        let mut e = start;
        loop {
            out.push(e);
            if self.edges[e as usize].lface == INVALID {
                break;
            }
            // Onext (CCW step around org): Sym of Lprev.
            e = self.lprev(e) ^ 1;
            if e == start {
                return out;
            }
        }
        let mut e = start;
        loop {
            let back = e ^ 1;
            if self.edges[back as usize].lface == INVALID {
                return out;
            }
            // Oprev: Lnext of Sym.
            e = self.lnext(back);
            out.push(e);
        }
    }

    /// Triangles incident to v.
    pub fn vertex_faces(&self, v: VertIdx) -> Vec<FaceIdx> {
        self.star(v)
            .into_iter()
            .map(|e| self.edges[e as usize].lface)
            .filter(|&f| f != INVALID)
            .collect()
    }

    // ──────────────────────── Private allocation helpers ─────────────────────

    /// Allocate a new half-edge pair a→b / b→a.  Returns the even index.
    fn make_edge_pair(&mut self, a: VertIdx, b: VertIdx) -> EdgeIdx {
        let e = self.edges.len() as EdgeIdx;
        self.edges.push(HalfEdge {
            org: a,
            ..HalfEdge::default()
        });
        self.edges.push(HalfEdge {
            org: b,
            ..HalfEdge::default()
        });
        e
    }

    fn make_vertex(&mut self, p: Point2) -> VertIdx {
        let v = self.verts.len() as VertIdx;
        self.verts.push(Vertex {
            p,
            an_edge: INVALID,
            input: false,
        });
        v
    }

    fn make_face(&mut self) -> FaceIdx {
        let f = self.faces.len() as FaceIdx;
        self.faces.push(Face { an_edge: INVALID });
        f
    }

    /// Close three half-edges into the Lnext ring of face f.
    fn link_face(&mut self, f: FaceIdx, ring: [EdgeIdx; 3]) {
        for k in 0..3 {
            let e = ring[k] as usize;
            self.edges[e].lnext = ring[(k + 1) % 3];
            self.edges[e].lface = f;
        }
        self.faces[f as usize].an_edge = ring[0];
    }

    // ──────────────────────── Public mesh operations ──────────────────────────

    /// Insert `p` strictly inside face f, splitting it into three.
    ///
    /// Returns the new vertex and the three old edges now opposite it.
    pub fn split_face(&mut self, f: FaceIdx, p: Point2) -> (VertIdx, [EdgeIdx; 3]) {
        let [e0, e1, e2] = self.face_edges(f);
        let [a, b, c] = self.face_verts(f);
        let v = self.make_vertex(p);

        let na = self.make_edge_pair(v, a);
        let nb = self.make_edge_pair(v, b);
        let nc = self.make_edge_pair(v, c);
        let f1 = self.make_face();
        let f2 = self.make_face();

        // (a, b, v), (b, c, v), (c, a, v)
        self.link_face(f, [e0, nb ^ 1, na]);
        self.link_face(f1, [e1, nc ^ 1, nb]);
        self.link_face(f2, [e2, na ^ 1, nc]);

        self.verts[v as usize].an_edge = na;
        (v, [e0, e1, e2])
    }

    /// Insert `p` on the interior of edge e, splitting the one or two
    /// adjacent faces.  Both halves of a constrained edge stay constrained.
    ///
    /// Returns the new vertex and the old edges now opposite it.
    pub fn split_edge(&mut self, e: EdgeIdx, p: Point2) -> (VertIdx, Vec<EdgeIdx>) {
        // Work from the side that carries a face.
        let e = if self.edges[e as usize].lface == INVALID { e ^ 1 } else { e };
        let es = e ^ 1;
        let f = self.edges[e as usize].lface;
        let g = self.edges[es as usize].lface;
        let constrained = self.edges[e as usize].constrained;

        let e1 = self.lnext(e);
        let e2 = self.lnext(e1);
        let a = self.edges[e as usize].org;
        let b = self.dst(e);
        let c = self.edges[e2 as usize].org;

        let v = self.make_vertex(p);
        // e keeps a→v, its twin becomes v→a; the new pair m is v→b / b→v.
        self.edges[es as usize].org = v;
        let m = self.make_edge_pair(v, b);
        self.edges[m as usize].constrained = constrained;
        self.edges[(m ^ 1) as usize].constrained = constrained;
        if self.verts[b as usize].an_edge == es {
            self.verts[b as usize].an_edge = m ^ 1;
        }
        self.verts[v as usize].an_edge = m;

        let mut opposite = vec![e1, e2];

        // Left side: (a, v, c) and (v, b, c).
        let q = self.make_edge_pair(v, c);
        let f_new = self.make_face();
        self.link_face(f, [e, q, e2]);
        self.link_face(f_new, [m, e1, q ^ 1]);

        if g != INVALID {
            let g1 = self.lnext(es);
            let g2 = self.lnext(g1);
            let d = self.edges[g2 as usize].org;
            // Right side: (v, a, d) and (b, v, d).
            let r = self.make_edge_pair(v, d);
            let g_new = self.make_face();
            self.link_face(g, [es, g1, r ^ 1]);
            self.link_face(g_new, [m ^ 1, r, g2]);
            opposite.push(g1);
            opposite.push(g2);
        }

        (v, opposite)
    }

    /// Flip an internal edge: the diagonal a–b of quad (a, d, b, c) becomes c–d.
    pub fn flip_edge(&mut self, edge: EdgeIdx) {
        let a0 = edge;
        let a1 = self.lnext(a0);
        let a2 = self.lnext(a1);
        let b0 = edge ^ 1;
        let b1 = self.lnext(b0);
        let b2 = self.lnext(b1);

        let a_org = self.edges[a0 as usize].org;
        let b_org = self.edges[b0 as usize].org;
        let a_opp = self.edges[a2 as usize].org;
        let b_opp = self.edges[b2 as usize].org;

        let fa = self.edges[a0 as usize].lface;
        let fb = self.edges[b0 as usize].lface;

        // a0: c→d, b0: d→c
        self.edges[a0 as usize].org = a_opp;
        self.edges[b0 as usize].org = b_opp;

        // (c, d, b) and (d, c, a)
        self.link_face(fa, [a0, b2, a1]);
        self.link_face(fb, [b0, a2, b1]);

        if self.verts[a_org as usize].an_edge == a0 {
            self.verts[a_org as usize].an_edge = b1;
        }
        if self.verts[b_org as usize].an_edge == b0 {
            self.verts[b_org as usize].an_edge = a1;
        }
    }

    /// Twice the signed area of face f.
    #[inline]
    pub fn face_orient(&self, f: FaceIdx) -> Real {
        let [a, b, c] = self.face_points(f);
        orient(a, b, c)
    }

    /// Structural self-check: rings close, twins agree, faces are CCW.
    pub fn is_valid(&self) -> bool {
        for f in self.face_ids() {
            let [e0, e1, e2] = self.face_edges(f);
            if self.lnext(e2) != e0 {
                return false;
            }
            for e in [e0, e1, e2] {
                if self.edges[e as usize].lface != f {
                    return false;
                }
                // Twin must start where e ends.
                if self.edges[(e ^ 1) as usize].org != self.edges[self.lnext(e) as usize].org {
                    return false;
                }
                if self.edges[e as usize].constrained != self.edges[(e ^ 1) as usize].constrained {
                    return false;
                }
            }
            if self.face_orient(f) <= 0.0 {
                return false;
            }
        }
        self.verts
            .iter()
            .enumerate()
            .all(|(i, v)| v.an_edge != INVALID && self.edges[v.an_edge as usize].org == i as VertIdx)
    }
}
