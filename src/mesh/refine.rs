// Copyright 2025 Lars Brubaker
// Delaunay refinement: split encroached segments, then insert circumcenters
// of bad triangles, worst first.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use tracing::{debug, warn};

use super::{EdgeIdx, FaceIdx, Mesh, VertIdx, INVALID};
use crate::config::MeshCriteria;
use crate::geom::{circumcenter, in_circle, orient, segments_intersect, Point2, Real};

/// Counters reported by [`Mesh::refine_quality`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefineStats {
    /// Constrained sub-segments split at their midpoint.
    pub segment_splits: usize,
    /// Circumcenters inserted for bad triangles.
    pub circumcenters: usize,
    /// Bad triangles left alone (too small, or no usable insertion point).
    pub skipped: usize,
    /// Refinement stopped on `max_steiner_points`.
    pub budget_exhausted: bool,
}

impl RefineStats {
    pub fn steiner_points(&self) -> usize {
        self.segment_splits + self.circumcenters
    }
}

/// Heap entry; the smallest squared sine pops first.
struct BadFace {
    sine2: Real,
    face: FaceIdx,
    verts: [VertIdx; 3],
}

impl Ord for BadFace {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .sine2
            .total_cmp(&self.sine2)
            .then_with(|| other.face.cmp(&self.face))
    }
}

impl PartialOrd for BadFace {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for BadFace {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BadFace {}

enum Walk {
    Found(FaceIdx),
    Blocked(EdgeIdx),
    Lost,
}

/// A segment to re-check.  Forced entries are split whenever they are long
/// enough, encroached by a mesh vertex or not.
type SegmentTask = (EdgeIdx, bool);

impl Mesh {
    /// Squared sine of the smallest angle of f and its squared longest edge.
    pub fn face_quality(&self, f: FaceIdx) -> (Real, Real) {
        let [a, b, c] = self.face_points(f);
        let mut l = [a.dist2(b), b.dist2(c), c.dist2(a)];
        l.sort_by(|x, y| x.total_cmp(y));
        let area2 = orient(a, b, c);
        let denom = l[1] * l[2];
        let sine2 = if denom > 0.0 { area2 * area2 / denom } else { 0.0 };
        (sine2, l[2])
    }

    /// Priority of f if it violates the criteria and is still large enough
    /// to refine.
    fn bad_priority(&self, f: FaceIdx, criteria: &MeshCriteria) -> Option<Real> {
        let [a, b, c] = self.face_points(f);
        let shortest = a.dist2(b).min(b.dist2(c)).min(c.dist2(a));
        if shortest < criteria.min_edge_length * criteria.min_edge_length {
            return None;
        }
        let (sine2, longest2) = self.face_quality(f);
        if sine2 < criteria.shape_bound || longest2 > criteria.size_bound * criteria.size_bound {
            Some(sine2)
        } else {
            None
        }
    }

    /// Some apex of e lies strictly inside its diametral circle.
    pub fn segment_encroached(&self, e: EdgeIdx) -> bool {
        let a = self.org_point(e);
        let b = self.dst_point(e);
        [e, e ^ 1].into_iter().any(|side| {
            self.edges[side as usize].lface != INVALID && {
                let apex = self.org_point(self.lprev(side));
                (a - apex).dot(b - apex) < 0.0
            }
        })
    }

    fn splittable(&self, e: EdgeIdx, criteria: &MeshCriteria) -> bool {
        self.org_point(e).dist(self.dst_point(e)) >= 2.0 * criteria.min_edge_length
    }

    /// Straight walk from the centroid of `from` toward `target`.
    fn walk(&self, from: FaceIdx, target: Point2) -> Walk {
        let [a, b, c] = self.face_points(from);
        let s = Point2::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0);
        let mut f = from;
        for _ in 0..self.faces.len() + 8 {
            let edges = self.face_edges(f);
            let beyond: Vec<EdgeIdx> = edges
                .into_iter()
                .filter(|&e| orient(self.org_point(e), self.dst_point(e), target) < 0.0)
                .collect();
            let exit = beyond
                .iter()
                .copied()
                .find(|&e| segments_intersect(s, target, self.org_point(e), self.dst_point(e)))
                .or_else(|| beyond.first().copied());
            let Some(e) = exit else {
                return Walk::Found(f);
            };
            if self.edges[e as usize].constrained || self.rface(e) == INVALID {
                return Walk::Blocked(e);
            }
            f = self.rface(e);
        }
        Walk::Lost
    }

    /// Constrained edges whose diametral circle strictly contains p, found
    /// among the triangles p would remove on insertion.
    fn encroached_by(&self, f: FaceIdx, p: Point2) -> Vec<EdgeIdx> {
        let mut out = Vec::new();
        let mut seen: HashSet<FaceIdx> = HashSet::from([f]);
        let mut stack = vec![f];
        while let Some(g) = stack.pop() {
            for e in self.face_edges(g) {
                if self.edges[e as usize].constrained {
                    let a = self.org_point(e);
                    let b = self.dst_point(e);
                    if (a - p).dot(b - p) < 0.0 {
                        out.push(e & !1);
                    }
                    continue;
                }
                let h = self.rface(e);
                if h == INVALID || seen.contains(&h) {
                    continue;
                }
                let [x, y, z] = self.face_points(h);
                if in_circle(x, y, z, p) > 0.0 {
                    seen.insert(h);
                    stack.push(h);
                }
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Insert p into face f (or onto one of its unconstrained edges) and
    /// restore the Delaunay property.  None if p is too close to the face.
    fn insert_point(&mut self, f: FaceIdx, p: Point2) -> Option<VertIdx> {
        let [a, b, c] = self.face_points(f);
        let scale = a.dist2(b).max(b.dist2(c)).max(c.dist2(a));
        let tol = 1e-12 * scale;
        if [a, b, c].iter().any(|q| q.dist2(p) <= tol) {
            return None;
        }
        let on_edge = self
            .face_edges(f)
            .into_iter()
            .find(|&e| orient(self.org_point(e), self.dst_point(e), p).abs() <= tol);
        let (v, opposite) = match on_edge {
            Some(e) if self.edges[e as usize].constrained => return None,
            Some(e) => self.split_edge(e, p),
            None => {
                let (v, opp) = self.split_face(f, p);
                (v, opp.to_vec())
            }
        };
        self.legalize(opposite);
        Some(v)
    }

    fn requeue_around(
        &self,
        v: VertIdx,
        criteria: &MeshCriteria,
        segments: &mut Vec<SegmentTask>,
        heap: &mut BinaryHeap<BadFace>,
    ) {
        for f in self.vertex_faces(v) {
            self.push_if_bad(f, criteria, heap);
            for e in self.face_edges(f) {
                if self.edges[e as usize].constrained {
                    segments.push((e, false));
                }
            }
        }
    }

    fn push_if_bad(&self, f: FaceIdx, criteria: &MeshCriteria, heap: &mut BinaryHeap<BadFace>) {
        if let Some(sine2) = self.bad_priority(f, criteria) {
            heap.push(BadFace {
                sine2,
                face: f,
                verts: self.face_verts(f),
            });
        }
    }

    /// Refine the constrained Delaunay mesh until every triangle meets
    /// `criteria`, is too small to refine, or the Steiner budget runs out.
    /// Constrained edges are only ever split, so the boundary is preserved.
    pub fn refine_quality(&mut self, criteria: &MeshCriteria) -> RefineStats {
        let mut stats = RefineStats::default();
        let mut segments: Vec<SegmentTask> = self
            .edge_ids()
            .filter(|&e| self.edges[e as usize].constrained)
            .map(|e| (e, false))
            .collect();
        segments.reverse();
        let mut heap = BinaryHeap::new();
        for f in self.face_ids() {
            self.push_if_bad(f, criteria, &mut heap);
        }

        loop {
            if stats.steiner_points() >= criteria.max_steiner_points {
                if !segments.is_empty() || !heap.is_empty() {
                    stats.budget_exhausted = true;
                    warn!(
                        budget = criteria.max_steiner_points,
                        pending = heap.len(),
                        "mesh refinement stopped on its Steiner point budget"
                    );
                }
                break;
            }

            if let Some((e, forced)) = segments.pop() {
                if self.edges[e as usize].constrained
                    && self.splittable(e, criteria)
                    && (forced || self.segment_encroached(e))
                {
                    let mid = self.org_point(e).midpoint(self.dst_point(e));
                    let (v, opposite) = self.split_edge(e, mid);
                    self.legalize(opposite);
                    stats.segment_splits += 1;
                    self.requeue_around(v, criteria, &mut segments, &mut heap);
                }
                continue;
            }

            let Some(bad) = heap.pop() else {
                break;
            };
            if self.face_verts(bad.face) != bad.verts {
                continue;
            }
            let [a, b, c] = self.face_points(bad.face);
            let Some(cc) = circumcenter(a, b, c) else {
                stats.skipped += 1;
                continue;
            };

            match self.walk(bad.face, cc) {
                Walk::Blocked(e) => {
                    if self.splittable(e, criteria) {
                        segments.push((e, true));
                        heap.push(bad);
                    } else {
                        stats.skipped += 1;
                    }
                }
                Walk::Lost => stats.skipped += 1,
                Walk::Found(f) => {
                    let encroached = self.encroached_by(f, cc);
                    if !encroached.is_empty() {
                        let before = segments.len();
                        segments.extend(
                            encroached
                                .into_iter()
                                .filter(|&e| self.splittable(e, criteria))
                                .map(|e| (e, true)),
                        );
                        if segments.len() > before {
                            heap.push(bad);
                        } else {
                            stats.skipped += 1;
                        }
                        continue;
                    }
                    match self.insert_point(f, cc) {
                        Some(v) => {
                            stats.circumcenters += 1;
                            self.requeue_around(v, criteria, &mut segments, &mut heap);
                        }
                        None => stats.skipped += 1,
                    }
                }
            }
        }

        debug!(
            segment_splits = stats.segment_splits,
            circumcenters = stats.circumcenters,
            skipped = stats.skipped,
            faces = self.faces.len(),
            "mesh refinement finished"
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::triangulate_polygon;

    fn constrained_mesh(poly: &[Point2]) -> Mesh {
        let tris = triangulate_polygon(poly).unwrap();
        let mut mesh = Mesh::from_triangles(poly, &tris).unwrap();
        for i in 0..poly.len() {
            assert!(mesh.constrain(i as VertIdx, ((i + 1) % poly.len()) as VertIdx));
        }
        mesh.refine_delaunay();
        mesh
    }

    fn square(side: i32) -> Vec<Point2> {
        [(0, 0), (side, 0), (side, side), (0, side)]
            .into_iter()
            .map(Point2::from)
            .collect()
    }

    #[test]
    fn refined_square_meets_criteria() {
        let mut mesh = constrained_mesh(&square(40));
        let criteria = MeshCriteria::default();
        let stats = mesh.refine_quality(&criteria);
        assert!(stats.steiner_points() > 0);
        assert!(!stats.budget_exhausted);
        assert!(mesh.is_valid());
        for f in mesh.face_ids() {
            let (sine2, longest2) = mesh.face_quality(f);
            let [a, b, c] = mesh.face_points(f);
            let shortest = a.dist(b).min(b.dist(c)).min(c.dist(a));
            assert!(
                shortest < criteria.min_edge_length
                    || (sine2 >= criteria.shape_bound - 1e-9 && longest2 <= 16.0 * 16.0 + 1e-9),
                "face {} has sine2 {} and longest edge {}",
                f,
                sine2,
                longest2.sqrt()
            );
        }
    }

    #[test]
    fn boundary_stays_on_the_input_polygon() {
        let poly = square(30);
        let mut mesh = constrained_mesh(&poly);
        mesh.refine_quality(&MeshCriteria::default());

        let mut perimeter = 0.0;
        for e in mesh.edge_ids() {
            if mesh.edges[e as usize].constrained {
                let a = mesh.org_point(e);
                let b = mesh.dst_point(e);
                // Sub-segments lie on the square's sides.
                assert!(
                    a.x == b.x && (a.x == 0.0 || a.x == 30.0)
                        || a.y == b.y && (a.y == 0.0 || a.y == 30.0),
                    "constrained edge {:?} -> {:?} left the boundary",
                    a,
                    b
                );
                perimeter += a.dist(b);
            }
        }
        assert!((perimeter - 120.0).abs() < 1e-9);
    }

    #[test]
    fn budget_stops_refinement() {
        let mut mesh = constrained_mesh(&square(64));
        let criteria = MeshCriteria::default().with_max_steiner_points(5);
        let stats = mesh.refine_quality(&criteria);
        assert_eq!(stats.steiner_points(), 5);
        assert!(stats.budget_exhausted);
        assert!(mesh.is_valid());
    }
}
