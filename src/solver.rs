// Copyright 2025 Lars Brubaker
// License: MIT
//
// Mean-value seamless cloning.
//
// The boundary mismatch between target and source is spread over the patch
// interior with mean-value coordinates.  Weights are only evaluated at mesh
// vertices; each pixel interpolates the vertex corrections of the triangle
// that contains it.

use std::collections::HashMap;
use std::time::Instant;

use image::GrayImage;
use tracing::{debug, info};

use crate::adaptive::AdaptiveMesh;
use crate::boundary::extract_boundary;
use crate::config::SolverOptions;
use crate::error::{CloneError, Result};
use crate::geom::{bounded_side, BoundedSide, Point2, PointKey, Real};
use crate::mvc::mean_value_coordinates;
use crate::parallel::for_each_slot;
use crate::pixel::{color_sub, sample, ClonePixel, Color, PixelImage};

/// Placement of source coordinates in the target: target = source + offset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Offset {
    pub dx: i32,
    pub dy: i32,
}

impl Offset {
    pub const ZERO: Offset = Offset { dx: 0, dy: 0 };

    pub const fn new(dx: i32, dy: i32) -> Self {
        Offset { dx, dy }
    }
}

/// Mean-value coordinates of every mesh vertex, keyed by vertex position.
#[derive(Clone, Debug, Default)]
pub struct CoordinateMap {
    index: HashMap<PointKey, usize>,
    points: Vec<Point2>,
    weights: Vec<Vec<Real>>,
}

impl CoordinateMap {
    fn new(points: Vec<Point2>, weights: Vec<Vec<Real>>) -> Self {
        let mut index = HashMap::with_capacity(points.len());
        for (i, p) in points.iter().enumerate() {
            index.entry(p.key()).or_insert(i);
        }
        CoordinateMap {
            index,
            points,
            weights,
        }
    }

    /// Weight vector of the vertex at `p`, one entry per boundary point.
    pub fn get(&self, p: Point2) -> Option<&[Real]> {
        self.index.get(&p.key()).map(|&i| self.weights[i].as_slice())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Vertices and their weights, in mesh vertex order.
    pub fn iter(&self) -> impl Iterator<Item = (Point2, &[Real])> + '_ {
        self.points
            .iter()
            .copied()
            .zip(self.weights.iter().map(|w| w.as_slice()))
    }
}

/// Boundary correction carried to every mesh vertex.
#[derive(Clone, Debug, Default)]
pub struct PropagatedCorrection {
    index: HashMap<PointKey, usize>,
    values: Vec<Color>,
}

impl PropagatedCorrection {
    pub fn get(&self, p: Point2) -> Option<Color> {
        self.index.get(&p.key()).map(|&i| self.values[i])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Seamless cloning solver.  Owns the mesh of the most recent call.
#[derive(Clone, Debug, Default)]
pub struct MvcSolver {
    options: SolverOptions,
    mesh: AdaptiveMesh,
}

impl MvcSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: SolverOptions) -> Self {
        Self {
            options,
            mesh: AdaptiveMesh::default(),
        }
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// Mesh built by the last `preprocessing` call.
    pub fn mesh(&self) -> &AdaptiveMesh {
        &self.mesh
    }

    /// Mesh `boundary` and compute mean-value coordinates for every vertex.
    pub fn preprocessing(&mut self, boundary: &[Point2]) -> Result<CoordinateMap> {
        self.mesh = AdaptiveMesh::with_criteria(self.options.criteria.clone());
        self.mesh.create_mesh(boundary)?;

        let points = self.mesh.vertices();
        let eps = self.options.coincidence_epsilon;
        let mut weights: Vec<Vec<Real>> = vec![Vec::new(); points.len()];
        for_each_slot(&mut weights, self.options.parallel, |i, slot| {
            *slot = mean_value_coordinates(points[i], boundary, eps)?;
            Ok(())
        })?;

        debug!(
            vertices = points.len(),
            boundary = boundary.len(),
            "mean-value coordinates computed"
        );
        Ok(CoordinateMap::new(points, weights))
    }

    /// `dest(p + offset) - src(p)` for every boundary point, in boundary
    /// order.  Points are sampled at their nearest pixel.
    pub fn intensity_diff<P: ClonePixel>(
        src: &PixelImage<P>,
        dest: &PixelImage<P>,
        boundary: &[Point2],
        offset: Offset,
    ) -> Result<Vec<Color>> {
        boundary
            .iter()
            .map(|p| {
                let x = p.x.round() as i64;
                let y = p.y.round() as i64;
                let s = sample(src, "source", x, y)?;
                let d = sample(dest, "target", x + offset.dx as i64, y + offset.dy as i64)?;
                Ok(color_sub(d, s))
            })
            .collect()
    }

    /// Weighted sum of `diffs` at every vertex of `coords`.
    pub fn propagate(
        coords: &CoordinateMap,
        diffs: &[Color],
        parallel: bool,
    ) -> Result<PropagatedCorrection> {
        if coords.weights.iter().any(|w| w.len() != diffs.len()) {
            return Err(CloneError::invalid_param(
                "diffs",
                diffs.len(),
                "needs one entry per boundary point",
            ));
        }

        let mut values: Vec<Color> = vec![[0.0; 3]; coords.len()];
        for_each_slot(&mut values, parallel, |i, slot| {
            let mut acc = [0.0; 3];
            for (w, d) in coords.weights[i].iter().zip(diffs) {
                for c in 0..3 {
                    acc[c] += w * d[c];
                }
            }
            *slot = acc;
            Ok(())
        })?;

        Ok(PropagatedCorrection {
            index: coords.index.clone(),
            values,
        })
    }

    /// Clone the masked region of `src` into `dest` at `offset`.
    pub fn solve<P: ClonePixel>(
        &mut self,
        src: &PixelImage<P>,
        dest: &PixelImage<P>,
        mask: &GrayImage,
        offset: Offset,
    ) -> Result<PixelImage<P>> {
        let boundary = extract_boundary(mask, self.options.mask_threshold)?;
        self.solve_with_boundary(src, dest, &boundary, offset)
    }

    /// Clone the region of `src` inside `boundary` into `dest` at `offset`.
    ///
    /// Pixels strictly inside the boundary get their source value plus the
    /// interpolated correction; every other pixel is copied from `dest`.
    pub fn solve_with_boundary<P: ClonePixel>(
        &mut self,
        src: &PixelImage<P>,
        dest: &PixelImage<P>,
        boundary: &[Point2],
        offset: Offset,
    ) -> Result<PixelImage<P>> {
        let start = Instant::now();
        self.options.validate()?;

        let coords = self.preprocessing(boundary)?;
        let diffs = Self::intensity_diff(src, dest, boundary, offset)?;
        let correction = Self::propagate(&coords, &diffs, self.options.parallel)?;

        let mut result = dest.clone();
        let (sw, sh) = src.dimensions();
        let (mut x0, mut y0) = (Real::INFINITY, Real::INFINITY);
        let (mut x1, mut y1) = (Real::NEG_INFINITY, Real::NEG_INFINITY);
        for p in boundary {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        let x0 = x0.ceil().max(0.0) as i64;
        let y0 = y0.ceil().max(0.0) as i64;
        let x1 = x1.floor().min(sw as Real - 1.0) as i64;
        let y1 = y1.floor().min(sh as Real - 1.0) as i64;
        if x1 < x0 || y1 < y0 {
            return Ok(result);
        }
        let w = (x1 - x0 + 1) as usize;
        let h = (y1 - y0 + 1) as usize;

        let mesh = &self.mesh;
        let mut pixels: Vec<Option<P>> = vec![None; w * h];
        for_each_slot(&mut pixels, self.options.parallel, |i, slot| {
            let x = x0 + (i % w) as i64;
            let y = y0 + (i / w) as i64;
            let p = Point2::new(x as Real, y as Real);
            if bounded_side(boundary, p) != BoundedSide::Inside {
                return Ok(());
            }
            let tri = mesh.face(p)?;
            let bary = tri
                .barycentric(p)
                .ok_or(CloneError::PointNotFound { x: p.x, y: p.y })?;
            let mut corr = [0.0; 3];
            for (k, v) in tri.points().into_iter().enumerate() {
                let c = correction.get(v).ok_or(CloneError::LookupInconsistency {
                    x: v.x,
                    y: v.y,
                    table: "propagated correction",
                })?;
                for ch in 0..3 {
                    corr[ch] += bary[k] * c[ch];
                }
            }
            let base = sample(src, "source", x, y)?;
            *slot = Some(P::from_color([
                base[0] + corr[0],
                base[1] + corr[1],
                base[2] + corr[2],
            ]));
            Ok(())
        })?;

        let (dw, dh) = result.dimensions();
        let mut written = 0usize;
        for (i, px) in pixels.into_iter().enumerate() {
            let Some(px) = px else {
                continue;
            };
            let tx = x0 + (i % w) as i64 + offset.dx as i64;
            let ty = y0 + (i / w) as i64 + offset.dy as i64;
            if tx < 0 || ty < 0 || tx >= dw as i64 || ty >= dh as i64 {
                return Err(CloneError::OutOfBounds {
                    image: "target",
                    x: tx,
                    y: ty,
                    width: dw,
                    height: dh,
                });
            }
            result.put_pixel(tx as u32, ty as u32, px);
            written += 1;
        }

        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            vertices = coords.len(),
            boundary = boundary.len(),
            pixels = written,
            "seamless clone finished"
        );
        Ok(result)
    }
}
