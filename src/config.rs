// Copyright 2025 Lars Brubaker
// License: MIT
//
// Tunable parameters for mesh refinement and the cloning solver.

use crate::error::{CloneError, Result};
use crate::geom::Real;

/// Quality criteria for Delaunay refinement of the boundary mesh.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MeshCriteria {
    /// Lower bound on the squared sine of the smallest triangle angle.
    /// 0.125 keeps every angle above roughly 20.7 degrees.
    pub shape_bound: Real,
    /// Upper bound on the longest triangle edge, in pixels.
    pub size_bound: Real,
    /// Segments shorter than twice this are not split and triangles with an
    /// edge shorter than this are not refined.
    pub min_edge_length: Real,
    /// Hard cap on inserted Steiner points.
    pub max_steiner_points: usize,
}

impl Default for MeshCriteria {
    fn default() -> Self {
        Self {
            shape_bound: 0.125,
            size_bound: 16.0,
            min_edge_length: 0.5,
            max_steiner_points: 250_000,
        }
    }
}

impl MeshCriteria {
    pub fn with_shape_bound(mut self, shape_bound: Real) -> Self {
        self.shape_bound = shape_bound;
        self
    }

    pub fn with_size_bound(mut self, size_bound: Real) -> Self {
        self.size_bound = size_bound;
        self
    }

    pub fn with_min_edge_length(mut self, min_edge_length: Real) -> Self {
        self.min_edge_length = min_edge_length;
        self
    }

    pub fn with_max_steiner_points(mut self, max_steiner_points: usize) -> Self {
        self.max_steiner_points = max_steiner_points;
        self
    }

    /// Check every field is in range.
    pub fn validate(&self) -> Result<()> {
        // Angles above 30 degrees are not reachable in general.
        if !(0.0..=0.25).contains(&self.shape_bound) {
            return Err(CloneError::invalid_param(
                "shape_bound",
                self.shape_bound,
                "must be in [0, 0.25]",
            ));
        }
        if !(self.size_bound > 0.0) {
            return Err(CloneError::invalid_param(
                "size_bound",
                self.size_bound,
                "must be positive",
            ));
        }
        if !(self.min_edge_length > 0.0) || !self.min_edge_length.is_finite() {
            return Err(CloneError::invalid_param(
                "min_edge_length",
                self.min_edge_length,
                "must be positive and finite",
            ));
        }
        Ok(())
    }
}

/// Options for [`MvcSolver`](crate::solver::MvcSolver).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// Refinement criteria for the per-solve mesh.
    pub criteria: MeshCriteria,
    /// Distance under which a point counts as sitting on a boundary vertex.
    pub coincidence_epsilon: Real,
    /// Mask values strictly above this are foreground.
    pub mask_threshold: u8,
    /// Whether to use parallel execution (default: true).
    pub parallel: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            criteria: MeshCriteria::default(),
            coincidence_epsilon: 1e-4,
            mask_threshold: 0,
            parallel: true,
        }
    }
}

impl SolverOptions {
    pub fn with_criteria(mut self, criteria: MeshCriteria) -> Self {
        self.criteria = criteria;
        self
    }

    pub fn with_coincidence_epsilon(mut self, eps: Real) -> Self {
        self.coincidence_epsilon = eps;
        self
    }

    pub fn with_mask_threshold(mut self, threshold: u8) -> Self {
        self.mask_threshold = threshold;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.criteria.validate()?;
        if !(self.coincidence_epsilon >= 0.0) || !self.coincidence_epsilon.is_finite() {
            return Err(CloneError::invalid_param(
                "coincidence_epsilon",
                self.coincidence_epsilon,
                "must be non-negative and finite",
            ));
        }
        if self.mask_threshold == u8::MAX {
            return Err(CloneError::invalid_param(
                "mask_threshold",
                self.mask_threshold,
                "leaves no foreground value",
            ));
        }
        Ok(())
    }
}
