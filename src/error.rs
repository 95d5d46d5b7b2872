// Copyright 2025 Lars Brubaker
// License: MIT
//
// Error type shared by every stage of the cloning pipeline.

use crate::geom::Real;
use thiserror::Error;

/// Result type alias using [`CloneError`].
pub type Result<T> = std::result::Result<T, CloneError>;

/// Errors that abort a mesh construction or a `solve` call.
#[derive(Error, Debug)]
pub enum CloneError {
    /// The mask has no usable foreground region.
    #[error("invalid mask: {reason}")]
    InvalidMask {
        /// What was wrong with the mask.
        reason: String,
    },

    /// The boundary polygon is not a simple polygon with at least 3 points.
    #[error("invalid boundary: {reason}")]
    InvalidBoundary {
        /// What was wrong with the boundary.
        reason: String,
    },

    /// No mesh triangle contains a point that was expected to be inside the mesh.
    #[error("no mesh triangle contains point ({x}, {y})")]
    PointNotFound {
        /// Query x coordinate.
        x: Real,
        /// Query y coordinate.
        y: Real,
    },

    /// The mean-value weight normalization divisor is zero or not finite.
    #[error("degenerate mean-value weights at ({x}, {y}): weight total = {total}")]
    DegenerateWeight {
        /// Query x coordinate.
        x: Real,
        /// Query y coordinate.
        y: Real,
        /// The offending weight total.
        total: Real,
    },

    /// A mesh vertex has no entry in one of the per-vertex tables.
    #[error("mesh vertex ({x}, {y}) has no entry in the {table} table")]
    LookupInconsistency {
        /// Vertex x coordinate.
        x: Real,
        /// Vertex y coordinate.
        y: Real,
        /// Name of the table that missed.
        table: &'static str,
    },

    /// A pixel sample falls outside its image.
    #[error("pixel ({x}, {y}) is outside the {width}x{height} {image} image")]
    OutOfBounds {
        /// Which image was sampled.
        image: &'static str,
        /// Sample column.
        x: i64,
        /// Sample row.
        y: i64,
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
    },

    /// The mesh was queried before `create_mesh` succeeded.
    #[error("mesh has not been created")]
    EmptyMesh,

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },

    /// Image decoding or encoding failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl CloneError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        CloneError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    pub(crate) fn invalid_boundary(reason: impl Into<String>) -> Self {
        CloneError::InvalidBoundary {
            reason: reason.into(),
        }
    }
}
