// mvc-clone: seamless cloning with mean-value coordinates over an adaptive mesh
// Copyright 2025 Lars Brubaker
// License: MIT

pub mod adaptive;
pub mod boundary;
pub mod config;
pub mod error;
pub mod geom;
pub mod mesh;
pub mod mvc;
pub mod parallel;
pub mod pixel;
pub mod solver;

pub use adaptive::{AdaptiveMesh, Triangle};
pub use boundary::{extract_boundary, validate_boundary};
pub use config::{MeshCriteria, SolverOptions};
pub use error::{CloneError, Result};
pub use geom::{Point2, PointKey, Real};
pub use mvc::mean_value_coordinates;
pub use pixel::{saturate, ClonePixel, Color, PixelImage};
pub use solver::{CoordinateMap, MvcSolver, Offset, PropagatedCorrection};
