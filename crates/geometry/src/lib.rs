//! CPU geometry construction.
//!
//! Builders return an owned, mutable [`Geometry`]; callers finish any
//! adjustment (such as centering) before sharing it. Once shared, geometry is
//! treated as immutable.

mod geometry;
mod text;
mod torus;
mod wireframe;

pub use geometry::{Geometry, Topology};
pub use text::{BevelParams, TextParams, text_geometry};
pub use torus::{TorusParams, torus};
pub use wireframe::wireframe;

/// Errors from geometry construction.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("tessellation failed: {0}")]
    Tessellation(#[from] lyon_tessellation::TessellationError),
    #[error("text {0:?} produced no outline")]
    EmptyOutline(String),
}
