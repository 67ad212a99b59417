//! Scene graph for the text demo.
//!
//! Holds the nodes, the shared geometry and material arenas, the single
//! perspective camera, orbit controls and the debug-panel bindings, plus the
//! one-shot population sequence run when the font arrives.
//!
//! # Invariants
//! - Shared geometry is immutable once added.
//! - Editing a material is visible through every mesh that references it.
//! - The scene owns exactly one camera.

mod camera;
mod controls;
mod graph;
pub mod panel;
pub mod populate;
mod viewport;

pub use camera::PerspectiveCamera;
pub use controls::{OrbitControls, PointerButton};
pub use graph::{DrawBatch, MatcapMaterial, Node, NodeKind, Scene};
pub use panel::{Control, ControlValue, DebugPanel};
pub use populate::{Populated, populate};
pub use viewport::{MAX_PIXEL_RATIO, Viewport};

use textscene_common::{GeometryId, MaterialId};
use textscene_geometry::{GeometryError, Topology};

/// Errors from building or populating the scene.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),
    #[error("unknown geometry {0:?}")]
    UnknownGeometry(GeometryId),
    #[error("unknown material {0:?}")]
    UnknownMaterial(MaterialId),
    #[error("geometry {geometry:?} is {found:?}, expected {expected:?}")]
    Topology {
        geometry: GeometryId,
        expected: Topology,
        found: Topology,
    },
}
