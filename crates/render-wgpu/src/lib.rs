//! wgpu render backend for the text scene.
//!
//! Draws matcap-shaded meshes and white line segments, instanced per
//! (geometry, material) pair, over a black clear colour.
//!
//! # Invariants
//! - The renderer never mutates the scene.
//! - A matcap that has not loaded renders with a blank default texture.
//! - Geometry is uploaded once; scene geometry is immutable.

mod frame;
mod gpu;
mod shaders;
mod textures;

pub use gpu::WgpuRenderer;
