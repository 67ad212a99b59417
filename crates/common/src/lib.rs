//! Shared value types: arena ids, transforms and bounding boxes.

mod types;

pub use types::{Aabb, GeometryId, MaterialId, NodeId, TextureKey, Transform};
