//! Asset loading: typeface fonts and matcap textures.
//!
//! Loads run on background threads and hand their results back over
//! single-shot channels. Nothing here touches the scene or the GPU; the
//! caller polls for completions on its own thread and applies them there.
//!
//! # Invariants
//! - A font request completes at most once.
//! - Texture requests are never deduplicated; callers cache by key.

mod font;
mod loader;
pub mod paths;
mod texture;

pub use font::{Font, Glyph, GlyphOutline, OutlineCommand, PathCommand};
pub use image::{Rgba, RgbaImage};
pub use loader::{FontLoader, PendingFont};
pub use texture::{TextureEntry, TextureLoader};

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed outline for glyph {glyph:?}: {reason}")]
    Outline { glyph: char, reason: String },
    #[error("font has invalid resolution {0}")]
    Resolution(f32),
    #[error("loader for {0} stopped before completing")]
    Canceled(String),
}

/// Observable state of one asset request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Pending,
    Loaded,
    Failed(String),
}

impl std::fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => f.write_str("loading"),
            Self::Loaded => f.write_str("loaded"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}
