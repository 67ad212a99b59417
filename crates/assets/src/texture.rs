use crate::loader::spawn_load;
use crate::{AssetError, LoadStatus};
use futures::channel::oneshot;
use image::RgbaImage;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use textscene_common::TextureKey;

/// One texture slot in the loader's cache.
#[derive(Debug)]
pub struct TextureEntry {
    pub path: PathBuf,
    pub status: LoadStatus,
    /// Decoded pixels once loaded.
    pub image: Option<Arc<RgbaImage>>,
    /// Bumped every time new pixels arrive for this key, so consumers can
    /// tell when to re-upload.
    pub revision: u64,
    pending: Option<oneshot::Receiver<Result<RgbaImage, AssetError>>>,
}

/// Loads images in the background and owns the keyed texture cache.
///
/// A key is usable as soon as `load` returns; until its pixels arrive the
/// entry has no image and renderers should bind a default.
#[derive(Debug, Default)]
pub struct TextureLoader {
    entries: BTreeMap<TextureKey, TextureEntry>,
}

impl TextureLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin reading and decoding `path` into slot `key`. Every call issues a
    /// fresh request, replacing whatever request the slot had in flight.
    pub fn load(&mut self, key: TextureKey, path: impl AsRef<Path>) -> TextureKey {
        let path = path.as_ref().to_path_buf();
        tracing::debug!("loading texture {} from {}", key.0, path.display());
        let job_path = path.clone();
        let rx = spawn_load("texture-loader", move || {
            Ok(image::open(&job_path)?.to_rgba8())
        });

        let entry = self.entries.entry(key).or_insert_with(|| TextureEntry {
            path: path.clone(),
            status: LoadStatus::Pending,
            image: None,
            revision: 0,
            pending: None,
        });
        entry.path = path;
        entry.status = LoadStatus::Pending;
        entry.pending = Some(rx);
        key
    }

    /// Collect finished loads. Returns the keys whose pixels arrived.
    pub fn poll(&mut self) -> Vec<TextureKey> {
        let mut ready = Vec::new();
        for (key, entry) in self.entries.iter_mut() {
            let Some(rx) = entry.pending.as_mut() else {
                continue;
            };
            let result = match rx.try_recv() {
                Ok(None) => continue,
                Ok(Some(result)) => result,
                Err(oneshot::Canceled) => {
                    Err(AssetError::Canceled(entry.path.display().to_string()))
                }
            };
            entry.pending = None;
            match result {
                Ok(image) => {
                    tracing::debug!(
                        "texture {} loaded ({}x{})",
                        key.0,
                        image.width(),
                        image.height()
                    );
                    entry.image = Some(Arc::new(image));
                    entry.revision += 1;
                    entry.status = LoadStatus::Loaded;
                    ready.push(*key);
                }
                Err(e) => {
                    tracing::error!(
                        "texture {} ({}) failed to load: {e}",
                        key.0,
                        entry.path.display()
                    );
                    entry.status = LoadStatus::Failed(e.to_string());
                }
            }
        }
        ready
    }

    pub fn get(&self, key: TextureKey) -> Option<&TextureEntry> {
        self.entries.get(&key)
    }

    pub fn status(&self, key: TextureKey) -> Option<&LoadStatus> {
        self.entries.get(&key).map(|e| &e.status)
    }

    pub fn keys(&self) -> impl Iterator<Item = TextureKey> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TextureKey, &TextureEntry)> {
        self.entries.iter().map(|(k, e)| (*k, e))
    }

    /// Number of requests still in flight.
    pub fn pending_count(&self) -> usize {
        self.entries.values().filter(|e| e.pending.is_some()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
