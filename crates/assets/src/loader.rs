use crate::{AssetError, Font, LoadStatus};
use futures::channel::oneshot;
use std::path::{Path, PathBuf};

/// Spawn `job` on a named background thread and return the receiving end of
/// its single result. A job that never runs (spawn failure, panic) surfaces
/// as a canceled receiver.
pub(crate) fn spawn_load<T, F>(name: &str, job: F) -> oneshot::Receiver<Result<T, AssetError>>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AssetError> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let spawned = std::thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            // The receiver may be gone; a late result is dropped silently.
            let _ = tx.send(job());
        });
    if let Err(e) = spawned {
        tracing::error!("failed to spawn {name}: {e}");
    }
    rx
}

/// Starts font loads.
#[derive(Debug, Default)]
pub struct FontLoader;

impl FontLoader {
    pub fn new() -> Self {
        Self
    }

    /// Begin reading and parsing a typeface file. Returns immediately.
    pub fn load(&self, path: impl AsRef<Path>) -> PendingFont {
        let path = path.as_ref().to_path_buf();
        tracing::info!("loading font {}", path.display());
        let job_path = path.clone();
        let rx = spawn_load("font-loader", move || {
            let json = std::fs::read_to_string(&job_path)?;
            Font::from_json(&json)
        });
        PendingFont {
            path,
            rx: Some(rx),
            status: LoadStatus::Pending,
        }
    }
}

/// A font request that completes exactly once.
#[derive(Debug)]
pub struct PendingFont {
    path: PathBuf,
    rx: Option<oneshot::Receiver<Result<Font, AssetError>>>,
    status: LoadStatus,
}

impl PendingFont {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    /// Non-blocking check for the result. Yields `Some` exactly once; every
    /// later call returns `None`.
    pub fn poll(&mut self) -> Option<Result<Font, AssetError>> {
        let rx = self.rx.as_mut()?;
        let result = match rx.try_recv() {
            Ok(None) => return None,
            Ok(Some(result)) => result,
            Err(oneshot::Canceled) => Err(AssetError::Canceled(self.path.display().to_string())),
        };
        self.rx = None;
        Some(self.finish(result))
    }

    /// Block until the font arrives. Used where there is no frame loop to
    /// poll from.
    pub fn wait(mut self) -> Result<Font, AssetError> {
        let Some(rx) = self.rx.take() else {
            return Err(AssetError::Canceled(self.path.display().to_string()));
        };
        let result = futures::executor::block_on(rx)
            .unwrap_or_else(|_| Err(AssetError::Canceled(self.path.display().to_string())));
        self.finish(result)
    }

    fn finish(&mut self, result: Result<Font, AssetError>) -> Result<Font, AssetError> {
        match &result {
            Ok(font) => {
                tracing::info!(
                    "font {} loaded ({} glyphs)",
                    self.path.display(),
                    font.glyph_count()
                );
                self.status = LoadStatus::Loaded;
            }
            Err(e) => {
                tracing::error!("font {} failed to load: {e}", self.path.display());
                self.status = LoadStatus::Failed(e.to_string());
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::{Duration, Instant};

    const FONT: &str = r#"{
        "familyName": "Tiny",
        "resolution": 1000,
        "boundingBox": { "xMin": 0, "xMax": 500, "yMin": 0, "yMax": 500 },
        "glyphs": { "I": { "ha": 200, "o": "m 0 0 l 100 0 l 100 500 l 0 500" } }
    }"#;

    fn poll_until_done(pending: &mut PendingFont) -> Result<Font, AssetError> {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(result) = pending.poll() {
                return result;
            }
            assert!(Instant::now() < deadline, "font load timed out");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn completes_exactly_once() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FONT.as_bytes()).unwrap();

        let mut pending = FontLoader::new().load(file.path());
        assert_eq!(pending.status(), &LoadStatus::Pending);
        let font = poll_until_done(&mut pending).unwrap();
        assert_eq!(font.family_name, "Tiny");
        assert_eq!(pending.status(), &LoadStatus::Loaded);
        assert!(pending.poll().is_none());
        assert!(pending.poll().is_none());
    }

    #[test]
    fn missing_file_is_reported_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut pending = FontLoader::new().load(dir.path().join("absent.json"));
        let err = poll_until_done(&mut pending).unwrap_err();
        assert!(matches!(err, AssetError::Io(_)));
        assert!(matches!(pending.status(), LoadStatus::Failed(_)));
        assert!(pending.poll().is_none());
    }

    #[test]
    fn wait_blocks_for_result() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let err = FontLoader::new().load(file.path()).wait().unwrap_err();
        assert!(matches!(err, AssetError::Json(_)));
    }
}
