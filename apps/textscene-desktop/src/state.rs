use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use textscene_assets::paths::{FONT_PATH, MATCAP_COUNT, matcap_path, resolve};
use textscene_assets::{FontLoader, LoadStatus, PendingFont, TextureLoader};
use textscene_common::TextureKey;
use textscene_scene::{
    DebugPanel, OrbitControls, PerspectiveCamera, PointerButton, Scene, Viewport, populate,
};

/// Everything the frame loop mutates, independent of the window and GPU.
pub struct AppState {
    pub scene: Scene,
    pub controls: OrbitControls,
    pub viewport: Viewport,
    pub textures: TextureLoader,
    pub panel: DebugPanel,
    font: Option<PendingFont>,
    font_path: PathBuf,
    font_status: LoadStatus,
    rng: StdRng,
    cursor: Vec2,
    surface_height: f32,
    shift: bool,
}

impl AppState {
    /// Start every asset load and set up the camera for an initial surface.
    pub fn new(assets: &Path, seed: Option<u64>, viewport: Viewport) -> Self {
        let mut textures = TextureLoader::new();
        for key in 1..=MATCAP_COUNT {
            textures.load(TextureKey(key), resolve(assets, &matcap_path(key)));
        }
        let font_path = resolve(assets, FONT_PATH);
        let font = FontLoader::new().load(&font_path);

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let camera = PerspectiveCamera::new(viewport.aspect());
        let controls = OrbitControls::new(&camera);

        Self {
            scene: Scene::new(camera),
            controls,
            viewport,
            textures,
            panel: DebugPanel::new(),
            font: Some(font),
            font_path,
            font_status: LoadStatus::Pending,
            rng,
            cursor: Vec2::ZERO,
            surface_height: (viewport.height * viewport.pixel_ratio) as f32,
            shift: false,
        }
    }

    pub fn font_path(&self) -> &Path {
        &self.font_path
    }

    pub fn font_status(&self) -> &LoadStatus {
        &self.font_status
    }

    /// Apply finished asset loads. The scene is populated here, once, when
    /// the font arrives.
    pub fn poll_assets(&mut self) {
        self.textures.poll();

        let Some(pending) = &mut self.font else {
            return;
        };
        let Some(result) = pending.poll() else {
            return;
        };
        self.font_status = pending.status().clone();
        self.font = None;

        // A failed font was already logged by the loader.
        let Ok(font) = result else {
            return;
        };
        match populate(&mut self.scene, &font, &mut self.rng) {
            Ok(populated) => self.panel = populated.panel,
            Err(e) => {
                tracing::error!("failed to build scene: {e}");
                self.font_status = LoadStatus::Failed(e.to_string());
            }
        }
    }

    /// Handle a surface resize. Returns the drawing buffer size.
    pub fn resize(&mut self, width: u32, height: u32, scale_factor: f64) -> (u32, u32) {
        self.viewport = Viewport::from_physical(width, height, scale_factor);
        self.surface_height = height as f32;
        if !self.viewport.is_empty() {
            self.scene
                .camera_mut()
                .set_viewport(self.viewport.width as f32, self.viewport.height as f32);
        }
        self.viewport.drawing_buffer_size()
    }

    /// Advance the controls by one frame.
    pub fn update(&mut self) {
        if self.controls.update(self.scene.camera_mut()) {
            self.scene.sync_camera_node();
        }
    }

    pub fn set_shift(&mut self, shift: bool) {
        self.shift = shift;
    }

    pub fn pointer_pressed(&mut self, button: PointerButton) {
        self.controls.pointer_down(button, self.cursor, self.shift);
    }

    pub fn pointer_released(&mut self) {
        self.controls.pointer_up();
    }

    /// Cursor position in physical pixels.
    pub fn pointer_moved(&mut self, position: Vec2) {
        self.cursor = position;
        self.controls
            .pointer_move(position, self.surface_height, self.scene.camera());
    }

    pub fn wheel(&mut self, delta: f32) {
        self.controls.wheel(delta);
    }
}
