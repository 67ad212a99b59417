mod state;

use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec2;
use state::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use textscene_assets::LoadStatus;
use textscene_scene::{Control, ControlValue, PointerButton, Viewport};
use textscene_render_wgpu::WgpuRenderer;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(
    name = "textscene-desktop",
    about = "Extruded 3D text and a field of donuts, lit with matcaps"
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory the font and matcap assets are served from
    #[arg(long, default_value = "static")]
    assets: PathBuf,

    /// Seed for donut placement; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Initial window width in logical pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Initial window height in logical pixels
    #[arg(long, default_value_t = 720)]
    height: u32,
}

/// Window and GPU objects, created once the event loop resumes.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, size: (u32, u32)) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("textscene")
            .with_inner_size(LogicalSize::new(size.0, size.1));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no suitable GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("textscene_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("failed to create device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let size = window.inner_size();
        let (width, height) =
            Viewport::from_physical(size.width, size.height, window.scale_factor())
                .drawing_buffer_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, &queue, surface_format, width, height);

        let egui_winit = egui_winit::State::new(
            EguiContext::default(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend, drawing buffer {width}x{height}",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, state: &mut AppState, size: PhysicalSize<u32>) {
        let (width, height) = state.resize(size.width, size.height, self.window.scale_factor());
        if state.viewport.is_empty() {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.renderer.resize(&self.device, width, height);
    }

    fn redraw(&mut self, state: &mut AppState) {
        state.poll_assets();
        state.update();

        if state.viewport.is_empty() {
            return;
        }

        self.renderer
            .prepare(&self.device, &self.queue, &state.scene, &state.textures);

        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer
            .render(&self.device, &self.queue, &view, &state.scene);

        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let egui_ctx = self.egui_winit.egui_ctx().clone();
        let full_output = egui_ctx.run(raw_input, |ctx| draw_panel(ctx, state));
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        // The drawing buffer is capped at 2x, so paint the panel at the
        // buffer's density rather than the window's.
        let pixels_per_point = full_output
            .pixels_per_point
            .min(state.viewport.pixel_ratio as f32);
        let paint_jobs = egui_ctx.tessellate(full_output.shapes, pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        output.present();
    }
}

/// Side panel with one widget per bound control, plus asset load status.
fn draw_panel(ctx: &EguiContext, state: &mut AppState) {
    egui::SidePanel::right("debug_panel")
        .default_width(220.0)
        .show(ctx, |ui| {
            let controls = state.panel.controls().to_vec();
            for control in &controls {
                let Some(value) = control.read(&state.scene) else {
                    continue;
                };
                match (control, value) {
                    (Control::Visibility { label, .. }, ControlValue::Bool(mut visible)) => {
                        if ui.checkbox(&mut visible, label.as_str()).changed() {
                            control.apply(&mut state.scene, ControlValue::Bool(visible));
                        }
                    }
                    (
                        Control::Matcap { label, choices, .. },
                        ControlValue::Texture(mut selected),
                    ) => {
                        let before = selected;
                        egui::ComboBox::from_label(label.as_str())
                            .selected_text(selected.0.to_string())
                            .show_ui(ui, |ui| {
                                for key in choices {
                                    ui.selectable_value(&mut selected, *key, key.0.to_string());
                                }
                            });
                        if selected != before {
                            tracing::debug!("matcap changed to {}", selected.0);
                            control.apply(&mut state.scene, ControlValue::Texture(selected));
                        }
                    }
                    _ => {}
                }
            }

            ui.separator();
            ui.heading("Assets");
            ui.label(format!(
                "font {}: {}",
                state.font_path().display(),
                state.font_status()
            ));
            for (key, entry) in state.textures.iter() {
                if !matches!(entry.status, LoadStatus::Loaded) {
                    ui.label(format!("matcap {}: {}", key.0, entry.status));
                }
            }
            let loaded = state
                .textures
                .iter()
                .filter(|(_, e)| matches!(e.status, LoadStatus::Loaded))
                .count();
            ui.small(format!("{loaded}/{} matcaps loaded", state.textures.len()));
        });
}

fn pointer_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right => Some(PointerButton::Secondary),
        MouseButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

struct GpuApp {
    assets: PathBuf,
    seed: Option<u64>,
    size: (u32, u32),
    gpu: Option<Gpu>,
    state: Option<AppState>,
    error: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(cli: Cli) -> Self {
        Self {
            assets: cli.assets,
            seed: cli.seed,
            size: (cli.width, cli.height),
            gpu: None,
            state: None,
            error: None,
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        // Nothing else starts until the window and GPU exist.
        match Gpu::new(event_loop, self.size) {
            Ok(gpu) => {
                let size = gpu.window.inner_size();
                let scale = gpu.window.scale_factor();
                let mut state = AppState::new(
                    &self.assets,
                    self.seed,
                    Viewport::from_physical(size.width, size.height, scale),
                );
                state.resize(size.width, size.height, scale);
                gpu.window.request_redraw();
                self.gpu = Some(gpu);
                self.state = Some(state);
            }
            Err(e) => {
                tracing::error!("failed to initialize: {e:#}");
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let (Some(gpu), Some(state)) = (&mut self.gpu, &mut self.state) else {
            return;
        };
        let consumed = gpu.egui_winit.on_window_event(&gpu.window, &event).consumed;

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                gpu.resize(state, size);
            }
            WindowEvent::RedrawRequested => {
                gpu.redraw(state);
                gpu.window.request_redraw();
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                state.set_shift(modifiers.state().shift_key());
            }
            // A drag that started in the scene must end even over the panel.
            WindowEvent::MouseInput {
                state: ElementState::Released,
                ..
            } => {
                state.pointer_released();
            }
            _ if consumed => {}
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button,
                ..
            } => {
                if let Some(button) = pointer_button(button) {
                    state.pointer_pressed(button);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                state.pointer_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32,
                };
                state.wheel(dy);
            }
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!(
        "textscene-desktop starting, assets from {}",
        cli.assets.display()
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(cli);
    event_loop.run_app(&mut app)?;

    match app.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
