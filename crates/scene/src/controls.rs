//! Orbit-style camera controls with inertial damping.
//!
//! Pointer input only accumulates pending deltas; the camera moves when
//! [`OrbitControls::update`] runs, once per frame before rendering.

use crate::PerspectiveCamera;
use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

const POLAR_EPSILON: f32 = 1e-6;
const MIN_CHANGE: f32 = 1e-6;

/// Which pointer button started a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragMode {
    Rotate,
    Pan,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    mode: DragMode,
    last: Vec2,
}

/// Spherical coordinates around the target, Y up.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    /// Polar angle from +Y.
    phi: f32,
    /// Azimuth around Y, measured from +Z towards +X.
    theta: f32,
}

impl Spherical {
    fn from_offset(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
            theta: v.x.atan2(v.z),
        }
    }

    fn to_offset(self) -> Vec3 {
        let s = self.phi.sin() * self.radius;
        Vec3::new(
            s * self.theta.sin(),
            self.phi.cos() * self.radius,
            s * self.theta.cos(),
        )
    }
}

/// Orbits a camera around a target: primary drag rotates, secondary drag
/// (or shift + primary) pans in screen space, the wheel dollies.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    pan_offset: Vec3,
    drag: Option<Drag>,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            pan_offset: Vec3::ZERO,
            drag: None,
        }
    }
}

impl OrbitControls {
    /// Controls orbiting the camera's current target.
    pub fn new(camera: &PerspectiveCamera) -> Self {
        Self {
            target: camera.target,
            ..Self::default()
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn pointer_down(&mut self, button: PointerButton, position: Vec2, shift: bool) {
        let mode = match button {
            PointerButton::Primary if shift => DragMode::Pan,
            PointerButton::Primary => DragMode::Rotate,
            PointerButton::Secondary => DragMode::Pan,
            PointerButton::Middle => return,
        };
        self.drag = Some(Drag {
            mode,
            last: position,
        });
    }

    pub fn pointer_up(&mut self) {
        self.drag = None;
    }

    /// Feed a pointer position in physical pixels. `height` is the surface
    /// height the movement is measured against.
    pub fn pointer_move(&mut self, position: Vec2, height: f32, camera: &PerspectiveCamera) {
        let Some(drag) = &mut self.drag else {
            return;
        };
        let delta = position - drag.last;
        let mode = drag.mode;
        drag.last = position;
        if height <= 0.0 {
            return;
        }
        match mode {
            DragMode::Rotate => self.rotate(delta, height),
            DragMode::Pan => self.pan(delta, height, camera),
        }
    }

    /// One wheel notch; positive values move the camera towards the target.
    pub fn wheel(&mut self, delta: f32) {
        let step = 0.95_f32.powf(self.zoom_speed);
        if delta > 0.0 {
            self.scale *= step;
        } else if delta < 0.0 {
            self.scale /= step;
        }
    }

    fn rotate(&mut self, delta: Vec2, height: f32) {
        self.delta_theta -= TAU * delta.x / height * self.rotate_speed;
        self.delta_phi -= TAU * delta.y / height * self.rotate_speed;
    }

    fn pan(&mut self, delta: Vec2, height: f32, camera: &PerspectiveCamera) {
        let distance =
            (camera.position - self.target).length() * (camera.fov.to_radians() / 2.0).tan();
        let world = camera.world_matrix();
        let right = world.x_axis.truncate();
        let up = world.y_axis.truncate();
        let scale = 2.0 * distance / height * self.pan_speed;
        self.pan_offset += -right * delta.x * scale + up * delta.y * scale;
    }

    /// Advance the controls by one frame and move the camera. Returns whether
    /// the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let offset = camera.position - self.target;
        let mut spherical = Spherical::from_offset(offset);

        let factor = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };
        spherical.theta += self.delta_theta * factor;
        spherical.phi += self.delta_phi * factor;
        spherical.phi = spherical.phi.clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        spherical.radius =
            (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        self.target += self.pan_offset * factor;

        let position = self.target + spherical.to_offset();
        let moved = position.distance_squared(camera.position) > MIN_CHANGE * MIN_CHANGE
            || camera.target.distance_squared(self.target) > MIN_CHANGE * MIN_CHANGE;
        camera.position = position;
        camera.target = self.target;

        let keep = 1.0 - factor;
        self.delta_theta *= keep;
        self.delta_phi *= keep;
        self.pan_offset *= keep;
        self.scale = 1.0;

        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (OrbitControls, PerspectiveCamera) {
        let camera = PerspectiveCamera::default();
        (OrbitControls::new(&camera), camera)
    }

    fn drag(
        controls: &mut OrbitControls,
        camera: &PerspectiveCamera,
        button: PointerButton,
        by: Vec2,
    ) {
        controls.pointer_down(button, Vec2::ZERO, false);
        controls.pointer_move(by, 600.0, camera);
        controls.pointer_up();
    }

    #[test]
    fn idle_update_keeps_camera() {
        let (mut controls, mut camera) = setup();
        assert!(!controls.update(&mut camera));
        assert!(camera.position.abs_diff_eq(Vec3::new(0.0, 0.0, 3.0), 1e-5));
    }

    #[test]
    fn rotation_is_damped_over_frames() {
        let (mut controls, mut camera) = setup();
        drag(&mut controls, &camera, PointerButton::Primary, Vec2::new(60.0, 0.0));

        let start = camera.position;
        controls.update(&mut camera);
        let first = camera.position.distance(start);
        let mid = camera.position;
        controls.update(&mut camera);
        let second = camera.position.distance(mid);

        assert!(first > 0.0);
        assert!(second < first, "each frame moves less than the last");
        assert!((camera.position.length() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn rotation_converges_to_full_angle() {
        let (mut controls, mut camera) = setup();
        // A drag of height / 4 is a quarter turn.
        drag(&mut controls, &camera, PointerButton::Primary, Vec2::new(-150.0, 0.0));
        for _ in 0..500 {
            controls.update(&mut camera);
        }
        assert!(camera.position.abs_diff_eq(Vec3::new(3.0, 0.0, 0.0), 1e-3));
    }

    #[test]
    fn without_damping_rotation_is_immediate() {
        let (mut controls, mut camera) = setup();
        controls.enable_damping = false;
        drag(&mut controls, &camera, PointerButton::Primary, Vec2::new(-150.0, 0.0));
        controls.update(&mut camera);
        assert!(camera.position.abs_diff_eq(Vec3::new(3.0, 0.0, 0.0), 1e-4));
        assert!(!controls.update(&mut camera));
    }

    #[test]
    fn polar_angle_is_clamped() {
        let (mut controls, mut camera) = setup();
        controls.enable_damping = false;
        drag(&mut controls, &camera, PointerButton::Primary, Vec2::new(0.0, 5000.0));
        controls.update(&mut camera);
        assert!(camera.position.y > 2.99);
        assert!(camera.position.is_finite());
        assert!(camera.view_matrix().is_finite());
    }

    #[test]
    fn wheel_dollies_immediately() {
        let (mut controls, mut camera) = setup();
        controls.wheel(1.0);
        controls.update(&mut camera);
        assert!((camera.position.z - 3.0 * 0.95).abs() < 1e-5);
        controls.wheel(-1.0);
        controls.update(&mut camera);
        assert!((camera.position.z - 3.0).abs() < 1e-4);
    }

    #[test]
    fn secondary_drag_pans_target() {
        let (mut controls, mut camera) = setup();
        controls.enable_damping = false;
        drag(&mut controls, &camera, PointerButton::Secondary, Vec2::new(100.0, 0.0));
        controls.update(&mut camera);
        // Dragging right moves the target to the camera's left.
        assert!(controls.target.x < 0.0);
        assert!(controls.target.y.abs() < 1e-6);
        assert_eq!(camera.target, controls.target);
        assert!((camera.position - camera.target).abs_diff_eq(Vec3::new(0.0, 0.0, 3.0), 1e-5));
    }

    #[test]
    fn shift_primary_pans() {
        let (mut controls, mut camera) = setup();
        controls.enable_damping = false;
        controls.pointer_down(PointerButton::Primary, Vec2::ZERO, true);
        controls.pointer_move(Vec2::new(0.0, 100.0), 600.0, &camera);
        controls.pointer_up();
        controls.update(&mut camera);
        assert!(controls.target.y > 0.0);
    }

    #[test]
    fn moves_without_drag_are_ignored() {
        let (mut controls, mut camera) = setup();
        controls.pointer_move(Vec2::new(300.0, 300.0), 600.0, &camera);
        assert!(!controls.is_dragging());
        assert!(!controls.update(&mut camera));
    }
}
