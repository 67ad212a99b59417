use glam::{Mat4, Vec3};

/// Perspective camera looking at a target point.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            fov: 75.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
            position: Vec3::new(0.0, 0.0, 3.0),
            target: Vec3::ZERO,
        }
    }
}

impl PerspectiveCamera {
    pub fn new(aspect: f32) -> Self {
        Self {
            aspect,
            ..Self::default()
        }
    }

    /// Recompute the aspect ratio for a surface of `width` x `height`.
    /// Zero-sized surfaces (minimised windows) leave the camera untouched.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Camera-to-world transform; its columns are the camera's right, up
    /// and backward axes.
    pub fn world_matrix(&self) -> Mat4 {
        self.view_matrix().inverse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cam = PerspectiveCamera::default();
        assert_eq!(cam.fov, 75.0);
        assert_eq!(cam.near, 0.1);
        assert_eq!(cam.far, 100.0);
        assert_eq!(cam.position, Vec3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn aspect_follows_viewport() {
        let mut cam = PerspectiveCamera::default();
        cam.set_viewport(800.0, 600.0);
        assert_eq!(cam.aspect, 800.0 / 600.0);
        cam.set_viewport(0.0, 600.0);
        assert_eq!(cam.aspect, 800.0 / 600.0);
    }

    #[test]
    fn origin_projects_to_centre() {
        let cam = PerspectiveCamera::default();
        let clip = cam.view_projection() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-6 && ndc.y.abs() < 1e-6);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn world_matrix_axes() {
        let cam = PerspectiveCamera::default();
        let world = cam.world_matrix();
        assert!(world.x_axis.truncate().abs_diff_eq(Vec3::X, 1e-6));
        assert!(world.y_axis.truncate().abs_diff_eq(Vec3::Y, 1e-6));
        assert!(world.w_axis.truncate().abs_diff_eq(cam.position, 1e-6));
    }
}
