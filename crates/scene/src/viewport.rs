/// Highest device pixel ratio the drawing buffer is rendered at.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Host surface size in logical pixels plus the effective pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, scale_factor: f64) -> Self {
        Self {
            width,
            height,
            pixel_ratio: scale_factor.min(MAX_PIXEL_RATIO),
        }
    }

    /// Build from a physical surface size and the window's scale factor.
    pub fn from_physical(width: u32, height: u32, scale_factor: f64) -> Self {
        let scale_factor = if scale_factor > 0.0 { scale_factor } else { 1.0 };
        Self::new(
            f64::from(width) / scale_factor,
            f64::from(height) / scale_factor,
            scale_factor,
        )
    }

    pub fn aspect(&self) -> f32 {
        (self.width / self.height) as f32
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Size of the render target in physical pixels, never zero.
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        let px = |v: f64| ((v * self.pixel_ratio).round() as u32).max(1);
        (px(self.width), px(self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_ratio_is_clamped() {
        let vp = Viewport::from_physical(3000, 1500, 3.0);
        assert_eq!(vp.pixel_ratio, 2.0);
        assert_eq!((vp.width, vp.height), (1000.0, 500.0));
        assert_eq!(vp.drawing_buffer_size(), (2000, 1000));
    }

    #[test]
    fn low_density_keeps_ratio() {
        let vp = Viewport::from_physical(1280, 720, 1.0);
        assert_eq!(vp.drawing_buffer_size(), (1280, 720));
        assert_eq!(vp.aspect(), 1280.0 / 720.0);
    }

    #[test]
    fn minimised_surface_still_has_a_buffer() {
        let vp = Viewport::from_physical(0, 0, 1.5);
        assert!(vp.is_empty());
        assert_eq!(vp.drawing_buffer_size(), (1, 1));
    }
}
