use crate::{Geometry, Topology};
use glam::Vec3;
use std::f32::consts::TAU;

/// Torus dimensions. The ring lies in the XY plane around the Z axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorusParams {
    /// Distance from the centre of the torus to the centre of the tube.
    pub radius: f32,
    /// Tube radius.
    pub tube: f32,
    /// Segments around the tube cross-section.
    pub radial_segments: u32,
    /// Segments around the ring.
    pub tubular_segments: u32,
}

impl Default for TorusParams {
    fn default() -> Self {
        Self {
            radius: 0.3,
            tube: 0.2,
            radial_segments: 32,
            tubular_segments: 64,
        }
    }
}

/// Build a closed torus with smooth normals.
pub fn torus(params: TorusParams) -> Geometry {
    let radial = params.radial_segments.max(2);
    let tubular = params.tubular_segments.max(3);
    let ring = tubular + 1;

    let vertex_count = ((radial + 1) * ring) as usize;
    let mut positions = Vec::with_capacity(vertex_count);
    let mut normals = Vec::with_capacity(vertex_count);

    for j in 0..=radial {
        let v = j as f32 / radial as f32 * TAU;
        let (sin_v, cos_v) = v.sin_cos();
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * TAU;
            let (sin_u, cos_u) = u.sin_cos();
            let p = Vec3::new(
                (params.radius + params.tube * cos_v) * cos_u,
                (params.radius + params.tube * cos_v) * sin_u,
                params.tube * sin_v,
            );
            let center = Vec3::new(params.radius * cos_u, params.radius * sin_u, 0.0);
            positions.push(p);
            normals.push((p - center).normalize_or_zero());
        }
    }

    let mut indices = Vec::with_capacity((radial * tubular * 6) as usize);
    for j in 1..=radial {
        for i in 1..=tubular {
            let a = ring * j + i - 1;
            let b = ring * (j - 1) + i - 1;
            let c = ring * (j - 1) + i;
            let d = ring * j + i;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    Geometry::new(Topology::Triangles, positions, normals, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_counts() {
        let g = torus(TorusParams::default());
        assert_eq!(g.vertex_count(), 33 * 65);
        assert_eq!(g.primitive_count(), 32 * 64 * 2);
        assert!(g.indices.iter().all(|&i| (i as usize) < g.vertex_count()));
    }

    #[test]
    fn extent_matches_radii() {
        let mut g = torus(TorusParams::default());
        let bbox = g.compute_bounding_box();
        assert!((bbox.max.x - 0.5).abs() < 1e-5);
        assert!((bbox.min.y + 0.5).abs() < 1e-5);
        assert!((bbox.max.z - 0.2).abs() < 1e-5);
    }

    #[test]
    fn normals_point_away_from_tube_centre() {
        let params = TorusParams::default();
        let g = torus(params);
        for (p, n) in g.positions.iter().zip(&g.normals) {
            assert!((n.length() - 1.0).abs() < 1e-4);
            let ring_dir = Vec3::new(p.x, p.y, 0.0).normalize();
            let tube_centre = ring_dir * params.radius;
            assert!((*p - tube_centre).dot(*n) > 0.0);
        }
    }
}
