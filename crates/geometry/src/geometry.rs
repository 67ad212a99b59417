use glam::Vec3;
use textscene_common::Aabb;

/// How indices are grouped into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Triangles,
    Lines,
}

/// Indexed vertex data for one shape.
///
/// Line geometry carries no normals.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub topology: Topology,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
    bounding_box: Option<Aabb>,
}

impl Geometry {
    pub fn new(
        topology: Topology,
        positions: Vec<Vec3>,
        normals: Vec<Vec3>,
        indices: Vec<u32>,
    ) -> Self {
        Self {
            topology,
            positions,
            normals,
            indices,
            bounding_box: None,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn primitive_count(&self) -> usize {
        match self.topology {
            Topology::Triangles => self.indices.len() / 3,
            Topology::Lines => self.indices.len() / 2,
        }
    }

    /// Bounding box from the last [`compute_bounding_box`](Self::compute_bounding_box).
    pub fn bounding_box(&self) -> Option<Aabb> {
        self.bounding_box
    }

    /// Recompute the bounding box from the current vertex positions.
    pub fn compute_bounding_box(&mut self) -> Aabb {
        let bbox = Aabb::from_points(&self.positions);
        self.bounding_box = Some(bbox);
        bbox
    }

    pub fn translate(&mut self, offset: Vec3) {
        for p in &mut self.positions {
            *p += offset;
        }
        if let Some(bbox) = &mut self.bounding_box {
            bbox.min += offset;
            bbox.max += offset;
        }
    }

    /// Move the geometry so its bounding box is centred on the origin, then
    /// refresh the stored bounding box.
    pub fn center(&mut self) -> Vec3 {
        let bbox = self.compute_bounding_box();
        if bbox.is_empty() {
            return Vec3::ZERO;
        }
        let offset = -bbox.center();
        self.translate(offset);
        self.compute_bounding_box();
        offset
    }
}
