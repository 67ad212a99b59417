//! CPU-side frame preparation: vertex and instance packing and the draw
//! list. Nothing here touches the GPU.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use textscene_common::{GeometryId, TextureKey};
use textscene_geometry::{Geometry, Topology};
use textscene_scene::Scene;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct InstanceData {
    pub model_0: [f32; 4],
    pub model_1: [f32; 4],
    pub model_2: [f32; 4],
    pub model_3: [f32; 4],
}

impl From<&Mat4> for InstanceData {
    fn from(model: &Mat4) -> Self {
        let cols = model.to_cols_array_2d();
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
        }
    }
}

/// Interleave positions and normals. Line geometry has no normals and gets
/// zeros.
pub(crate) fn vertices(geometry: &Geometry) -> Vec<Vertex> {
    geometry
        .positions
        .iter()
        .enumerate()
        .map(|(i, p)| Vertex {
            position: p.to_array(),
            normal: geometry
                .normals
                .get(i)
                .map(|n| n.to_array())
                .unwrap_or([0.0; 3]),
        })
        .collect()
}

/// One instanced draw.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DrawCall {
    pub geometry: GeometryId,
    pub topology: Topology,
    /// Matcap to bind; `None` for lines.
    pub matcap: Option<TextureKey>,
    pub instances: std::ops::Range<u32>,
}

/// Everything one frame draws, with all instances packed into one buffer.
#[derive(Debug, Clone, Default)]
pub(crate) struct FramePlan {
    pub instances: Vec<InstanceData>,
    pub draws: Vec<DrawCall>,
}

impl FramePlan {
    pub fn build(scene: &Scene) -> Self {
        let mut plan = Self::default();
        for batch in scene.batches() {
            let matcap = match batch.material {
                Some(id) => match scene.material(id) {
                    Some(m) => Some(m.matcap),
                    None => continue,
                },
                None => None,
            };
            let start = plan.instances.len() as u32;
            plan.instances.extend(batch.models.iter().map(InstanceData::from));
            plan.draws.push(DrawCall {
                geometry: batch.geometry,
                topology: batch.topology,
                matcap,
                instances: start..plan.instances.len() as u32,
            });
        }
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use textscene_common::Transform;
    use textscene_geometry::{TorusParams, torus, wireframe};
    use textscene_scene::{MatcapMaterial, PerspectiveCamera};

    #[test]
    fn instance_layout_matches_shader() {
        assert_eq!(std::mem::size_of::<InstanceData>(), 64);
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
        assert_eq!(std::mem::size_of::<CameraUniform>(), 128);
    }

    #[test]
    fn instance_columns_carry_translation() {
        let model = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let data = InstanceData::from(&model);
        assert_eq!(data.model_3, [1.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn line_vertices_get_zero_normals() {
        let lines = wireframe(&torus(TorusParams::default()));
        let verts = vertices(&lines);
        assert_eq!(verts.len(), lines.positions.len());
        assert!(verts.iter().all(|v| v.normal == [0.0; 3]));
    }

    #[test]
    fn plan_packs_instances_contiguously() {
        let mut scene = Scene::new(PerspectiveCamera::default());
        let solid = torus(TorusParams::default());
        let lines = scene.add_geometry(wireframe(&solid));
        let solid = scene.add_geometry(solid);
        let material = scene.add_material(MatcapMaterial::new(TextureKey(4)));
        for i in 0..5 {
            let t = Transform::from_position(Vec3::splat(i as f32));
            scene.add_mesh(solid, material, t).unwrap();
        }
        scene.add_lines(lines, Transform::default()).unwrap();

        let plan = FramePlan::build(&scene);
        assert_eq!(plan.instances.len(), 6);
        assert_eq!(plan.draws.len(), 2);
        let mesh = plan.draws.iter().find(|d| d.matcap.is_some()).unwrap();
        assert_eq!(mesh.matcap, Some(TextureKey(4)));
        assert_eq!(mesh.instances.len(), 5);
        let line = plan.draws.iter().find(|d| d.matcap.is_none()).unwrap();
        assert_eq!(line.topology, Topology::Lines);
        assert_eq!(line.instances.len(), 1);

        // Ranges tile the instance buffer without overlap.
        let mut ranges: Vec<_> = plan.draws.iter().map(|d| d.instances.clone()).collect();
        ranges.sort_by_key(|r| r.start);
        assert_eq!(ranges[0].start, 0);
        assert_eq!(ranges[0].end, ranges[1].start);
        assert_eq!(ranges[1].end, 6);
    }

    #[test]
    fn empty_scene_plans_nothing() {
        let plan = FramePlan::build(&Scene::new(PerspectiveCamera::default()));
        assert!(plan.instances.is_empty());
        assert!(plan.draws.is_empty());
    }
}
