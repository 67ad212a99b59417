use crate::{PerspectiveCamera, SceneError};
use glam::Mat4;
use std::collections::BTreeMap;
use std::sync::Arc;
use textscene_common::{GeometryId, MaterialId, NodeId, TextureKey, Transform};
use textscene_geometry::{Geometry, Topology};

/// Lighting-free material that samples a matcap texture by view-space normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatcapMaterial {
    pub matcap: TextureKey,
}

impl MatcapMaterial {
    pub fn new(matcap: TextureKey) -> Self {
        Self { matcap }
    }
}

/// What a node draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Mesh {
        geometry: GeometryId,
        material: MaterialId,
    },
    /// Line segments drawn in the default line colour.
    Lines { geometry: GeometryId },
    Camera,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub transform: Transform,
    pub visible: bool,
}

impl Node {
    pub fn is_renderable(&self) -> bool {
        !matches!(self.kind, NodeKind::Camera)
    }
}

/// Instances sharing one geometry and material, ready for a single draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawBatch {
    pub geometry: GeometryId,
    /// `None` for line nodes.
    pub material: Option<MaterialId>,
    pub topology: Topology,
    pub models: Vec<Mat4>,
}

/// The scene graph: nodes plus the arenas of shared geometry and materials.
///
/// Geometry is stored behind `Arc` and never handed out mutably. Materials
/// are arena slots, so editing one through [`Scene::material_mut`] changes
/// every mesh that references it.
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: Vec<Node>,
    geometries: Vec<Arc<Geometry>>,
    materials: Vec<MatcapMaterial>,
    camera: PerspectiveCamera,
    camera_node: NodeId,
}

impl Scene {
    pub fn new(camera: PerspectiveCamera) -> Self {
        let node = Node {
            kind: NodeKind::Camera,
            transform: Transform::from_position(camera.position),
            visible: true,
        };
        Self {
            nodes: vec![node],
            geometries: Vec::new(),
            materials: Vec::new(),
            camera,
            camera_node: NodeId(0),
        }
    }

    // --- Camera ---

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.camera
    }

    /// Copy the camera position onto its node after the camera moved.
    pub fn sync_camera_node(&mut self) {
        let position = self.camera.position;
        if let Some(node) = self.nodes.get_mut(self.camera_node.0 as usize) {
            node.transform.position = position;
        }
    }

    // --- Shared resources ---

    /// Freeze `geometry` and add it to the arena.
    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        let id = GeometryId(self.geometries.len() as u32);
        self.geometries.push(Arc::new(geometry));
        id
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&Arc<Geometry>> {
        self.geometries.get(id.0 as usize)
    }

    pub fn geometries(&self) -> impl Iterator<Item = (GeometryId, &Arc<Geometry>)> {
        self.geometries
            .iter()
            .enumerate()
            .map(|(i, g)| (GeometryId(i as u32), g))
    }

    pub fn add_material(&mut self, material: MatcapMaterial) -> MaterialId {
        let id = MaterialId(self.materials.len() as u32);
        self.materials.push(material);
        id
    }

    pub fn material(&self, id: MaterialId) -> Option<&MatcapMaterial> {
        self.materials.get(id.0 as usize)
    }

    pub fn material_mut(&mut self, id: MaterialId) -> Option<&mut MatcapMaterial> {
        self.materials.get_mut(id.0 as usize)
    }

    // --- Nodes ---

    pub fn add_mesh(
        &mut self,
        geometry: GeometryId,
        material: MaterialId,
        transform: Transform,
    ) -> Result<NodeId, SceneError> {
        self.expect_topology(geometry, Topology::Triangles)?;
        if self.material(material).is_none() {
            return Err(SceneError::UnknownMaterial(material));
        }
        Ok(self.push_node(NodeKind::Mesh { geometry, material }, transform))
    }

    pub fn add_lines(
        &mut self,
        geometry: GeometryId,
        transform: Transform,
    ) -> Result<NodeId, SceneError> {
        self.expect_topology(geometry, Topology::Lines)?;
        Ok(self.push_node(NodeKind::Lines { geometry }, transform))
    }

    fn expect_topology(&self, id: GeometryId, expected: Topology) -> Result<(), SceneError> {
        let geometry = self.geometry(id).ok_or(SceneError::UnknownGeometry(id))?;
        if geometry.topology != expected {
            return Err(SceneError::Topology {
                geometry: id,
                expected,
                found: geometry.topology,
            });
        }
        Ok(())
    }

    fn push_node(&mut self, kind: NodeKind, transform: Transform) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            transform,
            visible: true,
        });
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    /// Set one node's visibility. Returns false for an unknown id.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    /// Texture currently used by a mesh node, through its material.
    pub fn mesh_matcap(&self, id: NodeId) -> Option<TextureKey> {
        match self.node(id)?.kind {
            NodeKind::Mesh { material, .. } => self.material(material).map(|m| m.matcap),
            _ => None,
        }
    }

    /// Number of mesh and line nodes.
    pub fn renderable_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_renderable()).count()
    }

    pub fn mesh_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::Mesh { .. }))
            .count()
    }

    pub fn line_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::Lines { .. }))
            .count()
    }

    pub fn camera_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::Camera))
            .count()
    }

    /// Visible renderable nodes grouped by (geometry, material), in a stable
    /// order.
    pub fn batches(&self) -> Vec<DrawBatch> {
        let mut groups: BTreeMap<(GeometryId, Option<MaterialId>), Vec<Mat4>> = BTreeMap::new();
        for node in self.nodes.iter().filter(|n| n.visible) {
            let key = match node.kind {
                NodeKind::Mesh { geometry, material } => (geometry, Some(material)),
                NodeKind::Lines { geometry } => (geometry, None),
                NodeKind::Camera => continue,
            };
            groups.entry(key).or_default().push(node.transform.matrix());
        }

        groups
            .into_iter()
            .filter_map(|((geometry, material), models)| {
                let topology = self.geometry(geometry)?.topology;
                Some(DrawBatch {
                    geometry,
                    material,
                    topology,
                    models,
                })
            })
            .collect()
    }
}
