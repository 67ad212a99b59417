use crate::{DebugPanel, MatcapMaterial, Scene, SceneError};
use glam::Vec3;
use rand::Rng;
use std::f32::consts::PI;
use textscene_assets::Font;
use textscene_assets::paths::MATCAP_COUNT;
use textscene_common::{MaterialId, NodeId, TextureKey, Transform};
use textscene_geometry::{TextParams, TorusParams, text_geometry, torus, wireframe};

pub const TEXT: &str = "Hello Threejs";
pub const DONUT_COUNT: usize = 100;
/// Half extent of the cube the donuts are scattered in.
pub const DONUT_SPREAD: f32 = 5.0;

pub const TEXT_VISIBILITY: &str = "text visibility";
pub const WIREFRAME_VISIBILITY: &str = "wireframe visibility";
pub const MATCAP_CHOICES: &str = "matcap choices";

/// Handles to everything the population step created.
#[derive(Debug, Clone)]
pub struct Populated {
    pub material: MaterialId,
    pub text: NodeId,
    pub wireframe: NodeId,
    pub donuts: Vec<NodeId>,
    pub panel: DebugPanel,
}

/// Fill the scene once the font is available: text, its stacked wireframe,
/// the debug controls and a field of donuts sharing the text's material.
pub fn populate<R: Rng>(
    scene: &mut Scene,
    font: &Font,
    rng: &mut R,
) -> Result<Populated, SceneError> {
    let material = scene.add_material(MatcapMaterial::new(TextureKey(1)));

    let mut text = text_geometry(font, TEXT, TextParams::default())?;
    text.center();
    let bbox = text.compute_bounding_box();
    let lines = wireframe(&text);

    let text_id = scene.add_geometry(text);
    let text = scene.add_mesh(text_id, material, Transform::default())?;

    let lines_id = scene.add_geometry(lines);
    let stack_y = bbox.max.y + (bbox.max.y - bbox.min.y) / 2.0;
    let wireframe = scene.add_lines(
        lines_id,
        Transform::from_position(Vec3::new(0.0, stack_y, 0.0)),
    )?;

    let mut panel = DebugPanel::new();
    panel
        .bind_visibility(text, TEXT_VISIBILITY)
        .bind_visibility(wireframe, WIREFRAME_VISIBILITY)
        .bind_matcap(material, MATCAP_CHOICES, (1..=MATCAP_COUNT).map(TextureKey));

    let donut = scene.add_geometry(torus(TorusParams::default()));
    let mut donuts = Vec::with_capacity(DONUT_COUNT);
    for _ in 0..DONUT_COUNT {
        donuts.push(scene.add_mesh(donut, material, donut_transform(rng))?);
    }

    tracing::info!(
        "scene populated: {} renderable nodes, text {:.3} x {:.3} x {:.3}",
        scene.renderable_count(),
        bbox.size().x,
        bbox.size().y,
        bbox.size().z
    );

    Ok(Populated {
        material,
        text,
        wireframe,
        donuts,
        panel,
    })
}

/// Random position in the spread cube, random X/Y rotation in [0, π) with
/// Z left at zero, and one uniform scale in [0, 1).
pub fn donut_transform<R: Rng>(rng: &mut R) -> Transform {
    let mut axis = || rng.random_range(-DONUT_SPREAD..DONUT_SPREAD);
    let position = Vec3::new(axis(), axis(), axis());
    let rotation = Vec3::new(rng.random_range(0.0..PI), rng.random_range(0.0..PI), 0.0);
    let scale: f32 = rng.random();
    Transform {
        position,
        rotation,
        scale: Vec3::splat(scale),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PerspectiveCamera;
    use crate::panel::ControlValue;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    // A box for the fallback glyph, "o" with a hole and "l" with a curve.
    const FONT: &str = r#"{
        "familyName": "Fixture",
        "resolution": 1000,
        "boundingBox": { "xMin": 0, "xMax": 800, "yMin": -200, "yMax": 900 },
        "glyphs": {
            "?": { "ha": 600, "o": "m 0 0 l 500 0 l 500 700 l 0 700" },
            "o": { "ha": 600,
                   "o": "m 0 0 l 500 0 l 500 500 l 0 500 m 150 150 l 150 350 l 350 350 l 350 150" },
            "l": { "ha": 300, "o": "m 0 0 l 150 0 q 150 800 250 400 l 0 800" },
            " ": { "ha": 300 }
        }
    }"#;

    fn populated(seed: u64) -> (Scene, Populated) {
        let font = Font::from_json(FONT).unwrap();
        let mut scene = Scene::new(PerspectiveCamera::default());
        let mut rng = StdRng::seed_from_u64(seed);
        let populated = populate(&mut scene, &font, &mut rng).unwrap();
        (scene, populated)
    }

    #[test]
    fn node_counts() {
        let (scene, p) = populated(1);
        assert_eq!(scene.mesh_count(), 1 + DONUT_COUNT);
        assert_eq!(scene.line_count(), 1);
        assert_eq!(scene.renderable_count(), 102);
        assert_eq!(scene.camera_count(), 1);
        assert_eq!(p.donuts.len(), DONUT_COUNT);
        assert_eq!(p.panel.len(), 3);
    }

    #[test]
    fn donut_transforms_stay_in_range() {
        let (scene, p) = populated(7);
        for id in &p.donuts {
            let t = scene.node(*id).unwrap().transform;
            assert!(t.position.abs().max_element() <= DONUT_SPREAD);
            assert!((0.0..PI).contains(&t.rotation.x));
            assert!((0.0..PI).contains(&t.rotation.y));
            assert_eq!(t.rotation.z, 0.0);
            assert_eq!(t.scale.x, t.scale.y);
            assert_eq!(t.scale.y, t.scale.z);
            assert!((0.0..1.0).contains(&t.scale.x));
        }
    }

    #[test]
    fn donuts_share_one_geometry() {
        let (scene, p) = populated(3);
        let geometries: std::collections::BTreeSet<_> = p
            .donuts
            .iter()
            .map(|id| match scene.node(*id).unwrap().kind {
                crate::NodeKind::Mesh { geometry, .. } => geometry,
                _ => panic!("donut is not a mesh"),
            })
            .collect();
        assert_eq!(geometries.len(), 1);
    }

    #[test]
    fn text_is_centred_and_wireframe_stacked() {
        let (scene, p) = populated(2);
        let crate::NodeKind::Mesh { geometry, .. } = scene.node(p.text).unwrap().kind else {
            panic!("text is not a mesh");
        };
        let bbox = scene.geometry(geometry).unwrap().bounding_box().unwrap();
        assert!(bbox.min.abs_diff_eq(-bbox.max, 1e-5));

        let wire = scene.node(p.wireframe).unwrap().transform;
        let expected = bbox.max.y + (bbox.max.y - bbox.min.y) / 2.0;
        assert_eq!(wire.position.y, expected);
        assert_eq!(wire.position.x, 0.0);
    }

    #[test]
    fn text_visibility_control_only_hides_text() {
        let (mut scene, p) = populated(4);
        let control = p.panel.find(TEXT_VISIBILITY).unwrap().clone();
        control.apply(&mut scene, ControlValue::Bool(false));

        for (id, node) in scene.nodes() {
            assert_eq!(node.visible, id != p.text, "node {id:?}");
        }
    }

    #[test]
    fn matcap_choice_reaches_donuts() {
        let (mut scene, p) = populated(5);
        let control = p.panel.find(MATCAP_CHOICES).unwrap().clone();
        let crate::panel::Control::Matcap { choices, .. } = &control else {
            panic!("expected a matcap control");
        };
        assert_eq!(choices.len(), MATCAP_COUNT as usize);

        control.apply(&mut scene, ControlValue::Texture(TextureKey(6)));
        assert_eq!(scene.mesh_matcap(p.text), Some(TextureKey(6)));
        assert!(
            p.donuts
                .iter()
                .all(|id| scene.mesh_matcap(*id) == Some(TextureKey(6)))
        );
    }

    #[test]
    fn same_seed_same_scene() {
        let (a, pa) = populated(11);
        let (b, _) = populated(11);
        for id in &pa.donuts {
            assert_eq!(a.node(*id).unwrap().transform, b.node(*id).unwrap().transform);
        }
    }
}
