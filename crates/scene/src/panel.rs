//! Debug panel bindings.
//!
//! A control names a live property on the scene; reading and writing go
//! straight through to the scene with no state of its own, so the UI layer
//! only has to draw a widget per control.

use crate::Scene;
use textscene_common::{MaterialId, NodeId, TextureKey};

/// A value carried by a panel widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlValue {
    Bool(bool),
    Texture(TextureKey),
}

/// One widget bound to a scene property.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    /// Checkbox over a node's `visible` flag.
    Visibility { label: String, node: NodeId },
    /// Choice over the texture of a shared matcap material.
    Matcap {
        label: String,
        material: MaterialId,
        choices: Vec<TextureKey>,
    },
}

impl Control {
    pub fn label(&self) -> &str {
        match self {
            Self::Visibility { label, .. } | Self::Matcap { label, .. } => label,
        }
    }

    /// Current value of the bound property, if the target still exists.
    pub fn read(&self, scene: &Scene) -> Option<ControlValue> {
        match self {
            Self::Visibility { node, .. } => {
                scene.node(*node).map(|n| ControlValue::Bool(n.visible))
            }
            Self::Matcap { material, .. } => scene
                .material(*material)
                .map(|m| ControlValue::Texture(m.matcap)),
        }
    }

    /// Write `value` onto the bound property. Mismatched value kinds and
    /// missing targets are ignored; returns whether anything was written.
    pub fn apply(&self, scene: &mut Scene, value: ControlValue) -> bool {
        match (self, value) {
            (Self::Visibility { node, .. }, ControlValue::Bool(visible)) => {
                scene.set_visible(*node, visible)
            }
            (Self::Matcap { material, .. }, ControlValue::Texture(key)) => {
                match scene.material_mut(*material) {
                    Some(m) => {
                        m.matcap = key;
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }
}

/// The set of controls shown in the debug side panel.
#[derive(Debug, Clone, Default)]
pub struct DebugPanel {
    controls: Vec<Control>,
}

impl DebugPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_visibility(&mut self, node: NodeId, label: impl Into<String>) -> &mut Self {
        self.controls.push(Control::Visibility {
            label: label.into(),
            node,
        });
        self
    }

    pub fn bind_matcap(
        &mut self,
        material: MaterialId,
        label: impl Into<String>,
        choices: impl IntoIterator<Item = TextureKey>,
    ) -> &mut Self {
        self.controls.push(Control::Matcap {
            label: label.into(),
            material,
            choices: choices.into_iter().collect(),
        });
        self
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    /// Control with the given label.
    pub fn find(&self, label: &str) -> Option<&Control> {
        self.controls.iter().find(|c| c.label() == label)
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }
}
