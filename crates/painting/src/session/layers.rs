//! Layer management and target selection

use painter_ipc::LayerInfo;
use tracing::{debug, info};

use super::{PaintSession, PaintTarget, SessionState};
use crate::error::PaintError;
use crate::image_io::{decode_image, ColorEncoding, SourceImage};
use crate::layer::MaterialLayer;
use crate::types::ParameterSemantic;

impl PaintSession {
    /// Add a layer on top of the stack with a canvas per required semantic
    ///
    /// Without a reference material there is nothing to paint and the call
    /// is rejected.
    pub fn add_layer(&mut self, name: Option<String>) -> Result<usize, PaintError> {
        if self.material.is_none() {
            return Err(PaintError::NoReferenceMaterial);
        }
        let name = name.unwrap_or_else(|| self.stack.next_layer_name());
        let mut layer = MaterialLayer::new(name);
        layer.set_address_mode(self.address_mode);
        layer.ensure_parameters(&self.required_semantics(), self.resolution)?;
        Ok(self.stack.add_layer(layer))
    }

    /// Remove a layer; a target on it is cleared
    pub fn remove_layer(&mut self, index: usize) -> Result<(), PaintError> {
        self.check_layer(index)?;
        if let Some(target) = self.target {
            if target.layer == index {
                self.clear_target();
            } else if target.layer > index {
                self.target = Some(PaintTarget {
                    layer: target.layer - 1,
                    ..target
                });
            }
        }
        self.stack.remove_layer(index);
        Ok(())
    }

    /// Reorder a layer; the target follows its layer
    pub fn move_layer(&mut self, from: usize, to: usize) -> Result<(), PaintError> {
        self.check_layer(from)?;
        self.check_layer(to)?;
        self.stack.move_layer(from, to);
        if let Some(target) = self.target.as_mut() {
            target.layer = moved_index(target.layer, from, to);
        }
        Ok(())
    }

    pub fn rename_layer(&mut self, index: usize, name: impl Into<String>) -> Result<(), PaintError> {
        self.layer_mut(index)?.rename(name);
        Ok(())
    }

    pub fn set_layer_visible(&mut self, index: usize, visible: bool) -> Result<(), PaintError> {
        self.layer_mut(index)?.set_visible(visible);
        Ok(())
    }

    /// Make (layer, semantic) the only paint target
    pub fn select_target(&mut self, layer: usize, semantic: ParameterSemantic) -> Result<(), PaintError> {
        let candidate = self.layer_mut(layer)?;
        if !candidate.has_semantic(semantic) {
            return Err(PaintError::MissingSemantic {
                layer: candidate.name().to_string(),
                semantic,
            });
        }
        self.engine.end_stroke();
        self.target = Some(PaintTarget { layer, semantic });
        self.state = SessionState::TargetSelected;
        self.sync_active_flags();
        debug!("painter: target layer {} {}", layer, semantic);
        Ok(())
    }

    /// Leave paint mode
    pub fn clear_target(&mut self) {
        self.engine.end_stroke();
        self.target = None;
        self.state = SessionState::Idle;
        self.sync_active_flags();
    }

    /// Seed a canvas with an image
    pub fn import_base_texture(
        &mut self,
        layer: usize,
        semantic: ParameterSemantic,
        image: &SourceImage,
    ) -> Result<(), PaintError> {
        let canvas = super::target_canvas(&mut self.stack, PaintTarget { layer, semantic })?;
        canvas.import_from_source(image)?;
        info!("painter: imported base texture into layer {} {}", layer, semantic);
        Ok(())
    }

    /// Seed a canvas from encoded image bytes
    ///
    /// Color semantics are decoded as sRGB, the rest as linear data.
    pub fn import_base_texture_encoded(
        &mut self,
        layer: usize,
        semantic: ParameterSemantic,
        name: &str,
        bytes: &[u8],
    ) -> Result<(), PaintError> {
        let image = decode_image(bytes, ColorEncoding::for_color(semantic.is_color())).map_err(|source| {
            PaintError::UnreadableImage {
                name: name.to_string(),
                source,
            }
        })?;
        self.import_base_texture(layer, semantic, &image)
    }

    /// Layer list for display
    pub fn layer_infos(&self) -> Vec<LayerInfo> {
        self.stack
            .layers()
            .iter()
            .map(|layer| LayerInfo {
                name: layer.name().to_string(),
                visible: layer.is_visible(),
                active: layer.is_active(),
                semantics: layer.semantics(),
            })
            .collect()
    }

    fn check_layer(&self, index: usize) -> Result<(), PaintError> {
        if index >= self.stack.len() {
            return Err(PaintError::LayerOutOfRange {
                index,
                count: self.stack.len(),
            });
        }
        Ok(())
    }

    fn layer_mut(&mut self, index: usize) -> Result<&mut MaterialLayer, PaintError> {
        let count = self.stack.len();
        self.stack
            .get_mut(index)
            .ok_or(PaintError::LayerOutOfRange { index, count })
    }

    fn sync_active_flags(&mut self) {
        let active = self.target.map(|t| t.layer);
        for index in 0..self.stack.len() {
            if let Some(layer) = self.stack.get_mut(index) {
                layer.set_active(Some(index) == active);
            }
        }
    }
}

/// New index of the layer at `index` after moving `from` to `to`
fn moved_index(index: usize, from: usize, to: usize) -> usize {
    if index == from {
        to
    } else if from < index && index <= to {
        index - 1
    } else if to <= index && index < from {
        index + 1
    } else {
        index
    }
}
