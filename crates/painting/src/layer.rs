//! A named set of parameter canvases

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::canvas::ParameterCanvas;
use crate::types::{AddressMode, ParameterSemantic};
use crate::validation::{validate_canvas_resolution, ValidationError};

/// One paint layer: at most one canvas per semantic
#[derive(Debug, Clone)]
pub struct MaterialLayer {
    name: String,
    visible: bool,
    active: bool,
    address_mode: AddressMode,
    canvases: BTreeMap<ParameterSemantic, ParameterCanvas>,
}

impl MaterialLayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            active: false,
            address_mode: AddressMode::Clamp,
            canvases: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Reconcile canvases with the semantics the material exposes
    ///
    /// Missing canvases are created, canvases for semantics no longer
    /// required are disposed, and every retained canvas is brought to
    /// `resolution`. Redundant calls change nothing.
    pub fn ensure_parameters(
        &mut self,
        required: &[ParameterSemantic],
        resolution: u32,
    ) -> Result<(), ValidationError> {
        validate_canvas_resolution(resolution)?;

        self.canvases.retain(|semantic, canvas| {
            let keep = required.contains(semantic);
            if !keep {
                debug!("layer '{}': dropping {} canvas", self.name, semantic);
                canvas.dispose();
            }
            keep
        });

        for &semantic in required {
            let canvas = match self.canvases.entry(semantic) {
                std::collections::btree_map::Entry::Occupied(entry) => entry.into_mut(),
                std::collections::btree_map::Entry::Vacant(entry) => {
                    info!("layer '{}': adding {} canvas", self.name, semantic);
                    let mut canvas = ParameterCanvas::new(semantic, resolution)?;
                    canvas.set_address_mode(self.address_mode);
                    entry.insert(canvas)
                }
            };
            canvas.set_resolution(resolution)?;
            canvas.ensure_initialized();
        }
        Ok(())
    }

    pub fn has_semantic(&self, semantic: ParameterSemantic) -> bool {
        self.canvases.contains_key(&semantic)
    }

    pub fn canvas(&self, semantic: ParameterSemantic) -> Option<&ParameterCanvas> {
        self.canvases.get(&semantic)
    }

    pub fn canvas_mut(&mut self, semantic: ParameterSemantic) -> Option<&mut ParameterCanvas> {
        self.canvases.get_mut(&semantic)
    }

    /// Semantics owned by this layer, in canonical order
    pub fn semantics(&self) -> Vec<ParameterSemantic> {
        self.canvases.keys().copied().collect()
    }

    pub fn canvases(&self) -> impl Iterator<Item = &ParameterCanvas> {
        self.canvases.values()
    }

    pub fn canvases_mut(&mut self) -> impl Iterator<Item = &mut ParameterCanvas> {
        self.canvases.values_mut()
    }

    pub fn is_modified(&self) -> bool {
        self.canvases.values().any(ParameterCanvas::is_modified)
    }

    pub fn set_address_mode(&mut self, mode: AddressMode) {
        self.address_mode = mode;
        for canvas in self.canvases.values_mut() {
            canvas.set_address_mode(mode);
        }
    }

    /// Release every canvas
    pub fn dispose(&mut self) {
        for canvas in self.canvases.values_mut() {
            canvas.dispose();
        }
        self.canvases.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChannelMask;
    use ParameterSemantic::*;

    #[test]
    fn test_ensure_creates_required_canvases() {
        let mut layer = MaterialLayer::new("Layer 1");
        layer.ensure_parameters(&[BaseColor, Roughness], 4).unwrap();
        assert_eq!(layer.semantics(), vec![BaseColor, Roughness]);
        assert!(layer.canvas(BaseColor).unwrap().is_allocated());
        assert!(!layer.is_modified());
    }

    #[test]
    fn test_ensure_drops_unrequired_canvases() {
        let mut layer = MaterialLayer::new("Layer 1");
        layer.ensure_parameters(&[BaseColor, Metallic], 4).unwrap();
        layer.ensure_parameters(&[Metallic], 4).unwrap();
        assert_eq!(layer.semantics(), vec![Metallic]);
        assert!(layer.canvas(BaseColor).is_none());
    }

    #[test]
    fn test_redundant_ensure_keeps_content() {
        let mut layer = MaterialLayer::new("Layer 1");
        layer.ensure_parameters(&[BaseColor], 4).unwrap();
        layer
            .canvas_mut(BaseColor)
            .unwrap()
            .fill([1.0, 0.0, 0.0, 1.0], ChannelMask::RGB);
        let before = layer.canvas(BaseColor).unwrap().pixels();

        layer.ensure_parameters(&[BaseColor], 4).unwrap();
        layer.ensure_parameters(&[BaseColor, BaseColor], 4).unwrap();
        assert_eq!(layer.semantics().len(), 1);
        assert_eq!(layer.canvas(BaseColor).unwrap().pixels(), before);
    }

    #[test]
    fn test_resolution_change_resizes_all_canvases() {
        let mut layer = MaterialLayer::new("Layer 1");
        layer.ensure_parameters(&[BaseColor, Occlusion], 4).unwrap();
        layer
            .canvas_mut(Occlusion)
            .unwrap()
            .fill([1.0; 4], ChannelMask::RED);

        for resolution in [8, 16, 8, 8] {
            layer.ensure_parameters(&[BaseColor, Occlusion], resolution).unwrap();
            for canvas in layer.canvases() {
                let surface = canvas.surface().unwrap();
                assert_eq!((surface.width, surface.height), (resolution, resolution));
                assert_eq!(canvas.resolution(), resolution);
            }
        }
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let mut layer = MaterialLayer::new("Layer 1");
        assert!(layer.ensure_parameters(&[BaseColor], 0).is_err());
        assert!(layer.semantics().is_empty());
    }

    #[test]
    fn test_dispose_releases_canvases() {
        let mut layer = MaterialLayer::new("Layer 1");
        layer.ensure_parameters(&[BaseColor, Opacity], 4).unwrap();
        layer.dispose();
        assert!(layer.semantics().is_empty());
    }
}
