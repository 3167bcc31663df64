//! Ordered layers and per-semantic compositing

use tracing::{debug, info};

use crate::layer::MaterialLayer;
use crate::surface::CpuSurface;
use crate::types::ParameterSemantic;
use crate::validation::ValidationError;

/// Layers in paint order: later entries composite over earlier ones
#[derive(Debug, Clone, Default)]
pub struct LayerStack {
    layers: Vec<MaterialLayer>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layers(&self) -> &[MaterialLayer] {
        &self.layers
    }

    pub fn get(&self, index: usize) -> Option<&MaterialLayer> {
        self.layers.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut MaterialLayer> {
        self.layers.get_mut(index)
    }

    /// First unused `Layer N` name
    pub fn next_layer_name(&self) -> String {
        (self.layers.len() + 1..)
            .map(|n| format!("Layer {n}"))
            .find(|name| self.layers.iter().all(|l| l.name() != name))
            .unwrap_or_default()
    }

    /// Append a layer on top; returns its index
    pub fn add_layer(&mut self, layer: MaterialLayer) -> usize {
        info!("LayerStack: adding layer '{}'", layer.name());
        self.layers.push(layer);
        self.layers.len() - 1
    }

    /// Remove a layer and release its canvases
    pub fn remove_layer(&mut self, index: usize) -> Option<MaterialLayer> {
        if index >= self.layers.len() {
            return None;
        }
        let mut layer = self.layers.remove(index);
        layer.dispose();
        info!("LayerStack: removed layer '{}'", layer.name());
        Some(layer)
    }

    /// Move a layer to a new position; false if either index is out of range
    pub fn move_layer(&mut self, from: usize, to: usize) -> bool {
        if from >= self.layers.len() || to >= self.layers.len() {
            return false;
        }
        let layer = self.layers.remove(from);
        self.layers.insert(to, layer);
        true
    }

    /// Reconcile every layer with the required semantics and resolution
    pub fn ensure_parameters(
        &mut self,
        required: &[ParameterSemantic],
        resolution: u32,
    ) -> Result<(), ValidationError> {
        for layer in &mut self.layers {
            layer.ensure_parameters(required, resolution)?;
        }
        Ok(())
    }

    /// Composite visible layers owning `semantic` into a fresh raster
    ///
    /// Starts transparent and applies, per layer in order,
    /// `rgb = src.rgb * src.a + dst.rgb * (1 - src.a)` and
    /// `a = src.a + dst.a * (1 - src.a)`. Canvases of another size are
    /// resampled to `resolution`.
    pub fn compose(&self, semantic: ParameterSemantic, resolution: u32) -> CpuSurface {
        let mut result = CpuSurface::new(resolution, resolution);
        let mut contributing = 0;
        for layer in self.layers.iter().filter(|l| l.is_visible()) {
            let Some(canvas) = layer.canvas(semantic) else {
                continue;
            };
            let src = canvas.pixels().resampled(resolution, resolution);
            for (dst, s) in result.pixels_mut().iter_mut().zip(src.pixels()) {
                *dst = composite_over(*dst, *s);
            }
            contributing += 1;
        }
        debug!(
            "LayerStack::compose: {} at {} from {} layers",
            semantic, resolution, contributing
        );
        result
    }
}

/// One pixel of `src` over `dst`
#[inline]
pub fn composite_over(dst: [f32; 4], src: [f32; 4]) -> [f32; 4] {
    let a = src[3].clamp(0.0, 1.0);
    let keep = 1.0 - a;
    [
        src[0] * a + dst[0] * keep,
        src[1] * a + dst[1] * keep,
        src[2] * a + dst[2] * keep,
        a + dst[3] * keep,
    ]
}
