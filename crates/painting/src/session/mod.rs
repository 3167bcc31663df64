//! Painting session state machine
//!
//! ```text
//! Idle --select_target--> TargetSelected --pointer_down--> Painting
//!   ^                          ^                              |
//!   +------clear_target--------+---------pointer_up-----------+
//! ```
//!
//! The session owns the layer stack and every canvas in it. Presentation
//! code reads state through accessors and changes it only through the
//! methods here or [`PaintSession::apply`].

mod commands;
mod layers;
mod pointer;

use painter_config::{FillTarget, PainterConfig};
use painter_ipc::Notification;
use tracing::{info, warn};

use crate::brush::{BrushEngine, BrushSettings};
use crate::canvas::{DirtyRegion, ParameterCanvas};
use crate::error::PaintError;
use crate::mask::{MaskAsset, MaskCache};
use crate::material::{required_semantics, PropertyMatcher, ReferenceMaterial, ShaderTextureProperty};
use crate::stack::LayerStack;
use crate::surface::CpuSurface;
use crate::types::{AddressMode, MaskMode, PaintMode, ParameterSemantic, ProjectionMode};
use crate::validation::validate_working_resolution;

pub use pointer::PointerOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No paint target
    Idle,
    TargetSelected,
    /// Pointer held down on the target surface
    Painting,
}

/// The single (layer, semantic) pair strokes go to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaintTarget {
    pub layer: usize,
    pub semantic: ParameterSemantic,
}

/// What a preview shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewSource {
    /// All visible layers composited
    Composed,
    /// The target layer's canvas alone
    ActiveLayer,
}

/// Fill parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillSettings {
    pub color: [f32; 4],
    pub target: FillTarget,
}

pub struct PaintSession {
    resolution: u32,
    paint_mode: PaintMode,
    projection_mode: ProjectionMode,
    address_mode: AddressMode,
    fill: FillSettings,
    brush: BrushSettings,
    engine: BrushEngine,
    matcher: PropertyMatcher,
    material: Option<ReferenceMaterial>,
    properties: Vec<ShaderTextureProperty>,
    stack: LayerStack,
    target: Option<PaintTarget>,
    state: SessionState,
    notifications: Vec<Notification>,
    /// Whether this stroke already reported the sizing fallback
    fallback_reported: bool,
}

impl PaintSession {
    pub fn new(config: &PainterConfig) -> Result<Self, PaintError> {
        let resolution = validate_working_resolution(config.resolution)?;
        config.validate()?;
        let brush = BrushSettings::from_config(&config.brush);
        Ok(Self {
            resolution,
            paint_mode: config.paint_mode,
            projection_mode: config.projection_mode,
            address_mode: config.address_mode,
            fill: FillSettings {
                color: config.fill.color,
                target: config.fill.target,
            },
            engine: BrushEngine::new(brush.spacing()),
            brush,
            matcher: PropertyMatcher::new(config.property_patterns.clone()),
            material: None,
            properties: Vec::new(),
            stack: LayerStack::new(),
            target: None,
            state: SessionState::Idle,
            notifications: Vec::new(),
            fallback_reported: false,
        })
    }

    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[inline]
    pub fn target(&self) -> Option<PaintTarget> {
        self.target
    }

    #[inline]
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    #[inline]
    pub fn paint_mode(&self) -> PaintMode {
        self.paint_mode
    }

    #[inline]
    pub fn projection_mode(&self) -> ProjectionMode {
        self.projection_mode
    }

    pub fn stack(&self) -> &LayerStack {
        &self.stack
    }

    pub fn brush(&self) -> &BrushSettings {
        &self.brush
    }

    pub fn fill_settings(&self) -> FillSettings {
        self.fill
    }

    pub fn material(&self) -> Option<&ReferenceMaterial> {
        self.material.as_ref()
    }

    /// Texture properties resolved from the reference material
    pub fn properties(&self) -> &[ShaderTextureProperty] {
        &self.properties
    }

    /// Semantics every layer currently carries
    pub fn required_semantics(&self) -> Vec<ParameterSemantic> {
        required_semantics(&self.properties)
    }

    /// Drain messages queued for the user
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub(crate) fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    /// Queue an error as a blocking message (input errors) or a warning
    pub(crate) fn report(&mut self, err: &PaintError) {
        warn!("painter: {}", err);
        let notification = if err.is_input_error() {
            Notification::blocking(err.to_string())
        } else {
            Notification::warning(err.to_string())
        };
        self.notify(notification);
    }

    /// Use `material`'s shader to decide which canvases exist
    ///
    /// A material without recognizable texture properties is rejected and
    /// nothing changes.
    pub fn set_reference_material(&mut self, material: ReferenceMaterial) -> Result<(), PaintError> {
        let properties = self.matcher.discover(&material);
        if properties.is_empty() {
            return Err(PaintError::NoTextureProperties(material.name));
        }
        info!(
            "painter: reference material '{}' with {} paintable properties",
            material.name,
            properties.len()
        );
        let required = required_semantics(&properties);
        self.stack.ensure_parameters(&required, self.resolution)?;
        self.properties = properties;
        self.material = Some(material);

        if let Some(target) = self.target {
            if !required.contains(&target.semantic) {
                self.clear_target();
            }
        }
        Ok(())
    }

    /// Change the working resolution of every canvas
    pub fn set_resolution(&mut self, resolution: u32) -> Result<(), PaintError> {
        let resolution = validate_working_resolution(resolution)?;
        if resolution == self.resolution {
            return Ok(());
        }
        let required = self.required_semantics();
        self.stack.ensure_parameters(&required, resolution)?;
        self.resolution = resolution;
        info!("painter: resolution set to {}", resolution);
        Ok(())
    }

    pub fn set_paint_mode(&mut self, mode: PaintMode) {
        if self.state == SessionState::Painting {
            self.pointer_up();
        }
        self.paint_mode = mode;
    }

    pub fn set_projection_mode(&mut self, mode: ProjectionMode) {
        self.projection_mode = mode;
    }

    pub fn set_address_mode(&mut self, mode: AddressMode) {
        self.address_mode = mode;
        for index in 0..self.stack.len() {
            if let Some(layer) = self.stack.get_mut(index) {
                layer.set_address_mode(mode);
            }
        }
    }

    pub fn set_brush_color(&mut self, color: [f32; 4]) {
        self.brush.color = color;
    }

    pub fn set_brush_radius(&mut self, radius_px: f32) -> Result<(), PaintError> {
        Ok(self.brush.set_radius_px(radius_px)?)
    }

    pub fn set_brush_hardness(&mut self, hardness: f32) -> Result<(), PaintError> {
        Ok(self.brush.set_hardness(hardness)?)
    }

    pub fn set_brush_spacing(&mut self, spacing: f32) -> Result<(), PaintError> {
        self.brush.set_spacing(spacing)?;
        self.engine.set_spacing(spacing);
        Ok(())
    }

    pub fn set_mask_mode(&mut self, mode: MaskMode) {
        self.brush.mask_mode = mode;
    }

    /// Use an imported mask image; unreadable assets fall back and never fail
    pub fn set_brush_mask(&mut self, asset: &MaskAsset) {
        let resolved = asset.resolve();
        if resolved.is_degraded() {
            self.notify(Notification::info(format!(
                "Brush mask '{}' could not be read directly ({:?}); using fallback",
                asset.name, resolved.origin
            )));
        }
        self.brush.set_mask(Some(MaskCache::new(resolved.image)));
    }

    /// Back to the procedural round brush
    pub fn clear_brush_mask(&mut self) {
        self.brush.set_mask(None);
    }

    pub fn set_fill_color(&mut self, color: [f32; 4]) {
        self.fill.color = color;
    }

    pub fn set_fill_target(&mut self, target: FillTarget) {
        self.fill.target = target;
    }

    /// A fresh raster for display; never aliases a layer canvas
    ///
    /// `ActiveLayer` returns `None` without a target or when the target
    /// layer lacks `semantic`.
    pub fn preview(&self, semantic: ParameterSemantic, source: PreviewSource) -> Option<CpuSurface> {
        match source {
            PreviewSource::Composed => Some(self.stack.compose(semantic, self.resolution)),
            PreviewSource::ActiveLayer => {
                let target = self.target?;
                let canvas = self.stack.get(target.layer)?.canvas(semantic)?;
                Some(canvas.pixels())
            }
        }
    }

    /// Target canvas pixels touched since the last call, for partial
    /// preview updates
    pub fn take_target_dirty_region(&mut self) -> Option<DirtyRegion> {
        self.target_canvas_mut().ok()?.take_dirty_region()
    }

    pub(crate) fn target_canvas_mut(&mut self) -> Result<&mut ParameterCanvas, PaintError> {
        let target = self.target.ok_or(PaintError::NoActiveTarget)?;
        target_canvas(&mut self.stack, target)
    }
}

/// Canvas of `target` inside `stack`
fn target_canvas(stack: &mut LayerStack, target: PaintTarget) -> Result<&mut ParameterCanvas, PaintError> {
    let count = stack.len();
    let layer = stack.get_mut(target.layer).ok_or(PaintError::LayerOutOfRange {
        index: target.layer,
        count,
    })?;
    let name = layer.name().to_string();
    layer
        .canvas_mut(target.semantic)
        .ok_or(PaintError::MissingSemantic {
            layer: name,
            semantic: target.semantic,
        })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::mask::MaskOrigin;
    use painter_config::ConfigError;
    use painter_ipc::Severity;
    use ParameterSemantic::*;

    pub(crate) fn bronze() -> ReferenceMaterial {
        ReferenceMaterial::new("Bronze", "Lit", ["_BaseMap", "_RoughnessMap", "_OpacityMap"])
    }

    pub(crate) fn session() -> PaintSession {
        let config = PainterConfig {
            resolution: 32,
            ..PainterConfig::default()
        };
        PaintSession::new(&config).unwrap()
    }

    pub(crate) fn session_with_layer() -> PaintSession {
        let mut session = session();
        session.set_reference_material(bronze()).unwrap();
        session.add_layer(None).unwrap();
        session
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = session();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.target(), None);
        assert!(session.stack().is_empty());
    }

    #[test]
    fn test_invalid_config_resolution() {
        let config = PainterConfig {
            resolution: 100,
            ..PainterConfig::default()
        };
        assert!(matches!(PaintSession::new(&config), Err(PaintError::Validation(_))));
    }

    #[test]
    fn test_out_of_range_brush_config_is_rejected() {
        let mut config = PainterConfig {
            resolution: 32,
            ..PainterConfig::default()
        };
        config.brush.hardness = 1.5;
        let err = PaintSession::new(&config).err().unwrap();
        assert!(matches!(err, PaintError::Config(ConfigError::InvalidBrush(_))));
        assert!(err.is_input_error());

        config.brush.hardness = 0.5;
        config.brush.radius_px = 1e12;
        assert!(matches!(PaintSession::new(&config), Err(PaintError::Config(_))));
    }

    #[test]
    fn test_material_without_textures_is_rejected() {
        let mut session = session_with_layer();
        let err = session
            .set_reference_material(ReferenceMaterial::new("Flat", "Unlit", ["_Color"]))
            .unwrap_err();
        assert!(err.is_input_error());
        // Nothing changed
        assert_eq!(session.material().unwrap().name, "Bronze");
        assert_eq!(session.stack().get(0).unwrap().semantics(), vec![BaseColor, Roughness, Opacity]);
    }

    #[test]
    fn test_material_change_reconciles_layers() {
        let mut session = session_with_layer();
        session.select_target(0, Opacity).unwrap();
        session
            .set_reference_material(ReferenceMaterial::new("Steel", "Lit", ["_BaseMap", "_MetallicGlossMap"]))
            .unwrap();
        assert_eq!(session.stack().get(0).unwrap().semantics(), vec![BaseColor, Metallic]);
        // The target semantic disappeared
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_resolution_change() {
        let mut session = session_with_layer();
        assert!(matches!(session.set_resolution(48), Err(PaintError::Validation(_))));
        session.set_resolution(64).unwrap();
        let canvas = session.stack().get(0).unwrap().canvas(BaseColor).unwrap();
        assert_eq!(canvas.surface().unwrap().width, 64);
        assert_eq!(session.preview(BaseColor, PreviewSource::Composed).unwrap().width, 64);
    }

    #[test]
    fn test_unreadable_mask_falls_back_with_info() {
        let mut session = session();
        session.set_brush_mask(&MaskAsset::from_encoded("stars", b"\x89PNG broken".to_vec()));
        assert!(session.brush().has_mask());
        let notes = session.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].severity, Severity::Info);
        assert!(notes[0].message.contains(&format!("{:?}", MaskOrigin::Synthetic)));
        assert!(session.take_notifications().is_empty());

        session.clear_brush_mask();
        assert!(!session.brush().has_mask());
    }

    #[test]
    fn test_preview_is_a_copy() {
        let mut session = session_with_layer();
        session.select_target(0, BaseColor).unwrap();
        let mut preview = session.preview(BaseColor, PreviewSource::ActiveLayer).unwrap();
        preview.clear([1.0; 4]);
        let again = session.preview(BaseColor, PreviewSource::ActiveLayer).unwrap();
        assert!(again.pixels().iter().all(|p| *p == [0.0; 4]));

        session.clear_target();
        assert!(session.preview(BaseColor, PreviewSource::ActiveLayer).is_none());
        assert!(session.preview(BaseColor, PreviewSource::Composed).is_some());
    }

    #[test]
    fn test_target_dirty_region() {
        let mut session = session_with_layer();
        assert_eq!(session.take_target_dirty_region(), None);
        session.select_target(0, BaseColor).unwrap();
        session.stamp_at_uv(glam::Vec2::splat(0.5), Some(0.1)).unwrap();
        let region = session.take_target_dirty_region().unwrap();
        // A 32 px canvas is a single tile
        assert_eq!(region.rect, (0, 0, 32, 32));
        assert_eq!(region.pixels.len(), 32 * 32);
        assert_eq!(session.take_target_dirty_region(), None);
    }

    #[test]
    fn test_brush_setters_validate() {
        let mut session = session();
        assert!(session.set_brush_hardness(2.0).is_err());
        assert!(session.set_brush_radius(0.0).is_err());
        assert!(session.set_brush_spacing(0.25).is_ok());
        assert_eq!(session.brush().spacing(), 0.25);
    }
}
