//! Pointer-driven painting

use glam::Vec2;
use painter_config::FillTarget;
use painter_ipc::Notification;
use tracing::{debug, warn};

use super::{target_canvas, PaintSession, SessionState};
use crate::constants::{MAX_RADIUS_UV, REFERENCE_RESOLUTION};
use crate::error::PaintError;
use crate::sampler::{SurfaceRaycaster, SurfaceSampler, UvRadius};
use crate::types::{PaintMode, ParameterSemantic, SurfaceHit};
use crate::validation::validate_radius_uv;

/// Result of one pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    /// No target, or no stroke in progress
    Ignored,
    /// The pointer is not over a paintable part of the surface
    Missed,
    Stamped { semantic: ParameterSemantic, pixels: usize },
    /// Too close to the previous stamp
    Skipped,
    Filled { semantic: ParameterSemantic },
}

impl PaintSession {
    /// Press on the surface: fill, or start a stroke with its first stamp
    pub fn pointer_down(&mut self, raycaster: &dyn SurfaceRaycaster, screen: Vec2) -> PointerOutcome {
        if self.target.is_none() {
            self.notify(Notification::warning("Select a layer and parameter to paint on"));
            return PointerOutcome::Ignored;
        }
        if self.state == SessionState::Painting {
            self.pointer_up();
        }

        match self.paint_mode {
            PaintMode::Fill => {
                if SurfaceSampler::sample(raycaster, screen).is_none() {
                    return PointerOutcome::Missed;
                }
                match self.fill_target() {
                    Ok(semantic) => PointerOutcome::Filled { semantic },
                    Err(err) => {
                        self.report(&err);
                        PointerOutcome::Ignored
                    }
                }
            }
            PaintMode::Brush => {
                let Some((hit, radius)) = self.sample_brush(raycaster, screen) else {
                    return PointerOutcome::Missed;
                };
                self.state = SessionState::Painting;
                self.fallback_reported = false;
                self.engine.begin_stroke();
                self.engine.stroke_to(hit.world_pos);
                self.stamp_hit(&hit, radius)
            }
        }
    }

    /// Continue a stroke; stamps are spaced in world units
    pub fn pointer_drag(&mut self, raycaster: &dyn SurfaceRaycaster, screen: Vec2) -> PointerOutcome {
        if self.state != SessionState::Painting {
            return PointerOutcome::Ignored;
        }
        let Some((hit, radius)) = self.sample_brush(raycaster, screen) else {
            return PointerOutcome::Missed;
        };
        if !self.engine.stroke_to(hit.world_pos) {
            return PointerOutcome::Skipped;
        }
        self.stamp_hit(&hit, radius)
    }

    /// End the stroke in progress
    pub fn pointer_up(&mut self) {
        self.engine.end_stroke();
        self.fallback_reported = false;
        if self.state == SessionState::Painting {
            self.state = SessionState::TargetSelected;
        }
    }

    /// Stamp the current brush on the target canvas at `uv`
    ///
    /// Without an explicit `radius_uv` the brush radius is taken relative
    /// to the reference resolution.
    pub fn stamp_at_uv(&mut self, uv: Vec2, radius_uv: Option<f32>) -> Result<usize, PaintError> {
        let target = self.target.ok_or(PaintError::NoActiveTarget)?;
        let radius_uv = validate_radius_uv(radius_uv.unwrap_or(self.brush.radius_px() / REFERENCE_RESOLUTION))?;
        let color = self.brush.color;
        let hardness = self.brush.hardness();
        let mask = self.brush.mask_for_radius(radius_uv * self.resolution as f32);
        let canvas = target_canvas(&mut self.stack, target)?;
        let channels = canvas.channel_mask();
        Ok(canvas.stamp_brush_at_uv(uv, color, radius_uv, hardness, mask, channels)?)
    }

    /// Fill the whole target canvas with the fill color
    pub fn fill_target(&mut self) -> Result<ParameterSemantic, PaintError> {
        if self.fill.target == FillTarget::Element {
            warn!("painter: element fill is not supported, filling the entire object");
            self.notify(Notification::info("Element fill is not supported; filled the entire object"));
        }
        let color = self.fill.color;
        let canvas = self.target_canvas_mut()?;
        let channels = canvas.channel_mask();
        canvas.fill(color, channels);
        Ok(canvas.semantic())
    }

    /// Reset the target canvas to transparent black
    pub fn clear_target_canvas(&mut self) -> Result<ParameterSemantic, PaintError> {
        let canvas = self.target_canvas_mut()?;
        canvas.clear();
        Ok(canvas.semantic())
    }

    fn sample_brush(&self, raycaster: &dyn SurfaceRaycaster, screen: Vec2) -> Option<(SurfaceHit, UvRadius)> {
        let sample = SurfaceSampler::sample_with_scale(raycaster, screen)?;
        let radius = SurfaceSampler::brush_radius_uv(self.brush.radius_px(), sample.scale, self.projection_mode);
        Some((sample.hit, radius))
    }

    fn stamp_hit(&mut self, hit: &SurfaceHit, radius: UvRadius) -> PointerOutcome {
        let Some(target) = self.target else {
            return PointerOutcome::Ignored;
        };
        if radius.fallback && !self.fallback_reported {
            self.fallback_reported = true;
            self.notify(Notification::info(
                "Brush size could not be measured on screen here; using texture-relative size",
            ));
        }
        // Far zoomed-out screen brushes may span more than the texture
        match self.stamp_at_uv(hit.uv, Some(radius.radius_uv.min(MAX_RADIUS_UV))) {
            Ok(pixels) => {
                debug!("painter: stamp at uv ({:.3}, {:.3}), {} px", hit.uv.x, hit.uv.y, pixels);
                PointerOutcome::Stamped {
                    semantic: target.semantic,
                    pixels,
                }
            }
            Err(err) => {
                self.report(&err);
                PointerOutcome::Ignored
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::MaskAsset;
    use crate::sampler::quad_target;
    use crate::surface::CpuSurface;
    use crate::session::tests::{session, session_with_layer};
    use painter_ipc::Severity;
    use ParameterSemantic::*;

    fn painting_session() -> PaintSession {
        let mut session = session_with_layer();
        session.set_brush_radius(10.0).unwrap();
        session.set_brush_color([1.0, 0.0, 0.0, 1.0]);
        session.select_target(0, BaseColor).unwrap();
        session
    }

    fn pixel(session: &PaintSession, semantic: ParameterSemantic, x: u32, y: u32) -> [f32; 4] {
        let canvas = session.stack().get(0).unwrap().canvas(semantic).unwrap();
        canvas.pixels().get_pixel(x, y).unwrap()
    }

    #[test]
    fn test_pointer_without_target_warns() {
        let mut session = session();
        let outcome = session.pointer_down(&quad_target(), Vec2::new(50.0, 50.0));
        assert_eq!(outcome, PointerOutcome::Ignored);
        let notes = session.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].severity, Severity::Warning);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_stroke_lifecycle() {
        let mut session = painting_session();
        let target = quad_target();

        let outcome = session.pointer_down(&target, Vec2::new(50.0, 50.0));
        assert!(matches!(outcome, PointerOutcome::Stamped { semantic: BaseColor, pixels } if pixels > 0));
        assert_eq!(session.state(), SessionState::Painting);
        // uv (0.5, 0.5) lands on pixel (16, 16) of a 32 px canvas
        let painted = pixel(&session, BaseColor, 16, 16);
        assert!((painted[0] - 1.0).abs() < 1e-5);
        assert!(painted[3] > 0.9);

        session.pointer_up();
        assert_eq!(session.state(), SessionState::TargetSelected);
        assert_eq!(session.pointer_drag(&target, Vec2::new(60.0, 50.0)), PointerOutcome::Ignored);
        assert!(session.take_notifications().is_empty());
    }

    #[test]
    fn test_drag_respects_world_spacing() {
        let mut session = painting_session();
        session.set_brush_spacing(0.5).unwrap();
        let target = quad_target();

        session.pointer_down(&target, Vec2::new(50.0, 50.0));
        // 2 px on screen is 0.04 world units
        assert_eq!(session.pointer_drag(&target, Vec2::new(52.0, 50.0)), PointerOutcome::Skipped);
        assert!(matches!(
            session.pointer_drag(&target, Vec2::new(80.0, 50.0)),
            PointerOutcome::Stamped { .. }
        ));
        assert_eq!(session.pointer_drag(&target, Vec2::new(-10.0, -10.0)), PointerOutcome::Missed);
        assert_eq!(session.state(), SessionState::Painting);
    }

    #[test]
    fn test_miss_on_down_stays_selected() {
        let mut session = painting_session();
        let outcome = session.pointer_down(&quad_target(), Vec2::new(-10.0, -10.0));
        assert_eq!(outcome, PointerOutcome::Missed);
        assert_eq!(session.state(), SessionState::TargetSelected);
    }

    #[test]
    fn test_fallback_sizing_reported_once_per_stroke() {
        let mut session = painting_session();
        let target = quad_target();

        // At the bottom edge the one-pixel sample leaves the quad
        session.pointer_down(&target, Vec2::new(50.0, 99.5));
        session.pointer_drag(&target, Vec2::new(51.0, 99.5));
        let notes = session.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].severity, Severity::Info);

        session.pointer_up();
        session.pointer_down(&target, Vec2::new(50.0, 99.5));
        assert_eq!(session.take_notifications().len(), 1);
    }

    #[test]
    fn test_fill_mode() {
        let mut session = session_with_layer();
        session.set_paint_mode(PaintMode::Fill);
        session.set_fill_color([0.25, 0.25, 0.25, 1.0]);
        session.select_target(0, Roughness).unwrap();

        let outcome = session.pointer_down(&quad_target(), Vec2::new(50.0, 50.0));
        assert_eq!(outcome, PointerOutcome::Filled { semantic: Roughness });
        assert_eq!(session.state(), SessionState::TargetSelected);
        assert!((pixel(&session, Roughness, 0, 0)[0] - 0.25).abs() < 1e-5);
        assert!((pixel(&session, Roughness, 31, 31)[0] - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_element_fill_falls_back() {
        let mut session = session_with_layer();
        session.set_fill_target(FillTarget::Element);
        session.select_target(0, Roughness).unwrap();
        assert_eq!(session.fill_target().unwrap(), Roughness);
        let notes = session.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].severity, Severity::Info);
    }

    #[test]
    fn test_stamp_at_uv_requires_target() {
        let mut session = session_with_layer();
        assert!(matches!(
            session.stamp_at_uv(Vec2::splat(0.5), None),
            Err(PaintError::NoActiveTarget)
        ));
    }

    #[test]
    fn test_stamp_at_uv_rejects_non_finite() {
        let mut session = painting_session();
        let err = session.stamp_at_uv(Vec2::new(f32::NAN, 0.5), Some(0.1)).unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_oversized_radius_rejected_with_mask() {
        let mut session = painting_session();
        let mut white = CpuSurface::new(4, 4);
        white.clear([1.0; 4]);
        session.set_brush_mask(&MaskAsset::from_pixels("white", white));

        assert!(session.set_brush_radius(1e12).is_err());
        assert!(matches!(
            session.stamp_at_uv(Vec2::splat(0.5), Some(1e12)),
            Err(PaintError::Validation(_))
        ));
        // Largest accepted radius covers the raster, each pixel once
        assert_eq!(session.stamp_at_uv(Vec2::splat(0.5), Some(1.0)).unwrap(), 32 * 32);
    }

    #[test]
    fn test_clear_target_canvas() {
        let mut session = painting_session();
        session.stamp_at_uv(Vec2::splat(0.5), Some(0.2)).unwrap();
        session.clear_target_canvas().unwrap();
        assert_eq!(pixel(&session, BaseColor, 16, 16), [0.0; 4]);
    }

    #[test]
    fn test_mode_switch_ends_stroke() {
        let mut session = painting_session();
        session.pointer_down(&quad_target(), Vec2::new(50.0, 50.0));
        session.set_paint_mode(PaintMode::Fill);
        assert_eq!(session.state(), SessionState::TargetSelected);
    }
}
