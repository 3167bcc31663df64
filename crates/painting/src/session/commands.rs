//! Command dispatch and export

use std::path::Path;

use glam::Vec2;
use painter_ipc::{ExportedMaterialInfo, PainterCommand, PainterEvent};
use tracing::{debug, info};

use super::PaintSession;
use crate::error::PaintError;
use crate::export::MaterialExporter;
use crate::material::ReferenceMaterial;
use crate::types::ParameterSemantic;

/// What a successful command changed
enum Change {
    Nothing,
    Layers,
    Target,
    Canvas(ParameterSemantic),
    Exported(ExportedMaterialInfo),
}

impl PaintSession {
    /// Run one UI command and collect the events it produced
    ///
    /// Failures never propagate: they are reported as notifications, which
    /// are drained into the returned events together with anything else
    /// queued while the command ran.
    pub fn apply(&mut self, command: PainterCommand) -> Vec<PainterEvent> {
        debug!("painter: apply {:?}", command);
        let mut events = Vec::new();
        match self.dispatch(command) {
            Ok(Change::Nothing) => {}
            Ok(Change::Layers) => events.push(self.layers_event()),
            Ok(Change::Target) => {
                events.push(self.layers_event());
                events.push(self.target_event());
            }
            Ok(Change::Canvas(semantic)) => events.push(PainterEvent::CanvasChanged { semantic }),
            Ok(Change::Exported(material)) => events.push(PainterEvent::Exported(material)),
            Err(err) => self.report(&err),
        }
        events.extend(self.take_notifications().into_iter().map(PainterEvent::Notification));
        events
    }

    fn dispatch(&mut self, command: PainterCommand) -> Result<Change, PaintError> {
        match command {
            PainterCommand::SetReferenceMaterial(material) => {
                self.set_reference_material(ReferenceMaterial::from(material))?;
                Ok(Change::Target)
            }
            PainterCommand::SetResolution { resolution } => {
                self.set_resolution(resolution)?;
                Ok(Change::Nothing)
            }
            PainterCommand::SetPaintMode { mode } => {
                self.set_paint_mode(mode);
                Ok(Change::Nothing)
            }
            PainterCommand::SetProjectionMode { mode } => {
                self.set_projection_mode(mode);
                Ok(Change::Nothing)
            }
            PainterCommand::SetBrushColor { color } => {
                self.set_brush_color(color);
                Ok(Change::Nothing)
            }
            PainterCommand::SetBrushRadius { radius_px } => {
                self.set_brush_radius(radius_px)?;
                Ok(Change::Nothing)
            }
            PainterCommand::SetBrushHardness { hardness } => {
                self.set_brush_hardness(hardness)?;
                Ok(Change::Nothing)
            }
            PainterCommand::SetBrushSpacing { spacing } => {
                self.set_brush_spacing(spacing)?;
                Ok(Change::Nothing)
            }
            PainterCommand::SetMaskMode { mode } => {
                self.set_mask_mode(mode);
                Ok(Change::Nothing)
            }
            PainterCommand::ClearBrushMask => {
                self.clear_brush_mask();
                Ok(Change::Nothing)
            }
            PainterCommand::SetFillColor { color } => {
                self.set_fill_color(color);
                Ok(Change::Nothing)
            }
            PainterCommand::SetFillTarget { target } => {
                self.set_fill_target(target);
                Ok(Change::Nothing)
            }
            PainterCommand::AddLayer { name } => {
                self.add_layer(name)?;
                Ok(Change::Layers)
            }
            PainterCommand::RemoveLayer { index } => {
                self.remove_layer(index)?;
                Ok(Change::Target)
            }
            PainterCommand::MoveLayer { from, to } => {
                self.move_layer(from, to)?;
                Ok(Change::Target)
            }
            PainterCommand::RenameLayer { index, name } => {
                self.rename_layer(index, name)?;
                Ok(Change::Layers)
            }
            PainterCommand::SetLayerVisible { index, visible } => {
                self.set_layer_visible(index, visible)?;
                Ok(Change::Layers)
            }
            PainterCommand::SelectTarget { layer, semantic } => {
                self.select_target(layer, semantic)?;
                Ok(Change::Target)
            }
            PainterCommand::ClearTarget => {
                self.clear_target();
                Ok(Change::Target)
            }
            PainterCommand::Stamp { uv, radius_uv } => {
                let pixels = self.stamp_at_uv(Vec2::from(uv), radius_uv)?;
                match self.target {
                    Some(target) if pixels > 0 => Ok(Change::Canvas(target.semantic)),
                    _ => Ok(Change::Nothing),
                }
            }
            PainterCommand::Fill => Ok(Change::Canvas(self.fill_target()?)),
            PainterCommand::ClearCanvas => Ok(Change::Canvas(self.clear_target_canvas()?)),
            PainterCommand::ExportLayer { index, directory } => {
                Ok(Change::Exported(self.export_layer(index, &directory)?))
            }
            PainterCommand::ExportMerged { directory } => Ok(Change::Exported(self.export_merged(&directory)?)),
        }
    }

    /// Bake one layer into a new material under `directory`
    pub fn export_layer(&self, index: usize, directory: &Path) -> Result<ExportedMaterialInfo, PaintError> {
        let count = self.stack.len();
        let layer = self
            .stack
            .get(index)
            .ok_or(PaintError::LayerOutOfRange { index, count })?;
        let exported =
            MaterialExporter::export_layer_as_material(layer, &self.properties, self.material.as_ref(), directory)?;
        info!("painter: exported layer {} as '{}'", index, exported.name);
        Ok(exported)
    }

    /// Bake the composite of all visible layers into a new material
    pub fn export_merged(&self, directory: &Path) -> Result<ExportedMaterialInfo, PaintError> {
        let exported = MaterialExporter::export_merged_material(
            &self.stack,
            self.resolution,
            &self.properties,
            self.material.as_ref(),
            directory,
        )?;
        info!("painter: exported merged material '{}'", exported.name);
        Ok(exported)
    }

    fn layers_event(&self) -> PainterEvent {
        PainterEvent::LayersChanged {
            layers: self.layer_infos(),
        }
    }

    fn target_event(&self) -> PainterEvent {
        PainterEvent::TargetChanged {
            target: self.target.map(|t| (t.layer, t.semantic)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::{session, session_with_layer};
    use crate::session::SessionState;
    use painter_ipc::{parse_command, Severity};

    fn run(session: &mut PaintSession, json: &str) -> Vec<PainterEvent> {
        session.apply(parse_command(json).unwrap())
    }

    fn notifications(events: &[PainterEvent]) -> Vec<Severity> {
        events
            .iter()
            .filter_map(|e| match e {
                PainterEvent::Notification(n) => Some(n.severity),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_json_session_flow() {
        let mut session = session();
        let events = run(
            &mut session,
            r#"{"type":"SetReferenceMaterial","data":{"name":"Bronze","shader":"Lit","texture_properties":["_BaseMap","_RoughnessMap"]}}"#,
        );
        assert!(notifications(&events).is_empty());

        let events = run(&mut session, r#"{"type":"AddLayer","data":{"name":null}}"#);
        assert!(matches!(&events[0], PainterEvent::LayersChanged { layers } if layers.len() == 1));

        let events = run(
            &mut session,
            r#"{"type":"SelectTarget","data":{"layer":0,"semantic":"BaseColor"}}"#,
        );
        assert!(events
            .iter()
            .any(|e| matches!(e, PainterEvent::TargetChanged { target: Some((0, ParameterSemantic::BaseColor)) })));
        assert_eq!(session.state(), SessionState::TargetSelected);

        let events = run(&mut session, r#"{"type":"Stamp","data":{"uv":[0.5,0.5],"radius_uv":0.1}}"#);
        assert!(matches!(
            events[0],
            PainterEvent::CanvasChanged {
                semantic: ParameterSemantic::BaseColor
            }
        ));
    }

    #[test]
    fn test_input_error_is_blocking() {
        let mut session = session_with_layer();
        let events = session.apply(PainterCommand::SetBrushHardness { hardness: 3.0 });
        assert_eq!(notifications(&events), [Severity::Blocking]);
        assert_eq!(session.brush().hardness(), 0.8);
    }

    #[test]
    fn test_resource_error_is_warning() {
        let mut session = session();
        let events = session.apply(PainterCommand::AddLayer { name: None });
        assert_eq!(notifications(&events), [Severity::Warning]);

        let events = session.apply(PainterCommand::Fill);
        assert_eq!(notifications(&events), [Severity::Warning]);
    }

    #[test]
    fn test_export_without_material_is_blocking() {
        let mut session = session();
        let dir = std::env::temp_dir().join("painter_session_export_no_material");
        let events = session.apply(PainterCommand::ExportMerged { directory: dir });
        assert_eq!(notifications(&events), [Severity::Blocking]);
    }

    #[test]
    fn test_export_layer_command() {
        let mut session = session_with_layer();
        let dir = std::env::temp_dir().join(format!("painter_session_export_{}", std::process::id()));
        let events = session.apply(PainterCommand::ExportLayer {
            index: 0,
            directory: dir.clone(),
        });
        let PainterEvent::Exported(material) = &events[0] else {
            panic!("expected an export event, got {events:?}");
        };
        assert_eq!(material.name, "Bronze_Layer 1");
        assert_eq!(material.textures.len(), 3);
        assert!(material.textures.values().all(|path| path.exists()));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_export_layer_out_of_range() {
        let mut session = session_with_layer();
        let err = session
            .export_layer(4, &std::env::temp_dir())
            .unwrap_err();
        assert!(matches!(err, PaintError::LayerOutOfRange { index: 4, count: 1 }));
    }
}
