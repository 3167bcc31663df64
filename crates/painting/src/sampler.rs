//! Screen position to texture coordinate
//!
//! [`SurfaceSampler`] turns a pointer position into a paintable
//! [`SurfaceHit`] through a [`SurfaceRaycaster`], and measures how many UV
//! units one screen pixel spans at that point so a pixel-sized brush keeps
//! its apparent size on screen.

use glam::{Mat4, Vec2, Vec3};
use tracing::{debug, warn};

use crate::constants::{MAX_UV_STEP_RATIO, MIN_UV_PER_PIXEL, MIN_UV_TRIANGLE_AREA, REFERENCE_RESOLUTION};
use crate::raycast::MeshRaycastData;
use crate::types::{MeshHit, ProjectionMode, SurfaceHit};

/// Ray casting restricted to one target surface
///
/// Implemented by [`MeshTarget`]; hosts with their own picking implement it
/// directly.
pub trait SurfaceRaycaster {
    /// Closest hit on the target under a screen position, in world space
    fn raycast(&self, screen: Vec2) -> Option<MeshHit>;

    /// UV-space area of a triangle, if known
    fn uv_triangle_area(&self, _face_id: u32) -> Option<f32> {
        None
    }
}

/// Camera used to unproject screen positions
#[derive(Debug, Clone, Copy)]
pub struct ScreenCamera {
    inverse_view_proj: Mat4,
    /// Viewport size in pixels
    viewport: Vec2,
}

impl ScreenCamera {
    pub fn new(view_proj: Mat4, viewport: Vec2) -> Self {
        Self {
            inverse_view_proj: view_proj.inverse(),
            viewport,
        }
    }

    /// World-space ray through a screen position (origin top-left, y down)
    pub fn screen_ray(&self, screen: Vec2) -> Option<(Vec3, Vec3)> {
        if self.viewport.x <= 0.0 || self.viewport.y <= 0.0 || !screen.is_finite() {
            return None;
        }
        let ndc_x = 2.0 * screen.x / self.viewport.x - 1.0;
        let ndc_y = 1.0 - 2.0 * screen.y / self.viewport.y;
        let near = self.inverse_view_proj.project_point3(Vec3::new(ndc_x, ndc_y, 0.0));
        let far = self.inverse_view_proj.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));
        let dir = (far - near).normalize_or_zero();
        (dir != Vec3::ZERO && near.is_finite()).then_some((near, dir))
    }
}

/// A mesh placed in the world and seen through a camera
#[derive(Debug, Clone)]
pub struct MeshTarget {
    mesh: MeshRaycastData,
    transform: Mat4,
    inverse: Mat4,
    camera: ScreenCamera,
}

impl MeshTarget {
    /// `transform` maps mesh space to world space
    pub fn new(mesh: MeshRaycastData, transform: Mat4, camera: ScreenCamera) -> Self {
        Self {
            mesh,
            transform,
            inverse: transform.inverse(),
            camera,
        }
    }

    pub fn set_camera(&mut self, camera: ScreenCamera) {
        self.camera = camera;
    }

    pub fn mesh(&self) -> &MeshRaycastData {
        &self.mesh
    }
}

impl SurfaceRaycaster for MeshTarget {
    fn raycast(&self, screen: Vec2) -> Option<MeshHit> {
        let (origin, dir) = self.camera.screen_ray(screen)?;
        let local_origin = self.inverse.transform_point3(origin);
        let local_dir = self.inverse.transform_vector3(dir);
        let hit = self.mesh.raycast(local_origin, local_dir)?;

        let normal_matrix = self.inverse.transpose();
        Some(MeshHit {
            world_pos: self.transform.transform_point3(hit.world_pos),
            normal: normal_matrix.transform_vector3(hit.normal).normalize_or_zero(),
            ..hit
        })
    }

    fn uv_triangle_area(&self, face_id: u32) -> Option<f32> {
        self.mesh.uv_triangle_area(face_id as usize)
    }
}

/// Why a screen-to-UV scale could not be measured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleFailure {
    /// A sample one pixel away left the surface
    OffsetMissed,
    /// A sample one pixel away landed on another UV island
    UvSeam,
    /// The hit triangle has (near) zero UV area
    DegenerateUv,
}

/// UV units per screen pixel at a hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScreenScale {
    Valid(f32),
    Invalid(ScaleFailure),
}

impl ScreenScale {
    pub fn is_valid(&self) -> bool {
        matches!(self, ScreenScale::Valid(_))
    }
}

/// A hit plus the local screen scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub hit: SurfaceHit,
    pub scale: ScreenScale,
}

/// Brush radius in UV units and whether the fallback sizing was used
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvRadius {
    pub radius_uv: f32,
    pub fallback: bool,
}

/// Resolves pointer positions against a target surface
pub struct SurfaceSampler;

impl SurfaceSampler {
    /// Paintable hit under `screen`, or `None` on a miss or a mesh without UVs
    pub fn sample(raycaster: &dyn SurfaceRaycaster, screen: Vec2) -> Option<SurfaceHit> {
        let hit = raycaster.raycast(screen)?;
        let uv = normalize_uv(hit.uv?)?;
        Some(SurfaceHit {
            world_pos: hit.world_pos,
            world_normal: hit.normal,
            uv,
            face_id: hit.face_id,
        })
    }

    /// Hit plus UV-per-pixel scale from samples one pixel along screen X and Y
    pub fn sample_with_scale(raycaster: &dyn SurfaceRaycaster, screen: Vec2) -> Option<SurfaceSample> {
        let hit = Self::sample(raycaster, screen)?;
        let scale = Self::measure_scale(raycaster, screen, &hit);
        if let ScreenScale::Invalid(reason) = scale {
            debug!("screen scale invalid at ({:.1}, {:.1}): {:?}", screen.x, screen.y, reason);
        }
        Some(SurfaceSample { hit, scale })
    }

    fn measure_scale(raycaster: &dyn SurfaceRaycaster, screen: Vec2, hit: &SurfaceHit) -> ScreenScale {
        if raycaster
            .uv_triangle_area(hit.face_id)
            .is_some_and(|area| area < MIN_UV_TRIANGLE_AREA)
        {
            return ScreenScale::Invalid(ScaleFailure::DegenerateUv);
        }

        let step = |offset: Vec2| {
            Self::sample(raycaster, screen + offset).map(|h| UvStep {
                distance: h.uv.distance(hit.uv),
                other_face: h.face_id != hit.face_id,
            })
        };
        let (Some(dx), Some(dy)) = (step(Vec2::X), step(Vec2::Y)) else {
            return ScreenScale::Invalid(ScaleFailure::OffsetMissed);
        };
        if dx.crosses_seam(&dy) || dy.crosses_seam(&dx) {
            return ScreenScale::Invalid(ScaleFailure::UvSeam);
        }

        let uv_per_pixel = (dx.distance + dy.distance) * 0.5;
        if !uv_per_pixel.is_finite() || uv_per_pixel < MIN_UV_PER_PIXEL {
            return ScreenScale::Invalid(ScaleFailure::DegenerateUv);
        }
        ScreenScale::Valid(uv_per_pixel)
    }

    /// Convert a pixel radius to UV units
    ///
    /// Screen-projected brushes use the measured scale. Resolution-relative
    /// brushes, and screen-projected ones without a valid scale, use
    /// `radius_px / 1024`.
    pub fn brush_radius_uv(radius_px: f32, scale: ScreenScale, mode: ProjectionMode) -> UvRadius {
        match (mode, scale) {
            (ProjectionMode::ScreenProjected, ScreenScale::Valid(uv_per_pixel)) => UvRadius {
                radius_uv: radius_px * uv_per_pixel,
                fallback: false,
            },
            (ProjectionMode::ScreenProjected, ScreenScale::Invalid(reason)) => {
                warn!("brush sizing falls back to resolution-relative radius ({:?})", reason);
                UvRadius {
                    radius_uv: radius_px / REFERENCE_RESOLUTION,
                    fallback: true,
                }
            }
            (ProjectionMode::NormalAligned, _) => UvRadius {
                radius_uv: radius_px / REFERENCE_RESOLUTION,
                fallback: false,
            },
        }
    }
}

/// UV distance covered by a one-pixel screen step
#[derive(Debug, Clone, Copy)]
struct UvStep {
    distance: f32,
    other_face: bool,
}

impl UvStep {
    /// A step onto another face whose UV jump dwarfs the other axis left the
    /// hit's UV island
    fn crosses_seam(&self, other_axis: &UvStep) -> bool {
        self.other_face && self.distance > MAX_UV_STEP_RATIO * other_axis.distance.max(MIN_UV_PER_PIXEL)
    }
}

/// Keep UVs in [0, 1]; tiled UVs outside that range wrap
fn normalize_uv(uv: Vec2) -> Option<Vec2> {
    if !uv.is_finite() {
        return None;
    }
    let wrap = |c: f32| if (0.0..=1.0).contains(&c) { c } else { c.rem_euclid(1.0) };
    Some(Vec2::new(wrap(uv.x), wrap(uv.y)))
}

/// Unit quad facing +Z under an orthographic camera, 100x100 viewport
#[cfg(test)]
pub(crate) fn quad_target() -> MeshTarget {
    let mesh = MeshRaycastData {
        positions: vec![
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
        ],
        indices: vec![0, 1, 2, 0, 2, 3],
        normals: vec![Vec3::Z; 4],
        uvs: vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ],
    };
    let view_proj = Mat4::orthographic_rh(-1.0, 1.0, -1.0, 1.0, 0.1, 10.0)
        * Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
    MeshTarget::new(mesh, Mat4::IDENTITY, ScreenCamera::new(view_proj, Vec2::new(100.0, 100.0)))
}
