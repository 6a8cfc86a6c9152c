use std::ops::Deref;

use cgmath::Matrix4;

use super::instance::Instance;
use super::object3d::{Object3D, Spatial};
use crate::error::{InstanceResult, MathResult};
use crate::math::buffers::{self, CameraUniform};
use crate::math::CFrame;

pub const CAMERA_CLASS: &str = "Camera";

/// Projection parameters for a [`Camera`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    /// Vertical field of view in radians.
    pub field_of_view: f64,
    pub aspect_ratio: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            field_of_view: 70f64.to_radians(),
            aspect_ratio: 16.0 / 9.0,
            near: 0.01,
            far: 1000.0,
        }
    }
}

/// Positioned node that produces view and projection matrices.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Camera(Object3D);

impl Camera {
    pub fn new(settings: CameraSettings) -> Self {
        let spatial = Spatial {
            camera: Some(settings),
            ..Spatial::new()
        };
        Self(Object3D::with_bases(CAMERA_CLASS, &[], spatial))
    }

    pub fn from_instance(instance: &Instance) -> Option<Self> {
        if instance.is_a(CAMERA_CLASS) {
            Object3D::from_instance(instance).map(Self)
        } else {
            None
        }
    }

    pub fn settings(&self) -> CameraSettings {
        self.spatial().borrow().camera.unwrap_or_default()
    }

    /// Replaces the projection parameters and fires `Changed("Settings")`.
    pub fn set_settings(&self, settings: CameraSettings) -> InstanceResult<()> {
        self.ensure_alive()?;
        self.spatial().borrow_mut().camera = Some(settings);
        self.property_changed("Settings");
        Ok(())
    }

    /// Column-major world-to-camera matrix.
    pub fn view_matrix(&self) -> [f32; 16] {
        buffers::view_matrix(&self.cframe())
    }

    /// Column-major projection matrix.
    pub fn projection_matrix(&self) -> MathResult<[f32; 16]> {
        let s = self.settings();
        buffers::perspective_matrix(s.field_of_view, s.aspect_ratio, s.near, s.far)
    }

    /// Projection times view, column-major.
    pub fn view_projection(&self) -> MathResult<[f32; 16]> {
        let projection = Matrix4::from(buffers::to_columns(&self.projection_matrix()?));
        let view = Matrix4::from(buffers::to_columns(&self.view_matrix()));
        let columns: [[f32; 4]; 4] = (projection * view).into();
        let mut flat = [0.0; 16];
        for (i, column) in columns.iter().enumerate() {
            flat[i * 4..i * 4 + 4].copy_from_slice(column);
        }
        Ok(flat)
    }

    pub fn uniform(&self) -> MathResult<CameraUniform> {
        let position = self.position().to_f32_array();
        Ok(CameraUniform {
            view_position: [position[0], position[1], position[2], 1.0],
            view_proj: buffers::to_columns(&self.view_projection()?),
        })
    }

    /// Points the camera at `target` from its current position.
    pub fn look_at(&self, target: impl Into<crate::math::Vector3>) -> InstanceResult<()> {
        self.set_cframe(CFrame::looking_at(self.position(), target))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(CameraSettings::default())
    }
}

impl Deref for Camera {
    type Target = Object3D;

    fn deref(&self) -> &Object3D {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vector3;

    #[test]
    fn test_default_settings() {
        let settings = CameraSettings::default();
        assert!((settings.field_of_view - 1.2217304763960306).abs() < 1e-12);
        assert_eq!(settings.far, 1000.0);
        assert_eq!(Camera::default().settings(), settings);
    }

    #[test]
    fn test_view_projection_maps_target_to_center() {
        let camera = Camera::default();
        camera.set_cframe(CFrame::new(0.0, 0.0, 4.0)).unwrap();
        camera.look_at(Vector3::zero()).unwrap();
        let m = camera.view_projection().unwrap();
        // clip-space x and y of the origin
        let x = m[12];
        let y = m[13];
        let w = m[15];
        assert!(w > 0.0);
        assert!((x / w).abs() < 1e-6 && (y / w).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_fov_is_reported() {
        let camera = Camera::new(CameraSettings {
            field_of_view: 0.0,
            ..CameraSettings::default()
        });
        assert!(camera.projection_matrix().is_err());
        assert!(camera.uniform().is_err());
    }

    #[test]
    fn test_from_instance() {
        let camera = Camera::default();
        let node = camera.instance().clone();
        assert!(Camera::from_instance(&node).is_some());
        assert!(Camera::from_instance(&Object3D::new("Model")).is_none());
    }
}
