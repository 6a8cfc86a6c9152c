use std::cell::Cell;
use std::rc::Rc;

use log::debug;

use super::camera::{Camera, CameraSettings};
use super::instance::Instance;
use super::part::BasePart;
use crate::error::{InstanceResult, MathResult};
use crate::math::{CameraUniform, CFrame, TransformUniform};
use crate::signal::ScopedConnection;

/// Settings for [`Scene::with_config`].
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    /// Name of the root instance.
    pub root_name: String,
    pub camera: CameraSettings,
    /// Initial camera frame.
    pub camera_cframe: CFrame,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            root_name: "Workspace".to_owned(),
            camera: CameraSettings::default(),
            camera_cframe: CFrame::new(0.0, 0.0, 4.0),
        }
    }
}

/// A root instance plus the camera that views it.
///
/// The dirty flag is raised whenever a node enters or leaves the tree under
/// the root, and starts raised so the first frame uploads everything.
pub struct Scene {
    workspace: Instance,
    camera: Camera,
    dirty: Rc<Cell<bool>>,
    _connections: Vec<ScopedConnection>,
}

impl Scene {
    pub fn new() -> InstanceResult<Self> {
        Self::with_config(SceneConfig::default())
    }

    pub fn with_config(config: SceneConfig) -> InstanceResult<Self> {
        let workspace = Instance::new("Workspace");
        workspace.set_name(config.root_name)?;

        let camera = Camera::new(config.camera);
        camera.set_cframe(config.camera_cframe)?;

        let dirty = Rc::new(Cell::new(true));
        let added = Rc::clone(&dirty);
        let removing = Rc::clone(&dirty);
        let connections = vec![
            workspace
                .descendant_added()
                .connect(move |_| added.set(true))?
                .scoped(),
            workspace
                .descendant_removing()
                .connect(move |_| removing.set(true))?
                .scoped(),
        ];

        debug!("Created scene '{}'", workspace.name());
        Ok(Self {
            workspace,
            camera,
            dirty,
            _connections: connections,
        })
    }

    pub fn workspace(&self) -> &Instance {
        &self.workspace
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Parents `instance` to the root.
    pub fn add(&self, instance: &Instance) -> InstanceResult<()> {
        instance.set_parent(Some(&self.workspace))
    }

    /// Every part under the root, in pre-order.
    pub fn parts(&self) -> Vec<BasePart> {
        self.workspace
            .get_descendants()
            .iter()
            .filter_map(BasePart::from_instance)
            .collect()
    }

    /// One model uniform per part, ordered like [`Scene::parts`].
    pub fn model_uniforms(&self) -> Vec<TransformUniform> {
        self.parts().iter().map(BasePart::transform_uniform).collect()
    }

    pub fn camera_uniform(&self) -> MathResult<CameraUniform> {
        self.camera.uniform()
    }

    /// Updates the camera aspect ratio for a new surface size. A zero height
    /// leaves the camera untouched.
    pub fn resize(&self, width: u32, height: u32) -> InstanceResult<()> {
        if height == 0 {
            return Ok(());
        }
        let settings = CameraSettings {
            aspect_ratio: f64::from(width) / f64::from(height),
            ..self.camera.settings()
        };
        self.camera.set_settings(settings)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    pub fn clear_dirty(&self) {
        self.dirty.set(false);
    }

    /// Returns the flag and clears it.
    pub fn take_dirty(&self) -> bool {
        self.dirty.replace(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::part::Part;
    use crate::scene::Object3D;

    #[test]
    fn test_defaults() {
        let scene = Scene::new().unwrap();
        assert_eq!(scene.workspace().name(), "Workspace");
        assert_eq!(scene.camera().position(), crate::math::Vector3::new(0.0, 0.0, 4.0));
        assert!(scene.is_dirty());
        assert!(scene.parts().is_empty());
    }

    #[test]
    fn test_dirty_tracks_structure() {
        let scene = Scene::new().unwrap();
        assert!(scene.take_dirty());
        assert!(!scene.is_dirty());

        let part = Part::new();
        scene.add(&part).unwrap();
        assert!(scene.take_dirty());

        part.set_name("Renamed").unwrap();
        assert!(!scene.is_dirty());

        part.set_parent(None).unwrap();
        assert!(scene.is_dirty());
    }

    #[test]
    fn test_model_uniforms_in_pre_order() {
        let scene = Scene::new().unwrap();
        let model = Object3D::new("Model");
        let first = Part::new();
        let second = Part::new();
        first.set_cframe(CFrame::new(1.0, 0.0, 0.0)).unwrap();
        second.set_cframe(CFrame::new(2.0, 0.0, 0.0)).unwrap();
        first.set_parent(Some(model.instance())).unwrap();
        scene.add(&model).unwrap();
        scene.add(&second).unwrap();

        let uniforms = scene.model_uniforms();
        assert_eq!(uniforms.len(), 2);
        assert_eq!(uniforms[0].model[3][0], 1.0);
        assert_eq!(uniforms[1].model[3][0], 2.0);
    }

    #[test]
    fn test_resize_sets_aspect_ratio() {
        let scene = Scene::new().unwrap();
        scene.resize(800, 400).unwrap();
        assert_eq!(scene.camera().settings().aspect_ratio, 2.0);
        scene.resize(800, 0).unwrap();
        assert_eq!(scene.camera().settings().aspect_ratio, 2.0);
        assert!(scene.camera_uniform().is_ok());
    }

    #[test]
    fn test_custom_root_name() {
        let scene = Scene::with_config(SceneConfig {
            root_name: "World".into(),
            ..SceneConfig::default()
        })
        .unwrap();
        assert_eq!(scene.workspace().get_full_name(), "World");
    }
}
