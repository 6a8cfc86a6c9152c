use std::cell::RefCell;
use std::ops::Deref;

use super::camera::CameraSettings;
use super::instance::{class_lineage, Instance};
use crate::error::InstanceResult;
use crate::math::{CFrame, Vector3};

/// Class name shared by every positioned node.
pub const OBJECT3D_CLASS: &str = "Object3D";

/// Spatial state carried by positioned nodes. Position and orientation are
/// derived from the frame whenever it is assigned.
#[derive(Debug, Clone)]
pub(crate) struct Spatial {
    pub cframe: CFrame,
    pub position: Vector3,
    /// Degrees, YXZ order.
    pub orientation: Vector3,
    pub size: Option<Vector3>,
    pub camera: Option<CameraSettings>,
}

impl Spatial {
    pub fn new() -> Self {
        let mut spatial = Self {
            cframe: CFrame::identity(),
            position: Vector3::zero(),
            orientation: Vector3::zero(),
            size: None,
            camera: None,
        };
        spatial.assign(CFrame::identity());
        spatial
    }

    pub fn assign(&mut self, cframe: CFrame) {
        let (rx, ry, rz) = cframe.to_orientation();
        self.cframe = cframe;
        self.position = cframe.position();
        self.orientation = Vector3::new(rx.to_degrees(), ry.to_degrees(), rz.to_degrees());
    }
}

/// Handle to a node that has a [`CFrame`].
///
/// Derefs to [`Instance`] for the tree API.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Object3D(Instance);

impl Object3D {
    pub fn new(class_name: impl Into<String>) -> Self {
        let class_name: String = class_name.into();
        Self::with_bases(&class_name, &[], Spatial::new())
    }

    pub(crate) fn with_bases(class_name: &str, bases: &[&str], spatial: Spatial) -> Self {
        let mut lineage_bases = bases.to_vec();
        lineage_bases.push(OBJECT3D_CLASS);
        Self(Instance::with_lineage(
            class_lineage(class_name, &lineage_bases),
            Some(spatial),
        ))
    }

    /// Views a tree node as an `Object3D`, if it is one.
    pub fn from_instance(instance: &Instance) -> Option<Self> {
        instance.spatial().map(|_| Self(instance.clone()))
    }

    pub fn instance(&self) -> &Instance {
        &self.0
    }

    pub(crate) fn spatial(&self) -> &RefCell<Spatial> {
        match self.0.spatial() {
            Some(spatial) => spatial,
            None => unreachable!("Object3D handles only wrap spatial nodes"),
        }
    }

    pub fn cframe(&self) -> CFrame {
        self.spatial().borrow().cframe
    }

    /// Replaces the frame and fires `Changed` for `CFrame`, `Position` and
    /// `Orientation`.
    pub fn set_cframe(&self, cframe: CFrame) -> InstanceResult<()> {
        self.0.ensure_alive()?;
        self.spatial().borrow_mut().assign(cframe);
        for property in ["CFrame", "Position", "Orientation"] {
            self.0.property_changed(property);
        }
        Ok(())
    }

    pub fn position(&self) -> Vector3 {
        self.spatial().borrow().position
    }

    /// Moves the frame, keeping its rotation.
    pub fn set_position(&self, position: impl Into<Vector3>) -> InstanceResult<()> {
        self.set_cframe(self.cframe().rotation().add(position))
    }

    /// Euler angles in degrees, YXZ order.
    pub fn orientation(&self) -> Vector3 {
        self.spatial().borrow().orientation
    }

    /// Rotates the frame to the given YXZ angles in degrees, keeping its
    /// position.
    pub fn set_orientation(&self, degrees: impl Into<Vector3>) -> InstanceResult<()> {
        let degrees = degrees.into();
        let rotation = CFrame::from_orientation(
            degrees.x().to_radians(),
            degrees.y().to_radians(),
            degrees.z().to_radians(),
        );
        self.set_cframe(rotation.add(self.position()))
    }
}

impl Deref for Object3D {
    type Target = Instance;

    fn deref(&self) -> &Instance {
        &self.0
    }
}

impl From<Object3D> for Instance {
    fn from(object: Object3D) -> Self {
        object.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_defaults() {
        let object = Object3D::new("Model");
        assert_eq!(object.cframe(), CFrame::identity());
        assert_eq!(object.position(), Vector3::zero());
        assert!(object.is_a("Object3D"));
        assert_eq!(object.class_name(), "Model");
    }

    #[test]
    fn test_set_cframe_updates_derived_values() {
        let object = Object3D::new("Model");
        object
            .set_cframe(CFrame::new(1.0, 2.0, 3.0) * CFrame::from_orientation(0.0, 90f64.to_radians(), 0.0))
            .unwrap();
        assert_eq!(object.position(), Vector3::new(1.0, 2.0, 3.0));
        assert!(object.orientation().fuzzy_eq((0.0, 90.0, 0.0), 1e-9));
    }

    #[test]
    fn test_set_cframe_fires_three_changes() {
        let object = Object3D::new("Model");
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        object.changed().connect(move |p| sink.borrow_mut().push(p)).unwrap();
        let position_changes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&position_changes);
        object
            .get_property_changed_signal("Position")
            .unwrap()
            .connect(move |_| counter.set(counter.get() + 1))
            .unwrap();

        object.set_position((4.0, 0.0, 0.0)).unwrap();
        assert_eq!(*changes.borrow(), vec!["CFrame", "Position", "Orientation"]);
        assert_eq!(position_changes.get(), 1);
    }

    #[test]
    fn test_set_position_keeps_rotation_and_orientation_keeps_position() {
        let object = Object3D::new("Model");
        object.set_orientation((10.0, 20.0, 30.0)).unwrap();
        let rotation = object.cframe().rotation();
        object.set_position((5.0, 6.0, 7.0)).unwrap();
        assert!(object.cframe().rotation().fuzzy_eq(&rotation, 1e-12));
        assert!(object.orientation().fuzzy_eq((10.0, 20.0, 30.0), 1e-9));

        object.set_orientation((0.0, 0.0, 0.0)).unwrap();
        assert_eq!(object.position(), Vector3::new(5.0, 6.0, 7.0));
    }

    #[test]
    fn test_from_instance() {
        let object = Object3D::new("Model");
        let node: Instance = object.clone().into();
        assert_eq!(Object3D::from_instance(&node), Some(object));
        assert_eq!(Object3D::from_instance(&Instance::new("Folder")), None);
    }

    #[test]
    fn test_destroyed_object_rejects_cframe() {
        let object = Object3D::new("Model");
        object.destroy();
        assert!(object.set_cframe(CFrame::new(1.0, 0.0, 0.0)).is_err());
    }
}
