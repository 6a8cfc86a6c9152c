use std::ops::Deref;

use super::instance::Instance;
use super::object3d::{Object3D, Spatial};
use crate::error::InstanceResult;
use crate::math::buffers::{self, TransformUniform};
use crate::math::Vector3;

pub const BASE_PART_CLASS: &str = "BasePart";
pub const PART_CLASS: &str = "Part";

/// Positioned node with a size, the unit the renderer draws.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BasePart(Object3D);

impl BasePart {
    pub fn new(class_name: impl Into<String>) -> Self {
        let class_name: String = class_name.into();
        let spatial = Spatial {
            size: Some(Vector3::one()),
            ..Spatial::new()
        };
        Self(Object3D::with_bases(&class_name, &[BASE_PART_CLASS], spatial))
    }

    pub fn from_instance(instance: &Instance) -> Option<Self> {
        if instance.is_a(BASE_PART_CLASS) {
            Object3D::from_instance(instance).map(Self)
        } else {
            None
        }
    }

    pub fn size(&self) -> Vector3 {
        self.spatial().borrow().size.unwrap_or_else(Vector3::one)
    }

    /// Fires `Changed("Size")`.
    pub fn set_size(&self, size: impl Into<Vector3>) -> InstanceResult<()> {
        self.ensure_alive()?;
        self.spatial().borrow_mut().size = Some(size.into());
        self.property_changed("Size");
        Ok(())
    }

    /// Column-major `T * R * S` model matrix.
    pub fn model_matrix(&self) -> [f32; 16] {
        buffers::model_matrix(&self.cframe(), self.size())
    }

    pub fn transform_uniform(&self) -> TransformUniform {
        TransformUniform::new(&self.cframe(), self.size())
    }
}

impl Deref for BasePart {
    type Target = Object3D;

    fn deref(&self) -> &Object3D {
        &self.0
    }
}

/// The plain box part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Part(BasePart);

impl Part {
    pub fn new() -> Self {
        Self(BasePart::new(PART_CLASS))
    }

    pub fn from_instance(instance: &Instance) -> Option<Self> {
        if instance.is_a(PART_CLASS) {
            BasePart::from_instance(instance).map(Self)
        } else {
            None
        }
    }
}

impl Default for Part {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Part {
    type Target = BasePart;

    fn deref(&self) -> &BasePart {
        &self.0
    }
}
