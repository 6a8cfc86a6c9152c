//! # Scene Module
//!
//! A retained tree of named nodes that reports every structural and property
//! change through [`signals`](crate::signal).
//!
//! ## Node types
//!
//! - **Instance** ([`Instance`]) - the tree node: name, parent, children,
//!   attributes, lookups and events
//! - **Object3D** ([`Object3D`]) - a node with a [`CFrame`](crate::math::CFrame)
//! - **Parts** ([`BasePart`], [`Part`]) - positioned nodes with a size that
//!   the renderer draws
//! - **Camera** ([`Camera`]) - a positioned node with projection settings
//! - **Scene** ([`Scene`]) - a root instance, its camera and a dirty flag
//!
//! Typed handles deref down the lineage, so a [`Part`] can be used wherever
//! an [`Instance`] is expected:
//!
//! ```
//! use framekit::scene::{Part, Scene};
//!
//! let scene = Scene::new().unwrap();
//! let part = Part::new();
//! part.set_name("Crate").unwrap();
//! scene.add(&part).unwrap();
//! assert_eq!(part.get_full_name(), "Workspace.Crate");
//! assert_eq!(scene.model_uniforms().len(), 1);
//! ```
//!
//! ## Ownership
//!
//! Parents hold their children strongly; children reach their ancestors
//! through weak references. Event handlers that need a node should capture a
//! [`WeakInstance`] to avoid keeping the tree alive from inside itself.

pub mod attributes;
pub mod camera;
pub mod instance;
pub mod object3d;
pub mod part;
pub mod scene;

// Re-export main types
pub use attributes::AttributeValue;
pub use camera::{Camera, CameraSettings};
pub use instance::{Instance, WeakInstance};
pub use object3d::Object3D;
pub use part::{BasePart, Part};
pub use scene::{Scene, SceneConfig};
