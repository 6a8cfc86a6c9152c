//! # Framekit Prelude
//!
//! Brings the commonly used types into scope with one import:
//!
//! ```rust
//! use framekit::prelude::*;
//!
//! let frame = CFrame::from_orientation(0.0, std::f64::consts::FRAC_PI_2, 0.0);
//! let point = frame * Vector3::new(1.0, 0.0, 0.0);
//! assert!(point.fuzzy_eq((0.0, 0.0, -1.0), 1e-9));
//! ```

// Re-export errors
pub use crate::error::{InstanceError, InstanceResult, MathError, MathResult, SignalError};

// Re-export math types
pub use crate::math::{
    Axis, CFrame, CameraUniform, Matrix, NormalId, RotationOrder, TransformUniform, Vector2,
    Vector3,
};

// Re-export signal types
pub use crate::signal::{channel, Connection, ScopedConnection, Signal, SignalEmitter};

// Re-export scene types
pub use crate::scene::{
    AttributeValue, BasePart, Camera, CameraSettings, Instance, Object3D, Part, Scene,
    SceneConfig, WeakInstance,
};

pub use crate::init_logging;
