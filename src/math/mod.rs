//! # Math Module
//!
//! Value types for positioning things in 3D space.
//!
//! - **Vectors** ([`Vector2`], [`Vector3`]) - immutable `Copy` values with
//!   componentwise arithmetic, dot/cross products and interpolation
//! - **Matrices** ([`Matrix`]) - dense `rows x columns` matrices with memoized
//!   determinant, adjoint and inverse
//! - **Frames** ([`CFrame`]) - rigid transforms with composition, inversion,
//!   SLERP and Euler/axis-angle conversions
//! - **Buffers** ([`buffers`]) - column-major `f32` layouts for GPU upload
//!
//! Binary operations accept anything convertible into the target vector
//! type, so tuples, arrays and `cgmath` vectors can be passed directly:
//!
//! ```
//! use framekit::math::{CFrame, Vector3};
//!
//! let frame = CFrame::looking_at((0.0, 0.0, 0.0), (0.0, 0.0, 1.0));
//! assert!(frame.look_vector().fuzzy_eq((0.0, 0.0, 1.0), 1e-9));
//! let moved = frame.add(Vector3::new(1.0, 0.0, 0.0));
//! assert_eq!(moved.x(), 1.0);
//! ```

pub mod buffers;
pub mod cframe;
pub mod enums;
pub mod matrix;
mod quaternion;
pub mod vector2;
pub mod vector3;

// Re-export main types
pub use buffers::{CameraUniform, TransformUniform};
pub use cframe::CFrame;
pub use enums::{Axis, NormalId, RotationOrder};
pub use matrix::Matrix;
pub use vector2::{Operand2, Vector2};
pub use vector3::{Operand3, Vector3};
