//! # GPU Buffer Helpers
//!
//! Flattens frames into the column-major `f32` layout a renderer uploads to
//! uniform or storage buffers. Nothing here talks to a device; consumers
//! `bytemuck::cast_slice` the uniforms and write them wherever they need.

use super::cframe::CFrame;
use super::vector3::Vector3;
use crate::error::{MathError, MathResult};

/// Smallest field of view accepted by [`perspective_matrix`].
pub const MIN_FIELD_OF_VIEW: f64 = 0.01;

/// Per-object model matrix uniform.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    /// Column-major model matrix.
    pub model: [[f32; 4]; 4],
}

impl TransformUniform {
    pub fn new(cframe: &CFrame, scale: Vector3) -> Self {
        Self {
            model: to_columns(&model_matrix(cframe, scale)),
        }
    }
}

impl Default for TransformUniform {
    fn default() -> Self {
        Self::new(&CFrame::identity(), Vector3::one())
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    /// The eye position in homogeneous coordinates.
    ///
    /// The fourth component pads the field to 16 bytes.
    pub view_position: [f32; 4],

    /// Projection times view, column-major.
    pub view_proj: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_position: [0.0, 0.0, 0.0, 1.0],
            view_proj: to_columns(&model_matrix(&CFrame::identity(), Vector3::one())),
        }
    }
}

/// Splits a flat column-major matrix into its four columns.
pub fn to_columns(m: &[f32; 16]) -> [[f32; 4]; 4] {
    let mut result = [[0.0; 4]; 4];
    for (i, column) in result.iter_mut().enumerate() {
        column.copy_from_slice(&m[i * 4..i * 4 + 4]);
    }
    result
}

fn to_f32(values: [f64; 16]) -> [f32; 16] {
    values.map(|v| v as f32)
}

/// Column-major `T * R * S` for a frame and per-axis scale.
pub fn model_matrix(cframe: &CFrame, scale: Vector3) -> [f32; 16] {
    let mut m = cframe.get_components();
    let factors = scale.to_array();
    for (column, factor) in factors.iter().enumerate() {
        for row in 0..3 {
            m[column * 4 + row] *= factor;
        }
    }
    to_f32(m)
}

/// World-to-camera matrix: the inverse of the camera frame.
pub fn view_matrix(cframe: &CFrame) -> [f32; 16] {
    to_f32(cframe.inverse().get_components())
}

/// Right-handed perspective projection with OpenGL depth range. An infinite
/// `far` yields the infinite-far-plane projection.
///
/// # Arguments
/// * `fov` - Vertical field of view in radians, at least [`MIN_FIELD_OF_VIEW`]
/// * `aspect` - Width over height
pub fn perspective_matrix(fov: f64, aspect: f64, near: f64, far: f64) -> MathResult<[f32; 16]> {
    if !(fov >= MIN_FIELD_OF_VIEW) {
        return Err(MathError::InvalidFov(fov));
    }
    let f = 1.0 / (fov / 2.0).tan();
    let (depth_scale, depth_offset) = if far.is_finite() {
        let nf = 1.0 / (near - far);
        ((far + near) * nf, 2.0 * far * near * nf)
    } else {
        (-1.0, -2.0 * near)
    };
    Ok(to_f32([
        f / aspect, 0.0, 0.0, 0.0, //
        0.0, f, 0.0, 0.0, //
        0.0, 0.0, depth_scale, -1.0, //
        0.0, 0.0, depth_offset, 0.0,
    ]))
}

/// Four rows of two-decimal values, one line per row of the matrix.
pub fn format_matrix(m: &[f32; 16]) -> String {
    let mut out = String::new();
    for row in 0..4 {
        let cells: Vec<String> = (0..4)
            .map(|column| format!("{:.2}", m[column * 4 + row]))
            .collect();
        out.push_str(&cells.join(", "));
        out.push('\n');
    }
    out
}
