//! # Coordinate Frames
//!
//! A [`CFrame`] is a rigid transform: a translation plus an orthonormal 3x3
//! rotation. Rotations are stored as nine row-major entries; the columns are
//! the frame's right, up and back axes, so the look direction is the negated
//! third column.
//!
//! ## Composition
//!
//! `a * b` applies `b` first and then `a`. The resulting translation is
//! `Ra * tb + ta` and the rotation is `Ra * Rb`. `cframe * vector` transforms
//! a point.
//!
//! ## Euler angles
//!
//! A [`RotationOrder`] of `XYZ` means `Rx(rx) * Ry(ry) * Rz(rz)`. Every order
//! is decomposed by the same routine parameterized on the axis permutation.
//! Near gimbal lock (middle-axis cosine below 1e-3) the last angle is forced
//! to zero and the first one absorbs the remaining rotation.

use std::fmt;
use std::ops::Mul;

use cgmath::Matrix4;
use log::warn;

use super::enums::RotationOrder;
use super::matrix::Matrix;
use super::quaternion::Quaternion;
use super::vector3::Vector3;
use crate::error::{MathError, MathResult};

type Rotation = [f64; 9];

const IDENTITY_ROTATION: Rotation = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
const GIMBAL_THRESHOLD: f64 = 1e-3;
const AXIS_ANGLE_EPSILON: f64 = 1e-6;
/// Angles (radians) this close to 0 or pi use the degenerate axis-angle branches.
const AXIS_ANGLE_CUTOFF: f64 = 1e-3;

/// Rigid transform: position plus orthonormal rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CFrame {
    position: [f64; 3],
    rotation: Rotation,
}

impl Default for CFrame {
    fn default() -> Self {
        Self::identity()
    }
}

impl CFrame {
    /// Above this `|forward . up|` the reference up axis is swapped.
    pub const LOOK_AT_PARALLEL_THRESHOLD: f64 = 0.999;
    /// Above this quaternion cosine SLERP falls back to a normalized blend.
    pub const SLERP_LINEAR_THRESHOLD: f64 = 0.9995;

    const fn from_parts(position: [f64; 3], rotation: Rotation) -> Self {
        Self { position, rotation }
    }

    pub const fn identity() -> Self {
        Self::from_parts([0.0; 3], IDENTITY_ROTATION)
    }

    /// Pure translation by `(x, y, z)`.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self::from_parts([x, y, z], IDENTITY_ROTATION)
    }

    pub fn from_position(position: impl Into<Vector3>) -> Self {
        Self::from_parts(position.into().to_array(), IDENTITY_ROTATION)
    }

    /// Frame at `position` whose look vector points at `target`, using world
    /// up `(0, 1, 0)` unless the look direction is nearly vertical, in which
    /// case `(0, 0, 1)` is used instead.
    pub fn looking_at(position: impl Into<Vector3>, target: impl Into<Vector3>) -> Self {
        Self::look_at(position, target, Vector3::y_axis())
    }

    /// Position plus a quaternion `(qx, qy, qz, qw)`. A zero quaternion
    /// yields the identity rotation.
    pub fn from_quaternion(x: f64, y: f64, z: f64, qx: f64, qy: f64, qz: f64, qw: f64) -> Self {
        let q = Quaternion::new(qx, qy, qz, qw);
        let rotation = if q.magnitude() == 0.0 {
            IDENTITY_ROTATION
        } else {
            q.to_rotation()
        };
        Self::from_parts([x, y, z], rotation)
    }

    /// Direct construction from a position and row-major rotation entries.
    #[allow(clippy::too_many_arguments)]
    pub const fn from_components(
        x: f64,
        y: f64,
        z: f64,
        r00: f64,
        r01: f64,
        r02: f64,
        r10: f64,
        r11: f64,
        r12: f64,
        r20: f64,
        r21: f64,
        r22: f64,
    ) -> Self {
        Self::from_parts([x, y, z], [r00, r01, r02, r10, r11, r12, r20, r21, r22])
    }

    /// Shape-checked construction from 0, 3, 7 or 12 numbers, matching
    /// [`CFrame::identity`], [`CFrame::new`], [`CFrame::from_quaternion`] and
    /// [`CFrame::from_components`].
    pub fn from_slice(values: &[f64]) -> MathResult<Self> {
        match *values {
            [] => Ok(Self::identity()),
            [x, y, z] => Ok(Self::new(x, y, z)),
            [x, y, z, qx, qy, qz, qw] => Ok(Self::from_quaternion(x, y, z, qx, qy, qz, qw)),
            [x, y, z, r00, r01, r02, r10, r11, r12, r20, r21, r22] => Ok(Self::from_components(
                x, y, z, r00, r01, r02, r10, r11, r12, r20, r21, r22,
            )),
            _ => Err(MathError::InvalidArity {
                expected: "0, 3, 7 or 12",
                found: values.len(),
            }),
        }
    }

    /// Frame at `at` looking toward `target` with the given reference up.
    pub fn look_at(
        at: impl Into<Vector3>,
        target: impl Into<Vector3>,
        up: impl Into<Vector3>,
    ) -> Self {
        let at = at.into();
        Self::look_along(at, target.into() - at, up)
    }

    /// Frame at `at` looking along `direction`.
    pub fn look_along(
        at: impl Into<Vector3>,
        direction: impl Into<Vector3>,
        up: impl Into<Vector3>,
    ) -> Self {
        let at = at.into();
        let forward = direction.into().unit();
        if forward == Vector3::zero() {
            return Self::from_position(at);
        }

        let mut up = up.into().unit();
        if up == Vector3::zero() || forward.dot(up).abs() > Self::LOOK_AT_PARALLEL_THRESHOLD {
            up = if forward.z().abs() > Self::LOOK_AT_PARALLEL_THRESHOLD {
                Vector3::x_axis()
            } else {
                Vector3::z_axis()
            };
        }

        let right = forward.cross(up).unit();
        let up = right.cross(forward);
        Self::from_axes(at, right, up, -forward)
    }

    fn from_axes(position: Vector3, right: Vector3, up: Vector3, back: Vector3) -> Self {
        Self::from_parts(
            position.to_array(),
            [
                right.x(),
                up.x(),
                back.x(),
                right.y(),
                up.y(),
                back.y(),
                right.z(),
                up.z(),
                back.z(),
            ],
        )
    }

    /// Frame from a position and the three axis columns. `back` defaults to
    /// `right x up`.
    pub fn from_matrix(
        position: impl Into<Vector3>,
        right: impl Into<Vector3>,
        up: impl Into<Vector3>,
        back: Option<Vector3>,
    ) -> Self {
        let right = right.into();
        let up = up.into();
        let back = back.unwrap_or_else(|| right.cross(up));
        Self::from_axes(position.into(), right, up, back)
    }

    /// Rotation about `axis` by `angle` radians. A zero axis yields identity.
    pub fn from_axis_angle(axis: impl Into<Vector3>, angle: f64) -> Self {
        let axis = axis.into().unit();
        if axis == Vector3::zero() {
            warn!("from_axis_angle called with a zero axis, using identity");
            return Self::identity();
        }
        let (x, y, z) = (axis.x(), axis.y(), axis.z());
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        Self::from_parts(
            [0.0; 3],
            [
                t * x * x + c,
                t * x * y - s * z,
                t * x * z + s * y,
                t * x * y + s * z,
                t * y * y + c,
                t * y * z - s * x,
                t * x * z - s * y,
                t * y * z + s * x,
                t * z * z + c,
            ],
        )
    }

    /// Shortest rotation taking the direction of `from` onto `to`.
    pub fn from_rotation_between_vectors(
        from: impl Into<Vector3>,
        to: impl Into<Vector3>,
    ) -> Self {
        let from = from.into().unit();
        let to = to.into().unit();
        let axis = from.cross(to);
        if axis.magnitude() > AXIS_ANGLE_EPSILON {
            return Self::from_axis_angle(axis, from.angle(to, None));
        }
        if from.dot(to) >= 0.0 {
            return Self::identity();
        }
        // opposite directions: half turn about any perpendicular axis
        let mut perpendicular = from.cross(Vector3::x_axis());
        if perpendicular.magnitude() < AXIS_ANGLE_EPSILON {
            perpendicular = from.cross(Vector3::y_axis());
        }
        Self::from_axis_angle(perpendicular, std::f64::consts::PI)
    }

    /// Rotation composed from elemental rotations in `order`.
    pub fn from_euler_angles(rx: f64, ry: f64, rz: f64, order: RotationOrder) -> Self {
        let angles = [rx, ry, rz];
        let rotation = order
            .axes()
            .iter()
            .fold(IDENTITY_ROTATION, |acc, &axis| {
                mul_rotation(&acc, &elemental_rotation(axis, angles[axis]))
            });
        Self::from_parts([0.0; 3], rotation)
    }

    pub fn from_euler_angles_xyz(rx: f64, ry: f64, rz: f64) -> Self {
        Self::from_euler_angles(rx, ry, rz, RotationOrder::XYZ)
    }

    pub fn from_euler_angles_yxz(rx: f64, ry: f64, rz: f64) -> Self {
        Self::from_euler_angles(rx, ry, rz, RotationOrder::YXZ)
    }

    /// Same as [`CFrame::from_euler_angles_xyz`].
    pub fn angles(rx: f64, ry: f64, rz: f64) -> Self {
        Self::from_euler_angles_xyz(rx, ry, rz)
    }

    /// Same as [`CFrame::from_euler_angles_yxz`].
    pub fn from_orientation(rx: f64, ry: f64, rz: f64) -> Self {
        Self::from_euler_angles_yxz(rx, ry, rz)
    }

    pub fn position(&self) -> Vector3 {
        self.position.into()
    }

    pub fn x(&self) -> f64 {
        self.position[0]
    }

    pub fn y(&self) -> f64 {
        self.position[1]
    }

    pub fn z(&self) -> f64 {
        self.position[2]
    }

    fn column(&self, index: usize) -> Vector3 {
        let r = &self.rotation;
        Vector3::new(r[index], r[3 + index], r[6 + index])
    }

    /// Same frame with the translation removed.
    pub fn rotation(&self) -> CFrame {
        Self::from_parts([0.0; 3], self.rotation)
    }

    pub fn look_vector(&self) -> Vector3 {
        -self.column(2)
    }

    pub fn right_vector(&self) -> Vector3 {
        self.column(0)
    }

    pub fn up_vector(&self) -> Vector3 {
        self.column(1)
    }

    pub fn x_vector(&self) -> Vector3 {
        self.column(0)
    }

    pub fn y_vector(&self) -> Vector3 {
        self.column(1)
    }

    pub fn z_vector(&self) -> Vector3 {
        self.column(2)
    }

    /// `x, y, z, R00, R01, R02, R10, R11, R12, R20, R21, R22`.
    pub fn components(&self) -> [f64; 12] {
        let mut out = [0.0; 12];
        out[..3].copy_from_slice(&self.position);
        out[3..].copy_from_slice(&self.rotation);
        out
    }

    /// Column-major 4x4 homogeneous matrix, ready for a uniform buffer.
    pub fn get_components(&self) -> [f64; 16] {
        let r = &self.rotation;
        let [x, y, z] = self.position;
        [
            r[0], r[3], r[6], 0.0, //
            r[1], r[4], r[7], 0.0, //
            r[2], r[5], r[8], 0.0, //
            x, y, z, 1.0,
        ]
    }

    /// Row-major 4x4 [`Matrix`] of this transform.
    pub fn to_matrix(&self) -> Matrix {
        Matrix::from(Matrix4::from(*self))
    }

    /// Rigid inverse: rotation `R^T`, translation `-R^T * t`.
    pub fn inverse(&self) -> CFrame {
        let rt = transpose_rotation(&self.rotation);
        let t = rotate(&rt, self.position);
        Self::from_parts([-t[0], -t[1], -t[2]], rt)
    }

    /// Position blends linearly, rotation by shortest-path SLERP.
    pub fn lerp(&self, goal: &CFrame, alpha: f64) -> CFrame {
        let position = self.position().lerp(goal.position(), alpha);
        let from = Quaternion::from_rotation(&self.rotation);
        let to = Quaternion::from_rotation(&goal.rotation);
        let blended = from.slerp(&to, alpha, Self::SLERP_LINEAR_THRESHOLD);
        Self::from_parts(position.to_array(), blended.to_rotation())
    }

    /// Gram-Schmidt on the right and up columns.
    pub fn orthonormalize(&self) -> CFrame {
        let right = self.right_vector().unit();
        let up = self.up_vector();
        let up = (up - right * right.dot(up)).unit();
        let back = right.cross(up);
        Self::from_axes(self.position(), right, up, back)
    }

    /// Decomposes the rotation into `(rx, ry, rz)` such that
    /// `from_euler_angles(rx, ry, rz, order)` rebuilds it.
    pub fn to_euler_angles(&self, order: RotationOrder) -> (f64, f64, f64) {
        let [a, b, c] = order.axes();
        // +1 for cyclic permutations of XYZ, -1 otherwise
        let sign = if (b + 3 - a) % 3 == 1 { 1.0 } else { -1.0 };
        let at = |row: usize, col: usize| self.rotation[row * 3 + col];

        let middle = (sign * at(a, c)).clamp(-1.0, 1.0).asin();
        let (first, last) = if middle.cos() > GIMBAL_THRESHOLD {
            (
                (-sign * at(b, c)).atan2(at(c, c)),
                (-sign * at(a, b)).atan2(at(a, a)),
            )
        } else {
            ((sign * at(c, b)).atan2(at(b, b)), 0.0)
        };

        let mut angles = [0.0; 3];
        angles[a] = first;
        angles[b] = middle;
        angles[c] = last;
        (angles[0], angles[1], angles[2])
    }

    pub fn to_euler_angles_xyz(&self) -> (f64, f64, f64) {
        self.to_euler_angles(RotationOrder::XYZ)
    }

    pub fn to_euler_angles_yxz(&self) -> (f64, f64, f64) {
        self.to_euler_angles(RotationOrder::YXZ)
    }

    /// Same as [`CFrame::to_euler_angles_yxz`].
    pub fn to_orientation(&self) -> (f64, f64, f64) {
        self.to_euler_angles_yxz()
    }

    /// Axis and angle (radians) of the rotation. A rotation within 1e-3 rad
    /// of identity reports the X axis with angle 0.
    pub fn to_axis_angle(&self) -> (Vector3, f64) {
        let r = &self.rotation;
        let trace = r[0] + r[4] + r[8];
        let angle = ((trace - 1.0) / 2.0).clamp(-1.0, 1.0).acos();

        if angle < AXIS_ANGLE_CUTOFF {
            return (Vector3::x_axis(), 0.0);
        }

        if angle > std::f64::consts::PI - AXIS_ANGLE_CUTOFF {
            // R + I is 2 * axis * axis^T; read the axis off its largest diagonal
            let xx = ((r[0] + 1.0) / 2.0).max(0.0);
            let yy = ((r[4] + 1.0) / 2.0).max(0.0);
            let zz = ((r[8] + 1.0) / 2.0).max(0.0);
            let xy = (r[1] + r[3]) / 4.0;
            let xz = (r[2] + r[6]) / 4.0;
            let yz = (r[5] + r[7]) / 4.0;
            let axis = if xx >= yy && xx >= zz {
                let x = xx.sqrt();
                Vector3::new(x, xy / x, xz / x)
            } else if yy >= zz {
                let y = yy.sqrt();
                Vector3::new(xy / y, y, yz / y)
            } else {
                let z = zz.sqrt();
                Vector3::new(xz / z, yz / z, z)
            };
            return (axis.unit(), std::f64::consts::PI);
        }

        let axis = Vector3::new(r[7] - r[5], r[2] - r[6], r[3] - r[1]) / (2.0 * angle.sin());
        (axis.unit(), angle)
    }

    pub fn fuzzy_eq(&self, other: &CFrame, epsilon: f64) -> bool {
        self.components()
            .iter()
            .zip(other.components().iter())
            .all(|(a, b)| (a - b).abs() < epsilon)
    }

    /// Translates by `offset` in world space.
    pub fn add(&self, offset: impl Into<Vector3>) -> CFrame {
        let p = self.position() + offset.into();
        Self::from_parts(p.to_array(), self.rotation)
    }

    pub fn subtract(&self, offset: impl Into<Vector3>) -> CFrame {
        let p = self.position() - offset.into();
        Self::from_parts(p.to_array(), self.rotation)
    }

    pub fn to_world_space(&self, other: &CFrame) -> CFrame {
        *self * *other
    }

    pub fn to_object_space(&self, other: &CFrame) -> CFrame {
        self.inverse() * *other
    }

    pub fn point_to_world_space(&self, point: impl Into<Vector3>) -> Vector3 {
        *self * point.into()
    }

    pub fn point_to_object_space(&self, point: impl Into<Vector3>) -> Vector3 {
        self.inverse() * point.into()
    }

    /// Rotates `vector` without translating it.
    pub fn vector_to_world_space(&self, vector: impl Into<Vector3>) -> Vector3 {
        rotate(&self.rotation, vector.into().to_array()).into()
    }

    pub fn vector_to_object_space(&self, vector: impl Into<Vector3>) -> Vector3 {
        rotate(&transpose_rotation(&self.rotation), vector.into().to_array()).into()
    }

    pub fn to_world_space_many(&self, frames: &[CFrame]) -> MathResult<Vec<CFrame>> {
        batch(frames, |f| self.to_world_space(f))
    }

    pub fn to_object_space_many(&self, frames: &[CFrame]) -> MathResult<Vec<CFrame>> {
        let inverse = self.inverse();
        batch(frames, |f| inverse * *f)
    }

    pub fn points_to_world_space(&self, points: &[Vector3]) -> MathResult<Vec<Vector3>> {
        batch(points, |p| *self * *p)
    }

    pub fn points_to_object_space(&self, points: &[Vector3]) -> MathResult<Vec<Vector3>> {
        let inverse = self.inverse();
        batch(points, |p| inverse * *p)
    }

    pub fn vectors_to_world_space(&self, vectors: &[Vector3]) -> MathResult<Vec<Vector3>> {
        batch(vectors, |v| self.vector_to_world_space(*v))
    }

    pub fn vectors_to_object_space(&self, vectors: &[Vector3]) -> MathResult<Vec<Vector3>> {
        batch(vectors, |v| self.vector_to_object_space(*v))
    }
}

fn batch<T, U>(items: &[T], f: impl Fn(&T) -> U) -> MathResult<Vec<U>> {
    if items.is_empty() {
        return Err(MathError::EmptyArguments);
    }
    Ok(items.iter().map(f).collect())
}

fn elemental_rotation(axis: usize, angle: f64) -> Rotation {
    let (s, c) = angle.sin_cos();
    match axis {
        0 => [1.0, 0.0, 0.0, 0.0, c, -s, 0.0, s, c],
        1 => [c, 0.0, s, 0.0, 1.0, 0.0, -s, 0.0, c],
        _ => [c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0],
    }
}

fn mul_rotation(a: &Rotation, b: &Rotation) -> Rotation {
    let mut out = [0.0; 9];
    for row in 0..3 {
        for col in 0..3 {
            out[row * 3 + col] = (0..3).map(|k| a[row * 3 + k] * b[k * 3 + col]).sum();
        }
    }
    out
}

fn transpose_rotation(r: &Rotation) -> Rotation {
    [r[0], r[3], r[6], r[1], r[4], r[7], r[2], r[5], r[8]]
}

fn rotate(r: &Rotation, v: [f64; 3]) -> [f64; 3] {
    [
        r[0] * v[0] + r[1] * v[1] + r[2] * v[2],
        r[3] * v[0] + r[4] * v[1] + r[5] * v[2],
        r[6] * v[0] + r[7] * v[1] + r[8] * v[2],
    ]
}

impl Mul for CFrame {
    type Output = CFrame;

    fn mul(self, rhs: CFrame) -> CFrame {
        let t = rotate(&self.rotation, rhs.position);
        CFrame::from_parts(
            [
                t[0] + self.position[0],
                t[1] + self.position[1],
                t[2] + self.position[2],
            ],
            mul_rotation(&self.rotation, &rhs.rotation),
        )
    }
}

impl Mul<Vector3> for CFrame {
    type Output = Vector3;

    fn mul(self, rhs: Vector3) -> Vector3 {
        let t = rotate(&self.rotation, rhs.to_array());
        Vector3::new(
            t[0] + self.position[0],
            t[1] + self.position[1],
            t[2] + self.position[2],
        )
    }
}

impl From<CFrame> for Matrix4<f64> {
    fn from(cframe: CFrame) -> Self {
        let c = cframe.get_components();
        Matrix4::new(
            c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7], c[8], c[9], c[10], c[11], c[12],
            c[13], c[14], c[15],
        )
    }
}

impl TryFrom<&[f64]> for CFrame {
    type Error = MathError;

    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        CFrame::from_slice(values)
    }
}

impl fmt::Display for CFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.components().iter().map(|v| v.to_string()).collect();
        write!(f, "CFrame({})", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn sample() -> CFrame {
        CFrame::new(1.0, -2.0, 3.5) * CFrame::from_euler_angles_xyz(0.4, -1.1, 2.3)
    }

    fn assert_vec_eq(a: Vector3, b: Vector3) {
        assert!(a.fuzzy_eq(b, 1e-9), "{a} != {b}");
    }

    #[test]
    fn test_inverse_composes_to_identity() {
        let a = sample();
        assert!((a * a.inverse()).fuzzy_eq(&CFrame::identity(), 1e-6));
        assert!((a.inverse() * a).fuzzy_eq(&CFrame::identity(), 1e-6));
    }

    #[test]
    fn test_composition_order() {
        let translate = CFrame::new(0.0, 0.0, -5.0);
        let turn = CFrame::from_euler_angles_xyz(0.0, FRAC_PI_2, 0.0);
        // local offset is rotated first
        assert_vec_eq((turn * translate).position(), Vector3::new(-5.0, 0.0, 0.0));
        assert_vec_eq((translate * turn).position(), Vector3::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn test_euler_round_trip_every_order() {
        for order in RotationOrder::ALL {
            let cf = CFrame::from_euler_angles(0.3, 0.5, -0.2, order);
            let (rx, ry, rz) = cf.to_euler_angles(order);
            assert_abs_diff_eq!(rx, 0.3, epsilon = 1e-9);
            assert_abs_diff_eq!(ry, 0.5, epsilon = 1e-9);
            assert_abs_diff_eq!(rz, -0.2, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_euler_gimbal_lock_rebuilds_rotation() {
        for order in RotationOrder::ALL {
            let mut angles = [0.7, 0.2, -0.4];
            angles[order.axes()[1]] = FRAC_PI_2;
            let cf = CFrame::from_euler_angles(angles[0], angles[1], angles[2], order);
            let (rx, ry, rz) = cf.to_euler_angles(order);
            let rebuilt = CFrame::from_euler_angles(rx, ry, rz, order);
            assert!(rebuilt.fuzzy_eq(&cf, 1e-6), "{order:?}");
            let last = [rx, ry, rz][order.axes()[2]];
            assert_eq!(last, 0.0);
        }
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = sample();
        let b = CFrame::new(-4.0, 0.0, 1.0) * CFrame::from_euler_angles_yxz(1.0, 0.2, -0.5);
        assert!(a.lerp(&b, 0.0).fuzzy_eq(&a, 1e-6));
        assert!(a.lerp(&b, 1.0).fuzzy_eq(&b, 1e-6));
    }

    #[test]
    fn test_lerp_halfway_rotation() {
        let a = CFrame::identity();
        let b = CFrame::from_axis_angle(Vector3::y_axis(), FRAC_PI_2);
        let mid = a.lerp(&b, 0.5);
        let (axis, angle) = mid.to_axis_angle();
        assert_vec_eq(axis, Vector3::y_axis());
        assert_abs_diff_eq!(angle, FRAC_PI_2 / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_looking_at_positive_z() {
        let cf = CFrame::looking_at(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));
        assert_vec_eq(cf.look_vector(), Vector3::new(0.0, 0.0, 1.0));
        assert_vec_eq(cf.up_vector(), Vector3::y_axis());
    }

    #[test]
    fn test_looking_straight_up_uses_fallback_axis() {
        let cf = CFrame::looking_at((1.0, 1.0, 1.0), (1.0, 5.0, 1.0));
        assert_vec_eq(cf.look_vector(), Vector3::y_axis());
        assert_abs_diff_eq!(cf.right_vector().magnitude(), 1.0, epsilon = 1e-9);
        assert_vec_eq(cf.position(), Vector3::one());
    }

    #[test]
    fn test_quaternion_constructor() {
        let half = FRAC_PI_2 / 2.0;
        let cf = CFrame::from_quaternion(1.0, 2.0, 3.0, 0.0, 0.0, half.sin(), half.cos());
        assert_vec_eq(cf.right_vector(), Vector3::y_axis());
        assert_eq!(
            CFrame::from_quaternion(0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0),
            CFrame::identity()
        );
    }

    #[test]
    fn test_from_slice_arity() {
        assert_eq!(CFrame::from_slice(&[]).unwrap(), CFrame::identity());
        assert_eq!(CFrame::from_slice(&[1.0, 2.0, 3.0]).unwrap(), CFrame::new(1.0, 2.0, 3.0));
        assert_eq!(
            CFrame::from_slice(&[1.0, 2.0]).unwrap_err(),
            MathError::InvalidArity {
                expected: "0, 3, 7 or 12",
                found: 2
            }
        );
        let cf = sample();
        assert_eq!(CFrame::from_slice(&cf.components()).unwrap(), cf);
    }

    #[test]
    fn test_axis_angle_regimes() {
        let (_, angle) = CFrame::identity().to_axis_angle();
        assert_eq!(angle, 0.0);

        let (axis, angle) = CFrame::from_axis_angle((0.0, 0.0, 1.0), PI).to_axis_angle();
        assert_vec_eq(axis, Vector3::z_axis());
        assert_abs_diff_eq!(angle, PI, epsilon = 1e-9);

        let direction = Vector3::new(1.0, 2.0, -1.0).unit();
        let (axis, angle) = CFrame::from_axis_angle(direction, 1.3).to_axis_angle();
        assert_vec_eq(axis, direction);
        assert_abs_diff_eq!(angle, 1.3, epsilon = 1e-9);
    }

    #[test]
    fn test_axis_angle_small_rotation_survives() {
        let (axis, angle) = CFrame::from_axis_angle(Vector3::y_axis(), 0.0012).to_axis_angle();
        assert_vec_eq(axis, Vector3::y_axis());
        assert_abs_diff_eq!(angle, 0.0012, epsilon = 1e-9);

        let (axis, angle) = CFrame::from_axis_angle(Vector3::y_axis(), 0.0009).to_axis_angle();
        assert_eq!((axis, angle), (Vector3::x_axis(), 0.0));

        let (axis, angle) = CFrame::from_axis_angle(Vector3::x_axis(), PI - 0.0012).to_axis_angle();
        assert_vec_eq(axis, Vector3::x_axis());
        assert_abs_diff_eq!(angle, PI - 0.0012, epsilon = 1e-9);
    }

    #[test]
    fn test_space_conversions() {
        let cf = sample();
        let p = Vector3::new(0.5, 4.0, -1.0);
        assert_vec_eq(cf.point_to_object_space(cf.point_to_world_space(p)), p);
        assert_vec_eq(cf.vector_to_object_space(cf.vector_to_world_space(p)), p);
        let other = CFrame::new(3.0, 3.0, 3.0);
        assert!(cf.to_world_space(&cf.to_object_space(&other)).fuzzy_eq(&other, 1e-9));
        assert_eq!(cf.points_to_world_space(&[]).unwrap_err(), MathError::EmptyArguments);
        assert_eq!(cf.points_to_world_space(&[p, p]).unwrap().len(), 2);
    }

    #[test]
    fn test_rotation_between_vectors() {
        let from = Vector3::new(1.0, 0.0, 0.0);
        let to = Vector3::new(0.0, 1.0, 1.0);
        let cf = CFrame::from_rotation_between_vectors(from, to);
        assert_vec_eq(cf.vector_to_world_space(from), to.unit());
        let flipped = CFrame::from_rotation_between_vectors(from, -from);
        assert_vec_eq(flipped.vector_to_world_space(from), -from);
    }

    #[test]
    fn test_orthonormalize_repairs_drift() {
        let skewed = CFrame::from_components(0.0, 0.0, 0.0, 1.0, 0.1, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0);
        let fixed = skewed.orthonormalize();
        assert_abs_diff_eq!(fixed.right_vector().dot(fixed.up_vector()), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fixed.up_vector().magnitude(), 1.0, epsilon = 1e-12);
        assert!((fixed * fixed.inverse()).fuzzy_eq(&CFrame::identity(), 1e-9));
    }

    #[test]
    fn test_get_components_matches_cgmath() {
        let cf = sample();
        let m: Matrix4<f64> = cf.into();
        let c = cf.get_components();
        assert_eq!(m[3][0], c[12]);
        assert_eq!(m[0][1], c[1]);
        assert_vec_eq(cf * Vector3::zero(), cf.position());
        let as_matrix = cf.to_matrix();
        assert_eq!(as_matrix[(0, 3)], cf.x());
    }
}
