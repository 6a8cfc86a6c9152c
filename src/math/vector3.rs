use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use cgmath::{Point3, Vector3 as CgVector3};

use super::enums::{Axis, NormalId};
use crate::error::MathError;

/// Immutable 3D vector.
///
/// Derived values are pure functions of the three components, so asking for
/// `magnitude()` or `unit()` twice always yields the same value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    x: f64,
    y: f64,
    z: f64,
}

/// Right-hand side of `multiply`/`divide`: a scalar broadcast or a
/// componentwise vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand3 {
    Scalar(f64),
    Vector(Vector3),
}

impl From<f64> for Operand3 {
    fn from(value: f64) -> Self {
        Operand3::Scalar(value)
    }
}

impl From<Vector3> for Operand3 {
    fn from(value: Vector3) -> Self {
        Operand3::Vector(value)
    }
}

impl From<(f64, f64, f64)> for Operand3 {
    fn from(value: (f64, f64, f64)) -> Self {
        Operand3::Vector(value.into())
    }
}

impl From<[f64; 3]> for Operand3 {
    fn from(value: [f64; 3]) -> Self {
        Operand3::Vector(value.into())
    }
}

impl From<CgVector3<f64>> for Operand3 {
    fn from(value: CgVector3<f64>) -> Self {
        Operand3::Vector(value.into())
    }
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub const fn one() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    pub const fn x_axis() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    pub const fn y_axis() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }

    pub const fn z_axis() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    /// Outward normal of a box face. `Front` is +Z and `Back` is -Z.
    pub const fn from_normal_id(normal: NormalId) -> Self {
        match normal {
            NormalId::Right => Self::new(1.0, 0.0, 0.0),
            NormalId::Top => Self::new(0.0, 1.0, 0.0),
            NormalId::Back => Self::new(0.0, 0.0, -1.0),
            NormalId::Left => Self::new(-1.0, 0.0, 0.0),
            NormalId::Bottom => Self::new(0.0, -1.0, 0.0),
            NormalId::Front => Self::new(0.0, 0.0, 1.0),
        }
    }

    pub const fn from_axis(axis: Axis) -> Self {
        match axis {
            Axis::X => Self::x_axis(),
            Axis::Y => Self::y_axis(),
            Axis::Z => Self::z_axis(),
        }
    }

    /// Positional coercion: missing trailing components default to zero,
    /// extra components are ignored, an empty slice is not vector-like.
    pub fn try_from_components(components: &[f64]) -> Result<Self, MathError> {
        if components.is_empty() {
            return Err(MathError::NotVectorLike);
        }
        let at = |i: usize| components.get(i).copied().unwrap_or(0.0);
        Ok(Self::new(at(0), at(1), at(2)))
    }

    pub const fn x(&self) -> f64 {
        self.x
    }

    pub const fn y(&self) -> f64 {
        self.y
    }

    pub const fn z(&self) -> f64 {
        self.z
    }

    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit vector in the same direction; the zero vector maps to itself.
    pub fn unit(&self) -> Self {
        let magnitude = self.magnitude();
        if magnitude == 0.0 {
            Self::zero()
        } else {
            *self * (1.0 / magnitude)
        }
    }

    pub fn abs(&self) -> Self {
        Self::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    pub fn ceil(&self) -> Self {
        Self::new(self.x.ceil(), self.y.ceil(), self.z.ceil())
    }

    pub fn floor(&self) -> Self {
        Self::new(self.x.floor(), self.y.floor(), self.z.floor())
    }

    /// Componentwise sign; zero stays zero.
    pub fn sign(&self) -> Self {
        Self::new(sign(self.x), sign(self.y), sign(self.z))
    }

    pub const fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Single-precision form for vertex/uniform upload.
    pub fn to_f32_array(&self) -> [f32; 3] {
        [self.x as f32, self.y as f32, self.z as f32]
    }

    pub fn add(&self, other: impl Into<Vector3>) -> Self {
        *self + other.into()
    }

    pub fn subtract(&self, other: impl Into<Vector3>) -> Self {
        *self - other.into()
    }

    pub fn multiply(&self, other: impl Into<Operand3>) -> Self {
        match other.into() {
            Operand3::Scalar(s) => *self * s,
            Operand3::Vector(v) => *self * v,
        }
    }

    pub fn divide(&self, other: impl Into<Operand3>) -> Self {
        match other.into() {
            Operand3::Scalar(s) => *self / s,
            Operand3::Vector(v) => *self / v,
        }
    }

    pub fn floor_divide(&self, other: impl Into<Operand3>) -> Self {
        self.divide(other).floor()
    }

    pub fn dot(&self, other: impl Into<Vector3>) -> f64 {
        let other = other.into();
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Right-handed cross product.
    pub fn cross(&self, other: impl Into<Vector3>) -> Self {
        let other = other.into();
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn lerp(&self, goal: impl Into<Vector3>, alpha: f64) -> Self {
        let goal = goal.into();
        Self::new(
            self.x + (goal.x - self.x) * alpha,
            self.y + (goal.y - self.y) * alpha,
            self.z + (goal.z - self.z) * alpha,
        )
    }

    /// Angle in radians between `self` and `other`.
    ///
    /// Unsigned unless `axis` is given, in which case the result is negative
    /// when `self x other` points away from `axis`. Returns 0 when either
    /// vector has zero length.
    pub fn angle(&self, other: impl Into<Vector3>, axis: Option<Vector3>) -> f64 {
        let other = other.into();
        let denominator = self.magnitude() * other.magnitude();
        if denominator == 0.0 {
            return 0.0;
        }
        let angle = (self.dot(other) / denominator).clamp(-1.0, 1.0).acos();
        match axis {
            Some(axis) if self.cross(other).dot(axis) < 0.0 => -angle,
            _ => angle,
        }
    }

    /// Componentwise maximum over `self` and every entry of `others`.
    pub fn max(&self, others: &[Vector3]) -> Result<Self, MathError> {
        if others.is_empty() {
            return Err(MathError::EmptyArguments);
        }
        Ok(others.iter().fold(*self, |acc, v| {
            Self::new(acc.x.max(v.x), acc.y.max(v.y), acc.z.max(v.z))
        }))
    }

    pub fn min(&self, others: &[Vector3]) -> Result<Self, MathError> {
        if others.is_empty() {
            return Err(MathError::EmptyArguments);
        }
        Ok(others.iter().fold(*self, |acc, v| {
            Self::new(acc.x.min(v.x), acc.y.min(v.y), acc.z.min(v.z))
        }))
    }

    /// True when every component differs by less than `epsilon`.
    pub fn fuzzy_eq(&self, other: impl Into<Vector3>, epsilon: f64) -> bool {
        let other = other.into();
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.z - other.z).abs() < epsilon
    }
}

pub(crate) fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        value
    }
}

impl Add for Vector3 {
    type Output = Vector3;

    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector3 {
    type Output = Vector3;

    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Vector3;

    fn mul(self, rhs: f64) -> Vector3 {
        Vector3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Mul<Vector3> for Vector3 {
    type Output = Vector3;

    fn mul(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }
}

impl Div<f64> for Vector3 {
    type Output = Vector3;

    fn div(self, rhs: f64) -> Vector3 {
        Vector3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Div<Vector3> for Vector3 {
    type Output = Vector3;

    fn div(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x / rhs.x, self.y / rhs.y, self.z / rhs.z)
    }
}

impl Neg for Vector3 {
    type Output = Vector3;

    fn neg(self) -> Vector3 {
        Vector3::new(-self.x, -self.y, -self.z)
    }
}

impl From<(f64, f64, f64)> for Vector3 {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Vector3::new(x, y, z)
    }
}

impl From<[f64; 3]> for Vector3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Vector3::new(x, y, z)
    }
}

impl From<&Vector3> for Vector3 {
    fn from(v: &Vector3) -> Self {
        *v
    }
}

impl From<CgVector3<f64>> for Vector3 {
    fn from(v: CgVector3<f64>) -> Self {
        Vector3::new(v.x, v.y, v.z)
    }
}

impl From<Point3<f64>> for Vector3 {
    fn from(p: Point3<f64>) -> Self {
        Vector3::new(p.x, p.y, p.z)
    }
}

impl From<Vector3> for CgVector3<f64> {
    fn from(v: Vector3) -> Self {
        CgVector3::new(v.x, v.y, v.z)
    }
}

impl From<Vector3> for [f64; 3] {
    fn from(v: Vector3) -> Self {
        v.to_array()
    }
}

impl TryFrom<&[f64]> for Vector3 {
    type Error = MathError;

    fn try_from(components: &[f64]) -> Result<Self, Self::Error> {
        Vector3::try_from_components(components)
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vector3({}, {}, {})", self.x, self.y, self.z)
    }
}
