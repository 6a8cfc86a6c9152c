use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use cgmath::Vector2 as CgVector2;

use super::vector3::sign;
use crate::error::MathError;

/// Immutable 2D vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2 {
    x: f64,
    y: f64,
}

/// Right-hand side of `multiply`/`divide` for [`Vector2`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand2 {
    Scalar(f64),
    Vector(Vector2),
}

impl From<f64> for Operand2 {
    fn from(value: f64) -> Self {
        Operand2::Scalar(value)
    }
}

impl From<Vector2> for Operand2 {
    fn from(value: Vector2) -> Self {
        Operand2::Vector(value)
    }
}

impl From<(f64, f64)> for Operand2 {
    fn from(value: (f64, f64)) -> Self {
        Operand2::Vector(value.into())
    }
}

impl From<[f64; 2]> for Operand2 {
    fn from(value: [f64; 2]) -> Self {
        Operand2::Vector(value.into())
    }
}

impl Vector2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub const fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    pub const fn one() -> Self {
        Self::new(1.0, 1.0)
    }

    pub const fn x_axis() -> Self {
        Self::new(1.0, 0.0)
    }

    pub const fn y_axis() -> Self {
        Self::new(0.0, 1.0)
    }

    /// See [`super::Vector3::try_from_components`].
    pub fn try_from_components(components: &[f64]) -> Result<Self, MathError> {
        if components.is_empty() {
            return Err(MathError::NotVectorLike);
        }
        let at = |i: usize| components.get(i).copied().unwrap_or(0.0);
        Ok(Self::new(at(0), at(1)))
    }

    pub const fn x(&self) -> f64 {
        self.x
    }

    pub const fn y(&self) -> f64 {
        self.y
    }

    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn unit(&self) -> Self {
        let magnitude = self.magnitude();
        if magnitude == 0.0 {
            Self::zero()
        } else {
            *self * (1.0 / magnitude)
        }
    }

    pub fn abs(&self) -> Self {
        Self::new(self.x.abs(), self.y.abs())
    }

    pub fn ceil(&self) -> Self {
        Self::new(self.x.ceil(), self.y.ceil())
    }

    pub fn floor(&self) -> Self {
        Self::new(self.x.floor(), self.y.floor())
    }

    pub fn sign(&self) -> Self {
        Self::new(sign(self.x), sign(self.y))
    }

    pub const fn to_array(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    pub fn to_f32_array(&self) -> [f32; 2] {
        [self.x as f32, self.y as f32]
    }

    pub fn add(&self, other: impl Into<Vector2>) -> Self {
        *self + other.into()
    }

    pub fn subtract(&self, other: impl Into<Vector2>) -> Self {
        *self - other.into()
    }

    pub fn multiply(&self, other: impl Into<Operand2>) -> Self {
        match other.into() {
            Operand2::Scalar(s) => *self * s,
            Operand2::Vector(v) => *self * v,
        }
    }

    pub fn divide(&self, other: impl Into<Operand2>) -> Self {
        match other.into() {
            Operand2::Scalar(s) => *self / s,
            Operand2::Vector(v) => *self / v,
        }
    }

    pub fn dot(&self, other: impl Into<Vector2>) -> f64 {
        let other = other.into();
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product of `(x, y, 0)` and `(ox, oy, 0)`.
    pub fn cross(&self, other: impl Into<Vector2>) -> f64 {
        let other = other.into();
        self.x * other.y - self.y * other.x
    }

    pub fn lerp(&self, goal: impl Into<Vector2>, alpha: f64) -> Self {
        let goal = goal.into();
        Self::new(
            self.x + (goal.x - self.x) * alpha,
            self.y + (goal.y - self.y) * alpha,
        )
    }

    /// Angle in radians; when `signed`, counter-clockwise from `self` is
    /// positive.
    pub fn angle(&self, other: impl Into<Vector2>, signed: bool) -> f64 {
        let other = other.into();
        let denominator = self.magnitude() * other.magnitude();
        if denominator == 0.0 {
            return 0.0;
        }
        let angle = (self.dot(other) / denominator).clamp(-1.0, 1.0).acos();
        if signed && self.cross(other) < 0.0 {
            -angle
        } else {
            angle
        }
    }

    pub fn max(&self, others: &[Vector2]) -> Result<Self, MathError> {
        if others.is_empty() {
            return Err(MathError::EmptyArguments);
        }
        Ok(others
            .iter()
            .fold(*self, |acc, v| Self::new(acc.x.max(v.x), acc.y.max(v.y))))
    }

    pub fn min(&self, others: &[Vector2]) -> Result<Self, MathError> {
        if others.is_empty() {
            return Err(MathError::EmptyArguments);
        }
        Ok(others
            .iter()
            .fold(*self, |acc, v| Self::new(acc.x.min(v.x), acc.y.min(v.y))))
    }

    pub fn fuzzy_eq(&self, other: impl Into<Vector2>, epsilon: f64) -> bool {
        let other = other.into();
        (self.x - other.x).abs() < epsilon && (self.y - other.y).abs() < epsilon
    }
}

impl Add for Vector2 {
    type Output = Vector2;

    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Vector2;

    fn mul(self, rhs: f64) -> Vector2 {
        Vector2::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<Vector2> for Vector2 {
    type Output = Vector2;

    fn mul(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x * rhs.x, self.y * rhs.y)
    }
}

impl Div<f64> for Vector2 {
    type Output = Vector2;

    fn div(self, rhs: f64) -> Vector2 {
        Vector2::new(self.x / rhs, self.y / rhs)
    }
}

impl Div<Vector2> for Vector2 {
    type Output = Vector2;

    fn div(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x / rhs.x, self.y / rhs.y)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;

    fn neg(self) -> Vector2 {
        Vector2::new(-self.x, -self.y)
    }
}

impl From<(f64, f64)> for Vector2 {
    fn from((x, y): (f64, f64)) -> Self {
        Vector2::new(x, y)
    }
}

impl From<[f64; 2]> for Vector2 {
    fn from([x, y]: [f64; 2]) -> Self {
        Vector2::new(x, y)
    }
}

impl From<CgVector2<f64>> for Vector2 {
    fn from(v: CgVector2<f64>) -> Self {
        Vector2::new(v.x, v.y)
    }
}

impl From<Vector2> for CgVector2<f64> {
    fn from(v: Vector2) -> Self {
        CgVector2::new(v.x, v.y)
    }
}

impl TryFrom<&[f64]> for Vector2 {
    type Error = MathError;

    fn try_from(components: &[f64]) -> Result<Self, Self::Error> {
        Vector2::try_from_components(components)
    }
}

impl fmt::Display for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vector2({}, {})", self.x, self.y)
    }
}
