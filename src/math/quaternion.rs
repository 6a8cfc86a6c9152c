//! Unit quaternion helpers backing [`super::CFrame`] construction and SLERP.
//!
//! Rotation matrices are passed around as nine row-major entries
//! `R00, R01, R02, R10, ..., R22`, the same layout the frame type stores.

use log::warn;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub fn magnitude(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn dot(&self, other: &Quaternion) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Zero quaternions normalize to the identity.
    pub fn normalize(&self) -> Self {
        let magnitude = self.magnitude();
        if magnitude == 0.0 {
            warn!("normalizing a zero quaternion, using identity");
            return Self::IDENTITY;
        }
        self.scale(1.0 / magnitude)
    }

    fn scale(&self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s, self.w * s)
    }

    fn neg(&self) -> Self {
        self.scale(-1.0)
    }

    /// Shepperd's method: pick the numerically largest of w, x, y, z first.
    pub fn from_rotation(r: &[f64; 9]) -> Self {
        let trace = r[0] + r[4] + r[8];
        let q = if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0;
            Self::new((r[7] - r[5]) / s, (r[2] - r[6]) / s, (r[3] - r[1]) / s, 0.25 * s)
        } else if r[0] > r[4] && r[0] > r[8] {
            let s = (1.0 + r[0] - r[4] - r[8]).sqrt() * 2.0;
            Self::new(0.25 * s, (r[1] + r[3]) / s, (r[2] + r[6]) / s, (r[7] - r[5]) / s)
        } else if r[4] > r[8] {
            let s = (1.0 + r[4] - r[0] - r[8]).sqrt() * 2.0;
            Self::new((r[1] + r[3]) / s, 0.25 * s, (r[5] + r[7]) / s, (r[2] - r[6]) / s)
        } else {
            let s = (1.0 + r[8] - r[0] - r[4]).sqrt() * 2.0;
            Self::new((r[2] + r[6]) / s, (r[5] + r[7]) / s, 0.25 * s, (r[3] - r[1]) / s)
        };
        q.normalize()
    }

    /// Rotation matrix of the normalized quaternion.
    pub fn to_rotation(&self) -> [f64; 9] {
        let Quaternion { x, y, z, w } = self.normalize();
        [
            1.0 - 2.0 * (y * y + z * z),
            2.0 * (x * y - z * w),
            2.0 * (x * z + y * w),
            2.0 * (x * y + z * w),
            1.0 - 2.0 * (x * x + z * z),
            2.0 * (y * z - x * w),
            2.0 * (x * z - y * w),
            2.0 * (y * z + x * w),
            1.0 - 2.0 * (x * x + y * y),
        ]
    }

    /// Shortest-path spherical interpolation.
    pub fn slerp(&self, goal: &Quaternion, alpha: f64, linear_threshold: f64) -> Self {
        let from = self.normalize();
        let mut to = goal.normalize();
        let mut cos_theta = from.dot(&to);
        if cos_theta < 0.0 {
            to = to.neg();
            cos_theta = -cos_theta;
        }

        if cos_theta > linear_threshold {
            return Self::new(
                from.x + (to.x - from.x) * alpha,
                from.y + (to.y - from.y) * alpha,
                from.z + (to.z - from.z) * alpha,
                from.w + (to.w - from.w) * alpha,
            )
            .normalize();
        }

        let theta = cos_theta.clamp(-1.0, 1.0).acos();
        let sin_theta = theta.sin();
        let a = ((1.0 - alpha) * theta).sin() / sin_theta;
        let b = (alpha * theta).sin() / sin_theta;
        Self::new(
            from.x * a + to.x * b,
            from.y * a + to.y * b,
            from.z * a + to.z * b,
            from.w * a + to.w * b,
        )
    }
}

#[cfg(test)]
impl From<cgmath::Quaternion<f64>> for Quaternion {
    fn from(q: cgmath::Quaternion<f64>) -> Self {
        Quaternion::new(q.v.x, q.v.y, q.v.z, q.s)
    }
}
