//! Enumerations shared by the math types.

use crate::error::MathError;

/// Order in which the three elemental rotations are composed.
///
/// `XYZ` means `Rx * Ry * Rz`: applied to a column vector, the Z rotation
/// happens first and the X rotation last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RotationOrder {
    #[default]
    XYZ,
    XZY,
    YZX,
    YXZ,
    ZXY,
    ZYX,
}

impl RotationOrder {
    pub const ALL: [RotationOrder; 6] = [
        RotationOrder::XYZ,
        RotationOrder::XZY,
        RotationOrder::YZX,
        RotationOrder::YXZ,
        RotationOrder::ZXY,
        RotationOrder::ZYX,
    ];

    /// Axis indices (0 = X, 1 = Y, 2 = Z) in composition order.
    pub(crate) fn axes(self) -> [usize; 3] {
        match self {
            RotationOrder::XYZ => [0, 1, 2],
            RotationOrder::XZY => [0, 2, 1],
            RotationOrder::YZX => [1, 2, 0],
            RotationOrder::YXZ => [1, 0, 2],
            RotationOrder::ZXY => [2, 0, 1],
            RotationOrder::ZYX => [2, 1, 0],
        }
    }
}

impl TryFrom<u8> for RotationOrder {
    type Error = MathError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        RotationOrder::ALL
            .get(value as usize)
            .copied()
            .ok_or(MathError::InvalidRotationOrder(value))
    }
}

/// Faces of an axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormalId {
    Right,
    Top,
    Back,
    Left,
    Bottom,
    Front,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}
