//! # Error Types
//!
//! Every fallible operation in the crate reports one of the enums below. The
//! variants name the precondition that was violated so the caller can tell a
//! shape problem from a degenerate input without parsing strings.

use thiserror::Error;

/// Errors raised by the value types in [`crate::math`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MathError {
    /// A vector coercion found no recognizable component.
    #[error("argument is not vector-like: expected at least one component")]
    NotVectorLike,

    #[error("matrix dimensions must be positive, got {rows}x{columns}")]
    InvalidDimensions { rows: usize, columns: usize },

    #[error("all rows must have the same length: row {row} has {found} entries, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("buffer length {len} is not divisible by the column count {columns}")]
    BufferNotDivisible { len: usize, columns: usize },

    /// Shapes are rendered as `RxC`.
    #[error("matrix dimensions do not match for {op}: {left} vs {right}")]
    DimensionMismatch {
        op: &'static str,
        left: String,
        right: String,
    },

    #[error("{op} is only defined for square matrices")]
    NotSquare { op: &'static str },

    #[error("matrix is singular and cannot be inverted")]
    Singular,

    #[error("{op} is only defined for 4x4 matrices")]
    NotFourByFour { op: &'static str },

    #[error("{0} is not a valid rotation order")]
    InvalidRotationOrder(u8),

    #[error("invalid argument count: expected {expected}, found {found}")]
    InvalidArity { expected: &'static str, found: usize },

    #[error("at least one argument is required")]
    EmptyArguments,

    #[error("failed to parse matrix: {0}")]
    Parse(String),

    #[error("sampling range bounds must be finite, got {min}..={max}")]
    InvalidRange { min: f64, max: f64 },

    #[error("field of view must be at least 0.01 radians, got {0}")]
    InvalidFov(f64),
}

/// Errors raised by [`crate::signal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignalError {
    #[error("signal has been destroyed")]
    Destroyed,
}

/// Errors raised by the instance hierarchy in [`crate::scene`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstanceError {
    #[error("instance '{name}' is destroyed")]
    Destroyed { name: String },

    #[error("cannot set the parent of '{name}' to itself")]
    ParentToSelf { name: String },

    #[error("cannot parent '{name}' to its own descendant '{parent}'")]
    CyclicParent { name: String, parent: String },

    #[error(transparent)]
    Signal(#[from] SignalError),
}

pub type MathResult<T> = Result<T, MathError>;
pub type InstanceResult<T> = Result<T, InstanceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_names_both_shapes() {
        let err = MathError::DimensionMismatch {
            op: "multiplication",
            left: "2x3".into(),
            right: "2x3".into(),
        };
        assert_eq!(
            err.to_string(),
            "matrix dimensions do not match for multiplication: 2x3 vs 2x3"
        );
    }

    #[test]
    fn test_signal_error_converts_into_instance_error() {
        let err: InstanceError = SignalError::Destroyed.into();
        assert_eq!(err.to_string(), "signal has been destroyed");
    }
}
