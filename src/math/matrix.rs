//! # Dense Matrix
//!
//! General `rows x columns` matrix backed by a flat row-major buffer. Values
//! are never mutated after construction, so every derived value (transpose,
//! rounding, determinant, adjoint, inverse, trace, text form) is computed on
//! first access and memoized. Getters hand back references into those caches,
//! which makes them referentially stable for the matrix's lifetime.
//!
//! ## Scaling
//!
//! Determinants of matrices larger than 2x2 use Laplace expansion along the
//! first row. The cost grows factorially with the size, which is fine for the
//! 3x3 and 4x4 transforms this crate works with and nothing much larger.
//!
//! ## Conventions
//!
//! The 4x4 builders (`translate`, `rotate`, `look_at`, `perspective`) treat
//! vectors as columns: translation lives in column 3 and transforms compose
//! as `self * other`. This matches `cgmath`.

use std::cell::OnceCell;
use std::fmt;
use std::ops::Index;

use cgmath::Matrix4;
use log::trace;
use rand::Rng;

use super::vector3::Vector3;
use crate::error::{MathError, MathResult};

pub struct Matrix {
    rows: usize,
    columns: usize,
    data: Vec<f64>,
    transpose: OnceCell<Box<Matrix>>,
    round: OnceCell<Box<Matrix>>,
    floor: OnceCell<Box<Matrix>>,
    ceil: OnceCell<Box<Matrix>>,
    determinant: OnceCell<f64>,
    adjoint: OnceCell<Box<Matrix>>,
    inverse: OnceCell<Box<Matrix>>,
    trace: OnceCell<f64>,
    text: OnceCell<String>,
}

impl Matrix {
    /// Default tolerance used by [`Matrix::approx_eq`].
    pub const DEFAULT_TOLERANCE: f64 = 1e-10;

    /// Wraps an already validated buffer.
    fn from_parts(rows: usize, columns: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(rows * columns, data.len());
        Self {
            rows,
            columns,
            data,
            transpose: OnceCell::new(),
            round: OnceCell::new(),
            floor: OnceCell::new(),
            ceil: OnceCell::new(),
            determinant: OnceCell::new(),
            adjoint: OnceCell::new(),
            inverse: OnceCell::new(),
            trace: OnceCell::new(),
            text: OnceCell::new(),
        }
    }

    fn check_dimensions(rows: usize, columns: usize) -> MathResult<()> {
        if rows == 0 || columns == 0 {
            return Err(MathError::InvalidDimensions { rows, columns });
        }
        Ok(())
    }

    /// Zero-filled matrix with the given shape.
    pub fn new(rows: usize, columns: usize) -> MathResult<Self> {
        Self::zeros(rows, columns)
    }

    pub fn zeros(rows: usize, columns: usize) -> MathResult<Self> {
        Self::check_dimensions(rows, columns)?;
        Ok(Self::from_parts(rows, columns, vec![0.0; rows * columns]))
    }

    pub fn identity(size: usize) -> MathResult<Self> {
        Self::check_dimensions(size, size)?;
        let mut data = vec![0.0; size * size];
        for i in 0..size {
            data[i * size + i] = 1.0;
        }
        Ok(Self::from_parts(size, size, data))
    }

    /// Matrix with entries drawn uniformly from `min..=max`. Both bounds
    /// must be finite; their order does not matter.
    pub fn random(rows: usize, columns: usize, min: f64, max: f64) -> MathResult<Self> {
        Self::check_dimensions(rows, columns)?;
        if !(min.is_finite() && max.is_finite()) {
            return Err(MathError::InvalidRange { min, max });
        }
        let (low, high) = if min <= max { (min, max) } else { (max, min) };
        let mut rng = rand::rng();
        let data = (0..rows * columns)
            .map(|_| rng.random_range(low..=high))
            .collect();
        Ok(Self::from_parts(rows, columns, data))
    }

    /// Builds a matrix from a flat row-major buffer.
    ///
    /// # Arguments
    /// * `buffer` - Entries in row-major order
    /// * `columns` - Number of columns; must divide `buffer.len()`
    pub fn from_buffer(buffer: &[f64], columns: usize) -> MathResult<Self> {
        if columns == 0 || buffer.is_empty() {
            return Err(MathError::InvalidDimensions {
                rows: if columns == 0 { 0 } else { buffer.len() / columns },
                columns,
            });
        }
        if buffer.len() % columns != 0 {
            return Err(MathError::BufferNotDivisible {
                len: buffer.len(),
                columns,
            });
        }
        Ok(Self::from_parts(
            buffer.len() / columns,
            columns,
            buffer.to_vec(),
        ))
    }

    /// Builds a matrix from a rectangular sequence of rows.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> MathResult<Self> {
        let columns = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        Self::check_dimensions(rows.len(), columns)?;

        let mut data = Vec::with_capacity(rows.len() * columns);
        for (index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != columns {
                return Err(MathError::RaggedRows {
                    row: index,
                    expected: columns,
                    found: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self::from_parts(rows.len(), columns, data))
    }

    /// Alias of [`Matrix::from_rows`].
    pub fn from_array<R: AsRef<[f64]>>(rows: &[R]) -> MathResult<Self> {
        Self::from_rows(rows)
    }

    /// Parses delimiter-separated text, one row per non-empty line.
    pub fn from_csv(text: &str, delimiter: char) -> MathResult<Self> {
        let mut rows = Vec::new();
        for (line_number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let row = line
                .split(delimiter)
                .map(|cell| {
                    let cell = cell.trim();
                    cell.parse::<f64>().map_err(|e| {
                        MathError::Parse(format!("line {}: '{}': {}", line_number + 1, cell, e))
                    })
                })
                .collect::<MathResult<Vec<f64>>>()?;
            rows.push(row);
        }
        Self::from_rows(&rows)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.columns)
    }

    fn shape_text(&self) -> String {
        format!("{}x{}", self.rows, self.columns)
    }

    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        if row < self.rows && column < self.columns {
            Some(self.data[row * self.columns + column])
        } else {
            None
        }
    }

    /// Row-major view of the entries.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Nested rows.
    pub fn plain(&self) -> Vec<Vec<f64>> {
        self.data.chunks(self.columns).map(|r| r.to_vec()).collect()
    }

    /// Row-major `f32` copy for GPU upload.
    pub fn to_f32_buffer(&self) -> Vec<f32> {
        self.data.iter().map(|&v| v as f32).collect()
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.columns
    }

    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|&v| v == 0.0)
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Matrix {
        Self::from_parts(self.rows, self.columns, self.data.iter().map(|&v| f(v)).collect())
    }

    /// Same shape, every entry set to `value`.
    pub fn fill(&self, value: f64) -> Matrix {
        self.map(|_| value)
    }

    fn zip_with(
        &self,
        other: &Matrix,
        op: &'static str,
        f: impl Fn(f64, f64) -> f64,
    ) -> MathResult<Matrix> {
        if self.shape() != other.shape() {
            return Err(self.mismatch(op, other));
        }
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(&a, &b)| f(a, b))
            .collect();
        Ok(Self::from_parts(self.rows, self.columns, data))
    }

    fn mismatch(&self, op: &'static str, other: &Matrix) -> MathError {
        MathError::DimensionMismatch {
            op,
            left: self.shape_text(),
            right: other.shape_text(),
        }
    }

    pub fn add(&self, other: &Matrix) -> MathResult<Matrix> {
        self.zip_with(other, "addition", |a, b| a + b)
    }

    pub fn subtract(&self, other: &Matrix) -> MathResult<Matrix> {
        self.zip_with(other, "subtraction", |a, b| a - b)
    }

    /// Entry-wise product.
    pub fn hadamard(&self, other: &Matrix) -> MathResult<Matrix> {
        self.zip_with(other, "hadamard product", |a, b| a * b)
    }

    /// Entry-wise linear blend toward `goal`.
    pub fn interpolate(&self, goal: &Matrix, alpha: f64) -> MathResult<Matrix> {
        self.zip_with(goal, "interpolation", |a, b| a + (b - a) * alpha)
    }

    /// Scalar broadcast.
    pub fn scale(&self, factor: f64) -> Matrix {
        self.map(|v| v * factor)
    }

    /// Matrix product `self * other`.
    pub fn multiply(&self, other: &Matrix) -> MathResult<Matrix> {
        if self.columns != other.rows {
            return Err(self.mismatch("multiplication", other));
        }
        let mut data = vec![0.0; self.rows * other.columns];
        for row in 0..self.rows {
            for column in 0..other.columns {
                data[row * other.columns + column] = (0..self.columns)
                    .map(|k| self.data[row * self.columns + k] * other.data[k * other.columns + column])
                    .sum();
            }
        }
        Ok(Self::from_parts(self.rows, other.columns, data))
    }

    pub fn transpose(&self) -> &Matrix {
        self.transpose.get_or_init(|| {
            let mut data = Vec::with_capacity(self.data.len());
            for column in 0..self.columns {
                for row in 0..self.rows {
                    data.push(self.data[row * self.columns + column]);
                }
            }
            Box::new(Self::from_parts(self.columns, self.rows, data))
        })
    }

    pub fn round(&self) -> &Matrix {
        self.round.get_or_init(|| Box::new(self.map(f64::round)))
    }

    pub fn floor(&self) -> &Matrix {
        self.floor.get_or_init(|| Box::new(self.map(f64::floor)))
    }

    pub fn ceil(&self) -> &Matrix {
        self.ceil.get_or_init(|| Box::new(self.map(f64::ceil)))
    }

    fn require_square(&self, op: &'static str) -> MathResult<()> {
        if self.is_square() {
            Ok(())
        } else {
            Err(MathError::NotSquare { op })
        }
    }

    /// Matrix with `skip_row` and `skip_column` removed. Callers guarantee
    /// the result is at least 1x1.
    fn minor(&self, skip_row: usize, skip_column: usize) -> Matrix {
        let mut data = Vec::with_capacity((self.rows - 1) * (self.columns - 1));
        for row in (0..self.rows).filter(|&r| r != skip_row) {
            for column in (0..self.columns).filter(|&c| c != skip_column) {
                data.push(self.data[row * self.columns + column]);
            }
        }
        Self::from_parts(self.rows - 1, self.columns - 1, data)
    }

    fn cofactor(&self, row: usize, column: usize) -> f64 {
        let sign = if (row + column) % 2 == 0 { 1.0 } else { -1.0 };
        sign * self.minor(row, column).compute_determinant()
    }

    fn compute_determinant(&self) -> f64 {
        let d = &self.data;
        match self.rows {
            1 => d[0],
            2 => d[0] * d[3] - d[1] * d[2],
            _ => (0..self.columns)
                .map(|column| d[column] * self.cofactor(0, column))
                .sum(),
        }
    }

    pub fn determinant(&self) -> MathResult<f64> {
        self.require_square("determinant")?;
        Ok(*self.determinant.get_or_init(|| {
            trace!("computing {} determinant", self.shape_text());
            self.compute_determinant()
        }))
    }

    /// Transposed cofactor matrix.
    pub fn adjoint(&self) -> MathResult<&Matrix> {
        self.require_square("adjoint")?;
        Ok(self.adjoint.get_or_init(|| {
            let n = self.rows;
            if n == 1 {
                return Box::new(Self::from_parts(1, 1, vec![1.0]));
            }
            let mut data = vec![0.0; n * n];
            for row in 0..n {
                for column in 0..n {
                    data[column * n + row] = self.cofactor(row, column);
                }
            }
            Box::new(Self::from_parts(n, n, data))
        }))
    }

    pub fn inverse(&self) -> MathResult<&Matrix> {
        self.require_square("inverse")?;
        if let Some(inverse) = self.inverse.get() {
            return Ok(inverse);
        }
        let determinant = self.determinant()?;
        if determinant == 0.0 {
            return Err(MathError::Singular);
        }
        let inverse = self.adjoint()?.scale(1.0 / determinant);
        Ok(self.inverse.get_or_init(|| Box::new(inverse)))
    }

    pub fn trace(&self) -> MathResult<f64> {
        self.require_square("trace")?;
        Ok(*self
            .trace
            .get_or_init(|| (0..self.rows).map(|i| self.data[i * self.columns + i]).sum()))
    }

    /// Row-per-line text form, cached.
    pub fn as_text(&self) -> &str {
        self.text.get_or_init(|| {
            self.data
                .chunks(self.columns)
                .map(|row| {
                    let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
                    format!("[{}]", cells.join(", "))
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
    }

    pub fn equals(&self, other: &Matrix, tolerance: f64) -> bool {
        self.shape() == other.shape()
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| (a - b).abs() <= tolerance)
    }

    /// [`Matrix::equals`] with [`Matrix::DEFAULT_TOLERANCE`].
    pub fn approx_eq(&self, other: &Matrix) -> bool {
        self.equals(other, Self::DEFAULT_TOLERANCE)
    }

    fn require_four_by_four(&self, op: &'static str) -> MathResult<()> {
        if self.shape() == (4, 4) {
            Ok(())
        } else {
            Err(MathError::NotFourByFour { op })
        }
    }

    /// `self * T(offset)`.
    pub fn translate(&self, offset: impl Into<Vector3>) -> MathResult<Matrix> {
        self.require_four_by_four("translate")?;
        let offset = offset.into();
        #[rustfmt::skip]
        let translation = Self::from_parts(4, 4, vec![
            1.0, 0.0, 0.0, offset.x(),
            0.0, 1.0, 0.0, offset.y(),
            0.0, 0.0, 1.0, offset.z(),
            0.0, 0.0, 0.0, 1.0,
        ]);
        self.multiply(&translation)
    }

    /// `self * R(axis, angle)` using Rodrigues' formula. `angle` is in radians.
    pub fn rotate(&self, axis: impl Into<Vector3>, angle: f64) -> MathResult<Matrix> {
        self.require_four_by_four("rotate")?;
        let axis = axis.into().unit();
        let (x, y, z) = (axis.x(), axis.y(), axis.z());
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        #[rustfmt::skip]
        let rotation = Self::from_parts(4, 4, vec![
            t * x * x + c,     t * x * y - s * z, t * x * z + s * y, 0.0,
            t * x * y + s * z, t * y * y + c,     t * y * z - s * x, 0.0,
            t * x * z - s * y, t * y * z + s * x, t * z * z + c,     0.0,
            0.0,               0.0,               0.0,               1.0,
        ]);
        self.multiply(&rotation)
    }

    /// Right-handed view matrix looking from `eye` toward `target`.
    pub fn look_at(
        eye: impl Into<Vector3>,
        target: impl Into<Vector3>,
        up: impl Into<Vector3>,
    ) -> Matrix {
        let eye = eye.into();
        Self::look_to(eye, target.into() - eye, up)
    }

    /// Right-handed view matrix looking from `eye` along `direction`.
    pub fn look_to(
        eye: impl Into<Vector3>,
        direction: impl Into<Vector3>,
        up: impl Into<Vector3>,
    ) -> Matrix {
        let eye = eye.into();
        let f = direction.into().unit();
        let s = f.cross(up.into()).unit();
        let u = s.cross(f);
        #[rustfmt::skip]
        let data = vec![
            s.x(),  s.y(),  s.z(),  -s.dot(eye),
            u.x(),  u.y(),  u.z(),  -u.dot(eye),
            -f.x(), -f.y(), -f.z(), f.dot(eye),
            0.0,    0.0,    0.0,    1.0,
        ];
        Self::from_parts(4, 4, data)
    }

    /// OpenGL-style perspective projection. `fov_y` is in radians.
    pub fn perspective(fov_y: f64, aspect: f64, near: f64, far: f64) -> Matrix {
        let f = 1.0 / (fov_y / 2.0).tan();
        #[rustfmt::skip]
        let data = vec![
            f / aspect, 0.0, 0.0,                         0.0,
            0.0,        f,   0.0,                         0.0,
            0.0,        0.0, (far + near) / (near - far), 2.0 * far * near / (near - far),
            0.0,        0.0, -1.0,                        0.0,
        ];
        Self::from_parts(4, 4, data)
    }
}

impl Clone for Matrix {
    fn clone(&self) -> Self {
        Self::from_parts(self.rows, self.columns, self.data.clone())
    }
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.data == other.data
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matrix")
            .field("rows", &self.rows)
            .field("columns", &self.columns)
            .field("data", &self.data)
            .finish()
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_text())
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, column): (usize, usize)) -> &f64 {
        assert!(row < self.rows && column < self.columns, "matrix index out of bounds");
        &self.data[row * self.columns + column]
    }
}

impl From<Matrix4<f64>> for Matrix {
    fn from(m: Matrix4<f64>) -> Self {
        let mut data = Vec::with_capacity(16);
        for row in 0..4 {
            for column in 0..4 {
                data.push(m[column][row]);
            }
        }
        Matrix::from_parts(4, 4, data)
    }
}

impl TryFrom<&Matrix> for Matrix4<f64> {
    type Error = MathError;

    fn try_from(m: &Matrix) -> Result<Self, Self::Error> {
        m.require_four_by_four("conversion to Matrix4")?;
        let mut columns = [[0.0; 4]; 4];
        for (column, values) in columns.iter_mut().enumerate() {
            for (row, value) in values.iter_mut().enumerate() {
                *value = m.data[row * 4 + column];
            }
        }
        Ok(Matrix4::from(columns))
    }
}
