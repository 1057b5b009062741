use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::error::ShapeMismatch;

use super::{check_shape, Shape, Value, ValueType, Vector};

/// A row-major matrix whose shape is fixed at construction.
#[derive(Clone, Deserialize, PartialEq, Serialize)]
#[serde(try_from = "RawMatrix")]
pub struct Matrix {
    values: Vec<Value>,
    rows: usize,
    columns: usize,
}

#[derive(Deserialize)]
struct RawMatrix {
    values: Vec<Value>,
    rows: usize,
    columns: usize,
}

impl TryFrom<RawMatrix> for Matrix {
    type Error = ShapeMismatch;

    fn try_from(raw: RawMatrix) -> Result<Self, Self::Error> {
        let len = raw.rows.checked_mul(raw.columns).unwrap_or(usize::MAX);
        check_shape("matrix values", (len, 1), (raw.values.len(), 1))?;

        Ok(Self {
            values: raw.values,
            rows: raw.rows,
            columns: raw.columns,
        })
    }
}

impl Matrix {
    pub fn zeros(rows: usize, columns: usize) -> Self {
        Self {
            values: vec![Value::ZERO; rows * columns],
            rows,
            columns,
        }
    }

    pub fn from_fn(rows: usize, columns: usize, mut f: impl FnMut(usize, usize) -> Value) -> Self {
        let mut values = Vec::with_capacity(rows * columns);
        for row in 0..rows {
            for column in 0..columns {
                values.push(f(row, column));
            }
        }

        Self {
            values,
            rows,
            columns,
        }
    }

    /// Builds a matrix from a list of rows, which must all have the same length.
    pub fn from_rows<R: AsRef<[Value]>>(rows: &[R]) -> Result<Self, ShapeMismatch> {
        let columns = rows.first().map_or(0, |row| row.as_ref().len());

        let mut values = Vec::with_capacity(rows.len() * columns);
        for row in rows {
            let row = row.as_ref();
            check_shape("matrix rows", (1, columns), (1, row.len()))?;
            values.extend_from_slice(row);
        }

        Ok(Self {
            values,
            rows: rows.len(),
            columns,
        })
    }

    /// The outer product `a · bᵀ`.
    pub fn outer(a: &Vector, b: &Vector) -> Self {
        Self::from_fn(a.len(), b.len(), |row, column| a[row] * b[column])
    }

    pub fn shape(&self) -> Shape {
        (self.rows, self.columns)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn get(&self, row: usize, column: usize) -> Value {
        self.row(row)[column]
    }

    pub fn row(&self, row: usize) -> &[Value] {
        &self.values[row * self.columns..(row + 1) * self.columns]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[Value]> {
        (0..self.rows).map(|row| self.row(row))
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.values.iter_mut()
    }

    pub fn transpose(&self) -> Self {
        Self::from_fn(self.columns, self.rows, |row, column| self.get(column, row))
    }

    /// Calculates `self · x`.
    pub fn mul_vector(&self, x: &Vector) -> Result<Vector, ShapeMismatch> {
        check_shape("matrix-vector product", (self.columns, 1), x.shape())?;

        Ok(self
            .iter_rows()
            .map(|row| row.iter().zip(x.iter()).map(|(w, x)| w * x).sum())
            .collect())
    }

    /// Calculates `selfᵀ · x` without building the transpose.
    pub fn transpose_mul_vector(&self, x: &Vector) -> Result<Vector, ShapeMismatch> {
        check_shape("transposed matrix-vector product", (self.rows, 1), x.shape())?;

        let mut result = Vector::zeros(self.columns);
        for (row, &x) in self.iter_rows().zip(x.iter()) {
            for (r, w) in result.iter_mut().zip(row) {
                *r += w * x;
            }
        }
        Ok(result)
    }

    pub fn add_assign_checked(&mut self, rhs: &Self) -> Result<(), ShapeMismatch> {
        self.zip_assign("matrix addition", rhs, |r, b| *r += b)
    }

    pub fn sub_assign_checked(&mut self, rhs: &Self) -> Result<(), ShapeMismatch> {
        self.zip_assign("matrix subtraction", rhs, |r, b| *r -= b)
    }

    fn zip_assign(
        &mut self,
        operation: &'static str,
        rhs: &Self,
        f: impl Fn(&mut Value, Value),
    ) -> Result<(), ShapeMismatch> {
        check_shape(operation, self.shape(), rhs.shape())?;
        for (r, &b) in self.values.iter_mut().zip(&rhs.values) {
            f(r, b);
        }
        Ok(())
    }
}

macro_rules! value_op_impl {
    ($op:ident, $op_method:ident, $op_assign:ident, $op_assign_method:ident) => {
        impl $op<Value> for Matrix {
            type Output = Matrix;

            fn $op_method(mut self, rhs: Value) -> Self::Output {
                self.$op_assign_method(rhs);
                self
            }
        }

        impl $op<Value> for &Matrix {
            type Output = Matrix;

            fn $op_method(self, rhs: Value) -> Self::Output {
                self.clone().$op_method(rhs)
            }
        }

        impl $op_assign<Value> for Matrix {
            fn $op_assign_method(&mut self, rhs: Value) {
                for r in self.values.iter_mut() {
                    (*r).$op_assign_method(rhs)
                }
            }
        }
    };
}

value_op_impl!(Add, add, AddAssign, add_assign);
value_op_impl!(Sub, sub, SubAssign, sub_assign);
value_op_impl!(Mul, mul, MulAssign, mul_assign);
value_op_impl!(Div, div, DivAssign, div_assign);

impl Neg for Matrix {
    type Output = Matrix;

    fn neg(self) -> Self::Output {
        self * -Value::ONE
    }
}

impl Neg for &Matrix {
    type Output = Matrix;

    fn neg(self) -> Self::Output {
        self * -Value::ONE
    }
}

impl<const R: usize, const C: usize> From<[[Value; C]; R]> for Matrix {
    fn from(values: [[Value; C]; R]) -> Self {
        Self {
            values: values.iter().flatten().copied().collect(),
            rows: R,
            columns: C,
        }
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows == 0 {
            return write!(f, "[]");
        }

        for row in 0..self.rows {
            write!(f, "{}", if row == 0 { "[" } else { " " })?;
            for column in 0..self.columns {
                self.get(row, column).fmt(f)?;
                if column < self.columns - 1 {
                    write!(f, " ")?;
                }
            }
            write!(f, "{}", if row < self.rows - 1 { "\n" } else { "]" })?;
        }
        Ok(())
    }
}
