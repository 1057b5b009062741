use std::fmt;
use std::ops::{
    Add, AddAssign, Deref, DerefMut, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign,
};

use serde::{Deserialize, Serialize};

use crate::error::ShapeMismatch;

use super::{check_shape, Shape, Value, ValueType};

/// A column vector whose length is fixed at construction.
#[derive(Clone, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Vector(Vec<Value>);

impl Vector {
    pub fn zeros(len: usize) -> Self {
        Self(vec![Value::ZERO; len])
    }

    pub fn shape(&self) -> Shape {
        (self.len(), 1)
    }

    pub fn dot(&self, b: &Self) -> Result<Value, ShapeMismatch> {
        check_shape("dot product", self.shape(), b.shape())?;
        Ok(self.iter().zip(b).map(|(a, b)| a * b).sum())
    }

    /// Elementwise product.
    pub fn hadamard(&self, b: &Self) -> Result<Self, ShapeMismatch> {
        let mut result = self.clone();
        result.zip_assign("hadamard product", b, |r, b| *r *= b)?;
        Ok(result)
    }

    pub fn checked_add(&self, b: &Self) -> Result<Self, ShapeMismatch> {
        let mut result = self.clone();
        result.add_assign_checked(b)?;
        Ok(result)
    }

    pub fn checked_sub(&self, b: &Self) -> Result<Self, ShapeMismatch> {
        let mut result = self.clone();
        result.sub_assign_checked(b)?;
        Ok(result)
    }

    pub fn add_assign_checked(&mut self, rhs: &Self) -> Result<(), ShapeMismatch> {
        self.zip_assign("vector addition", rhs, |r, b| *r += b)
    }

    pub fn sub_assign_checked(&mut self, rhs: &Self) -> Result<(), ShapeMismatch> {
        self.zip_assign("vector subtraction", rhs, |r, b| *r -= b)
    }

    pub fn map(&self, f: impl Fn(Value) -> Value) -> Self {
        self.iter().map(|&x| f(x)).collect()
    }

    pub fn norm_squared(&self) -> Value {
        self.iter().map(|x| x * x).sum()
    }

    fn zip_assign(
        &mut self,
        operation: &'static str,
        rhs: &Self,
        f: impl Fn(&mut Value, Value),
    ) -> Result<(), ShapeMismatch> {
        check_shape(operation, self.shape(), rhs.shape())?;
        for (r, &b) in self.iter_mut().zip(rhs) {
            f(r, b);
        }
        Ok(())
    }
}

macro_rules! value_op_impl {
    ($op:ident, $op_method:ident, $op_assign:ident, $op_assign_method:ident) => {
        impl $op<Value> for Vector {
            type Output = Vector;

            fn $op_method(mut self, rhs: Value) -> Self::Output {
                self.$op_assign_method(rhs);
                self
            }
        }

        impl $op<Value> for &Vector {
            type Output = Vector;

            fn $op_method(self, rhs: Value) -> Self::Output {
                self.clone().$op_method(rhs)
            }
        }

        impl $op_assign<Value> for Vector {
            fn $op_assign_method(&mut self, rhs: Value) {
                for r in self.iter_mut() {
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

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Self::Output {
        self * -Value::ONE
    }
}

impl Neg for &Vector {
    type Output = Vector;

    fn neg(self) -> Self::Output {
        self * -Value::ONE
    }
}

impl Deref for Vector {
    type Target = [Value];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Vector {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<Value>> for Vector {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl<const N: usize> From<[Value; N]> for Vector {
    fn from(values: [Value; N]) -> Self {
        Self(values.to_vec())
    }
}

impl FromIterator<Value> for Vector {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Vector {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &'a mut Vector {
    type Item = &'a mut Value;
    type IntoIter = std::slice::IterMut<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl fmt::Debug for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (x, value) in self.iter().enumerate() {
            value.fmt(f)?;
            if x < self.len() - 1 {
                write!(f, " ")?;
            }
        }
        write!(f, "]")
    }
}
