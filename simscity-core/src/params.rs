//! Parameters that may be given either as a single value or one value per item.
//!
//! Broadcasting follows numpy rules: a scalar fills the target shape, an array
//! is stretched along its length-1 axes (and prepended axes) or rejected.

use ndarray::{Array1, ArrayD, Ix1, IxDyn};
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SimscityError};

#[derive(Debug, Clone, PartialEq)]
pub enum ScalarOrArray<T> {
    Scalar(T),
    Array(ArrayD<T>),
}

impl<T: Clone> ScalarOrArray<T> {
    ///
    /// Broadcast to an owned array of the given shape.
    ///
    /// # Arguments
    /// - shape: target shape
    pub fn broadcast_to(&self, shape: &[usize]) -> Result<ArrayD<T>> {
        match self {
            ScalarOrArray::Scalar(value) => Ok(ArrayD::from_elem(IxDyn(shape), value.clone())),
            ScalarOrArray::Array(values) => values
                .broadcast(IxDyn(shape))
                .map(|view| view.to_owned())
                .ok_or_else(|| SimscityError::Broadcast {
                    from: values.shape().to_vec(),
                    to: shape.to_vec(),
                }),
        }
    }

    /// Broadcast to one value per item.
    pub fn broadcast_1d(&self, len: usize) -> Result<Array1<T>> {
        Ok(self.broadcast_to(&[len])?.into_dimensionality::<Ix1>()?)
    }

    /// True when every value satisfies `predicate`.
    pub fn all(&self, predicate: impl Fn(&T) -> bool) -> bool {
        match self {
            ScalarOrArray::Scalar(value) => predicate(value),
            ScalarOrArray::Array(values) => values.iter().all(predicate),
        }
    }
}

macro_rules! impl_from_scalar {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ScalarOrArray<$t> {
                fn from(value: $t) -> Self {
                    ScalarOrArray::Scalar(value)
                }
            }
        )*
    };
}

impl_from_scalar!(f64, u64, usize);

impl<T> From<Vec<T>> for ScalarOrArray<T> {
    fn from(values: Vec<T>) -> Self {
        ScalarOrArray::Array(Array1::from(values).into_dyn())
    }
}

impl<T> From<Array1<T>> for ScalarOrArray<T> {
    fn from(values: Array1<T>) -> Self {
        ScalarOrArray::Array(values.into_dyn())
    }
}

impl<T> From<ArrayD<T>> for ScalarOrArray<T> {
    fn from(values: ArrayD<T>) -> Self {
        ScalarOrArray::Array(values)
    }
}

// config files only ever hold scalars or flat lists
impl<T: Serialize + Clone> Serialize for ScalarOrArray<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ScalarOrArray::Scalar(value) => value.serialize(serializer),
            ScalarOrArray::Array(values) => values
                .iter()
                .cloned()
                .collect::<Vec<T>>()
                .serialize(serializer),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ScalarOrArray<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr<T> {
            Scalar(T),
            List(Vec<T>),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Scalar(value) => ScalarOrArray::Scalar(value),
            Repr::List(values) => ScalarOrArray::from(values),
        })
    }
}
