//! Dynamically typed n-dimensional arrays.
//!
//! Environments from different backends report observations with whatever
//! element type is natural to them. [`Array`] keeps the element type as a
//! runtime [`DType`] so the driver can batch, slice and normalise values
//! without knowing the schema ahead of time.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArrayError {
    #[error("data length {len} does not match shape {shape:?}")]
    ShapeMismatch { shape: Vec<usize>, len: usize },
    #[error("cannot stack an empty list of arrays")]
    EmptyStack,
    #[error("cannot stack arrays of shape {expected:?} and {got:?}")]
    StackShape { expected: Vec<usize>, got: Vec<usize> },
    #[error("cannot stack arrays of dtype {expected} and {got}")]
    StackDType { expected: DType, got: DType },
    #[error("cannot index a 0-dimensional array")]
    NotIndexable,
    #[error("index {index} out of bounds for leading dimension {len}")]
    OutOfBounds { index: usize, len: usize },
}

/// Element type of an [`Array`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    F64,
    F32,
    I64,
    I32,
    I16,
    I8,
    U64,
    U32,
    U16,
    U8,
    Bool,
}

impl DType {
    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, DType::F64 | DType::F32)
    }

    #[must_use]
    pub const fn is_signed_int(self) -> bool {
        matches!(self, DType::I64 | DType::I32 | DType::I16 | DType::I8)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            DType::F64 => "f64",
            DType::F32 => "f32",
            DType::I64 => "i64",
            DType::I32 => "i32",
            DType::I16 => "i16",
            DType::I8 => "i8",
            DType::U64 => "u64",
            DType::U32 => "u32",
            DType::U16 => "u16",
            DType::U8 => "u8",
            DType::Bool => "bool",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Flat, row-major element storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dtype", content = "values", rename_all = "lowercase")]
pub enum ArrayData {
    F64(Vec<f64>),
    F32(Vec<f32>),
    I64(Vec<i64>),
    I32(Vec<i32>),
    I16(Vec<i16>),
    I8(Vec<i8>),
    U64(Vec<u64>),
    U32(Vec<u32>),
    U16(Vec<u16>),
    U8(Vec<u8>),
    Bool(Vec<bool>),
}

// Applies `$body` to the inner vector and rewraps the result in the same variant.
macro_rules! map_same {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            ArrayData::F64($v) => ArrayData::F64($body),
            ArrayData::F32($v) => ArrayData::F32($body),
            ArrayData::I64($v) => ArrayData::I64($body),
            ArrayData::I32($v) => ArrayData::I32($body),
            ArrayData::I16($v) => ArrayData::I16($body),
            ArrayData::I8($v) => ArrayData::I8($body),
            ArrayData::U64($v) => ArrayData::U64($body),
            ArrayData::U32($v) => ArrayData::U32($body),
            ArrayData::U16($v) => ArrayData::U16($body),
            ArrayData::U8($v) => ArrayData::U8($body),
            ArrayData::Bool($v) => ArrayData::Bool($body),
        }
    };
}

impl ArrayData {
    #[must_use]
    pub fn dtype(&self) -> DType {
        match self {
            ArrayData::F64(_) => DType::F64,
            ArrayData::F32(_) => DType::F32,
            ArrayData::I64(_) => DType::I64,
            ArrayData::I32(_) => DType::I32,
            ArrayData::I16(_) => DType::I16,
            ArrayData::I8(_) => DType::I8,
            ArrayData::U64(_) => DType::U64,
            ArrayData::U32(_) => DType::U32,
            ArrayData::U16(_) => DType::U16,
            ArrayData::U8(_) => DType::U8,
            ArrayData::Bool(_) => DType::Bool,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            ArrayData::F64(v) => v.len(),
            ArrayData::F32(v) => v.len(),
            ArrayData::I64(v) => v.len(),
            ArrayData::I32(v) => v.len(),
            ArrayData::I16(v) => v.len(),
            ArrayData::I8(v) => v.len(),
            ArrayData::U64(v) => v.len(),
            ArrayData::U32(v) => v.len(),
            ArrayData::U16(v) => v.len(),
            ArrayData::U8(v) => v.len(),
            ArrayData::Bool(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Primitive types that can be stored in an [`Array`].
pub trait Element: Copy + Default + PartialEq + fmt::Debug + 'static {
    const DTYPE: DType;

    fn into_data(values: Vec<Self>) -> ArrayData;

    fn slice(data: &ArrayData) -> Option<&[Self]>;
}

macro_rules! impl_element {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl Element for $t {
                const DTYPE: DType = DType::$variant;

                fn into_data(values: Vec<Self>) -> ArrayData {
                    ArrayData::$variant(values)
                }

                fn slice(data: &ArrayData) -> Option<&[Self]> {
                    match data {
                        ArrayData::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_element!(
    f64 => F64,
    f32 => F32,
    i64 => I64,
    i32 => I32,
    i16 => I16,
    i8 => I8,
    u64 => U64,
    u32 => U32,
    u16 => U16,
    u8 => U8,
    bool => Bool,
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawArray")]
pub struct Array {
    shape: Vec<usize>,
    data: ArrayData,
}

/// Wire form of an [`Array`], checked by [`Array::from_data`] on the way in.
#[derive(Deserialize)]
struct RawArray {
    shape: Vec<usize>,
    data: ArrayData,
}

impl TryFrom<RawArray> for Array {
    type Error = ArrayError;

    fn try_from(raw: RawArray) -> Result<Self, Self::Error> {
        Self::from_data(raw.shape, raw.data)
    }
}

impl Array {
    /// Builds an array from row-major `values`.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::ShapeMismatch`] if the number of values is not the
    /// product of `shape`.
    pub fn from_vec<T: Element>(shape: Vec<usize>, values: Vec<T>) -> Result<Self, ArrayError> {
        Self::from_data(shape, T::into_data(values))
    }

    /// # Errors
    ///
    /// Returns [`ArrayError::ShapeMismatch`] if `data` does not fill `shape`.
    pub fn from_data(shape: Vec<usize>, data: ArrayData) -> Result<Self, ArrayError> {
        let expected = shape.iter().product::<usize>();
        if data.len() != expected {
            return Err(ArrayError::ShapeMismatch { shape, len: data.len() });
        }
        Ok(Self { shape, data })
    }

    /// A 0-dimensional array holding `value`.
    #[must_use]
    pub fn scalar<T: Element>(value: T) -> Self {
        Self { shape: Vec::new(), data: T::into_data(vec![value]) }
    }

    /// A 1-dimensional array holding `values`.
    #[must_use]
    pub fn vector<T: Element>(values: Vec<T>) -> Self {
        Self { shape: vec![values.len()], data: T::into_data(values) }
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[must_use]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn dtype(&self) -> DType {
        self.data.dtype()
    }

    #[must_use]
    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    /// Typed view of the elements, `None` if `T` is not this array's dtype.
    #[must_use]
    pub fn as_slice<T: Element>(&self) -> Option<&[T]> {
        T::slice(&self.data)
    }

    /// The single element of a one-element array.
    #[must_use]
    pub fn item<T: Element>(&self) -> Option<T> {
        match self.as_slice::<T>()? {
            [value] => Some(*value),
            _ => None,
        }
    }

    /// Elements widened to `f64`; booleans map to 0 and 1.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match &self.data {
            ArrayData::F64(v) => v.clone(),
            ArrayData::F32(v) => v.iter().map(|&x| f64::from(x)).collect(),
            ArrayData::I64(v) => v.iter().map(|&x| x as f64).collect(),
            ArrayData::I32(v) => v.iter().map(|&x| f64::from(x)).collect(),
            ArrayData::I16(v) => v.iter().map(|&x| f64::from(x)).collect(),
            ArrayData::I8(v) => v.iter().map(|&x| f64::from(x)).collect(),
            ArrayData::U64(v) => v.iter().map(|&x| x as f64).collect(),
            ArrayData::U32(v) => v.iter().map(|&x| f64::from(x)).collect(),
            ArrayData::U16(v) => v.iter().map(|&x| f64::from(x)).collect(),
            ArrayData::U8(v) => v.iter().map(|&x| f64::from(x)).collect(),
            ArrayData::Bool(v) => v.iter().map(|&x| f64::from(u8::from(x))).collect(),
        }
    }

    #[must_use]
    pub fn sum(&self) -> f64 {
        self.to_f64_vec().iter().sum()
    }

    /// Normalises the element type for storage: floats become `f32`, signed
    /// integers become `i32`, everything else is left untouched.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn convert(self) -> Self {
        let Self { shape, data } = self;
        let data = match data {
            ArrayData::F64(v) => ArrayData::F32(v.into_iter().map(|x| x as f32).collect()),
            ArrayData::I64(v) => ArrayData::I32(v.into_iter().map(|x| x as i32).collect()),
            ArrayData::I16(v) => ArrayData::I32(v.into_iter().map(i32::from).collect()),
            ArrayData::I8(v) => ArrayData::I32(v.into_iter().map(i32::from).collect()),
            other => other,
        };
        Self { shape, data }
    }

    /// Numeric cast to `dtype`, going through `f64`. Float to integer casts
    /// saturate; non-zero values become `true`.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::float_cmp
    )]
    pub fn cast(&self, dtype: DType) -> Self {
        if self.dtype() == dtype {
            return self.clone();
        }
        let values = self.to_f64_vec();
        let data = match dtype {
            DType::F64 => ArrayData::F64(values),
            DType::F32 => ArrayData::F32(values.iter().map(|&x| x as f32).collect()),
            DType::I64 => ArrayData::I64(values.iter().map(|&x| x as i64).collect()),
            DType::I32 => ArrayData::I32(values.iter().map(|&x| x as i32).collect()),
            DType::I16 => ArrayData::I16(values.iter().map(|&x| x as i16).collect()),
            DType::I8 => ArrayData::I8(values.iter().map(|&x| x as i8).collect()),
            DType::U64 => ArrayData::U64(values.iter().map(|&x| x as u64).collect()),
            DType::U32 => ArrayData::U32(values.iter().map(|&x| x as u32).collect()),
            DType::U16 => ArrayData::U16(values.iter().map(|&x| x as u16).collect()),
            DType::U8 => ArrayData::U8(values.iter().map(|&x| x as u8).collect()),
            DType::Bool => ArrayData::Bool(values.iter().map(|&x| x != 0.0).collect()),
        };
        Self { shape: self.shape.clone(), data }
    }

    /// An array of the same shape and dtype filled with zeros.
    #[must_use]
    pub fn zeros_like(&self) -> Self {
        let data = map_same!(&self.data, v => vec![Default::default(); v.len()]);
        Self { shape: self.shape.clone(), data }
    }

    /// Row `index` along the leading axis.
    ///
    /// # Errors
    ///
    /// Fails for 0-dimensional arrays and out-of-range indices.
    pub fn index(&self, index: usize) -> Result<Self, ArrayError> {
        let (&len, rest) = self.shape.split_first().ok_or(ArrayError::NotIndexable)?;
        if index >= len {
            return Err(ArrayError::OutOfBounds { index, len });
        }
        let row = rest.iter().product::<usize>();
        let range = index * row..(index + 1) * row;
        let data = map_same!(&self.data, v => v[range.clone()].to_vec());
        Ok(Self { shape: rest.to_vec(), data })
    }

    /// Stacks arrays of identical shape and dtype along a new leading axis.
    ///
    /// # Errors
    ///
    /// Fails if `arrays` is empty or the arrays disagree in shape or dtype.
    pub fn stack(arrays: &[&Array]) -> Result<Self, ArrayError> {
        let (first, rest) = arrays.split_first().ok_or(ArrayError::EmptyStack)?;
        for array in rest {
            if array.shape != first.shape {
                return Err(ArrayError::StackShape {
                    expected: first.shape.clone(),
                    got: array.shape.clone(),
                });
            }
            if array.dtype() != first.dtype() {
                return Err(ArrayError::StackDType { expected: first.dtype(), got: array.dtype() });
            }
        }
        let data = match first.dtype() {
            DType::F64 => gather::<f64>(arrays),
            DType::F32 => gather::<f32>(arrays),
            DType::I64 => gather::<i64>(arrays),
            DType::I32 => gather::<i32>(arrays),
            DType::I16 => gather::<i16>(arrays),
            DType::I8 => gather::<i8>(arrays),
            DType::U64 => gather::<u64>(arrays),
            DType::U32 => gather::<u32>(arrays),
            DType::U16 => gather::<u16>(arrays),
            DType::U8 => gather::<u8>(arrays),
            DType::Bool => gather::<bool>(arrays),
        };
        let mut shape = Vec::with_capacity(first.ndim() + 1);
        shape.push(arrays.len());
        shape.extend_from_slice(&first.shape);
        Ok(Self { shape, data })
    }
}

fn gather<T: Element>(arrays: &[&Array]) -> ArrayData {
    let values = arrays
        .iter()
        .filter_map(|a| a.as_slice::<T>())
        .flatten()
        .copied()
        .collect();
    T::into_data(values)
}
