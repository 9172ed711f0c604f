//! §10.3 typed output arrays: the surface callers of `read_data` actually see, instead of
//! a raw byte buffer they would have to interpret themselves.

use crate::descriptor::DataType;
use crate::error::{Error, Result};
use crate::io::Data;
use crate::math::product;
use crate::section::Shape;

/// A completed read: a dense row-major buffer tagged with its element type, alongside
/// the shape it was read at (the completed section's lengths, not necessarily the
/// variable's full shape).
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    pub shape: Shape,
    pub data: TypedArray,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypedArray {
    I8(Vec<i8>),
    U8(Vec<u8>),
    I16(Vec<i16>),
    U16(Vec<u16>),
    I32(Vec<i32>),
    U32(Vec<u32>),
    I64(Vec<i64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
    /// CHAR data: stored as `U8` on disk, surfaced here without the numeric framing.
    Chars(Vec<u8>),
}

/// Convert a raw, big-endian, densely packed byte buffer into the typed array for
/// `data_type`. `bytes.len()` must equal `product(shape) * data_type.fixed_element_size()`.
pub fn from_be_bytes(data_type: DataType, shape: Shape, bytes: Vec<u8>) -> Result<Array> {
    let count = product(&shape);

    let data = match data_type {
        DataType::Char => TypedArray::Chars(bytes),
        DataType::I8 => TypedArray::I8(decode::<i8>(&bytes, count)),
        DataType::U8 => TypedArray::U8(bytes),
        DataType::I16 => TypedArray::I16(decode::<i16>(&bytes, count)),
        DataType::U16 => TypedArray::U16(decode::<u16>(&bytes, count)),
        DataType::I32 => TypedArray::I32(decode::<i32>(&bytes, count)),
        DataType::U32 => TypedArray::U32(decode::<u32>(&bytes, count)),
        DataType::I64 => TypedArray::I64(decode::<i64>(&bytes, count)),
        DataType::F32 => TypedArray::F32(decode::<f32>(&bytes, count)),
        DataType::F64 => TypedArray::F64(decode::<f64>(&bytes, count)),
        DataType::Struct => return Err(Error::internal("structure variables do not produce a TypedArray, see Record")),
    };

    Ok(Array { shape, data })
}

fn decode<T: Data>(bytes: &[u8], count: usize) -> Vec<T> {
    let mut out = vec![T::default(); count];
    T::read_be_slice(bytes, &mut out);
    out
}
