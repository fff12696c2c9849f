//! Logical values flowing out of pages.
//!
//! A [Value] is a single cell of a column: an optional physical payload plus
//! the repetition and definition levels which place it within the nested
//! structure of the column.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use bytes::Bytes;

use crate::error::PageError;

#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
/// The physical type of the values stored in a page.
///
/// These types have no concept of nested structures, nesting is expressed
/// through levels.
pub enum Kind {
    Boolean = 0,
    Int32 = 1,
    Int64 = 2,
    Int96 = 3,
    Float = 4,
    Double = 5,
    ByteArray = 6,
    FixedLenByteArray = 7,
}

impl Display for Kind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Kind::Boolean => "BOOLEAN",
            Kind::Int32 => "INT32",
            Kind::Int64 => "INT64",
            Kind::Int96 => "INT96",
            Kind::Float => "FLOAT",
            Kind::Double => "DOUBLE",
            Kind::ByteArray => "BYTE_ARRAY",
            Kind::FixedLenByteArray => "FIXED_LEN_BYTE_ARRAY",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
/// A legacy 96-bit integer stored as three little-endian 32-bit words.
///
/// Ordering is signed: the most significant word is compared as an `i32`,
/// the two lower words as `u32`.
pub struct Int96(pub [u32; 3]);

impl Int96 {
    /// Creates an [Int96] from a signed 64-bit value, sign extending
    /// into the upper word.
    pub fn from_i64(value: i64) -> Self {
        let high = if value < 0 { u32::MAX } else { 0 };
        Self([value as u32, (value >> 32) as u32, high])
    }

    /// Returns `true` if the value is below zero.
    pub fn is_negative(&self) -> bool {
        (self.0[2] as i32) < 0
    }
}

impl Ord for Int96 {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.0[2] as i32)
            .cmp(&(other.0[2] as i32))
            .then(self.0[1].cmp(&other.0[1]))
            .then(self.0[0].cmp(&other.0[0]))
    }
}

impl PartialOrd for Int96 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, PartialEq)]
/// The physical payload of a present value.
pub enum ValueData {
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Int96(Int96),
    Float(f32),
    Double(f64),
    ByteArray(Bytes),
    FixedLenByteArray(Bytes),
}

impl ValueData {
    /// Returns the physical [Kind] of the payload.
    pub fn kind(&self) -> Kind {
        match self {
            ValueData::Boolean(_) => Kind::Boolean,
            ValueData::Int32(_) => Kind::Int32,
            ValueData::Int64(_) => Kind::Int64,
            ValueData::Int96(_) => Kind::Int96,
            ValueData::Float(_) => Kind::Float,
            ValueData::Double(_) => Kind::Double,
            ValueData::ByteArray(_) => Kind::ByteArray,
            ValueData::FixedLenByteArray(_) => Kind::FixedLenByteArray,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
/// A single logical cell of a column.
///
/// A value whose definition level is below the maximum definition level of
/// its column carries no payload, it is either a null or an absent nested
/// element. The default value is such a null with both levels at zero and
/// no column assigned.
pub struct Value {
    data: Option<ValueData>,
    repetition_level: i8,
    definition_level: i8,
    column: Option<usize>,
}

impl Value {
    /// Creates a null value.
    pub fn null() -> Self {
        Self::default()
    }

    /// Creates a present value holding the given payload.
    pub fn from_data(data: ValueData) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }

    pub fn boolean(value: bool) -> Self {
        Self::from_data(ValueData::Boolean(value))
    }

    pub fn int32(value: i32) -> Self {
        Self::from_data(ValueData::Int32(value))
    }

    pub fn int64(value: i64) -> Self {
        Self::from_data(ValueData::Int64(value))
    }

    pub fn int96(value: Int96) -> Self {
        Self::from_data(ValueData::Int96(value))
    }

    pub fn float(value: f32) -> Self {
        Self::from_data(ValueData::Float(value))
    }

    pub fn double(value: f64) -> Self {
        Self::from_data(ValueData::Double(value))
    }

    pub fn byte_array(value: impl Into<Bytes>) -> Self {
        Self::from_data(ValueData::ByteArray(value.into()))
    }

    pub fn fixed_len_byte_array(value: impl Into<Bytes>) -> Self {
        Self::from_data(ValueData::FixedLenByteArray(value.into()))
    }

    /// Returns a copy of the value with the given repetition and
    /// definition levels.
    pub fn with_levels(mut self, repetition_level: i8, definition_level: i8) -> Self {
        self.set_levels(repetition_level, definition_level);
        self
    }

    /// Returns a copy of the value attached to the given column.
    pub fn with_column(mut self, column: Option<usize>) -> Self {
        self.column = column;
        self
    }

    #[inline]
    pub(crate) fn set_levels(&mut self, repetition_level: i8, definition_level: i8) {
        self.repetition_level = repetition_level;
        self.definition_level = definition_level;
    }

    #[inline]
    /// Returns the physical kind of the value, `None` for nulls.
    pub fn kind(&self) -> Option<Kind> {
        self.data.as_ref().map(ValueData::kind)
    }

    #[inline]
    /// Returns `true` if the value carries no payload.
    pub fn is_null(&self) -> bool {
        self.data.is_none()
    }

    #[inline]
    pub fn data(&self) -> Option<&ValueData> {
        self.data.as_ref()
    }

    /// Consumes the value returning its payload.
    pub fn into_data(self) -> Option<ValueData> {
        self.data
    }

    #[inline]
    pub fn repetition_level(&self) -> i8 {
        self.repetition_level
    }

    #[inline]
    pub fn definition_level(&self) -> i8 {
        self.definition_level
    }

    #[inline]
    /// Returns the index of the column the value was read from.
    pub fn column(&self) -> Option<usize> {
        self.column
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.data {
            Some(ValueData::Boolean(v)) => Some(v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self.data {
            Some(ValueData::Int32(v)) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.data {
            Some(ValueData::Int64(v)) => Some(v),
            _ => None,
        }
    }

    /// Returns the payload of byte array and fixed length byte array values.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.data {
            Some(ValueData::ByteArray(v)) => Some(v),
            Some(ValueData::FixedLenByteArray(v)) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
/// The outcome of a single [ValueReader::read_values] call.
pub struct ValueRead {
    /// The number of values written to the front of the output buffer.
    pub count: usize,
    /// Set once the reader has produced every value of the page.
    ///
    /// This is an expected signal rather than an error, it can be set
    /// together with a non-zero count.
    pub eof: bool,
}

/// A pull based cursor over the values of a page.
///
/// Cursors keep their own read offset, they are single-use and must not be
/// shared between readers. Obtain a new cursor per reader from
/// [Page::values](crate::Page::values).
pub trait ValueReader: Send {
    /// Reads up to `values.len()` values into the front of the buffer.
    fn read_values(&mut self, values: &mut [Value]) -> Result<ValueRead, PageError>;
}

const READ_ALL_BATCH_SIZE: usize = 64;

/// Drains the reader, collecting every remaining value.
pub fn read_all_values(reader: &mut dyn ValueReader) -> Result<Vec<Value>, PageError> {
    let mut buffer = vec![Value::null(); READ_ALL_BATCH_SIZE];
    let mut values = Vec::new();

    loop {
        let read = reader.read_values(&mut buffer)?;
        values.extend(buffer[..read.count].iter().cloned());

        if read.eof || read.count == 0 {
            return Ok(values);
        }
    }
}
