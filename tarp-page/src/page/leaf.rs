//! Leaf pages storing flat arrays of one physical type.
//!
//! Leaf pages only ever hold present values: they have no levels, no nulls
//! and one row per value.

use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;

use bytes::Bytes;

use crate::bounds;
use crate::error::PageError;
use crate::page::{check_slice_bounds, BufferedPage, Dictionary, Encoder, Page, PageHandle};
use crate::physical::{
    BooleanType,
    ByteArrayType,
    DoubleType,
    FloatType,
    Int32Type,
    Int64Type,
    Int96Type,
    PhysicalType,
    Uint32Type,
    Uint64Type,
};
use crate::shared::SharedSlice;
use crate::value::{Value, ValueData, ValueRead, ValueReader};

pub type BooleanPage = LeafPage<BooleanType>;
pub type Int32Page = LeafPage<Int32Type>;
pub type Int64Page = LeafPage<Int64Type>;
pub type Int96Page = LeafPage<Int96Type>;
pub type FloatPage = LeafPage<FloatType>;
pub type DoublePage = LeafPage<DoubleType>;
pub type ByteArrayPage = LeafPage<ByteArrayType>;
/// A 32-bit integer page whose bounds use unsigned ordering.
pub type Uint32Page = LeafPage<Uint32Type>;
/// A 64-bit integer page whose bounds use unsigned ordering.
pub type Uint64Page = LeafPage<Uint64Type>;

/// A page of values of the physical type `T`.
pub struct LeafPage<T: PhysicalType> {
    values: SharedSlice<T::Native>,
    column: Option<usize>,
    dictionary: Option<Arc<dyn Dictionary>>,
    _type: PhantomData<fn() -> T>,
}

impl<T: PhysicalType> LeafPage<T> {
    /// Creates a page over the given values which is not yet
    /// assigned to a column.
    pub fn new(values: impl Into<SharedSlice<T::Native>>) -> Self {
        Self {
            values: values.into(),
            column: None,
            dictionary: None,
            _type: PhantomData,
        }
    }

    /// Assigns the page to the column with the given index.
    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }

    /// Attaches the dictionary the values of the page index into.
    pub fn with_dictionary(mut self, dictionary: Arc<dyn Dictionary>) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    #[inline]
    /// Returns the values stored in the page.
    pub fn as_slice(&self) -> &[T::Native] {
        self.values.as_slice()
    }

    fn sliced(&self, i: usize, j: usize) -> Self {
        Self {
            values: self.values.slice(i..j),
            column: self.column,
            dictionary: self.dictionary.clone(),
            _type: PhantomData,
        }
    }
}

impl<T: PhysicalType> Clone for LeafPage<T> {
    fn clone(&self) -> Self {
        self.sliced(0, self.values.len())
    }
}

impl<T: PhysicalType> Debug for LeafPage<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeafPage")
            .field("kind", &T::KIND)
            .field("column", &self.column)
            .field("num_values", &self.values.len())
            .finish()
    }
}

impl<T: PhysicalType> Page for LeafPage<T> {
    fn column(&self) -> Option<usize> {
        self.column
    }

    fn dictionary(&self) -> Option<&Arc<dyn Dictionary>> {
        self.dictionary.as_ref()
    }

    fn num_rows(&self) -> usize {
        self.values.len()
    }

    fn num_values(&self) -> usize {
        self.values.len()
    }

    fn num_nulls(&self) -> usize {
        0
    }

    fn bounds(&self) -> (Value, Value) {
        match T::min_max(self.as_slice()) {
            Some((min, max)) => (
                Value::from_data(T::make_value(&min)),
                Value::from_data(T::make_value(&max)),
            ),
            None => (Value::default(), Value::default()),
        }
    }

    fn size(&self) -> u64 {
        T::size_of(self.as_slice())
    }

    fn values(&self) -> Box<dyn ValueReader + '_> {
        Box::new(LeafValueReader {
            page: self,
            offset: 0,
        })
    }
}

impl<T: PhysicalType> BufferedPage for LeafPage<T> {
    fn slice(&self, i: usize, j: usize) -> PageHandle {
        Arc::new(self.sliced(i, j))
    }

    fn repetition_levels(&self) -> &[i8] {
        &[]
    }

    fn definition_levels(&self) -> &[i8] {
        &[]
    }

    fn write_to(&self, encoder: &mut dyn Encoder) -> Result<(), PageError> {
        T::encode(encoder, self.as_slice())?;
        Ok(())
    }
}

struct LeafValueReader<'a, T: PhysicalType> {
    page: &'a LeafPage<T>,
    offset: usize,
}

impl<T: PhysicalType> ValueReader for LeafValueReader<'_, T> {
    fn read_values(&mut self, values: &mut [Value]) -> Result<ValueRead, PageError> {
        let remaining = &self.page.as_slice()[self.offset..];
        let count = values.len().min(remaining.len());

        for (slot, value) in values.iter_mut().zip(&remaining[..count]) {
            *slot = Value::from_data(T::make_value(value)).with_column(self.page.column);
        }
        self.offset += count;

        Ok(ValueRead {
            count,
            eof: self.offset == self.page.values.len(),
        })
    }
}

#[derive(Clone)]
/// A page of byte strings which all have the same length.
///
/// The values are stored back to back in a single buffer.
pub struct FixedLenByteArrayPage {
    size: usize,
    data: Bytes,
    column: Option<usize>,
    dictionary: Option<Arc<dyn Dictionary>>,
}

impl FixedLenByteArrayPage {
    /// Creates a page of `size` byte values from a contiguous buffer.
    ///
    /// # Panics
    ///
    /// If `size` is zero or the buffer length is not a multiple of `size`.
    pub fn new(size: usize, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        assert!(size > 0, "Fixed length byte array size should be greater than zero");
        assert_eq!(
            data.len() % size,
            0,
            "Fixed length byte array data should be a multiple of the value size"
        );

        Self {
            size,
            data,
            column: None,
            dictionary: None,
        }
    }

    /// Assigns the page to the column with the given index.
    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }

    /// Attaches the dictionary the values of the page index into.
    pub fn with_dictionary(mut self, dictionary: Arc<dyn Dictionary>) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    #[inline]
    /// Returns the width in bytes of each value.
    pub fn value_size(&self) -> usize {
        self.size
    }

    #[inline]
    /// Returns the raw buffer of the page.
    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

impl Debug for FixedLenByteArrayPage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedLenByteArrayPage")
            .field("size", &self.size)
            .field("column", &self.column)
            .field("num_values", &self.num_values())
            .finish()
    }
}

impl Page for FixedLenByteArrayPage {
    fn column(&self) -> Option<usize> {
        self.column
    }

    fn dictionary(&self) -> Option<&Arc<dyn Dictionary>> {
        self.dictionary.as_ref()
    }

    fn num_rows(&self) -> usize {
        self.data.len() / self.size
    }

    fn num_values(&self) -> usize {
        self.data.len() / self.size
    }

    fn num_nulls(&self) -> usize {
        0
    }

    fn bounds(&self) -> (Value, Value) {
        match bounds::min_max_fixed_len(self.size, &self.data) {
            Some((min, max)) => (
                Value::fixed_len_byte_array(self.data.slice_ref(min)),
                Value::fixed_len_byte_array(self.data.slice_ref(max)),
            ),
            None => (Value::default(), Value::default()),
        }
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn values(&self) -> Box<dyn ValueReader + '_> {
        Box::new(FixedLenByteArrayValueReader {
            page: self,
            offset: 0,
        })
    }
}

impl BufferedPage for FixedLenByteArrayPage {
    fn slice(&self, i: usize, j: usize) -> PageHandle {
        check_slice_bounds(i, j, self.num_values());
        Arc::new(Self {
            size: self.size,
            data: self.data.slice(i * self.size..j * self.size),
            column: self.column,
            dictionary: self.dictionary.clone(),
        })
    }

    fn repetition_levels(&self) -> &[i8] {
        &[]
    }

    fn definition_levels(&self) -> &[i8] {
        &[]
    }

    fn write_to(&self, encoder: &mut dyn Encoder) -> Result<(), PageError> {
        encoder.encode_fixed_len_byte_array(self.size, &self.data)?;
        Ok(())
    }
}

struct FixedLenByteArrayValueReader<'a> {
    page: &'a FixedLenByteArrayPage,
    /// The byte offset of the next value.
    offset: usize,
}

impl ValueReader for FixedLenByteArrayValueReader<'_> {
    fn read_values(&mut self, values: &mut [Value]) -> Result<ValueRead, PageError> {
        let size = self.page.size;
        let data = &self.page.data;

        let mut count = 0;
        while count < values.len() && self.offset < data.len() {
            let value = data.slice(self.offset..self.offset + size);
            values[count] = Value::from_data(ValueData::FixedLenByteArray(value))
                .with_column(self.page.column);
            self.offset += size;
            count += 1;
        }

        Ok(ValueRead {
            count,
            eof: self.offset == data.len(),
        })
    }
}
