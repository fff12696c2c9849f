use std::fmt::{Debug, Formatter};
use std::ops::{Deref, Range};
use std::sync::Arc;

use crate::page::check_slice_bounds;

/// A read-only view into a reference counted array.
///
/// Slicing produces a new view over the same allocation, the backing
/// array is never copied nor written to once shared.
pub struct SharedSlice<T> {
    data: Arc<[T]>,
    start: usize,
    end: usize,
}

impl<T> SharedSlice<T> {
    /// Creates a view covering the whole array.
    pub fn new(data: impl Into<Arc<[T]>>) -> Self {
        let data = data.into();
        let end = data.len();
        Self { data, start: 0, end }
    }

    /// Creates an empty view.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data[self.start..self.end]
    }

    /// Returns a view of the `i..j` sub-range of this view.
    ///
    /// # Panics
    ///
    /// If the range is inverted or extends past the end of the view.
    pub fn slice(&self, range: Range<usize>) -> Self {
        check_slice_bounds(range.start, range.end, self.len());
        Self {
            data: self.data.clone(),
            start: self.start + range.start,
            end: self.start + range.end,
        }
    }

    /// Returns `true` if both views point into the same allocation.
    pub fn shares_storage_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl<T> Clone for SharedSlice<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            start: self.start,
            end: self.end,
        }
    }
}

impl<T> Deref for SharedSlice<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T: Debug> Debug for SharedSlice<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T> From<Vec<T>> for SharedSlice<T> {
    fn from(value: Vec<T>) -> Self {
        Self::new(value)
    }
}

impl<T> From<Arc<[T]>> for SharedSlice<T> {
    fn from(value: Arc<[T]>) -> Self {
        Self::new(value)
    }
}

impl<T: Clone> From<&[T]> for SharedSlice<T> {
    fn from(value: &[T]) -> Self {
        Self::new(value)
    }
}

impl<T: Clone, const N: usize> From<[T; N]> for SharedSlice<T> {
    fn from(value: [T; N]) -> Self {
        Self::new(Vec::from(value))
    }
}
