//! Min/max kernels used for page and column statistics.
//!
//! Every kernel computes both bounds in a single pass and returns `None`
//! when given no values. The unsigned kernels reinterpret the signed backing
//! arrays without copying, the physical representation is identical and only
//! the ordering differs.

use std::cmp::Ordering;

use bytes::Bytes;

use crate::value::{Value, ValueData};

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
/// The ordering applied to integer values when computing statistics.
pub enum SortOrder {
    #[default]
    Signed,
    Unsigned,
}

/// Returns the min and max of a boolean slice, `false` sorting first.
pub fn min_max_bool(values: &[bool]) -> Option<(bool, bool)> {
    if values.is_empty() {
        return None;
    }

    let mut has_false = false;
    let mut has_true = false;
    for &value in values {
        if value {
            has_true = true;
        } else {
            has_false = true;
        }

        if has_true && has_false {
            break;
        }
    }

    Some((!has_false, has_true))
}

/// Returns the min and max of any totally ordered slice.
pub fn min_max_ord<T: Ord + Copy>(values: &[T]) -> Option<(T, T)> {
    let (&first, rest) = values.split_first()?;

    let mut min = first;
    let mut max = first;
    for &value in rest {
        min = min.min(value);
        max = max.max(value);
    }

    Some((min, max))
}

/// Returns the min and max of a floating point slice.
///
/// NaN values never compare below or above anything, they only end up in
/// the result if they are the first value of the slice.
pub fn min_max_float<T: PartialOrd + Copy>(values: &[T]) -> Option<(T, T)> {
    let (&first, rest) = values.split_first()?;

    let mut min = first;
    let mut max = first;
    for &value in rest {
        if value < min {
            min = value;
        }
        if value > max {
            max = value;
        }
    }

    Some((min, max))
}

/// Returns the unsigned min and max of a signed 32-bit slice, the results
/// keep the signed bit patterns.
pub fn min_max_u32(values: &[i32]) -> Option<(i32, i32)> {
    let unsigned: &[u32] = bytemuck::cast_slice(values);
    min_max_ord(unsigned).map(|(min, max)| (min as i32, max as i32))
}

/// Returns the unsigned min and max of a signed 64-bit slice, the results
/// keep the signed bit patterns.
pub fn min_max_u64(values: &[i64]) -> Option<(i64, i64)> {
    let unsigned: &[u64] = bytemuck::cast_slice(values);
    min_max_ord(unsigned).map(|(min, max)| (min as i64, max as i64))
}

/// Returns the lexicographic min and max of a list of byte strings.
pub fn min_max_bytes(values: &[Bytes]) -> Option<(Bytes, Bytes)> {
    let (first, rest) = values.split_first()?;

    let mut min = first;
    let mut max = first;
    for value in rest {
        if value < min {
            min = value;
        } else if value > max {
            max = value;
        }
    }

    Some((min.clone(), max.clone()))
}

/// Returns the lexicographic min and max of a contiguous buffer of
/// `size` byte wide values.
pub fn min_max_fixed_len(size: usize, data: &[u8]) -> Option<(&[u8], &[u8])> {
    let mut chunks = data.chunks_exact(size);
    let first = chunks.next()?;

    let mut min = first;
    let mut max = first;
    for value in chunks {
        if value < min {
            min = value;
        } else if value > max {
            max = value;
        }
    }

    Some((min, max))
}

/// Compares two payloads of the same kind.
///
/// Returns `None` if the kinds differ or the values are not comparable (NaN).
pub fn compare_data(a: &ValueData, b: &ValueData, order: SortOrder) -> Option<Ordering> {
    use ValueData::*;

    match (a, b) {
        (Boolean(a), Boolean(b)) => Some(a.cmp(b)),
        (Int32(a), Int32(b)) => match order {
            SortOrder::Signed => Some(a.cmp(b)),
            SortOrder::Unsigned => Some((*a as u32).cmp(&(*b as u32))),
        },
        (Int64(a), Int64(b)) => match order {
            SortOrder::Signed => Some(a.cmp(b)),
            SortOrder::Unsigned => Some((*a as u64).cmp(&(*b as u64))),
        },
        (Int96(a), Int96(b)) => Some(a.cmp(b)),
        (Float(a), Float(b)) => a.partial_cmp(b),
        (Double(a), Double(b)) => a.partial_cmp(b),
        (ByteArray(a), ByteArray(b)) => Some(a.cmp(b)),
        (FixedLenByteArray(a), FixedLenByteArray(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

#[derive(Debug, Default, Clone)]
/// Tracks the bounds of a stream of values.
///
/// Nulls are ignored. Observing every value of a page yields the same pair
/// as the page's own bounds, which makes the tracker suitable for merging
/// statistics across the pages of a column chunk.
pub struct BoundsTracker {
    order: SortOrder,
    min: Option<ValueData>,
    max: Option<ValueData>,
}

impl BoundsTracker {
    /// Creates a new tracker comparing integers with the given order.
    pub fn new(order: SortOrder) -> Self {
        Self {
            order,
            min: None,
            max: None,
        }
    }

    /// Updates the bounds with the given value.
    pub fn observe(&mut self, value: &Value) {
        let Some(data) = value.data() else { return };

        match &self.min {
            None => self.min = Some(data.clone()),
            Some(min) => {
                if compare_data(data, min, self.order) == Some(Ordering::Less) {
                    self.min = Some(data.clone());
                }
            },
        }

        match &self.max {
            None => self.max = Some(data.clone()),
            Some(max) => {
                if compare_data(data, max, self.order) == Some(Ordering::Greater) {
                    self.max = Some(data.clone());
                }
            },
        }
    }

    /// Updates the bounds with every value in the slice.
    pub fn observe_all<'a>(&mut self, values: impl IntoIterator<Item = &'a Value>) {
        for value in values {
            self.observe(value);
        }
    }

    /// Returns `true` if no present value has been observed yet.
    pub fn is_empty(&self) -> bool {
        self.min.is_none()
    }

    /// Returns the current bounds.
    ///
    /// Both bounds are null values when nothing has been observed.
    pub fn bounds(&self) -> (Value, Value) {
        let min = self.min.clone().map(Value::from_data).unwrap_or_default();
        let max = self.max.clone().map(Value::from_data).unwrap_or_default();
        (min, max)
    }
}
