//! Repetition and definition level handling.
//!
//! Nested and optional columns are stored as a flat array of present values
//! plus one or two level arrays with an entry per logical value. The merge in
//! [interleave_levels] rebuilds the logical value stream from those two
//! sources: the level array decides where nulls fall and how many values
//! exist, the base cursor only supplies the payloads of present entries.

use crate::error::PageError;
use crate::page::BufferedPage;
use crate::value::{Value, ValueRead, ValueReader};

#[inline]
/// Counts the levels equal to `value`.
pub fn count_levels_equal(levels: &[i8], value: i8) -> usize {
    levels.iter().filter(|&&level| level == value).count()
}

#[inline]
/// Counts the levels not equal to `value`.
pub fn count_levels_not_equal(levels: &[i8], value: i8) -> usize {
    levels.len() - count_levels_equal(levels, value)
}

#[derive(Debug, Clone)]
/// A read position within the level arrays of a page.
pub struct LevelCursor<'a> {
    column: Option<usize>,
    max_definition_level: i8,
    repetition_levels: &'a [i8],
    definition_levels: &'a [i8],
    offset: usize,
    /// A base cursor failure held back until the values produced
    /// before it have been handed out.
    pending_error: Option<PageError>,
}

impl<'a> LevelCursor<'a> {
    /// Creates a cursor over the definition levels of an optional column.
    pub fn optional(
        column: Option<usize>,
        max_definition_level: i8,
        definition_levels: &'a [i8],
    ) -> Self {
        Self::repeated(column, max_definition_level, &[], definition_levels)
    }

    /// Creates a cursor over the levels of a repeated column.
    ///
    /// The repetition levels must either be empty or have one entry per
    /// definition level.
    pub fn repeated(
        column: Option<usize>,
        max_definition_level: i8,
        repetition_levels: &'a [i8],
        definition_levels: &'a [i8],
    ) -> Self {
        debug_assert!(
            repetition_levels.is_empty() || repetition_levels.len() == definition_levels.len(),
            "Repetition and definition levels should have the same length"
        );

        Self {
            column,
            max_definition_level,
            repetition_levels,
            definition_levels,
            offset: 0,
            pending_error: None,
        }
    }

    #[inline]
    /// Returns the number of level entries consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    /// Returns `true` once every level entry has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.offset >= self.definition_levels.len()
    }

    #[inline]
    fn repetition_level(&self, index: usize) -> i8 {
        self.repetition_levels.get(index).copied().unwrap_or(0)
    }

    #[inline]
    fn is_present(&self, index: usize) -> bool {
        self.definition_levels[index] == self.max_definition_level
    }
}

/// Merges the level cursor with the cursor of the base page into `values`.
///
/// Runs of absent entries are emitted directly from the levels as nulls.
/// Runs of present entries are pulled from `base`, asking for exactly the
/// length of the run (bounded by the space left in `values`) and stamping
/// each value produced with its levels. The level cursor only advances past
/// present entries the base cursor actually produced.
///
/// End of stream is reported once the level arrays are exhausted, regardless
/// of what the base cursor reports. A base cursor that runs dry before the
/// levels do fails with [PageError::MissingValues].
///
/// A failure of the base cursor never discards values already written to
/// `values`: when some were produced they are returned first and the error
/// is reported by the next call.
pub fn interleave_levels(
    levels: &mut LevelCursor<'_>,
    base: &mut dyn ValueReader,
    values: &mut [Value],
) -> Result<ValueRead, PageError> {
    if let Some(error) = levels.pending_error.take() {
        return Err(error);
    }

    let num_levels = levels.definition_levels.len();
    let mut n = 0;

    while n < values.len() && levels.offset < num_levels {
        while n < values.len() && levels.offset < num_levels && !levels.is_present(levels.offset) {
            let offset = levels.offset;
            values[n] = Value::null()
                .with_levels(levels.repetition_level(offset), levels.definition_levels[offset])
                .with_column(levels.column);
            levels.offset += 1;
            n += 1;
        }

        let mut run = 0;
        while n + run < values.len()
            && levels.offset + run < num_levels
            && levels.is_present(levels.offset + run)
        {
            run += 1;
        }

        if run == 0 {
            continue;
        }

        let read = match base.read_values(&mut values[n..n + run]) {
            Ok(read) => read,
            Err(error) => return flush_before_error(levels, n, error),
        };
        for value in &mut values[n..n + read.count] {
            value.set_levels(levels.repetition_level(levels.offset), levels.max_definition_level);
            levels.offset += 1;
        }
        n += read.count;

        if read.count < run && (read.eof || read.count == 0) {
            let error = PageError::MissingValues {
                expected: run,
                produced: read.count,
            };
            return flush_before_error(levels, n, error);
        }
    }

    Ok(ValueRead {
        count: n,
        eof: levels.is_exhausted(),
    })
}

fn flush_before_error(
    levels: &mut LevelCursor<'_>,
    produced: usize,
    error: PageError,
) -> Result<ValueRead, PageError> {
    if produced == 0 {
        return Err(error);
    }

    levels.pending_error = Some(error);
    Ok(ValueRead {
        count: produced,
        eof: false,
    })
}

/// The value cursor shared by the level decorators.
///
/// The cursor over the wrapped page is only created on the first read.
pub(crate) struct LevelledValueReader<'a> {
    base_page: &'a dyn BufferedPage,
    base: Option<Box<dyn ValueReader + 'a>>,
    levels: LevelCursor<'a>,
}

impl<'a> LevelledValueReader<'a> {
    pub(crate) fn new(base_page: &'a dyn BufferedPage, levels: LevelCursor<'a>) -> Self {
        Self {
            base_page,
            base: None,
            levels,
        }
    }
}

impl ValueReader for LevelledValueReader<'_> {
    fn read_values(&mut self, values: &mut [Value]) -> Result<ValueRead, PageError> {
        let base_page = self.base_page;
        let base = self.base.get_or_insert_with(|| base_page.values());
        interleave_levels(&mut self.levels, base.as_mut(), values)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::value::read_all_values;

    /// A base cursor which hands out at most `batch` values per call.
    struct StubReader {
        values: Vec<Value>,
        offset: usize,
        batch: usize,
        calls: Vec<usize>,
    }

    impl StubReader {
        fn new(values: Vec<i32>, batch: usize) -> Self {
            Self {
                values: values.into_iter().map(Value::int32).collect(),
                offset: 0,
                batch,
                calls: Vec::new(),
            }
        }
    }

    impl ValueReader for StubReader {
        fn read_values(&mut self, values: &mut [Value]) -> Result<ValueRead, PageError> {
            self.calls.push(values.len());
            let remaining = self.values.len() - self.offset;
            let count = values.len().min(self.batch).min(remaining);
            values[..count].clone_from_slice(&self.values[self.offset..self.offset + count]);
            self.offset += count;
            Ok(ValueRead {
                count,
                eof: self.offset == self.values.len(),
            })
        }
    }

    #[rstest]
    #[case(&[], 0)]
    #[case(&[1, 0, 1], 1)]
    #[case(&[0, 0, 0], 0)]
    #[case(&[2, 1, 0, 2], 2)]
    fn test_count_levels_not_equal(#[case] levels: &[i8], #[case] expected: usize) {
        let max = levels.iter().copied().max().unwrap_or(0);
        assert_eq!(count_levels_not_equal(levels, max), expected);
        assert_eq!(count_levels_equal(levels, max), levels.len() - expected);
    }

    #[test]
    fn test_interleave_optional_levels() {
        let definition_levels = [1, 0, 1];
        let mut levels = LevelCursor::optional(Some(2), 1, &definition_levels);
        let mut base = StubReader::new(vec![1, 3], usize::MAX);

        let mut values = vec![Value::null(); 8];
        let read = interleave_levels(&mut levels, &mut base, &mut values).unwrap();
        assert_eq!(read, ValueRead { count: 3, eof: true });
        assert_eq!(values[0], Value::int32(1).with_levels(0, 1));
        assert_eq!(values[1], Value::null().with_levels(0, 0).with_column(Some(2)));
        assert_eq!(values[2], Value::int32(3).with_levels(0, 1));
    }

    #[test]
    fn test_interleave_requests_exact_run_lengths() {
        let definition_levels = [1, 1, 0, 0, 1, 1, 1, 0];
        let mut levels = LevelCursor::optional(None, 1, &definition_levels);
        let mut base = StubReader::new(vec![1, 2, 3, 4, 5], usize::MAX);

        let mut values = vec![Value::null(); 16];
        let read = interleave_levels(&mut levels, &mut base, &mut values).unwrap();
        assert_eq!(read, ValueRead { count: 8, eof: true });
        assert_eq!(base.calls, vec![2, 3]);
    }

    #[test]
    fn test_interleave_small_output_buffer() {
        let repetition_levels = [0, 1, 0, 0, 1];
        let definition_levels = [2, 2, 1, 2, 2];
        let mut levels = LevelCursor::repeated(None, 2, &repetition_levels, &definition_levels);
        let mut base = StubReader::new(vec![10, 20, 30, 40], usize::MAX);

        let mut collected = Vec::new();
        let mut values = vec![Value::null(); 2];
        loop {
            let read = interleave_levels(&mut levels, &mut base, &mut values).unwrap();
            collected.extend_from_slice(&values[..read.count]);
            if read.eof {
                break;
            }
        }

        assert_eq!(
            collected,
            vec![
                Value::int32(10).with_levels(0, 2),
                Value::int32(20).with_levels(1, 2),
                Value::null().with_levels(0, 1),
                Value::int32(30).with_levels(0, 2),
                Value::int32(40).with_levels(1, 2),
            ]
        );
        assert!(base.calls.iter().all(|&len| len <= 2));
    }

    #[test]
    fn test_interleave_handles_short_base_reads() {
        let definition_levels = [1, 1, 1, 1];
        let mut levels = LevelCursor::optional(None, 1, &definition_levels);
        let mut base = StubReader::new(vec![1, 2, 3, 4], 1);

        let mut values = vec![Value::null(); 4];
        let read = interleave_levels(&mut levels, &mut base, &mut values).unwrap();
        assert_eq!(read, ValueRead { count: 4, eof: true });
        assert_eq!(base.calls, vec![4, 3, 2, 1]);
        assert_eq!(values[3], Value::int32(4).with_levels(0, 1));
    }

    #[test]
    fn test_interleave_trailing_nulls_after_base_eof() {
        let definition_levels = [1, 0, 0];
        let mut levels = LevelCursor::optional(None, 1, &definition_levels);
        let mut base = StubReader::new(vec![7], usize::MAX);

        let mut values = vec![Value::null(); 1];
        let read = interleave_levels(&mut levels, &mut base, &mut values).unwrap();
        assert_eq!(read, ValueRead { count: 1, eof: false });

        let mut values = vec![Value::null(); 4];
        let read = interleave_levels(&mut levels, &mut base, &mut values).unwrap();
        assert_eq!(read, ValueRead { count: 2, eof: true });
        assert!(values[..2].iter().all(Value::is_null));
    }

    #[test]
    fn test_interleave_missing_base_values() {
        let definition_levels = [1, 1, 1];
        let mut levels = LevelCursor::optional(None, 1, &definition_levels);
        let mut base = StubReader::new(vec![1], usize::MAX);

        let mut values = vec![Value::null(); 3];
        let read = interleave_levels(&mut levels, &mut base, &mut values).unwrap();
        assert_eq!(read, ValueRead { count: 1, eof: false });
        assert_eq!(values[0], Value::int32(1).with_levels(0, 1));
        assert_eq!(levels.offset(), 1);

        let err = interleave_levels(&mut levels, &mut base, &mut values)
            .expect_err("Base ran out of values");
        assert!(matches!(err, PageError::MissingValues { expected: 3, produced: 1 }));
    }

    /// A base cursor which fails every read.
    struct FailingReader;

    impl ValueReader for FailingReader {
        fn read_values(&mut self, _values: &mut [Value]) -> Result<ValueRead, PageError> {
            Err(PageError::Closed)
        }
    }

    #[test]
    fn test_interleave_keeps_nulls_produced_before_base_error() {
        let definition_levels = [0, 0, 1];
        let mut levels = LevelCursor::optional(Some(1), 1, &definition_levels);

        let mut values = vec![Value::null().with_levels(0, 9); 4];
        let read = interleave_levels(&mut levels, &mut FailingReader, &mut values).unwrap();
        assert_eq!(read, ValueRead { count: 2, eof: false });
        assert_eq!(levels.offset(), 2);
        for value in &values[..2] {
            assert_eq!(*value, Value::null().with_levels(0, 0).with_column(Some(1)));
        }

        let err = interleave_levels(&mut levels, &mut FailingReader, &mut values)
            .expect_err("Base error should be reported");
        assert!(matches!(err, PageError::Closed));
        assert_eq!(levels.offset(), 2);
    }

    #[test]
    fn test_interleave_base_error_without_progress() {
        let definition_levels = [1, 0];
        let mut levels = LevelCursor::optional(None, 1, &definition_levels);

        let mut values = vec![Value::null(); 4];
        let err = interleave_levels(&mut levels, &mut FailingReader, &mut values)
            .expect_err("Base error should be reported");
        assert!(matches!(err, PageError::Closed));
        assert_eq!(levels.offset(), 0);
    }

    #[test]
    fn test_interleave_empty_levels() {
        let mut levels = LevelCursor::optional(None, 1, &[]);
        let mut base = StubReader::new(vec![], usize::MAX);
        let mut values = vec![Value::null(); 4];
        let read = interleave_levels(&mut levels, &mut base, &mut values).unwrap();
        assert_eq!(read, ValueRead { count: 0, eof: true });
        assert!(base.calls.is_empty());
    }

    #[test]
    fn test_read_all_drains_batches() {
        let definition_levels: Vec<i8> = (0..200).map(|i| (i % 3 != 0) as i8).collect();
        let num_present = count_levels_equal(&definition_levels, 1);
        let levels = LevelCursor::optional(None, 1, &definition_levels);
        let base = StubReader::new((0..num_present as i32).collect(), usize::MAX);

        struct Merged<'a> {
            levels: LevelCursor<'a>,
            base: StubReader,
        }

        impl ValueReader for Merged<'_> {
            fn read_values(&mut self, values: &mut [Value]) -> Result<ValueRead, PageError> {
                interleave_levels(&mut self.levels, &mut self.base, values)
            }
        }

        let mut merged = Merged { levels, base };
        let values = read_all_values(&mut merged).unwrap();
        assert_eq!(values.len(), 200);
        assert_eq!(values.iter().filter(|v| v.is_null()).count(), 200 - num_present);
    }
}
