use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use tracing::trace;

use crate::error::PageError;
use crate::levels::{count_levels_equal, count_levels_not_equal, LevelCursor, LevelledValueReader};
use crate::page::{check_slice_bounds, BufferedPage, Dictionary, Encoder, Page, PageHandle};
use crate::shared::SharedSlice;
use crate::value::{Value, ValueReader};

#[derive(Clone)]
/// A page of a repeated column.
///
/// Every logical value carries a repetition level and a definition level. A
/// repetition level different from the maximum repetition level starts a new
/// row, rows therefore span one or more values and slicing is done in rows.
pub struct RepeatedPage {
    base: PageHandle,
    max_repetition_level: i8,
    max_definition_level: i8,
    repetition_levels: SharedSlice<i8>,
    definition_levels: SharedSlice<i8>,
}

impl RepeatedPage {
    /// Wraps `base` with the given level arrays.
    ///
    /// Both level arrays must have the same length and the number of
    /// definition levels equal to `max_definition_level` must match the
    /// number of values in `base`.
    pub fn new(
        base: PageHandle,
        max_repetition_level: i8,
        max_definition_level: i8,
        repetition_levels: impl Into<SharedSlice<i8>>,
        definition_levels: impl Into<SharedSlice<i8>>,
    ) -> Self {
        let repetition_levels = repetition_levels.into();
        let definition_levels = definition_levels.into();
        debug_assert_eq!(
            repetition_levels.len(),
            definition_levels.len(),
            "Repetition and definition levels should have the same length",
        );
        debug_assert_eq!(
            count_levels_equal(&definition_levels, max_definition_level),
            base.num_values(),
            "Present definition levels should match the number of base values",
        );

        Self {
            base,
            max_repetition_level,
            max_definition_level,
            repetition_levels,
            definition_levels,
        }
    }

    #[inline]
    pub fn max_repetition_level(&self) -> i8 {
        self.max_repetition_level
    }

    #[inline]
    pub fn max_definition_level(&self) -> i8 {
        self.max_definition_level
    }

    #[inline]
    /// Returns the page holding the present values.
    pub fn base(&self) -> &PageHandle {
        &self.base
    }

    /// Returns the level offsets at which rows `i` and `j` start.
    ///
    /// Rows which do not exist start at the end of the level arrays.
    fn row_offsets(&self, i: usize, j: usize) -> (usize, usize) {
        let num_levels = self.repetition_levels.len();
        let mut start = num_levels;
        let mut end = num_levels;

        let mut row = 0;
        for (offset, &level) in self.repetition_levels.iter().enumerate() {
            if level != self.max_repetition_level {
                if row == i {
                    start = offset;
                }
                if row == j {
                    end = offset;
                    break;
                }
                row += 1;
            }
        }

        (start, end)
    }
}

impl Debug for RepeatedPage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepeatedPage")
            .field("column", &self.column())
            .field("max_repetition_level", &self.max_repetition_level)
            .field("max_definition_level", &self.max_definition_level)
            .field("num_rows", &self.num_rows())
            .field("num_values", &self.num_values())
            .finish()
    }
}

impl Page for RepeatedPage {
    fn column(&self) -> Option<usize> {
        self.base.column()
    }

    fn dictionary(&self) -> Option<&Arc<dyn Dictionary>> {
        self.base.dictionary()
    }

    fn num_rows(&self) -> usize {
        count_levels_not_equal(&self.repetition_levels, self.max_repetition_level)
    }

    fn num_values(&self) -> usize {
        self.definition_levels.len()
    }

    fn num_nulls(&self) -> usize {
        count_levels_not_equal(&self.definition_levels, self.max_definition_level)
    }

    fn bounds(&self) -> (Value, Value) {
        self.base.bounds()
    }

    fn size(&self) -> u64 {
        self.repetition_levels.len() as u64 + self.definition_levels.len() as u64 + self.base.size()
    }

    fn values(&self) -> Box<dyn ValueReader + '_> {
        let levels = LevelCursor::repeated(
            self.base.column(),
            self.max_definition_level,
            &self.repetition_levels,
            &self.definition_levels,
        );
        Box::new(LevelledValueReader::new(self.base.as_ref(), levels))
    }
}

impl BufferedPage for RepeatedPage {
    fn slice(&self, i: usize, j: usize) -> PageHandle {
        check_slice_bounds(i, j, self.num_rows());

        let (start, end) = self.row_offsets(i, j);
        trace!(i, j, start, end, "Slicing repeated page");

        let nulls_before = count_levels_not_equal(
            &self.definition_levels[..start],
            self.max_definition_level,
        );
        let nulls_within = count_levels_not_equal(
            &self.definition_levels[start..end],
            self.max_definition_level,
        );

        let base_start = start - nulls_before;
        let base_end = base_start + (end - start - nulls_within);

        Arc::new(Self {
            base: self.base.slice(base_start, base_end),
            max_repetition_level: self.max_repetition_level,
            max_definition_level: self.max_definition_level,
            repetition_levels: self.repetition_levels.slice(start..end),
            definition_levels: self.definition_levels.slice(start..end),
        })
    }

    fn repetition_levels(&self) -> &[i8] {
        &self.repetition_levels
    }

    fn definition_levels(&self) -> &[i8] {
        &self.definition_levels
    }

    fn write_to(&self, encoder: &mut dyn Encoder) -> Result<(), PageError> {
        self.base.write_to(encoder)
    }
}
