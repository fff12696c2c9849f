use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::error::PageError;
use crate::levels::{count_levels_equal, count_levels_not_equal, LevelCursor, LevelledValueReader};
use crate::page::{check_slice_bounds, BufferedPage, Dictionary, Encoder, Page, PageHandle};
use crate::shared::SharedSlice;
use crate::value::{Value, ValueReader};

#[derive(Clone)]
/// A page of an optional column.
///
/// The wrapped page only holds the present values, the definition levels
/// have one entry per logical value and mark as null every entry below the
/// maximum definition level.
pub struct OptionalPage {
    base: PageHandle,
    max_definition_level: i8,
    definition_levels: SharedSlice<i8>,
}

impl OptionalPage {
    /// Wraps `base` with the given definition levels.
    ///
    /// The number of levels equal to `max_definition_level` must match the
    /// number of values in `base`.
    pub fn new(
        base: PageHandle,
        max_definition_level: i8,
        definition_levels: impl Into<SharedSlice<i8>>,
    ) -> Self {
        let definition_levels = definition_levels.into();
        debug_assert_eq!(
            count_levels_equal(&definition_levels, max_definition_level),
            base.num_values(),
            "Present definition levels should match the number of base values",
        );

        Self {
            base,
            max_definition_level,
            definition_levels,
        }
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
}

impl Debug for OptionalPage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionalPage")
            .field("column", &self.column())
            .field("max_definition_level", &self.max_definition_level)
            .field("num_values", &self.num_values())
            .field("num_nulls", &self.num_nulls())
            .finish()
    }
}

impl Page for OptionalPage {
    fn column(&self) -> Option<usize> {
        self.base.column()
    }

    fn dictionary(&self) -> Option<&Arc<dyn Dictionary>> {
        self.base.dictionary()
    }

    fn num_rows(&self) -> usize {
        self.definition_levels.len()
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
        self.definition_levels.len() as u64 + self.base.size()
    }

    fn values(&self) -> Box<dyn ValueReader + '_> {
        let levels = LevelCursor::optional(
            self.base.column(),
            self.max_definition_level,
            &self.definition_levels,
        );
        Box::new(LevelledValueReader::new(self.base.as_ref(), levels))
    }
}

impl BufferedPage for OptionalPage {
    fn slice(&self, i: usize, j: usize) -> PageHandle {
        check_slice_bounds(i, j, self.definition_levels.len());

        let levels = &self.definition_levels;
        let nulls_before = count_levels_not_equal(&levels[..i], self.max_definition_level);
        let nulls_within = count_levels_not_equal(&levels[i..j], self.max_definition_level);

        let base_start = i - nulls_before;
        let base_end = j - (nulls_before + nulls_within);

        Arc::new(Self {
            base: self.base.slice(base_start, base_end),
            max_definition_level: self.max_definition_level,
            definition_levels: levels.slice(i..j),
        })
    }

    fn repetition_levels(&self) -> &[i8] {
        &[]
    }

    fn definition_levels(&self) -> &[i8] {
        &self.definition_levels
    }

    fn write_to(&self, encoder: &mut dyn Encoder) -> Result<(), PageError> {
        self.base.write_to(encoder)
    }
}
