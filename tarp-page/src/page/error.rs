use std::sync::Arc;

use crate::error::PageError;
use crate::page::{BufferedPage, Dictionary, Encoder, Page, PageHandle};
use crate::value::{Value, ValueRead, ValueReader};

#[derive(Debug, Clone)]
/// A placeholder for a page which could not be produced.
///
/// The page is empty, every attempt to read or write its values
/// fails with the error it was created with.
pub struct ErrorPage {
    error: PageError,
}

impl ErrorPage {
    /// Creates a page failing with [PageError::Unavailable].
    pub fn new(column: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            error: PageError::Unavailable {
                column,
                message: message.into(),
            },
        }
    }

    #[inline]
    /// Returns the error carried by the page.
    pub fn error(&self) -> &PageError {
        &self.error
    }
}

impl Page for ErrorPage {
    fn column(&self) -> Option<usize> {
        match &self.error {
            PageError::Unavailable { column, .. } => *column,
            _ => None,
        }
    }

    fn dictionary(&self) -> Option<&Arc<dyn Dictionary>> {
        None
    }

    fn num_rows(&self) -> usize {
        0
    }

    fn num_values(&self) -> usize {
        0
    }

    fn num_nulls(&self) -> usize {
        0
    }

    fn bounds(&self) -> (Value, Value) {
        (Value::default(), Value::default())
    }

    fn size(&self) -> u64 {
        0
    }

    fn values(&self) -> Box<dyn ValueReader + '_> {
        Box::new(ErrorValueReader { error: &self.error })
    }
}

impl BufferedPage for ErrorPage {
    fn slice(&self, _i: usize, _j: usize) -> PageHandle {
        Arc::new(self.clone())
    }

    fn repetition_levels(&self) -> &[i8] {
        &[]
    }

    fn definition_levels(&self) -> &[i8] {
        &[]
    }

    fn write_to(&self, _encoder: &mut dyn Encoder) -> Result<(), PageError> {
        Err(self.error.clone())
    }
}

struct ErrorValueReader<'a> {
    error: &'a PageError,
}

impl ValueReader for ErrorValueReader<'_> {
    fn read_values(&mut self, _values: &mut [Value]) -> Result<ValueRead, PageError> {
        Err(self.error.clone())
    }
}
