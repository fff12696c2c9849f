//! Page abstractions.
//!
//! A page is an indivisible run of values of one column inside a column chunk.
//! Leaf pages hold flat arrays of a single physical type, the
//! [OptionalPage] and [RepeatedPage] decorators overlay level arrays on top of
//! any buffered page to express nullable and nested columns.
//!
//! Pages are immutable once built, every query and every call to
//! [Page::values] may be issued concurrently from any number of threads.

mod error;
mod leaf;
mod optional;
mod repeated;

use std::fmt::Debug;
use std::io;
use std::io::Read;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, instrument};

pub use self::error::ErrorPage;
pub use self::leaf::{
    BooleanPage,
    ByteArrayPage,
    DoublePage,
    FixedLenByteArrayPage,
    FloatPage,
    Int32Page,
    Int64Page,
    Int96Page,
    LeafPage,
    Uint32Page,
    Uint64Page,
};
pub use self::optional::OptionalPage;
pub use self::repeated::RepeatedPage;
use crate::value::{Int96, Kind, Value, ValueReader};
use crate::PageError;

/// A page which is cheap to clone and share between threads.
pub type PageHandle = Arc<dyn BufferedPage>;

/// A dictionary of values that indexed pages look values up in.
///
/// Dictionaries are owned outside of pages, a page only forwards
/// the reference.
pub trait Dictionary: Debug + Send + Sync {
    /// The physical type of the values in the dictionary.
    fn kind(&self) -> Kind;

    /// The number of entries in the dictionary.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up the value at the given index.
    fn index(&self, index: usize) -> Value;
}

/// The encoding capability a buffered page writes its values to.
///
/// There is one method per physical type, implementations decide the
/// actual on-disk representation.
pub trait Encoder {
    fn encode_boolean(&mut self, values: &[bool]) -> io::Result<()>;

    fn encode_int32(&mut self, values: &[i32]) -> io::Result<()>;

    fn encode_int64(&mut self, values: &[i64]) -> io::Result<()>;

    fn encode_int96(&mut self, values: &[Int96]) -> io::Result<()>;

    fn encode_float(&mut self, values: &[f32]) -> io::Result<()>;

    fn encode_double(&mut self, values: &[f64]) -> io::Result<()>;

    fn encode_byte_array(&mut self, values: &[Bytes]) -> io::Result<()>;

    /// Encodes `data.len() / size` values of `size` bytes each.
    fn encode_fixed_len_byte_array(&mut self, size: usize, data: &[u8]) -> io::Result<()>;
}

/// A sequence of values belonging to a single column.
pub trait Page: Send + Sync {
    /// Returns the index of the column the page belongs to,
    /// `None` if the page was never assigned to one.
    fn column(&self) -> Option<usize>;

    /// Returns the dictionary values are looked up in, if the page
    /// holds indexed values.
    fn dictionary(&self) -> Option<&Arc<dyn Dictionary>>;

    /// Returns the number of rows in the page.
    ///
    /// This may be less than the number of values if the page is part of
    /// a repeated column.
    fn num_rows(&self) -> usize;

    /// Returns the number of values in the page, nulls included.
    fn num_values(&self) -> usize;

    /// Returns the number of null values in the page.
    fn num_nulls(&self) -> usize;

    /// Returns the min and max values of the page.
    ///
    /// Both bounds are null values when the page holds no values, callers
    /// should check [Page::num_values] before trusting the result.
    fn bounds(&self) -> (Value, Value);

    /// Returns the uncompressed size of the page in bytes.
    fn size(&self) -> u64;

    /// Returns a new cursor over the values of the page.
    ///
    /// Every cursor keeps its own position, independent from other cursors
    /// over the same page.
    fn values(&self) -> Box<dyn ValueReader + '_>;
}

/// A page which is buffered in memory.
pub trait BufferedPage: Page {
    /// Returns the page covering rows `i..j` of this page.
    ///
    /// The returned page shares the backing arrays of this page.
    ///
    /// # Panics
    ///
    /// If `i > j` or `j` is greater than the number of rows in the page.
    fn slice(&self, i: usize, j: usize) -> PageHandle;

    /// Returns the repetition levels of the page, empty when the
    /// column is not repeated.
    fn repetition_levels(&self) -> &[i8];

    /// Returns the definition levels of the page, empty when the
    /// column is neither optional nor repeated.
    fn definition_levels(&self) -> &[i8];

    /// Writes the values of the page to the given encoder.
    fn write_to(&self, encoder: &mut dyn Encoder) -> Result<(), PageError>;
}

/// A page which has been compressed to its on-file representation.
///
/// Framing, compression and checksums are produced by the file layer,
/// this only describes what it exposes.
pub trait CompressedPage: Page {
    /// The page header representation of the file format.
    type Header;

    /// Returns the page header.
    fn page_header(&self) -> &Self::Header;

    /// Returns a reader over the compressed bytes of the page.
    fn page_data(&self) -> Box<dyn Read + '_>;

    /// Returns the size of the compressed page data.
    fn page_size(&self) -> u64;

    /// Returns the IEEE CRC32 checksum of the page data.
    fn crc(&self) -> u32;
}

#[track_caller]
/// Aborts if `i..j` is not a valid sub-range of `0..len`.
pub(crate) fn check_slice_bounds(i: usize, j: usize, len: usize) {
    if i > j || j > len {
        panic!("page bounds out of range [{i}:{j}]: with length {len}");
    }
}

#[instrument(skip(page, callback), fields(num_rows = page.num_rows(), size = page.size()))]
/// Splits the page into row slices of roughly `want_size` bytes.
///
/// The rows are spread evenly between `ceil(size / want_size)` slices, the
/// callback is invoked once with the page itself if that is fewer than two.
/// Pages without rows produce no callback at all. Stops at the first error
/// returned by the callback.
///
/// # Panics
///
/// If `want_size` is zero.
pub fn for_each_page_slice<E>(
    page: &PageHandle,
    want_size: u64,
    mut callback: impl FnMut(PageHandle) -> Result<(), E>,
) -> Result<(), E> {
    assert!(want_size > 0, "Wanted page slice size should be greater than zero");

    let num_rows = page.num_rows();
    if num_rows == 0 {
        return Ok(());
    }

    let mut num_pages = page.size().div_ceil(want_size) as usize;
    if num_pages < 2 {
        return callback(page.clone());
    }

    debug!(num_pages, "Splitting page");
    let mut row_index = 0;
    while num_pages > 0 {
        let last_row_index = row_index + ((num_rows - row_index) / num_pages);
        callback(page.slice(row_index, last_row_index))?;
        row_index = last_row_index;
        num_pages -= 1;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;
    use crate::value::read_all_values;

    #[test]
    #[should_panic(expected = "page bounds out of range [3:2]: with length 4")]
    fn test_inverted_bounds_abort() {
        check_slice_bounds(3, 2, 4);
    }

    #[test]
    fn test_valid_bounds() {
        check_slice_bounds(0, 0, 0);
        check_slice_bounds(1, 4, 4);
    }

    #[test]
    fn test_split_small_page_is_passed_through() {
        let page: PageHandle = Arc::new(Int64Page::new(vec![1i64, 2, 3]));

        let mut slices = Vec::new();
        for_each_page_slice(&page, 1024, |slice| {
            slices.push(slice);
            Ok::<_, Infallible>(())
        })
        .unwrap();

        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].num_rows(), 3);
    }

    #[test]
    fn test_split_page_into_even_slices() {
        let values: Vec<i32> = (0..10).collect();
        let page: PageHandle = Arc::new(Int32Page::new(values));

        let mut rows = Vec::new();
        let mut collected = Vec::new();
        for_each_page_slice(&page, 12, |slice| {
            rows.push(slice.num_rows());
            collected.extend(read_all_values(slice.values().as_mut())?);
            Ok::<_, PageError>(())
        })
        .unwrap();

        // 40 bytes at 12 bytes per slice gives 4 slices.
        assert_eq!(rows, vec![2, 2, 3, 3]);
        let expected: Vec<i32> = (0..10).collect();
        let actual: Vec<i32> = collected.iter().filter_map(Value::as_i32).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_split_stops_on_error() {
        let page: PageHandle = Arc::new(Int32Page::new((0..10).collect::<Vec<i32>>()));

        let mut calls = 0;
        let result = for_each_page_slice(&page, 4, |_| {
            calls += 1;
            if calls == 2 {
                Err("stop")
            } else {
                Ok(())
            }
        });
        assert_eq!(result, Err("stop"));
        assert_eq!(calls, 2);
    }

    #[derive(Debug, Default)]
    /// Serializes values as little-endian bytes.
    struct PlainEncoder {
        data: Vec<u8>,
    }

    impl Encoder for PlainEncoder {
        fn encode_boolean(&mut self, values: &[bool]) -> io::Result<()> {
            self.data.extend(values.iter().map(|&v| v as u8));
            Ok(())
        }

        fn encode_int32(&mut self, values: &[i32]) -> io::Result<()> {
            self.data.extend(values.iter().flat_map(|v| v.to_le_bytes()));
            Ok(())
        }

        fn encode_int64(&mut self, values: &[i64]) -> io::Result<()> {
            self.data.extend(values.iter().flat_map(|v| v.to_le_bytes()));
            Ok(())
        }

        fn encode_int96(&mut self, values: &[Int96]) -> io::Result<()> {
            for value in values {
                self.data.extend(value.0.iter().flat_map(|w| w.to_le_bytes()));
            }
            Ok(())
        }

        fn encode_float(&mut self, values: &[f32]) -> io::Result<()> {
            self.data.extend(values.iter().flat_map(|v| v.to_le_bytes()));
            Ok(())
        }

        fn encode_double(&mut self, values: &[f64]) -> io::Result<()> {
            self.data.extend(values.iter().flat_map(|v| v.to_le_bytes()));
            Ok(())
        }

        fn encode_byte_array(&mut self, values: &[Bytes]) -> io::Result<()> {
            for value in values {
                self.data.extend((value.len() as u32).to_le_bytes());
                self.data.extend_from_slice(value);
            }
            Ok(())
        }

        fn encode_fixed_len_byte_array(&mut self, _size: usize, data: &[u8]) -> io::Result<()> {
            self.data.extend_from_slice(data);
            Ok(())
        }
    }

    #[derive(Debug)]
    struct FrameHeader {
        num_values: usize,
        uncompressed_size: u64,
    }

    /// A page framed for a file, the data is stored without compression.
    struct FramedPage {
        page: PageHandle,
        header: FrameHeader,
        data: Vec<u8>,
        crc: u32,
    }

    impl FramedPage {
        fn frame(page: PageHandle) -> Result<Self, PageError> {
            let mut encoder = PlainEncoder::default();
            page.write_to(&mut encoder)?;

            let header = FrameHeader {
                num_values: page.num_values(),
                uncompressed_size: page.size(),
            };
            let crc = crc32fast::hash(&encoder.data);
            Ok(Self {
                page,
                header,
                data: encoder.data,
                crc,
            })
        }
    }

    impl Page for FramedPage {
        fn column(&self) -> Option<usize> {
            self.page.column()
        }

        fn dictionary(&self) -> Option<&Arc<dyn Dictionary>> {
            self.page.dictionary()
        }

        fn num_rows(&self) -> usize {
            self.page.num_rows()
        }

        fn num_values(&self) -> usize {
            self.header.num_values
        }

        fn num_nulls(&self) -> usize {
            self.page.num_nulls()
        }

        fn bounds(&self) -> (Value, Value) {
            self.page.bounds()
        }

        fn size(&self) -> u64 {
            self.header.uncompressed_size
        }

        fn values(&self) -> Box<dyn ValueReader + '_> {
            self.page.values()
        }
    }

    impl CompressedPage for FramedPage {
        type Header = FrameHeader;

        fn page_header(&self) -> &Self::Header {
            &self.header
        }

        fn page_data(&self) -> Box<dyn Read + '_> {
            Box::new(self.data.as_slice())
        }

        fn page_size(&self) -> u64 {
            self.data.len() as u64
        }

        fn crc(&self) -> u32 {
            self.crc
        }
    }

    #[test]
    fn test_compressed_page_checksum() {
        let base: PageHandle = Arc::new(Int32Page::new(vec![1, 2, 3, 4]).with_column(5));
        let page: PageHandle = Arc::new(OptionalPage::new(base, 1, vec![1, 1, 0, 1, 1]));
        let framed = FramedPage::frame(page.slice(1, 4)).unwrap();

        assert_eq!(framed.column(), Some(5));
        assert_eq!(framed.num_values(), 3);
        assert_eq!(framed.num_nulls(), 1);
        assert_eq!(framed.page_header().num_values, 3);
        assert_eq!(framed.page_size(), 8);
        assert_eq!(framed.size(), 3 + 8);

        let mut data = Vec::new();
        framed.page_data().read_to_end(&mut data).unwrap();
        assert_eq!(data, [2i32.to_le_bytes(), 3i32.to_le_bytes()].concat());
        assert_eq!(framed.crc(), crc32fast::hash(&data));

        let values = read_all_values(framed.values().as_mut()).unwrap();
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn test_split_empty_page() {
        let page: PageHandle = Arc::new(Int32Page::new(Vec::new()));
        let mut calls = 0;
        for_each_page_slice(&page, 4, |_| {
            calls += 1;
            Ok::<_, Infallible>(())
        })
        .unwrap();
        assert_eq!(calls, 0);
    }
}
