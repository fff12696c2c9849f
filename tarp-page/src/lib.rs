//! In-memory pages of a columnar file format.
//!
//! Pages hold the values of one column together with the repetition and
//! definition levels describing nested and optional structures. They are
//! immutable, cheap to slice and read through pull based value cursors.

mod bounds;
mod error;
mod levels;
mod page;
mod physical;
mod pipeline;
mod pool;
mod shared;
mod value;

pub use self::bounds::{compare_data, BoundsTracker, SortOrder};
pub use self::error::{CopyError, PageError};
pub use self::levels::{count_levels_equal, count_levels_not_equal, interleave_levels, LevelCursor};
pub use self::page::{
    for_each_page_slice,
    BooleanPage,
    BufferedPage,
    ByteArrayPage,
    CompressedPage,
    Dictionary,
    DoublePage,
    Encoder,
    ErrorPage,
    FixedLenByteArrayPage,
    FloatPage,
    Int32Page,
    Int64Page,
    Int96Page,
    LeafPage,
    OptionalPage,
    Page,
    PageHandle,
    RepeatedPage,
    Uint32Page,
    Uint64Page,
};
pub use self::physical::{
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
pub use self::pipeline::{
    copy_pages,
    one_page,
    page_channel,
    ChannelPageReader,
    ChannelPageWriter,
    EmptyPageReader,
    MultiPageReader,
    PageReader,
    PageWriter,
    ReusablePageReader,
    SinglePageReader,
};
pub use self::pool::{
    FileBufferPool,
    FileBufferPoolOptions,
    MemoryBufferPool,
    MemoryBufferPoolOptions,
    PageBuffer,
    PageBufferPool,
};
pub use self::shared::SharedSlice;
pub use self::value::{read_all_values, Int96, Kind, Value, ValueData, ValueRead, ValueReader};
