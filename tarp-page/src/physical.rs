//! Physical types a leaf page can store.
//!
//! Each type is a zero sized marker implementing [PhysicalType], which picks
//! the native storage, the statistics ordering and the encoder entrypoint for
//! a [LeafPage](crate::LeafPage). The `Uint32Type` and `Uint64Type` markers
//! share the storage and encoding of their signed counterparts and only
//! change how bounds are computed.

use std::fmt::Debug;
use std::io;

use bytes::Bytes;

use crate::bounds;
use crate::page::Encoder;
use crate::value::{Int96, Kind, ValueData};

/// A physical type that can be stored in a [LeafPage](crate::LeafPage).
pub trait PhysicalType: Send + Sync + 'static {
    /// The in-memory representation of a single value.
    type Native: Clone + Debug + Send + Sync + 'static;

    /// The kind of values produced by pages of this type.
    const KIND: Kind;

    /// Wraps a native value into a value payload.
    fn make_value(value: &Self::Native) -> ValueData;

    /// Computes the min and max of the values, `None` when empty.
    fn min_max(values: &[Self::Native]) -> Option<(Self::Native, Self::Native)>;

    /// Returns the size in bytes of the values.
    fn size_of(values: &[Self::Native]) -> u64;

    /// Passes the values to the matching encoder method.
    fn encode(encoder: &mut dyn Encoder, values: &[Self::Native]) -> io::Result<()>;
}

macro_rules! fixed_width_type {
    (
        $(#[$meta:meta])*
        $name:ident,
        native = $native:ty,
        kind = $kind:ident,
        width = $width:expr,
        min_max = $min_max:path,
        encode = $encode:ident $(,)?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Default, Copy, Clone)]
        pub struct $name;

        impl PhysicalType for $name {
            type Native = $native;

            const KIND: Kind = Kind::$kind;

            #[inline]
            fn make_value(value: &Self::Native) -> ValueData {
                ValueData::$kind(*value)
            }

            fn min_max(values: &[Self::Native]) -> Option<(Self::Native, Self::Native)> {
                $min_max(values)
            }

            #[inline]
            fn size_of(values: &[Self::Native]) -> u64 {
                $width * values.len() as u64
            }

            fn encode(encoder: &mut dyn Encoder, values: &[Self::Native]) -> io::Result<()> {
                encoder.$encode(values)
            }
        }
    };
}

fixed_width_type!(
    /// Boolean values, one byte per value in memory.
    BooleanType,
    native = bool,
    kind = Boolean,
    width = 1,
    min_max = bounds::min_max_bool,
    encode = encode_boolean,
);

fixed_width_type!(
    /// Signed 32-bit integers.
    Int32Type,
    native = i32,
    kind = Int32,
    width = 4,
    min_max = bounds::min_max_ord,
    encode = encode_int32,
);

fixed_width_type!(
    /// Signed 64-bit integers.
    Int64Type,
    native = i64,
    kind = Int64,
    width = 8,
    min_max = bounds::min_max_ord,
    encode = encode_int64,
);

fixed_width_type!(
    /// Legacy 96-bit integers.
    Int96Type,
    native = Int96,
    kind = Int96,
    width = 12,
    min_max = bounds::min_max_ord,
    encode = encode_int96,
);

fixed_width_type!(
    FloatType,
    native = f32,
    kind = Float,
    width = 4,
    min_max = bounds::min_max_float,
    encode = encode_float,
);

fixed_width_type!(
    DoubleType,
    native = f64,
    kind = Double,
    width = 8,
    min_max = bounds::min_max_float,
    encode = encode_double,
);

fixed_width_type!(
    /// Unsigned 32-bit integers stored in their signed bit pattern.
    Uint32Type,
    native = i32,
    kind = Int32,
    width = 4,
    min_max = bounds::min_max_u32,
    encode = encode_int32,
);

fixed_width_type!(
    /// Unsigned 64-bit integers stored in their signed bit pattern.
    Uint64Type,
    native = i64,
    kind = Int64,
    width = 8,
    min_max = bounds::min_max_u64,
    encode = encode_int64,
);

/// The size of the length prefix accounted for every byte array value.
const BYTE_ARRAY_LENGTH_PREFIX: u64 = 4;

#[derive(Debug, Default, Copy, Clone)]
/// Variable length byte strings.
///
/// Values are reference counted [Bytes], slicing a page or reading a value
/// never copies the payload.
pub struct ByteArrayType;

impl PhysicalType for ByteArrayType {
    type Native = Bytes;

    const KIND: Kind = Kind::ByteArray;

    #[inline]
    fn make_value(value: &Self::Native) -> ValueData {
        ValueData::ByteArray(value.clone())
    }

    fn min_max(values: &[Self::Native]) -> Option<(Self::Native, Self::Native)> {
        bounds::min_max_bytes(values)
    }

    fn size_of(values: &[Self::Native]) -> u64 {
        values
            .iter()
            .map(|value| BYTE_ARRAY_LENGTH_PREFIX + value.len() as u64)
            .sum()
    }

    fn encode(encoder: &mut dyn Encoder, values: &[Self::Native]) -> io::Result<()> {
        encoder.encode_byte_array(values)
    }
}
