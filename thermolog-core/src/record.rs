//! Fixed-size record encoding
//!
//! A record is the unit the log stores: one value serialized to a fixed
//! number of little-endian bytes. Records are compared by their encoded
//! bytes, so `-0.0` and `0.0` are distinct and a NaN sentinel matches
//! itself.

use core::fmt::Display;

/// A value that can be stored in a fixed-size log slot
pub trait Record: Copy + Display {
    /// Encoded form, always exactly [`Record::SIZE`] bytes
    type Bytes: AsRef<[u8]> + AsMut<[u8]> + Default + PartialEq;

    /// Encoded size in bytes
    const SIZE: usize;

    /// Serialize to little-endian bytes
    fn to_bytes(&self) -> Self::Bytes;

    /// Deserialize from little-endian bytes
    fn from_bytes(bytes: &Self::Bytes) -> Self;
}

macro_rules! impl_record {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Record for $ty {
                type Bytes = [u8; core::mem::size_of::<$ty>()];

                const SIZE: usize = core::mem::size_of::<$ty>();

                fn to_bytes(&self) -> Self::Bytes {
                    self.to_le_bytes()
                }

                fn from_bytes(bytes: &Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(*bytes)
                }
            }
        )*
    };
}

impl_record!(f32, f64, i16, u16, i32, u32);
