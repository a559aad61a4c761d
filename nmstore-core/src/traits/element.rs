//! Element type constraints for storage backends
//!
//! This module defines the trait that constrains what Rust types can be
//! stored as matrix elements, and ties each one to its [`DType`] tag.

use crate::dtype::DType;
use crate::value::{value_as, Value};

/// Trait for types that can be stored as matrix elements
///
/// All element types must be:
/// - Pod: plain bytes, so dense buffers can be viewed as `&[u8]`
/// - PartialEq: comparisons between storages
/// - Debug + Send + Sync: storages can be shared across threads for reads
pub trait Element:
    bytemuck::Pod + PartialEq + core::fmt::Debug + Send + Sync + 'static
{
    /// The element-type tag for this type
    const DTYPE: DType;

    /// Additive identity, the implicit default of compressed storage
    fn zero() -> Self;

    /// Wrap in a dynamically typed [`Value`]
    fn into_value(self) -> Value;

    /// Convert from any [`Value`] with `as` semantics
    fn from_value(value: Value) -> Self;

    /// Convert from another element type with `as` semantics
    fn cast_from<U: Element>(value: U) -> Self {
        Self::from_value(value.into_value())
    }

    /// Bitwise equality
    ///
    /// Sparse backends use this to decide whether a value is the default, so
    /// `-0.0` is kept apart from `0.0` and a NaN default matches itself.
    fn same_bits(&self, other: &Self) -> bool {
        bytemuck::bytes_of(self) == bytemuck::bytes_of(other)
    }

    /// Whether this is exactly [`Element::zero`]
    fn is_zero(&self) -> bool {
        self.same_bits(&Self::zero())
    }

    /// Get the size in bytes of this element type
    fn size_bytes() -> usize {
        core::mem::size_of::<Self>()
    }
}

macro_rules! impl_element {
    ($t:ty, $variant:ident, $zero:expr) => {
        impl Element for $t {
            const DTYPE: DType = DType::$variant;

            fn zero() -> Self {
                $zero
            }

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn from_value(value: Value) -> Self {
                value_as!(value, $t)
            }
        }
    };
}

impl_element!(u8, Byte, 0);
impl_element!(i8, Int8, 0);
impl_element!(i16, Int16, 0);
impl_element!(i32, Int32, 0);
impl_element!(i64, Int64, 0);
impl_element!(f32, Float32, 0.0);
impl_element!(f64, Float64, 0.0);
