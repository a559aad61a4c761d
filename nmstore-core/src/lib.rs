#![no_std]

//! nmstore core - storage contracts for multi-representation matrices
//!
//! This crate defines what every storage backend must provide and the pure
//! decision logic that sits between backends: slice descriptors, element
//! counting, operand pairing and the casting policy. It performs no I/O and
//! contains no concrete backend.

extern crate alloc;

pub mod cast;
pub mod dtype;
pub mod error;
pub mod pair;
pub mod slice;
pub mod traits;
pub mod validation;
pub mod value;

pub use cast::{CastPlan, CastPolicy, Conversion, UpcastTable};
pub use dtype::{DType, StorageType};
pub use error::*;
pub use pair::{pair, StoragePair};
pub use slice::{Positions, Slice};
pub use traits::*;
pub use validation::{count_max_elements, validate_coords, validate_shape};
pub use value::Value;
