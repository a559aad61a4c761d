//! Shape, coordinate and capacity validation
//!
//! This module contains pure functions with no access to storage payloads.
//! Every getter, setter and slice operation runs these checks before
//! touching a backend's payload.

pub mod bounds;
pub mod capacity;
pub mod parsing;

pub use bounds::{row_major_offset, validate_coords};
pub use capacity::{count_max_elements, density, validate_shape};
pub use parsing::{parse_range, parse_slice};
