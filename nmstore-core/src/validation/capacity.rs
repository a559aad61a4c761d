//! Element counting and shape validation
//!
//! The maximum element count of a shape is the product of its extents. Dense
//! backends size their buffers with it, sparse backends measure density
//! against it, and bulk operations check it before allocating. Multiplying
//! many extents together is a realistic overflow site for high-rank storages,
//! so every product here is checked.

use crate::StorageError;

/// Largest element count an allocation can address
pub const MAX_ADDRESSABLE: usize = isize::MAX as usize;

/// Count the addressable elements of a shape
///
/// Returns the product of all extents. Fails with `Overflow` when the product
/// wraps or exceeds [`MAX_ADDRESSABLE`].
pub const fn count_max_elements(shape: &[usize]) -> Result<usize, StorageError> {
    let mut count: usize = 1;
    let mut dim = 0;
    while dim < shape.len() {
        count = match count.checked_mul(shape[dim]) {
            Some(count) => count,
            None => return Err(StorageError::Overflow),
        };
        dim += 1;
    }

    if count > MAX_ADDRESSABLE {
        return Err(StorageError::Overflow);
    }

    Ok(count)
}

/// Validate a storage shape and return its element count
///
/// A shape must have rank >= 1 and every extent must be non-zero.
pub const fn validate_shape(shape: &[usize]) -> Result<usize, StorageError> {
    if shape.is_empty() {
        return Err(StorageError::InvalidShape);
    }

    let mut dim = 0;
    while dim < shape.len() {
        if shape[dim] == 0 {
            return Err(StorageError::InvalidShape);
        }
        dim += 1;
    }

    count_max_elements(shape)
}

/// Fraction of the addressable elements that are physically stored
pub fn density(element_count: usize, max_elements: usize) -> f64 {
    if max_elements == 0 {
        return 0.0;
    }
    element_count as f64 / max_elements as f64
}
