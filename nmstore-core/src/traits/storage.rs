//! Storage capability traits
//!
//! [`StorageInfo`] is the object-safe half of the contract: shape and size
//! introspection that pairing and casting decisions need. [`Storage`] adds
//! typed element access and slicing.

use alloc::vec::Vec;

use super::element::Element;
use crate::dtype::{DType, StorageType};
use crate::slice::Slice;
use crate::validation::count_max_elements;
use crate::{Result, StorageError};

/// Shape and size introspection shared by every backend
pub trait StorageInfo {
    /// Element type of the stored values
    fn dtype(&self) -> DType;

    /// Physical layout of this storage
    fn stype(&self) -> StorageType;

    /// Extent of every dimension
    fn shape(&self) -> &[usize];

    /// Number of dimensions
    fn rank(&self) -> usize {
        self.shape().len()
    }

    /// Number of elements physically stored
    ///
    /// Equal to [`StorageInfo::max_elements`] for dense storage, usually less
    /// for sparse storage.
    fn element_count(&self) -> usize;

    /// Number of addressable elements, the product of the shape
    fn max_elements(&self) -> Result<usize> {
        count_max_elements(self.shape())
    }
}

/// Typed element access and slicing
///
/// All operations check bounds before reading or writing; a failed call
/// leaves the storage unchanged.
pub trait Storage: StorageInfo + Sized {
    /// The element type stored in this storage
    type Element: Element;

    /// Get the element at `coords`
    fn get(&self, coords: &[usize]) -> Result<Self::Element>;

    /// Overwrite the element at `coords`
    fn set(&mut self, coords: &[usize], value: Self::Element) -> Result<()>;

    /// Copy a region into a new storage of the same backend
    ///
    /// The result has `shape() == slice.lengths()` and owns its payload.
    fn get_slice(&self, slice: &Slice) -> Result<Self>;

    /// Copy `source` into the region described by `slice`
    ///
    /// `source` must be shaped like `slice.lengths()`.
    fn set_slice(&mut self, slice: &Slice, source: &Self) -> Result<()> {
        slice.validate(self.shape())?;
        check_source_shape(slice, source.shape())?;

        let values = slice
            .positions()
            .map(|(relative, _)| source.get(&relative))
            .collect::<Result<Vec<_>>>()?;
        for ((_, absolute), value) in slice.positions().zip(values) {
            self.set(&absolute, value)?;
        }
        Ok(())
    }

    /// Write `value` to every position of the region
    fn fill_slice(&mut self, slice: &Slice, value: Self::Element) -> Result<()> {
        slice.validate(self.shape())?;
        for (_, absolute) in slice.positions() {
            self.set(&absolute, value)?;
        }
        Ok(())
    }
}

/// Check that a source shape matches a slice's lengths
pub fn check_source_shape(slice: &Slice, shape: &[usize]) -> Result<()> {
    if shape.len() != slice.rank() {
        return Err(StorageError::WrongNumberOfIndices {
            expected: slice.rank(),
            actual: shape.len(),
        });
    }
    if let Some((&expected, &actual)) = slice
        .lengths()
        .iter()
        .zip(shape)
        .find(|(expected, actual)| expected != actual)
    {
        return Err(StorageError::ShapeMismatch { expected, actual });
    }
    Ok(())
}
