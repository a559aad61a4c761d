//! Slice descriptors
//!
//! A [`Slice`] describes an axis-aligned rectangular sub-region of a storage
//! by a start coordinate and a length per dimension. It is built once per
//! access request and never mutated. The exclusive end of every dimension
//! fits in a `usize`.

use alloc::vec;
use alloc::vec::Vec;
use core::ops::Range;

use crate::validation::count_max_elements;
use crate::{Result, StorageError};

/// Rectangular sub-region of a storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Slice {
    coords: Vec<usize>,
    lengths: Vec<usize>,
    single: bool,
}

impl Slice {
    /// Create a slice from start coordinates and lengths
    pub fn new(coords: Vec<usize>, lengths: Vec<usize>) -> Result<Self> {
        if coords.len() != lengths.len() {
            return Err(StorageError::WrongNumberOfIndices {
                expected: coords.len(),
                actual: lengths.len(),
            });
        }
        if lengths.is_empty() || lengths.contains(&0) {
            return Err(StorageError::InvalidShape);
        }
        if coords
            .iter()
            .zip(&lengths)
            .any(|(start, length)| start.checked_add(*length).is_none())
        {
            return Err(StorageError::Overflow);
        }

        let single = lengths.iter().all(|&length| length == 1);
        Ok(Self {
            coords,
            lengths,
            single,
        })
    }

    /// Slice addressing exactly one element
    pub fn single(coords: Vec<usize>) -> Result<Self> {
        let lengths = vec![1; coords.len()];
        Self::new(coords, lengths)
    }

    /// Slice covering a whole storage of the given shape
    pub fn full(shape: &[usize]) -> Result<Self> {
        Self::new(vec![0; shape.len()], shape.to_vec())
    }

    /// Create a slice from one half-open range per dimension
    pub fn from_ranges(ranges: &[Range<usize>]) -> Result<Self> {
        let mut coords = Vec::with_capacity(ranges.len());
        let mut lengths = Vec::with_capacity(ranges.len());
        for range in ranges {
            if range.start > range.end {
                return Err(StorageError::InvalidShape);
            }
            coords.push(range.start);
            lengths.push(range.end - range.start);
        }
        Self::new(coords, lengths)
    }

    /// Start coordinate of the region
    pub fn coords(&self) -> &[usize] {
        &self.coords
    }

    /// Extent of the region along each dimension
    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    /// True iff every length equals 1
    pub fn is_single(&self) -> bool {
        self.single
    }

    pub fn rank(&self) -> usize {
        self.coords.len()
    }

    /// Exclusive end coordinate along `dim`
    pub fn end(&self, dim: usize) -> usize {
        self.coords[dim] + self.lengths[dim]
    }

    /// Whether an absolute coordinate falls inside the region
    pub fn contains(&self, coords: &[usize]) -> bool {
        coords.len() == self.rank()
            && coords.iter().enumerate().all(|(dim, &index)| {
                index >= self.coords[dim] && index - self.coords[dim] < self.lengths[dim]
            })
    }

    /// Number of elements in the region
    pub fn element_count(&self) -> Result<usize> {
        count_max_elements(&self.lengths)
    }

    /// Validate the region against a storage shape
    ///
    /// Every dimension must satisfy `coords[dim] + lengths[dim] <= shape[dim]`.
    /// The reported index is the last coordinate the region would touch.
    pub fn validate(&self, shape: &[usize]) -> Result<()> {
        if self.rank() != shape.len() {
            return Err(StorageError::WrongNumberOfIndices {
                expected: shape.len(),
                actual: self.rank(),
            });
        }

        for (dim, &extent) in shape.iter().enumerate() {
            let end = self.end(dim);
            if end > extent {
                return Err(StorageError::OutOfBounds {
                    dim,
                    index: end - 1,
                    extent,
                });
            }
        }

        Ok(())
    }

    /// Iterate the region in row-major order
    ///
    /// Yields `(relative, absolute)` coordinate pairs, where `relative` indexes
    /// into a storage shaped like [`Slice::lengths`].
    pub fn positions(&self) -> Positions<'_> {
        Positions {
            slice: self,
            relative: vec![0; self.rank()],
            done: false,
        }
    }
}

impl core::str::FromStr for Slice {
    type Err = StorageError;

    /// Parse a comma-separated list of `start:end` ranges or single indices
    fn from_str(s: &str) -> Result<Self> {
        crate::validation::parsing::parse_slice(s)
    }
}

/// Row-major iterator over the positions of a [`Slice`]
pub struct Positions<'a> {
    slice: &'a Slice,
    relative: Vec<usize>,
    done: bool,
}

impl Iterator for Positions<'_> {
    type Item = (Vec<usize>, Vec<usize>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let relative = self.relative.clone();
        let absolute = relative
            .iter()
            .zip(&self.slice.coords)
            .map(|(offset, start)| start + offset)
            .collect();

        // Advance, last dimension fastest
        self.done = true;
        for dim in (0..self.relative.len()).rev() {
            self.relative[dim] += 1;
            if self.relative[dim] < self.slice.lengths[dim] {
                self.done = false;
                break;
            }
            self.relative[dim] = 0;
        }

        Some((relative, absolute))
    }
}
