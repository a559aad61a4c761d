//! Dense row-major storage
//!
//! Elements live in one contiguous buffer sized exactly by the shape's
//! element count. The buffer can be viewed as raw bytes for hand-off to
//! code that works on untyped memory.

use nmstore_core::validation::{row_major_offset, validate_coords, validate_shape};
use nmstore_core::traits::storage::check_source_shape;
use nmstore_core::{
    DType, Element, Result, Slice, Storage, StorageError, StorageInfo, StorageType,
};

/// Contiguous row-major storage
#[derive(Debug, Clone, PartialEq)]
pub struct DenseStorage<T: Element> {
    shape: Vec<usize>,
    elements: Vec<T>,
}

impl<T: Element> DenseStorage<T> {
    /// Create a storage from a shape and its row-major elements
    pub fn new(shape: &[usize], elements: Vec<T>) -> Result<Self> {
        let len = validate_shape(shape)?;
        if elements.len() != len {
            return Err(StorageError::ShapeMismatch {
                expected: len,
                actual: elements.len(),
            });
        }

        Ok(Self {
            shape: shape.to_vec(),
            elements,
        })
    }

    /// Create a storage with every element set to `value`
    pub fn filled(shape: &[usize], value: T) -> Result<Self> {
        let len = validate_shape(shape)?;
        Ok(Self {
            shape: shape.to_vec(),
            elements: vec![value; len],
        })
    }

    pub fn zeros(shape: &[usize]) -> Result<Self> {
        Self::filled(shape, T::zero())
    }

    /// Create a storage from native-endian row-major bytes
    ///
    /// The byte slice does not need to be aligned for `T`.
    pub fn from_bytes(shape: &[usize], bytes: &[u8]) -> Result<Self> {
        let len = validate_shape(shape)?;
        let expected = len
            .checked_mul(T::size_bytes())
            .ok_or(StorageError::Overflow)?;
        if bytes.len() != expected {
            return Err(StorageError::ShapeMismatch {
                expected,
                actual: bytes.len(),
            });
        }

        Ok(Self {
            shape: shape.to_vec(),
            elements: bytemuck::pod_collect_to_vec(bytes),
        })
    }

    /// View the buffer as raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.elements)
    }

    /// Row-major elements
    pub fn elements(&self) -> &[T] {
        &self.elements
    }

    pub fn elements_mut(&mut self) -> &mut [T] {
        &mut self.elements
    }

    pub fn into_elements(self) -> Vec<T> {
        self.elements
    }

    /// Dense storage has no implicit elements; zero is what sparse
    /// conversions skip
    pub fn default_value(&self) -> T {
        T::zero()
    }

    /// Elements that are not exactly zero, with their coordinates, in
    /// row-major order
    ///
    /// `-0.0` counts as non-zero so its sign survives conversion.
    pub fn entries(&self) -> Vec<(Vec<usize>, T)> {
        match Slice::full(&self.shape) {
            Ok(full) => full
                .positions()
                .zip(&self.elements)
                .filter(|(_, value)| !value.is_zero())
                .map(|((_, coords), value)| (coords, *value))
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    fn offset(&self, coords: &[usize]) -> Result<usize> {
        validate_coords(coords, &self.shape)?;
        Ok(row_major_offset(coords, &self.shape))
    }
}

impl<T: Element> StorageInfo for DenseStorage<T> {
    fn dtype(&self) -> DType {
        T::DTYPE
    }

    fn stype(&self) -> StorageType {
        StorageType::Dense
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn element_count(&self) -> usize {
        self.elements.len()
    }
}

impl<T: Element> Storage for DenseStorage<T> {
    type Element = T;

    fn get(&self, coords: &[usize]) -> Result<T> {
        Ok(self.elements[self.offset(coords)?])
    }

    fn set(&mut self, coords: &[usize], value: T) -> Result<()> {
        let offset = self.offset(coords)?;
        self.elements[offset] = value;
        Ok(())
    }

    fn get_slice(&self, slice: &Slice) -> Result<Self> {
        slice.validate(&self.shape)?;

        if slice.is_single() {
            let value = self.get(slice.coords())?;
            return Ok(Self {
                shape: slice.lengths().to_vec(),
                elements: vec![value],
            });
        }

        let elements = slice
            .positions()
            .map(|(_, absolute)| self.elements[row_major_offset(&absolute, &self.shape)])
            .collect();
        Ok(Self {
            shape: slice.lengths().to_vec(),
            elements,
        })
    }

    fn set_slice(&mut self, slice: &Slice, source: &Self) -> Result<()> {
        slice.validate(&self.shape)?;
        check_source_shape(slice, &source.shape)?;

        // Source is row-major over the region, same order as positions()
        for ((_, absolute), value) in slice.positions().zip(&source.elements) {
            let offset = row_major_offset(&absolute, &self.shape);
            self.elements[offset] = *value;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DenseStorage<i32> {
        DenseStorage::new(&[2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap()
    }

    #[test]
    fn test_new_validates_length() {
        assert_eq!(
            DenseStorage::new(&[2, 3], vec![1, 2, 3]),
            Err(StorageError::ShapeMismatch {
                expected: 6,
                actual: 3
            })
        );
        assert_eq!(
            DenseStorage::<f64>::zeros(&[2, 0]),
            Err(StorageError::InvalidShape)
        );
    }

    #[test]
    fn test_get_set() {
        let mut storage = sample();
        assert_eq!(storage.get(&[1, 2]), Ok(6));

        storage.set(&[0, 1], 20).unwrap();
        assert_eq!(storage.get(&[0, 1]), Ok(20));
        assert_eq!(storage.element_count(), 6);
        assert_eq!(storage.max_elements(), Ok(6));
    }

    #[test]
    fn test_out_of_bounds_leaves_storage_unchanged() {
        let mut storage = DenseStorage::new(&[3], vec![1.0f64, 2.0, 3.0]).unwrap();
        let err = StorageError::OutOfBounds {
            dim: 0,
            index: 5,
            extent: 3,
        };
        assert_eq!(storage.get(&[5]), Err(err));
        assert_eq!(storage.set(&[5], 9.0), Err(err));
        assert_eq!(storage.elements(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_get_slice() {
        let storage = sample();
        let slice = Slice::from_ranges(&[0..2, 1..3]).unwrap();
        let sub = storage.get_slice(&slice).unwrap();

        assert_eq!(sub.shape(), &[2, 2]);
        assert_eq!(sub.elements(), &[2, 3, 5, 6]);
    }

    #[test]
    fn test_get_slice_single() {
        let storage = sample();
        let slice = Slice::new(vec![0, 0], vec![1, 1]).unwrap();
        assert!(slice.is_single());

        let sub = storage.get_slice(&slice).unwrap();
        assert_eq!(sub.shape(), &[1, 1]);
        assert_eq!(sub.element_count(), 1);
        assert_eq!(sub.get(&[0, 0]), Ok(1));
    }

    #[test]
    fn test_slice_is_a_copy() {
        let storage = sample();
        let mut sub = storage.get_slice(&Slice::full(&[2, 3]).unwrap()).unwrap();
        sub.set(&[0, 0], 100).unwrap();

        assert_eq!(storage.get(&[0, 0]), Ok(1));
        assert_eq!(sub.get(&[0, 0]), Ok(100));
    }

    #[test]
    fn test_set_slice() {
        let mut storage = DenseStorage::<i32>::zeros(&[3, 3]).unwrap();
        let source = DenseStorage::new(&[2, 2], vec![1, 2, 3, 4]).unwrap();
        storage
            .set_slice(&Slice::from_ranges(&[1..3, 1..3]).unwrap(), &source)
            .unwrap();

        assert_eq!(storage.elements(), &[0, 0, 0, 0, 1, 2, 0, 3, 4]);
    }

    #[test]
    fn test_bytes_round_trip() {
        let storage = DenseStorage::new(&[2], vec![1.5f32, -2.0]).unwrap();
        let bytes = storage.as_bytes().to_vec();
        assert_eq!(bytes.len(), 8);

        let restored = DenseStorage::<f32>::from_bytes(&[2], &bytes).unwrap();
        assert_eq!(restored, storage);
        assert_eq!(
            DenseStorage::<f32>::from_bytes(&[3], &bytes),
            Err(StorageError::ShapeMismatch {
                expected: 12,
                actual: 8
            })
        );
    }

    #[test]
    fn test_entries_skip_zeros() {
        let storage = DenseStorage::new(&[2, 2], vec![0, 7, 0, 9]).unwrap();
        assert_eq!(
            storage.entries(),
            vec![(vec![0, 1], 7), (vec![1, 1], 9)]
        );

        let signed = DenseStorage::new(&[3], vec![0.0f32, -0.0, 2.0]).unwrap();
        let coords: Vec<_> = signed.entries().into_iter().map(|(c, _)| c).collect();
        assert_eq!(coords, vec![vec![1], vec![2]]);
    }
}
