//! Block partitioning
//!
//! Tiles a storage into rectangular blocks and copies them out in parallel.
//! Every block is an independent copy, so the results can be mutated
//! concurrently without touching the source.

use rayon::prelude::*;

use nmstore_core::validation::validate_shape;
use nmstore_core::{Result, Slice, Storage, StorageError};

use crate::dynamic::DynamicStorage;

/// Cover `shape` with blocks of `block_lengths`, in row-major block order
///
/// Blocks on the trailing edge of a dimension are truncated to fit.
pub fn partition(shape: &[usize], block_lengths: &[usize]) -> Result<Vec<Slice>> {
    validate_shape(shape)?;
    if block_lengths.len() != shape.len() {
        return Err(StorageError::WrongNumberOfIndices {
            expected: shape.len(),
            actual: block_lengths.len(),
        });
    }
    if block_lengths.contains(&0) {
        return Err(StorageError::InvalidShape);
    }

    let grid: Vec<usize> = shape
        .iter()
        .zip(block_lengths)
        .map(|(&extent, &block)| extent.div_ceil(block))
        .collect();

    Slice::full(&grid)?
        .positions()
        .map(|(block, _)| {
            let coords: Vec<usize> = block
                .iter()
                .zip(block_lengths)
                .map(|(&index, &length)| index * length)
                .collect();
            let lengths = coords
                .iter()
                .zip(block_lengths)
                .zip(shape)
                .map(|((&start, &length), &extent)| length.min(extent - start))
                .collect();
            Slice::new(coords, lengths)
        })
        .collect()
}

/// Copy every slice out of `storage` in parallel
pub fn materialize<S>(storage: &S, slices: &[Slice]) -> Result<Vec<S>>
where
    S: Storage + Send + Sync,
{
    slices.par_iter().map(|slice| storage.get_slice(slice)).collect()
}

/// Copy every slice out of a dynamically typed storage in parallel
pub fn materialize_dynamic(storage: &DynamicStorage, slices: &[Slice]) -> Result<Vec<DynamicStorage>> {
    slices.par_iter().map(|slice| storage.get_slice(slice)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DenseStorage, YaleStorage};
    use nmstore_core::{StorageInfo, Value};

    #[test]
    fn test_partition_even() {
        let blocks = partition(&[4, 4], &[2, 2]).unwrap();
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[1].coords(), &[0, 2]);
        assert_eq!(blocks[2].coords(), &[2, 0]);
        assert!(blocks.iter().all(|b| b.lengths() == [2, 2]));
    }

    #[test]
    fn test_partition_truncates_edges() {
        let blocks = partition(&[5, 3], &[2, 2]).unwrap();
        assert_eq!(blocks.len(), 6);
        assert_eq!(blocks[1].lengths(), &[2, 1]);
        assert_eq!(blocks[4].coords(), &[4, 0]);
        assert_eq!(blocks[5].lengths(), &[1, 1]);

        let covered: usize = blocks.iter().map(|b| b.element_count().unwrap()).sum();
        assert_eq!(covered, 15);
    }

    #[test]
    fn test_partition_errors() {
        assert_eq!(
            partition(&[4, 4], &[2]),
            Err(StorageError::WrongNumberOfIndices {
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(partition(&[4, 4], &[2, 0]), Err(StorageError::InvalidShape));
        assert_eq!(partition(&[], &[]), Err(StorageError::InvalidShape));
    }

    #[test]
    fn test_materialize() {
        let storage = DenseStorage::new(&[3, 3], (0..9).collect::<Vec<i64>>()).unwrap();
        let blocks = partition(storage.shape(), &[2, 2]).unwrap();
        let mut parts = materialize(&storage, &blocks).unwrap();

        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0].elements(), &[0, 1, 3, 4]);
        assert_eq!(parts[3].elements(), &[8]);

        parts[0].set(&[0, 0], -1).unwrap();
        assert_eq!(storage.get(&[0, 0]), Ok(0));
    }

    #[test]
    fn test_materialize_dynamic() {
        let mut yale = YaleStorage::<f32>::zeros(&[4, 4]).unwrap();
        yale.set(&[3, 0], 2.0).unwrap();
        let storage = DynamicStorage::from(yale);

        let blocks = partition(storage.shape(), &[2, 2]).unwrap();
        let parts = materialize_dynamic(&storage, &blocks).unwrap();
        assert!(parts.iter().all(|p| p.shape() == [2, 2]));
        assert_eq!(parts[2].get(&[1, 0]), Ok(Value::Float32(2.0)));
    }
}
