//! Coordinate bounds validation
//!
//! Pure functions over a coordinate and a shape, with no access to the
//! storage payload.

use crate::StorageError;

/// Validate a coordinate against a shape
///
/// Fails with `WrongNumberOfIndices` when the coordinate rank differs from the
/// shape rank, and with `OutOfBounds` for the first index outside
/// `[0, shape[dim])`.
pub fn validate_coords(coords: &[usize], shape: &[usize]) -> Result<(), StorageError> {
    if coords.len() != shape.len() {
        return Err(StorageError::WrongNumberOfIndices {
            expected: shape.len(),
            actual: coords.len(),
        });
    }

    for (dim, (&index, &extent)) in coords.iter().zip(shape).enumerate() {
        if index >= extent {
            return Err(StorageError::OutOfBounds { dim, index, extent });
        }
    }

    Ok(())
}

/// Linear offset of a coordinate in a row-major buffer
///
/// The caller must have validated `coords` against `shape`; the result is then
/// always below the shape's element count and cannot overflow.
pub fn row_major_offset(coords: &[usize], shape: &[usize]) -> usize {
    coords
        .iter()
        .zip(shape)
        .fold(0, |offset, (&index, &extent)| offset * extent + index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_coords() {
        assert_eq!(validate_coords(&[0, 2], &[2, 3]), Ok(()));
        assert_eq!(validate_coords(&[1, 0], &[2, 3]), Ok(()));

        assert_eq!(
            validate_coords(&[5], &[3]),
            Err(StorageError::OutOfBounds {
                dim: 0,
                index: 5,
                extent: 3
            })
        );
        assert_eq!(
            validate_coords(&[1, 3], &[2, 3]),
            Err(StorageError::OutOfBounds {
                dim: 1,
                index: 3,
                extent: 3
            })
        );
        assert_eq!(
            validate_coords(&[1], &[2, 3]),
            Err(StorageError::WrongNumberOfIndices {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_row_major_offset() {
        assert_eq!(row_major_offset(&[0, 0], &[2, 3]), 0);
        assert_eq!(row_major_offset(&[0, 2], &[2, 3]), 2);
        assert_eq!(row_major_offset(&[1, 0], &[2, 3]), 3);
        assert_eq!(row_major_offset(&[1, 2, 3], &[2, 3, 4]), 23);
        assert_eq!(row_major_offset(&[4], &[5]), 4);
    }
}
