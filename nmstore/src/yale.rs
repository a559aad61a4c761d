//! Yale compressed storage
//!
//! Rank-2 only. The diagonal is stored separately and always present; the
//! off-diagonal non-zero entries are kept in compressed sparse row form:
//!
//! - `row_ptr[r]..row_ptr[r + 1]` is the range of row `r` in `col_idx` and `values`
//! - column indices within a row are strictly increasing
//! - no stored off-diagonal value is zero
//!
//! Zero is the implicit value of every position not stored.

use nmstore_core::validation::{validate_coords, validate_shape};
use nmstore_core::{
    DType, Element, Result, Slice, Storage, StorageError, StorageInfo, StorageType,
};

/// Compressed rank-2 storage with a separate diagonal
#[derive(Debug, Clone, PartialEq)]
pub struct YaleStorage<T: Element> {
    shape: Vec<usize>,
    diag: Vec<T>,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<T>,
}

impl<T: Element> YaleStorage<T> {
    pub fn zeros(shape: &[usize]) -> Result<Self> {
        Self::with_capacity(shape, 0)
    }

    /// Create an all-zero storage with room for `capacity` off-diagonal entries
    pub fn with_capacity(shape: &[usize], capacity: usize) -> Result<Self> {
        validate_shape(shape)?;
        if !StorageType::Yale.supports_rank(shape.len()) {
            return Err(StorageError::UnsupportedRank {
                stype: StorageType::Yale,
                rank: shape.len(),
            });
        }

        let (rows, cols) = (shape[0], shape[1]);
        Ok(Self {
            shape: shape.to_vec(),
            diag: vec![T::zero(); rows.min(cols)],
            row_ptr: vec![0; rows + 1],
            col_idx: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        })
    }

    /// Build a storage from `(coords, value)` pairs in any order
    ///
    /// Later entries for the same position win. Zero entries are dropped.
    pub fn from_entries<I>(shape: &[usize], entries: I, capacity: usize) -> Result<Self>
    where
        I: IntoIterator<Item = (Vec<usize>, T)>,
    {
        let mut storage = Self::with_capacity(shape, capacity)?;
        let mut off_diag = Vec::new();
        for (coords, value) in entries {
            validate_coords(&coords, shape)?;
            let (row, col) = (coords[0], coords[1]);
            if row == col {
                storage.diag[row] = value;
            } else {
                off_diag.push((row, col, value));
            }
        }

        // Stable sort keeps insertion order among duplicates, so the last
        // one seen is the one to keep
        off_diag.sort_by_key(|&(row, col, _)| (row, col));
        let mut deduped: Vec<(usize, usize, T)> = Vec::with_capacity(off_diag.len());
        for entry in off_diag {
            match deduped.last_mut() {
                Some(last) if (last.0, last.1) == (entry.0, entry.1) => *last = entry,
                _ => deduped.push(entry),
            }
        }

        for (row, col, value) in deduped {
            if value.is_zero() {
                continue;
            }
            storage.row_ptr[row + 1] += 1;
            storage.col_idx.push(col);
            storage.values.push(value);
        }
        for row in 0..storage.rows() {
            storage.row_ptr[row + 1] += storage.row_ptr[row];
        }

        debug_assert!(storage.check_structure());
        Ok(storage)
    }

    fn rows(&self) -> usize {
        self.shape[0]
    }

    fn cols(&self) -> usize {
        self.shape[1]
    }

    pub fn default_value(&self) -> T {
        T::zero()
    }

    /// Stored diagonal, one element per row up to the shorter dimension
    pub fn diagonal(&self) -> &[T] {
        &self.diag
    }

    /// Number of stored off-diagonal entries
    pub fn off_diagonal_count(&self) -> usize {
        self.values.len()
    }

    /// Reserved off-diagonal capacity
    pub fn capacity(&self) -> usize {
        self.values.capacity()
    }

    /// Non-zero elements with their coordinates, in row-major order
    pub fn entries(&self) -> Vec<(Vec<usize>, T)> {
        let mut entries = Vec::with_capacity(self.diag.len() + self.values.len());
        for row in 0..self.rows() {
            let range = self.row_ptr[row]..self.row_ptr[row + 1];
            let mut diag_pending = self.diag.get(row).copied().filter(|d| !d.is_zero());

            for (&col, &value) in self.col_idx[range.clone()].iter().zip(&self.values[range]) {
                if col > row {
                    if let Some(d) = diag_pending.take() {
                        entries.push((vec![row, row], d));
                    }
                }
                entries.push((vec![row, col], value));
            }
            if let Some(d) = diag_pending {
                entries.push((vec![row, row], d));
            }
        }
        entries
    }

    /// Position of `col` within row `row`: `Ok` if stored, `Err` with the
    /// insertion point otherwise
    fn find(&self, row: usize, col: usize) -> core::result::Result<usize, usize> {
        let start = self.row_ptr[row];
        let end = self.row_ptr[row + 1];
        self.col_idx[start..end]
            .binary_search(&col)
            .map(|pos| start + pos)
            .map_err(|pos| start + pos)
    }

    /// Check the index structure invariants
    pub fn check_structure(&self) -> bool {
        let rows = self.rows();

        self.row_ptr.len() == rows + 1
            && self.row_ptr[0] == 0
            && self.row_ptr.windows(2).all(|w| w[0] <= w[1])
            && self.row_ptr[rows] == self.col_idx.len()
            && self.col_idx.len() == self.values.len()
            && self.diag.len() == rows.min(self.cols())
            && self.values.iter().all(|v| !v.is_zero())
            && (0..rows).all(|row| {
                let cols = &self.col_idx[self.row_ptr[row]..self.row_ptr[row + 1]];
                cols.windows(2).all(|w| w[0] < w[1])
                    && cols.iter().all(|&c| c < self.cols() && c != row)
            })
    }
}

impl<T: Element> StorageInfo for YaleStorage<T> {
    fn dtype(&self) -> DType {
        T::DTYPE
    }

    fn stype(&self) -> StorageType {
        StorageType::Yale
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Diagonal plus stored off-diagonal entries
    fn element_count(&self) -> usize {
        self.diag.len() + self.values.len()
    }
}

impl<T: Element> Storage for YaleStorage<T> {
    type Element = T;

    fn get(&self, coords: &[usize]) -> Result<T> {
        validate_coords(coords, &self.shape)?;
        let (row, col) = (coords[0], coords[1]);
        if row == col {
            return Ok(self.diag[row]);
        }
        Ok(match self.find(row, col) {
            Ok(pos) => self.values[pos],
            Err(_) => T::zero(),
        })
    }

    fn set(&mut self, coords: &[usize], value: T) -> Result<()> {
        validate_coords(coords, &self.shape)?;
        let (row, col) = (coords[0], coords[1]);
        if row == col {
            self.diag[row] = value;
            return Ok(());
        }

        match self.find(row, col) {
            Ok(pos) if value.is_zero() => {
                self.col_idx.remove(pos);
                self.values.remove(pos);
                self.row_ptr[row + 1..].iter_mut().for_each(|p| *p -= 1);
            }
            Ok(pos) => self.values[pos] = value,
            Err(_) if value.is_zero() => {}
            Err(pos) => {
                self.col_idx.insert(pos, col);
                self.values.insert(pos, value);
                self.row_ptr[row + 1..].iter_mut().for_each(|p| *p += 1);
            }
        }

        debug_assert!(self.check_structure());
        Ok(())
    }

    fn get_slice(&self, slice: &Slice) -> Result<Self> {
        slice.validate(&self.shape)?;

        if slice.is_single() {
            let mut single = Self::zeros(slice.lengths())?;
            single.diag[0] = self.get(slice.coords())?;
            return Ok(single);
        }

        let (row0, col0) = (slice.coords()[0], slice.coords()[1]);
        let (col_start, col_end) = (col0, slice.end(1));

        let mut entries = Vec::new();
        for row in row0..slice.end(0) {
            if (col_start..col_end).contains(&row) {
                entries.push((vec![row - row0, row - col0], self.diag[row]));
            }
            let start = self.find(row, col_start).unwrap_or_else(|pos| pos);
            let end = self.find(row, col_end).unwrap_or_else(|pos| pos);
            for pos in start..end {
                entries.push((vec![row - row0, self.col_idx[pos] - col0], self.values[pos]));
            }
        }

        Self::from_entries(slice.lengths(), entries, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> YaleStorage<f64> {
        // [[1, 0, 2],
        //  [0, 3, 0],
        //  [4, 0, 5]]
        let mut storage = YaleStorage::zeros(&[3, 3]).unwrap();
        storage.set(&[0, 0], 1.0).unwrap();
        storage.set(&[0, 2], 2.0).unwrap();
        storage.set(&[1, 1], 3.0).unwrap();
        storage.set(&[2, 0], 4.0).unwrap();
        storage.set(&[2, 2], 5.0).unwrap();
        storage
    }

    #[test]
    fn test_rank_must_be_two() {
        for shape in [vec![3], vec![2, 2, 2]] {
            assert_eq!(
                YaleStorage::<i32>::zeros(&shape),
                Err(StorageError::UnsupportedRank {
                    stype: StorageType::Yale,
                    rank: shape.len()
                })
            );
        }
    }

    #[test]
    fn test_get_set() {
        let storage = sample();
        assert_eq!(storage.get(&[0, 2]), Ok(2.0));
        assert_eq!(storage.get(&[2, 0]), Ok(4.0));
        assert_eq!(storage.get(&[1, 0]), Ok(0.0));
        assert_eq!(storage.get(&[1, 1]), Ok(3.0));
        assert_eq!(storage.element_count(), 5);
        assert_eq!(storage.off_diagonal_count(), 2);
        assert!(storage.check_structure());
    }

    #[test]
    fn test_set_zero_removes() {
        let mut storage = sample();
        storage.set(&[0, 2], 0.0).unwrap();
        assert_eq!(storage.off_diagonal_count(), 1);
        assert_eq!(storage.row_ptr, vec![0, 0, 0, 1]);
        assert_eq!(storage.get(&[2, 0]), Ok(4.0));

        // Zero on the diagonal stays stored
        storage.set(&[1, 1], 0.0).unwrap();
        assert_eq!(storage.element_count(), 4);
    }

    #[test]
    fn test_insert_keeps_columns_sorted() {
        let mut storage = YaleStorage::<i32>::zeros(&[2, 5]).unwrap();
        for col in [4, 1, 3, 2] {
            storage.set(&[0, col], col as i32).unwrap();
        }
        assert_eq!(storage.col_idx, vec![1, 2, 3, 4]);
        assert_eq!(storage.values, vec![1, 2, 3, 4]);
        assert_eq!(storage.row_ptr, vec![0, 4, 4]);
    }

    #[test]
    fn test_entries_row_major() {
        assert_eq!(
            sample().entries(),
            vec![
                (vec![0, 0], 1.0),
                (vec![0, 2], 2.0),
                (vec![1, 1], 3.0),
                (vec![2, 0], 4.0),
                (vec![2, 2], 5.0),
            ]
        );
    }

    #[test]
    fn test_from_entries() {
        let storage = YaleStorage::from_entries(
            &[3, 3],
            vec![
                (vec![2, 2], 5.0),
                (vec![2, 0], 4.0),
                (vec![0, 2], 9.0),
                (vec![1, 1], 3.0),
                (vec![0, 0], 1.0),
                (vec![0, 2], 2.0),
                (vec![1, 2], 0.0),
            ],
            8,
        )
        .unwrap();

        assert_eq!(storage, sample());
        assert!(storage.capacity() >= 8);
    }

    #[test]
    fn test_non_square() {
        let mut storage = YaleStorage::<i16>::zeros(&[2, 4]).unwrap();
        assert_eq!(storage.diagonal().len(), 2);
        storage.set(&[1, 3], 7).unwrap();
        assert_eq!(storage.get(&[1, 3]), Ok(7));
        assert_eq!(
            storage.get(&[2, 0]),
            Err(StorageError::OutOfBounds {
                dim: 0,
                index: 2,
                extent: 2
            })
        );
    }

    #[test]
    fn test_get_slice() {
        let storage = sample();
        let sub = storage
            .get_slice(&Slice::from_ranges(&[1..3, 0..2]).unwrap())
            .unwrap();

        // [[0, 3],
        //  [4, 0]]
        assert_eq!(sub.shape(), &[2, 2]);
        assert_eq!(sub.entries(), vec![(vec![0, 1], 3.0), (vec![1, 0], 4.0)]);
        assert!(sub.check_structure());
    }

    #[test]
    fn test_get_slice_single() {
        let storage = sample();
        let sub = storage.get_slice(&Slice::single(vec![0, 1]).unwrap()).unwrap();
        assert_eq!(sub.shape(), &[1, 1]);
        assert_eq!(sub.element_count(), 1);
        assert_eq!(sub.get(&[0, 0]), Ok(0.0));

        let sub = storage.get_slice(&Slice::single(vec![2, 0]).unwrap()).unwrap();
        assert_eq!(sub.get(&[0, 0]), Ok(4.0));
    }
}
