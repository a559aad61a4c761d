//! Operand pairing for binary operations

use crate::traits::StorageInfo;
use crate::{Result, StorageError};

/// The two operands of a binary operation
///
/// Borrows both storages for the duration of the operation. Construction
/// guarantees equal ranks; element types and backends may still differ,
/// which is what [`crate::CastPolicy`] resolves.
#[derive(Debug)]
pub struct StoragePair<'a, L: ?Sized, R: ?Sized> {
    left: &'a L,
    right: &'a R,
}

impl<L: ?Sized, R: ?Sized> Clone for StoragePair<'_, L, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L: ?Sized, R: ?Sized> Copy for StoragePair<'_, L, R> {}

/// Pair two storages for a binary operation
///
/// Fails with `RankMismatch` when the ranks differ. The check runs before
/// any element-type or backend consideration.
pub fn pair<'a, L, R>(left: &'a L, right: &'a R) -> Result<StoragePair<'a, L, R>>
where
    L: StorageInfo + ?Sized,
    R: StorageInfo + ?Sized,
{
    if left.rank() != right.rank() {
        return Err(StorageError::RankMismatch {
            left: left.rank(),
            right: right.rank(),
        });
    }
    Ok(StoragePair { left, right })
}

impl<'a, L, R> StoragePair<'a, L, R>
where
    L: StorageInfo + ?Sized,
    R: StorageInfo + ?Sized,
{
    pub fn left(&self) -> &'a L {
        self.left
    }

    pub fn right(&self) -> &'a R {
        self.right
    }

    /// Shared rank of both operands
    pub fn rank(&self) -> usize {
        self.left.rank()
    }

    pub fn same_shape(&self) -> bool {
        self.left.shape() == self.right.shape()
    }

    pub fn same_dtype(&self) -> bool {
        self.left.dtype() == self.right.dtype()
    }

    pub fn same_stype(&self) -> bool {
        self.left.stype() == self.right.stype()
    }
}
