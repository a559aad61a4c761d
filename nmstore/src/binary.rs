//! Preparing operands for binary operations
//!
//! An element-wise operation over two storages first pairs them, asks the
//! casting policy for a common element type and backend, and converts only
//! the operands that are not already there. Untouched operands stay borrowed.

use std::borrow::Cow;

use log::{debug, trace};
use nmstore_core::traits::storage::check_source_shape;
use nmstore_core::{pair, CastPlan, CastPolicy, Conversion, Result, Slice, StorageInfo, Value};

use crate::dynamic::DynamicStorage;

/// Two operands brought to a common element type and backend
#[derive(Debug, Clone)]
pub struct CastOperands<'a> {
    plan: CastPlan,
    left: Cow<'a, DynamicStorage>,
    right: Cow<'a, DynamicStorage>,
}

impl<'a> CastOperands<'a> {
    pub fn plan(&self) -> &CastPlan {
        &self.plan
    }

    pub fn left(&self) -> &DynamicStorage {
        &self.left
    }

    pub fn right(&self) -> &DynamicStorage {
        &self.right
    }

    /// Whether the left operand had to be copied
    pub fn left_converted(&self) -> bool {
        matches!(self.left, Cow::Owned(_))
    }

    pub fn right_converted(&self) -> bool {
        matches!(self.right, Cow::Owned(_))
    }

    pub fn into_parts(self) -> (Cow<'a, DynamicStorage>, Cow<'a, DynamicStorage>) {
        (self.left, self.right)
    }

    /// Visit every position with the element of each operand
    ///
    /// Both operands must have the same shape. Positions are visited in
    /// row-major order.
    pub fn for_each_pair<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(&[usize], Value, Value),
    {
        let full = Slice::full(self.left.shape())?;
        check_source_shape(&full, self.right.shape())?;

        for (coords, _) in full.positions() {
            f(&coords, self.left.get(&coords)?, self.right.get(&coords)?);
        }
        Ok(())
    }
}

fn apply<'a>(storage: &'a DynamicStorage, conversion: Conversion) -> Result<Cow<'a, DynamicStorage>> {
    match conversion {
        Conversion::Keep => Ok(Cow::Borrowed(storage)),
        Conversion::Convert { dtype, stype } => {
            debug!(
                "converting operand from {} {} to {} {}",
                storage.stype(),
                storage.dtype(),
                stype,
                dtype
            );
            storage.cast(dtype, stype).map(Cow::Owned)
        }
    }
}

/// Bring two operands to a common element type and backend
///
/// Ranks are checked first. Only operands the plan marks for conversion are
/// copied.
pub fn prepare<'a>(
    left: &'a DynamicStorage,
    right: &'a DynamicStorage,
    policy: &CastPolicy,
) -> Result<CastOperands<'a>> {
    let pair = pair(left, right)?;
    let plan = policy.decide(&pair)?;
    trace!("cast plan for {:?} and {:?}: {:?}", left.shape(), right.shape(), plan);

    Ok(CastOperands {
        left: apply(left, plan.left)?,
        right: apply(right, plan.right)?,
        plan,
    })
}

/// Element-wise equality after bringing both operands to a common type
///
/// Storages of different shapes are unequal. Operands with no common type
/// fail with the policy's error.
pub fn storage_eq(left: &DynamicStorage, right: &DynamicStorage, policy: &CastPolicy) -> Result<bool> {
    if left.shape() != right.shape() {
        return Ok(false);
    }

    let operands = prepare(left, right, policy)?;
    let full = Slice::full(operands.left().shape())?;
    for (coords, _) in full.positions() {
        if operands.left().get(&coords)? != operands.right().get(&coords)? {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DenseStorage, ListStorage, YaleStorage};
    use nmstore_core::{DType, Storage, StorageError, StorageType};

    fn dense_ints() -> DynamicStorage {
        DenseStorage::new(&[2, 3], vec![1i32, 0, 2, 0, 3, 0])
            .unwrap()
            .into()
    }

    fn sparse_ints() -> DynamicStorage {
        let mut list = ListStorage::<i32>::zeros(&[2, 3]).unwrap();
        list.set(&[0, 0], 1).unwrap();
        list.set(&[0, 2], 2).unwrap();
        list.set(&[1, 1], 3).unwrap();
        list.into()
    }

    #[test]
    fn test_prepare_dense_and_sparse() {
        let policy = CastPolicy::default();
        let (left, right) = (dense_ints(), sparse_ints());
        let operands = prepare(&left, &right, &policy).unwrap();

        assert_eq!(operands.plan().stype, StorageType::Dense);
        assert_eq!(operands.plan().dtype, DType::Int32);
        assert!(!operands.left_converted());
        assert!(operands.right_converted());
        assert_eq!(operands.left().stype(), operands.right().stype());
        assert_eq!(operands.left().shape(), operands.right().shape());

        // The sparse source is untouched
        assert_eq!(right.stype(), StorageType::List);
    }

    #[test]
    fn test_prepare_widens_dtype() {
        let policy = CastPolicy::default();
        let left = dense_ints();
        let right: DynamicStorage = YaleStorage::<f32>::zeros(&[2, 3]).unwrap().into();
        let operands = prepare(&left, &right, &policy).unwrap();

        assert_eq!(operands.plan().dtype, DType::Float64);
        assert_eq!(operands.left().dtype(), DType::Float64);
        assert_eq!(operands.right().dtype(), DType::Float64);
        assert_eq!(operands.right().stype(), StorageType::Dense);
    }

    #[test]
    fn test_prepare_rank_mismatch() {
        let policy = CastPolicy::default();
        let left = dense_ints();
        let right = DynamicStorage::zeros(DType::Int32, StorageType::Dense, &[6]).unwrap();
        assert_eq!(
            prepare(&left, &right, &policy).map(|_| ()),
            Err(StorageError::RankMismatch { left: 2, right: 1 })
        );
    }

    #[test]
    fn test_for_each_pair() {
        let policy = CastPolicy::default();
        let (left, right) = (dense_ints(), sparse_ints());
        let operands = prepare(&left, &right, &policy).unwrap();

        let mut sums = Vec::new();
        operands
            .for_each_pair(|_, a, b| sums.push(a.to_f64() + b.to_f64()))
            .unwrap();
        assert_eq!(sums, vec![2.0, 0.0, 4.0, 0.0, 6.0, 0.0]);
    }

    #[test]
    fn test_storage_eq() {
        let policy = CastPolicy::default();
        let dense = dense_ints();
        let yale: DynamicStorage = YaleStorage::from_entries(
            &[2, 3],
            vec![(vec![0, 0], 1.0f64), (vec![0, 2], 2.0), (vec![1, 1], 3.0)],
            0,
        )
        .unwrap()
        .into();

        assert_eq!(storage_eq(&dense, &sparse_ints(), &policy), Ok(true));
        assert_eq!(storage_eq(&dense, &yale, &policy), Ok(true));

        let mut other = sparse_ints();
        other.set(&[1, 2], Value::Int32(9)).unwrap();
        assert_eq!(storage_eq(&dense, &other, &policy), Ok(false));

        let wider = DynamicStorage::zeros(DType::Int32, StorageType::Dense, &[3, 3]).unwrap();
        assert_eq!(storage_eq(&dense, &wider, &policy), Ok(false));
    }

    #[test]
    fn test_int64_against_floats_is_rejected() {
        let policy = CastPolicy::default();
        let exact: DynamicStorage = DenseStorage::new(&[1], vec![(1i64 << 53) + 1]).unwrap().into();
        let rounded: DynamicStorage = DenseStorage::new(&[1], vec![(1u64 << 53) as f64]).unwrap().into();

        let err = StorageError::dtype_cast(DType::Int64, DType::Float64);
        assert_eq!(storage_eq(&exact, &rounded, &policy), Err(err));
        assert_eq!(prepare(&exact, &rounded, &policy).map(|_| ()), Err(err));

        // An explicit cast is still possible
        let cast = exact.cast(DType::Float64, StorageType::Dense).unwrap();
        assert_eq!(storage_eq(&cast, &rounded, &policy), Ok(true));
    }
}
