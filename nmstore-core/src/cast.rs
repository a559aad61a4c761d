//! Casting policy for binary operations
//!
//! Given two paired operands, decide which element type and which backend
//! both must be brought to before they can be combined element by element.
//! The decision is driven entirely by two tables:
//!
//! - a backend generality order, least to most general. A more general
//!   backend can represent every value a less general one can.
//! - an element-type widening table giving, for each pair of types, the
//!   smallest type that holds both without narrowing.
//!
//! Adding a backend or an element type means extending a table, not adding
//! branches. The policy only decides; conversion happens elsewhere.

use alloc::vec::Vec;

use crate::dtype::{DType, StorageType};
use crate::pair::StoragePair;
use crate::traits::StorageInfo;
use crate::{Result, StorageError};

const N: usize = DType::ALL.len();

/// Widening table over element types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcastTable {
    entries: [[Option<DType>; N]; N],
}

impl UpcastTable {
    /// Default widening rules
    ///
    /// Integers widen to the next signed type that holds both ranges.
    /// Integers combined with floats go to the smallest float whose mantissa
    /// holds the integer exactly. No float holds every `Int64`, so that pair
    /// has no entry and needs an explicit cast.
    pub const DEFAULT: Self = {
        use DType::*;
        let none = None;
        let byte = Some(Byte);
        let int8 = Some(Int8);
        let int16 = Some(Int16);
        let int32 = Some(Int32);
        let int64 = Some(Int64);
        let flt32 = Some(Float32);
        let flt64 = Some(Float64);
        Self {
            entries: [
                [byte, int16, int16, int32, int64, flt32, flt64],
                [int16, int8, int16, int32, int64, flt32, flt64],
                [int16, int16, int16, int32, int64, flt32, flt64],
                [int32, int32, int32, int32, int64, flt64, flt64],
                [int64, int64, int64, int64, int64, none, none],
                [flt32, flt32, flt32, flt64, none, flt32, flt64],
                [flt64, flt64, flt64, flt64, none, flt64, flt64],
            ],
        }
    };

    /// Table with no entries
    pub const fn empty() -> Self {
        Self {
            entries: [[None; N]; N],
        }
    }

    /// Common type of `a` and `b`, if any
    pub const fn get(&self, a: DType, b: DType) -> Option<DType> {
        self.entries[a.index()][b.index()]
    }

    /// Set the common type of `a` and `b` in both directions
    pub fn with(mut self, a: DType, b: DType, common: Option<DType>) -> Self {
        self.entries[a.index()][b.index()] = common;
        self.entries[b.index()][a.index()] = common;
        self
    }

    /// Whether `get(a, b) == get(b, a)` for every pair
    pub fn is_symmetric(&self) -> bool {
        DType::ALL
            .iter()
            .all(|&a| DType::ALL.iter().all(|&b| self.get(a, b) == self.get(b, a)))
    }
}

impl Default for UpcastTable {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// What has to happen to one operand before combination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Conversion {
    /// Already in the target type and backend
    Keep,
    /// Must be copied into the target type and backend
    Convert { dtype: DType, stype: StorageType },
}

impl Conversion {
    fn between(dtype: DType, stype: StorageType, plan_dtype: DType, plan_stype: StorageType) -> Self {
        if dtype == plan_dtype && stype == plan_stype {
            Conversion::Keep
        } else {
            Conversion::Convert {
                dtype: plan_dtype,
                stype: plan_stype,
            }
        }
    }

    pub fn is_keep(&self) -> bool {
        matches!(self, Conversion::Keep)
    }
}

/// Outcome of a casting decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CastPlan {
    /// Element type both operands end up in
    pub dtype: DType,
    /// Backend both operands end up in
    pub stype: StorageType,
    pub left: Conversion,
    pub right: Conversion,
}

impl CastPlan {
    /// True when neither operand needs converting
    pub fn is_noop(&self) -> bool {
        self.left.is_keep() && self.right.is_keep()
    }
}

/// Table-driven casting decisions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastPolicy {
    generality: Vec<StorageType>,
    upcast: UpcastTable,
}

impl Default for CastPolicy {
    fn default() -> Self {
        Self {
            generality: alloc::vec![StorageType::Yale, StorageType::List, StorageType::Dense],
            upcast: UpcastTable::DEFAULT,
        }
    }
}

impl CastPolicy {
    /// Create a policy from a generality order (least general first) and a
    /// widening table
    pub fn new(generality: Vec<StorageType>, upcast: UpcastTable) -> Self {
        Self { generality, upcast }
    }

    /// Position of `stype` in the generality order
    pub fn generality(&self, stype: StorageType) -> Option<usize> {
        self.generality.iter().position(|&s| s == stype)
    }

    pub fn upcast_table(&self) -> &UpcastTable {
        &self.upcast
    }

    /// Smallest element type holding both `a` and `b`
    pub fn widen(&self, a: DType, b: DType) -> Result<DType> {
        self.upcast
            .get(a, b)
            .ok_or(StorageError::dtype_cast(a, b))
    }

    /// Whether a value of type `from` can be stored as `to` without narrowing
    pub fn widens_to(&self, from: DType, to: DType) -> bool {
        self.upcast.get(from, to) == Some(to)
    }

    /// Least general backend that both `a` and `b` convert into losslessly
    /// and that can hold a storage of `rank`
    pub fn common_backend(&self, a: StorageType, b: StorageType, rank: usize) -> Result<StorageType> {
        let incompatible = StorageError::backend_cast(a, b);
        let floor = self
            .generality(a)
            .zip(self.generality(b))
            .map(|(ga, gb)| ga.max(gb))
            .ok_or(incompatible)?;

        self.generality[floor..]
            .iter()
            .copied()
            .find(|stype| stype.supports_rank(rank))
            .ok_or(incompatible)
    }

    /// Decide the common element type and backend for a pair
    pub fn decide<L, R>(&self, pair: &StoragePair<'_, L, R>) -> Result<CastPlan>
    where
        L: StorageInfo + ?Sized,
        R: StorageInfo + ?Sized,
    {
        let (left, right) = (pair.left(), pair.right());
        let dtype = self.widen(left.dtype(), right.dtype())?;
        let stype = self.common_backend(left.stype(), right.stype(), pair.rank())?;

        Ok(CastPlan {
            dtype,
            stype,
            left: Conversion::between(left.dtype(), left.stype(), dtype, stype),
            right: Conversion::between(right.dtype(), right.stype(), dtype, stype),
        })
    }
}
