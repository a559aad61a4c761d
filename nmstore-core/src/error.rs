//! Error types for storage operations

use crate::dtype::{DType, StorageType};

/// One side of a failed conversion: an element type or a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastTarget {
    DType(DType),
    Backend(StorageType),
}

impl core::fmt::Display for CastTarget {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CastTarget::DType(dtype) => write!(f, "{dtype}"),
            CastTarget::Backend(stype) => write!(f, "{stype}"),
        }
    }
}

/// Errors that can occur during storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Coordinate or slice region outside the shape
    OutOfBounds {
        dim: usize,
        index: usize,
        extent: usize,
    },
    /// Operand ranks differ at pairing time
    RankMismatch { left: usize, right: usize },
    /// Capacity computation exceeds the addressable range
    Overflow,
    /// No common representation or element type exists
    IncompatibleCast { from: CastTarget, to: CastTarget },
    /// Empty shape or a zero extent
    InvalidShape,
    /// Coordinate or slice rank does not match the storage rank
    WrongNumberOfIndices { expected: usize, actual: usize },
    /// Buffer length or source extent does not match the destination
    ShapeMismatch { expected: usize, actual: usize },
    /// Backend cannot hold a storage of this rank
    UnsupportedRank { stype: StorageType, rank: usize },
    /// Malformed or reversed range in a slice expression
    InvalidRange,
    /// Unrecognized dtype or backend tag byte
    UnknownTag(u8),
    /// Configuration value outside its valid range
    InvalidConfig,
}

/// Coarse classification of a [`StorageError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Bounds,
    Shape,
    Capacity,
    Cast,
    Config,
}

impl StorageError {
    /// Get the category of this error
    pub const fn category(&self) -> ErrorCategory {
        match self {
            StorageError::OutOfBounds { .. }
            | StorageError::WrongNumberOfIndices { .. }
            | StorageError::InvalidRange => ErrorCategory::Bounds,
            StorageError::RankMismatch { .. }
            | StorageError::InvalidShape
            | StorageError::ShapeMismatch { .. } => ErrorCategory::Shape,
            StorageError::Overflow => ErrorCategory::Capacity,
            StorageError::IncompatibleCast { .. } | StorageError::UnsupportedRank { .. } => {
                ErrorCategory::Cast
            }
            StorageError::UnknownTag(_) | StorageError::InvalidConfig => ErrorCategory::Config,
        }
    }

    /// `IncompatibleCast` between two element types
    pub const fn dtype_cast(from: DType, to: DType) -> Self {
        StorageError::IncompatibleCast {
            from: CastTarget::DType(from),
            to: CastTarget::DType(to),
        }
    }

    /// `IncompatibleCast` between two backends
    pub const fn backend_cast(from: StorageType, to: StorageType) -> Self {
        StorageError::IncompatibleCast {
            from: CastTarget::Backend(from),
            to: CastTarget::Backend(to),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StorageError::OutOfBounds { dim, index, extent } => write!(
                f,
                "index {index} out of bounds for dimension {dim} with extent {extent}"
            ),
            StorageError::RankMismatch { left, right } => {
                write!(f, "rank mismatch: left has rank {left}, right has rank {right}")
            }
            StorageError::Overflow => write!(f, "element count exceeds addressable size"),
            StorageError::IncompatibleCast { from, to } => {
                write!(f, "cannot cast {from} to {to}")
            }
            StorageError::InvalidShape => write!(f, "shape must have rank >= 1 and non-zero extents"),
            StorageError::WrongNumberOfIndices { expected, actual } => {
                write!(f, "wrong number of indices: expected {expected}, got {actual}")
            }
            StorageError::ShapeMismatch { expected, actual } => {
                write!(f, "shape mismatch: expected {expected}, got {actual}")
            }
            StorageError::UnsupportedRank { stype, rank } => {
                write!(f, "{stype} storage does not support rank {rank}")
            }
            StorageError::InvalidRange => write!(f, "invalid range"),
            StorageError::UnknownTag(tag) => write!(f, "unknown tag {tag}"),
            StorageError::InvalidConfig => write!(f, "invalid storage configuration"),
        }
    }
}

impl core::error::Error for StorageError {}

/// Result type for storage operations
pub type Result<T> = core::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_display() {
        let err = StorageError::OutOfBounds {
            dim: 0,
            index: 5,
            extent: 3,
        };
        assert_eq!(
            err.to_string(),
            "index 5 out of bounds for dimension 0 with extent 3"
        );

        let err = StorageError::dtype_cast(DType::Float64, DType::Int32);
        assert_eq!(err.to_string(), "cannot cast float64 to int32");
    }

    #[test]
    fn test_category() {
        assert_eq!(StorageError::Overflow.category(), ErrorCategory::Capacity);
        assert_eq!(
            StorageError::RankMismatch { left: 2, right: 3 }.category(),
            ErrorCategory::Shape
        );
        assert_eq!(
            StorageError::backend_cast(StorageType::Dense, StorageType::Yale).category(),
            ErrorCategory::Cast
        );
    }
}
