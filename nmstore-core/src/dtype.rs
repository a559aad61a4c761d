//! Element-type and backend tags
//!
//! These are the two axes a storage can differ on besides its shape. Both
//! carry stable `u8` tags so they can be recorded alongside serialized data.

/// Element types a storage can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum DType {
    /// Unsigned 8-bit
    Byte = 0,
    Int8 = 1,
    Int16 = 2,
    Int32 = 3,
    Int64 = 4,
    Float32 = 5,
    Float64 = 6,
}

impl DType {
    /// All element types, in tag order
    pub const ALL: [DType; 7] = [
        DType::Byte,
        DType::Int8,
        DType::Int16,
        DType::Int32,
        DType::Int64,
        DType::Float32,
        DType::Float64,
    ];

    /// Get the size in bytes for this element type
    pub const fn size_bytes(&self) -> usize {
        match self {
            DType::Byte | DType::Int8 => 1,
            DType::Int16 => 2,
            DType::Int32 | DType::Float32 => 4,
            DType::Int64 | DType::Float64 => 8,
        }
    }

    /// Position of this type in [`DType::ALL`]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    pub const fn is_float(&self) -> bool {
        matches!(self, DType::Float32 | DType::Float64)
    }
}

impl TryFrom<u8> for DType {
    type Error = crate::StorageError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        DType::ALL
            .get(value as usize)
            .copied()
            .ok_or(crate::StorageError::UnknownTag(value))
    }
}

impl core::fmt::Display for DType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DType::Byte => write!(f, "byte"),
            DType::Int8 => write!(f, "int8"),
            DType::Int16 => write!(f, "int16"),
            DType::Int32 => write!(f, "int32"),
            DType::Int64 => write!(f, "int64"),
            DType::Float32 => write!(f, "float32"),
            DType::Float64 => write!(f, "float64"),
        }
    }
}

/// Physical storage layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum StorageType {
    /// Contiguous row-major buffer
    Dense = 0,
    /// Nested sparse lists, one level per dimension
    List = 1,
    /// Compressed rows with a separately stored diagonal
    Yale = 2,
}

impl StorageType {
    pub const ALL: [StorageType; 3] = [StorageType::Dense, StorageType::List, StorageType::Yale];

    /// Whether this layout can hold a storage of the given rank
    pub const fn supports_rank(&self, rank: usize) -> bool {
        match self {
            StorageType::Dense | StorageType::List => rank >= 1,
            StorageType::Yale => rank == 2,
        }
    }

    pub const fn is_sparse(&self) -> bool {
        !matches!(self, StorageType::Dense)
    }
}

impl TryFrom<u8> for StorageType {
    type Error = crate::StorageError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        StorageType::ALL
            .get(value as usize)
            .copied()
            .ok_or(crate::StorageError::UnknownTag(value))
    }
}

impl core::fmt::Display for StorageType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StorageType::Dense => write!(f, "dense"),
            StorageType::List => write!(f, "list"),
            StorageType::Yale => write!(f, "yale"),
        }
    }
}
