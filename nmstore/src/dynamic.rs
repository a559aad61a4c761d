//! Dynamically typed storage
//!
//! [`DynamicStorage`] lets both the element type and the backend vary at
//! runtime. Values cross the boundary as [`Value`]s; writes are only
//! accepted when the value widens to the storage's element type under a
//! [`CastPolicy`], so nothing is narrowed implicitly. Narrowing is available
//! through [`DynamicStorage::cast`].

use log::debug;
use nmstore_core::traits::storage::check_source_shape;
use nmstore_core::{
    CastPolicy, DType, Element, Result, Slice, Storage, StorageError, StorageInfo, StorageType,
    Value,
};

use crate::backend::StorageBackend;
use crate::config::StorageConfig;

/// A storage whose element type is known only at runtime
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicStorage {
    Byte(StorageBackend<u8>),
    Int8(StorageBackend<i8>),
    Int16(StorageBackend<i16>),
    Int32(StorageBackend<i32>),
    Int64(StorageBackend<i64>),
    Float32(StorageBackend<f32>),
    Float64(StorageBackend<f64>),
}

macro_rules! dispatch {
    ($self:expr, $s:ident => $body:expr) => {
        match $self {
            DynamicStorage::Byte($s) => $body,
            DynamicStorage::Int8($s) => $body,
            DynamicStorage::Int16($s) => $body,
            DynamicStorage::Int32($s) => $body,
            DynamicStorage::Int64($s) => $body,
            DynamicStorage::Float32($s) => $body,
            DynamicStorage::Float64($s) => $body,
        }
    };
}

/// Like `dispatch!`, but wraps the result back into the same variant
macro_rules! dispatch_map {
    ($self:expr, $s:ident => $body:expr) => {
        match $self {
            DynamicStorage::Byte($s) => DynamicStorage::Byte($body),
            DynamicStorage::Int8($s) => DynamicStorage::Int8($body),
            DynamicStorage::Int16($s) => DynamicStorage::Int16($body),
            DynamicStorage::Int32($s) => DynamicStorage::Int32($body),
            DynamicStorage::Int64($s) => DynamicStorage::Int64($body),
            DynamicStorage::Float32($s) => DynamicStorage::Float32($body),
            DynamicStorage::Float64($s) => DynamicStorage::Float64($body),
        }
    };
}

/// Build a variant of `dtype` from a generic constructor
macro_rules! for_dtype {
    ($dtype:expr, $t:ident => $body:expr) => {
        match $dtype {
            DType::Byte => {
                type $t = u8;
                DynamicStorage::Byte($body)
            }
            DType::Int8 => {
                type $t = i8;
                DynamicStorage::Int8($body)
            }
            DType::Int16 => {
                type $t = i16;
                DynamicStorage::Int16($body)
            }
            DType::Int32 => {
                type $t = i32;
                DynamicStorage::Int32($body)
            }
            DType::Int64 => {
                type $t = i64;
                DynamicStorage::Int64($body)
            }
            DType::Float32 => {
                type $t = f32;
                DynamicStorage::Float32($body)
            }
            DType::Float64 => {
                type $t = f64;
                DynamicStorage::Float64($body)
            }
        }
    };
}

fn typed<T: Element>(value: Value) -> T {
    T::from_value(value)
}

fn retype<T: Element>(backend: &StorageBackend<T>, dtype: DType) -> Result<DynamicStorage> {
    Ok(for_dtype!(dtype, U => backend.map(U::cast_from)?))
}

impl DynamicStorage {
    /// An all-zero storage of the given element type and backend
    pub fn zeros(dtype: DType, stype: StorageType, shape: &[usize]) -> Result<Self> {
        Ok(for_dtype!(dtype, T => StorageBackend::<T>::zeros(stype, shape)?))
    }

    /// Read the element at `coords`
    pub fn get(&self, coords: &[usize]) -> Result<Value> {
        dispatch!(self, s => s.get(coords).map(Element::into_value))
    }

    /// Write `value` at `coords` under the default widening rules
    pub fn set(&mut self, coords: &[usize], value: Value) -> Result<()> {
        self.set_with(coords, value, &CastPolicy::default())
    }

    /// Write `value` at `coords`
    ///
    /// Fails with `IncompatibleCast` unless `policy` widens the value's type
    /// to this storage's element type.
    pub fn set_with(&mut self, coords: &[usize], value: Value, policy: &CastPolicy) -> Result<()> {
        self.check_widens(value.dtype(), policy)?;
        dispatch!(self, s => s.set(coords, typed(value)))
    }

    /// Copy a region, keeping element type and backend
    pub fn get_slice(&self, slice: &Slice) -> Result<Self> {
        Ok(dispatch_map!(self, s => s.get_slice(slice)?))
    }

    /// Copy `source` into a region under the default widening rules
    pub fn set_slice(&mut self, slice: &Slice, source: &DynamicStorage) -> Result<()> {
        self.set_slice_with(slice, source, &CastPolicy::default())
    }

    /// Copy `source` into a region
    ///
    /// The source is widened and converted to this storage's element type and
    /// backend as needed. A source that `policy` would have to narrow is
    /// rejected.
    pub fn set_slice_with(
        &mut self,
        slice: &Slice,
        source: &DynamicStorage,
        policy: &CastPolicy,
    ) -> Result<()> {
        slice.validate(self.shape())?;
        check_source_shape(slice, source.shape())?;
        self.check_widens(source.dtype(), policy)?;

        let converted;
        let source = if source.dtype() == self.dtype() && source.stype() == self.stype() {
            source
        } else {
            converted = source.cast(self.dtype(), self.stype())?;
            &converted
        };

        match (self, source) {
            (DynamicStorage::Byte(d), DynamicStorage::Byte(s)) => d.set_slice(slice, s),
            (DynamicStorage::Int8(d), DynamicStorage::Int8(s)) => d.set_slice(slice, s),
            (DynamicStorage::Int16(d), DynamicStorage::Int16(s)) => d.set_slice(slice, s),
            (DynamicStorage::Int32(d), DynamicStorage::Int32(s)) => d.set_slice(slice, s),
            (DynamicStorage::Int64(d), DynamicStorage::Int64(s)) => d.set_slice(slice, s),
            (DynamicStorage::Float32(d), DynamicStorage::Float32(s)) => d.set_slice(slice, s),
            (DynamicStorage::Float64(d), DynamicStorage::Float64(s)) => d.set_slice(slice, s),
            (target, source) => Err(StorageError::dtype_cast(source.dtype(), target.dtype())),
        }
    }

    /// Write `value` to every position of a region
    pub fn fill_slice(&mut self, slice: &Slice, value: Value) -> Result<()> {
        self.fill_slice_with(slice, value, &CastPolicy::default())
    }

    pub fn fill_slice_with(&mut self, slice: &Slice, value: Value, policy: &CastPolicy) -> Result<()> {
        self.check_widens(value.dtype(), policy)?;
        dispatch!(self, s => s.fill_slice(slice, typed(value)))
    }

    /// Elements that differ from the default, in row-major order
    pub fn entries(&self) -> Vec<(Vec<usize>, Value)> {
        dispatch!(self, s => s
            .entries()
            .into_iter()
            .map(|(coords, value)| (coords, value.into_value()))
            .collect())
    }

    /// Copy into another element type and backend with the default configuration
    ///
    /// Element conversion uses `as` semantics and may narrow.
    pub fn cast(&self, dtype: DType, stype: StorageType) -> Result<Self> {
        self.cast_with(dtype, stype, &StorageConfig::default())
    }

    /// Copy into another element type and backend
    pub fn cast_with(&self, dtype: DType, stype: StorageType, config: &StorageConfig) -> Result<Self> {
        if !stype.supports_rank(self.rank()) {
            return Err(StorageError::backend_cast(self.stype(), stype));
        }

        debug!(
            "casting {} {} storage of shape {:?} to {} {}",
            self.stype(),
            self.dtype(),
            self.shape(),
            stype,
            dtype
        );

        let retyped;
        let source = if dtype == self.dtype() {
            self
        } else {
            retyped = dispatch!(self, s => retype(s, dtype)?);
            &retyped
        };

        Ok(dispatch_map!(source, s => s.to_stype_with(stype, config)?))
    }

    /// Densify a sparse storage whose density reaches the configured threshold
    pub fn normalize(self, config: &StorageConfig) -> Result<Self> {
        if !config.should_densify(&self) {
            return Ok(self);
        }

        debug!(
            "densifying {} storage with {} stored elements",
            self.stype(),
            self.element_count()
        );
        self.cast_with(self.dtype(), StorageType::Dense, config)
    }

    fn check_widens(&self, from: DType, policy: &CastPolicy) -> Result<()> {
        if policy.widens_to(from, self.dtype()) {
            Ok(())
        } else {
            Err(StorageError::dtype_cast(from, self.dtype()))
        }
    }
}

impl StorageInfo for DynamicStorage {
    fn dtype(&self) -> DType {
        dispatch!(self, s => s.dtype())
    }

    fn stype(&self) -> StorageType {
        dispatch!(self, s => s.stype())
    }

    fn shape(&self) -> &[usize] {
        dispatch!(self, s => s.shape())
    }

    fn element_count(&self) -> usize {
        dispatch!(self, s => s.element_count())
    }
}

macro_rules! impl_from_backend {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<StorageBackend<$t>> for DynamicStorage {
                fn from(backend: StorageBackend<$t>) -> Self {
                    DynamicStorage::$variant(backend)
                }
            }

            impl From<crate::DenseStorage<$t>> for DynamicStorage {
                fn from(storage: crate::DenseStorage<$t>) -> Self {
                    DynamicStorage::$variant(storage.into())
                }
            }

            impl From<crate::ListStorage<$t>> for DynamicStorage {
                fn from(storage: crate::ListStorage<$t>) -> Self {
                    DynamicStorage::$variant(storage.into())
                }
            }

            impl From<crate::YaleStorage<$t>> for DynamicStorage {
                fn from(storage: crate::YaleStorage<$t>) -> Self {
                    DynamicStorage::$variant(storage.into())
                }
            }
        )*
    };
}

impl_from_backend!(
    u8 => Byte,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
);
