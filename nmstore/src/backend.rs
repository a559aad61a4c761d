//! Typed union over the concrete backends
//!
//! [`StorageBackend`] fixes the element type and lets the layout vary at
//! runtime. Conversions between layouts always copy.

use nmstore_core::traits::storage::check_source_shape;
use nmstore_core::{
    DType, Element, Result, Slice, Storage, StorageError, StorageInfo, StorageType,
};

use crate::config::StorageConfig;
use crate::dense::DenseStorage;
use crate::list::ListStorage;
use crate::yale::YaleStorage;

/// A storage of element type `T` in any backend
#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend<T: Element> {
    Dense(DenseStorage<T>),
    List(ListStorage<T>),
    Yale(YaleStorage<T>),
}

macro_rules! each_backend {
    ($self:expr, $s:ident => $body:expr) => {
        match $self {
            StorageBackend::Dense($s) => $body,
            StorageBackend::List($s) => $body,
            StorageBackend::Yale($s) => $body,
        }
    };
}

impl<T: Element> StorageBackend<T> {
    /// An all-zero storage in the given backend
    pub fn zeros(stype: StorageType, shape: &[usize]) -> Result<Self> {
        Ok(match stype {
            StorageType::Dense => StorageBackend::Dense(DenseStorage::zeros(shape)?),
            StorageType::List => StorageBackend::List(ListStorage::zeros(shape)?),
            StorageType::Yale => StorageBackend::Yale(YaleStorage::zeros(shape)?),
        })
    }

    /// Value of positions that are not explicitly stored
    pub fn default_value(&self) -> T {
        each_backend!(self, s => s.default_value())
    }

    /// Elements that differ from the default, in row-major order
    pub fn entries(&self) -> Vec<(Vec<usize>, T)> {
        each_backend!(self, s => s.entries())
    }

    /// Copy into another backend with the default configuration
    pub fn to_stype(&self, stype: StorageType) -> Result<Self> {
        self.to_stype_with(stype, &StorageConfig::default())
    }

    /// Copy into another backend
    ///
    /// Fails with `IncompatibleCast` when `stype` cannot hold this rank.
    pub fn to_stype_with(&self, stype: StorageType, config: &StorageConfig) -> Result<Self> {
        if !stype.supports_rank(self.rank()) {
            return Err(StorageError::backend_cast(self.stype(), stype));
        }
        if stype == self.stype() {
            return Ok(self.clone());
        }

        let shape = self.shape();
        let default = self.default_value();
        Ok(match stype {
            StorageType::Dense => {
                let mut dense = DenseStorage::filled(shape, default)?;
                for (coords, value) in self.entries() {
                    dense.set(&coords, value)?;
                }
                dense.into()
            }
            StorageType::List => {
                let mut list = ListStorage::new(shape, default)?;
                for (coords, value) in self.entries() {
                    list.set(&coords, value)?;
                }
                list.into()
            }
            StorageType::Yale if default.is_zero() => {
                YaleStorage::from_entries(shape, self.entries(), config.yale_capacity_hint)?.into()
            }
            StorageType::Yale => {
                // Yale has no default of its own, so every position is materialized
                let values = Slice::full(shape)?
                    .positions()
                    .map(|(coords, _)| self.get(&coords).map(|value| (coords, value)))
                    .collect::<Result<Vec<_>>>()?;
                YaleStorage::from_entries(shape, values, config.yale_capacity_hint)?.into()
            }
        })
    }

    /// Apply `f` to every element, keeping the backend
    ///
    /// Sparse layouts apply `f` to their default too; a Yale storage whose
    /// zero does not map to zero is rebuilt from every position.
    pub fn map<U, F>(&self, f: F) -> Result<StorageBackend<U>>
    where
        U: Element,
        F: Fn(T) -> U,
    {
        Ok(match self {
            StorageBackend::Dense(dense) => {
                let elements = dense.elements().iter().map(|&v| f(v)).collect();
                StorageBackend::Dense(DenseStorage::<U>::new(dense.shape(), elements)?)
            }
            StorageBackend::List(list) => {
                let mut mapped = ListStorage::new(list.shape(), f(list.default_value()))?;
                for (coords, value) in list.entries() {
                    mapped.set(&coords, f(value))?;
                }
                mapped.into()
            }
            StorageBackend::Yale(yale) => {
                let capacity = yale.capacity();
                let entries = if f(T::zero()).is_zero() {
                    yale.entries()
                        .into_iter()
                        .map(|(coords, value)| (coords, f(value)))
                        .collect::<Vec<_>>()
                } else {
                    Slice::full(yale.shape())?
                        .positions()
                        .map(|(coords, _)| yale.get(&coords).map(|value| (coords, f(value))))
                        .collect::<Result<Vec<_>>>()?
                };
                YaleStorage::from_entries(yale.shape(), entries, capacity)?.into()
            }
        })
    }
}

impl<T: Element> StorageInfo for StorageBackend<T> {
    fn dtype(&self) -> DType {
        T::DTYPE
    }

    fn stype(&self) -> StorageType {
        each_backend!(self, s => s.stype())
    }

    fn shape(&self) -> &[usize] {
        each_backend!(self, s => s.shape())
    }

    fn element_count(&self) -> usize {
        each_backend!(self, s => s.element_count())
    }
}

impl<T: Element> Storage for StorageBackend<T> {
    type Element = T;

    fn get(&self, coords: &[usize]) -> Result<T> {
        each_backend!(self, s => s.get(coords))
    }

    fn set(&mut self, coords: &[usize], value: T) -> Result<()> {
        each_backend!(self, s => s.set(coords, value))
    }

    fn get_slice(&self, slice: &Slice) -> Result<Self> {
        Ok(each_backend!(self, s => s.get_slice(slice)?.into()))
    }

    /// Sources in another backend are converted to this one first
    fn set_slice(&mut self, slice: &Slice, source: &Self) -> Result<()> {
        slice.validate(self.shape())?;
        check_source_shape(slice, source.shape())?;

        let converted;
        let source = if source.stype() == self.stype() {
            source
        } else {
            converted = source.to_stype(self.stype())?;
            &converted
        };

        match (self, source) {
            (StorageBackend::Dense(d), StorageBackend::Dense(s)) => d.set_slice(slice, s),
            (StorageBackend::List(d), StorageBackend::List(s)) => d.set_slice(slice, s),
            (StorageBackend::Yale(d), StorageBackend::Yale(s)) => d.set_slice(slice, s),
            (target, source) => Err(StorageError::backend_cast(source.stype(), target.stype())),
        }
    }

    fn fill_slice(&mut self, slice: &Slice, value: T) -> Result<()> {
        each_backend!(self, s => s.fill_slice(slice, value))
    }
}

impl<T: Element> From<DenseStorage<T>> for StorageBackend<T> {
    fn from(storage: DenseStorage<T>) -> Self {
        StorageBackend::Dense(storage)
    }
}

impl<T: Element> From<ListStorage<T>> for StorageBackend<T> {
    fn from(storage: ListStorage<T>) -> Self {
        StorageBackend::List(storage)
    }
}

impl<T: Element> From<YaleStorage<T>> for StorageBackend<T> {
    fn from(storage: YaleStorage<T>) -> Self {
        StorageBackend::Yale(storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense() -> StorageBackend<i32> {
        DenseStorage::new(&[2, 3], vec![1, 0, 2, 0, 3, 0]).unwrap().into()
    }

    fn all_values<T: Element>(storage: &StorageBackend<T>) -> Vec<T> {
        Slice::full(storage.shape())
            .unwrap()
            .positions()
            .map(|(coords, _)| storage.get(&coords).unwrap())
            .collect()
    }

    #[test]
    fn test_zeros_every_backend() {
        for stype in StorageType::ALL {
            let storage = StorageBackend::<f32>::zeros(stype, &[3, 3]).unwrap();
            assert_eq!(storage.stype(), stype);
            assert_eq!(storage.dtype(), DType::Float32);
            assert_eq!(all_values(&storage), vec![0.0; 9]);
        }
        assert!(StorageBackend::<f32>::zeros(StorageType::Yale, &[3]).is_err());
    }

    #[test]
    fn test_to_stype_round_trip() {
        let source = dense();
        for stype in StorageType::ALL {
            let converted = source.to_stype(stype).unwrap();
            assert_eq!(converted.stype(), stype);
            assert_eq!(converted.shape(), source.shape());
            assert_eq!(all_values(&converted), all_values(&source));

            let back = converted.to_stype(StorageType::Dense).unwrap();
            assert_eq!(back, source);
        }
    }

    #[test]
    fn test_negative_zero_survives_conversion() {
        let source: StorageBackend<f64> = DenseStorage::new(&[2, 2], vec![-0.0, 1.0, -0.0, 0.0])
            .unwrap()
            .into();
        for stype in [StorageType::List, StorageType::Yale] {
            let back = source
                .to_stype(stype)
                .and_then(|sparse| sparse.to_stype(StorageType::Dense))
                .unwrap();
            for coords in [[0, 0], [1, 0]] {
                assert!(back.get(&coords).unwrap().is_sign_negative(), "{stype} {coords:?}");
            }
            assert!(back.get(&[1, 1]).unwrap().is_sign_positive());
        }
    }

    #[test]
    fn test_to_stype_rank_unsupported() {
        let storage = StorageBackend::<i8>::zeros(StorageType::List, &[2, 2, 2]).unwrap();
        assert_eq!(
            storage.to_stype(StorageType::Yale),
            Err(StorageError::backend_cast(StorageType::List, StorageType::Yale))
        );
    }

    #[test]
    fn test_list_with_default_to_yale() {
        let mut list = ListStorage::new(&[2, 2], 5i64).unwrap();
        list.set(&[0, 1], 0).unwrap();
        let storage = StorageBackend::from(list);

        let yale = storage.to_stype(StorageType::Yale).unwrap();
        assert_eq!(all_values(&yale), vec![5, 0, 5, 5]);

        let dense = storage.to_stype(StorageType::Dense).unwrap();
        assert_eq!(all_values(&dense), vec![5, 0, 5, 5]);
    }

    #[test]
    fn test_yale_capacity_hint() {
        let config = StorageConfig::default().with_yale_capacity_hint(32);
        let yale = dense().to_stype_with(StorageType::Yale, &config).unwrap();
        match yale {
            StorageBackend::Yale(yale) => assert!(yale.capacity() >= 32),
            other => panic!("expected yale, got {:?}", other.stype()),
        }
    }

    #[test]
    fn test_map() {
        for stype in StorageType::ALL {
            let storage = dense().to_stype(stype).unwrap();
            let doubled = storage.map(|v| f64::from(v) * 2.0).unwrap();
            assert_eq!(doubled.stype(), stype);
            assert_eq!(all_values(&doubled), vec![2.0, 0.0, 4.0, 0.0, 6.0, 0.0]);

            let shifted = storage.map(|v| v + 1).unwrap();
            assert_eq!(all_values(&shifted), vec![2, 1, 3, 1, 4, 1]);
        }
    }

    #[test]
    fn test_set_slice_across_backends() {
        let mut target = StorageBackend::<i32>::zeros(StorageType::Yale, &[3, 3]).unwrap();
        let source: StorageBackend<i32> = DenseStorage::new(&[2, 2], vec![1, 2, 3, 4])
            .unwrap()
            .into();
        target
            .set_slice(&Slice::from_ranges(&[0..2, 1..3]).unwrap(), &source)
            .unwrap();

        assert_eq!(target.stype(), StorageType::Yale);
        assert_eq!(all_values(&target), vec![0, 1, 2, 0, 3, 4, 0, 0, 0]);
    }
}
