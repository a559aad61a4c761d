//! nmstore - Multi-representation matrix storage
//!
//! This library provides dense, list-of-lists and Yale storage backends behind
//! one contract, so operations can mix representations and address
//! rectangular sub-regions without caring how elements are laid out.
//!
//! ## Architecture
//!
//! nmstore follows a contract/implementation separation:
//!
//! - **nmstore-core**: Element types, slice descriptors, capacity checks,
//!   storage traits and the casting policy (no allocation of storages, no I/O)
//! - **nmstore**: Concrete backends, conversions, configuration and parallel
//!   block helpers
//!
//! ## Quick Start
//!
//! ```rust
//! use nmstore::{prepare, CastPolicy, DenseStorage, DynamicStorage, ListStorage, Storage};
//!
//! fn example() -> nmstore::Result<()> {
//!     let dense: DynamicStorage = DenseStorage::new(&[2, 3], vec![1i32, 0, 2, 0, 3, 0])?.into();
//!
//!     let mut list = ListStorage::<i32>::zeros(&[2, 3])?;
//!     list.set(&[1, 1], 3)?;
//!     let sparse: DynamicStorage = list.into();
//!
//!     // Both operands end up in one element type and backend
//!     let operands = prepare(&dense, &sparse, &CastPolicy::default())?;
//!     operands.for_each_pair(|coords, a, b| println!("{coords:?}: {a} {b}"))?;
//!     Ok(())
//! }
//! # example().unwrap();
//! ```
//!
//! ## Features
//!
//! - **Three layouts**: Contiguous dense, nested ordered lists, compressed Yale
//! - **Slicing**: Copy-out sub-regions with bounds and overflow checks
//! - **Table-driven casting**: Common element type and backend for mixed operands
//! - **Densification**: Switch sparse storages to dense above a density threshold
//! - **Parallel blocks**: Tile a storage and copy the blocks out with rayon

// Re-export core abstractions
pub use nmstore_core::{
    // Core traits
    Element, Storage, StorageInfo,
    // Tags and values
    DType, StorageType, Value,
    // Slicing and pairing
    pair, Slice, StoragePair,
    // Casting policy
    CastPlan, CastPolicy, Conversion, UpcastTable,
    // Error handling
    CastTarget, ErrorCategory, Result, StorageError,
    // Validation utilities
    count_max_elements, validate_coords, validate_shape,
};

// Implementation modules
pub mod backend;
pub mod binary;
pub mod blocks;
pub mod config;
pub mod dense;
pub mod dynamic;
pub mod list;
pub mod yale;

// Public exports
pub use backend::StorageBackend;
pub use binary::{prepare, storage_eq, CastOperands};
pub use blocks::{materialize, materialize_dynamic, partition};
pub use config::StorageConfig;
pub use dense::DenseStorage;
pub use dynamic::DynamicStorage;
pub use list::ListStorage;
pub use yale::YaleStorage;
