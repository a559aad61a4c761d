//! Abstract interfaces for matrix storage
//!
//! This module defines the contracts every backend satisfies. Traits are
//! pure interfaces; the concrete backends live in the `nmstore` crate.

pub mod element;
pub mod storage;

pub use element::Element;
pub use storage::{Storage, StorageInfo};
