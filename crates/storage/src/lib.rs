//! Storage abstraction and implementations for SyllabusSync.
//!
//! This crate provides the trait-based data-access interface with a JSON
//! file backend and an in-memory backend.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_storage;
pub mod memory;

pub use trait_::{Storage, StorageError, Result, AlertFilter, PlanFilter};
pub use json_storage::JsonStorage;
pub use memory::MemoryStorage;
