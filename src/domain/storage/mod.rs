//! Storage domain - Generic document store abstraction

mod entity;
mod repository;

pub use entity::{StorageEntity, StorageKey};
pub use repository::{Filter, Mutator, Storage};

#[cfg(test)]
pub use repository::mock;
