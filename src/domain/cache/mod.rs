//! Cache domain - key namespace, cache abstraction and invalidation table

mod invalidation;
mod key;
mod repository;

pub use invalidation::{Invalidation, Mutation};
pub use key::{normalize_search_term, CacheKey, KeyFamily};
pub use repository::{Cache, CacheExt};

#[cfg(test)]
pub use repository::mock::MockCache;
