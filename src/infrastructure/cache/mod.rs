//! Cache infrastructure - moka-backed cache and the read-through helper

mod in_memory;
mod read_through;

pub use in_memory::{InMemoryCache, InMemoryCacheConfig};
pub use read_through::ReadThroughCache;
