//! Document store adapters.

mod memory;

pub use memory::{MemoryCategoryStore, MemoryPostStore, MemoryUserStore};
