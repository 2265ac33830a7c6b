pub mod memory;

#[cfg(feature = "qdrant")]
pub mod qdrant;

pub use memory::MemoryStore;

#[cfg(feature = "qdrant")]
pub use qdrant::QdrantStore;
