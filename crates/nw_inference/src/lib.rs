pub mod models;

pub use models::{create_model, DummyModel, ModelConfig, ModelHandles, OllamaModel};

pub mod prelude {
    pub use super::models::{create_model, ModelConfig, ModelHandles};
    pub use nw_core::{EmbeddingProvider, Error, GenerationProvider, Result};
}
