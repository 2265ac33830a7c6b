use std::sync::Arc;

use nw_core::{EmbeddingProvider, Error, GenerationProvider, Result};

pub mod dummy;
pub mod ollama;

pub use dummy::DummyModel;
pub use ollama::OllamaModel;

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub base_url: Option<String>,
    pub embed_model: String,
    pub chat_model: String,
    pub dimension: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            embed_model: "nomic-embed-text".to_string(),
            chat_model: "llama3.1".to_string(),
            dimension: 768,
        }
    }
}

/// Both provider handles for one configured model. A single backing
/// struct usually serves both contracts.
pub struct ModelHandles {
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub generator: Arc<dyn GenerationProvider>,
}

pub fn create_model(name: &str, config: &ModelConfig) -> Result<ModelHandles> {
    match name {
        "ollama" => {
            let model = Arc::new(OllamaModel::new(config)?);
            Ok(ModelHandles {
                embedder: model.clone(),
                generator: model,
            })
        }
        "dummy" => {
            let model = Arc::new(DummyModel::new(config.dimension));
            Ok(ModelHandles {
                embedder: model.clone(),
                generator: model,
            })
        }
        other => Err(Error::Generation(format!("unknown model: {}", other))),
    }
}
