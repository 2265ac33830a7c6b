use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use nw_core::{EmbeddingProvider, Error, GenerationProvider, Result};

use super::ModelConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Ollama HTTP client serving both provider contracts: `/api/embeddings`
/// for query/article vectors and `/api/generate` for completions.
pub struct OllamaModel {
    client: Client,
    base_url: String,
    embed_model: String,
    chat_model: String,
    dimension: usize,
}

impl OllamaModel {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| "http://localhost:11434".to_string()),
            embed_model: config.embed_model.clone(),
            chat_model: config.chat_model.clone(),
            dimension: config.dimension,
        })
    }
}

impl fmt::Debug for OllamaModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OllamaModel")
            .field("base_url", &self.base_url)
            .field("embed_model", &self.embed_model)
            .field("chat_model", &self.chat_model)
            .finish()
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaModel {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            model: &self.embed_model,
            prompt: text,
        };

        let response = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("ollama unreachable: {}", e)))?
            .json::<EmbeddingResponse>()
            .await
            .map_err(|e| Error::Embedding(format!("bad embedding response: {}", e)))?;

        if response.embedding.len() != self.dimension {
            return Err(Error::Embedding(format!(
                "expected {} dims, got {}",
                self.dimension,
                response.embedding.len()
            )));
        }

        Ok(response.embedding)
    }
}

#[async_trait]
impl GenerationProvider for OllamaModel {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: &self.chat_model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Generation(format!("ollama unreachable: {}", e)))?
            .json::<GenerateResponse>()
            .await
            .map_err(|e| Error::Generation(format!("bad completion response: {}", e)))?;

        Ok(response.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_omits_nothing_sensitive_but_stays_compact() {
        let model = OllamaModel::new(&ModelConfig::default()).unwrap();
        let repr = format!("{:?}", model);
        assert!(repr.contains("localhost:11434"));
    }

    #[tokio::test]
    async fn unreachable_server_is_an_embedding_error() {
        let config = ModelConfig {
            base_url: Some("http://127.0.0.1:1".to_string()),
            ..ModelConfig::default()
        };
        let model = OllamaModel::new(&config).unwrap();
        let result = model.embed("hello").await;
        assert!(matches!(result, Err(Error::Embedding(_))));
    }
}
