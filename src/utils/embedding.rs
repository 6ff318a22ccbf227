use anyhow::{anyhow, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput, EmbeddingUsage};
use async_openai::Client;
use async_trait::async_trait;

/// Vector of floats representing an embedding.
pub type EmbedVec = Vec<f32>;

//TODO: when negative trait bound is implemented, add blanket AsyncSimplyEmbed impl for AsyncEmbed
//TODO: when async fn in trait is implemented, remove async_trait macro

/// Trait for getting the embedding dimension.
pub trait GetEmbedDim {
    fn embedding_dim(&self) -> Option<usize>;
}

/// Trait for embedding a string and outputting the embedding vector and extra info.
pub trait Embed: GetEmbedDim {
    type OutputExtra;
    fn embed(&self, string: impl Into<String>) -> Result<(EmbedVec, Self::OutputExtra)>;
}

/// Trait for embedding a string and outputting the embedding vector.
pub trait SimplyEmbed: GetEmbedDim {
    fn embed(&self, string: impl Into<String>) -> Result<EmbedVec>;
}

/// Blanket impl of SimplyEmbed for Embed trait.
impl<T> SimplyEmbed for T where T: Embed {
    fn embed(&self, string: impl Into<String>) -> Result<EmbedVec> {
        Embed::embed(self, string).map(|e| e.0)
    }
}

/// Async version of Embed trait.
#[async_trait]
pub trait AsyncEmbed: GetEmbedDim {
    type OutputExtra;
    async fn embed(&self, string: impl Into<String> + Send) -> Result<(EmbedVec, Self::OutputExtra)>;
}

/// Async version of SimplyEmbed trait.
#[async_trait]
pub trait AsyncSimplyEmbed: GetEmbedDim {
    async fn embed(&self, string: impl Into<String> + Send) -> Result<EmbedVec>;
}

/// Embedding model from the OpenAI embeddings endpoint.
#[derive(Clone, Debug)]
pub struct OpenAIEmbedding {
    pub client: Client<OpenAIConfig>,
    pub embedding_model: String,
}

impl OpenAIEmbedding {
    /// Create an embedding endpoint with credentials from the environment.
    pub fn new(embedding_model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            embedding_model: embedding_model.into(),
        }
    }

    /// send a request to the embeddings endpoint. Returns the embedding vector and usage, or an error.
    async fn request_embed(&self, string: impl Into<String>) -> Result<(EmbedVec, EmbeddingUsage)> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(self.embedding_model.as_str())
            .input(EmbeddingInput::String(string.into()))
            .build()?;
        let mut response = self.client.embeddings().create(request).await?;
        let embedding = response.data.pop()
            .ok_or_else(|| anyhow!("embedding response from model {} contained no data", self.embedding_model))?
            .embedding;
        Ok((embedding, response.usage))
    }
}

impl GetEmbedDim for OpenAIEmbedding {
    fn embedding_dim(&self) -> Option<usize> {
        match self.embedding_model.as_str() {
            "text-embedding-3-small" => Some(1536),
            "text-embedding-3-large" => Some(3072),
            "text-embedding-ada-002" => Some(1536),
            _ => None,
        }
    }
}

#[async_trait]
impl AsyncEmbed for OpenAIEmbedding {
    type OutputExtra = EmbeddingUsage;

    async fn embed(&self, string: impl Into<String> + Send) -> Result<(EmbedVec, Self::OutputExtra)> {
        self.request_embed(string).await
    }
}

#[async_trait]
impl AsyncSimplyEmbed for OpenAIEmbedding {
    async fn embed(&self, string: impl Into<String> + Send) -> Result<EmbedVec> {
        self.request_embed(string).await.map(|e| e.0)
    }
}

#[cfg(test)]
mod test_embedding {
    use super::{GetEmbedDim, OpenAIEmbedding};

    #[test]
    fn test_known_dimensions() {
        assert_eq!(OpenAIEmbedding::new("text-embedding-3-small").embedding_dim(), Some(1536));
        assert_eq!(OpenAIEmbedding::new("text-embedding-3-large").embedding_dim(), Some(3072));
        assert_eq!(OpenAIEmbedding::new("some-unknown-model").embedding_dim(), None);
    }
}
