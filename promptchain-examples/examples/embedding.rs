//! Compute text embeddings and compare two sentences by cosine similarity.
//!
//! Run with:
//! ```bash
//! export OPENAI_API_KEY="your-key"
//! cargo run --package promptchain-examples --example embedding
//! ```

use promptchain::utils::embedding::{AsyncSimplyEmbed, EmbedVec, GetEmbedDim, OpenAIEmbedding};

fn cosine_similarity(a: &EmbedVec, b: &EmbedVec) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    dot / (norm_a * norm_b)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var("OPENAI_API_KEY").is_err() {
        eprintln!("OPENAI_API_KEY is not set");
        std::process::exit(1);
    }

    let embedder = OpenAIEmbedding::new("text-embedding-3-small");
    println!("Model dimension: {:?}", embedder.embedding_dim());

    let first = embedder.embed("The cat sits on the mat.").await?;
    let second = embedder.embed("A feline rests on a rug.").await?;
    println!("Embedding length: {}", first.len());
    println!("First values: {:?}", &first[..4.min(first.len())]);
    println!("Cosine similarity: {:.4}", cosine_similarity(&first, &second));
    Ok(())
}
