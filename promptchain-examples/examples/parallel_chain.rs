//! Named fan-out: analyze the same product description for pros and for cons with two sub-chains
//! sharing one model, then print the keyed results.
//!
//! Run with:
//! ```bash
//! export OPENAI_API_KEY="your-key"
//! cargo run --package promptchain-examples --example parallel_chain
//! ```

use std::collections::HashMap;

use promptchain::chain::{stage, Chain, ChainExt, Parallel};
use promptchain::message::Message;
use promptchain::prompt::ChatTemplate;
use promptchain::utils::llm::openai::{ChatModel, ChatModelConfig};
use promptchain::utils::postprocess::string::trim_reply;

fn analysis_chain(model: ChatModel, aspect: &str) -> impl Chain<Input = String, Output = String> {
    let template = ChatTemplate::new()
        .system("You are an expert product reviewer.")
        .human(format!("List the {aspect} of this product: {{[product]}}"));
    stage(|product: String| Ok(HashMap::from([("product".to_string(), product)])))
        .pipe(template)
        .pipe(model)
        .pipe(stage(|reply: Message| Ok(trim_reply(reply.content))))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var("OPENAI_API_KEY").is_err() {
        eprintln!("OPENAI_API_KEY is not set");
        std::process::exit(1);
    }

    let model = ChatModel::new(ChatModelConfig::new("gpt-4o-mini"));
    let fan_out = Parallel::new()
        .branch("pros", analysis_chain(model.clone(), "three main advantages"))
        .branch("cons", analysis_chain(model, "three main drawbacks"));

    let results = fan_out
        .run("a mechanical keyboard with hot-swappable switches".to_string())
        .await?;
    println!("Pros:\n{}\n", results["pros"]);
    println!("Cons:\n{}", results["cons"]);
    Ok(())
}
