//! Predicate branch: classify a piece of customer feedback, then dispatch on the classification
//! with string-containment predicates, first match wins.
//!
//! Run with:
//! ```bash
//! export OPENAI_API_KEY="your-key"
//! cargo run --package promptchain-examples --example branch_chain
//! ```

use std::collections::HashMap;

use promptchain::chain::{stage, Branch, Chain, ChainExt};
use promptchain::message::Message;
use promptchain::prompt::ChatTemplate;
use promptchain::utils::llm::openai::{ChatModel, ChatModelConfig};
use promptchain::utils::postprocess::string::trim_reply;

fn response_chain(model: ChatModel, instruction: &str) -> impl Chain<Input = String, Output = String> {
    let template = ChatTemplate::new()
        .system("You are a customer support assistant.")
        .human(format!("{instruction}: {{[feedback]}}"));
    stage(|feedback: String| Ok(HashMap::from([("feedback".to_string(), feedback)])))
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

    let classify = ChatTemplate::new()
        .system("Classify the sentiment of this feedback as positive, negative, or neutral. Answer with one word.")
        .human("{[feedback]}")
        .pipe(model.clone())
        .pipe(stage(|reply: Message| Ok(trim_reply(reply.content).to_lowercase())));

    let dispatch = Branch::new(response_chain(
        model.clone(),
        "Ask for more details about this feedback",
    ))
    .when(
        |sentiment: &String| sentiment.contains("positive"),
        response_chain(model.clone(), "Write a thank-you note for this positive feedback"),
    )
    .when(
        |sentiment: &String| sentiment.contains("negative"),
        response_chain(model.clone(), "Write an apology addressing this negative feedback"),
    );

    let feedback = "The keyboard feels great, but two keycaps arrived cracked.";
    let sentiment = classify
        .run(HashMap::from([("feedback".to_string(), feedback.to_string())]))
        .await?;
    println!("Sentiment: {}", sentiment);

    let response = dispatch.run(sentiment).await?;
    println!("Response:\n{}", response);
    Ok(())
}
