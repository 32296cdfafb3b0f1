use ragline_core::{corpus, Config, RagPipeline};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ragline_core=info".parse().unwrap()),
        )
        .init();

    let config = Config::load_or_default();
    println!("Model: {}", config.llm.model());
    println!("Embedding model: {}", config.embedding_model());
    println!("Base URL: {}", config.llm.base_url());

    let mut pipeline = match RagPipeline::from_config(&config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to create providers: {}", e);
            return;
        }
    };

    if let Err(e) = pipeline.build(corpus::default_documents()).await {
        eprintln!("\nIndex build failed: {}", e);
        eprintln!("\nTroubleshooting:");
        eprintln!("  1. Is Ollama running? (ollama serve)");
        eprintln!("  2. Is the embedding model pulled? (ollama pull {})", config.embedding_model());
        eprintln!("  3. Is the base URL correct? ({})", config.llm.base_url());
        return;
    }

    let query = "What is a retriever used for?";
    println!("\nQuestion: {}", query);

    match pipeline.answer(query).await {
        Ok(answer) => {
            println!("\n==== Answer ====\n{}", answer);
            for source in &answer.sources {
                println!("  [{:.4}] {}", source.distance, source.document.content);
            }
        }
        Err(e) => {
            eprintln!("\nAnswer failed: {}", e);
            eprintln!("  Is the model pulled? (ollama pull {})", config.llm.model());
        }
    }
}
