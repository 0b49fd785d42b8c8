use anyhow::Context;
use smedocs::{config, logging, processing::KnowledgeService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::init_config();
    logging::init_tracing();
    let config = config::get_config();

    let service = KnowledgeService::load(config).context("Failed to initialize knowledge service")?;
    let outcome = service
        .rebuild_from_directory(&config.input_dir)
        .await
        .with_context(|| format!("Failed to process {}", config.input_dir.display()))?;
    tracing::info!(
        processed = outcome.documents_processed,
        skipped = outcome.documents_skipped,
        headings = outcome.headings,
        "Extraction finished"
    );

    if config.search_url.is_some() {
        let summary = service
            .index_documents()
            .await
            .context("Failed to index documents")?;
        tracing::info!(
            index = %config.search_index,
            inserted = summary.inserted,
            updated = summary.updated,
            "Documents indexed"
        );
    }

    Ok(())
}
