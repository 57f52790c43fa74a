/**
 * LexDraft Probe
 *
 * Fetches one document and its comments from the document store, loads
 * them the way a document view would, and prints a summary together with
 * the transport URL the view would connect to.
 *
 * Usage: lexdraft-probe <document-id>
 */
use lexdraft::api::DocumentApi;
use lexdraft::editor::{DocumentNode, StructuredDocumentModel};
use lexdraft::offline::OptimisticStore;
use lexdraft::shared::{AppConfig, DocumentId};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    lexdraft::logging::init_tracing("lexdraft=info");

    let Some(document_id) = std::env::args().nth(1).as_deref().and_then(DocumentId::parse) else {
        eprintln!("usage: lexdraft-probe <document-id>");
        return ExitCode::FAILURE;
    };

    match run(&document_id).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("[Probe] {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(document_id: &DocumentId) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    let api = DocumentApi::new(&config)?;

    let record = api.get_document(document_id).await?;
    let comments = api.fetch_comments(document_id).await?;

    let mut store = OptimisticStore::new();
    store.load(comments);

    let latest = record.latest_version();
    let model = latest
        .and_then(|version| DocumentNode::from_value(&version.content))
        .map(StructuredDocumentModel::new);

    println!("document:  {}", record.id);
    println!("title:     {}", record.title.as_deref().unwrap_or("(untitled)"));
    println!("versions:  {}", record.document_versions.len());
    if let Some(version) = latest {
        println!("latest:    v{}", version.version_number);
    }
    match &model {
        Some(model) => println!(
            "structure: {} block(s), {} positions",
            model.root().children.len(),
            model.content_size()
        ),
        None => println!("structure: content is not a structured document"),
    }
    println!(
        "comments:  {} ({} thread(s))",
        store.len(),
        store.roots().count()
    );
    println!("transport: {}", config.websocket_url(document_id)?);
    Ok(())
}
