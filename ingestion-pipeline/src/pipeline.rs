use std::{
    path::Path,
    sync::Arc,
    time::{Duration, Instant},
};

use common::{
    error::AppError,
    storage::{db::SurrealDbClient, types::document_chunk::DocumentChunk},
    utils::{config::AppConfig, embedding::EmbeddingProvider},
};
use serde::Serialize;
use text_splitter::{ChunkConfig, TextSplitter};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::loader::load_markdown_dir;

/// Sliding-window bounds for the recursive character splitter.
pub const CHUNK_SIZE_CHARS: usize = 1000;
pub const CHUNK_OVERLAP_CHARS: usize = 200;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub files: usize,
    pub chunks: usize,
    pub elapsed_seconds: f64,
}

/// Orchestrates loader, splitter, embedding provider, and the vector index
/// into the one-shot "ingest the markdown directory" operation.
pub struct IngestionPipeline {
    db: Arc<SurrealDbClient>,
    embedding: Arc<EmbeddingProvider>,
    config: AppConfig,
}

impl IngestionPipeline {
    pub fn new(
        db: Arc<SurrealDbClient>,
        embedding: Arc<EmbeddingProvider>,
        config: AppConfig,
    ) -> Self {
        Self {
            db,
            embedding,
            config,
        }
    }

    /// Runs the full ingestion and returns its report.
    ///
    /// A heartbeat task logs elapsed time every five seconds while the work
    /// runs. Its cancellation token sits behind a drop guard, so the task is
    /// stopped and joined on every exit path before this method returns.
    pub async fn run(&self) -> Result<IngestReport, AppError> {
        let started = Instant::now();
        info!("starting markdown ingestion");

        // validated up front so a bad directory aborts before any work or
        // heartbeat starts
        let markdown_dir = Path::new(&self.config.markdown_dir);
        if !markdown_dir.is_dir() {
            return Err(AppError::NotFound(format!(
                "markdown directory not found: {}",
                markdown_dir.display()
            )));
        }

        let token = CancellationToken::new();
        let heartbeat = tokio::spawn(run_heartbeat(token.clone(), started));
        let guard = token.drop_guard();

        let outcome = self.ingest_inner().await;

        drop(guard);
        if let Err(join_error) = heartbeat.await {
            warn!("ingestion heartbeat task failed to join: {join_error}");
        }

        let (files, chunks) = outcome?;
        let elapsed_seconds = (started.elapsed().as_secs_f64() * 100.0).round() / 100.0;
        info!(files, chunks, elapsed_seconds, "ingestion finished");

        Ok(IngestReport {
            files,
            chunks,
            elapsed_seconds,
        })
    }

    async fn ingest_inner(&self) -> Result<(usize, usize), AppError> {
        let documents = load_markdown_dir(Path::new(&self.config.markdown_dir))?;
        let files = documents.len();
        info!("documents loaded: {files}");

        let mut sources = Vec::new();
        let mut texts = Vec::new();
        for document in &documents {
            for piece in split_text(&document.text)? {
                sources.push(document.source.clone());
                texts.push(piece);
            }
        }
        let chunk_count = texts.len();
        info!("chunks generated: {chunk_count}");

        info!(
            backend = self.embedding.backend_label(),
            dimension = self.embedding.dimension(),
            "generating embeddings"
        );
        let embeddings = self.embedding.embed_batch(texts.clone()).await?;
        if embeddings.len() != chunk_count {
            return Err(AppError::Validation(format!(
                "embedding provider returned {} vectors for {chunk_count} chunks",
                embeddings.len()
            )));
        }

        self.db.ensure_chunk_index(self.embedding.dimension()).await?;
        for ((source, text), embedding) in sources.into_iter().zip(texts).zip(embeddings) {
            self.db
                .store_item(DocumentChunk::new(source, text, embedding))
                .await?;
        }
        info!("index persisted at {}", self.config.index_dir);

        Ok((files, chunk_count))
    }
}

/// Splits raw document text into overlapping windows of at most
/// `CHUNK_SIZE_CHARS` characters, preferring paragraph, sentence, and word
/// boundaries before hard cuts. Trimming is disabled so the windows cover the
/// full input text.
pub fn split_text(text: &str) -> Result<Vec<String>, AppError> {
    let chunk_config = ChunkConfig::new(CHUNK_SIZE_CHARS)
        .with_overlap(CHUNK_OVERLAP_CHARS)
        .map_err(|e| AppError::Validation(format!("invalid chunk overlap: {e}")))?
        .with_trim(false);
    let splitter = TextSplitter::new(chunk_config);

    Ok(splitter.chunks(text).map(str::to_owned).collect())
}

async fn run_heartbeat(token: CancellationToken, started: Instant) {
    let mut ticker = tokio::time::interval(HEARTBEAT_INTERVAL);
    // the first tick fires immediately; consume it so logging starts after
    // one full interval
    ticker.tick().await;
    loop {
        tokio::select! {
            () = token.cancelled() => break,
            _ = ticker.tick() => {
                info!("ingestion in progress... {:.1}s", started.elapsed().as_secs_f64());
            }
        }
    }
}
