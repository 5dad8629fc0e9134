//! Consolidation worker binary: consumes `consolidation.requests` and runs
//! each message through [`Coordinator::run_consolidation_job`]. Unlike the
//! extraction worker, a consolidation run never emits a follow-up job.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use cortex_core::config::CortexConfig;
use cortex_coordinator::Coordinator;
use cortex_embeddings::HttpEmbeddingProvider;
use cortex_llm::HttpLlmProvider;
use cortex_queue::{ConsolidationMessage, Worker, CONSOLIDATION_QUEUE};
use cortex_sessions::HttpSessionsClient;
use cortex_storage::SqliteStore;
use cortex_vector::QdrantVectorStore;
use tokio::sync::watch;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "consolidation-worker", about = "Cortex consolidation job worker")]
struct Args {
    #[arg(long, default_value = "cortex.toml")]
    config: PathBuf,
}

fn main() {
    let args = Args::parse();
    cortex_observability::tracing_setup::init(false);

    let config = match CortexConfig::load_from(&args.config) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "failed to load configuration");
            std::process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to start async runtime");
            std::process::exit(2);
        }
    };

    std::process::exit(runtime.block_on(run(config)));
}

async fn run(config: CortexConfig) -> i32 {
    let storage = match SqliteStore::open(std::path::Path::new(&config.storage.relational_url)) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            error!(error = %e, "failed to open relational store");
            return 2;
        }
    };

    let vector = match QdrantVectorStore::connect(
        &config.vector.vector_url,
        config.vector.collection_name.clone(),
        config.embedding.dimensions,
    ) {
        Ok(v) => Arc::new(v),
        Err(e) => {
            error!(error = %e, "failed to connect to vector store");
            return 2;
        }
    };

    let coordinator = Arc::new(Coordinator::new(
        Arc::new(HttpSessionsClient::new(&config.sessions)),
        Arc::new(HttpLlmProvider::new(config.llm.clone())),
        Arc::new(HttpEmbeddingProvider::new(config.embedding.clone())),
        storage,
        vector,
        config.extraction.clone(),
        config.consolidation.clone(),
        config.sessions.clone(),
        config.embedding.clone(),
    ));

    let worker = match Worker::connect_with_retry(config.queue.clone(), 5).await {
        Ok(w) => w,
        Err(e) => {
            error!(error = %e, "broker unreachable after retries");
            return 2;
        }
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    let result = worker
        .run::<ConsolidationMessage, _, _>(CONSOLIDATION_QUEUE, shutdown_rx, move |message| {
            let coordinator = coordinator.clone();
            async move {
                let mut job = message.into_job();
                coordinator.run_consolidation_job(&mut job).await?;
                Ok(true)
            }
        })
        .await;

    if let Err(e) = result {
        error!(error = %e, "consolidation worker loop exited with an error");
        return 2;
    }

    if let Err(e) = worker.close().await {
        error!(error = %e, "error during graceful shutdown");
        return 2;
    }

    0
}
