use crate::adapters::storage::JsonWriter;
use crate::core::orchestrator::{persist, FetchOrchestrator, OutputLayout};
use crate::core::{FetchSnapshot, SourceClient, Storage};
use crate::utils::error::Result;
use std::time::Instant;

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub snapshot: FetchSnapshot,
    pub written: Vec<String>,
}

/// Resolve all categories, then persist. Only a write failure makes `run` fail.
pub struct FetchEngine<C: SourceClient, S: Storage> {
    orchestrator: FetchOrchestrator<C>,
    writer: JsonWriter<S>,
    layout: OutputLayout,
}

impl<C: SourceClient, S: Storage> FetchEngine<C, S> {
    pub fn new(orchestrator: FetchOrchestrator<C>, writer: JsonWriter<S>, layout: OutputLayout) -> Self {
        Self {
            orchestrator,
            writer,
            layout,
        }
    }

    pub async fn run(&self) -> Result<RunReport> {
        let started = Instant::now();
        tracing::info!("🏉 Starting NRL data fetch");

        let snapshot = self.orchestrator.run().await;
        tracing::info!("Snapshot captured at {}", snapshot.timestamp_iso());

        for category in snapshot.categories() {
            match &category.source_used {
                Some(source) => tracing::info!(
                    "  {}: {} records from '{}'",
                    category.category,
                    category.data.len(),
                    source
                ),
                None => tracing::info!("  {}: unavailable", category.category),
            }
        }

        let written = persist(&snapshot, &self.writer, &self.layout).await?;

        tracing::info!(
            "✅ Fetch complete in {:?}: {} files written, {} categories absent",
            started.elapsed(),
            written.len(),
            snapshot.absent_categories().len()
        );

        Ok(RunReport { snapshot, written })
    }
}
