use crate::adapters::storage::JsonWriter;
use crate::core::resolver::{CategoryResolver, SourceSpec};
use crate::core::{Category, FetchSnapshot, SourceClient, Storage};
use crate::utils::error::Result;
use chrono::Utc;
use std::collections::BTreeMap;

/// Ordered sources for each category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourcePlan {
    sources: BTreeMap<Category, Vec<SourceSpec>>,
}

impl SourcePlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sources(mut self, category: Category, sources: Vec<SourceSpec>) -> Self {
        self.sources.insert(category, sources);
        self
    }

    pub fn sources(&self, category: Category) -> &[SourceSpec] {
        self.sources
            .get(&category)
            .map(|s| s.as_slice())
            .unwrap_or(&[])
    }
}

/// Destination names for the artifacts of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputLayout {
    pub combined_file: String,
    pub category_files: BTreeMap<Category, String>,
}

impl Default for OutputLayout {
    fn default() -> Self {
        let category_files = Category::ALL
            .iter()
            .map(|c| (*c, format!("{}.json", c.id())))
            .collect();
        Self {
            combined_file: "nrl_live_data.json".to_string(),
            category_files,
        }
    }
}

impl OutputLayout {
    pub fn file_for(&self, category: Category) -> String {
        self.category_files
            .get(&category)
            .cloned()
            .unwrap_or_else(|| format!("{}.json", category.id()))
    }
}

pub struct FetchOrchestrator<C: SourceClient> {
    resolver: CategoryResolver<C>,
    plan: SourcePlan,
}

impl<C: SourceClient> FetchOrchestrator<C> {
    pub fn new(resolver: CategoryResolver<C>, plan: SourcePlan) -> Self {
        Self { resolver, plan }
    }

    pub fn plan(&self) -> &SourcePlan {
        &self.plan
    }

    /// Resolves every category in turn. One category's outcome never affects another's.
    pub async fn run(&self) -> FetchSnapshot {
        let timestamp = Utc::now();
        let mut categories = Vec::with_capacity(Category::ALL.len());

        for category in Category::ALL {
            let snapshot = self
                .resolver
                .resolve(category, self.plan.sources(category))
                .await;
            categories.push(snapshot);
        }

        FetchSnapshot::new(timestamp, categories)
    }
}

/// Writes the combined artifact, then one artifact per category that has data.
/// Returns the destinations written, in order.
pub async fn persist<S: Storage>(
    snapshot: &FetchSnapshot,
    writer: &JsonWriter<S>,
    layout: &OutputLayout,
) -> Result<Vec<String>> {
    let mut written = Vec::new();

    writer
        .write_json(&layout.combined_file, &snapshot.combined_payload())
        .await?;
    written.push(layout.combined_file.clone());

    for category in Category::ALL {
        if let Some(payload) = snapshot.category_payload(category) {
            let destination = layout.file_for(category);
            writer.write_json(&destination, &payload).await?;
            written.push(destination);
        } else {
            tracing::debug!("Skipping {} artifact, category is absent", category);
        }
    }

    Ok(written)
}
