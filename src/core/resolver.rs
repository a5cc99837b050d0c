use crate::core::parser::ParserRegistry;
use crate::core::{
    AttemptOutcome, Category, CategoryData, CategorySnapshot, ContentKind, SourceAttempt,
    SourceClient,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One configured upstream for a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub id: String,
    pub url: String,
    /// When unset the kind is sniffed from the response.
    #[serde(default)]
    pub format: Option<ContentKind>,
}

impl SourceSpec {
    pub fn new(id: impl Into<String>, url: impl Into<String>, format: Option<ContentKind>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            format,
        }
    }
}

/// Tries a category's sources in priority order and keeps the first non-empty parse.
pub struct CategoryResolver<C: SourceClient> {
    client: C,
    parsers: ParserRegistry,
    timeout: Duration,
}

impl<C: SourceClient> CategoryResolver<C> {
    pub fn new(client: C, parsers: ParserRegistry, timeout: Duration) -> Self {
        Self {
            client,
            parsers,
            timeout,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub async fn resolve(&self, category: Category, sources: &[SourceSpec]) -> CategorySnapshot {
        let mut attempts = Vec::with_capacity(sources.len());

        for source in sources {
            tracing::info!("🔎 {}: trying source '{}'", category, source.id);

            let response = match self.client.fetch(&source.url, self.timeout).await {
                Ok(response) => response,
                Err(failure) => {
                    tracing::warn!("{}: source '{}' failed: {}", category, source.id, failure);
                    attempts.push(SourceAttempt {
                        source_id: source.id.clone(),
                        outcome: AttemptOutcome::FetchFailed(failure.to_string()),
                    });
                    continue;
                }
            };

            let kind = source.format.unwrap_or_else(|| {
                ContentKind::sniff(response.content_type.as_deref(), &response.body)
            });
            let records = self.parsers.parse(category, &response.body, kind);

            if records.is_empty() {
                tracing::warn!(
                    "{}: source '{}' returned no usable {} records",
                    category,
                    source.id,
                    kind
                );
                attempts.push(SourceAttempt {
                    source_id: source.id.clone(),
                    outcome: AttemptOutcome::ParsedEmpty,
                });
                continue;
            }

            tracing::info!(
                "✅ {}: accepted {} records from '{}'",
                category,
                records.len(),
                source.id
            );
            attempts.push(SourceAttempt {
                source_id: source.id.clone(),
                outcome: AttemptOutcome::Accepted(records.len()),
            });
            return CategorySnapshot {
                category,
                data: CategoryData::Present(records),
                source_used: Some(source.id.clone()),
                attempts,
            };
        }

        tracing::warn!(
            "⚠️ {}: no data from any of {} sources, marking absent",
            category,
            sources.len()
        );
        CategorySnapshot::absent(category, attempts)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::core::{RawResponse, SourceClient};
    use crate::utils::error::FetchFailure;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Canned responses keyed by URL; records every URL requested.
    #[derive(Clone, Default)]
    pub struct MockClient {
        responses: HashMap<String, Result<RawResponse, FetchFailure>>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl MockClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn ok(mut self, url: &str, content_type: &str, body: &str) -> Self {
            self.responses.insert(
                url.to_string(),
                Ok(RawResponse {
                    status: 200,
                    content_type: Some(content_type.to_string()),
                    body: body.to_string(),
                }),
            );
            self
        }

        pub fn fail(mut self, url: &str, failure: FetchFailure) -> Self {
            self.responses.insert(url.to_string(), Err(failure));
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self, url: &str) -> usize {
            self.calls().iter().filter(|u| u.as_str() == url).count()
        }
    }

    #[async_trait]
    impl SourceClient for MockClient {
        async fn fetch(&self, url: &str, _timeout: Duration) -> Result<RawResponse, FetchFailure> {
            self.calls.lock().unwrap().push(url.to_string());
            self.responses
                .get(url)
                .cloned()
                .unwrap_or_else(|| Err(FetchFailure::Connect(format!("no route to {}", url))))
        }
    }
}
