use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// 追蹤的資料類別
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Ladder,
    Fixtures,
    Results,
    LiveScores,
}

impl Category {
    /// Resolution order for a run.
    pub const ALL: [Category; 4] = [
        Category::Ladder,
        Category::Fixtures,
        Category::Results,
        Category::LiveScores,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Category::Ladder => "ladder",
            Category::Fixtures => "fixtures",
            Category::Results => "results",
            Category::LiveScores => "live_scores",
        }
    }

    pub fn from_id(id: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.id() == id)
    }

    /// Object keys under which a JSON source may nest this category's array.
    pub fn json_keys(&self) -> &'static [&'static str] {
        match self {
            Category::Ladder => &["standings", "ladder", "positions"],
            Category::Fixtures => &["fixtures", "draw", "matches"],
            Category::Results => &["results", "matches"],
            Category::LiveScores => &["live_scores", "liveScores", "games", "matches"],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Json,
    Html,
}

impl ContentKind {
    /// 依 Content-Type 或內容開頭推斷格式，預設為 HTML
    /// Only a JSON content type is trusted; anything else is decided by the body.
    pub fn sniff(content_type: Option<&str>, body: &str) -> Self {
        if content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("json")) {
            return ContentKind::Json;
        }

        match body.trim_start().chars().next() {
            Some('{') | Some('[') => ContentKind::Json,
            _ => ContentKind::Html,
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Json => f.write_str("json"),
            ContentKind::Html => f.write_str("html"),
        }
    }
}

/// One normalized record: a JSON object whose fields depend on the category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: Map<String, Value>,
}

impl Record {
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LadderEntry {
    pub position: u32,
    pub team: String,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub points_for: u32,
    pub points_against: u32,
    pub points: i32,
}

impl From<LadderEntry> for Record {
    fn from(entry: LadderEntry) -> Self {
        let mut data = Map::new();
        data.insert("position".to_string(), entry.position.into());
        data.insert("team".to_string(), entry.team.into());
        data.insert("played".to_string(), entry.played.into());
        data.insert("wins".to_string(), entry.wins.into());
        data.insert("draws".to_string(), entry.draws.into());
        data.insert("losses".to_string(), entry.losses.into());
        data.insert("points_for".to_string(), entry.points_for.into());
        data.insert("points_against".to_string(), entry.points_against.into());
        data.insert("points".to_string(), entry.points.into());
        Record { data }
    }
}

/// Outcome of resolving one category. `Absent` means no source produced data,
/// which is not the same thing as a source reporting an empty list.
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryData {
    Present(Vec<Record>),
    Absent,
}

impl CategoryData {
    pub fn is_absent(&self) -> bool {
        matches!(self, CategoryData::Absent)
    }

    pub fn records(&self) -> Option<&[Record]> {
        match self {
            CategoryData::Present(records) => Some(records),
            CategoryData::Absent => None,
        }
    }

    pub fn len(&self) -> usize {
        self.records().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    FetchFailed(String),
    ParsedEmpty,
    Accepted(usize),
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptOutcome::FetchFailed(reason) => write!(f, "fetch failed: {}", reason),
            AttemptOutcome::ParsedEmpty => f.write_str("parsed empty"),
            AttemptOutcome::Accepted(count) => write!(f, "accepted {} records", count),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceAttempt {
    pub source_id: String,
    pub outcome: AttemptOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategorySnapshot {
    pub category: Category,
    pub data: CategoryData,
    pub source_used: Option<String>,
    pub attempts: Vec<SourceAttempt>,
}

impl CategorySnapshot {
    pub fn absent(category: Category, attempts: Vec<SourceAttempt>) -> Self {
        Self {
            category,
            data: CategoryData::Absent,
            source_used: None,
            attempts,
        }
    }

    pub fn is_absent(&self) -> bool {
        self.data.is_absent()
    }
}

/// Point-in-time capture of every category. Built once per run and never mutated.
#[derive(Debug, Clone)]
pub struct FetchSnapshot {
    timestamp: DateTime<Utc>,
    categories: Vec<CategorySnapshot>,
}

impl FetchSnapshot {
    pub fn new(timestamp: DateTime<Utc>, categories: Vec<CategorySnapshot>) -> Self {
        Self {
            timestamp,
            categories,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn categories(&self) -> &[CategorySnapshot] {
        &self.categories
    }

    pub fn get(&self, category: Category) -> Option<&CategorySnapshot> {
        self.categories.iter().find(|c| c.category == category)
    }

    pub fn absent_categories(&self) -> Vec<Category> {
        self.categories
            .iter()
            .filter(|c| c.is_absent())
            .map(|c| c.category)
            .collect()
    }

    /// Payload of the combined artifact. Absent categories serialize as `null`.
    pub fn combined_payload(&self) -> Value {
        let mut root = Map::new();
        let mut sources = Map::new();
        root.insert("last_updated".to_string(), self.timestamp_iso().into());

        for snapshot in &self.categories {
            let data = match &snapshot.data {
                CategoryData::Present(records) => records_to_value(records),
                CategoryData::Absent => Value::Null,
            };
            root.insert(snapshot.category.id().to_string(), data);
            sources.insert(
                snapshot.category.id().to_string(),
                snapshot
                    .source_used
                    .clone()
                    .map(Value::String)
                    .unwrap_or(Value::Null),
            );
        }

        root.insert("sources".to_string(), Value::Object(sources));
        Value::Object(root)
    }

    /// Payload of a per-category artifact, or `None` when the category is absent.
    pub fn category_payload(&self, category: Category) -> Option<Value> {
        let records = self.get(category)?.data.records()?;
        Some(serde_json::json!({
            "updated": self.timestamp_iso(),
            "data": records_to_value(records),
        }))
    }
}

fn records_to_value(records: &[Record]) -> Value {
    Value::Array(
        records
            .iter()
            .map(|r| Value::Object(r.data.clone()))
            .collect(),
    )
}
