use crate::core::{Category, ContentKind, LadderEntry, Record};
use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A parser never fails: structural mismatches produce an empty list.
pub type ParseFn = fn(&str) -> Vec<Record>;

/// Minimum `td` cells in a ladder row (rank, team, P, W, D, L, PF, PA .. Pts).
const LADDER_MIN_CELLS: usize = 8;

/// Lookup table from (category, content kind) to a parser.
#[derive(Clone)]
pub struct ParserRegistry {
    parsers: HashMap<(Category, ContentKind), ParseFn>,
}

impl ParserRegistry {
    pub fn empty() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(Category::Ladder, ContentKind::Json, |p| {
            json_records(Category::Ladder, p)
        });
        registry.register(Category::Fixtures, ContentKind::Json, |p| {
            json_records(Category::Fixtures, p)
        });
        registry.register(Category::Results, ContentKind::Json, |p| {
            json_records(Category::Results, p)
        });
        registry.register(Category::LiveScores, ContentKind::Json, |p| {
            json_records(Category::LiveScores, p)
        });

        registry.register(Category::Ladder, ContentKind::Html, parse_ladder_html);
        registry.register(Category::Fixtures, ContentKind::Html, parse_table_html);
        registry.register(Category::Results, ContentKind::Html, parse_table_html);
        registry.register(Category::LiveScores, ContentKind::Html, parse_table_html);
        registry
    }

    /// Replaces any parser already registered for the key.
    pub fn register(&mut self, category: Category, kind: ContentKind, parser: ParseFn) {
        self.parsers.insert((category, kind), parser);
    }

    pub fn parse(&self, category: Category, payload: &str, kind: ContentKind) -> Vec<Record> {
        match self.parsers.get(&(category, kind)) {
            Some(parser) => parser(payload),
            None => {
                tracing::warn!("No {} parser registered for {}", kind, category);
                Vec::new()
            }
        }
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Accepts a top-level array of objects, or an object holding one under a
/// category key. Any non-object entry rejects the whole payload.
pub fn json_records(category: Category, payload: &str) -> Vec<Record> {
    let value: Value = match serde_json::from_str(payload) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!("{} payload is not valid JSON: {}", category, e);
            return Vec::new();
        }
    };

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => {
            let found = category
                .json_keys()
                .iter()
                .find_map(|key| match obj.remove(*key) {
                    Some(Value::Array(items)) => Some(items),
                    _ => None,
                });
            match found {
                Some(items) => items,
                None => {
                    tracing::debug!("{} JSON has none of the keys {:?}", category, category.json_keys());
                    return Vec::new();
                }
            }
        }
        _ => return Vec::new(),
    };

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Object(data) => records.push(Record { data }),
            _ => {
                tracing::debug!("{} JSON array contains a non-object entry", category);
                return Vec::new();
            }
        }
    }
    records
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Text of every descendant node with runs of whitespace collapsed to one space.
fn cell_text(cell: &ElementRef) -> String {
    cell.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Empty or non-numeric cells count as zero.
fn cell_number<T: std::str::FromStr + Default>(cell: &ElementRef) -> T {
    cell_text(cell).parse().unwrap_or_default()
}

pub fn parse_ladder_html(payload: &str) -> Vec<Record> {
    parse_ladder_entries(payload)
        .into_iter()
        .map(Record::from)
        .collect()
}

pub fn parse_ladder_entries(payload: &str) -> Vec<LadderEntry> {
    let (Some(ladder_sel), Some(table_sel), Some(row_sel), Some(td_sel)) = (
        selector("table.ladder"),
        selector("table"),
        selector("tr"),
        selector("td"),
    ) else {
        return Vec::new();
    };

    let document = Html::parse_document(payload);
    let Some(table) = document
        .select(&ladder_sel)
        .next()
        .or_else(|| document.select(&table_sel).next())
    else {
        tracing::debug!("No ladder table found in HTML");
        return Vec::new();
    };

    let mut entries: Vec<LadderEntry> = Vec::new();
    for row in table.select(&row_sel).skip(1) {
        let cells: Vec<ElementRef> = row.select(&td_sel).collect();
        if cells.len() < LADDER_MIN_CELLS {
            continue;
        }

        let team = cell_text(&cells[1]);
        if team.is_empty() {
            continue;
        }

        entries.push(LadderEntry {
            position: entries.len() as u32 + 1,
            team,
            played: cell_number(&cells[2]),
            wins: cell_number(&cells[3]),
            draws: cell_number(&cells[4]),
            losses: cell_number(&cells[5]),
            points_for: cell_number(&cells[6]),
            points_against: cell_number(&cells[7]),
            points: cell_number(&cells[cells.len() - 1]),
        });
    }
    entries
}

fn column_key(header: &str) -> String {
    let mut key = String::with_capacity(header.len());
    for c in header.trim().chars() {
        if c.is_alphanumeric() {
            key.extend(c.to_lowercase());
        } else if !key.ends_with('_') && !key.is_empty() {
            key.push('_');
        }
    }
    key.trim_end_matches('_').to_string()
}

/// Repeated headers (`Team | Score | Score | Team`) get `_2`, `_3`, ... suffixes.
fn unique_key(existing: &[String], base: String) -> String {
    if !existing.contains(&base) {
        return base;
    }
    (2..)
        .map(|n| format!("{}_{}", base, n))
        .find(|candidate| !existing.contains(candidate))
        .unwrap_or(base)
}

/// Generic table extraction for fixtures, results and live scores: the first
/// row names the columns, every row of matching width becomes a record.
pub fn parse_table_html(payload: &str) -> Vec<Record> {
    let (Some(table_sel), Some(row_sel), Some(head_sel)) = (
        selector("table"),
        selector("tr"),
        selector("th, td"),
    ) else {
        return Vec::new();
    };

    let document = Html::parse_document(payload);
    let Some(table) = document.select(&table_sel).next() else {
        return Vec::new();
    };

    let mut rows = table.select(&row_sel);
    let Some(header_row) = rows.next() else {
        return Vec::new();
    };

    let mut columns: Vec<String> = Vec::new();
    for (i, cell) in header_row.select(&head_sel).enumerate() {
        let key = column_key(&cell_text(&cell));
        let base = if key.is_empty() {
            format!("column_{}", i + 1)
        } else {
            key
        };
        columns.push(unique_key(&columns, base));
    }
    if columns.is_empty() {
        return Vec::new();
    }

    let mut records = Vec::new();
    for row in rows {
        // 列標題 (th) 也算一格
        let cells: Vec<ElementRef> = row.select(&head_sel).collect();
        if cells.len() != columns.len() {
            continue;
        }

        let mut data = Map::new();
        for (column, cell) in columns.iter().zip(cells.iter()) {
            data.insert(column.clone(), Value::String(cell_text(cell)));
        }
        records.push(Record { data });
    }
    records
}
