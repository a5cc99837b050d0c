use httpmock::prelude::*;
use nrl_fetch::core::{Category, ContentKind};
use nrl_fetch::{
    CategoryResolver, FetchConfig, FetchEngine, FetchError, FetchOrchestrator, HttpSourceClient,
    JsonWriter, LocalStorage, OutputLayout, ParserRegistry, SourcePlan, SourceSpec,
};
use std::time::Duration;
use tempfile::TempDir;

const LADDER_HTML: &str = r#"<html><body>
<table class="ladder">
  <tr><th>Pos</th><th>Team</th><th>P</th><th>W</th><th>D</th><th>L</th><th>PF</th><th>PA</th><th>Pts</th></tr>
  <tr><td>1</td><td>Raiders</td><td>2</td><td>2</td><td>0</td><td>0</td><td>44</td><td>20</td><td>4</td></tr>
  <tr><td>2</td><td>Roosters</td><td>2</td><td>1</td><td>0</td><td>1</td><td>30</td><td>28</td><td>2</td></tr>
</table></body></html>"#;

const RESULTS_HTML: &str = r#"<table>
  <tr><th>Round</th><th>Home</th><th>Score</th><th>Away</th></tr>
  <tr><td>1</td><td>Storm</td><td>24-12</td><td>Eels</td></tr>
</table>"#;

fn engine_for(
    plan: SourcePlan,
    output_path: &str,
) -> FetchEngine<HttpSourceClient, LocalStorage> {
    let client = HttpSourceClient::new("Mozilla/5.0").unwrap();
    let resolver = CategoryResolver::new(client, ParserRegistry::with_defaults(), Duration::from_secs(5));
    let orchestrator = FetchOrchestrator::new(resolver, plan);
    let writer = JsonWriter::new(LocalStorage::new(output_path.to_string()));
    FetchEngine::new(orchestrator, writer, OutputLayout::default())
}

fn read_json(dir: &std::path::Path, name: &str) -> serde_json::Value {
    let text = std::fs::read_to_string(dir.join(name)).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[tokio::test]
async fn test_successful_primary_never_contacts_fallback() {
    let server = MockServer::start();

    let primary = server.mock(|when, then| {
        when.method(GET).path("/api/standings");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "standings": [
                    {"team": "Storm", "points": 6},
                    {"team": "Panthers", "points": 4}
                ]
            }));
    });
    let fallback = server.mock(|when, then| {
        when.method(GET).path("/ladder");
        then.status(200)
            .header("Content-Type", "text/html")
            .body(LADDER_HTML);
    });

    let client = HttpSourceClient::new("Mozilla/5.0").unwrap();
    let resolver = CategoryResolver::new(client, ParserRegistry::with_defaults(), Duration::from_secs(5));
    let sources = vec![
        SourceSpec::new("nrl_api", server.url("/api/standings"), Some(ContentKind::Json)),
        SourceSpec::new("liveladders", server.url("/ladder"), Some(ContentKind::Html)),
    ];

    let snapshot = resolver.resolve(Category::Ladder, &sources).await;

    primary.assert_hits(1);
    fallback.assert_hits(0);
    assert_eq!(snapshot.source_used.as_deref(), Some("nrl_api"));
    assert_eq!(snapshot.data.len(), 2);
}

#[tokio::test]
async fn test_failed_primary_uses_html_fallback() {
    let server = MockServer::start();

    let primary = server.mock(|when, then| {
        when.method(GET).path("/api/standings");
        then.status(403);
    });
    let fallback = server.mock(|when, then| {
        when.method(GET).path("/ladder");
        then.status(200)
            .header("Content-Type", "text/html")
            .body(LADDER_HTML);
    });

    let client = HttpSourceClient::new("Mozilla/5.0").unwrap();
    let resolver = CategoryResolver::new(client, ParserRegistry::with_defaults(), Duration::from_secs(5));
    let sources = vec![
        SourceSpec::new("nrl_api", server.url("/api/standings"), Some(ContentKind::Json)),
        SourceSpec::new("liveladders", server.url("/ladder"), Some(ContentKind::Html)),
    ];

    let snapshot = resolver.resolve(Category::Ladder, &sources).await;

    primary.assert();
    fallback.assert();
    assert_eq!(snapshot.source_used.as_deref(), Some("liveladders"));
    let records = snapshot.data.records().unwrap();
    assert_eq!(records[0].get("team").unwrap(), "Raiders");
    assert_eq!(records[1].get("position").unwrap().as_u64(), Some(2));
}

#[tokio::test]
async fn test_end_to_end_run_with_one_absent_category() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/api/standings");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"standings": [{"team": "Storm"}]}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/draw");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"fixtures": [{"home": "Sharks", "away": "Dragons"}]}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/results");
        then.status(200)
            .header("Content-Type", "text/html")
            .body(RESULTS_HTML);
    });
    let live_primary = server.mock(|when, then| {
        when.method(GET).path("/live");
        then.status(502);
    });
    let live_fallback = server.mock(|when, then| {
        when.method(GET).path("/flashscore");
        then.status(200)
            .header("Content-Type", "text/html")
            .body("<html><body><div>No live games</div></body></html>");
    });

    let plan = SourcePlan::new()
        .with_sources(
            Category::Ladder,
            vec![SourceSpec::new("nrl_api", server.url("/api/standings"), None)],
        )
        .with_sources(
            Category::Fixtures,
            vec![SourceSpec::new("nrl_draw", server.url("/draw"), None)],
        )
        .with_sources(
            Category::Results,
            vec![SourceSpec::new("rlp", server.url("/results"), Some(ContentKind::Html))],
        )
        .with_sources(
            Category::LiveScores,
            vec![
                SourceSpec::new("nrl_draw_round", server.url("/live"), Some(ContentKind::Html)),
                SourceSpec::new("flashscore", server.url("/flashscore"), Some(ContentKind::Html)),
            ],
        );

    let engine = engine_for(plan, &output_path);
    let report = engine.run().await.unwrap();

    live_primary.assert();
    live_fallback.assert();

    assert_eq!(report.snapshot.absent_categories(), vec![Category::LiveScores]);
    assert_eq!(
        report.written,
        vec!["nrl_live_data.json", "ladder.json", "fixtures.json", "results.json"]
    );

    let combined = read_json(temp_dir.path(), "nrl_live_data.json");
    let ts = combined["last_updated"].as_str().unwrap().to_string();
    assert_eq!(ts, report.snapshot.timestamp_iso());
    assert_eq!(combined["ladder"][0]["team"], "Storm");
    assert_eq!(combined["fixtures"][0]["away"], "Dragons");
    assert_eq!(combined["results"][0]["score"], "24-12");
    assert!(combined["live_scores"].is_null());
    assert_eq!(combined["sources"]["results"], "rlp");
    assert!(combined["sources"]["live_scores"].is_null());

    for name in ["ladder.json", "fixtures.json", "results.json"] {
        let artifact = read_json(temp_dir.path(), name);
        assert_eq!(artifact["updated"], ts.as_str());
        assert!(!artifact["data"].as_array().unwrap().is_empty());
    }
    assert!(!temp_dir.path().join("live_scores.json").exists());
}

#[tokio::test]
async fn test_all_sources_down_still_completes() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();
    let server = MockServer::start();

    let down = server.mock(|when, then| {
        when.method(GET);
        then.status(500);
    });

    let plan = Category::ALL.into_iter().fold(SourcePlan::new(), |plan, category| {
        plan.with_sources(
            category,
            vec![SourceSpec::new(category.id(), server.url(format!("/{}", category.id())), None)],
        )
    });

    let report = engine_for(plan, &output_path).run().await.unwrap();

    down.assert_hits(4);
    assert_eq!(report.snapshot.absent_categories(), Category::ALL.to_vec());
    assert_eq!(report.written, vec!["nrl_live_data.json"]);

    let combined = read_json(temp_dir.path(), "nrl_live_data.json");
    for category in Category::ALL {
        assert!(combined[category.id()].is_null());
    }
}

#[tokio::test]
async fn test_unwritable_output_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"").unwrap();

    let engine = engine_for(SourcePlan::new(), blocker.to_str().unwrap());
    let err = engine.run().await.unwrap_err();

    assert!(matches!(err, FetchError::PersistenceError { .. }));
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn test_toml_config_drives_a_run() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("out");
    let server = MockServer::start();

    let ladder = server.mock(|when, then| {
        when.method(GET).path("/2026/ladder");
        then.status(200)
            .header("Content-Type", "text/html")
            .body(LADDER_HTML);
    });

    let toml_content = format!(
        r#"
season = 2026

[http]
timeout_seconds = 5

[output]
dir = "{}"
combined_file = "all.json"

[sources]
fixtures = []
results = []
live_scores = []

[[sources.ladder]]
id = "mirror"
url = "{}"
format = "html"
"#,
        output_dir.to_str().unwrap().replace('\\', "/"),
        server.url("/{season}/ladder"),
    );

    let config = FetchConfig::from_toml_str(&toml_content).unwrap();
    nrl_fetch::utils::validation::Validate::validate(&config).unwrap();

    let client = HttpSourceClient::from_config(&config).unwrap();
    let resolver = CategoryResolver::new(
        client,
        ParserRegistry::with_defaults(),
        nrl_fetch::core::ConfigProvider::timeout(&config),
    );
    let orchestrator = FetchOrchestrator::new(resolver, config.source_plan());
    let writer = JsonWriter::new(LocalStorage::new(
        nrl_fetch::core::ConfigProvider::output_dir(&config).to_string(),
    ));
    let report = FetchEngine::new(orchestrator, writer, config.output_layout())
        .run()
        .await
        .unwrap();

    ladder.assert();
    assert_eq!(report.written, vec!["all.json", "ladder.json"]);
    let artifact = read_json(&output_dir, "ladder.json");
    assert_eq!(artifact["data"][0]["team"], "Raiders");
    assert_eq!(artifact["data"][0]["points"], 4);
}
