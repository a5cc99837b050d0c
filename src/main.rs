use clap::Parser;
use nrl_fetch::core::{Category, ConfigProvider};
use nrl_fetch::utils::{logger, validation::Validate};
use nrl_fetch::{
    CategoryResolver, CliConfig, FetchConfig, FetchEngine, FetchError, FetchOrchestrator,
    HttpSourceClient, JsonWriter, LocalStorage, ParserRegistry,
};

// 單執行緒：來源依序抓取，不並行
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting nrl-fetch");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.load().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    if cli.dry_run {
        print_plan(&config);
        return Ok(());
    }

    let client = match HttpSourceClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => exit_with(&e),
    };
    let resolver = CategoryResolver::new(client, ParserRegistry::with_defaults(), config.timeout());
    let orchestrator = FetchOrchestrator::new(resolver, config.source_plan());
    let writer = JsonWriter::new(LocalStorage::new(config.output_dir().to_string()));
    let engine = FetchEngine::new(orchestrator, writer, config.output_layout());

    match engine.run().await {
        Ok(report) => {
            let absent = report.snapshot.absent_categories();
            if !absent.is_empty() {
                let names: Vec<&str> = absent.iter().map(|c| c.id()).collect();
                tracing::warn!("Unavailable this run: {}", names.join(", "));
            }
            println!(
                "✅ Wrote {} files to {}",
                report.written.len(),
                config.output_dir()
            );
        }
        Err(e) => exit_with(&e),
    }

    Ok(())
}

fn exit_with(e: &FetchError) -> ! {
    tracing::error!(
        "❌ nrl-fetch failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code().max(1))
}

fn print_plan(config: &FetchConfig) {
    let layout = config.output_layout();

    println!("📋 Resolution plan (season {}):", config.season());
    println!("  Timeout: {:?}", config.timeout());
    println!("  User-Agent: {}", config.user_agent());
    println!();

    for category in Category::ALL {
        println!("  {}:", category);
        let sources = config.sources_for(category);
        if sources.is_empty() {
            println!("    (no sources, will be absent)");
        }
        for (i, source) in sources.iter().enumerate() {
            let format = source
                .format
                .map(|f| f.to_string())
                .unwrap_or_else(|| "auto".to_string());
            println!("    {}. {} [{}] {}", i + 1, source.id, format, source.url);
        }
    }

    println!();
    println!("💾 Output: {}", config.output_dir());
    println!("  combined: {}", layout.combined_file);
    for category in Category::ALL {
        println!("  {}: {}", category, layout.file_for(category));
    }
}
