pub mod toml_config;

pub use toml_config::FetchConfig;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "nrl-fetch")]
#[command(about = "Fetch NRL ladder, fixtures, results and live scores into JSON files")]
pub struct CliConfig {
    /// Path to a TOML configuration file; built-in sources are used without one
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory the JSON artifacts are written to
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    #[arg(long)]
    pub user_agent: Option<String>,

    /// Season year substituted into source URLs
    #[arg(long)]
    pub season: Option<i32>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    /// Print the resolution plan without fetching anything
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the TOML file (if any) and applies command-line overrides on top.
    pub fn load(&self) -> crate::utils::error::Result<FetchConfig> {
        let mut config = match &self.config {
            Some(path) => FetchConfig::from_file(path)?,
            None => FetchConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut FetchConfig) {
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
        }
        if let Some(timeout) = self.timeout {
            config.http.timeout_seconds = timeout;
        }
        if let Some(user_agent) = &self.user_agent {
            config.http.user_agent = user_agent.clone();
        }
        if let Some(season) = self.season {
            config.season = Some(season);
        }
    }
}
