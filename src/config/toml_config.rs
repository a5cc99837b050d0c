use crate::core::orchestrator::{OutputLayout, SourcePlan};
use crate::core::resolver::SourceSpec;
use crate::core::source_client::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use crate::core::{Category, ConfigProvider, ContentKind};
use crate::utils::error::{FetchError, Result};
use crate::utils::validation::{self, Validate};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

const SEASON_PLACEHOLDER: &str = "{season}";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchConfig {
    /// 賽季年份；未設定時使用今年
    pub season: Option<i32>,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,
    #[serde(default = "default_combined_file")]
    pub combined_file: String,
    /// Per-category overrides, keyed by category id.
    #[serde(default)]
    pub files: BTreeMap<String, String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            combined_file: default_combined_file(),
            files: BTreeMap::new(),
        }
    }
}

fn default_output_dir() -> String {
    "data".to_string()
}

fn default_combined_file() -> String {
    "nrl_live_data.json".to_string()
}

/// A category left unset keeps its built-in sources; an explicit empty list disables it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesConfig {
    pub ladder: Option<Vec<SourceSpec>>,
    pub fixtures: Option<Vec<SourceSpec>>,
    pub results: Option<Vec<SourceSpec>>,
    pub live_scores: Option<Vec<SourceSpec>>,
}

impl SourcesConfig {
    fn configured(&self, category: Category) -> Option<&Vec<SourceSpec>> {
        match category {
            Category::Ladder => self.ladder.as_ref(),
            Category::Fixtures => self.fixtures.as_ref(),
            Category::Results => self.results.as_ref(),
            Category::LiveScores => self.live_scores.as_ref(),
        }
    }
}

/// Built-in upstreams, highest priority first.
pub fn default_sources(category: Category) -> Vec<SourceSpec> {
    match category {
        Category::Ladder => vec![
            SourceSpec::new(
                "nrl_api",
                "https://www.nrl.com/api/v1/competitions/premiership/standings",
                Some(ContentKind::Json),
            ),
            SourceSpec::new(
                "liveladders",
                "https://www.liveladders.com/nrl/",
                Some(ContentKind::Html),
            ),
        ],
        Category::Fixtures => vec![SourceSpec::new(
            "nrl_draw",
            "https://www.nrl.com/draw/",
            Some(ContentKind::Html),
        )],
        Category::Results => vec![SourceSpec::new(
            "rugby_league_project",
            "https://www.rugbyleagueproject.org/seasons/nrl-{season}/results.html",
            Some(ContentKind::Html),
        )],
        Category::LiveScores => vec![
            SourceSpec::new(
                "nrl_draw_round",
                "https://www.nrl.com/draw/?competition=111&round=1&season={season}",
                Some(ContentKind::Html),
            ),
            SourceSpec::new(
                "flashscore",
                "https://www.flashscore.com/rugby-league/australia/nrl/",
                Some(ContentKind::Html),
            ),
        ],
    }
}

impl FetchConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| FetchError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| FetchError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${NRL_API_URL})；未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::{Captures, Regex};
        use std::sync::OnceLock;

        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("static regex is valid")
        });

        re.replace_all(content, |caps: &Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn season(&self) -> i32 {
        self.season.unwrap_or_else(|| chrono::Local::now().year())
    }

    pub fn sources_for(&self, category: Category) -> Vec<SourceSpec> {
        let season = self.season().to_string();
        self.sources
            .configured(category)
            .cloned()
            .unwrap_or_else(|| default_sources(category))
            .into_iter()
            .map(|mut source| {
                source.url = source.url.replace(SEASON_PLACEHOLDER, &season);
                source
            })
            .collect()
    }

    pub fn source_plan(&self) -> SourcePlan {
        Category::ALL
            .into_iter()
            .fold(SourcePlan::new(), |plan, category| {
                plan.with_sources(category, self.sources_for(category))
            })
    }

    pub fn output_layout(&self) -> OutputLayout {
        let mut layout = OutputLayout {
            combined_file: self.output.combined_file.clone(),
            ..OutputLayout::default()
        };
        for (id, file) in &self.output.files {
            if let Some(category) = Category::from_id(id) {
                layout.category_files.insert(category, file.clone());
            }
        }
        layout
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_range("http.timeout_seconds", self.http.timeout_seconds, 1, 300)?;
        validation::validate_non_empty_string("http.user_agent", &self.http.user_agent)?;
        validation::validate_path("output.dir", &self.output.dir)?;

        for id in self.output.files.keys() {
            if Category::from_id(id).is_none() {
                return Err(FetchError::InvalidConfigValueError {
                    field: "output.files".to_string(),
                    value: id.clone(),
                    reason: "Unknown category; expected ladder, fixtures, results or live_scores"
                        .to_string(),
                });
            }
        }

        let layout = self.output_layout();
        validation::validate_file_name("output.combined_file", &layout.combined_file)?;
        for category in Category::ALL {
            let field = format!("output.files.{}", category.id());
            validation::validate_file_name(&field, &layout.file_for(category))?;
        }
        validation::validate_unique(
            "output.files",
            std::iter::once(layout.combined_file.as_str())
                .chain(layout.category_files.values().map(|s| s.as_str())),
        )?;

        for category in Category::ALL {
            let sources = self.sources_for(category);
            for (i, source) in sources.iter().enumerate() {
                validation::validate_non_empty_string(
                    &format!("sources.{}[{}].id", category.id(), i),
                    &source.id,
                )?;
                validation::validate_url(
                    &format!("sources.{}[{}].url", category.id(), i),
                    &source.url,
                )?;
            }
            validation::validate_unique(
                &format!("sources.{}", category.id()),
                sources.iter().map(|s| s.id.as_str()),
            )?;
        }

        Ok(())
    }
}

impl ConfigProvider for FetchConfig {
    fn output_dir(&self) -> &str {
        &self.output.dir
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    fn user_agent(&self) -> &str {
        &self.http.user_agent
    }
}

impl Validate for FetchConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
