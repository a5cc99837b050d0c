pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use adapters::storage::{JsonWriter, LocalStorage};
pub use crate::config::FetchConfig;
pub use crate::core::{
    etl::{FetchEngine, RunReport},
    orchestrator::{FetchOrchestrator, OutputLayout, SourcePlan},
    parser::ParserRegistry,
    resolver::{CategoryResolver, SourceSpec},
    source_client::HttpSourceClient,
};
pub use utils::error::{FetchError, FetchFailure, Result};
