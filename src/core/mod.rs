pub mod etl;
pub mod orchestrator;
pub mod parser;
pub mod resolver;
pub mod source_client;

pub use crate::domain::model::{
    AttemptOutcome, Category, CategoryData, CategorySnapshot, ContentKind, FetchSnapshot,
    LadderEntry, Record, SourceAttempt,
};
pub use crate::domain::ports::{ConfigProvider, RawResponse, SourceClient, Storage};
pub use crate::utils::error::Result;
