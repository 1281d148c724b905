pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::{csv_log::CsvAnswerLog, openai::OpenAiClient};
pub use crate::app::build_resolver;
pub use crate::config::{cli::LocalStorage, AssistantConfig};
pub use crate::core::resolver::AnswerResolver;
pub use crate::domain::model::{Answer, SourceTag};
pub use crate::utils::error::{AssistantError, Result};
