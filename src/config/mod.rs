pub mod cli;
pub mod toml_config;

pub use toml_config::AssistantConfig;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "semp-assistant")]
#[command(about = "Support-chat assistant for SEMPA: referral, FAQ, RAG and GPT answers")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "assistant.toml")]
    pub config: String,

    /// Answer a single question and exit; without it questions are read from stdin
    #[arg(short, long)]
    pub question: Option<String>,

    /// Check the API key and make a test model call
    #[arg(long)]
    pub check: bool,

    /// Print the recorded answer log and exit
    #[arg(long)]
    pub show_log: bool,

    /// Print answers as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 設定檔不存在時使用預設值
    pub fn load_config(&self) -> crate::utils::error::Result<AssistantConfig> {
        if std::path::Path::new(&self.config).exists() {
            AssistantConfig::from_file(&self.config)
        } else {
            tracing::warn!(
                "⚠️ Config file '{}' not found, using built-in defaults",
                self.config
            );
            Ok(AssistantConfig::default())
        }
    }
}
