use crate::core::agent::DEFAULT_REFERRAL_EMAIL;
use crate::core::generative::DEFAULT_SYSTEM_PROMPT;
use crate::core::retrieval::{DEFAULT_MIN_SCORE, DEFAULT_TOP_K};
use crate::core::{ConfigProvider, FaqEntry};
use crate::utils::error::{AssistantError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_LLM_ENDPOINT: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssistantConfig {
    pub assistant: Option<AssistantSection>,
    pub referral: Option<ReferralConfig>,
    pub faq: Option<FaqConfig>,
    pub retrieval: Option<RetrievalConfig>,
    pub llm: Option<LlmConfig>,
    pub fallback: Option<FallbackConfig>,
    pub log: Option<LogConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantSection {
    pub name: Option<String>,
    pub organization: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralConfig {
    pub enabled: Option<bool>,
    pub email: Option<String>,
    pub triggers: Option<Vec<String>>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqConfig {
    pub enabled: Option<bool>,
    pub file: Option<String>,
    pub entries: Option<Vec<FaqEntry>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub enabled: Option<bool>,
    pub index_path: Option<String>,
    pub top_k: Option<usize>,
    pub min_score: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub embedding_model: Option<String>,
    pub temperature: Option<f32>,
    pub timeout_seconds: Option<u64>,
    pub system_prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub enabled: Option<bool>,
    pub dir: Option<String>,
    pub file: Option<String>,
}

impl AssistantConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AssistantError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AssistantError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OPENAI_API_KEY})，找不到的保留原字串
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AssistantError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        use crate::utils::validation::*;

        validate_url("llm.endpoint", self.llm_endpoint())?;
        validate_non_empty_string("llm.model", self.chat_model())?;
        validate_non_empty_string("llm.embedding_model", self.embedding_model())?;
        validate_positive_number(
            "llm.timeout_seconds",
            self.request_timeout().as_secs() as usize,
            1,
        )?;

        if let Some(path) = self.index_path() {
            validate_path("retrieval.index_path", path)?;
            validate_file_extensions("retrieval.index_path", &[path.to_string()], &["json", "zip"])?;
        }
        validate_range("retrieval.top_k", self.top_k(), 1, 20)?;
        validate_range("retrieval.min_score", self.min_score(), -1.0, 1.0)?;

        if self.log_enabled() {
            validate_path("log.dir", self.log_dir())?;
            validate_path("log.file", self.log_file())?;
        }

        validate_non_empty_string("referral.email", self.referral_email())?;
        validate_non_empty_string("fallback.message", self.fallback_message())?;

        Ok(())
    }

    pub fn organization(&self) -> &str {
        self.assistant
            .as_ref()
            .and_then(|a| a.organization.as_deref())
            .unwrap_or("SEMPA (Society of Emergency Medicine PAs)")
    }

    pub fn assistant_name(&self) -> &str {
        self.assistant
            .as_ref()
            .and_then(|a| a.name.as_deref())
            .unwrap_or("SEMPAssistant")
    }

    pub fn referral_enabled(&self) -> bool {
        self.referral.as_ref().and_then(|r| r.enabled).unwrap_or(true)
    }

    pub fn referral_email(&self) -> &str {
        self.referral
            .as_ref()
            .and_then(|r| r.email.as_deref())
            .unwrap_or(DEFAULT_REFERRAL_EMAIL)
    }

    pub fn referral_triggers(&self) -> Option<&[String]> {
        self.referral.as_ref().and_then(|r| r.triggers.as_deref())
    }

    pub fn referral_message(&self) -> Option<&str> {
        self.referral.as_ref().and_then(|r| r.message.as_deref())
    }

    pub fn faq_enabled(&self) -> bool {
        self.faq.as_ref().and_then(|f| f.enabled).unwrap_or(true)
    }

    pub fn faq_file(&self) -> Option<&str> {
        self.faq.as_ref().and_then(|f| f.file.as_deref())
    }

    pub fn faq_entries(&self) -> Option<&[FaqEntry]> {
        self.faq.as_ref().and_then(|f| f.entries.as_deref())
    }

    pub fn retrieval_enabled(&self) -> bool {
        let enabled = self.retrieval.as_ref().and_then(|r| r.enabled).unwrap_or(true);
        enabled && self.index_path().is_some()
    }

    pub fn index_path(&self) -> Option<&str> {
        self.retrieval.as_ref().and_then(|r| r.index_path.as_deref())
    }

    pub fn top_k(&self) -> usize {
        self.retrieval
            .as_ref()
            .and_then(|r| r.top_k)
            .unwrap_or(DEFAULT_TOP_K)
    }

    pub fn min_score(&self) -> f32 {
        self.retrieval
            .as_ref()
            .and_then(|r| r.min_score)
            .unwrap_or(DEFAULT_MIN_SCORE)
    }

    pub fn system_prompt(&self) -> &str {
        self.llm
            .as_ref()
            .and_then(|l| l.system_prompt.as_deref())
            .unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    pub fn fallback_message(&self) -> &str {
        self.fallback
            .as_ref()
            .and_then(|f| f.message.as_deref())
            .unwrap_or(crate::core::resolver::DEFAULT_FALLBACK_MESSAGE)
    }

    pub fn log_enabled(&self) -> bool {
        self.log.as_ref().and_then(|l| l.enabled).unwrap_or(true)
    }

    pub fn log_dir(&self) -> &str {
        self.log
            .as_ref()
            .and_then(|l| l.dir.as_deref())
            .unwrap_or("./logs")
    }

    pub fn log_file(&self) -> &str {
        self.log
            .as_ref()
            .and_then(|l| l.file.as_deref())
            .unwrap_or(crate::adapters::csv_log::DEFAULT_LOG_FILE)
    }
}

/// `${VAR}` 沒被替換或空白的 key 視為未設定
fn usable_key(key: &str) -> Option<String> {
    let key = key.trim();
    if key.is_empty() || (key.starts_with("${") && key.ends_with('}')) {
        None
    } else {
        Some(key.to_string())
    }
}

impl ConfigProvider for AssistantConfig {
    fn llm_endpoint(&self) -> &str {
        self.llm
            .as_ref()
            .and_then(|l| l.endpoint.as_deref())
            .unwrap_or(DEFAULT_LLM_ENDPOINT)
    }

    fn api_key(&self) -> Option<String> {
        self.llm
            .as_ref()
            .and_then(|l| l.api_key.as_deref())
            .and_then(usable_key)
            .or_else(|| std::env::var(API_KEY_ENV).ok().as_deref().and_then(usable_key))
    }

    fn chat_model(&self) -> &str {
        self.llm
            .as_ref()
            .and_then(|l| l.model.as_deref())
            .unwrap_or(DEFAULT_CHAT_MODEL)
    }

    fn embedding_model(&self) -> &str {
        self.llm
            .as_ref()
            .and_then(|l| l.embedding_model.as_deref())
            .unwrap_or(DEFAULT_EMBEDDING_MODEL)
    }

    fn temperature(&self) -> Option<f32> {
        self.llm.as_ref().and_then(|l| l.temperature)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.llm.as_ref().and_then(|l| l.timeout_seconds).unwrap_or(30))
    }
}

impl Validate for AssistantConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
