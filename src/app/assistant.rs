use crate::adapters::csv_log::CsvAnswerLog;
use crate::adapters::index_loader::load_index;
use crate::adapters::openai::OpenAiClient;
use crate::config::cli::LocalStorage;
use crate::config::AssistantConfig;
use crate::core::agent::{self, AgentRequestDetector};
use crate::core::faq::FaqMatcher;
use crate::core::generative::GenerativeAnswerer;
use crate::core::resolver::AnswerResolver;
use crate::core::retrieval::RetrievalAnswerer;
use crate::core::{AnswerSource, ConfigProvider};
use crate::utils::error::Result;
use std::sync::Arc;

/// 依設定組出回答鏈：轉介 → FAQ → RAG → GPT → 預設訊息
pub async fn build_resolver(config: &AssistantConfig) -> Result<AnswerResolver> {
    let mut stages: Vec<Box<dyn AnswerSource>> = Vec::new();

    if config.referral_enabled() {
        stages.push(Box::new(referral_stage(config)));
    }

    if config.faq_enabled() {
        let matcher = faq_stage(config)?;
        tracing::debug!("FAQ table has {} entries", matcher.len());
        stages.push(Box::new(matcher));
    }

    match OpenAiClient::from_config(config) {
        Ok(client) => {
            let client = Arc::new(client);

            if config.retrieval_enabled() {
                if let Some(stage) = retrieval_stage(config, client.clone()).await {
                    stages.push(Box::new(stage));
                }
            }

            stages.push(Box::new(
                GenerativeAnswerer::new(client).with_system_prompt(config.system_prompt()),
            ));
        }
        Err(e) => {
            tracing::warn!("⚠️ Language model disabled: {}", e);
        }
    }

    let mut resolver =
        AnswerResolver::new(stages).with_fallback_message(config.fallback_message());

    if config.log_enabled() {
        let storage = LocalStorage::new(config.log_dir().to_string());
        resolver = resolver.with_log(Arc::new(CsvAnswerLog::new(storage, config.log_file())));
    }

    tracing::info!("Answer chain: {}", resolver.stage_names().join(" → "));
    Ok(resolver)
}

fn referral_stage(config: &AssistantConfig) -> AgentRequestDetector {
    let message = config
        .referral_message()
        .map(str::to_string)
        .unwrap_or_else(|| agent::referral_message(config.referral_email()));

    match config.referral_triggers() {
        Some(triggers) => AgentRequestDetector::new(triggers, message),
        None => AgentRequestDetector::new(agent::DEFAULT_TRIGGERS.iter().copied(), message),
    }
}

fn faq_stage(config: &AssistantConfig) -> Result<FaqMatcher> {
    if let Some(file) = config.faq_file() {
        return FaqMatcher::from_toml_file(file);
    }
    Ok(match config.faq_entries() {
        Some(entries) => FaqMatcher::new(entries.to_vec()),
        None => FaqMatcher::with_default_entries(),
    })
}

/// 索引載入失敗時不啟用 RAG，其餘階段照常運作
async fn retrieval_stage(
    config: &AssistantConfig,
    client: Arc<OpenAiClient>,
) -> Option<RetrievalAnswerer> {
    let path = config.index_path()?;
    let storage = LocalStorage::new(".".to_string());

    let index = match load_index(&storage, path).await {
        Ok(index) => index,
        Err(e) => {
            tracing::warn!("⚠️ RAG disabled, could not load index '{}': {}", path, e);
            return None;
        }
    };

    if let Some(model) = index.embedding_model() {
        if model != config.embedding_model() {
            tracing::warn!(
                "⚠️ Index was built with '{}' but queries use '{}'",
                model,
                config.embedding_model()
            );
        }
    }

    Some(
        RetrievalAnswerer::new(Arc::new(index), client.clone(), client)
            .with_top_k(config.top_k())
            .with_min_score(config.min_score())
            .with_organization(config.organization()),
    )
}
