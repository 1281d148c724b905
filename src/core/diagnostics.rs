use crate::core::generative::DEFAULT_SYSTEM_PROMPT;
use crate::core::{ChatMessage, ChatModel};

pub const PROBE_QUESTION: &str = "What is SEMPA?";

#[derive(Debug, Clone)]
pub struct DiagnosticsReport {
    pub key_present: bool,
    pub masked_key: Option<String>,
    /// 測試呼叫結果；沒有 API key 時為 `None`
    pub probe: Option<std::result::Result<String, String>>,
}

impl DiagnosticsReport {
    pub fn is_healthy(&self) -> bool {
        matches!(self.probe, Some(Ok(_)))
    }
}

/// 只顯示 API key 前 8 個字元
pub fn mask_api_key(key: &str) -> String {
    let prefix: String = key.chars().take(8).collect();
    if key.chars().count() <= 8 {
        return "...".to_string();
    }
    format!("{}...", prefix)
}

/// 檢查 API key 並對模型送一個測試問題
pub async fn run_diagnostics(
    api_key: Option<&str>,
    chat: Option<&dyn ChatModel>,
) -> DiagnosticsReport {
    let masked_key = api_key.map(mask_api_key);
    match &masked_key {
        Some(masked) => tracing::info!("✅ OPENAI_API_KEY loaded: {} (hidden)", masked),
        None => tracing::error!("❌ OPENAI_API_KEY not found"),
    }

    let probe = match chat {
        Some(chat) if api_key.is_some() => {
            let messages = vec![
                ChatMessage::system(DEFAULT_SYSTEM_PROMPT),
                ChatMessage::user(PROBE_QUESTION),
            ];
            match chat.complete(messages).await {
                Ok(reply) => {
                    tracing::info!("✅ Model call succeeded");
                    Some(Ok(reply))
                }
                Err(e) => {
                    tracing::error!("❌ Model call failed: {}", e);
                    Some(Err(e.to_string()))
                }
            }
        }
        _ => None,
    };

    DiagnosticsReport {
        key_present: api_key.is_some(),
        masked_key,
        probe,
    }
}
