use crate::core::{Answer, AnswerSource, ChatMessage, ChatModel, Result, SourceTag};
use async_trait::async_trait;
use std::sync::Arc;

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant for SEMPA (Society of Emergency Medicine PAs).";

/// 最後手段：直接讓語言模型回答
pub struct GenerativeAnswerer {
    chat: Arc<dyn ChatModel>,
    system_prompt: String,
}

impl GenerativeAnswerer {
    pub fn new(chat: Arc<dyn ChatModel>) -> Self {
        Self {
            chat,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }
}

#[async_trait]
impl AnswerSource for GenerativeAnswerer {
    fn tag(&self) -> SourceTag {
        SourceTag::Gpt
    }

    async fn try_answer(&self, question: &str) -> Result<Option<Answer>> {
        let messages = vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(question),
        ];

        let reply = self.chat.complete(messages).await?;
        let reply = reply.trim();
        if reply.is_empty() {
            return Ok(None);
        }
        Ok(Some(Answer::new(reply, SourceTag::Gpt)))
    }
}
