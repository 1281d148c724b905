use crate::core::{Answer, AnswerLog, AnswerRecord, AnswerSource, Result, SourceTag};
use crate::utils::error::AssistantError;
use std::sync::Arc;

pub const DEFAULT_FALLBACK_MESSAGE: &str =
    "I'm sorry, I don't have an answer to that right now. Please email sempa@sempa.org \
     and a member of our staff will follow up with you.";

/// 依序嘗試各回答來源，第一個有內容的回答勝出
pub struct AnswerResolver {
    stages: Vec<Box<dyn AnswerSource>>,
    fallback_message: String,
    log: Option<Arc<dyn AnswerLog>>,
}

impl AnswerResolver {
    pub fn new(stages: Vec<Box<dyn AnswerSource>>) -> Self {
        Self {
            stages,
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
            log: None,
        }
    }

    pub fn with_fallback_message(mut self, message: impl Into<String>) -> Self {
        self.fallback_message = message.into();
        self
    }

    pub fn with_log(mut self, log: Arc<dyn AnswerLog>) -> Self {
        self.log = Some(log);
        self
    }

    pub fn stage_names(&self) -> Vec<String> {
        self.stages.iter().map(|s| s.name().to_string()).collect()
    }

    pub async fn resolve(&self, question: &str) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AssistantError::ValidationError {
                message: "Question cannot be empty".to_string(),
            });
        }

        let answer = self.first_answer(question).await;
        tracing::info!("Answered from {}", answer.source);

        if let Some(log) = &self.log {
            if let Err(e) = log.record(&AnswerRecord::new(question, &answer)).await {
                tracing::warn!("⚠️ Failed to record answer: {}", e);
            }
        }

        Ok(answer)
    }

    async fn first_answer(&self, question: &str) -> Answer {
        for stage in &self.stages {
            match stage.try_answer(question).await {
                Ok(Some(answer)) if !answer.is_blank() => return answer,
                Ok(_) => {
                    tracing::debug!("{} stage had no answer", stage.name());
                }
                Err(e) => {
                    tracing::warn!("⚠️ {} stage failed, falling through: {}", stage.name(), e);
                }
            }
        }

        Answer::new(self.fallback_message.clone(), SourceTag::Fallback)
    }
}
