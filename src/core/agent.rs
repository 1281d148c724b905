use crate::core::{Answer, AnswerSource, Result, SourceTag};
use crate::utils::text::{contains_phrase, normalize};
use async_trait::async_trait;

pub const DEFAULT_TRIGGERS: &[&str] = &[
    "live agent",
    "live person",
    "real person",
    "talk to a person",
    "talk to someone",
    "speak to someone",
    "speak with someone",
    "human",
    "representative",
    "staff member",
    "contact staff",
    "customer service",
];

pub const DEFAULT_REFERRAL_EMAIL: &str = "sempa@sempa.org";

/// 偵測使用者要求真人客服，轉介至 email
pub struct AgentRequestDetector {
    triggers: Vec<String>,
    message: String,
}

impl AgentRequestDetector {
    pub fn new<I, T>(triggers: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let triggers = triggers
            .into_iter()
            .map(|t| normalize(t.as_ref()))
            .filter(|t| !t.is_empty())
            .collect();

        Self {
            triggers,
            message: message.into(),
        }
    }

    pub fn with_defaults(email: &str) -> Self {
        Self::new(DEFAULT_TRIGGERS.iter().copied(), referral_message(email))
    }

    pub fn matched_trigger(&self, question: &str) -> Option<&str> {
        let normalized = normalize(question);
        self.triggers
            .iter()
            .find(|trigger| contains_phrase(&normalized, trigger))
            .map(String::as_str)
    }
}

pub fn referral_message(email: &str) -> String {
    format!(
        "I'd be happy to connect you with a member of our staff. \
         Please email {} and someone from the team will get back to you as soon as possible.",
        email
    )
}

#[async_trait]
impl AnswerSource for AgentRequestDetector {
    fn tag(&self) -> SourceTag {
        SourceTag::EmailReferral
    }

    async fn try_answer(&self, question: &str) -> Result<Option<Answer>> {
        match self.matched_trigger(question) {
            Some(trigger) => {
                tracing::debug!("Live agent requested (trigger: '{}')", trigger);
                Ok(Some(Answer::new(self.message.clone(), SourceTag::EmailReferral)))
            }
            None => Ok(None),
        }
    }
}
