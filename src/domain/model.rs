use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 回答來源標記，寫入對話紀錄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceTag {
    #[serde(rename = "Email Referral")]
    EmailReferral,
    #[serde(rename = "FAQ")]
    Faq,
    #[serde(rename = "RAG")]
    Rag,
    #[serde(rename = "GPT")]
    Gpt,
    #[serde(rename = "Fallback")]
    Fallback,
}

impl SourceTag {
    pub fn label(&self) -> &'static str {
        match self {
            SourceTag::EmailReferral => "Email Referral",
            SourceTag::Faq => "FAQ",
            SourceTag::Rag => "RAG",
            SourceTag::Gpt => "GPT",
            SourceTag::Fallback => "Fallback",
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub source: SourceTag,
    /// RAG 回答引用的文件來源，依排名排序
    #[serde(default)]
    pub citations: Vec<String>,
}

impl Answer {
    pub fn new(text: impl Into<String>, source: SourceTag) -> Self {
        Self {
            text: text.into(),
            source,
            citations: Vec::new(),
        }
    }

    pub fn with_citations(mut self, citations: Vec<String>) -> Self {
        self.citations = citations;
        self
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub key: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedDocument {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub source: String,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    pub document: IndexedDocument,
    pub score: f32,
}

/// 對話紀錄中的一列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub timestamp: DateTime<Utc>,
    pub question: String,
    pub answer: String,
    pub source: SourceTag,
}

impl AnswerRecord {
    pub fn new(question: &str, answer: &Answer) -> Self {
        Self {
            timestamp: Utc::now(),
            question: question.to_string(),
            answer: answer.text.clone(),
            source: answer.source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}
