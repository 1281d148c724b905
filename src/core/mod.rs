pub mod agent;
pub mod diagnostics;
pub mod faq;
pub mod generative;
pub mod index;
pub mod resolver;
pub mod retrieval;

pub use crate::domain::model::{
    Answer, AnswerRecord, ChatMessage, FaqEntry, IndexedDocument, ScoredDocument, SourceTag,
};
pub use crate::domain::ports::{
    AnswerLog, AnswerSource, ChatModel, ConfigProvider, Embedder, Storage,
};
pub use crate::utils::error::Result;
