use crate::core::index::VectorIndex;
use crate::core::{
    Answer, AnswerSource, ChatMessage, ChatModel, Embedder, Result, ScoredDocument, SourceTag,
};
use crate::utils::error::AssistantError;
use async_trait::async_trait;
use std::sync::Arc;

pub const NO_ANSWER_MARKER: &str = "NO_ANSWER";
pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_MIN_SCORE: f32 = 0.75;

/// 以文件索引做檢索增強生成 (RAG)
pub struct RetrievalAnswerer {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn Embedder>,
    chat: Arc<dyn ChatModel>,
    top_k: usize,
    min_score: f32,
    organization: String,
}

impl RetrievalAnswerer {
    pub fn new(index: Arc<VectorIndex>, embedder: Arc<dyn Embedder>, chat: Arc<dyn ChatModel>) -> Self {
        Self {
            index,
            embedder,
            chat,
            top_k: DEFAULT_TOP_K,
            min_score: DEFAULT_MIN_SCORE,
            organization: "SEMPA (Society of Emergency Medicine PAs)".to_string(),
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = organization.into();
        self
    }

    async fn retrieve(&self, question: &str) -> Result<Vec<ScoredDocument>> {
        let mut embeddings = self.embedder.embed(&[question.to_string()]).await?;
        let query = embeddings.pop().ok_or_else(|| AssistantError::IndexError {
            message: "Embedding service returned no vectors".to_string(),
        })?;

        let hits = self.index.search(&query, self.top_k)?;
        Ok(hits
            .into_iter()
            .filter(|hit| hit.score >= self.min_score)
            .collect())
    }

    fn build_messages(&self, question: &str, hits: &[ScoredDocument]) -> Vec<ChatMessage> {
        let system = format!(
            "You are a support assistant for {}. Answer the question using only the numbered context \
             passages. If the context does not contain the answer, reply with exactly {}.",
            self.organization, NO_ANSWER_MARKER
        );

        let context = hits
            .iter()
            .enumerate()
            .map(|(i, hit)| {
                if hit.document.source.is_empty() {
                    format!("[{}] {}", i + 1, hit.document.text)
                } else {
                    format!("[{}] ({}) {}", i + 1, hit.document.source, hit.document.text)
                }
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        vec![
            ChatMessage::system(system),
            ChatMessage::user(format!("Context:\n{}\n\nQuestion: {}", context, question)),
        ]
    }
}

#[async_trait]
impl AnswerSource for RetrievalAnswerer {
    fn tag(&self) -> SourceTag {
        SourceTag::Rag
    }

    async fn try_answer(&self, question: &str) -> Result<Option<Answer>> {
        let hits = self.retrieve(question).await?;
        if hits.is_empty() {
            tracing::debug!("No indexed documents above score {}", self.min_score);
            return Ok(None);
        }
        tracing::debug!(
            "Retrieved {} documents (best score {:.3})",
            hits.len(),
            hits[0].score
        );

        let reply = self.chat.complete(self.build_messages(question, &hits)).await?;
        let reply = reply.trim();
        if reply.is_empty() || reply.contains(NO_ANSWER_MARKER) {
            tracing::debug!("Model found no answer in the retrieved context");
            return Ok(None);
        }

        let mut citations: Vec<String> = Vec::new();
        for hit in &hits {
            let source = &hit.document.source;
            if !source.is_empty() && !citations.contains(source) {
                citations.push(source.clone());
            }
        }

        Ok(Some(
            Answer::new(reply, SourceTag::Rag).with_citations(citations),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::IndexedDocument;
    use std::sync::Mutex;

    struct FixedEmbedder(Vec<f32>);

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(inputs.iter().map(|_| self.0.clone()).collect())
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _inputs: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(AssistantError::LlmError {
                status: 500,
                message: "boom".to_string(),
            })
        }
    }

    struct RecordingChat {
        reply: String,
        prompts: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl RecordingChat {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ChatModel for RecordingChat {
        async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String> {
            self.prompts.lock().unwrap().push(messages);
            Ok(self.reply.clone())
        }
    }

    fn index() -> Arc<VectorIndex> {
        let docs = vec![
            IndexedDocument {
                id: "1".to_string(),
                text: "SEMPA 360 takes place every spring.".to_string(),
                source: "conference.pdf".to_string(),
                embedding: vec![1.0, 0.0],
            },
            IndexedDocument {
                id: "2".to_string(),
                text: "Registration opens in January.".to_string(),
                source: "conference.pdf".to_string(),
                embedding: vec![0.9, 0.1],
            },
            IndexedDocument {
                id: "3".to_string(),
                text: "Board elections are held in the fall.".to_string(),
                source: "governance.pdf".to_string(),
                embedding: vec![0.0, 1.0],
            },
        ];
        Arc::new(VectorIndex::new(docs).unwrap())
    }

    #[tokio::test]
    async fn test_answers_from_context_with_citations() {
        let chat = RecordingChat::new("SEMPA 360 is held every spring.");
        let answerer = RetrievalAnswerer::new(index(), Arc::new(FixedEmbedder(vec![1.0, 0.0])), chat.clone());

        let answer = answerer
            .try_answer("When is the conference?")
            .await
            .unwrap()
            .expect("rag answer expected");

        assert_eq!(answer.source, SourceTag::Rag);
        assert_eq!(answer.text, "SEMPA 360 is held every spring.");
        assert_eq!(answer.citations, vec!["conference.pdf".to_string()]);

        let prompts = chat.prompts.lock().unwrap();
        let user = &prompts[0][1].content;
        assert!(user.contains("[1] (conference.pdf) SEMPA 360 takes place every spring."));
        assert!(user.contains("Question: When is the conference?"));
        assert!(!user.contains("Board elections"));
    }

    #[tokio::test]
    async fn test_no_hits_above_threshold_skips_model() {
        let chat = RecordingChat::new("unused");
        let answerer = RetrievalAnswerer::new(index(), Arc::new(FixedEmbedder(vec![-1.0, 0.0])), chat.clone())
            .with_min_score(0.5);

        assert!(answerer.try_answer("anything").await.unwrap().is_none());
        assert_eq!(chat.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_answer_marker_falls_through() {
        let chat = RecordingChat::new("NO_ANSWER");
        let answerer = RetrievalAnswerer::new(index(), Arc::new(FixedEmbedder(vec![1.0, 0.0])), chat.clone());

        assert!(answerer.try_answer("What is the dress code?").await.unwrap().is_none());
        assert_eq!(chat.calls(), 1);
    }

    #[tokio::test]
    async fn test_embedding_failure_is_an_error() {
        let chat = RecordingChat::new("unused");
        let answerer = RetrievalAnswerer::new(index(), Arc::new(FailingEmbedder), chat);

        assert!(answerer.try_answer("When is the conference?").await.is_err());
    }

    #[tokio::test]
    async fn test_top_k_limits_context() {
        let chat = RecordingChat::new("Spring.");
        let answerer = RetrievalAnswerer::new(index(), Arc::new(FixedEmbedder(vec![1.0, 0.0])), chat.clone())
            .with_top_k(1)
            .with_min_score(0.0);

        answerer.try_answer("When?").await.unwrap();
        let prompts = chat.prompts.lock().unwrap();
        assert!(!prompts[0][1].content.contains("[2]"));
    }
}
