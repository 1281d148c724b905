use crate::domain::model::{Answer, AnswerRecord, ChatMessage, SourceTag};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn append_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = bool> + Send;
    /// 檔案大小（bytes），檔案不存在時為 `None`
    fn file_len(&self, path: &str) -> impl std::future::Future<Output = Option<u64>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn llm_endpoint(&self) -> &str;
    fn api_key(&self) -> Option<String>;
    fn chat_model(&self) -> &str;
    fn embedding_model(&self) -> &str;
    fn temperature(&self) -> Option<f32>;
    fn request_timeout(&self) -> Duration;
}

/// 回答鏈中的一個階段
///
/// `Ok(None)` 與 `Err` 都代表交給下一個階段處理。
#[async_trait]
pub trait AnswerSource: Send + Sync {
    fn tag(&self) -> SourceTag;

    fn name(&self) -> &str {
        self.tag().label()
    }

    async fn try_answer(&self, question: &str) -> Result<Option<Answer>>;
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String>;
}

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>>;
}

#[async_trait]
pub trait AnswerLog: Send + Sync {
    async fn record(&self, record: &AnswerRecord) -> Result<()>;
}
