use crate::core::{AnswerLog, AnswerRecord, Storage};
use crate::utils::error::{AssistantError, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;

pub const DEFAULT_LOG_FILE: &str = "chat_log.csv";
const HEADER: [&str; 4] = ["timestamp", "question", "answer", "source"];

/// 以 CSV 附加寫入每一次問答
pub struct CsvAnswerLog<S: Storage> {
    storage: S,
    file_name: String,
    // 序列化「檢查檔案大小 + 寫入」避免重複表頭
    write_lock: Mutex<()>,
}

impl<S: Storage> CsvAnswerLog<S> {
    pub fn new(storage: S, file_name: impl Into<String>) -> Self {
        Self {
            storage,
            file_name: file_name.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// 讀回所有紀錄；檔案不存在時回傳空陣列
    pub async fn read_records(&self) -> Result<Vec<AnswerRecord>> {
        if !self.storage.exists(&self.file_name).await {
            return Ok(Vec::new());
        }

        let data = self.storage.read_file(&self.file_name).await?;
        let mut reader = csv::Reader::from_reader(data.as_slice());
        let mut records = Vec::new();
        for row in reader.deserialize() {
            let record: AnswerRecord = row?;
            records.push(record);
        }
        Ok(records)
    }

    fn encode(record: &AnswerRecord, with_header: bool) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());

        if with_header {
            writer.write_record(HEADER)?;
        }
        writer.serialize(record)?;

        writer
            .into_inner()
            .map_err(|e| AssistantError::IoError(e.into_error()))
    }
}

#[async_trait]
impl<S: Storage> AnswerLog for CsvAnswerLog<S> {
    async fn record(&self, record: &AnswerRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        // 檔案不存在或被清空時都要補上表頭
        let with_header = matches!(self.storage.file_len(&self.file_name).await, None | Some(0));
        let row = Self::encode(record, with_header)?;
        self.storage.append_file(&self.file_name, &row).await?;

        tracing::debug!("Recorded {} answer to {}", record.source, self.file_name);
        Ok(())
    }
}
