use crate::core::index::VectorIndex;
use crate::core::{IndexedDocument, Storage};
use crate::utils::error::{AssistantError, Result};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

pub const ARCHIVE_ENTRY: &str = "index.json";

#[derive(Debug, Deserialize)]
struct IndexBlob {
    embedding_model: Option<String>,
    documents: Vec<IndexedDocument>,
}

/// 載入預先建好的索引：`.json` 或內含 `index.json` 的 `.zip`
pub async fn load_index<S: Storage>(storage: &S, path: &str) -> Result<VectorIndex> {
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    let bytes = storage.read_file(path).await?;
    tracing::debug!("Read index blob {} ({} bytes)", path, bytes.len());

    let blob: IndexBlob = match extension.as_deref() {
        Some("json") => serde_json::from_slice(&bytes)?,
        Some("zip") => parse_archive(bytes)?,
        _ => {
            return Err(AssistantError::InvalidConfigValueError {
                field: "retrieval.index_path".to_string(),
                value: path.to_string(),
                reason: "Index blob must be a .json or .zip file".to_string(),
            })
        }
    };

    let index = VectorIndex::new(blob.documents)?.with_embedding_model(blob.embedding_model);
    tracing::info!(
        "📚 Loaded document index: {} documents, dimension {}",
        index.len(),
        index.dimension()
    );
    Ok(index)
}

fn parse_archive(bytes: Vec<u8>) -> Result<IndexBlob> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))?;
    let mut entry = archive.by_name(ARCHIVE_ENTRY).map_err(|e| AssistantError::IndexError {
        message: format!("Archive has no {}: {}", ARCHIVE_ENTRY, e),
    })?;

    let mut content = Vec::new();
    entry.read_to_end(&mut content)?;
    Ok(serde_json::from_slice(&content)?)
}
