use crate::core::{IndexedDocument, Result, ScoredDocument};
use crate::utils::error::AssistantError;
use std::cmp::Ordering;

/// 預先建好的文件向量索引（唯讀）
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    documents: Vec<IndexedDocument>,
    dimension: usize,
    embedding_model: Option<String>,
}

impl VectorIndex {
    pub fn new(documents: Vec<IndexedDocument>) -> Result<Self> {
        let dimension = documents.first().map(|d| d.embedding.len()).unwrap_or(0);

        for doc in &documents {
            if doc.embedding.is_empty() {
                return Err(AssistantError::IndexError {
                    message: format!("Document '{}' has an empty embedding", doc.id),
                });
            }
            if doc.embedding.iter().any(|v| !v.is_finite()) {
                return Err(AssistantError::IndexError {
                    message: format!("Document '{}' has a non-finite embedding value", doc.id),
                });
            }
            if doc.embedding.len() != dimension {
                return Err(AssistantError::IndexError {
                    message: format!(
                        "Document '{}' has embedding dimension {}, expected {}",
                        doc.id,
                        doc.embedding.len(),
                        dimension
                    ),
                });
            }
        }

        Ok(Self {
            documents,
            dimension,
            embedding_model: None,
        })
    }

    pub fn with_embedding_model(mut self, model: Option<String>) -> Self {
        self.embedding_model = model;
        self
    }

    pub fn embedding_model(&self) -> Option<&str> {
        self.embedding_model.as_deref()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// 依餘弦相似度排序，回傳前 `top_k` 筆
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<ScoredDocument>> {
        if self.documents.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(AssistantError::IndexError {
                message: format!(
                    "Query embedding dimension {} does not match index dimension {}",
                    query.len(),
                    self.dimension
                ),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .documents
            .iter()
            .enumerate()
            .map(|(idx, doc)| (idx, cosine_similarity(query, &doc.embedding)))
            .collect();

        rank_descending(&mut scored);

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(idx, score)| ScoredDocument {
                document: self.documents[idx].clone(),
                score,
            })
            .collect())
    }
}

/// 分數由高到低排序，NaN 一律排在最後
///
/// `sort_by` 是穩定排序，同分維持原本順序。
fn rank_descending(scored: &mut [(usize, f32)]) {
    scored.sort_by(|left, right| match (left.1.is_nan(), right.1.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => right.1.total_cmp(&left.1),
    });
}

pub fn cosine_similarity(left: &[f32], right: &[f32]) -> f32 {
    let dot: f32 = left.iter().zip(right).map(|(a, b)| a * b).sum();
    let left_norm = left.iter().map(|v| v * v).sum::<f32>().sqrt();
    let right_norm = right.iter().map(|v| v * v).sum::<f32>().sqrt();

    let denom = left_norm * right_norm;
    if denom <= f32::EPSILON {
        return 0.0;
    }
    dot / denom
}
