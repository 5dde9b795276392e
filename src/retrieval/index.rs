//! 临时向量索引 - 每次查询构建一次，用完即弃

use anyhow::Result;
use async_trait::async_trait;

/// 切块后的文档片段，归属关系局限于一次检索调用内
#[derive(Debug, Clone)]
pub struct DocumentChunk {
    /// 片段文本
    pub content: String,
    /// 来源标签（markdown链接形式）
    pub source: String,
}

/// 向量化后端。生产实现包装rig的provider embedding模型，
/// 测试可注入确定性的替身。
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>>;
}

/// 单次查询生命周期的相似度索引。build → top_k一次 → 丢弃。
pub struct VectorIndex {
    entries: Vec<(DocumentChunk, Vec<f64>)>,
}

impl VectorIndex {
    /// 向量化全部片段并建立索引
    pub async fn build(
        chunks: Vec<DocumentChunk>,
        backend: &dyn EmbeddingBackend,
    ) -> Result<Self> {
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = backend.embed(&texts).await?;
        anyhow::ensure!(
            vectors.len() == chunks.len(),
            "embedding backend returned {} vectors for {} chunks",
            vectors.len(),
            chunks.len()
        );
        Ok(Self {
            entries: chunks.into_iter().zip(vectors).collect(),
        })
    }

    /// 余弦相似度top-k。降序排序为稳定排序，
    /// 相同分数保持入库顺序，不做归一化修正。
    pub async fn top_k(
        &self,
        query: &str,
        k: usize,
        backend: &dyn EmbeddingBackend,
    ) -> Result<Vec<&DocumentChunk>> {
        let query_vectors = backend.embed(&[query.to_string()]).await?;
        let query_vector = query_vectors
            .first()
            .ok_or_else(|| anyhow::anyhow!("embedding backend returned no vector for query"))?;

        let mut scored: Vec<(&DocumentChunk, f64)> = self
            .entries
            .iter()
            .map(|(chunk, vector)| (chunk, cosine_similarity(query_vector, vector)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored.into_iter().take(k).map(|(chunk, _)| chunk).collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
