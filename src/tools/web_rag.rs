//! 检索管线工具 - 搜索、切块、向量化、相似度检索、按来源分组

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::agent::tool::AgentTool;
use crate::config::RetrieverConfig;
use crate::retrieval::{
    DEFAULT_SEPARATORS, DocumentChunk, EmbeddingBackend, RecursiveSplitter, VectorIndex,
    group_by_source,
};
use crate::search::InternetSearch;

#[derive(Debug, Deserialize)]
struct QueryArgs {
    query: String,
}

/// 检索管线工具。索引只活在单次调用内：
/// 搜索 → 切块 → 向量化 → top-k → 按来源分组，然后整个索引被丢弃。
pub struct WebRagTool {
    search: Arc<InternetSearch>,
    embedder: Arc<dyn EmbeddingBackend>,
    config: RetrieverConfig,
}

impl WebRagTool {
    pub fn new(
        search: Arc<InternetSearch>,
        embedder: Arc<dyn EmbeddingBackend>,
        config: RetrieverConfig,
    ) -> Self {
        Self {
            search,
            embedder,
            config,
        }
    }
}

#[async_trait]
impl AgentTool for WebRagTool {
    fn name(&self) -> &str {
        "WebSearchRAG"
    }

    fn description(&self) -> &str {
        "This tool searches on the internet and returns the most relevant passages to the query \
found in the sources. The passages are grouped together by source."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The query to search for. It expects a query in natural language."
                }
            },
            "required": ["query"]
        })
    }

    async fn invoke(&self, arguments: Value) -> Result<String> {
        let args: QueryArgs = serde_json::from_value(arguments)?;

        let pages = self.search.search(&args.query).await?;
        let splitter = RecursiveSplitter::new(
            self.config.chunk_size,
            self.config.chunk_overlap,
            DEFAULT_SEPARATORS,
        );

        let mut chunks = Vec::new();
        for page in &pages {
            for piece in splitter.split(&page.content) {
                chunks.push(DocumentChunk {
                    content: piece,
                    source: page.source.clone(),
                });
            }
        }
        if chunks.is_empty() {
            return Ok("No web content could be retrieved for this query.".to_string());
        }

        let index = VectorIndex::build(chunks, self.embedder.as_ref()).await?;
        let ranked = index
            .top_k(&args.query, self.config.top_k, self.embedder.as_ref())
            .await?;
        Ok(group_by_source(&ranked))
    }
}
