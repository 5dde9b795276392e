//! 网络搜索工具 - 内部驱动一台小预算的检索智能体

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::agent::decision::AgentBrain;
use crate::agent::executor::{AgentLoop, AgentLoopConfig};
use crate::agent::tool::AgentTool;
use crate::config::RetrieverConfig;
use crate::prompts;
use crate::retrieval::EmbeddingBackend;
use crate::search::InternetSearch;
use crate::tools::web_rag::WebRagTool;

#[derive(Debug, Deserialize)]
struct QueryArgs {
    query: String,
}

/// 网络搜索工具。对父智能体而言是一次同步调用，
/// 内部拥有并驱动一台只带检索工具的子智能体跑完整个循环，
/// 把结果收敛为一段带引用的摘要。子循环的预算很小，职责也窄。
pub struct WebSearchTool {
    brain: Arc<dyn AgentBrain>,
    search: Arc<InternetSearch>,
    embedder: Arc<dyn EmbeddingBackend>,
    retriever_config: RetrieverConfig,
    max_steps: usize,
    verbose: bool,
}

impl WebSearchTool {
    pub fn new(
        brain: Arc<dyn AgentBrain>,
        search: Arc<InternetSearch>,
        embedder: Arc<dyn EmbeddingBackend>,
        retriever_config: RetrieverConfig,
        max_steps: usize,
        verbose: bool,
    ) -> Self {
        Self {
            brain,
            search,
            embedder,
            retriever_config,
            max_steps,
            verbose,
        }
    }
}

#[async_trait]
impl AgentTool for WebSearchTool {
    fn name(&self) -> &str {
        "WebSearch"
    }

    fn description(&self) -> &str {
        "This tool finds relevant information about a task on the internet."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "A natural language query describing what has to be looked up \
on the internet. Be specific about what has to be looked up, provide the complete description of \
what you need."
                }
            },
            "required": ["query"]
        })
    }

    async fn invoke(&self, arguments: Value) -> Result<String> {
        let args: QueryArgs = serde_json::from_value(arguments)?;

        let rag_tool = WebRagTool::new(
            self.search.clone(),
            self.embedder.clone(),
            self.retriever_config.clone(),
        );
        let agent = AgentLoop::new(
            "web-search",
            prompts::WEB_SEARCH_AGENT_SYSTEM,
            self.brain.clone(),
            vec![Box::new(rag_tool)],
            vec![],
            AgentLoopConfig {
                max_steps: self.max_steps,
                planning_interval: None,
            },
            self.verbose,
        );

        let outcome = agent.run(&prompts::web_search_task_prompt(&args.query)).await?;
        Ok(outcome.answer)
    }
}
