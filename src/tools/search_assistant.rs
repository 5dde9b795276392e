//! 搜索助理工具 - 驱动完整的调研子智能体完成一项委托

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::agent::decision::AgentBrain;
use crate::agent::executor::{AgentLoop, AgentLoopConfig};
use crate::agent::tool::AgentTool;
use crate::config::{AgentsConfig, RetrieverConfig};
use crate::llm::files::FileQaBackend;
use crate::prompts;
use crate::retrieval::EmbeddingBackend;
use crate::search::{InternetSearch, PageRenderer};
use crate::tools::page_retriever::WebPageRetrieverTool;
use crate::tools::web_search::WebSearchTool;
use crate::tools::youtube::{VideoDownloader, YouTubeQaTool};

#[derive(Debug, Deserialize)]
struct AssignmentArgs {
    assignment: String,
}

/// 搜索助理工具。对父智能体只是一次同步调用；内部构造并驱动
/// 一台带三件工具（网络搜索、单页检索、YouTube问答）的子智能体，
/// 子智能体有自己的步数预算、规划间隔与轨迹，与父方完全隔离。
pub struct SearchAssistantTool {
    brain: Arc<dyn AgentBrain>,
    search: Arc<InternetSearch>,
    renderer: Arc<dyn PageRenderer>,
    embedder: Arc<dyn EmbeddingBackend>,
    file_backend: Arc<dyn FileQaBackend>,
    downloader: Arc<dyn VideoDownloader>,
    retriever_config: RetrieverConfig,
    agents_config: AgentsConfig,
    download_dir: PathBuf,
    verbose: bool,
}

impl SearchAssistantTool {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        brain: Arc<dyn AgentBrain>,
        search: Arc<InternetSearch>,
        renderer: Arc<dyn PageRenderer>,
        embedder: Arc<dyn EmbeddingBackend>,
        file_backend: Arc<dyn FileQaBackend>,
        downloader: Arc<dyn VideoDownloader>,
        retriever_config: RetrieverConfig,
        agents_config: AgentsConfig,
        download_dir: PathBuf,
        verbose: bool,
    ) -> Self {
        Self {
            brain,
            search,
            renderer,
            embedder,
            file_backend,
            downloader,
            retriever_config,
            agents_config,
            download_dir,
            verbose,
        }
    }
}

#[async_trait]
impl AgentTool for SearchAssistantTool {
    fn name(&self) -> &str {
        "WebSearchAssistant"
    }

    fn description(&self) -> &str {
        "This tool asks an expert assistant to find textual information on the internet. Provide \
an assignment including a detailed description of the information that you need. The assignment \
must be specific and not too broadly scoped. It will return a comprehensive answer with the \
relevant information it has found together with the way it has found it."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "assignment": {
                    "type": "string",
                    "description": "A natural language description of the information you need \
and its use."
                }
            },
            "required": ["assignment"]
        })
    }

    async fn invoke(&self, arguments: Value) -> Result<String> {
        let args: AssignmentArgs = serde_json::from_value(arguments)?;

        let web_search_tool = WebSearchTool::new(
            self.brain.clone(),
            self.search.clone(),
            self.embedder.clone(),
            self.retriever_config.clone(),
            self.agents_config.websearch_max_steps,
            self.verbose,
        );
        let page_tool = WebPageRetrieverTool::new(self.renderer.clone(), self.brain.clone());
        let youtube_tool = YouTubeQaTool::new(
            self.file_backend.clone(),
            self.downloader.clone(),
            self.download_dir.clone(),
        );

        let agent = AgentLoop::new(
            "search-assistant",
            prompts::SEARCH_ASSISTANT_SYSTEM,
            self.brain.clone(),
            vec![
                Box::new(web_search_tool),
                Box::new(page_tool),
                Box::new(youtube_tool),
            ],
            vec![],
            AgentLoopConfig {
                max_steps: self.agents_config.assistant_max_steps,
                planning_interval: Some(self.agents_config.assistant_planning_interval),
            },
            self.verbose,
        );

        let outcome = agent
            .run(&prompts::search_assistant_task_prompt(&args.assignment))
            .await?;
        Ok(outcome.answer)
    }
}
