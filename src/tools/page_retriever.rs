//! 单页检索工具 - 访问一个网页并摘取与请求相关的信息

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::agent::decision::AgentBrain;
use crate::agent::tool::AgentTool;
use crate::prompts;
use crate::search::PageRenderer;

#[derive(Debug, Deserialize)]
struct PageArgs {
    task: String,
    url: String,
}

/// 单页检索工具。页面访问失败（含超时）是该次调用的失败，
/// 由父智能体换一个页面重试。
pub struct WebPageRetrieverTool {
    renderer: Arc<dyn PageRenderer>,
    brain: Arc<dyn AgentBrain>,
}

impl WebPageRetrieverTool {
    pub fn new(renderer: Arc<dyn PageRenderer>, brain: Arc<dyn AgentBrain>) -> Self {
        Self { renderer, brain }
    }
}

#[async_trait]
impl AgentTool for WebPageRetrieverTool {
    fn name(&self) -> &str {
        "WebPageRetriever"
    }

    fn description(&self) -> &str {
        "This tool visits a webpage and returns the information relevant to the query. If the \
page can't be reached or the information is incomplete, try with another page. Use this tool \
when you are reasonably confident that the information is in the webpage after having used the \
WebSearch tool."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "task": {
                    "type": "string",
                    "description": "A natural language query describing what has to be looked up \
in the page. Be specific about what has to be searched."
                },
                "url": {
                    "type": "string",
                    "description": "The url of the webpage to visit."
                }
            },
            "required": ["task", "url"]
        })
    }

    async fn invoke(&self, arguments: Value) -> Result<String> {
        let args: PageArgs = serde_json::from_value(arguments)?;

        let page_content = self
            .renderer
            .render(&args.url)
            .await
            .map_err(anyhow::Error::from)?;
        let request = prompts::page_retriever_request(&args.task, &page_content);
        self.brain
            .generate(prompts::PAGE_RETRIEVER_SYSTEM, &request)
            .await
    }
}
