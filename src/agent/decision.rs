//! 决策引擎 - 模型在每一步提出工具调用或最终答案

use anyhow::Result;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::llm::client::LLMClient;

/// 模型在一步中提出的动作：二选一的封闭集合
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AgentDecision {
    /// 调用一个工具
    ToolCall {
        /// 本步的简短思考
        thought: String,
        /// 工具名称，必须来自可用工具清单
        tool: String,
        /// 工具入参，符合该工具声明的schema
        arguments: serde_json::Value,
    },
    /// 给出最终答案
    FinalAnswer {
        /// 本步的简短思考
        thought: String,
        /// 最终答案文本
        answer: String,
    },
}

/// 智能体循环的推理大脑。生产实现是LLM客户端；
/// 测试可注入按脚本行动的替身。
#[async_trait]
pub trait AgentBrain: Send + Sync {
    /// 提出下一步动作
    async fn decide(&self, system_prompt: &str, user_prompt: &str) -> Result<AgentDecision>;

    /// 自由文本生成（规划、页面摘要等）
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

#[async_trait]
impl AgentBrain for LLMClient {
    async fn decide(&self, system_prompt: &str, user_prompt: &str) -> Result<AgentDecision> {
        self.extract::<AgentDecision>(system_prompt, user_prompt)
            .await
    }

    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.prompt_engine(system_prompt, user_prompt).await
    }
}
