//! LLM客户端 - 提供统一的LLM服务接口

use anyhow::Result;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, LLMConfig};
use crate::retrieval::EmbeddingBackend;

mod providers;

pub use providers::{ProviderAgent, ProviderClient, ProviderEmbeddingModel};

/// 有界重试策略：指数退避，带下限、上限与随机抖动。
/// 只用于生成类的网络调用；页面访问一类的I/O按失败即跳过处理。
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub floor: Duration,
    pub ceiling: Duration,
    pub multiplier: f64,
}

impl RetryPolicy {
    pub fn from_config(config: &LLMConfig) -> Self {
        Self {
            attempts: config.retry_attempts.max(1),
            floor: Duration::from_millis(config.retry_delay_floor_ms),
            ceiling: Duration::from_millis(config.retry_delay_ceiling_ms),
            multiplier: config.retry_backoff_multiplier,
        }
    }

    /// 第attempt次失败后的等待时长（attempt从1开始计）
    fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.powi(attempt.saturating_sub(1) as i32);
        let raw = self.floor.as_millis() as f64 * factor;
        let capped = raw.min(self.ceiling.as_millis() as f64);
        // 抖动±20%，避免重试风暴
        let jitter = rand::random_range(0.8..1.2);
        Duration::from_millis((capped * jitter) as u64)
    }

    /// 执行带重试的异步操作
    pub async fn run<T, F, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, anyhow::Error>>,
    {
        let mut retries = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(err) => {
                    retries += 1;
                    if retries >= self.attempts {
                        return Err(err);
                    }
                    eprintln!(
                        "❌ 调用模型服务出错，重试中 (第 {} / {}次尝试): {}",
                        retries, self.attempts, err
                    );
                    tokio::time::sleep(self.delay_for(retries)).await;
                }
            }
        }
    }
}

/// LLM客户端 - 提供统一的LLM服务接口。
/// 进程启动时构造一次，显式注入到所有需要的组件，没有隐藏的全局单例。
#[derive(Clone)]
pub struct LLMClient {
    config: Config,
    client: ProviderClient,
    retry: RetryPolicy,
}

impl LLMClient {
    /// 创建新的LLM客户端
    pub fn new(config: Config) -> Result<Self> {
        let client = ProviderClient::new(&config.llm)?;
        let retry = RetryPolicy::from_config(&config.llm);
        Ok(Self {
            client,
            retry,
            config,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.clone()
    }

    /// 检查模型连接和功能是否正常
    pub async fn check_connection(&self) -> Result<()> {
        println!("🔄 正在检查模型连接...");
        match self
            .prompt_engine("You are a helpful assistant.", "Hello")
            .await
        {
            Ok(_) => {
                println!("✅ 模型连接正常");
                Ok(())
            }
            Err(e) => {
                eprintln!("❌ 模型连接失败: {}", e);
                Err(e)
            }
        }
    }

    /// 求解引擎模型的单轮对话
    pub async fn prompt_engine(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let llm_config = &self.config.llm;
        let agent = self.client.create_agent(
            &llm_config.model_engine,
            system_prompt,
            llm_config,
            llm_config.max_tokens,
        );
        self.retry
            .run(|| async { agent.prompt(user_prompt).await })
            .await
    }

    /// 裁判模型的单轮对话，使用独立的思考预算
    pub async fn prompt_verifier(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let llm_config = &self.config.llm;
        let agent = self.client.create_agent(
            &llm_config.model_verifier,
            system_prompt,
            llm_config,
            llm_config.verifier_max_tokens,
        );
        self.retry
            .run(|| async { agent.prompt(user_prompt).await })
            .await
    }

    /// 结构化数据提取
    pub async fn extract<T>(&self, system_prompt: &str, user_prompt: &str) -> Result<T>
    where
        T: JsonSchema + for<'a> Deserialize<'a> + Serialize + Send + Sync + 'static,
    {
        let llm_config = &self.config.llm;
        let extractor =
            self.client
                .create_extractor::<T>(&llm_config.model_engine, system_prompt, llm_config);
        self.retry
            .run(|| async { extractor.extract(user_prompt).await })
            .await
    }

    /// 构造检索管线使用的向量化后端
    pub fn embedding_backend(&self) -> Result<Arc<dyn EmbeddingBackend>> {
        let model = self
            .client
            .create_embedding_model(&self.config.retriever.embedding_model)?;
        Ok(Arc::new(RigEmbeddingBackend {
            model,
            retry: self.retry.clone(),
        }))
    }
}

/// rig向量化模型适配为检索管线的EmbeddingBackend
pub struct RigEmbeddingBackend {
    model: ProviderEmbeddingModel,
    retry: RetryPolicy,
}

#[async_trait]
impl EmbeddingBackend for RigEmbeddingBackend {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        self.retry
            .run(|| async { self.model.embed(texts.to_vec()).await })
            .await
    }
}

// Include tests
#[cfg(test)]
mod tests;
