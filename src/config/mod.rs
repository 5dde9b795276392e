use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

/// LLM Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum LLMProvider {
    #[serde(rename = "openai")]
    OpenAI,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "gemini")]
    #[default]
    Gemini,
    #[serde(rename = "ollama")]
    Ollama,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
            LLMProvider::Gemini => write!(f, "gemini"),
            LLMProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(LLMProvider::OpenAI),
            "anthropic" => Ok(LLMProvider::Anthropic),
            "gemini" => Ok(LLMProvider::Gemini),
            "ollama" => Ok(LLMProvider::Ollama),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// 页面渲染的等待策略
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Default)]
pub enum WaitPolicy {
    /// 请求返回即可
    #[serde(rename = "immediate")]
    Immediate,
    /// 等待DOM就绪
    #[serde(rename = "dom-ready")]
    DomReady,
    /// 等待完整加载
    #[serde(rename = "full-load")]
    #[default]
    FullLoad,
    /// 等待网络空闲
    #[serde(rename = "idle")]
    Idle,
}

impl std::str::FromStr for WaitPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "immediate" => Ok(WaitPolicy::Immediate),
            "dom-ready" => Ok(WaitPolicy::DomReady),
            "full-load" => Ok(WaitPolicy::FullLoad),
            "idle" => Ok(WaitPolicy::Idle),
            _ => Err(format!("Unknown wait policy: {}", s)),
        }
    }
}

/// 应用程序配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// 任务源API基地址
    pub task_api_base_url: String,

    /// 附件与临时文件的工作目录 (.quest/files)
    pub workdir: PathBuf,

    /// 答题结果输出路径（JSONL，逐任务追加）
    pub results_path: PathBuf,

    /// 是否启用详细日志
    pub verbose: bool,

    /// LLM模型配置
    pub llm: LLMConfig,

    /// 检索管线配置
    pub retriever: RetrieverConfig,

    /// 互联网搜索配置
    pub search: SearchConfig,

    /// 各级智能体的步数预算配置
    pub agents: AgentsConfig,

    /// 远端文件上传配置
    pub files: FilesConfig,
}

/// LLM模型配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LLMConfig {
    /// LLM Provider类型
    pub provider: LLMProvider,

    /// LLM API KEY
    pub api_key: String,

    /// LLM API基地址
    pub api_base_url: String,

    /// 求解引擎模型，驱动各级智能体的推理
    pub model_engine: String,

    /// 裁判模型，用于最终答案的校验
    pub model_verifier: String,

    /// 最大tokens
    pub max_tokens: u32,

    /// 裁判调用的思考预算（最大tokens）
    pub verifier_max_tokens: u32,

    /// 温度
    pub temperature: f64,

    /// 生成停止序列
    pub stop_sequences: Vec<String>,

    /// 重试次数
    pub retry_attempts: u32,

    /// 重试起始间隔（毫秒），指数退避的下限
    pub retry_delay_floor_ms: u64,

    /// 重试间隔上限（毫秒）
    pub retry_delay_ceiling_ms: u64,

    /// 指数退避倍率
    pub retry_backoff_multiplier: f64,

    /// 超时时间（秒）
    pub timeout_seconds: u64,
}

/// 检索管线配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RetrieverConfig {
    /// 切块大小（字符数）
    pub chunk_size: usize,

    /// 相邻块之间的重叠字符数，必须小于chunk_size
    pub chunk_overlap: usize,

    /// 相似度检索返回的块数
    pub top_k: usize,

    /// 向量化模型
    pub embedding_model: String,
}

/// 互联网搜索配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SearchConfig {
    /// 单次搜索的最大结果数
    pub max_results: usize,

    /// 是否追加一次百科式扩展搜索
    pub broaden_encyclopedia: bool,

    /// 页面渲染的等待策略
    pub wait_policy: WaitPolicy,

    /// 单页访问超时（秒）
    pub page_timeout_seconds: u64,
}

/// 各级智能体的步数预算配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AgentsConfig {
    /// 顶层编排智能体的步数预算
    pub orchestrator_max_steps: usize,

    /// 顶层编排智能体的重规划间隔
    pub orchestrator_planning_interval: usize,

    /// 搜索助理智能体的步数预算
    pub assistant_max_steps: usize,

    /// 搜索助理智能体的重规划间隔
    pub assistant_planning_interval: usize,

    /// 网络搜索智能体的步数预算（职责窄，预算小）
    pub websearch_max_steps: usize,
}

/// 远端文件上传配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FilesConfig {
    /// 轮询文件就绪状态的固定间隔（秒）
    pub poll_interval_seconds: u64,

    /// 等待文件就绪的最长总时长（秒），超出即判定该次工具调用失败
    pub max_wait_seconds: u64,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// 校验配置项之间的约束
    pub fn validate(&self) -> Result<()> {
        if self.retriever.chunk_overlap >= self.retriever.chunk_size {
            anyhow::bail!(
                "retriever.chunk_overlap ({}) must be smaller than retriever.chunk_size ({})",
                self.retriever.chunk_overlap,
                self.retriever.chunk_size
            );
        }
        if self.retriever.top_k == 0 {
            anyhow::bail!("retriever.top_k must be positive");
        }
        if self.agents.orchestrator_max_steps == 0
            || self.agents.assistant_max_steps == 0
            || self.agents.websearch_max_steps == 0
        {
            anyhow::bail!("agent step budgets must be positive");
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            task_api_base_url: String::from("https://agents-course-unit4-scoring.hf.space"),
            workdir: PathBuf::from(".quest/files"),
            results_path: PathBuf::from("quest.answers.jsonl"),
            verbose: false,
            llm: LLMConfig::default(),
            retriever: RetrieverConfig::default(),
            search: SearchConfig::default(),
            agents: AgentsConfig::default(),
            files: FilesConfig::default(),
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::default(),
            api_key: std::env::var("QUEST_LLM_API_KEY").unwrap_or_default(),
            api_base_url: String::from("https://generativelanguage.googleapis.com"),
            model_engine: String::from("gemini-2.0-flash"),
            model_verifier: String::from("gemini-2.5-flash"),
            max_tokens: 2048,
            verifier_max_tokens: 4096,
            temperature: 0.0,
            stop_sequences: vec![String::from("END")],
            retry_attempts: 5,
            retry_delay_floor_ms: 10_000,
            retry_delay_ceiling_ms: 100_000,
            retry_backoff_multiplier: 2.0,
            timeout_seconds: 300,
        }
    }
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            chunk_size: 2048,
            chunk_overlap: 512,
            top_k: 15,
            embedding_model: String::from("text-embedding-004"),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 5,
            broaden_encyclopedia: false,
            wait_policy: WaitPolicy::default(),
            page_timeout_seconds: 30,
        }
    }
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            orchestrator_max_steps: 15,
            orchestrator_planning_interval: 3,
            assistant_max_steps: 7,
            assistant_planning_interval: 5,
            websearch_max_steps: 3,
        }
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 5,
            max_wait_seconds: 60,
        }
    }
}

// Include tests
#[cfg(test)]
mod tests;
