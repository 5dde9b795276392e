use crate::config::{Config, LLMProvider, WaitPolicy};
use clap::Parser;
use std::path::PathBuf;

/// DeepQuest-RS - 由Rust与AI驱动的自主答题引擎
#[derive(Parser, Debug)]
#[command(name = "Quest (deepquest-rs)")]
#[command(
    about = "AI-based autonomous question answering engine. It orchestrates a hierarchy of reasoning agents that search the web, read pages, query attached media files, and self-verify the final answer."
)]
#[command(author = "Sopaco")]
#[command(version)]
pub struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 答题结果输出路径（JSONL）
    #[arg(short, long)]
    pub results_path: Option<PathBuf>,

    /// 单题模式：直接求解给定的问题而不访问任务源
    #[arg(short, long)]
    pub question: Option<String>,

    /// 单题模式下的附件路径
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// 任务源API基地址
    #[arg(long)]
    pub task_api_base_url: Option<String>,

    /// LLM Provider (openai, anthropic, gemini, ollama)
    #[arg(long)]
    pub llm_provider: Option<String>,

    /// LLM API基地址
    #[arg(long)]
    pub llm_api_base_url: Option<String>,

    /// LLM API KEY
    #[arg(long)]
    pub llm_api_key: Option<String>,

    /// 求解引擎模型
    #[arg(long)]
    pub model_engine: Option<String>,

    /// 裁判模型
    #[arg(long)]
    pub model_verifier: Option<String>,

    /// 最大tokens数
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// 温度参数
    #[arg(long)]
    pub temperature: Option<f64>,

    /// 向量化模型
    #[arg(long)]
    pub embedding_model: Option<String>,

    /// 搜索时追加一次百科式扩展搜索
    #[arg(long)]
    pub broaden_encyclopedia: bool,

    /// 页面渲染的等待策略 (immediate, dom-ready, full-load, idle)
    #[arg(long)]
    pub wait_policy: Option<String>,

    /// 是否启用详细日志
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// 将CLI参数转换为配置
    pub fn into_config(self) -> Config {
        let mut config = if let Some(config_path) = &self.config {
            // 如果显式指定了配置文件路径，从该路径加载
            Config::from_file(config_path).unwrap_or_else(|_| {
                panic!("⚠️ 警告: 无法读取配置文件 {:?}", config_path)
            })
        } else {
            // 如果没有显式指定配置文件，尝试从默认位置加载
            let default_config_path = std::env::current_dir()
                .unwrap_or_else(|_| std::path::PathBuf::from("."))
                .join("quest.toml");

            if default_config_path.exists() {
                Config::from_file(&default_config_path).unwrap_or_else(|_| {
                    panic!(
                        "⚠️ 警告: 无法读取默认配置文件 {:?}",
                        default_config_path
                    )
                })
            } else {
                // 默认配置文件不存在，使用默认值
                Config::default()
            }
        };

        if let Some(results_path) = self.results_path {
            config.results_path = results_path;
        }
        if let Some(task_api_base_url) = self.task_api_base_url {
            config.task_api_base_url = task_api_base_url;
        }

        // 覆盖LLM配置
        if let Some(provider_str) = self.llm_provider {
            if let Ok(provider) = provider_str.parse::<LLMProvider>() {
                config.llm.provider = provider;
            } else {
                eprintln!(
                    "⚠️ 警告: 未知的provider: {}，使用默认provider",
                    provider_str
                );
            }
        }
        if let Some(llm_api_base_url) = self.llm_api_base_url {
            config.llm.api_base_url = llm_api_base_url;
        }
        if let Some(llm_api_key) = self.llm_api_key {
            config.llm.api_key = llm_api_key;
        }
        if let Some(model_engine) = self.model_engine {
            config.llm.model_engine = model_engine;
        }
        if let Some(model_verifier) = self.model_verifier {
            config.llm.model_verifier = model_verifier;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.llm.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = temperature;
        }

        // 检索与搜索配置
        if let Some(embedding_model) = self.embedding_model {
            config.retriever.embedding_model = embedding_model;
        }
        if self.broaden_encyclopedia {
            config.search.broaden_encyclopedia = true;
        }
        if let Some(wait_policy_str) = self.wait_policy {
            if let Ok(wait_policy) = wait_policy_str.parse::<WaitPolicy>() {
                config.search.wait_policy = wait_policy;
            } else {
                eprintln!(
                    "⚠️ 警告: 未知的等待策略: {}，使用默认策略 (full-load)",
                    wait_policy_str
                );
            }
        }

        config.verbose = self.verbose;

        config
    }
}
