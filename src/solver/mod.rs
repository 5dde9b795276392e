//! 求解编排 - 按模态装配顶层智能体并跑完单个任务

pub mod runner;

use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;

use crate::agent::decision::AgentBrain;
use crate::agent::executor::{AcceptanceCheck, AgentLoop, AgentLoopConfig, LoopState};
use crate::agent::tool::AgentTool;
use crate::config::Config;
use crate::llm::client::LLMClient;
use crate::llm::files::{FileQaBackend, GeminiFileStore};
use crate::prompts;
use crate::retrieval::EmbeddingBackend;
use crate::search::{DuckDuckGoSearch, HttpPageRenderer, InternetSearch, PageRenderer};
use crate::tools::{FileQa, SearchAssistantTool, VideoDownloader, YtDlpDownloader};
use crate::types::{Modality, Task};
use crate::utils::load_as_text;
use crate::verify::{Judge, VerificationGate};

/// 求解上下文。所有客户端在进程启动时构造一次，
/// 显式注入到需要的组件，没有惰性的全局单例。
pub struct SolverContext {
    pub config: Config,
    pub llm_client: Arc<LLMClient>,
    pub file_backend: Arc<dyn FileQaBackend>,
    pub search: Arc<InternetSearch>,
    pub renderer: Arc<dyn PageRenderer>,
    pub embedder: Arc<dyn EmbeddingBackend>,
    pub downloader: Arc<dyn VideoDownloader>,
}

impl SolverContext {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let llm_client = Arc::new(LLMClient::new(config.clone())?);
        let embedder = llm_client.embedding_backend()?;
        let file_backend: Arc<dyn FileQaBackend> = Arc::new(GeminiFileStore::new(&config)?);

        let backend = Arc::new(DuckDuckGoSearch::new(config.search.max_results)?);
        let renderer: Arc<dyn PageRenderer> = Arc::new(HttpPageRenderer::new(&config.search)?);
        let search = Arc::new(InternetSearch::new(
            backend,
            renderer.clone(),
            &config.search,
            config.verbose,
        ));

        Ok(Self {
            llm_client,
            file_backend,
            search,
            renderer,
            embedder,
            downloader: Arc::new(YtDlpDownloader),
            config,
        })
    }
}

/// 单任务的求解产出
#[derive(Debug)]
pub struct SolvedTask {
    pub answer: String,
    pub state: LoopState,
    /// 简要轨迹，随答案一起交还调用方
    pub succinct_steps: Vec<Value>,
}

/// 按任务模态装配顶层编排智能体及其任务提示词。
/// 工具集只包含与模态匹配的问答工具，外加搜索助理；
/// 文本附件不走工具，内容直接内联进提示词。
pub fn assemble_orchestrator(ctx: &SolverContext, task: &Task) -> Result<(AgentLoop, String)> {
    let modality = task.modality()?;

    let brain: Arc<dyn AgentBrain> = ctx.llm_client.clone();
    let search_assistant = SearchAssistantTool::new(
        brain.clone(),
        ctx.search.clone(),
        ctx.renderer.clone(),
        ctx.embedder.clone(),
        ctx.file_backend.clone(),
        ctx.downloader.clone(),
        ctx.config.retriever.clone(),
        ctx.config.agents.clone(),
        ctx.config.workdir.clone(),
        ctx.config.verbose,
    );
    let mut tools: Vec<Box<dyn AgentTool>> = vec![Box::new(search_assistant)];

    let mut base_prompt = prompts::orchestrator_task_prompt(&task.description);
    match (modality, &task.filepath) {
        (Modality::Image, Some(path)) => {
            tools.push(Box::new(FileQa::image(ctx.file_backend.clone(), path.clone())));
            base_prompt.push_str("You can use the provided image.");
        }
        (Modality::Audio, Some(path)) => {
            tools.push(Box::new(FileQa::audio(ctx.file_backend.clone(), path.clone())));
            base_prompt.push_str("You can use the provided audio.");
        }
        (Modality::Video, Some(path)) => {
            tools.push(Box::new(FileQa::video(ctx.file_backend.clone(), path.clone())));
            base_prompt.push_str("You can use the provided video.");
        }
        (Modality::Textfile, Some(path)) => match load_as_text(path) {
            Ok(content) => {
                base_prompt.push_str(&format!(
                    "You can use the provided file {} whose content is reported below:\n{}",
                    path.display(),
                    content
                ));
            }
            Err(e) => {
                // 读取失败作为可见信息留给智能体，让它另寻他路
                base_prompt.push_str(&format!(
                    "A file {} was attached but could not be read as text: {}",
                    path.display(),
                    e
                ));
            }
        },
        _ => {}
    }

    let gate = VerificationGate::new(
        ctx.llm_client.clone() as Arc<dyn Judge>,
        ctx.config.verbose,
    );
    let checks: Vec<Box<dyn AcceptanceCheck>> = vec![Box::new(gate)];

    let agent = AgentLoop::new(
        "orchestrator",
        prompts::ORCHESTRATOR_SYSTEM,
        brain,
        tools,
        checks,
        AgentLoopConfig {
            max_steps: ctx.config.agents.orchestrator_max_steps,
            planning_interval: Some(ctx.config.agents.orchestrator_planning_interval),
        },
        ctx.config.verbose,
    );
    Ok((agent, base_prompt))
}

/// 端到端求解一个任务。分类错误是致命的，只中止该任务；
/// 任务结束后无论成败都清空远端文件集合。
pub async fn solve_task(ctx: &SolverContext, task: &Task) -> Result<SolvedTask> {
    let (agent, base_prompt) = assemble_orchestrator(ctx, task)?;
    println!("🧭 开始求解任务 {} ...", task.task_id);

    let run_result = agent.run(&base_prompt).await;

    // 远端文件集合按任务清零，限制资源随运行增长
    if let Err(e) = ctx.file_backend.clear_all().await {
        eprintln!("⚠️ 清理远端文件失败: {}", e);
    }

    let outcome = run_result?;
    Ok(SolvedTask {
        answer: outcome.answer,
        state: outcome.state,
        succinct_steps: outcome.trace.succinct(),
    })
}
