//! 模态问答工具 - 把自然语言问题和远端文件句柄交给文件级生成边界

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::OnceCell;

use crate::agent::tool::AgentTool;
use crate::llm::files::{FileHandle, FileQaBackend};

const IMAGE_TASK_PROMPT: &str = "You are an expert assistant answering questions about the \
provided image. Think step by step before giving the final answer.\nquestion: {question}";

const AUDIO_TASK_PROMPT: &str = "You are an expert assistant answering questions about the \
provided audio. Think step by step before giving the final answer.\nquestion: {question}";

const VIDEO_TASK_PROMPT: &str = "You are an expert assistant answering questions about the \
provided video. Think step by step before giving the final answer.\nquestion: {question}";

#[derive(Debug, Deserialize)]
struct QuestionArgs {
    question: String,
}

/// 文件问答工具。首次调用时上传文件并缓存句柄，
/// 每次调用前等待远端文件就绪；就绪超时是该次工具调用的失败，
/// 作为观察上抛给父智能体自行恢复。
pub struct FileQa {
    name: &'static str,
    description: &'static str,
    question_description: &'static str,
    task_prompt: &'static str,
    backend: Arc<dyn FileQaBackend>,
    filepath: PathBuf,
    handle: OnceCell<FileHandle>,
}

impl FileQa {
    pub fn image(backend: Arc<dyn FileQaBackend>, filepath: PathBuf) -> Self {
        Self {
            name: "ImageQA",
            description: "Use this tool to answer questions about the given image.",
            question_description: "A precise and detailed question to answer about the image. If \
possible, provide a small plan on the steps to follow to reach the conclusion.",
            task_prompt: IMAGE_TASK_PROMPT,
            backend,
            filepath,
            handle: OnceCell::new(),
        }
    }

    pub fn audio(backend: Arc<dyn FileQaBackend>, filepath: PathBuf) -> Self {
        Self {
            name: "AudioQA",
            description: "Use this tool to answer questions about the given audio file.",
            question_description: "A precise and detailed question to answer about the audio. If \
possible, provide a small plan on the steps to follow to reach the conclusion.",
            task_prompt: AUDIO_TASK_PROMPT,
            backend,
            filepath,
            handle: OnceCell::new(),
        }
    }

    pub fn video(backend: Arc<dyn FileQaBackend>, filepath: PathBuf) -> Self {
        Self {
            name: "VideoQA",
            description: "Use this tool to answer questions about the given video file.",
            question_description: "A precise and detailed question to answer about the video. If \
possible, provide a small plan on the steps to follow to reach the conclusion.",
            task_prompt: VIDEO_TASK_PROMPT,
            backend,
            filepath,
            handle: OnceCell::new(),
        }
    }

    /// 上传（一次）并等待远端文件就绪
    async fn ready_handle(&self) -> Result<&FileHandle> {
        let handle = self
            .handle
            .get_or_try_init(|| async {
                self.backend
                    .upload(&self.filepath)
                    .await
                    .context(format!("failed to upload {:?}", self.filepath))
            })
            .await?;
        self.backend.wait_until_active(handle).await?;
        Ok(handle)
    }
}

#[async_trait]
impl AgentTool for FileQa {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "question": {
                    "type": "string",
                    "description": self.question_description
                }
            },
            "required": ["question"]
        })
    }

    async fn invoke(&self, arguments: Value) -> Result<String> {
        let args: QuestionArgs = serde_json::from_value(arguments)?;
        let handle = self.ready_handle().await?;
        let prompt = self.task_prompt.replace("{question}", &args.question);
        self.backend.generate_with_file(handle, &prompt).await
    }
}
