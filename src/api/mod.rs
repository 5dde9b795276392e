//! 任务源边界 - 拉取任务清单并按任务下载附件

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::Config;
use crate::types::Task;

#[derive(Debug, Deserialize)]
struct RemoteTask {
    task_id: String,
    question: String,
    #[serde(default)]
    file_name: String,
}

/// 任务源。围绕HTTP问题清单接口的薄封装。
pub struct TaskSource {
    http: reqwest::Client,
    base_url: String,
    files_dir: PathBuf,
}

impl TaskSource {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: config.task_api_base_url.trim_end_matches('/').to_string(),
            files_dir: config.workdir.clone(),
        })
    }

    /// 拉取任务清单，带附件的任务顺便把附件下载到工作目录
    pub async fn fetch_tasks(&self) -> Result<Vec<Task>> {
        let url = format!("{}/questions", self.base_url);
        let remote_tasks: Vec<RemoteTask> = self
            .http
            .get(&url)
            .send()
            .await
            .context("task list request failed")?
            .error_for_status()
            .context("task list request rejected")?
            .json()
            .await
            .context("task list response unreadable")?;

        tokio::fs::create_dir_all(&self.files_dir)
            .await
            .context("failed to create attachment directory")?;

        let mut tasks = Vec::with_capacity(remote_tasks.len());
        for remote in remote_tasks {
            let filepath = if remote.file_name.is_empty() {
                None
            } else {
                Some(
                    self.download_attachment(&remote.task_id, &remote.file_name)
                        .await?,
                )
            };
            tasks.push(Task {
                description: remote.question,
                task_id: remote.task_id,
                filepath,
            });
        }
        Ok(tasks)
    }

    async fn download_attachment(&self, task_id: &str, file_name: &str) -> Result<PathBuf> {
        let url = format!("{}/files/{}", self.base_url, task_id);
        let bytes = self
            .http
            .get(&url)
            .send()
            .await
            .context(format!("attachment request failed for task {}", task_id))?
            .error_for_status()
            .context(format!("attachment request rejected for task {}", task_id))?
            .bytes()
            .await
            .context("attachment body unreadable")?;

        let filepath = self.files_dir.join(file_name);
        tokio::fs::write(&filepath, &bytes)
            .await
            .context(format!("failed to write attachment {:?}", filepath))?;
        Ok(filepath)
    }
}
