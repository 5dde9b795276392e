//! 文件级生成边界 - Gemini Files API的上传、就绪轮询与基于文件的生成

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::Config;
use crate::llm::client::RetryPolicy;

/// 远端文件句柄。上传后文件不一定立即可查询，
/// 使用前必须等待其进入就绪状态。
#[derive(Debug, Clone)]
pub struct FileHandle {
    /// 资源名，形如 files/abc123
    pub name: String,
    /// 生成调用引用的URI
    pub uri: String,
    /// MIME类型
    pub mime_type: String,
}

/// 文件级问答边界。上传一个本地文件，等待其就绪，
/// 然后携带文件句柄发起生成调用。
#[async_trait]
pub trait FileQaBackend: Send + Sync {
    async fn upload(&self, path: &Path) -> Result<FileHandle>;

    /// 以固定间隔轮询文件状态直至就绪；超过最长总等待时长即失败
    async fn wait_until_active(&self, handle: &FileHandle) -> Result<()>;

    async fn generate_with_file(&self, handle: &FileHandle, prompt: &str) -> Result<String>;

    /// 删除当前已上传的所有文件。每个任务结束后调用一次，
    /// 无论任务成败，避免远端文件集合随运行无限增长。
    async fn clear_all(&self) -> Result<()>;
}

/// Gemini Files API实现
pub struct GeminiFileStore {
    http: reqwest::Client,
    api_base_url: String,
    api_key: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
    poll_interval: Duration,
    max_wait: Duration,
    retry: RetryPolicy,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: RemoteFile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteFile {
    name: String,
    uri: String,
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListResponse {
    #[serde(default)]
    files: Vec<RemoteFile>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl GeminiFileStore {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.llm.timeout_seconds))
            .build()?;
        Ok(Self {
            http,
            api_base_url: config.llm.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.llm.api_key.clone(),
            model: config.llm.model_engine.clone(),
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
            poll_interval: Duration::from_secs(config.files.poll_interval_seconds),
            max_wait: Duration::from_secs(config.files.max_wait_seconds),
            retry: RetryPolicy::from_config(&config.llm),
        })
    }

    async fn fetch_state(&self, name: &str) -> Result<String> {
        let url = format!("{}/v1beta/{}?key={}", self.api_base_url, name, self.api_key);
        let file: RemoteFile = self
            .http
            .get(&url)
            .send()
            .await
            .context("file state request failed")?
            .error_for_status()
            .context("file state request rejected")?
            .json()
            .await
            .context("file state response unreadable")?;
        Ok(file.state.unwrap_or_else(|| "UNKNOWN".to_string()))
    }

    async fn list_page(&self, page_token: Option<&str>) -> Result<FileListResponse> {
        let mut url = format!("{}/v1beta/files?key={}", self.api_base_url, self.api_key);
        if let Some(token) = page_token {
            url.push_str(&format!("&pageToken={}", token));
        }
        self.http
            .get(&url)
            .send()
            .await
            .context("file list request failed")?
            .error_for_status()
            .context("file list request rejected")?
            .json()
            .await
            .context("file list response unreadable")
    }
}

#[async_trait]
impl FileQaBackend for GeminiFileStore {
    async fn upload(&self, path: &Path) -> Result<FileHandle> {
        let bytes = tokio::fs::read(path)
            .await
            .context(format!("failed to read local file {:?}", path))?;
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();

        let url = format!(
            "{}/upload/v1beta/files?key={}",
            self.api_base_url, self.api_key
        );
        let response: UploadResponse = self
            .http
            .post(&url)
            .header("X-Goog-Upload-Protocol", "raw")
            .header("Content-Type", mime_type.clone())
            .body(bytes)
            .send()
            .await
            .context("file upload request failed")?
            .error_for_status()
            .context("file upload rejected")?
            .json()
            .await
            .context("file upload response unreadable")?;

        Ok(FileHandle {
            name: response.file.name,
            uri: response.file.uri,
            mime_type: response.file.mime_type.unwrap_or(mime_type),
        })
    }

    async fn wait_until_active(&self, handle: &FileHandle) -> Result<()> {
        let mut waited = Duration::ZERO;
        loop {
            let state = self.fetch_state(&handle.name).await?;
            match state.as_str() {
                "ACTIVE" => return Ok(()),
                "FAILED" => {
                    anyhow::bail!("File {} entered FAILED state after upload", handle.name)
                }
                _ => {
                    if waited >= self.max_wait {
                        anyhow::bail!(
                            "File {} is not ready after {} seconds",
                            handle.name,
                            self.max_wait.as_secs()
                        );
                    }
                    tokio::time::sleep(self.poll_interval).await;
                    waited += self.poll_interval;
                }
            }
        }
    }

    async fn generate_with_file(&self, handle: &FileHandle, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.api_base_url, self.model, self.api_key
        );
        let body = json!({
            "contents": [{
                "parts": [
                    { "file_data": { "file_uri": handle.uri, "mime_type": handle.mime_type } },
                    { "text": prompt }
                ]
            }],
            "generationConfig": {
                "temperature": self.temperature,
                "maxOutputTokens": self.max_tokens
            }
        });

        self.retry
            .run(|| async {
                let response: serde_json::Value = self
                    .http
                    .post(&url)
                    .json(&body)
                    .send()
                    .await
                    .context("file-grounded generation request failed")?
                    .error_for_status()
                    .context("file-grounded generation rejected")?
                    .json()
                    .await
                    .context("file-grounded generation response unreadable")?;

                let parts = response["candidates"][0]["content"]["parts"]
                    .as_array()
                    .ok_or_else(|| anyhow::anyhow!("malformed generation response"))?;
                let text: String = parts
                    .iter()
                    .filter_map(|p| p["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("");
                if text.is_empty() {
                    anyhow::bail!("empty generation response");
                }
                Ok(text)
            })
            .await
    }

    async fn clear_all(&self) -> Result<()> {
        let mut page_token: Option<String> = None;
        loop {
            let page = self.list_page(page_token.as_deref()).await?;
            for file in &page.files {
                let url = format!(
                    "{}/v1beta/{}?key={}",
                    self.api_base_url, file.name, self.api_key
                );
                self.http
                    .delete(&url)
                    .send()
                    .await
                    .context("file delete request failed")?
                    .error_for_status()
                    .context("file delete rejected")?;
            }
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => return Ok(()),
            }
        }
    }
}
