//! YouTube问答工具 - 下载视频后走视频问答

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::agent::tool::AgentTool;
use crate::llm::files::FileQaBackend;
use crate::tools::files::FileQa;

/// 视频下载边界。实现只是围绕下载器的薄封装。
#[async_trait]
pub trait VideoDownloader: Send + Sync {
    async fn download(&self, url: &str, output_dir: &Path) -> Result<PathBuf>;
}

/// 基于yt-dlp子进程的下载实现
pub struct YtDlpDownloader;

#[async_trait]
impl VideoDownloader for YtDlpDownloader {
    async fn download(&self, url: &str, output_dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(output_dir)
            .await
            .context("failed to create download directory")?;
        let output_path = output_dir.join(format!("{}.mp4", video_id(url)));

        let status = tokio::process::Command::new("yt-dlp")
            .arg("--quiet")
            .arg("-f")
            .arg("mp4")
            .arg("-o")
            .arg(&output_path)
            .arg(url)
            .status()
            .await
            .context("failed to launch yt-dlp; is it installed?")?;
        if !status.success() {
            anyhow::bail!("yt-dlp exited with status {} for {}", status, url);
        }
        Ok(output_path)
    }
}

/// 从视频URL推出本地文件名
fn video_id(url: &str) -> String {
    let raw = url
        .split('=')
        .nth(1)
        .or_else(|| url.rsplit('/').next())
        .unwrap_or("video");
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

#[derive(Debug, Deserialize)]
struct YouTubeArgs {
    question: String,
    url: String,
}

/// YouTube问答工具。下载视频到工作目录，再以视频问答回答问题。
pub struct YouTubeQaTool {
    backend: Arc<dyn FileQaBackend>,
    downloader: Arc<dyn VideoDownloader>,
    output_dir: PathBuf,
}

impl YouTubeQaTool {
    pub fn new(
        backend: Arc<dyn FileQaBackend>,
        downloader: Arc<dyn VideoDownloader>,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            backend,
            downloader,
            output_dir,
        }
    }
}

#[async_trait]
impl AgentTool for YouTubeQaTool {
    fn name(&self) -> &str {
        "YouTubeQA"
    }

    fn description(&self) -> &str {
        "Use this tool to answer questions about a YouTube video."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "question": {
                    "type": "string",
                    "description": "A precise and detailed question to answer about the video. If \
possible, provide a small plan on the steps to follow to reach the conclusion."
                },
                "url": {
                    "type": "string",
                    "description": "The URL of the YouTube video to answer questions about."
                }
            },
            "required": ["question", "url"]
        })
    }

    async fn invoke(&self, arguments: Value) -> Result<String> {
        let args: YouTubeArgs = serde_json::from_value(arguments)?;
        let filepath = self.downloader.download(&args.url, &self.output_dir).await?;
        let video_qa = FileQa::video(self.backend.clone(), filepath);
        video_qa.invoke(json!({ "question": args.question })).await
    }
}

// Include tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::files::FileHandle;
    use std::sync::Mutex;

    #[test]
    fn test_video_id_from_watch_url() {
        assert_eq!(video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), "dQw4w9WgXcQ");
        assert_eq!(video_id("https://youtu.be/dQw4w9WgXcQ"), "dQw4w9WgXcQ");
    }

    struct FakeDownloader {
        requested: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl VideoDownloader for FakeDownloader {
        async fn download(&self, url: &str, output_dir: &Path) -> Result<PathBuf> {
            self.requested.lock().unwrap().push(url.to_string());
            Ok(output_dir.join("video.mp4"))
        }
    }

    struct FakeBackend;

    #[async_trait]
    impl FileQaBackend for FakeBackend {
        async fn upload(&self, _path: &Path) -> Result<FileHandle> {
            Ok(FileHandle {
                name: "files/v".to_string(),
                uri: "https://files.example/v".to_string(),
                mime_type: "video/mp4".to_string(),
            })
        }

        async fn wait_until_active(&self, _handle: &FileHandle) -> Result<()> {
            Ok(())
        }

        async fn generate_with_file(&self, _handle: &FileHandle, prompt: &str) -> Result<String> {
            Ok(format!("answered: {}", prompt.lines().last().unwrap_or("")))
        }

        async fn clear_all(&self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_youtube_qa_downloads_then_answers() {
        let downloader = Arc::new(FakeDownloader {
            requested: Mutex::new(Vec::new()),
        });
        let tool = YouTubeQaTool::new(
            Arc::new(FakeBackend),
            downloader.clone(),
            PathBuf::from("/tmp/quest-test"),
        );

        let answer = tool
            .invoke(json!({
                "question": "what song is playing?",
                "url": "https://www.youtube.com/watch?v=abc123"
            }))
            .await
            .unwrap();

        assert!(answer.contains("what song is playing?"));
        assert_eq!(
            downloader.requested.lock().unwrap().as_slice(),
            &["https://www.youtube.com/watch?v=abc123".to_string()]
        );
    }
}
