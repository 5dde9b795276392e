//! 页面渲染边界 - 访问单个URL并转换为Markdown文本

use async_trait::async_trait;
use std::time::Duration;

use crate::config::{SearchConfig, WaitPolicy};

/// 访问页面失败。超时与导航失败是两类可捕获的错误。
#[derive(Debug, thiserror::Error)]
pub enum PageVisitError {
    #[error("Impossible to load the page {url}: timed out")]
    Timeout { url: String },
    #[error("Impossible to load the page {url}: {reason}")]
    Navigation { url: String, reason: String },
}

/// 页面渲染边界。实现方负责把一个URL变成可读的Markdown正文。
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<String, PageVisitError>;

    /// 渲染时采用的等待策略
    fn wait_policy(&self) -> WaitPolicy;
}

/// 基于HTTP抓取 + htmd转换的渲染器。内容在响应返回时即完整，
/// 因此各等待策略在该实现下等价于full-load；执行JavaScript的
/// 渲染器可以作为同一trait的替换实现接入。
pub struct HttpPageRenderer {
    client: reqwest::Client,
    wait_policy: WaitPolicy,
    timeout: Duration,
}

impl HttpPageRenderer {
    pub fn new(config: &SearchConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (compatible; deepquest-rs)")
            .build()?;
        Ok(Self {
            client,
            wait_policy: config.wait_policy,
            timeout: Duration::from_secs(config.page_timeout_seconds),
        })
    }
}

#[async_trait]
impl PageRenderer for HttpPageRenderer {
    async fn render(&self, url: &str) -> Result<String, PageVisitError> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PageVisitError::Timeout {
                        url: url.to_string(),
                    }
                } else {
                    PageVisitError::Navigation {
                        url: url.to_string(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let html = response.text().await.map_err(|e| PageVisitError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        htmd::HtmlToMarkdown::builder()
            .skip_tags(vec!["script", "style"])
            .build()
            .convert(&html)
            .map_err(|e| PageVisitError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    fn wait_policy(&self) -> WaitPolicy {
        self.wait_policy
    }
}
