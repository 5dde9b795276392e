//! 文本搜索边界 - 返回含内嵌链接的原始结果文本

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;

/// 搜索边界。返回原始结果文本，链接抽取由连接器负责。
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search_raw(&self, query: &str) -> Result<String>;
}

/// DuckDuckGo HTML端点搜索。结果渲染为每行一个markdown链接的文本。
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    max_results: usize,
}

impl DuckDuckGoSearch {
    pub fn new(max_results: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (compatible; deepquest-rs)")
            .build()?;
        Ok(Self {
            client,
            max_results,
        })
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoSearch {
    async fn search_raw(&self, query: &str) -> Result<String> {
        let response = self
            .client
            .get("https://html.duckduckgo.com/html/")
            .query(&[("q", query)])
            .send()
            .await
            .context("web search request failed")?;
        let html = response.text().await.context("web search response unreadable")?;

        let results = extract_results(&html, self.max_results);
        Ok(results
            .into_iter()
            .map(|(title, url)| format!("[{}]({})", title, url))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// 从DuckDuckGo结果页抽取 (标题, 目标URL) 对
pub(crate) fn extract_results(html: &str, max_results: usize) -> Vec<(String, String)> {
    let anchor_re =
        Regex::new(r#"(?s)<a[^>]*class="result__a"[^>]*href="([^"]+)"[^>]*>(.*?)</a>"#)
            .expect("anchor regex is valid");
    let tag_re = Regex::new(r"<[^>]+>").expect("tag regex is valid");

    let mut results = Vec::new();
    for captures in anchor_re.captures_iter(html) {
        if results.len() >= max_results {
            break;
        }
        let href = &captures[1];
        let Some(url) = resolve_redirect_url(href) else {
            continue;
        };
        if !url.starts_with("https://") {
            continue;
        }
        let title = tag_re.replace_all(&captures[2], "").trim().to_string();
        if title.is_empty() {
            continue;
        }
        results.push((title, url));
    }
    results
}

/// DuckDuckGo的结果链接经过跳转页包装，目标URL在uddg参数里
fn resolve_redirect_url(href: &str) -> Option<String> {
    if let Some(pos) = href.find("uddg=") {
        let encoded = &href[pos + "uddg=".len()..];
        let encoded = encoded.split('&').next().unwrap_or(encoded);
        return Some(percent_decode(encoded));
    }
    Some(href.to_string())
}

fn percent_decode(encoded: &str) -> String {
    let bytes = encoded.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            if let Ok(byte) = u8::from_str_radix(&encoded[i + 1..i + 3], 16) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <div class="result">
            <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fpage&amp;rut=abc">Example <b>Title</b></a>
        </div>
        <div class="result">
            <a rel="nofollow" class="result__a" href="https://plain.example.org/doc">Plain Result</a>
        </div>
        <div class="result">
            <a rel="nofollow" class="result__a" href="http://insecure.example.org">Insecure Result</a>
        </div>
    "#;

    #[test]
    fn test_extract_results_decodes_redirect_and_strips_tags() {
        let results = extract_results(SAMPLE, 10);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "Example Title");
        assert_eq!(results[0].1, "https://example.com/page");
        assert_eq!(results[1].1, "https://plain.example.org/doc");
    }

    #[test]
    fn test_extract_results_honors_max_results() {
        let results = extract_results(SAMPLE, 1);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(
            percent_decode("https%3A%2F%2Fexample.com%2Fa%20b"),
            "https://example.com/a b"
        );
        assert_eq!(percent_decode("nothing-encoded"), "nothing-encoded");
    }
}
