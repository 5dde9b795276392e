//! 互联网搜索连接器 - 搜索、抽链、去重、逐页访问

pub mod backend;
pub mod page;

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use regex::Regex;

use crate::config::SearchConfig;
use crate::types::PageResult;

pub use backend::{DuckDuckGoSearch, SearchBackend};
pub use page::{HttpPageRenderer, PageRenderer, PageVisitError};

/// 百科式扩展搜索追加的固定后缀
const ENCYCLOPEDIA_SUFFIX: &str = " Wikipedia ";

/// 互联网搜索连接器。执行文本搜索，抽取结果中的markdown链接，
/// 去重后逐个访问；单个链接的访问失败只会静默丢弃该链接，
/// 不会让整次调用失败。输出顺序不保证跨运行稳定。
pub struct InternetSearch {
    backend: Arc<dyn SearchBackend>,
    renderer: Arc<dyn PageRenderer>,
    broaden_encyclopedia: bool,
    verbose: bool,
}

impl InternetSearch {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        renderer: Arc<dyn PageRenderer>,
        config: &SearchConfig,
        verbose: bool,
    ) -> Self {
        Self {
            backend,
            renderer,
            broaden_encyclopedia: config.broaden_encyclopedia,
            verbose,
        }
    }

    /// 搜索并访问每个去重后的结果链接
    pub async fn search(&self, query: &str) -> Result<Vec<PageResult>> {
        let mut raw_results = self.backend.search_raw(query).await?;
        if self.broaden_encyclopedia {
            // 先合并两次搜索的原始结果，再统一去重
            let broadened = self
                .backend
                .search_raw(&format!("{}{}", query, ENCYCLOPEDIA_SUFFIX))
                .await?;
            raw_results.push('\n');
            raw_results.push_str(&broadened);
        }

        let links = extract_markdown_links(&raw_results);
        if self.verbose {
            println!(
                "   🌐 搜索到{}个唯一链接，等待策略: {:?}",
                links.len(),
                self.renderer.wait_policy()
            );
        }

        let mut out = Vec::new();
        let mut seen_urls = HashSet::new();
        for link in links {
            let Some(url) = extract_url(&link) else {
                continue;
            };
            // 不同标题指向同一URL时也只访问一次
            if !seen_urls.insert(url.clone()) {
                continue;
            }
            match self.renderer.render(&url).await {
                Ok(content) => out.push(PageResult {
                    url,
                    source: link,
                    content,
                }),
                Err(e) => {
                    // 坏链接静默跳过，搜索必须优雅降级
                    if self.verbose {
                        eprintln!("   ⚠️ 跳过无法访问的页面: {}", e);
                    }
                    continue;
                }
            }
        }
        Ok(out)
    }
}

/// 抽取原始结果文本中的markdown链接，相同链接串只保留首次出现
pub(crate) fn extract_markdown_links(raw: &str) -> Vec<String> {
    let link_re = Regex::new(r"\[[^\]]+\]\(https://[^)]+\)").expect("link regex is valid");
    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for m in link_re.find_iter(raw) {
        let link = m.as_str().to_string();
        if seen.insert(link.clone()) {
            links.push(link);
        }
    }
    links
}

/// 从markdown链接中取出URL部分
pub(crate) fn extract_url(link: &str) -> Option<String> {
    let url_re = Regex::new(r"\((https://[^)]+)\)").expect("url regex is valid");
    url_re
        .captures(link)
        .map(|captures| captures[1].to_string())
}
