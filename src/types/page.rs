use serde::{Deserialize, Serialize};

/// 访问单个网页得到的结果。只在一次检索调用内存活。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    /// 页面地址
    pub url: String,
    /// 展示用的来源标签，形如markdown链接 `[标题](url)`
    pub source: String,
    /// 渲染后的页面正文（Markdown文本）
    pub content: String,
}
