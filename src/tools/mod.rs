//! 工具集 - 模态问答工具与搜索类工具

pub mod files;
pub mod page_retriever;
pub mod search_assistant;
pub mod web_rag;
pub mod web_search;
pub mod youtube;

pub use files::FileQa;
pub use page_retriever::WebPageRetrieverTool;
pub use search_assistant::SearchAssistantTool;
pub use web_rag::WebRagTool;
pub use web_search::WebSearchTool;
pub use youtube::{VideoDownloader, YouTubeQaTool, YtDlpDownloader};
