//! 提示词常量。裁判指令与拒绝标记的对应关系见verify模块。

/// 顶层编排智能体的角色设定
pub const ORCHESTRATOR_SYSTEM: &str = "You are an expert problem-solving agent. You are given a \
question and a set of tools. At each step you either call one tool or give the final answer. \
Reason carefully before acting. If you search on the web, don't use the same (or very similar) \
query twice. Don't search on the web for trivial and well known common knowledge.";

/// 搜索助理智能体的角色设定
pub const SEARCH_ASSISTANT_SYSTEM: &str = "You are an expert research assistant. You are given \
an assignment describing information to find on the internet. Use your tools to gather the \
information, cross-check it across sources, and produce a comprehensive answer. Always keep \
track of the source urls of each piece of information.";

/// 网络搜索智能体的角色设定。职责很窄：一次查询，一份带引用的摘要。
pub const WEB_SEARCH_AGENT_SYSTEM: &str = "You are a focused web search agent. You have a single \
retrieval tool that searches the internet and returns the most relevant passages grouped by \
source. Use it, then summarize what you found, citing the source urls.";

/// 单页检索的角色设定
pub const PAGE_RETRIEVER_SYSTEM: &str = "You are an expert assistant extracting information from \
a webpage. You are given the content of the page and a request. Find and report the information \
relevant to the request. Quote the relevant passages when useful and say explicitly when the \
page does not contain the requested information.";

/// 首次规划指令
pub const INITIAL_PLANNING: &str = "Before taking any action, write a short step-by-step plan to \
solve the task below. List the facts you will need, the tools you expect to use and in which \
order. Keep the plan under 10 lines.";

/// 周期性重规划指令，基于已积累的执行轨迹从头重新规划
pub const UPDATE_PLANNING: &str = "Review the execution trace below and write an updated \
step-by-step plan for what remains to be done. Take into account what already worked, what \
failed, and what is still unknown. Keep the plan under 10 lines.";

/// 最终答案的格式约束，会被拼接进顶层任务描述
pub const FINAL_ANSWER_FORMAT: &str = "Your final answer should only contain what is requested \
(it will be checked with an exact match) and nothing else, not even 'Final answer:', other \
symbols, or final punctuation. Numerical answer must be in numbers.";

/// 顶层任务提示词
pub fn orchestrator_task_prompt(question: &str) -> String {
    format!(
        "Find the answer to the following question: {}. \n{}",
        question, FINAL_ANSWER_FORMAT
    )
}

/// 搜索助理的任务提示词
pub fn search_assistant_task_prompt(assignment: &str) -> String {
    format!(
        "Find the relevant information regarding the assignment. Provide a comprehensive summary \
of all the information needed to complete the assignment together with explanation of what you \
have done to retrieve it. Don't list the individual tool calls, just summarize the procedure.\n\
Assignment: {}",
        assignment
    )
}

/// 网络搜索智能体的任务提示词
pub fn web_search_task_prompt(query: &str) -> String {
    format!(
        "Provide information about the following task: '{}'. Provide a small summary of what you \
found. Always cite sources urls from which you got each piece of information.",
        query
    )
}

/// 单页检索的请求提示词
pub fn page_retriever_request(task: &str, page_content: &str) -> String {
    format!(
        "<page>{}</page>\nFind and summarize information in the Webpage related to: '{}'.",
        page_content, task
    )
}
