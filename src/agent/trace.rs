//! 执行轨迹 - 每个智能体实例独占一份，父子智能体之间不共享

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// 简要轨迹中单步摘要的截断长度
const SUCCINCT_RESULT_LIMIT: usize = 2000;

/// 轨迹中的一步
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "kebab-case")]
pub enum AgentStep {
    /// 任务陈述，永远是轨迹的第一步，不会作为模型轮次重放
    Task { content: String },
    /// 规划输出
    Plan { content: String },
    /// 工具调用及其结果
    ToolCall {
        tool: String,
        arguments: Value,
        result: String,
    },
    /// 最终答案提案
    FinalProposal { answer: String },
    /// 观察（验收失败说明、工具失败信息等）
    Observation { content: String },
}

/// 有序的执行轨迹。归属于单个智能体实例的整个生命周期。
#[derive(Debug, Clone)]
pub struct Trace {
    steps: Vec<AgentStep>,
}

impl Trace {
    /// 以任务陈述开始一条新轨迹
    pub fn new(task: &str) -> Self {
        Self {
            steps: vec![AgentStep::Task {
                content: task.to_string(),
            }],
        }
    }

    pub fn push(&mut self, step: AgentStep) {
        self.steps.push(step);
    }

    /// 任务陈述
    pub fn task(&self) -> &str {
        match &self.steps[0] {
            AgentStep::Task { content } => content,
            _ => unreachable!("trace always starts with the task statement"),
        }
    }

    /// 任务陈述之后的所有步骤
    pub fn steps_after_task(&self) -> &[AgentStep] {
        &self.steps[1..]
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// 简要轨迹：任务 + 每步摘要。交给验收裁判和最终调用方。
    pub fn succinct(&self) -> Vec<Value> {
        let mut out = vec![json!({ "task": self.task() })];
        for step in self.steps_after_task() {
            out.push(match step {
                AgentStep::Task { content } => json!({ "task": content }),
                AgentStep::Plan { content } => json!({ "plan": truncate(content) }),
                AgentStep::ToolCall {
                    tool,
                    arguments,
                    result,
                } => json!({
                    "tool_call": tool,
                    "arguments": arguments,
                    "result": truncate(result),
                }),
                AgentStep::FinalProposal { answer } => {
                    json!({ "final_answer_proposal": answer })
                }
                AgentStep::Observation { content } => json!({ "observation": truncate(content) }),
            });
        }
        out
    }

    /// 渲染为决策提示词中的执行记录，不包含任务陈述本身
    pub fn render_transcript(&self) -> String {
        if self.steps_after_task().is_empty() {
            return String::from("(no steps taken yet)");
        }
        let mut out = String::new();
        for (i, step) in self.steps_after_task().iter().enumerate() {
            match step {
                AgentStep::Task { content } => {
                    out.push_str(&format!("Step {}: task: {}\n", i + 1, content));
                }
                AgentStep::Plan { content } => {
                    out.push_str(&format!("Step {}: plan:\n{}\n", i + 1, content));
                }
                AgentStep::ToolCall {
                    tool,
                    arguments,
                    result,
                } => {
                    out.push_str(&format!(
                        "Step {}: called tool '{}' with arguments {}\nResult: {}\n",
                        i + 1,
                        tool,
                        arguments,
                        result
                    ));
                }
                AgentStep::FinalProposal { answer } => {
                    out.push_str(&format!("Step {}: proposed final answer: {}\n", i + 1, answer));
                }
                AgentStep::Observation { content } => {
                    out.push_str(&format!("Step {}: observation: {}\n", i + 1, content));
                }
            }
        }
        out
    }
}

/// 字符安全的截断
fn truncate(text: &str) -> String {
    if text.chars().count() <= SUCCINCT_RESULT_LIMIT {
        return text.to_string();
    }
    let cut: String = text.chars().take(SUCCINCT_RESULT_LIMIT).collect();
    format!("{}...(truncated)", cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_starts_with_task() {
        let trace = Trace::new("What year was the treaty signed?");
        assert_eq!(trace.task(), "What year was the treaty signed?");
        assert!(trace.steps_after_task().is_empty());
    }

    #[test]
    fn test_succinct_separates_task_from_steps() {
        let mut trace = Trace::new("the task");
        trace.push(AgentStep::ToolCall {
            tool: "WebSearchAssistant".to_string(),
            arguments: serde_json::json!({"assignment": "find it"}),
            result: "found it".to_string(),
        });
        trace.push(AgentStep::FinalProposal {
            answer: "42".to_string(),
        });

        let succinct = trace.succinct();
        assert_eq!(succinct.len(), 3);
        assert_eq!(succinct[0]["task"], "the task");
        assert_eq!(succinct[1]["tool_call"], "WebSearchAssistant");
        assert_eq!(succinct[2]["final_answer_proposal"], "42");
    }

    #[test]
    fn test_transcript_excludes_task_statement() {
        let mut trace = Trace::new("a very unique task marker");
        trace.push(AgentStep::Observation {
            content: "something happened".to_string(),
        });
        let transcript = trace.render_transcript();
        assert!(!transcript.contains("a very unique task marker"));
        assert!(transcript.contains("something happened"));
    }

    #[test]
    fn test_succinct_truncates_long_results() {
        let mut trace = Trace::new("task");
        trace.push(AgentStep::Observation {
            content: "x".repeat(5000),
        });
        let succinct = trace.succinct();
        let rendered = succinct[1]["observation"].as_str().unwrap();
        assert!(rendered.len() < 5000);
        assert!(rendered.ends_with("...(truncated)"));
    }
}
