//! 验收门 - 用裁判模型判定最终答案，产出显式的判定值

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::agent::executor::AcceptanceCheck;
use crate::agent::trace::Trace;
use crate::llm::client::LLMClient;

/// 裁判自由文本中的拒绝标记。
/// 这是裸子串匹配：修改该标记时必须同步修改下方的裁判指令，
/// 两者放在同一模块正是为了让改动互相可见。
pub const REJECTION_MARKER: &str = "[WRONG]";

/// 裁判指令。要求裁判在认定答案有缺陷时输出REJECTION_MARKER。
pub const VERIFIER_INSTRUCTION: &str = "You are a meticulous verifier. You are given a task, the \
final answer proposed by an AI agent, and the succinct trace of the agent's execution. Check \
whether the answer actually follows from the execution and satisfies the task, including its \
formatting requirements. Think it through step by step, then state your conclusion. If the \
answer is flawed, your response MUST contain the literal marker [WRONG] and explain the flaw. \
If the answer is correct, do NOT use that marker anywhere in your response.";

/// 验收判定。始终携带裁判的评语，从不退化为布尔值，
/// 这样评语才能被折返进智能体的轨迹。
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Accepted { commentary: String },
    Rejected { explanation: String },
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted { .. })
    }
}

/// 裁判边界：收一份提示词，回一段自由文本
#[async_trait]
pub trait Judge: Send + Sync {
    async fn judge(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
impl Judge for LLMClient {
    async fn judge(&self, prompt: &str) -> Result<String> {
        self.prompt_verifier(VERIFIER_INSTRUCTION, prompt).await
    }
}

/// 验收门。把任务、最终答案和简要轨迹交给裁判模型，
/// 扫描回复中的拒绝标记并给出判定。
pub struct VerificationGate {
    judge: Arc<dyn Judge>,
    verbose: bool,
}

impl VerificationGate {
    pub fn new(judge: Arc<dyn Judge>, verbose: bool) -> Self {
        Self { judge, verbose }
    }

    /// 判定最终答案。任务行从轨迹切片中剥离，单独拼进提示词。
    pub async fn verify(&self, final_answer: &str, trace: &Trace) -> Result<Verdict> {
        let succinct = trace.succinct();
        let task = trace.task();
        let steps = &succinct[1..];
        let prompt = format!(
            "Task:{}\nAI agent answer: {}\nExecution:{}.",
            task,
            final_answer,
            serde_json::to_string(steps)?
        );

        let response = self.judge.judge(&prompt).await?;
        if self.verbose {
            println!("   ⚖️ EVALUATION: {}", response);
        }

        if response.contains(REJECTION_MARKER) {
            Ok(Verdict::Rejected {
                explanation: format!(
                    "It seems you made a mistake. Results of the check: {}",
                    response
                ),
            })
        } else {
            Ok(Verdict::Accepted {
                commentary: response,
            })
        }
    }
}

#[async_trait]
impl AcceptanceCheck for VerificationGate {
    fn name(&self) -> &str {
        "verification-gate"
    }

    async fn check(&self, final_answer: &str, trace: &Trace) -> Result<Verdict> {
        self.verify(final_answer, trace).await
    }
}
