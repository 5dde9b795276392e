//! 智能体循环 - 三层智能体共用的同一台Plan→Act→Observe状态机

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::agent::decision::{AgentBrain, AgentDecision};
use crate::agent::tool::{AgentTool, render_tool_roster, validate_arguments};
use crate::agent::trace::{AgentStep, Trace};
use crate::prompts;
use crate::verify::Verdict;

/// 步数预算耗尽且没有任何答案提案时返回的信号文本
pub const NO_ANSWER_FOUND: &str = "No answer found.";

/// 最终答案的验收检查。全部通过才算成功；
/// 任何一项拒绝都会作为观察折返进循环，而不是异常上抛。
#[async_trait]
pub trait AcceptanceCheck: Send + Sync {
    fn name(&self) -> &str;

    async fn check(&self, final_answer: &str, trace: &Trace) -> Result<Verdict>;
}

/// 循环状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoopState {
    Running,
    AwaitingToolResult,
    Finalizing,
    Succeeded,
    FailedExhausted,
}

/// 循环配置
#[derive(Debug, Clone)]
pub struct AgentLoopConfig {
    /// 步数预算
    pub max_steps: usize,
    /// 重规划间隔。None表示纯反应式，不做周期规划。
    pub planning_interval: Option<usize>,
}

/// 一次运行的产出
#[derive(Debug)]
pub struct AgentRunOutcome {
    /// 最终答案。预算耗尽时是最后一次提案，或NO_ANSWER_FOUND。
    pub answer: String,
    /// 终态，Succeeded或FailedExhausted
    pub state: LoopState,
    /// 消耗的步数
    pub steps_used: usize,
    /// 进入finalizing的次数
    pub finalize_attempts: usize,
    /// 本实例独占的完整轨迹
    pub trace: Trace,
}

/// 智能体循环。每个实例有自己的步数预算、工具集与轨迹；
/// 父智能体调用子智能体时只见到一次同步工具调用和一段文本结果。
pub struct AgentLoop {
    name: String,
    system_prompt: String,
    brain: Arc<dyn AgentBrain>,
    tools: Vec<Box<dyn AgentTool>>,
    checks: Vec<Box<dyn AcceptanceCheck>>,
    config: AgentLoopConfig,
    verbose: bool,
}

impl AgentLoop {
    pub fn new(
        name: &str,
        system_prompt: &str,
        brain: Arc<dyn AgentBrain>,
        tools: Vec<Box<dyn AgentTool>>,
        checks: Vec<Box<dyn AcceptanceCheck>>,
        config: AgentLoopConfig,
        verbose: bool,
    ) -> Self {
        Self {
            name: name.to_string(),
            system_prompt: system_prompt.to_string(),
            brain,
            tools,
            checks,
            config,
            verbose,
        }
    }

    /// 工具名称清单（按注册顺序）
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// 运行循环直至成功或预算耗尽
    pub async fn run(&self, task: &str) -> Result<AgentRunOutcome> {
        let mut trace = Trace::new(task);
        let mut state = LoopState::Running;
        let mut last_proposal: Option<String> = None;
        let mut finalize_attempts = 0usize;
        let mut steps_used = 0usize;

        for step_index in 1..=self.config.max_steps {
            steps_used = step_index;
            self.transition(&mut state, LoopState::Running);

            // 到达规划间隔时，先基于累积轨迹从头重新规划
            if let Some(interval) = self.config.planning_interval
                && (step_index - 1) % interval == 0
            {
                self.replan(&mut trace, step_index).await;
            }

            let decision = match self
                .brain
                .decide(&self.decision_system_prompt(), &self.decision_user_prompt(&trace))
                .await
            {
                Ok(decision) => decision,
                Err(e) => {
                    // 决策生成失败同样消耗一步，作为观察折返
                    trace.push(AgentStep::Observation {
                        content: format!("Model decision failed: {}", e),
                    });
                    continue;
                }
            };

            match decision {
                AgentDecision::ToolCall {
                    thought,
                    tool,
                    arguments,
                } => {
                    self.transition(&mut state, LoopState::AwaitingToolResult);
                    if self.verbose {
                        println!("   🤔 [{}] {}", self.name, thought);
                        println!("   🔧 [{}] calling {}...", self.name, tool);
                    }
                    // 工具同步执行，失败信息也是一种观察
                    let result = match self.invoke_tool(&tool, &arguments).await {
                        Ok(result) => result,
                        Err(e) => format!("Tool call failed: {}", e),
                    };
                    trace.push(AgentStep::ToolCall {
                        tool,
                        arguments,
                        result,
                    });
                }
                AgentDecision::FinalAnswer { thought, answer } => {
                    self.transition(&mut state, LoopState::Finalizing);
                    finalize_attempts += 1;
                    if self.verbose {
                        println!("   🤔 [{}] {}", self.name, thought);
                        println!("   🏁 [{}] proposing final answer...", self.name);
                    }
                    trace.push(AgentStep::FinalProposal {
                        answer: answer.clone(),
                    });
                    last_proposal = Some(answer.clone());

                    match self.run_acceptance_checks(&answer, &trace).await {
                        None => {
                            self.transition(&mut state, LoopState::Succeeded);
                            if self.verbose {
                                println!("✅ [{}] 在第{}步完成", self.name, step_index);
                            }
                            return Ok(AgentRunOutcome {
                                answer,
                                state,
                                steps_used,
                                finalize_attempts,
                                trace,
                            });
                        }
                        Some(explanation) => {
                            // 拒绝说明折返为观察，循环回到running再试，消耗一步
                            trace.push(AgentStep::Observation {
                                content: explanation,
                            });
                        }
                    }
                }
            }
        }

        // 预算耗尽：尽力返回最后的提案
        self.transition(&mut state, LoopState::FailedExhausted);
        if self.verbose {
            println!(
                "⚠️ [{}] 步数预算({})耗尽，返回目前最好的答案",
                self.name, self.config.max_steps
            );
        }
        Ok(AgentRunOutcome {
            answer: last_proposal.unwrap_or_else(|| NO_ANSWER_FOUND.to_string()),
            state,
            steps_used,
            finalize_attempts,
            trace,
        })
    }

    /// 状态迁移。verbose模式下打印迁移轨迹。
    fn transition(&self, state: &mut LoopState, to: LoopState) {
        if self.verbose && *state != to {
            println!("   ↪ [{}] {:?} -> {:?}", self.name, *state, to);
        }
        *state = to;
    }

    /// 运行全部验收检查。返回None表示全部通过，
    /// 否则返回首个失败的说明文本。检查自身报错同样算失败。
    async fn run_acceptance_checks(&self, answer: &str, trace: &Trace) -> Option<String> {
        for check in &self.checks {
            match check.check(answer, trace).await {
                Ok(Verdict::Accepted { commentary }) => {
                    if self.verbose {
                        println!("   ✔️ check '{}' passed: {}", check.name(), commentary);
                    }
                }
                Ok(Verdict::Rejected { explanation }) => return Some(explanation),
                Err(e) => {
                    return Some(format!("Acceptance check '{}' failed: {}", check.name(), e));
                }
            }
        }
        None
    }

    /// 周期性重规划。规划失败不致命，跳过本次规划继续执行。
    async fn replan(&self, trace: &mut Trace, step_index: usize) {
        let instruction = if step_index == 1 {
            prompts::INITIAL_PLANNING
        } else {
            prompts::UPDATE_PLANNING
        };
        let prompt = format!(
            "{}\n\nTask:\n{}\n\nExecution trace so far:\n{}",
            instruction,
            trace.task(),
            trace.render_transcript()
        );
        match self.brain.generate(&self.system_prompt, &prompt).await {
            Ok(plan) => {
                if self.verbose {
                    println!("   📋 [{}] plan updated", self.name);
                }
                trace.push(AgentStep::Plan { content: plan });
            }
            Err(e) => {
                if self.verbose {
                    eprintln!("   ⚠️ [{}] 规划失败，继续执行: {}", self.name, e);
                }
            }
        }
    }

    fn decision_system_prompt(&self) -> String {
        format!(
            "{}\n\nAvailable tools:\n{}\nAt each step choose exactly one action: call one of the \
available tools with arguments matching its input schema, or give the final answer.",
            self.system_prompt,
            render_tool_roster(&self.tools)
        )
    }

    fn decision_user_prompt(&self, trace: &Trace) -> String {
        format!(
            "Task:\n{}\n\nExecution trace so far:\n{}\nDecide your next action.",
            trace.task(),
            trace.render_transcript()
        )
    }

    /// 查找、校验并调用工具
    async fn invoke_tool(&self, tool_name: &str, arguments: &serde_json::Value) -> Result<String> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name() == tool_name)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "unknown tool '{}'; available tools: {}",
                    tool_name,
                    self.tool_names().join(", ")
                )
            })?;
        validate_arguments(&tool.input_schema(), arguments)?;
        tool.invoke(arguments.clone()).await
    }
}
