use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Value, json};

use deepquest_rs::agent::{
    AcceptanceCheck, AgentBrain, AgentDecision, AgentLoop, AgentLoopConfig, AgentTool, LoopState,
};
use deepquest_rs::config::Config;
use deepquest_rs::solver::{SolverContext, assemble_orchestrator};
use deepquest_rs::types::Task;
use deepquest_rs::verify::{Judge, VerificationGate};

/// 按脚本行动的推理大脑
struct ScriptedBrain {
    decisions: Mutex<VecDeque<AgentDecision>>,
}

impl ScriptedBrain {
    fn new(decisions: Vec<AgentDecision>) -> Arc<Self> {
        Arc::new(Self {
            decisions: Mutex::new(decisions.into()),
        })
    }
}

#[async_trait]
impl AgentBrain for ScriptedBrain {
    async fn decide(&self, _system: &str, _user: &str) -> Result<AgentDecision> {
        self.decisions
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("script exhausted"))
    }

    async fn generate(&self, _system: &str, _user: &str) -> Result<String> {
        Ok("plan: search, then answer".to_string())
    }
}

/// 模拟搜索助理的工具：固定返回一个页面的调研结论
struct CannedSearchAssistant;

#[async_trait]
impl AgentTool for CannedSearchAssistant {
    fn name(&self) -> &str {
        "WebSearchAssistant"
    }

    fn description(&self) -> &str {
        "Finds information on the internet."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "assignment": { "type": "string" } },
            "required": ["assignment"]
        })
    }

    async fn invoke(&self, _arguments: Value) -> Result<String> {
        Ok("According to [Example](https://example.com/page), the treaty was signed in 1920."
            .to_string())
    }
}

/// 回复序列可脚本化的裁判
struct ScriptedJudge {
    responses: Mutex<VecDeque<String>>,
}

impl ScriptedJudge {
    fn new(responses: Vec<&str>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().map(String::from).collect()),
        })
    }
}

#[async_trait]
impl Judge for ScriptedJudge {
    async fn judge(&self, _prompt: &str) -> Result<String> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("judge script exhausted"))
    }
}

fn tool_call(assignment: &str) -> AgentDecision {
    AgentDecision::ToolCall {
        thought: "need to research".to_string(),
        tool: "WebSearchAssistant".to_string(),
        arguments: json!({ "assignment": assignment }),
    }
}

fn final_answer(answer: &str) -> AgentDecision {
    AgentDecision::FinalAnswer {
        thought: "I have enough information".to_string(),
        answer: answer.to_string(),
    }
}

fn orchestrator_with(
    decisions: Vec<AgentDecision>,
    judge: Arc<ScriptedJudge>,
    max_steps: usize,
) -> AgentLoop {
    let gate = VerificationGate::new(judge, false);
    let checks: Vec<Box<dyn AcceptanceCheck>> = vec![Box::new(gate)];
    AgentLoop::new(
        "orchestrator",
        "You are an expert problem-solving agent.",
        ScriptedBrain::new(decisions),
        vec![Box::new(CannedSearchAssistant)],
        checks,
        AgentLoopConfig {
            max_steps,
            planning_interval: None,
        },
        false,
    )
}

/// 场景A：无附件任务，一次搜索一次作答，裁判一次通过，两步收束
#[tokio::test]
async fn test_scenario_a_first_attempt_accepted_within_two_steps() {
    let judge = ScriptedJudge::new(vec!["The answer is consistent with the trace. Correct."]);
    let agent = orchestrator_with(
        vec![tool_call("when was the treaty signed"), final_answer("1920")],
        judge,
        15,
    );

    let outcome = agent
        .run("Find the answer to the following question: when was the treaty signed?")
        .await
        .unwrap();

    assert_eq!(outcome.state, LoopState::Succeeded);
    assert_eq!(outcome.answer, "1920");
    assert!(outcome.steps_used <= 2);
    assert_eq!(outcome.finalize_attempts, 1);
}

/// 场景B：图片任务的工具集 = ImageQA + 搜索助理，不含音视频工具
#[test]
fn test_scenario_b_image_task_gets_exactly_image_tools() {
    let ctx = SolverContext::new(Config::default()).unwrap();
    let task = Task {
        description: "What is pictured?".to_string(),
        task_id: "t-img".to_string(),
        filepath: Some(PathBuf::from("photo.png")),
    };

    let (agent, base_prompt) = assemble_orchestrator(&ctx, &task).unwrap();
    let names = agent.tool_names();

    assert!(names.contains(&"ImageQA"));
    assert!(names.contains(&"WebSearchAssistant"));
    assert!(!names.contains(&"AudioQA"));
    assert!(!names.contains(&"VideoQA"));
    assert_eq!(names.len(), 2);
    assert!(base_prompt.contains("You can use the provided image."));
}

/// 无附件任务只有搜索助理一件工具
#[test]
fn test_nofile_task_gets_only_search_assistant() {
    let ctx = SolverContext::new(Config::default()).unwrap();
    let task = Task {
        description: "Who wrote it?".to_string(),
        task_id: "t-nofile".to_string(),
        filepath: None,
    };

    let (agent, _) = assemble_orchestrator(&ctx, &task).unwrap();
    assert_eq!(agent.tool_names(), vec!["WebSearchAssistant"]);
}

/// 音频任务的工具集 = AudioQA + 搜索助理
#[test]
fn test_audio_task_gets_audio_tool() {
    let ctx = SolverContext::new(Config::default()).unwrap();
    let task = Task {
        description: "What is said in the recording?".to_string(),
        task_id: "t-audio".to_string(),
        filepath: Some(PathBuf::from("speech.mp3")),
    };

    let (agent, _) = assemble_orchestrator(&ctx, &task).unwrap();
    let names = agent.tool_names();
    assert!(names.contains(&"AudioQA"));
    assert!(!names.contains(&"ImageQA"));
}

/// 未知扩展名在装配阶段就失败，不进入求解循环
#[test]
fn test_unknown_extension_aborts_assembly() {
    let ctx = SolverContext::new(Config::default()).unwrap();
    let task = Task {
        description: "What is in the archive?".to_string(),
        task_id: "t-bad".to_string(),
        filepath: Some(PathBuf::from("bundle.tar.gz")),
    };

    assert!(assemble_orchestrator(&ctx, &task).is_err());
}

/// 场景C：第一次作答被裁判打回，第二次通过，返回第二次的答案
#[tokio::test]
async fn test_scenario_c_second_attempt_wins_after_rejection() {
    let judge = ScriptedJudge::new(vec![
        "The agent misread the year. [WRONG] The trace says 1920, not 1921.",
        "Now the answer matches the trace. Correct.",
    ]);
    let agent = orchestrator_with(
        vec![
            tool_call("when was the treaty signed"),
            final_answer("1921"),
            final_answer("1920"),
        ],
        judge,
        15,
    );

    let outcome = agent.run("when was the treaty signed?").await.unwrap();

    assert_eq!(outcome.state, LoopState::Succeeded);
    // 两次finalizing转换，采纳第二次的答案
    assert_eq!(outcome.finalize_attempts, 2);
    assert_eq!(outcome.answer, "1920");
}

/// 步数预算耗尽的智能体恰好在B步后停机
#[tokio::test]
async fn test_budget_b_terminates_in_b_steps() {
    let budget = 3;
    let judge = ScriptedJudge::new(vec![]);
    let decisions = (0..budget)
        .map(|i| tool_call(&format!("research angle {}", i)))
        .collect();
    let agent = orchestrator_with(decisions, judge, budget);

    let outcome = agent.run("an unanswerable question").await.unwrap();

    assert_eq!(outcome.state, LoopState::FailedExhausted);
    assert_eq!(outcome.steps_used, budget);
}
