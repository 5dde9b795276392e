//! 智能体核心 - 决策、工具、轨迹与循环状态机

pub mod decision;
pub mod executor;
pub mod tool;
pub mod trace;

pub use decision::{AgentBrain, AgentDecision};
pub use executor::{
    AcceptanceCheck, AgentLoop, AgentLoopConfig, AgentRunOutcome, LoopState, NO_ANSWER_FOUND,
};
pub use tool::{AgentTool, validate_arguments};
pub use trace::{AgentStep, Trace};
