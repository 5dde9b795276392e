//! 智能体工具接口 - 封闭的能力集合，统一的调用面

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::Value;

/// 智能体可调用的能力。名称、描述和入参schema用于构建决策提示词；
/// 参数校验在调用之前完成，不在工具内部做。
///
/// 子智能体同样以工具的形态暴露给父智能体：这样的工具变体
/// 持有并驱动一台完整的子状态机直至结束，把结果收敛为一段文本。
/// 父子之间绝不共享轨迹或步数预算。
#[async_trait]
pub trait AgentTool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON Schema形式的入参描述
    fn input_schema(&self) -> Value;

    async fn invoke(&self, arguments: Value) -> Result<String>;
}

/// 按工具声明的schema校验入参
pub fn validate_arguments(schema: &Value, arguments: &Value) -> Result<()> {
    let validator = jsonschema::validator_for(schema)
        .map_err(|e| anyhow!("tool declares an invalid input schema: {}", e))?;
    validator
        .validate(arguments)
        .map_err(|e| anyhow!("arguments rejected by input schema: {}", e))?;
    Ok(())
}

/// 渲染工具清单，供决策提示词使用
pub fn render_tool_roster(tools: &[Box<dyn AgentTool>]) -> String {
    if tools.is_empty() {
        return String::from("(no tools available; you must answer directly)");
    }
    let mut out = String::new();
    for tool in tools {
        out.push_str(&format!(
            "- {}: {}\n  input schema: {}\n",
            tool.name(),
            tool.description(),
            tool.input_schema()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "question": { "type": "string" }
            },
            "required": ["question"],
            "additionalProperties": false
        })
    }

    #[test]
    fn test_validate_accepts_conforming_arguments() {
        let schema = question_schema();
        assert!(validate_arguments(&schema, &json!({"question": "what?"})).is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_required_field() {
        let schema = question_schema();
        assert!(validate_arguments(&schema, &json!({})).is_err());
    }

    #[test]
    fn test_validate_rejects_wrong_type() {
        let schema = question_schema();
        assert!(validate_arguments(&schema, &json!({"question": 7})).is_err());
    }
}
