//! 运行驱动 - 全量任务遍历与单题模式

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;

use crate::api::TaskSource;
use crate::config::Config;
use crate::outlet::{AnswerRow, ResultSink};
use crate::solver::{SolverContext, solve_task};
use crate::types::Task;
use crate::utils::sanitize_answer;

/// 顺序求解任务源里的全部任务。严格一题一题来：
/// 上一题完整结束（含结果落盘）后才开始下一题。
/// 结果逐行追加，重启时跳过已有答案的任务。
pub async fn launch(config: &Config) -> Result<()> {
    let ctx = SolverContext::new(config.clone())?;
    ctx.llm_client.check_connection().await?;

    let source = TaskSource::new(config)?;
    let sink = ResultSink::new(config.results_path.clone());
    let answered = sink.answered_ids()?;

    let tasks = source.fetch_tasks().await?;
    println!(
        "📋 共{}个任务，其中{}个已有答案将被跳过",
        tasks.len(),
        tasks.iter().filter(|t| answered.contains(&t.task_id)).count()
    );

    for task in tasks {
        if answered.contains(&task.task_id) {
            continue;
        }
        println!("❓ Solving task: {}", task.description);

        let solved = match solve_task(&ctx, &task).await {
            Ok(solved) => solved,
            Err(e) => {
                // 单个任务失败只中止该任务，继续后面的任务
                eprintln!("❌ 任务 {} 求解失败: {}", task.task_id, e);
                continue;
            }
        };

        let submitted_answer = sanitize_answer(&solved.answer);
        println!("💡 Final answer: {}", submitted_answer);

        sink.append(&AnswerRow {
            task_id: task.task_id.clone(),
            submitted_answer,
            steps: serde_json::Value::Array(solved.succinct_steps),
            answered_at: Utc::now(),
        })?;
    }

    println!("✓ 全部任务处理完毕");
    Ok(())
}

/// 单题模式：直接求解一个问题，不访问任务源、不落盘
pub async fn solve_single(
    config: &Config,
    question: String,
    filepath: Option<PathBuf>,
) -> Result<()> {
    let ctx = SolverContext::new(config.clone())?;
    ctx.llm_client.check_connection().await?;

    let task = Task {
        description: question,
        task_id: String::from("adhoc"),
        filepath,
    };
    let solved = solve_task(&ctx, &task).await?;
    println!("💡 Final answer: {}", sanitize_answer(&solved.answer));
    Ok(())
}
