//! 结果出口边界 - 逐任务追加JSONL，支持断点续跑

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 一条提交记录
#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerRow {
    pub task_id: String,
    pub submitted_answer: String,
    /// 简要执行轨迹
    pub steps: Value,
    pub answered_at: DateTime<Utc>,
}

/// 结果出口。逐任务追加写入，部分完成的运行可以通过
/// 跳过已出现的task_id来续跑。
pub struct ResultSink {
    path: PathBuf,
}

impl ResultSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// 已提交过答案的任务id集合。文件不存在视作空集。
    pub fn answered_ids(&self) -> Result<HashSet<String>> {
        let file = match std::fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(e) => return Err(e).context(format!("failed to open {:?}", self.path)),
        };

        let mut ids = HashSet::new();
        for line in BufReader::new(file).lines() {
            let line = line.context("failed to read results file")?;
            if line.trim().is_empty() {
                continue;
            }
            let row: AnswerRow =
                serde_json::from_str(&line).context("corrupt row in results file")?;
            ids.insert(row.task_id);
        }
        Ok(ids)
    }

    /// 追加一条记录
    pub fn append(&self, row: &AnswerRow) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).context("failed to create results directory")?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .context(format!("failed to open {:?} for append", self.path))?;
        let line = serde_json::to_string(row)?;
        writeln!(file, "{}", line).context("failed to append result row")?;
        Ok(())
    }
}

// Include tests
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(task_id: &str) -> AnswerRow {
        AnswerRow {
            task_id: task_id.to_string(),
            submitted_answer: "42".to_string(),
            steps: json!([{ "task": "q" }]),
            answered_at: Utc::now(),
        }
    }

    #[test]
    fn test_missing_file_means_no_answered_ids() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ResultSink::new(dir.path().join("absent.jsonl"));
        assert!(sink.answered_ids().unwrap().is_empty());
    }

    #[test]
    fn test_append_then_resume() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ResultSink::new(dir.path().join("answers.jsonl"));

        sink.append(&row("t-1")).unwrap();
        sink.append(&row("t-2")).unwrap();

        let ids = sink.answered_ids().unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("t-1"));
        assert!(ids.contains("t-2"));

        // 再追加一条后仍然可读
        sink.append(&row("t-3")).unwrap();
        assert_eq!(sink.answered_ids().unwrap().len(), 3);
    }
}
