//! 通用辅助函数

use std::path::Path;

use anyhow::{Context, Result};

/// 把任务附件读成用于提示词的纯文本。
/// 电子表格没有可直接内联的文本表示，读取失败会作为
/// 可恢复的失败信息出现在提示词里，由智能体另寻他路。
pub fn load_as_text(filepath: &Path) -> Result<String> {
    let extension = filepath
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    match extension {
        "txt" | "py" | "md" | "json" | "csv" => std::fs::read_to_string(filepath)
            .context(format!("failed to read file {:?}", filepath)),
        other => anyhow::bail!("File type .{} not supported for inline text loading", other),
    }
}

/// 提交前的答案整理：统一逗号后的空格
pub fn sanitize_answer(answer: &str) -> String {
    answer.replace(", ", ",").replace(",", ", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_sanitize_answer_normalizes_commas() {
        assert_eq!(sanitize_answer("a,b, c"), "a, b, c");
        assert_eq!(sanitize_answer("1,2,3"), "1, 2, 3");
        assert_eq!(sanitize_answer("no commas"), "no commas");
    }

    #[test]
    fn test_load_as_text_reads_supported_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "line one").unwrap();

        let content = load_as_text(&path).unwrap();
        assert!(content.contains("line one"));
    }

    #[test]
    fn test_load_as_text_rejects_spreadsheets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.xlsx");
        std::fs::write(&path, b"not really a spreadsheet").unwrap();

        let result = load_as_text(&path);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not supported"));
    }
}
