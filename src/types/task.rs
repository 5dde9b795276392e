use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// 不认识的附件扩展名。分类失败属于致命错误，调用方不应重试，
/// 只放弃当前任务。
#[derive(Debug, thiserror::Error)]
#[error("Unknown file type: {filename}")]
pub struct UnsupportedFileType {
    pub filename: String,
}

/// 任务附件的模态类型，由文件扩展名唯一确定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Image,
    Textfile,
    Video,
    Audio,
    Nofile,
}

/// 扩展名到模态的枚举映射表。新增扩展名只需在对应表中追加一项。
const TEXTFILE_EXTENSIONS: &[&str] = &[".csv", ".txt", ".py", ".xlsx"];
const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".png", ".jpeg"];
const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".avi", ".mov"];
const AUDIO_EXTENSIONS: &[&str] = &[".mp3", ".wav"];

impl Modality {
    /// 根据文件路径判定模态。无附件 → Nofile。
    /// 扩展名区分大小写，不在四张映射表中的扩展名直接判定失败。
    pub fn classify(filepath: Option<&Path>) -> Result<Self, UnsupportedFileType> {
        let Some(path) = filepath else {
            return Ok(Modality::Nofile);
        };

        let filename = path.to_string_lossy();
        let extension = match filename.rfind('.') {
            Some(pos) => &filename[pos..],
            None => "",
        };

        let tables: &[(&[&str], Modality)] = &[
            (TEXTFILE_EXTENSIONS, Modality::Textfile),
            (IMAGE_EXTENSIONS, Modality::Image),
            (VIDEO_EXTENSIONS, Modality::Video),
            (AUDIO_EXTENSIONS, Modality::Audio),
        ];
        for (extensions, modality) in tables {
            if extensions.contains(&extension) {
                return Ok(*modality);
            }
        }

        Err(UnsupportedFileType {
            filename: filename.to_string(),
        })
    }
}

impl std::fmt::Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Modality::Image => write!(f, "image"),
            Modality::Textfile => write!(f, "textfile"),
            Modality::Video => write!(f, "video"),
            Modality::Audio => write!(f, "audio"),
            Modality::Nofile => write!(f, "nofile"),
        }
    }
}

/// 一条待求解的任务。构造后不可变。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// 任务描述（问题原文）
    pub description: String,
    /// 任务标识，来自任务源，内容不透明
    pub task_id: String,
    /// 附件在本地的路径，无附件时为None
    pub filepath: Option<PathBuf>,
}

impl Task {
    /// 任务模态，是filepath的纯函数
    pub fn modality(&self) -> Result<Modality, UnsupportedFileType> {
        Modality::classify(self.filepath.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_nofile() {
        assert_eq!(Modality::classify(None).unwrap(), Modality::Nofile);
    }

    #[test]
    fn test_classify_all_declared_extensions() {
        let cases = [
            ("data.csv", Modality::Textfile),
            ("notes.txt", Modality::Textfile),
            ("script.py", Modality::Textfile),
            ("sheet.xlsx", Modality::Textfile),
            ("photo.jpg", Modality::Image),
            ("photo.jpeg", Modality::Image),
            ("chart.png", Modality::Image),
            ("clip.mp4", Modality::Video),
            ("clip.avi", Modality::Video),
            ("clip.mov", Modality::Video),
            ("speech.mp3", Modality::Audio),
            ("speech.wav", Modality::Audio),
        ];
        for (filename, expected) in cases {
            let got = Modality::classify(Some(Path::new(filename))).unwrap();
            assert_eq!(got, expected, "文件 {} 的模态判定错误", filename);
        }
    }

    #[test]
    fn test_classify_unknown_extension_is_fatal() {
        let err = Modality::classify(Some(Path::new("archive.tar.gz"))).unwrap_err();
        assert!(err.to_string().contains("archive.tar.gz"));
        assert!(Modality::classify(Some(Path::new("noextension"))).is_err());
    }

    #[test]
    fn test_classify_is_case_sensitive() {
        // 大写扩展名不在映射表中
        assert!(Modality::classify(Some(Path::new("PHOTO.JPG"))).is_err());
    }

    #[test]
    fn test_task_modality_is_pure() {
        let task = Task {
            description: "What is shown in the image?".to_string(),
            task_id: "t-1".to_string(),
            filepath: Some(PathBuf::from("tmp/photo.png")),
        };
        assert_eq!(task.modality().unwrap(), Modality::Image);
        assert_eq!(task.modality().unwrap(), Modality::Image);
    }
}
