//! 递归字符切分器

/// 默认的分隔符优先级：段落、行、制表、句、空格、字符兜底
pub const DEFAULT_SEPARATORS: &[&str] = &["\n\n", "\n", "\t", ".", " ", ""];

/// 递归字符切分器。按优先级尝试分隔符，只有当候选片段仍然超过
/// chunk_size时才降级到更细的分隔单元；相邻块之间重叠chunk_overlap
/// 个字符以保留切分边界处的上下文。
///
/// 所有块都是输入文本的精确字符子串：去掉每个块的重叠前缀后按序
/// 拼接即可还原原文。
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveSplitter {
    /// 构造切分器。chunk_overlap必须小于chunk_size（配置层已校验）。
    pub fn new(chunk_size: usize, chunk_overlap: usize, separators: &[&str]) -> Self {
        debug_assert!(chunk_overlap < chunk_size);
        Self {
            chunk_size,
            chunk_overlap,
            separators: separators.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// 切分文本，返回块序列
    pub fn split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        self.split_ranges(&chars)
            .into_iter()
            .map(|(start, end)| chars[start..end].iter().collect())
            .collect()
    }

    /// 切分文本并返回字符区间（已应用重叠扩展）。
    /// 区间满足：首个区间从0开始，最后一个区间到文本末尾结束，
    /// 且每个后续区间的起点向前回退了min(chunk_overlap, 基准起点)个字符。
    pub(crate) fn split_ranges(&self, chars: &[char]) -> Vec<(usize, usize)> {
        if chars.is_empty() {
            return Vec::new();
        }

        // 基准片段不超过chunk_size - chunk_overlap，
        // 叠加重叠前缀后块长不超过chunk_size
        let mut base_ranges = Vec::new();
        self.segment(chars, 0, chars.len(), 0, &mut base_ranges);

        base_ranges
            .into_iter()
            .enumerate()
            .map(|(i, (start, end))| {
                let extension = if i == 0 {
                    0
                } else {
                    self.chunk_overlap.min(start)
                };
                (start - extension, end)
            })
            .collect()
    }

    fn base_size(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }

    /// 递归切分[start, end)区间，结果追加到out
    fn segment(
        &self,
        chars: &[char],
        start: usize,
        end: usize,
        sep_idx: usize,
        out: &mut Vec<(usize, usize)>,
    ) {
        let base = self.base_size();
        if end - start <= base {
            out.push((start, end));
            return;
        }
        if sep_idx >= self.separators.len() {
            // 分隔符用尽，按原样保留（正常配置下最后一级是字符兜底，不会走到这里）
            out.push((start, end));
            return;
        }

        let separator = &self.separators[sep_idx];
        if separator.is_empty() {
            // 字符级兜底：按固定长度硬切
            let mut cursor = start;
            while cursor < end {
                let piece_end = (cursor + base).min(end);
                out.push((cursor, piece_end));
                cursor = piece_end;
            }
            return;
        }

        let pieces = split_keeping_separator(chars, start, end, separator);
        if pieces.len() <= 1 {
            // 当前分隔符在区间内不出现，降级到更细的分隔单元
            self.segment(chars, start, end, sep_idx + 1, out);
            return;
        }

        // 贪心合并相邻片段到不超过基准大小；仍然超长的单片递归降级
        let mut pending: Option<(usize, usize)> = None;
        for (piece_start, piece_end) in pieces {
            if piece_end - piece_start > base {
                if let Some(range) = pending.take() {
                    out.push(range);
                }
                self.segment(chars, piece_start, piece_end, sep_idx + 1, out);
                continue;
            }
            match pending {
                None => pending = Some((piece_start, piece_end)),
                Some((merged_start, _)) => {
                    if piece_end - merged_start <= base {
                        pending = Some((merged_start, piece_end));
                    } else {
                        out.push(pending.take().unwrap());
                        pending = Some((piece_start, piece_end));
                    }
                }
            }
        }
        if let Some(range) = pending {
            out.push(range);
        }
    }
}

/// 在[start, end)内按分隔符切片，分隔符附着在前一片的末尾，
/// 因而所有片段拼接仍等于原区间
fn split_keeping_separator(
    chars: &[char],
    start: usize,
    end: usize,
    separator: &str,
) -> Vec<(usize, usize)> {
    let sep_chars: Vec<char> = separator.chars().collect();
    let sep_len = sep_chars.len();
    let mut pieces = Vec::new();
    let mut piece_start = start;
    let mut cursor = start;

    while cursor + sep_len <= end {
        if chars[cursor..cursor + sep_len] == sep_chars[..] {
            pieces.push((piece_start, cursor + sep_len));
            cursor += sep_len;
            piece_start = cursor;
        } else {
            cursor += 1;
        }
    }
    if piece_start < end {
        pieces.push((piece_start, end));
    }
    pieces
}
