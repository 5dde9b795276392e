#[cfg(test)]
mod tests {
    use crate::retrieval::{
        DEFAULT_SEPARATORS, DocumentChunk, EmbeddingBackend, RecursiveSplitter, VectorIndex,
        group_by_source,
    };
    use anyhow::Result;
    use async_trait::async_trait;

    /// 确定性的向量化替身：以文本首字符的编码构造可区分的向量
    struct FakeEmbedder;

    #[async_trait]
    impl EmbeddingBackend for FakeEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    let lead = t.chars().next().map(|c| c as u32 as f64).unwrap_or(0.0);
                    vec![lead, 1.0]
                })
                .collect())
        }
    }

    #[test]
    fn test_split_short_text_is_single_chunk() {
        let splitter = RecursiveSplitter::new(100, 10, DEFAULT_SEPARATORS);
        let chunks = splitter.split("short text");
        assert_eq!(chunks, vec!["short text".to_string()]);
    }

    #[test]
    fn test_split_never_exceeds_chunk_size() {
        let splitter = RecursiveSplitter::new(64, 16, DEFAULT_SEPARATORS);
        // 混合段落、行、句子和长连续串的文本
        let text = "First paragraph with a few words.\n\nSecond paragraph. It has two sentences.\nA new line follows here\t with a tab.\n\n".to_string()
            + &"x".repeat(500)
            + " trailing words after the long run.";
        let chunks = splitter.split(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(
                chunk.chars().count() <= 64,
                "块超出chunk_size: {} chars",
                chunk.chars().count()
            );
        }
    }

    #[test]
    fn test_split_reconstructs_original_text() {
        let splitter = RecursiveSplitter::new(48, 12, DEFAULT_SEPARATORS);
        let text = "Alpha beta gamma delta.\n\nEpsilon zeta eta theta iota kappa lambda.\nMu nu xi omicron pi rho sigma tau upsilon phi chi psi omega.";
        let chars: Vec<char> = text.chars().collect();
        let ranges = splitter.split_ranges(&chars);

        // 区间首尾覆盖全文
        assert_eq!(ranges.first().unwrap().0, 0);
        assert_eq!(ranges.last().unwrap().1, chars.len());

        // 去掉每个块的重叠前缀后拼接应还原原文
        let mut reconstructed = String::new();
        let mut covered = 0usize;
        for (start, end) in ranges {
            assert!(start <= covered, "块之间出现空洞");
            reconstructed.extend(&chars[covered..end]);
            covered = end;
        }
        assert_eq!(reconstructed, text);
    }

    #[test]
    fn test_split_prefers_paragraph_separator() {
        let splitter = RecursiveSplitter::new(40, 0, DEFAULT_SEPARATORS);
        let text = "aaaa aaaa aaaa aaaa.\n\nbbbb bbbb bbbb bbbb.";
        let chunks = splitter.split(&text);
        // 段落分隔符优先，两段各成一块
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].starts_with("aaaa"));
        assert!(chunks[1].starts_with("bbbb"));
    }

    #[test]
    fn test_split_character_fallback_on_unbroken_run() {
        let splitter = RecursiveSplitter::new(32, 8, DEFAULT_SEPARATORS);
        let text = "y".repeat(100);
        let chunks = splitter.split(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 32);
        }
    }

    #[tokio::test]
    async fn test_vector_index_top_k_ranking() {
        let chunks = vec![
            DocumentChunk {
                content: "zebra facts".to_string(),
                source: "[A](https://a)".to_string(),
            },
            DocumentChunk {
                content: "apple facts".to_string(),
                source: "[B](https://b)".to_string(),
            },
            DocumentChunk {
                content: "apricot facts".to_string(),
                source: "[B](https://b)".to_string(),
            },
        ];
        let backend = FakeEmbedder;
        let index = VectorIndex::build(chunks, &backend).await.unwrap();
        assert_eq!(index.len(), 3);

        let ranked = index.top_k("a query", 2, &backend).await.unwrap();
        assert_eq!(ranked.len(), 2);
        // 首字符为'a'的两个片段与查询最接近，平分时保持入库顺序
        assert_eq!(ranked[0].content, "apple facts");
        assert_eq!(ranked[1].content, "apricot facts");
    }

    #[tokio::test]
    async fn test_vector_index_top_k_larger_than_index() {
        let chunks = vec![DocumentChunk {
            content: "only one".to_string(),
            source: "[A](https://a)".to_string(),
        }];
        let backend = FakeEmbedder;
        let index = VectorIndex::build(chunks, &backend).await.unwrap();
        let ranked = index.top_k("query", 10, &backend).await.unwrap();
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn test_group_by_source_orders_by_first_appearance() {
        let chunk_a1 = DocumentChunk {
            content: "a-first".to_string(),
            source: "[A](https://a)".to_string(),
        };
        let chunk_b = DocumentChunk {
            content: "b-first".to_string(),
            source: "[B](https://b)".to_string(),
        };
        let chunk_a2 = DocumentChunk {
            content: "a-second".to_string(),
            source: "[A](https://a)".to_string(),
        };
        let rendered = group_by_source(&[&chunk_a1, &chunk_b, &chunk_a2]);

        let pos_a = rendered.find("Source: [A](https://a)").unwrap();
        let pos_b = rendered.find("Source: [B](https://b)").unwrap();
        assert!(pos_a < pos_b, "来源顺序应为首次出现顺序");

        // 同一来源的段落保持排名顺序并连续编号
        assert!(rendered.contains("Passage 0: a-first"));
        assert!(rendered.contains("Passage 1: a-second"));
        assert!(rendered.contains("Passage 0: b-first"));
    }
}
