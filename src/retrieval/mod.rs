//! 检索管线 - 切块、向量化、相似度检索与按来源分组

mod index;
mod splitter;

pub use index::{DocumentChunk, EmbeddingBackend, VectorIndex};
pub use splitter::{DEFAULT_SEPARATORS, RecursiveSplitter};

/// 将排序后的检索结果按来源分组渲染为多段落文本块。
/// 来源顺序为其在排名中首次出现的顺序，来源内部保持排名顺序。
/// 下游智能体读取的就是这份分组文本，而不是裸的排名列表。
pub fn group_by_source(ranked: &[&DocumentChunk]) -> String {
    let mut grouped: Vec<(&str, Vec<&str>)> = Vec::new();
    for chunk in ranked {
        match grouped.iter_mut().find(|(source, _)| *source == chunk.source) {
            Some((_, passages)) => passages.push(&chunk.content),
            None => grouped.push((&chunk.source, vec![&chunk.content])),
        }
    }

    let mut context = String::new();
    for (source, passages) in grouped {
        context.push_str(&format!("Source: {}\n", source));
        for (i, passage) in passages.iter().enumerate() {
            context.push_str(&format!("Passage {}: {}\n", i, passage));
        }
        context.push('\n');
    }
    context
}

// Include tests
#[cfg(test)]
mod tests;
