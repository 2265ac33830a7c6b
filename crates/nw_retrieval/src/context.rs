use nw_core::{ChatTurn, Role, ScoredArticle};

pub const NO_CONTEXT_NOTICE: &str = "(no relevant articles were retrieved)";

/// Render retrieved candidates into a context block, best match first.
/// Candidates arrive already sorted by descending similarity.
pub fn build_context(candidates: &[ScoredArticle]) -> String {
    candidates
        .iter()
        .map(|c| {
            format!(
                "Title: {}\nSource: {} ({})\nPublished: {}\n{}",
                c.article.title,
                c.article.source,
                c.article.category,
                c.article.published_at.format("%Y-%m-%d"),
                c.article.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

fn render_history(history: &[ChatTurn], turns: usize) -> String {
    let start = history.len().saturating_sub(turns);
    history[start..]
        .iter()
        .map(|t| {
            let role = match t.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            format!("{}: {}", role, t.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One instruction + context + history + question prompt, submitted to the
/// generation provider in a single call. With an empty context the model
/// is told to say so instead of improvising an answer.
pub fn build_prompt(
    query: &str,
    context: &str,
    history: &[ChatTurn],
    history_turns: usize,
) -> String {
    let context_block = if context.is_empty() {
        NO_CONTEXT_NOTICE
    } else {
        context
    };

    let history_block = render_history(history, history_turns);

    format!(
        "You are a news assistant. Answer using only the context articles below. \
If the context does not cover the question, state clearly that no relevant \
articles were found and do not invent facts.\n\n\
Context articles:\n{}\n\n\
Conversation so far:\n{}\n\n\
Question: {}\n\nAnswer:",
        context_block, history_block, query
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeSet;

    fn candidate(title: &str, score: f32) -> ScoredArticle {
        ScoredArticle {
            article: nw_core::Article {
                id: title.to_lowercase(),
                title: title.to_string(),
                content: format!("{} body", title),
                url: "http://test.com".to_string(),
                published_at: Utc::now(),
                source: "wire".to_string(),
                category: "world".to_string(),
                tags: BTreeSet::new(),
                word_count: 2,
            },
            score,
        }
    }

    #[test]
    fn context_preserves_candidate_order() {
        let context = build_context(&[candidate("First", 0.9), candidate("Second", 0.8)]);
        let first = context.find("Title: First").unwrap();
        let second = context.find("Title: Second").unwrap();
        assert!(first < second);
    }

    #[test]
    fn empty_context_prompt_flags_missing_grounding() {
        let prompt = build_prompt("what happened?", "", &[], 5);
        assert!(prompt.contains(NO_CONTEXT_NOTICE));
    }

    #[test]
    fn prompt_includes_only_trailing_history() {
        let history = vec![
            ChatTurn::user("turn-one"),
            ChatTurn::assistant("turn-two"),
            ChatTurn::user("turn-three"),
        ];
        let prompt = build_prompt("q", "ctx", &history, 2);
        assert!(!prompt.contains("turn-one"));
        assert!(prompt.contains("turn-two"));
        assert!(prompt.contains("turn-three"));
    }
}
