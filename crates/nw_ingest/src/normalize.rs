use scraper::Html;

/// Appended when `truncate` clamps content at its maximum length.
pub const TRUNCATION_MARKER: &str = "…";

/// Clean raw feed or page text: strip markup, collapse whitespace and
/// restrict the character set to alphanumerics plus basic punctuation.
pub fn normalize(raw: &str) -> String {
    let fragment = Html::parse_fragment(raw);
    let text = fragment.root_element().text().collect::<String>();

    let filtered: String = text
        .chars()
        .map(|c| if is_allowed(c) { c } else { ' ' })
        .collect();

    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_allowed(c: char) -> bool {
    c.is_alphanumeric()
        || c.is_whitespace()
        || matches!(
            c,
            '.' | ','
                | ';'
                | ':'
                | '!'
                | '?'
                | '\''
                | '"'
                | '('
                | ')'
                | '-'
                | '%'
                | '&'
                | '/'
                | '$'
                | '€'
        )
}

/// Insufficient-signal guard: content shorter than `min_len` characters
/// carries too little information to embed.
pub fn is_acceptable(text: &str, min_len: usize) -> bool {
    text.chars().count() >= min_len
}

/// Clamp to `max_len` characters, appending the truncation marker when
/// clamped, so embedding and prompt cost stay bounded deterministically.
pub fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_len).collect();
    out.push_str(TRUNCATION_MARKER);
    out
}
