use scraper::{Html, Selector};

/// One step of the extraction cascade: a named CSS selector tried against
/// the article page. Strategies are injected so new source layouts can be
/// supported without touching the pipeline.
#[derive(Debug, Clone)]
pub struct ExtractionStrategy {
    pub name: &'static str,
    pub selector: &'static str,
}

/// Default cascade: structural article-body selectors first, then a broad
/// container, finally every paragraph on the page.
pub fn default_strategies() -> Vec<ExtractionStrategy> {
    vec![
        ExtractionStrategy {
            name: "article-body",
            selector: "[itemprop='articleBody'] p, div[data-testid='body-text'] p, .article-body p",
        },
        ExtractionStrategy {
            name: "article",
            selector: "article p",
        },
        ExtractionStrategy {
            name: "main",
            selector: "main p",
        },
        ExtractionStrategy {
            name: "paragraphs",
            selector: "p",
        },
    ]
}

/// Try each strategy in order; the first whose extracted text clears
/// `min_len` characters wins. Pure and synchronous: the parsed `Html` is
/// not `Send` and must never be held across an await point.
pub fn extract_body(html: &str, strategies: &[ExtractionStrategy], min_len: usize) -> Option<String> {
    let document = Html::parse_document(html);

    for strategy in strategies {
        let Ok(selector) = Selector::parse(strategy.selector) else {
            tracing::warn!("invalid selector in strategy {}", strategy.name);
            continue;
        };

        let text = document
            .select(&selector)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        if text.chars().count() >= min_len {
            tracing::debug!("extracted body via {} strategy", strategy.name);
            return Some(text);
        }
    }

    None
}
