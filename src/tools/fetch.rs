//! The `fetch_url` tool: bounded retrieval of a page's visible text.

use scraper::Html;
use tracing::debug;

/// Fetch `url` and return its visible text, truncated to `max_chars`.
///
/// Every failure mode folds into the returned string; the conversation turn
/// continues with that text as the tool result.
pub async fn fetch_url(client: &reqwest::Client, url: &str, max_chars: usize) -> String {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(err) => return format!("Failed to fetch URL: {}", err),
    };

    if !response.status().is_success() {
        return format!("Failed to fetch URL: HTTP status {}", response.status());
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("text/html")
        .to_string();

    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => return format!("Failed to read response body: {}", err),
    };

    debug!(url, content_type, bytes = body.len(), "fetched tool content");

    let text = if content_type.contains("text/html") || content_type.contains("application/xhtml")
    {
        visible_text(&body)
    } else {
        collapse_whitespace(&body)
    };

    if text.is_empty() {
        return "No text content could be extracted from the page.".to_string();
    }

    truncate_chars(&text, max_chars)
}

/// Extract the human-visible text of an HTML document: script and style
/// subtrees are dropped, markup is removed, entities are decoded by the
/// parser, and whitespace collapses to single spaces.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut collected = String::new();

    for node in document.tree.root().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| matches!(el.name(), "script" | "style"))
        });
        if !hidden {
            collected.push_str(&text.text);
            collected.push(' ');
        }
    }

    collapse_whitespace(&collected)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
