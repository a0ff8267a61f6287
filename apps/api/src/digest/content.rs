//! Article body fetching and extraction.
//!
//! Fetch failures never propagate: every path degrades to a `ContentOutcome`
//! variant, and the JSON boundary renders the non-success variants as the
//! fixed sentinel strings callers already expect.

use anyhow::Context;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::error;

use crate::mp_client::BROWSER_USER_AGENT;

/// Character budget for the body excerpt.
pub const CONTENT_CHAR_LIMIT: usize = 500;
/// Appended only when the body was actually truncated.
pub const ELLIPSIS: &str = "...";
/// The article body container on published-article pages.
const CONTENT_CONTAINER: &str = "div#js_content";
const FETCH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Page fetched but the expected body container was absent.
pub const UNAVAILABLE_SENTINEL: &str = "无法获取文章内容";
/// Transport failure or non-success upstream status.
pub const FAILED_SENTINEL: &str = "获取文章内容失败";

/// Outcome of a content fetch. Callers branch on the variant; only the JSON
/// boundary flattens it to a display string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentOutcome {
    Text(String),
    /// 2xx page without a `#js_content` container.
    ContainerMissing,
    /// Upstream answered with a non-success status.
    RemoteStatus(u16),
    /// Local fault: network error or unreadable body.
    Failed,
}

impl ContentOutcome {
    pub fn into_display(self) -> String {
        match self {
            ContentOutcome::Text(text) => text,
            ContentOutcome::ContainerMissing => UNAVAILABLE_SENTINEL.to_string(),
            ContentOutcome::RemoteStatus(_) | ContentOutcome::Failed => {
                FAILED_SENTINEL.to_string()
            }
        }
    }
}

/// Seam for the body fetch so the digest pipeline can run against a stub in
/// tests. Carried in `AppState` as `Arc<dyn ContentFetcher>`.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> ContentOutcome;
}

pub struct HttpContentFetcher {
    client: reqwest::Client,
}

impl HttpContentFetcher {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()
            .context("Failed to build article fetch client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ContentFetcher for HttpContentFetcher {
    async fn fetch(&self, url: &str) -> ContentOutcome {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Article fetch failed for {url}: {e}");
                return ContentOutcome::Failed;
            }
        };

        let status = response.status();
        if !status.is_success() {
            return ContentOutcome::RemoteStatus(status.as_u16());
        }

        let html = match response.text().await {
            Ok(html) => html,
            Err(e) => {
                error!("Article body read failed for {url}: {e}");
                return ContentOutcome::Failed;
            }
        };

        match extract_article_text(&html) {
            Some(text) => ContentOutcome::Text(truncate_chars(&text, CONTENT_CHAR_LIMIT)),
            None => ContentOutcome::ContainerMissing,
        }
    }
}

/// Extracts the visible text of the article body container, skipping
/// `script` and `style` subtrees. Returns `None` when the container is
/// missing. Text segments are trimmed and concatenated without separators.
pub fn extract_article_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(CONTENT_CONTAINER).expect("static selector");
    let container = document.select(&selector).next()?;
    Some(visible_text(container))
}

fn visible_text(container: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in container.descendants() {
        if let Some(text) = node.value().as_text() {
            let embedded = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .map(|el| el.name() == "script" || el.name() == "style")
                    .unwrap_or(false)
            });
            if !embedded {
                out.push_str(text.trim());
            }
        }
    }
    out
}

/// Truncates at `limit` characters (not bytes — bodies are CJK), appending
/// the ellipsis marker only when something was cut.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        let mut truncated: String = text.chars().take(limit).collect();
        truncated.push_str(ELLIPSIS);
        truncated
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_container_text() {
        let html = r#"<html><body>
            <div id="js_content"><p>第一段。</p><p>第二段。</p></div>
        </body></html>"#;
        assert_eq!(
            extract_article_text(html),
            Some("第一段。第二段。".to_string())
        );
    }

    #[test]
    fn test_missing_container_returns_none() {
        let html = "<html><body><div id='other'>text</div></body></html>";
        assert_eq!(extract_article_text(html), None);
    }

    #[test]
    fn test_script_and_style_are_stripped() {
        let html = r#"<div id="js_content">
            <style>.x { color: red; }</style>
            <p>正文</p>
            <script>var tracked = true;</script>
        </div>"#;
        assert_eq!(extract_article_text(html), Some("正文".to_string()));
    }

    #[test]
    fn test_truncate_over_limit_appends_ellipsis() {
        let text: String = std::iter::repeat('字').take(600).collect();
        let result = truncate_chars(&text, CONTENT_CHAR_LIMIT);
        assert_eq!(result.chars().count(), CONTENT_CHAR_LIMIT + ELLIPSIS.len());
        assert!(result.ends_with(ELLIPSIS));
        assert!(result.starts_with('字'));
    }

    #[test]
    fn test_truncate_at_limit_is_untouched() {
        let text: String = std::iter::repeat('字').take(CONTENT_CHAR_LIMIT).collect();
        let result = truncate_chars(&text, CONTENT_CHAR_LIMIT);
        assert_eq!(result, text);
        assert!(!result.ends_with(ELLIPSIS));
    }

    #[test]
    fn test_truncate_short_text_is_untouched() {
        assert_eq!(truncate_chars("短文", CONTENT_CHAR_LIMIT), "短文");
    }

    #[test]
    fn test_container_missing_renders_unavailable_sentinel() {
        assert_eq!(
            ContentOutcome::ContainerMissing.into_display(),
            UNAVAILABLE_SENTINEL
        );
    }

    #[test]
    fn test_failures_render_failed_sentinel() {
        assert_eq!(ContentOutcome::Failed.into_display(), FAILED_SENTINEL);
        assert_eq!(
            ContentOutcome::RemoteStatus(404).into_display(),
            FAILED_SENTINEL
        );
    }
}
