//! Account digest — orchestrates the full search pipeline.
//!
//! Flow per account: searchbiz → fakeid → appmsg listing → recency filter →
//! sequential body fetch → article records. Account-level failures are
//! logged and skipped; they never abort the batch.

pub mod content;
pub mod handlers;

use chrono::{DateTime, Duration, Local, TimeZone};
use serde::Serialize;
use tracing::{info, warn};

use crate::digest::content::ContentFetcher;
use crate::mp_client::{AppMsgItem, ArticleSource, MpAuth};

/// Fixed lookback used to filter listed articles by publish time.
pub const RECENCY_WINDOW_DAYS: i64 = 3;
const PUBLISH_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One article in the `/search` response. Transient — constructed per
/// request and returned directly, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleRecord {
    pub account: String,
    pub title: String,
    pub link: String,
    pub content: String,
    pub publish_time: String,
}

pub fn recency_cutoff(now: DateTime<Local>) -> DateTime<Local> {
    now - Duration::days(RECENCY_WINDOW_DAYS)
}

/// Keeps items published at or after the cutoff, paired with their decoded
/// publish time. Items with unrepresentable timestamps are dropped.
pub fn filter_recent(
    items: Vec<AppMsgItem>,
    cutoff: DateTime<Local>,
) -> Vec<(AppMsgItem, DateTime<Local>)> {
    items
        .into_iter()
        .filter_map(|item| {
            let published = Local.timestamp_opt(item.create_time, 0).single()?;
            (published >= cutoff).then_some((item, published))
        })
        .collect()
}

/// Runs the digest pipeline over every requested account.
///
/// Strictly sequential: accounts in order, and within an account each kept
/// article's body is fetched before the next. Per-account failures (platform
/// rejection, transport error, no search hit) are logged and skipped — the
/// response stays a plain array of the articles that succeeded.
pub async fn collect_recent_articles(
    source: &dyn ArticleSource,
    fetcher: &dyn ContentFetcher,
    auth: &MpAuth,
    accounts: &[String],
) -> Vec<ArticleRecord> {
    let cutoff = recency_cutoff(Local::now());
    let mut results = Vec::new();

    for account in accounts {
        info!("Searching official account: {account}");

        let fakeid = match source.search_account(auth, account).await {
            Ok(Some(fakeid)) => fakeid,
            Ok(None) => {
                warn!("Official account not found: {account}");
                continue;
            }
            Err(e) => {
                warn!("Search failed for {account}: {e}");
                continue;
            }
        };

        let items = match source.list_articles(auth, &fakeid).await {
            Ok(items) => items,
            Err(e) => {
                warn!("Article listing failed for {account}: {e}");
                continue;
            }
        };

        for (item, published) in filter_recent(items, cutoff) {
            let body = fetcher.fetch(&item.link).await.into_display();
            results.push(ArticleRecord {
                account: account.clone(),
                title: item.title,
                link: item.link,
                content: body,
                publish_time: published.format(PUBLISH_TIME_FORMAT).to_string(),
            });
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    use crate::digest::content::{ContentOutcome, UNAVAILABLE_SENTINEL};
    use crate::mp_client::MpError;

    fn item(title: &str, link: &str, create_time: i64) -> AppMsgItem {
        AppMsgItem {
            title: title.to_string(),
            link: link.to_string(),
            create_time,
        }
    }

    fn auth() -> MpAuth {
        MpAuth {
            token: "t".to_string(),
            cookie: "c".to_string(),
        }
    }

    /// Stub platform: maps account name → (fakeid, items); unknown names
    /// search-miss, names starting with `err:` fail the search call.
    struct StubSource {
        accounts: HashMap<String, (String, Vec<AppMsgItem>)>,
    }

    #[async_trait]
    impl ArticleSource for StubSource {
        async fn search_account(
            &self,
            _auth: &MpAuth,
            name: &str,
        ) -> Result<Option<String>, MpError> {
            if name.starts_with("err:") {
                return Err(MpError::Platform {
                    ret: 200003,
                    msg: "invalid session".to_string(),
                });
            }
            Ok(self.accounts.get(name).map(|(fakeid, _)| fakeid.clone()))
        }

        async fn list_articles(
            &self,
            _auth: &MpAuth,
            fakeid: &str,
        ) -> Result<Vec<AppMsgItem>, MpError> {
            Ok(self
                .accounts
                .values()
                .find(|(id, _)| id == fakeid)
                .map(|(_, items)| items.clone())
                .unwrap_or_default())
        }
    }

    struct StubFetcher;

    #[async_trait]
    impl ContentFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> ContentOutcome {
            if url.contains("missing") {
                ContentOutcome::ContainerMissing
            } else {
                ContentOutcome::Text(format!("body of {url}"))
            }
        }
    }

    #[test]
    fn test_filter_recent_window() {
        let now = Local::now();
        let cutoff = recency_cutoff(now);
        let fresh = now.timestamp() - 3600;
        let stale = now.timestamp() - 4 * 24 * 3600;

        let kept = filter_recent(
            vec![item("fresh", "l1", fresh), item("stale", "l2", stale)],
            cutoff,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].0.title, "fresh");
    }

    #[test]
    fn test_filter_recent_drops_zero_timestamps() {
        let cutoff = recency_cutoff(Local::now());
        let kept = filter_recent(vec![item("no time", "l", 0)], cutoff);
        assert!(kept.is_empty());
    }

    #[tokio::test]
    async fn test_pipeline_keeps_only_in_window_articles() {
        let now = Local::now().timestamp();
        let source = StubSource {
            accounts: HashMap::from([(
                "科技观察".to_string(),
                (
                    "FAKE1".to_string(),
                    vec![
                        item("新文章", "https://mp/s/1", now - 60),
                        item("旧文章", "https://mp/s/2", now - 5 * 24 * 3600),
                    ],
                ),
            )]),
        };

        let records = collect_recent_articles(
            &source,
            &StubFetcher,
            &auth(),
            &["科技观察".to_string()],
        )
        .await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "新文章");
        assert_eq!(records[0].account, "科技观察");
        assert_eq!(records[0].content, "body of https://mp/s/1");
    }

    #[tokio::test]
    async fn test_failed_account_does_not_abort_batch() {
        let now = Local::now().timestamp();
        let source = StubSource {
            accounts: HashMap::from([(
                "好号".to_string(),
                ("FAKE1".to_string(), vec![item("文", "https://mp/s/1", now)]),
            )]),
        };

        let records = collect_recent_articles(
            &source,
            &StubFetcher,
            &auth(),
            &[
                "err:坏号".to_string(),
                "不存在".to_string(),
                "好号".to_string(),
            ],
        )
        .await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].account, "好号");
    }

    #[tokio::test]
    async fn test_content_failure_degrades_to_sentinel() {
        let now = Local::now().timestamp();
        let source = StubSource {
            accounts: HashMap::from([(
                "号".to_string(),
                (
                    "FAKE1".to_string(),
                    vec![item("文", "https://mp/s/missing", now)],
                ),
            )]),
        };

        let records =
            collect_recent_articles(&source, &StubFetcher, &auth(), &["号".to_string()]).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, UNAVAILABLE_SENTINEL);
    }
}
