//! WeChat official-account platform client — the single point of entry for
//! all `mp.weixin.qq.com` calls.
//!
//! Both endpoints are session-authenticated: the caller supplies the platform
//! token and session cookie with every request, nothing is stored here.
//! Responses carry a `base_resp.ret` status; nonzero means the platform
//! rejected the request even when HTTP said 200.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Identification header sent on every platform and article request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Fixed page size for both search and listing calls.
const PAGE_SIZE: u32 = 5;
/// `type` parameter selecting article-type content in `appmsg`.
const ARTICLE_MSG_TYPE: u32 = 9;

#[derive(Debug, Error)]
pub enum MpError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform answered but reported a nonzero `base_resp.ret`.
    #[error("platform rejected the request (ret {ret}): {msg}")]
    Platform { ret: i64, msg: String },
}

/// Per-request platform credentials, taken verbatim from the caller.
#[derive(Debug, Clone)]
pub struct MpAuth {
    pub token: String,
    pub cookie: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct BaseResp {
    #[serde(default)]
    pub ret: i64,
    #[serde(default)]
    pub err_msg: String,
}

#[derive(Debug, Deserialize)]
struct SearchBizResponse {
    #[serde(default)]
    base_resp: Option<BaseResp>,
    #[serde(default)]
    list: Vec<SearchBizHit>,
}

#[derive(Debug, Deserialize)]
struct SearchBizHit {
    fakeid: String,
}

#[derive(Debug, Deserialize)]
struct AppMsgResponse {
    #[serde(default)]
    base_resp: Option<BaseResp>,
    #[serde(default)]
    app_msg_list: Vec<AppMsgItem>,
}

/// One published article as returned by the listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AppMsgItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    /// Publish timestamp, epoch seconds.
    #[serde(default)]
    pub create_time: i64,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Seam for the platform calls so the digest pipeline can run against a stub
/// in tests. Carried in `AppState` as `Arc<dyn ArticleSource>`.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Resolves an account display name to its internal `fakeid`.
    /// `Ok(None)` means the search succeeded but found no account.
    async fn search_account(&self, auth: &MpAuth, name: &str) -> Result<Option<String>, MpError>;

    /// Lists the most recent articles published by `fakeid`.
    async fn list_articles(&self, auth: &MpAuth, fakeid: &str) -> Result<Vec<AppMsgItem>, MpError>;
}

#[derive(Clone)]
pub struct MpClient {
    client: Client,
    base_url: String,
}

impl MpClient {
    /// No request timeout on purpose: the platform calls were unbounded in
    /// the original contract and stay that way.
    pub fn new(base_url: String) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .context("Failed to build platform HTTP client")?;
        Ok(Self { client, base_url })
    }

    fn check(base_resp: Option<BaseResp>) -> Result<(), MpError> {
        match base_resp {
            Some(resp) if resp.ret != 0 => Err(MpError::Platform {
                ret: resp.ret,
                msg: resp.err_msg,
            }),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ArticleSource for MpClient {
    async fn search_account(&self, auth: &MpAuth, name: &str) -> Result<Option<String>, MpError> {
        let url = format!("{}/cgi-bin/searchbiz", self.base_url);
        let count = PAGE_SIZE.to_string();
        let response: SearchBizResponse = self
            .client
            .get(&url)
            .header("Cookie", &auth.cookie)
            .query(&[
                ("action", "search_biz"),
                ("begin", "0"),
                ("count", count.as_str()),
                ("query", name),
                ("token", auth.token.as_str()),
                ("lang", "zh_CN"),
                ("f", "json"),
                ("ajax", "1"),
            ])
            .send()
            .await?
            .json()
            .await?;

        Self::check(response.base_resp)?;
        debug!("searchbiz returned {} hits for {name}", response.list.len());
        Ok(response.list.into_iter().next().map(|hit| hit.fakeid))
    }

    async fn list_articles(&self, auth: &MpAuth, fakeid: &str) -> Result<Vec<AppMsgItem>, MpError> {
        let url = format!("{}/cgi-bin/appmsg", self.base_url);
        let count = PAGE_SIZE.to_string();
        let msg_type = ARTICLE_MSG_TYPE.to_string();
        let response: AppMsgResponse = self
            .client
            .get(&url)
            .header("Cookie", &auth.cookie)
            .query(&[
                ("action", "list_ex"),
                ("begin", "0"),
                ("count", count.as_str()),
                ("fakeid", fakeid),
                ("type", msg_type.as_str()),
                ("token", auth.token.as_str()),
                ("lang", "zh_CN"),
                ("f", "json"),
                ("ajax", "1"),
            ])
            .send()
            .await?
            .json()
            .await?;

        Self::check(response.base_resp)?;
        Ok(response.app_msg_list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_searchbiz_decoding() {
        let body = r#"{
            "base_resp": {"ret": 0, "err_msg": "ok"},
            "list": [
                {"fakeid": "MzI0MDU2", "nickname": "测试号"},
                {"fakeid": "MzI0MDU3", "nickname": "其他号"}
            ]
        }"#;
        let parsed: SearchBizResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.list[0].fakeid, "MzI0MDU2");
        assert_eq!(parsed.base_resp.unwrap().ret, 0);
    }

    #[test]
    fn test_appmsg_decoding_tolerates_extra_fields() {
        let body = r#"{
            "base_resp": {"ret": 0, "err_msg": "ok"},
            "app_msg_list": [
                {
                    "aid": "2247",
                    "title": "本周要闻",
                    "link": "https://mp.weixin.qq.com/s/abc",
                    "create_time": 1700000000,
                    "digest": "摘要"
                }
            ]
        }"#;
        let parsed: AppMsgResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.app_msg_list.len(), 1);
        assert_eq!(parsed.app_msg_list[0].create_time, 1_700_000_000);
    }

    #[test]
    fn test_nonzero_ret_is_a_platform_error() {
        let err = MpClient::check(Some(BaseResp {
            ret: 200013,
            err_msg: "freq control".to_string(),
        }))
        .unwrap_err();
        match err {
            MpError::Platform { ret, .. } => assert_eq!(ret, 200013),
            other => panic!("expected Platform error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_base_resp_passes() {
        assert!(MpClient::check(None).is_ok());
    }
}
