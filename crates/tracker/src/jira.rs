//! Jira REST API v2 클라이언트
//!
//! [`JiraClient`]는 [`IssueTracker`]의 운영 구현입니다.
//!
//! - 인증: `api_email` / `api_token` basic auth
//! - 타임아웃: `request_timeout_secs` (전송 실패로 취급)
//! - 에픽 하위 검색은 `total`에 도달할 때까지 `startAt`/`maxResults`로 페이지를 넘깁니다.
//!
//! # Examples
//!
//! ```ignore
//! use vulnsync_tracker::{IssueTracker, JiraClient};
//!
//! let client = JiraClient::from_config(&config.jira)?;
//! let children = client.list_epic_children("SEC-1").await?;
//! ```

use std::time::Duration;

use metrics::counter;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use vulnsync_core::config::JiraConfig;
use vulnsync_core::error::TrackerError;
use vulnsync_core::metrics::TRACKER_REQUEST_FAILURES_TOTAL;
use vulnsync_core::types::RemoteIssue;

use crate::gateway::{IssueTracker, NewTicket};

/// 검색 시 요청하는 필드 목록
const SEARCH_FIELDS: &str = "key,summary,status";

/// Jira 클라이언트
#[derive(Clone)]
pub struct JiraClient {
    http: reqwest::Client,
    /// 끝의 `/`를 제거한 기본 URL
    base_url: String,
    api_email: String,
    api_token: String,
    page_size: u32,
}

impl std::fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraClient")
            .field("base_url", &self.base_url)
            .field("api_email", &self.api_email)
            .field("api_token", &"<redacted>")
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl JiraClient {
    /// 설정에서 클라이언트를 생성합니다.
    ///
    /// # Errors
    ///
    /// HTTP 클라이언트를 만들 수 없으면 `TrackerError::Transport`를 반환합니다.
    pub fn from_config(config: &JiraConfig) -> Result<Self, TrackerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| TrackerError::Transport(format!("failed to build http client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            api_email: config.api_email.clone(),
            api_token: config.api_token.clone(),
            page_size: config.page_size.max(1),
        })
    }

    /// 기본 URL을 반환합니다.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(self.url(path))
            .basic_auth(&self.api_email, Some(&self.api_token))
    }

    /// 에픽 하위 티켓 한 페이지를 조회합니다.
    async fn search_page(&self, epic_key: &str, start_at: u32) -> Result<SearchPage, TrackerError> {
        let jql = format!("parent={epic_key}");
        let start_at = start_at.to_string();
        let max_results = self.page_size.to_string();
        let response = self
            .get("/rest/api/2/search")
            .query(&[
                ("jql", jql.as_str()),
                ("fields", SEARCH_FIELDS),
                ("startAt", start_at.as_str()),
                ("maxResults", max_results.as_str()),
            ])
            .send()
            .await
            .map_err(|e| transport("search", e))?;

        let response = error_for_status(response).await?;
        decode(response).await
    }
}

impl IssueTracker for JiraClient {
    async fn create_ticket(&self, ticket: &NewTicket) -> Result<String, TrackerError> {
        let mut fields = json!({
            "project": { "key": ticket.project_key },
            "summary": ticket.summary,
            "description": ticket.description,
            "issuetype": { "name": ticket.issue_type },
            "parent": { "key": ticket.epic_key },
        });
        if !ticket.priority.is_empty() {
            fields["priority"] = json!({ "name": ticket.priority });
        }

        let response = self
            .http
            .post(self.url("/rest/api/2/issue"))
            .basic_auth(&self.api_email, Some(&self.api_token))
            .json(&json!({ "fields": fields }))
            .send()
            .await
            .map_err(|e| transport("create issue", e))?;

        let response = error_for_status(response).await?;
        let created: CreatedIssue = decode(response).await?;
        debug!(ticket_key = %created.key, summary = %ticket.summary, "jira issue created");
        Ok(created.key)
    }

    async fn get_ticket_status(&self, ticket_key: &str) -> Result<Option<String>, TrackerError> {
        let response = self
            .get(&format!("/rest/api/2/issue/{ticket_key}"))
            .query(&[("fields", "status")])
            .send()
            .await
            .map_err(|e| transport("get issue", e))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(ticket_key, "jira issue not found");
            return Ok(None);
        }

        let response = error_for_status(response).await?;
        let issue: IssueStatusBody = decode(response).await?;
        Ok(Some(issue.fields.status.name))
    }

    async fn list_epic_children(&self, epic_key: &str) -> Result<Vec<RemoteIssue>, TrackerError> {
        let mut children = Vec::new();
        let mut start_at: u32 = 0;

        loop {
            let page = self.search_page(epic_key, start_at).await?;
            let fetched = page.issues.len();
            children.extend(page.issues.into_iter().map(SearchIssue::into_remote));

            let fetched = u32::try_from(fetched).unwrap_or(u32::MAX);
            start_at = start_at.saturating_add(fetched);
            if fetched == 0 || start_at >= page.total {
                break;
            }
        }

        debug!(epic_key, count = children.len(), "fetched epic children");
        Ok(children)
    }
}

/// 전송 계층 에러를 변환하고 실패를 기록합니다.
fn transport(operation: &str, err: reqwest::Error) -> TrackerError {
    counter!(TRACKER_REQUEST_FAILURES_TOTAL).increment(1);
    let kind = if err.is_timeout() { "timed out" } else { "failed" };
    warn!(operation, error = %err, "jira request {}", kind);
    TrackerError::Transport(format!("{operation} {kind}: {err}"))
}

/// 2xx가 아닌 응답을 `TrackerError::Http`로 변환합니다.
async fn error_for_status(response: Response) -> Result<Response, TrackerError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    counter!(TRACKER_REQUEST_FAILURES_TOTAL).increment(1);
    let body = response.text().await.unwrap_or_default();
    warn!(status = status.as_u16(), body = %body, "jira returned an error status");
    Err(TrackerError::Http {
        status: status.as_u16(),
        body,
    })
}

/// 응답 본문을 JSON으로 해석합니다.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, TrackerError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| TrackerError::Transport(format!("failed to read response body: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| TrackerError::Decode(e.to_string()))
}

// ─── 응답 본문 (파싱용) ─────────────────────────────────────────────

#[derive(Deserialize)]
struct CreatedIssue {
    key: String,
}

#[derive(Deserialize)]
struct IssueStatusBody {
    fields: StatusFields,
}

#[derive(Deserialize)]
struct StatusFields {
    status: StatusName,
}

#[derive(Deserialize)]
struct StatusName {
    name: String,
}

#[derive(Deserialize)]
struct SearchPage {
    #[serde(default)]
    total: u32,
    #[serde(default)]
    issues: Vec<SearchIssue>,
}

#[derive(Deserialize)]
struct SearchIssue {
    key: String,
    fields: SearchFields,
}

#[derive(Deserialize)]
struct SearchFields {
    #[serde(default)]
    summary: String,
    status: StatusName,
}

impl SearchIssue {
    fn into_remote(self) -> RemoteIssue {
        RemoteIssue {
            key: self.key,
            summary: self.fields.summary,
            status: self.fields.status.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> JiraConfig {
        JiraConfig {
            base_url: base_url.to_owned(),
            project_key: "SEC".to_owned(),
            epic_key: "SEC-1".to_owned(),
            api_email: "bot@example.com".to_owned(),
            api_token: "secret-token".to_owned(),
            ..JiraConfig::default()
        }
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = JiraClient::from_config(&config("https://jira.example.com/")).unwrap();
        assert_eq!(client.base_url(), "https://jira.example.com");
        assert_eq!(
            client.url("/rest/api/2/issue"),
            "https://jira.example.com/rest/api/2/issue"
        );
    }

    #[test]
    fn debug_redacts_token() {
        let client = JiraClient::from_config(&config("https://jira.example.com")).unwrap();
        let debug = format!("{client:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret-token"));
    }

    #[test]
    fn search_issue_converts_to_remote() {
        let page: SearchPage = serde_json::from_str(
            r#"{"startAt":0,"maxResults":50,"total":1,"issues":[{"key":"SEC-9","fields":{"summary":"[HIGH] Vulnerability in qs","status":{"name":"In Progress"}}}]}"#,
        )
        .unwrap();
        let issue = page.issues.into_iter().next().unwrap().into_remote();
        assert_eq!(issue.key, "SEC-9");
        assert_eq!(issue.status, "In Progress");
    }
}
