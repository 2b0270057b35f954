//! 이슈 트래커 게이트웨이 추상화
//!
//! [`IssueTracker`] trait은 조정 엔진이 사용하는 원격 작업 세 가지를 정의합니다.
//! 운영 코드는 [`JiraClient`](crate::jira::JiraClient)를, 테스트는
//! [`MockIssueTracker`](crate::mock::MockIssueTracker)를 사용합니다.
//!
//! ```text
//! ┌─────────────────────┐
//! │ ReconciliationEngine│
//! └──────────┬──────────┘
//!            │
//!            ▼
//!     ┌────────────┐
//!     │IssueTracker│ (trait)
//!     └────────────┘
//!        │      │
//!        ▼      ▼
//!    ┌────┐  ┌────┐
//!    │Jira│  │Mock│
//!    └────┘  └────┘
//! ```

use std::future::Future;

use serde::Serialize;

use vulnsync_core::error::TrackerError;
use vulnsync_core::types::RemoteIssue;

/// 생성할 티켓 요청
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTicket {
    /// 프로젝트 키
    pub project_key: String,
    /// 상위 에픽 키
    pub epic_key: String,
    /// 이슈 타입 이름 (예: "Code Task")
    pub issue_type: String,
    /// 요약
    pub summary: String,
    /// 본문
    pub description: String,
    /// priority 이름 (빈 문자열이면 전송하지 않음)
    pub priority: String,
}

/// 이슈 트래커 작업 trait
///
/// 모든 호출은 하나씩 순서대로 await됩니다. 구현체는 동시 호출을 가정하지 않아도 됩니다.
///
/// # Errors
///
/// - 전송 실패/타임아웃: `TrackerError::Transport`
/// - 2xx가 아닌 응답: `TrackerError::Http`
/// - 응답 해석 실패: `TrackerError::Decode`
pub trait IssueTracker: Send + Sync {
    /// 티켓을 생성하고 새 티켓 키를 반환합니다.
    fn create_ticket(
        &self,
        ticket: &NewTicket,
    ) -> impl Future<Output = Result<String, TrackerError>> + Send;

    /// 티켓 상태를 조회합니다. 티켓이 존재하지 않으면 `Ok(None)`입니다.
    fn get_ticket_status(
        &self,
        ticket_key: &str,
    ) -> impl Future<Output = Result<Option<String>, TrackerError>> + Send;

    /// 에픽의 하위 티켓 전체를 조회합니다.
    fn list_epic_children(
        &self,
        epic_key: &str,
    ) -> impl Future<Output = Result<Vec<RemoteIssue>, TrackerError>> + Send;
}
