//! 테스트용 Mock 이슈 트래커
//!
//! 메모리 안의 티켓 목록으로 [`IssueTracker`]를 구현합니다.
//! 호출 기록을 남기므로 "원격 변경이 없었는지" 같은 검증에 사용할 수 있습니다.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use vulnsync_core::error::TrackerError;
use vulnsync_core::types::RemoteIssue;

use crate::gateway::{IssueTracker, NewTicket};

/// Mock 호출 기록
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    /// `create_ticket` (요약)
    Create(String),
    /// `get_ticket_status` (티켓 키)
    Status(String),
    /// `list_epic_children` (에픽 키)
    List(String),
}

#[derive(Debug, Default)]
struct MockState {
    /// 에픽 하위 티켓
    children: Vec<RemoteIssue>,
    /// 에픽 밖에 있는 티켓 (키 → 상태)
    detached: HashMap<String, String>,
    /// 생성된 티켓
    created: Vec<NewTicket>,
    calls: Vec<MockCall>,
    next_number: u32,
}

/// 테스트용 Mock 이슈 트래커
///
/// 생성된 티켓은 `<project>-<번호>` 키로 "To Do" 상태의 하위 티켓이 됩니다.
#[derive(Debug)]
pub struct MockIssueTracker {
    state: Mutex<MockState>,
    /// 실패시킬 생성 요청 요약의 모듈 이름
    failing_modules: HashSet<String>,
    /// 상태 조회를 전송 실패로 만들 티켓 키
    failing_status: HashSet<String>,
    fail_listing: bool,
}

impl Default for MockIssueTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl MockIssueTracker {
    /// 빈 에픽으로 mock을 생성합니다. 생성 번호는 100부터 시작합니다.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                next_number: 100,
                ..MockState::default()
            }),
            failing_modules: HashSet::new(),
            failing_status: HashSet::new(),
            fail_listing: false,
        }
    }

    /// 에픽 하위 티켓을 추가합니다.
    pub fn with_child(self, key: &str, summary: &str, status: &str) -> Self {
        self.lock().children.push(RemoteIssue {
            key: key.to_owned(),
            summary: summary.to_owned(),
            status: status.to_owned(),
        });
        self
    }

    /// 에픽에 속하지 않은 티켓을 추가합니다.
    pub fn with_detached(self, key: &str, status: &str) -> Self {
        self.lock()
            .detached
            .insert(key.to_owned(), status.to_owned());
        self
    }

    /// 요약이 `module`로 끝나는 티켓 생성을 실패시킵니다.
    pub fn with_failing_create(mut self, module: &str) -> Self {
        self.failing_modules.insert(module.to_owned());
        self
    }

    /// 해당 티켓의 상태 조회를 전송 실패로 만듭니다.
    pub fn with_failing_status(mut self, key: &str) -> Self {
        self.failing_status.insert(key.to_owned());
        self
    }

    /// 하위 목록 조회를 실패시킵니다.
    pub fn with_failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// 지금까지 생성된 티켓 요청을 반환합니다.
    pub fn created(&self) -> Vec<NewTicket> {
        self.lock().created.clone()
    }

    /// 호출 기록을 반환합니다.
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    /// 티켓 상태를 바꿉니다.
    pub fn set_status(&self, key: &str, status: &str) {
        let mut state = self.lock();
        if let Some(child) = state.children.iter_mut().find(|c| c.key == key) {
            child.status = status.to_owned();
        }
    }

    /// 티켓을 삭제합니다.
    pub fn delete(&self, key: &str) {
        let mut state = self.lock();
        state.children.retain(|c| c.key != key);
        state.detached.remove(key);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        // 테스트 패닉으로 오염된 락도 계속 사용합니다.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl IssueTracker for MockIssueTracker {
    async fn create_ticket(&self, ticket: &NewTicket) -> Result<String, TrackerError> {
        let mut state = self.lock();
        state.calls.push(MockCall::Create(ticket.summary.clone()));

        let failing = self
            .failing_modules
            .iter()
            .any(|m| ticket.summary.ends_with(&format!(" {m}")));
        if failing {
            return Err(TrackerError::Http {
                status: 400,
                body: "mock failure".to_owned(),
            });
        }

        let key = format!("{}-{}", ticket.project_key, state.next_number);
        state.next_number += 1;
        state.children.push(RemoteIssue {
            key: key.clone(),
            summary: ticket.summary.clone(),
            status: "To Do".to_owned(),
        });
        state.created.push(ticket.clone());
        Ok(key)
    }

    async fn get_ticket_status(&self, ticket_key: &str) -> Result<Option<String>, TrackerError> {
        let mut state = self.lock();
        state.calls.push(MockCall::Status(ticket_key.to_owned()));

        if self.failing_status.contains(ticket_key) {
            return Err(TrackerError::Transport("mock timeout".to_owned()));
        }

        let status = state
            .children
            .iter()
            .find(|c| c.key == ticket_key)
            .map(|c| c.status.clone())
            .or_else(|| state.detached.get(ticket_key).cloned());
        Ok(status)
    }

    async fn list_epic_children(&self, epic_key: &str) -> Result<Vec<RemoteIssue>, TrackerError> {
        let mut state = self.lock();
        state.calls.push(MockCall::List(epic_key.to_owned()));

        if self.fail_listing {
            return Err(TrackerError::Transport("mock connection refused".to_owned()));
        }
        Ok(state.children.clone())
    }
}
