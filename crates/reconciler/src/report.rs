//! 실행 보고서

use std::fmt;

use serde::Serialize;

use vulnsync_core::types::{RemoteIssue, TrackedEntry};

/// 엔트리 제거 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DropReason {
    /// 티켓이 존재하지 않음
    Missing,
    /// 티켓이 종료 상태
    Closed,
    /// 티켓이 열려 있지만 에픽 밖에 있음
    Detached,
    /// 같은 티켓을 먼저 참조한 엔트리가 있음
    Duplicate,
}

impl DropReason {
    /// 메트릭 레이블과 로그에 쓰는 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Closed => "closed",
            Self::Detached => "detached",
            Self::Duplicate => "duplicate",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 제거된 엔트리
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedEntry {
    pub entry: TrackedEntry,
    pub reason: DropReason,
}

/// 생성된 티켓
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedTicket {
    pub vulnerability_id: String,
    pub module_name: String,
    pub ticket_key: String,
}

/// dry-run에서 생성될 예정이던 티켓
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedTicket {
    pub vulnerability_id: String,
    pub module_name: String,
    pub summary: String,
    pub priority: String,
}

/// 생성에 실패한 티켓
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedCreation {
    pub vulnerability_id: String,
    pub module_name: String,
    pub reason: String,
}

/// 한 번의 동기화 실행 결과
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// 실행 ID (로그 상관관계용)
    pub run_id: String,
    /// dry-run 여부
    pub dry_run: bool,
    /// 하위 목록 조회 실패로 Pass A를 건너뛰었는지 여부
    pub pass_a_skipped: bool,
    /// Pass A 후 유지된 엔트리 수
    pub kept: usize,
    pub dropped: Vec<DroppedEntry>,
    pub adopted: Vec<TrackedEntry>,
    /// 이미 추적 중이어서 건너뛴 레코드 수
    pub already_tracked: usize,
    pub created: Vec<CreatedTicket>,
    pub planned: Vec<PlannedTicket>,
    pub failed: Vec<FailedCreation>,
}

impl SyncReport {
    /// 실패한 생성이 있는지 확인합니다.
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// 추적 엔트리와 원격 상태
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryStatus {
    pub entry: TrackedEntry,
    /// 에픽 하위 목록에서 찾은 상태. 목록에 없으면 `None`
    pub remote_status: Option<String>,
}

/// 읽기 전용 상태 보고서
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub epic_key: String,
    pub entries: Vec<EntryStatus>,
    /// 어떤 엔트리도 참조하지 않는 열린 하위 티켓
    pub untracked_children: Vec<RemoteIssue>,
}
