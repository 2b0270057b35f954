//! 도메인 타입 -- 시스템 전역에서 사용되는 공통 타입
//!
//! 파서, 트래커, 조정 엔진이 공유하는 데이터 구조를 정의합니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 종료 상태로 간주되는 티켓 상태 (대소문자 구분 없음)
pub const TERMINAL_STATUSES: &[&str] = &["closed", "done"];

/// 정규화된 취약점 레코드
///
/// 스캐너 버전과 무관한 단일 취약점 표현입니다.
/// `id`가 중복 제거의 자연 키입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnerabilityRecord {
    /// 권고(advisory) 식별자
    pub id: String,
    /// 영향받는 패키지명
    pub module_name: String,
    /// 요약 제목
    pub title: String,
    /// 권고 URL
    pub url: String,
    /// 원본 심각도 (info, low, moderate, high, critical)
    pub severity: String,
    /// 취약 버전 범위
    pub vulnerable_version_range: Option<String>,
    /// 설치된 취약 버전 목록
    pub affected_versions: Vec<String>,
    /// 취약 모듈에 도달하는 의존성 경로 목록
    pub dependency_paths: Vec<String>,
}

impl fmt::Display for VulnerabilityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) [{}]", self.id, self.module_name, self.severity)
    }
}

/// 추적 중인 취약점 엔트리
///
/// 취약점 ID와 해당 취약점을 위해 생성된 티켓을 연결합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedEntry {
    /// 취약점 ID (저장소 키)
    pub vulnerability_id: String,
    /// 표시용 패키지명
    pub module_name: String,
    /// 원격 티켓 키 (예: `SEC-42`)
    pub ticket_key: String,
}

impl TrackedEntry {
    /// 새 엔트리를 생성합니다.
    pub fn new(
        vulnerability_id: impl Into<String>,
        module_name: impl Into<String>,
        ticket_key: impl Into<String>,
    ) -> Self {
        Self {
            vulnerability_id: vulnerability_id.into(),
            module_name: module_name.into(),
            ticket_key: ticket_key.into(),
        }
    }
}

impl fmt::Display for TrackedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) -> {}",
            self.vulnerability_id, self.module_name, self.ticket_key
        )
    }
}

/// 원격 티켓의 읽기 전용 투영
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteIssue {
    /// 티켓 키
    pub key: String,
    /// 티켓 요약
    pub summary: String,
    /// 워크플로 상태 이름
    pub status: String,
}

impl RemoteIssue {
    /// 상태가 종료 상태인지 확인합니다.
    pub fn is_terminal(&self) -> bool {
        is_terminal_status(&self.status)
    }
}

/// 상태 문자열이 종료 상태("closed", "done")인지 확인합니다.
pub fn is_terminal_status(status: &str) -> bool {
    let status = status.trim();
    TERMINAL_STATUSES
        .iter()
        .any(|terminal| status.eq_ignore_ascii_case(terminal))
}
