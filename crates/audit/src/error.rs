//! Audit 에러 타입
//!
//! [`AuditError`]는 스캐너 실행과 형식 결정 과정에서 발생하는 에러를 나타냅니다.
//! 개별 출력 라인의 디코딩 실패는 에러가 아니며 여기에 포함되지 않습니다.
//!
//! # 에러 카테고리
//!
//! - **형식 결정**: `UnknownFormat`, `VersionDetect`
//! - **스캐너 실행**: `Spawn`
//! - **입력 I/O**: `Io`

use vulnsync_core::error::{ParseError, VulnsyncError};

/// Audit 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// 등록되지 않은 형식 계열
    #[error("unknown scanner format family: {0}")]
    UnknownFormat(String),

    /// 스캐너 버전 감지 실패
    #[error("scanner version detection failed: '{version}': {reason}")]
    VersionDetect {
        /// 스캐너가 출력한 버전 문자열
        version: String,
        /// 실패 사유
        reason: String,
    },

    /// 스캐너 프로세스 실행 실패
    #[error("failed to run scanner '{command}': {source}")]
    Spawn {
        /// 실행한 명령
        command: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },

    /// 입력 읽기 실패
    #[error("io error: {path}: {source}")]
    Io {
        /// 관련 경로 (stdin이면 "-")
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },
}

impl AuditError {
    /// 설정 계열 에러(원격 변경 전 중단 대상)인지 확인합니다.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::UnknownFormat(_) | Self::VersionDetect { .. })
    }
}

impl From<AuditError> for VulnsyncError {
    fn from(err: AuditError) -> Self {
        match err {
            AuditError::UnknownFormat(family) => {
                VulnsyncError::Parse(ParseError::UnknownFormat(family))
            }
            AuditError::VersionDetect { version, reason } => {
                VulnsyncError::Parse(ParseError::Version { version, reason })
            }
            AuditError::Spawn { source, .. } => VulnsyncError::Io(source),
            AuditError::Io { source, .. } => VulnsyncError::Io(source),
        }
    }
}
