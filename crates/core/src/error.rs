//! 에러 타입 -- 도메인별 에러 정의
//!
//! [`VulnsyncError`]는 워크스페이스 전체의 최상위 에러입니다.
//! 각 크레이트는 자기 도메인 에러를 정의하고 `From<...> for VulnsyncError`를
//! 구현하여 `?` 연산자로 전파합니다.

/// vulnsync 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum VulnsyncError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 스캐너 출력 파싱 에러
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// 이슈 트래커 통신 에러
    #[error("tracker error: {0}")]
    Tracker(#[from] TrackerError),

    /// 추적 저장소 에러
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl VulnsyncError {
    /// 설정 계열 에러인지 확인합니다.
    ///
    /// 설정 에러는 원격 변경 이전에 실행을 중단시키는 유일한 에러 계열입니다.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Parse(_))
    }
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// 필수 설정 누락
    #[error("missing required setting '{field}' (env: {env_key})")]
    Missing { field: String, env_key: String },

    /// 이슈 템플릿을 읽을 수 없음
    #[error("issue template unavailable: {path}: {reason}")]
    Template { path: String, reason: String },
}

/// 스캐너 출력 파싱 에러
///
/// 개별 라인의 파싱 실패는 에러가 아닙니다 (건너뜀).
/// 여기에는 파싱 전체를 중단시키는 경우만 포함됩니다.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// 등록되지 않은 형식 계열
    #[error("unknown scanner format family: {0}")]
    UnknownFormat(String),

    /// 스캐너 버전 문자열 해석 실패
    #[error("cannot determine format from scanner version '{version}': {reason}")]
    Version { version: String, reason: String },
}

/// 이슈 트래커 통신 에러
///
/// "티켓 없음(404)"은 에러가 아니라 정상 결과(`None`)로 표현됩니다.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// 네트워크/타임아웃 등 전송 계층 실패
    #[error("transport failure: {0}")]
    Transport(String),

    /// 2xx가 아닌 HTTP 응답
    #[error("unexpected http status {status}: {body}")]
    Http { status: u16, body: String },

    /// 응답 본문 디코딩 실패
    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// 추적 저장소 에러
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 저장소 파일 읽기/쓰기 실패
    #[error("store io error: {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// 저장소 파일 형식 오류
    #[error("malformed store file {path}: {reason}")]
    Malformed { path: String, reason: String },
}
