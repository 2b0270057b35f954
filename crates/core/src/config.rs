//! 설정 관리 -- vulnsync.toml 파싱 및 런타임 설정
//!
//! [`VulnsyncConfig`]는 모든 컴포넌트의 설정을 담는 최상위 구조체입니다.
//! 프로세스 시작 시 한 번 만들어져 각 컴포넌트 생성자에 명시적으로 전달됩니다.
//! 이 모듈 밖의 어떤 컴포넌트도 환경변수를 직접 읽지 않습니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`VULNSYNC_JIRA_BASE_URL=https://...` 형식)
//! 3. 설정 파일 (`vulnsync.toml`, 선택)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), vulnsync_core::error::VulnsyncError> {
//! use vulnsync_core::config::VulnsyncConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = VulnsyncConfig::load("vulnsync.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = VulnsyncConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, VulnsyncError};

/// 허용되는 로그 레벨
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
/// 허용되는 로그 형식
const VALID_LOG_FORMATS: &[&str] = &["json", "pretty", "compact"];
/// 허용되는 스캐너 형식 이름 (형식 계열 + 별칭)
const VALID_SCANNER_FORMATS: &[&str] = &[
    "auto", "classic", "yarn1", "v1", "berry", "yarn2", "yarn3", "modern", "yarn4",
];
/// 요청 타임아웃 상한 (초)
const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;
/// 자식 티켓 검색 페이지 크기 상한
const MAX_PAGE_SIZE: u32 = 1000;

/// vulnsync 통합 설정
///
/// `vulnsync.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VulnsyncConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// Jira 연결 설정
    #[serde(default)]
    pub jira: JiraConfig,
    /// 스캐너 설정
    #[serde(default)]
    pub scanner: ScannerConfig,
    /// 추적 저장소 / 템플릿 설정
    #[serde(default)]
    pub tracking: TrackingConfig,
}

impl VulnsyncConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 유효성 검증
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, VulnsyncError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일 없이 기본값 + 환경변수로 설정을 구성합니다.
    pub fn from_env() -> Result<Self, VulnsyncError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, VulnsyncError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VulnsyncError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                VulnsyncError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, VulnsyncError> {
        toml::from_str(toml_str).map_err(|e| {
            VulnsyncError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `VULNSYNC_{SECTION}_{FIELD}`
    /// 예: `VULNSYNC_JIRA_EPIC_KEY=SEC-1`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "VULNSYNC_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "VULNSYNC_GENERAL_LOG_FORMAT");

        // Jira
        override_string(&mut self.jira.base_url, "VULNSYNC_JIRA_BASE_URL");
        override_string(&mut self.jira.project_key, "VULNSYNC_JIRA_PROJECT_KEY");
        override_string(&mut self.jira.epic_key, "VULNSYNC_JIRA_EPIC_KEY");
        override_string(&mut self.jira.api_email, "VULNSYNC_JIRA_API_EMAIL");
        override_string(&mut self.jira.api_token, "VULNSYNC_JIRA_API_TOKEN");
        override_string(&mut self.jira.issue_type, "VULNSYNC_JIRA_ISSUE_TYPE");
        override_u64(
            &mut self.jira.request_timeout_secs,
            "VULNSYNC_JIRA_REQUEST_TIMEOUT_SECS",
        );
        override_u32(&mut self.jira.page_size, "VULNSYNC_JIRA_PAGE_SIZE");

        // Scanner
        override_string(&mut self.scanner.format, "VULNSYNC_SCANNER_FORMAT");
        override_string(&mut self.scanner.command, "VULNSYNC_SCANNER_COMMAND");
        override_string(&mut self.scanner.working_dir, "VULNSYNC_SCANNER_WORKING_DIR");

        // Tracking
        override_string(&mut self.tracking.store_path, "VULNSYNC_TRACKING_STORE_PATH");
        override_string(
            &mut self.tracking.template_path,
            "VULNSYNC_TRACKING_TEMPLATE_PATH",
        );
    }

    /// 설정값의 형식/범위를 검증합니다.
    ///
    /// 필수 Jira 설정의 존재 여부는 [`validate_tracker`](Self::validate_tracker)가
    /// 별도로 검사합니다 (스캔 전용 명령은 Jira 설정 없이 동작).
    pub fn validate(&self) -> Result<(), VulnsyncError> {
        if !VALID_LOG_LEVELS.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", VALID_LOG_LEVELS.join(", ")),
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", VALID_LOG_FORMATS.join(", ")),
            ));
        }

        let format = self.scanner.format.to_ascii_lowercase();
        if !VALID_SCANNER_FORMATS.contains(&format.as_str()) {
            return Err(invalid(
                "scanner.format",
                format!("must be one of: {}", VALID_SCANNER_FORMATS.join(", ")),
            ));
        }

        if self.scanner.command.trim().is_empty() {
            return Err(invalid("scanner.command", "must not be empty".to_owned()));
        }

        if self.jira.request_timeout_secs == 0
            || self.jira.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS
        {
            return Err(invalid(
                "jira.request_timeout_secs",
                format!("must be 1-{MAX_REQUEST_TIMEOUT_SECS}"),
            ));
        }

        if self.jira.page_size == 0 || self.jira.page_size > MAX_PAGE_SIZE {
            return Err(invalid(
                "jira.page_size",
                format!("must be 1-{MAX_PAGE_SIZE}"),
            ));
        }

        if self.tracking.store_path.trim().is_empty() {
            return Err(invalid(
                "tracking.store_path",
                "must not be empty".to_owned(),
            ));
        }

        if !self.jira.base_url.is_empty()
            && !(self.jira.base_url.starts_with("http://")
                || self.jira.base_url.starts_with("https://"))
        {
            return Err(invalid(
                "jira.base_url",
                "must start with http:// or https://".to_owned(),
            ));
        }

        Ok(())
    }

    /// 트래커와 통신하는 명령에 필요한 필수 설정을 검증합니다.
    pub fn validate_tracker(&self) -> Result<(), VulnsyncError> {
        let required = [
            (&self.jira.base_url, "jira.base_url", "VULNSYNC_JIRA_BASE_URL"),
            (
                &self.jira.project_key,
                "jira.project_key",
                "VULNSYNC_JIRA_PROJECT_KEY",
            ),
            (&self.jira.epic_key, "jira.epic_key", "VULNSYNC_JIRA_EPIC_KEY"),
            (&self.jira.api_email, "jira.api_email", "VULNSYNC_JIRA_API_EMAIL"),
            (&self.jira.api_token, "jira.api_token", "VULNSYNC_JIRA_API_TOKEN"),
        ];

        for (value, field, env_key) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing {
                    field: field.to_owned(),
                    env_key: env_key.to_owned(),
                }
                .into());
            }
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> VulnsyncError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty, compact)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// Jira 연결 설정
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JiraConfig {
    /// Jira 인스턴스 URL (예: `https://acme.atlassian.net`)
    pub base_url: String,
    /// 티켓을 생성할 프로젝트 키
    pub project_key: String,
    /// 추적용 에픽 키
    pub epic_key: String,
    /// API 사용자 이메일
    pub api_email: String,
    /// API 토큰
    pub api_token: String,
    /// 생성할 티켓의 이슈 타입 이름
    pub issue_type: String,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// 자식 티켓 검색 페이지 크기
    pub page_size: u32,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            project_key: String::new(),
            epic_key: String::new(),
            api_email: String::new(),
            api_token: String::new(),
            issue_type: "Code Task".to_owned(),
            request_timeout_secs: 30,
            page_size: 100,
        }
    }
}

// api_token이 로그에 노출되지 않도록 Debug를 직접 구현
impl std::fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraConfig")
            .field("base_url", &self.base_url)
            .field("project_key", &self.project_key)
            .field("epic_key", &self.epic_key)
            .field("api_email", &self.api_email)
            .field("api_token", &"<redacted>")
            .field("issue_type", &self.issue_type)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("page_size", &self.page_size)
            .finish()
    }
}

/// 스캐너 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// 출력 형식 계열 (auto, classic, berry, modern)
    ///
    /// `auto`이면 스캐너 버전에서 계열을 결정합니다.
    pub format: String,
    /// 스캐너 실행 파일
    pub command: String,
    /// 스캐너를 실행할 디렉토리
    pub working_dir: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            format: "auto".to_owned(),
            command: "yarn".to_owned(),
            working_dir: ".".to_owned(),
        }
    }
}

/// 추적 저장소 / 템플릿 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// 추적 저장소 파일 경로
    pub store_path: String,
    /// 이슈 설명 템플릿 경로 (비어 있으면 내장 템플릿 사용)
    pub template_path: String,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            store_path: "./vulnerabilities-tracked.json".to_owned(),
            template_path: String::new(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u32 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
