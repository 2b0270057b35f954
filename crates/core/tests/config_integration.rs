//! vulnsync.toml 통합 설정 테스트
//!
//! - vulnsync.toml.example 파싱 테스트
//! - 환경변수 우선순위 테스트
//! - 파일 로딩 / 잘못된 형식 에러 테스트

use vulnsync_core::config::VulnsyncConfig;
use vulnsync_core::error::{ConfigError, VulnsyncError};

/// 환경변수를 설정한 상태로 클로저를 실행한 뒤 원래 값을 복원합니다.
fn with_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
    let originals: Vec<(String, Option<String>)> = vars
        .iter()
        .map(|(key, _)| ((*key).to_owned(), std::env::var(key).ok()))
        .collect();

    // SAFETY: 테스트는 serial_test로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        for (key, value) in vars {
            std::env::set_var(key, value);
        }
    }

    let result = f();

    // SAFETY: 테스트 정리
    unsafe {
        for (key, original) in originals {
            match original {
                Some(val) => std::env::set_var(&key, val),
                None => std::env::remove_var(&key),
            }
        }
    }

    result
}

// =============================================================================
// vulnsync.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_successfully() {
    let content = include_str!("../../../vulnsync.toml.example");
    let config = VulnsyncConfig::parse(content).expect("example config should parse");

    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.jira.project_key, "SEC");
    assert_eq!(config.jira.epic_key, "SEC-1");
    assert_eq!(config.scanner.format, "auto");
    assert_eq!(config.tracking.store_path, "./vulnerabilities-tracked.json");
}

#[test]
fn example_config_passes_validation() {
    let content = include_str!("../../../vulnsync.toml.example");
    let config = VulnsyncConfig::parse(content).expect("should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

#[test]
fn example_config_requires_token_for_tracker() {
    let content = include_str!("../../../vulnsync.toml.example");
    let config = VulnsyncConfig::parse(content).expect("should parse");
    let err = config.validate_tracker().unwrap_err();
    assert!(err.to_string().contains("jira.api_token"));
}

// =============================================================================
// 환경변수 우선순위 테스트
// =============================================================================

#[test]
#[serial_test::serial]
fn env_override_takes_precedence_over_toml() {
    let toml = r#"
[jira]
epic_key = "SEC-1"
"#;

    let config = with_env(&[("VULNSYNC_JIRA_EPIC_KEY", "SEC-99")], || {
        let mut config = VulnsyncConfig::parse(toml).expect("should parse");
        config.apply_env_overrides();
        config
    });

    assert_eq!(config.jira.epic_key, "SEC-99");
}

#[test]
#[serial_test::serial]
fn env_only_config_satisfies_tracker_validation() {
    let config = with_env(
        &[
            ("VULNSYNC_JIRA_BASE_URL", "https://acme.atlassian.net"),
            ("VULNSYNC_JIRA_PROJECT_KEY", "SEC"),
            ("VULNSYNC_JIRA_EPIC_KEY", "SEC-1"),
            ("VULNSYNC_JIRA_API_EMAIL", "bot@acme.io"),
            ("VULNSYNC_JIRA_API_TOKEN", "token"),
        ],
        VulnsyncConfig::from_env,
    )
    .expect("env config should validate");

    config.validate_tracker().expect("all tracker settings set");
    assert_eq!(config.jira.base_url, "https://acme.atlassian.net");
}

#[test]
#[serial_test::serial]
fn invalid_numeric_env_override_keeps_original() {
    let config = with_env(&[("VULNSYNC_JIRA_PAGE_SIZE", "lots")], || {
        let mut config = VulnsyncConfig::default();
        config.apply_env_overrides();
        config
    });

    assert_eq!(config.jira.page_size, 100);
}

#[test]
#[serial_test::serial]
fn env_override_can_make_config_invalid() {
    let result = with_env(&[("VULNSYNC_SCANNER_FORMAT", "pnpm")], VulnsyncConfig::from_env);
    let err = result.unwrap_err();
    assert!(matches!(
        err,
        VulnsyncError::Config(ConfigError::InvalidValue { .. })
    ));
}

// =============================================================================
// 파일 로딩 테스트
// =============================================================================

#[tokio::test]
#[serial_test::serial]
async fn load_reads_file_from_disk() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("vulnsync.toml");
    std::fs::write(
        &path,
        "[tracking]\nstore_path = \"/tmp/tracked.json\"\n[scanner]\nformat = \"classic\"\n",
    )
    .expect("write config");

    let config = VulnsyncConfig::load(&path).await.expect("should load");
    assert_eq!(config.tracking.store_path, "/tmp/tracked.json");
    assert_eq!(config.scanner.format, "classic");
}

#[tokio::test]
async fn load_rejects_invalid_values_from_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("vulnsync.toml");
    std::fs::write(&path, "[general]\nlog_format = \"xml\"\n").expect("write config");

    let err = VulnsyncConfig::load(&path).await.unwrap_err();
    assert!(err.to_string().contains("general.log_format"));
}
