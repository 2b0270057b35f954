//! 스캐너 실행기 -- `yarn` 서브프로세스 호출
//!
//! [`ScannerRunner`]는 스캐너 버전을 감지하고, 형식 계열에 맞는 audit 명령을 실행하여
//! 표준 출력을 라인 목록으로 돌려줍니다.
//!
//! # 종료 코드
//!
//! audit 명령은 취약점이 발견되면 정상적인 경우에도 0이 아닌 코드로 종료합니다.
//! 따라서 종료 코드는 성공/실패 판단에 사용하지 않고 debug 로그로만 남깁니다.
//! 성공 여부는 출력 내용으로만 판단합니다.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use vulnsync_core::config::ScannerConfig;

use crate::error::AuditError;
use crate::format::{FormatFamily, resolve_configured};

/// 스캐너 서브프로세스 실행기
#[derive(Debug, Clone)]
pub struct ScannerRunner {
    /// 실행 파일 (예: `yarn`)
    command: String,
    /// 작업 디렉토리
    working_dir: PathBuf,
}

impl ScannerRunner {
    /// 실행기를 생성합니다.
    pub fn new(command: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            working_dir: working_dir.into(),
        }
    }

    /// 스캐너 설정에서 실행기를 생성합니다.
    pub fn from_config(config: &ScannerConfig) -> Self {
        Self::new(config.command.clone(), config.working_dir.clone())
    }

    /// 실행 파일 이름을 반환합니다.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// 작업 디렉토리를 반환합니다.
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// `<command> --version`을 실행하여 버전 문자열을 반환합니다.
    pub async fn detect_version(&self) -> Result<String, AuditError> {
        let output = Command::new(&self.command)
            .arg("--version")
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| AuditError::Spawn {
                command: format!("{} --version", self.command),
                source,
            })?;

        let version = String::from_utf8_lossy(&output.stdout).trim().to_owned();
        if !output.status.success() || version.is_empty() {
            return Err(AuditError::VersionDetect {
                version,
                reason: format!("'{} --version' exited with {}", self.command, output.status),
            });
        }

        info!(command = %self.command, version = %version, "detected scanner version");
        Ok(version)
    }

    /// 설정값(`auto` 또는 계열 이름)에서 형식 계열을 결정합니다.
    ///
    /// `auto`이면 스캐너 버전을 감지합니다.
    pub async fn resolve_family(&self, configured: &str) -> Result<FormatFamily, AuditError> {
        match resolve_configured(configured)? {
            Some(family) => Ok(family),
            None => {
                let version = self.detect_version().await?;
                FormatFamily::from_version(&version)
            }
        }
    }

    /// 계열에 맞는 audit 명령을 실행하고 표준 출력 라인을 반환합니다.
    ///
    /// 표준 에러 라인은 warn 로그로 남깁니다.
    pub async fn run_audit(&self, family: FormatFamily) -> Result<Vec<String>, AuditError> {
        let args = family.audit_args();
        let command_line = format!("{} {}", self.command, args.join(" "));
        info!(command = %command_line, dir = %self.working_dir.display(), "running scanner");

        let mut child = Command::new(&self.command)
            .args(args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| AuditError::Spawn {
                command: command_line.clone(),
                source,
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let stderr_task = tokio::spawn(async move {
            if let Some(stderr) = stderr {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    if !line.trim().is_empty() {
                        warn!(line = %line, "scanner stderr");
                    }
                }
            }
        });

        let lines = match stdout {
            Some(stdout) => read_lines(stdout).await.map_err(|source| AuditError::Io {
                path: "<scanner stdout>".to_owned(),
                source,
            })?,
            None => Vec::new(),
        };

        let status = child.wait().await.map_err(|source| AuditError::Spawn {
            command: command_line.clone(),
            source,
        })?;
        if let Err(e) = stderr_task.await {
            debug!(error = %e, "stderr reader task ended abnormally");
        }

        debug!(
            command = %command_line,
            status = %status,
            lines = lines.len(),
            "scanner exited (exit code is not authoritative)"
        );

        Ok(lines)
    }
}

/// 비동기 리더에서 모든 라인을 읽습니다.
///
/// 라인 단위로 디코딩하며, UTF-8이 아닌 바이트는 대체 문자로 바꿉니다.
pub async fn read_lines<R>(reader: R) -> std::io::Result<Vec<String>>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut collected = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        collected.push(String::from_utf8_lossy(&buf).into_owned());
    }
    Ok(collected)
}

/// 캡처된 audit 출력을 읽습니다. 경로가 `-`이면 표준 입력을 읽습니다.
pub async fn read_captured(path: &Path) -> Result<Vec<String>, AuditError> {
    let label = path.display().to_string();
    if label == "-" {
        return read_lines(tokio::io::stdin())
            .await
            .map_err(|source| AuditError::Io {
                path: label,
                source,
            });
    }

    let file = tokio::fs::File::open(path)
        .await
        .map_err(|source| AuditError::Io {
            path: label.clone(),
            source,
        })?;
    read_lines(file)
        .await
        .map_err(|source| AuditError::Io {
            path: label,
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_lines_splits_on_newlines() {
        let input: &[u8] = b"first\nsecond\r\n\nthird";
        let lines = read_lines(input).await.unwrap();
        assert_eq!(lines, vec!["first", "second", "", "third"]);
    }

    #[tokio::test]
    async fn read_lines_keeps_going_after_invalid_utf8() {
        let input: &[u8] = b"\xff\xfe progress\n{\"type\":\"auditAdvisory\"}\n";
        let lines = read_lines(input).await.unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" progress"));
        assert_eq!(lines[1], r#"{"type":"auditAdvisory"}"#);
    }

    #[tokio::test]
    async fn read_captured_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        std::fs::write(&path, "a\nb\n").unwrap();
        let lines = read_captured(&path).await.unwrap();
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn read_captured_missing_file_is_io_error() {
        let err = read_captured(Path::new("/nonexistent/audit.jsonl"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuditError::Io { .. }));
    }

    #[tokio::test]
    async fn resolve_family_uses_configured_value_without_spawning() {
        let runner = ScannerRunner::new("/nonexistent/scanner-binary", ".");
        let family = runner.resolve_family("yarn3").await.unwrap();
        assert_eq!(family, FormatFamily::Berry);
    }

    #[tokio::test]
    async fn resolve_family_rejects_unknown_value() {
        let runner = ScannerRunner::new("yarn", ".");
        let err = runner.resolve_family("pnpm").await.unwrap_err();
        assert!(matches!(err, AuditError::UnknownFormat(_)));
    }

    #[tokio::test]
    async fn detect_version_reports_missing_binary() {
        let runner = ScannerRunner::new("/nonexistent/scanner-binary", ".");
        let err = runner.detect_version().await.unwrap_err();
        assert!(matches!(err, AuditError::Spawn { .. }));
    }

    #[tokio::test]
    async fn run_audit_reports_missing_binary() {
        let runner = ScannerRunner::new("/nonexistent/scanner-binary", ".");
        let err = runner.run_audit(FormatFamily::Classic).await.unwrap_err();
        assert!(matches!(err, AuditError::Spawn { .. }));
    }

    #[test]
    fn from_config_copies_fields() {
        let config = ScannerConfig {
            format: "auto".to_owned(),
            command: "yarnpkg".to_owned(),
            working_dir: "/srv/app".to_owned(),
        };
        let runner = ScannerRunner::from_config(&config);
        assert_eq!(runner.command(), "yarnpkg");
        assert_eq!(runner.working_dir(), Path::new("/srv/app"));
    }
}
