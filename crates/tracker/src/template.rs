//! 티켓 설명 템플릿
//!
//! `{{ name }}` 형식의 플레이스홀더를 취약점 레코드 필드로 치환합니다.
//! 중괄호 안의 앞뒤 공백은 무시합니다. 알 수 없는 이름(`{{}}` 포함)이나 빈 값은 `N/A`가 됩니다.
//!
//! # 사용 가능한 이름
//!
//! | 이름 | 값 |
//! |---|---|
//! | `id`, `module_name`, `title`, `url`, `severity` | 레코드 필드 그대로 |
//! | `vulnerable_version_range` | 버전 범위 |
//! | `affected_versions`, `dependency_paths` | `", "`로 연결 |
//! | `affected_versions_lines`, `dependency_paths_lines` | 줄바꿈으로 연결 |
//! | `issue`, `vulnerable_versions`, `tree_versions`, `dependents` | 이전 템플릿 호환 별칭 |

use std::path::Path;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use vulnsync_core::error::ConfigError;
use vulnsync_core::types::VulnerabilityRecord;

/// 값이 없을 때 사용하는 문자열
pub const MISSING_VALUE: &str = "N/A";

/// 템플릿 경로가 설정되지 않았을 때 사용하는 기본 템플릿
pub const DEFAULT_TEMPLATE: &str = "\
**Issue ID**: {{ id }}
**Issue**: {{ title }}
**Severity**: {{ severity }}
**URL**: [{{ url }}]({{ url }})
**Vulnerable Versions**: {{ vulnerable_version_range }}
**Tree Versions**: {{ affected_versions }}
**Dependents**: {{ dependency_paths }}

Please address this issue as soon as possible.
";

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER
        .get_or_init(|| Regex::new(r"\{\{(.*?)\}\}").expect("valid placeholder regex"))
}

/// 설명 템플릿
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionTemplate {
    source: String,
}

impl DescriptionTemplate {
    /// 문자열로부터 템플릿을 생성합니다.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// 템플릿 경로를 읽습니다. 경로가 비어 있으면 기본 템플릿을 사용합니다.
    ///
    /// # Errors
    ///
    /// 파일을 읽을 수 없으면 `ConfigError::Template`을 반환합니다.
    pub async fn load(path: &str) -> Result<Self, ConfigError> {
        if path.trim().is_empty() {
            return Ok(Self::default());
        }

        let source = tokio::fs::read_to_string(Path::new(path))
            .await
            .map_err(|e| ConfigError::Template {
                path: path.to_owned(),
                reason: e.to_string(),
            })?;
        Ok(Self::new(source))
    }

    /// 원본 템플릿 문자열을 반환합니다.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// 레코드로 템플릿을 치환합니다.
    pub fn render(&self, record: &VulnerabilityRecord) -> String {
        placeholder()
            .replace_all(&self.source, |caps: &Captures<'_>| {
                let value = lookup(record, caps[1].trim());
                if value.trim().is_empty() {
                    MISSING_VALUE.to_owned()
                } else {
                    value
                }
            })
            .into_owned()
    }
}

impl Default for DescriptionTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

/// 플레이스홀더 이름에 해당하는 값을 찾습니다. 알 수 없는 이름은 빈 문자열입니다.
fn lookup(record: &VulnerabilityRecord, name: &str) -> String {
    match name {
        "id" => record.id.clone(),
        "module_name" => record.module_name.clone(),
        "title" | "issue" => record.title.clone(),
        "url" => record.url.clone(),
        "severity" => record.severity.clone(),
        "vulnerable_version_range" | "vulnerable_versions" => {
            record.vulnerable_version_range.clone().unwrap_or_default()
        }
        "affected_versions" | "tree_versions" => record.affected_versions.join(", "),
        "dependency_paths" | "dependents" => record.dependency_paths.join(", "),
        "affected_versions_lines" => record.affected_versions.join("\n"),
        "dependency_paths_lines" => record.dependency_paths.join("\n"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> VulnerabilityRecord {
        VulnerabilityRecord {
            id: "GHSA-1".to_owned(),
            module_name: "lodash".to_owned(),
            title: "Prototype Pollution".to_owned(),
            url: "https://github.com/advisories/GHSA-1".to_owned(),
            severity: "moderate".to_owned(),
            vulnerable_version_range: None,
            affected_versions: vec!["4.17.15".to_owned(), "4.17.11".to_owned()],
            dependency_paths: Vec::new(),
        }
    }

    #[test]
    fn renders_fields_and_lists() {
        let template = DescriptionTemplate::new("{{id}} / {{ module_name }} / {{  affected_versions }}");
        assert_eq!(template.render(&record()), "GHSA-1 / lodash / 4.17.15, 4.17.11");
    }

    #[test]
    fn empty_and_unknown_become_na() {
        let template =
            DescriptionTemplate::new("{{ vulnerable_version_range }}|{{ dependency_paths }}|{{ nope }}");
        assert_eq!(template.render(&record()), "N/A|N/A|N/A");
    }

    #[test]
    fn unrecognised_placeholder_text_becomes_na() {
        let template =
            DescriptionTemplate::new("A={{ Vulnerable Versions }} B={{}} C={{ tree-versions }} D={{ id }}");
        assert_eq!(template.render(&record()), "A=N/A B=N/A C=N/A D=GHSA-1");
    }

    #[test]
    fn legacy_aliases_resolve() {
        let template = DescriptionTemplate::new("{{issue}}; {{tree_versions}}; {{ dependents }}");
        assert_eq!(
            template.render(&record()),
            "Prototype Pollution; 4.17.15, 4.17.11; N/A"
        );
    }

    #[test]
    fn line_variants_join_with_newlines() {
        let template = DescriptionTemplate::new("{{ affected_versions_lines }}");
        assert_eq!(template.render(&record()), "4.17.15\n4.17.11");
    }

    #[test]
    fn text_without_placeholders_is_unchanged() {
        let template = DescriptionTemplate::new("single { brace } and {{ not closed");
        assert_eq!(template.render(&record()), "single { brace } and {{ not closed");
    }

    #[test]
    fn default_template_mentions_every_section() {
        let rendered = DescriptionTemplate::default().render(&record());
        assert!(rendered.contains("**Issue ID**: GHSA-1"));
        assert!(rendered.contains("**Vulnerable Versions**: N/A"));
        assert!(rendered.contains("**Tree Versions**: 4.17.15, 4.17.11"));
        assert!(rendered.contains("**Dependents**: N/A"));
    }

    #[tokio::test]
    async fn load_empty_path_uses_default() {
        let template = DescriptionTemplate::load("").await.unwrap();
        assert_eq!(template.source(), DEFAULT_TEMPLATE);
    }

    #[tokio::test]
    async fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ticket.md");
        std::fs::write(&path, "Advisory {{ id }}").unwrap();
        let template = DescriptionTemplate::load(path.to_str().unwrap()).await.unwrap();
        assert_eq!(template.render(&record()), "Advisory GHSA-1");
    }

    #[tokio::test]
    async fn load_missing_file_is_config_error() {
        let err = DescriptionTemplate::load("/nonexistent/ticket.md")
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::Template { .. }));
    }
}
