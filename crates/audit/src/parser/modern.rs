//! yarn 4+ `yarn npm audit -R --json` 디코더
//!
//! [`ModernDecoder`]는 berry와 같은 `{value, children}` 형태를 받지만
//! 필드 타입을 느슨하게 해석합니다.
//!
//! - `ID`: 문자열 또는 숫자
//! - `Tree Versions`, `Dependents`: 문자열 목록, 단일 문자열, 또는 `null`
//! - 목록 안의 문자열이 아닌 항목은 버립니다.

use serde_json::Value;

use vulnsync_core::types::VulnerabilityRecord;

use crate::format::FormatFamily;
use crate::parser::{AuditLineDecoder, id_to_string, non_empty};

/// yarn 4+ 디코더
pub struct ModernDecoder;

impl AuditLineDecoder for ModernDecoder {
    fn family(&self) -> FormatFamily {
        FormatFamily::Modern
    }

    fn decode(&self, line: &str) -> Option<VulnerabilityRecord> {
        let value: Value = serde_json::from_str(line).ok()?;
        let module_name = non_empty(value.get("value")?.as_str().map(str::to_owned))?;
        let children = value.get("children")?.as_object()?;

        let id = id_to_string(children.get("ID")?)?;
        let text = |key: &str| {
            children
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_owned)
        };

        Some(VulnerabilityRecord {
            id,
            module_name,
            title: text("Issue").unwrap_or_default(),
            url: text("URL").unwrap_or_default(),
            severity: text("Severity").unwrap_or_default(),
            vulnerable_version_range: non_empty(text("Vulnerable Versions")),
            affected_versions: string_list(children.get("Tree Versions")),
            dependency_paths: string_list(children.get("Dependents")),
        })
    }
}

/// 문자열, 문자열 목록, `null`을 목록으로 정규화합니다.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_owned)
            .collect(),
        _ => Vec::new(),
    }
}
