//! yarn 2.x-3.x `yarn npm audit -R --json` 디코더
//!
//! [`BerryDecoder`]는 평탄한 `{value, children}` 라인을 디코딩합니다.
//!
//! # 라인 형식 예시
//!
//! ```json
//! {"value":"minimist","children":{"ID":1179,"Issue":"Prototype Pollution in minimist",
//!  "URL":"https://github.com/advisories/GHSA-xvch-5gv4-984h","Severity":"critical",
//!  "Vulnerable Versions":"<0.2.4","Tree Versions":["0.0.8"],
//!  "Dependents":["mkdirp@npm:0.5.1"]}}
//! ```

use serde::Deserialize;
use serde_json::Value;

use vulnsync_core::types::VulnerabilityRecord;

use crate::format::FormatFamily;
use crate::parser::{AuditLineDecoder, id_to_string, non_empty};

/// yarn 2.x-3.x 디코더
pub struct BerryDecoder;

/// 최상위 라인 (파싱용)
#[derive(Deserialize)]
struct BerryLine {
    value: String,
    children: BerryChildren,
}

/// `children` 객체 (파싱용)
#[derive(Deserialize)]
struct BerryChildren {
    #[serde(rename = "ID", default)]
    id: Value,
    #[serde(rename = "Issue", default)]
    issue: Option<String>,
    #[serde(rename = "URL", default)]
    url: Option<String>,
    #[serde(rename = "Severity", default)]
    severity: Option<String>,
    #[serde(rename = "Vulnerable Versions", default)]
    vulnerable_versions: Option<String>,
    #[serde(rename = "Tree Versions", default)]
    tree_versions: Option<Vec<String>>,
    #[serde(rename = "Dependents", default)]
    dependents: Option<Vec<String>>,
}

impl AuditLineDecoder for BerryDecoder {
    fn family(&self) -> FormatFamily {
        FormatFamily::Berry
    }

    fn decode(&self, line: &str) -> Option<VulnerabilityRecord> {
        let parsed: BerryLine = serde_json::from_str(line).ok()?;
        let module_name = non_empty(Some(parsed.value))?;
        let children = parsed.children;
        let id = id_to_string(&children.id)?;

        Some(VulnerabilityRecord {
            id,
            module_name,
            title: children.issue.unwrap_or_default(),
            url: children.url.unwrap_or_default(),
            severity: children.severity.unwrap_or_default(),
            vulnerable_version_range: non_empty(children.vulnerable_versions),
            affected_versions: children.tree_versions.unwrap_or_default(),
            dependency_paths: children.dependents.unwrap_or_default(),
        })
    }
}
