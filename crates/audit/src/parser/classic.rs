//! yarn 1.x `yarn audit --json` 디코더
//!
//! [`ClassicDecoder`]는 advisory 봉투 라인을 디코딩합니다.
//!
//! # 라인 형식 예시
//!
//! ```json
//! {"type":"auditAdvisory","data":{"resolution":{"id":1065,"path":"app>lodash"},
//!  "advisory":{"id":1065,"module_name":"lodash","title":"Prototype Pollution",
//!  "url":"https://npmjs.com/advisories/1065","severity":"high",
//!  "vulnerable_versions":"<4.17.19",
//!  "findings":[{"version":"4.17.15","paths":["app>lodash"]}]}}}
//! ```
//!
//! 봉투 없이 `{"advisory": {...}, "findings": [...]}` 형태로 온 라인도 받으며,
//! `findings`는 `advisory` 안쪽이나 바깥쪽 어디에 있어도 됩니다.
//! `auditSummary` 등 다른 `type`의 라인은 건너뜁니다.

use serde::Deserialize;
use serde_json::Value;

use vulnsync_core::types::VulnerabilityRecord;

use crate::format::FormatFamily;
use crate::parser::{AuditLineDecoder, id_to_string, non_empty};

/// 봉투 `type` 중 취약점 라인을 나타내는 값
const ADVISORY_LINE_TYPE: &str = "auditAdvisory";

/// yarn 1.x 디코더
pub struct ClassicDecoder;

/// advisory 본문 (파싱용)
#[derive(Deserialize)]
struct AdvisoryBody {
    advisory: Advisory,
    #[serde(default)]
    findings: Option<Vec<Finding>>,
}

/// advisory (파싱용)
#[derive(Deserialize)]
struct Advisory {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    module_name: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    vulnerable_versions: Option<String>,
    #[serde(default)]
    findings: Option<Vec<Finding>>,
}

/// 설치된 버전별 발견 항목 (파싱용)
#[derive(Deserialize)]
struct Finding {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    paths: Option<Vec<String>>,
}

impl AuditLineDecoder for ClassicDecoder {
    fn family(&self) -> FormatFamily {
        FormatFamily::Classic
    }

    fn decode(&self, line: &str) -> Option<VulnerabilityRecord> {
        let value: Value = serde_json::from_str(line).ok()?;
        let body = advisory_body(value)?;
        let body: AdvisoryBody = serde_json::from_value(body).ok()?;

        let AdvisoryBody { advisory, findings } = body;
        let id = id_to_string(&advisory.id)?;

        // advisory 안쪽 findings가 우선, 없으면 바깥쪽
        let findings = advisory.findings.or(findings).unwrap_or_default();

        let affected_versions = findings
            .iter()
            .filter_map(|f| non_empty(f.version.clone()))
            .collect();
        let dependency_paths = findings
            .into_iter()
            .flat_map(|f| f.paths.unwrap_or_default())
            .filter(|p| !p.trim().is_empty())
            .collect();

        Some(VulnerabilityRecord {
            id,
            module_name: advisory.module_name.unwrap_or_default(),
            title: advisory.title.unwrap_or_default(),
            url: advisory.url.unwrap_or_default(),
            severity: advisory.severity.unwrap_or_default(),
            vulnerable_version_range: non_empty(advisory.vulnerable_versions),
            affected_versions,
            dependency_paths,
        })
    }
}

/// 라인에서 advisory 본문 객체를 꺼냅니다.
fn advisory_body(mut value: Value) -> Option<Value> {
    if value.get("advisory").is_some() {
        return Some(value);
    }

    let is_advisory_line = value
        .get("type")
        .and_then(Value::as_str)
        .is_some_and(|t| t == ADVISORY_LINE_TYPE);
    if !is_advisory_line {
        return None;
    }

    let data = value.get_mut("data")?.take();
    data.get("advisory").is_some().then_some(data)
}
