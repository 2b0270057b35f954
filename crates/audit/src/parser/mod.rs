//! 스캐너 출력 파서 -- 형식 계열별 라인 디코더와 레지스트리
//!
//! [`AuditLineDecoder`] trait은 각 형식 계열의 디코더가 구현해야 하는 인터페이스입니다.
//! [`AuditParser`]는 계열 → 디코더 조회 테이블을 가지고, 출력 스트림을 라인 단위로
//! 디코딩하여 [`VulnerabilityRecord`] 목록을 만듭니다.
//!
//! # 지원 형식
//!
//! - `classic` (yarn 1.x) -- [`ClassicDecoder`]
//! - `berry` (yarn 2.x-3.x) -- [`BerryDecoder`]
//! - `modern` (yarn 4+) -- [`ModernDecoder`]
//!
//! # 관용적 파싱
//!
//! 스캐너는 진행 상황 라인과 데이터 라인을 섞어서 출력하며 구분자가 없습니다.
//! 디코더는 라인마다 `Option`을 반환하고, 파서는 `None`을 집계만 한 뒤 버립니다.
//!
//! # 확장
//!
//! 새로운 형식을 지원하려면 `AuditLineDecoder`를 구현하고
//! [`AuditParser::register`]로 등록합니다.

pub mod berry;
pub mod classic;
pub mod modern;

pub use berry::BerryDecoder;
pub use classic::ClassicDecoder;
pub use modern::ModernDecoder;

use std::collections::HashMap;

use metrics::counter;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

use vulnsync_core::metrics::{
    AUDIT_LINES_SKIPPED_TOTAL, AUDIT_LINES_TOTAL, AUDIT_RECORDS_TOTAL, LABEL_FORMAT,
};
use vulnsync_core::types::VulnerabilityRecord;

use crate::error::AuditError;
use crate::format::FormatFamily;

/// 라인 디코더 trait
///
/// 한 형식 계열의 출력 라인 하나를 [`VulnerabilityRecord`]로 변환합니다.
/// 구조적으로 디코딩할 수 없거나 취약점 라인이 아니면 `None`을 반환합니다.
pub trait AuditLineDecoder: Send + Sync {
    /// 이 디코더가 담당하는 형식 계열을 반환합니다.
    fn family(&self) -> FormatFamily;

    /// 출력 라인 하나를 디코딩합니다.
    fn decode(&self, line: &str) -> Option<VulnerabilityRecord>;
}

/// 한 번의 파싱 결과
#[derive(Debug, Clone, Serialize)]
pub struct ParseOutcome {
    /// 사용한 형식 계열
    pub family: FormatFamily,
    /// 정규화된 레코드 (입력 순서, ID 중복 제거됨)
    pub records: Vec<VulnerabilityRecord>,
    /// 비어 있지 않은 입력 라인 수
    pub lines_total: usize,
    /// 디코딩되지 않아 건너뛴 라인 수
    pub lines_skipped: usize,
    /// 같은 ID의 뒤 레코드로 덮어쓴 횟수
    pub duplicates_replaced: usize,
}

/// 스캐너 출력 파서
///
/// 형식 계열별 디코더 조회 테이블입니다.
/// [`AuditParser::new`]는 내장 디코더 세 개를 모두 등록합니다.
pub struct AuditParser {
    decoders: HashMap<FormatFamily, Box<dyn AuditLineDecoder>>,
}

impl AuditParser {
    /// 내장 디코더가 등록된 파서를 생성합니다.
    pub fn new() -> Self {
        let mut parser = Self::empty();
        parser.register(Box::new(ClassicDecoder));
        parser.register(Box::new(BerryDecoder));
        parser.register(Box::new(ModernDecoder));
        parser
    }

    /// 디코더가 하나도 없는 파서를 생성합니다.
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// 디코더를 등록합니다. 같은 계열의 기존 디코더는 교체되어 반환됩니다.
    pub fn register(
        &mut self,
        decoder: Box<dyn AuditLineDecoder>,
    ) -> Option<Box<dyn AuditLineDecoder>> {
        self.decoders.insert(decoder.family(), decoder)
    }

    /// 등록된 계열 목록을 반환합니다 (정렬 없음).
    pub fn families(&self) -> Vec<FormatFamily> {
        self.decoders.keys().copied().collect()
    }

    /// 계열에 대응하는 디코더를 조회합니다.
    ///
    /// 등록되지 않은 계열은 [`AuditError::UnknownFormat`]입니다.
    pub fn decoder(&self, family: FormatFamily) -> Result<&dyn AuditLineDecoder, AuditError> {
        self.decoders
            .get(&family)
            .map(|d| d.as_ref())
            .ok_or_else(|| AuditError::UnknownFormat(family.to_string()))
    }

    /// 라인 스트림을 파싱합니다.
    ///
    /// - 출력 순서는 입력 순서를 따릅니다.
    /// - 같은 ID가 다시 나오면 나중 레코드가 이깁니다. 위치는 처음 나온 자리를 유지합니다.
    /// - 디코딩에 실패한 라인은 건너뜁니다.
    ///
    /// # Errors
    ///
    /// 계열에 등록된 디코더가 없으면 라인을 하나도 읽지 않고 실패합니다.
    pub fn parse_lines<I, S>(&self, family: FormatFamily, lines: I) -> Result<ParseOutcome, AuditError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let decoder = self.decoder(family)?;

        let mut records: Vec<VulnerabilityRecord> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut lines_total = 0usize;
        let mut lines_skipped = 0usize;
        let mut duplicates_replaced = 0usize;

        for line in lines {
            let line = line.as_ref().trim();
            if line.is_empty() {
                continue;
            }
            lines_total += 1;

            let Some(record) = decoder.decode(line) else {
                trace!(format = %family, "skipping non-vulnerability line");
                lines_skipped += 1;
                continue;
            };

            match positions.get(&record.id) {
                Some(&pos) => {
                    debug!(vuln_id = %record.id, "duplicate advisory id, keeping later occurrence");
                    records[pos] = record;
                    duplicates_replaced += 1;
                }
                None => {
                    positions.insert(record.id.clone(), records.len());
                    records.push(record);
                }
            }
        }

        let label = family.as_str();
        counter!(AUDIT_LINES_TOTAL, LABEL_FORMAT => label).increment(lines_total as u64);
        counter!(AUDIT_LINES_SKIPPED_TOTAL, LABEL_FORMAT => label).increment(lines_skipped as u64);
        counter!(AUDIT_RECORDS_TOTAL, LABEL_FORMAT => label).increment(records.len() as u64);

        debug!(
            format = %family,
            lines = lines_total,
            skipped = lines_skipped,
            records = records.len(),
            duplicates = duplicates_replaced,
            "parsed scanner output"
        );

        Ok(ParseOutcome {
            family,
            records,
            lines_total,
            lines_skipped,
            duplicates_replaced,
        })
    }

    /// 전체 출력 텍스트를 파싱합니다.
    pub fn parse_str(&self, family: FormatFamily, text: &str) -> Result<ParseOutcome, AuditError> {
        self.parse_lines(family, text.lines())
    }
}

impl Default for AuditParser {
    fn default() -> Self {
        Self::new()
    }
}

// --- 디코더 공용 헬퍼 ---

/// 문자열 또는 숫자 ID를 문자열로 정규화합니다. 비어 있으면 `None`.
pub(crate) fn id_to_string(value: &Value) -> Option<String> {
    let id = match value {
        Value::String(s) => s.trim().to_owned(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!id.is_empty()).then_some(id)
}

/// 비어 있지 않은 문자열만 남깁니다.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}
