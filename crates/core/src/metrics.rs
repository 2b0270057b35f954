//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `vulnsync_`
//! - 컴포넌트명: `audit_`, `tracker_`, `reconcile_`
//! - 접미어: `_total` (counter)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(vulnsync_core::metrics::AUDIT_LINES_SKIPPED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 형식 계열 레이블 키 (classic, berry, modern)
pub const LABEL_FORMAT: &str = "format";

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

/// 제거 사유 레이블 키 (missing, closed, detached)
pub const LABEL_REASON: &str = "reason";

// ─── Audit 메트릭 ───────────────────────────────────────────────────

/// Audit: 읽은 출력 라인 수 (counter, label: format)
pub const AUDIT_LINES_TOTAL: &str = "vulnsync_audit_lines_total";

/// Audit: 건너뛴 라인 수 (counter, label: format)
pub const AUDIT_LINES_SKIPPED_TOTAL: &str = "vulnsync_audit_lines_skipped_total";

/// Audit: 정규화된 취약점 레코드 수 (counter, label: format)
pub const AUDIT_RECORDS_TOTAL: &str = "vulnsync_audit_records_total";

// ─── Tracker 메트릭 ─────────────────────────────────────────────────

/// Tracker: 티켓 생성 시도 수 (counter, label: result)
pub const TRACKER_TICKETS_CREATED_TOTAL: &str = "vulnsync_tracker_tickets_created_total";

/// Tracker: 원격 호출 실패 수 (counter)
pub const TRACKER_REQUEST_FAILURES_TOTAL: &str = "vulnsync_tracker_request_failures_total";

// ─── Reconcile 메트릭 ───────────────────────────────────────────────

/// Reconcile: 드리프트로 제거된 엔트리 수 (counter, label: reason)
pub const RECONCILE_ENTRIES_DROPPED_TOTAL: &str = "vulnsync_reconcile_entries_dropped_total";

/// Reconcile: 에픽에서 채택된 티켓 수 (counter)
pub const RECONCILE_ENTRIES_ADOPTED_TOTAL: &str = "vulnsync_reconcile_entries_adopted_total";

/// Reconcile: 저장소 영속화 횟수 (counter)
pub const RECONCILE_STORE_WRITES_TOTAL: &str = "vulnsync_reconcile_store_writes_total";

/// 모든 메트릭의 설명을 등록합니다.
///
/// 레코더 설치 직후 한 번 호출합니다. 레코더가 없으면 아무 효과가 없습니다.
pub fn describe_all() {
    use metrics::describe_counter;

    describe_counter!(AUDIT_LINES_TOTAL, "Scanner output lines read");
    describe_counter!(
        AUDIT_LINES_SKIPPED_TOTAL,
        "Scanner output lines that did not decode to a vulnerability"
    );
    describe_counter!(AUDIT_RECORDS_TOTAL, "Vulnerability records produced");
    describe_counter!(
        TRACKER_TICKETS_CREATED_TOTAL,
        "Ticket creation attempts by result"
    );
    describe_counter!(
        TRACKER_REQUEST_FAILURES_TOTAL,
        "Failed issue tracker requests"
    );
    describe_counter!(
        RECONCILE_ENTRIES_DROPPED_TOTAL,
        "Tracked entries dropped by drift correction"
    );
    describe_counter!(
        RECONCILE_ENTRIES_ADOPTED_TOTAL,
        "Untracked epic children adopted into the store"
    );
    describe_counter!(RECONCILE_STORE_WRITES_TOTAL, "Tracking store writes");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names_follow_convention() {
        let names = [
            AUDIT_LINES_TOTAL,
            AUDIT_LINES_SKIPPED_TOTAL,
            AUDIT_RECORDS_TOTAL,
            TRACKER_TICKETS_CREATED_TOTAL,
            TRACKER_REQUEST_FAILURES_TOTAL,
            RECONCILE_ENTRIES_DROPPED_TOTAL,
            RECONCILE_ENTRIES_ADOPTED_TOTAL,
            RECONCILE_STORE_WRITES_TOTAL,
        ];
        for name in names {
            assert!(name.starts_with("vulnsync_"), "{name}");
            assert!(name.ends_with("_total"), "{name}");
        }
    }

    #[test]
    fn describe_all_without_recorder_is_noop() {
        describe_all();
    }
}
