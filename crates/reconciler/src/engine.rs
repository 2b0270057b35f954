//! 조정 엔진 -- 드리프트 보정(Pass A)과 스캔 결과 반영(Pass B)
//!
//! 계획 단계([`plan_drift`], [`plan_creations`])는 입력만으로 결과가 정해지는 순수 함수이고,
//! [`ReconciliationEngine`]은 그 계획을 정해진 순서대로 원격 호출과 저장으로 실행합니다.
//!
//! # 실행 순서
//!
//! ```text
//! load store ─► list_epic_children ─► plan_drift ─► get_ticket_status (하위 목록에 없는 엔트리)
//!                                                          │
//!                                             persist (변경 시 1회)
//!                                                          │
//!                    plan_creations ─► create_ticket ─► persist (생성마다)
//! ```
//!
//! 모든 원격 호출은 하나씩 순서대로 await됩니다.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use metrics::counter;
use tracing::{debug, info, warn};
use uuid::Uuid;

use vulnsync_core::error::VulnsyncError;
use vulnsync_core::metrics::{
    LABEL_REASON, LABEL_RESULT, RECONCILE_ENTRIES_ADOPTED_TOTAL, RECONCILE_ENTRIES_DROPPED_TOTAL,
    RECONCILE_STORE_WRITES_TOTAL, TRACKER_TICKETS_CREATED_TOTAL,
};
use vulnsync_core::types::{RemoteIssue, TrackedEntry, VulnerabilityRecord, is_terminal_status};
use vulnsync_tracker::{IssueTracker, TicketComposer};

use crate::report::{
    CreatedTicket, DropReason, DroppedEntry, EntryStatus, FailedCreation, PlannedTicket,
    StatusReport, SyncReport,
};
use crate::store::TrackingStore;

/// 채택된 티켓의 합성 키 접두어
pub const ADOPTED_KEY_PREFIX: &str = "adopted:";

/// 채택된 티켓의 합성 키를 만듭니다 (예: `adopted:SEC-9`).
pub fn adopted_key(ticket_key: &str) -> String {
    format!("{ADOPTED_KEY_PREFIX}{ticket_key}")
}

/// Pass A 계획
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriftPlan {
    /// 하위 목록에 열린 상태로 있는 엔트리
    pub kept: Vec<TrackedEntry>,
    /// 하위 목록에 종료 상태로 있는 엔트리
    pub dropped: Vec<DroppedEntry>,
    /// 하위 목록에 없어 상태 확인이 필요한 엔트리
    pub unconfirmed: Vec<TrackedEntry>,
    /// 어떤 유지 엔트리도 참조하지 않는 열린 하위 티켓
    pub adopted: Vec<TrackedEntry>,
}

/// 저장소와 에픽 하위 목록으로 Pass A 계획을 세웁니다.
pub fn plan_drift(store: &TrackingStore, children: &[RemoteIssue]) -> DriftPlan {
    let by_key: HashMap<&str, &RemoteIssue> =
        children.iter().map(|c| (c.key.as_str(), c)).collect();

    let mut plan = DriftPlan::default();
    // 티켓 하나에는 엔트리 하나만 남습니다. 저장소는 ID 순서이므로 가장 작은 ID가 이깁니다.
    let mut claimed: HashSet<&str> = HashSet::new();
    for entry in store.entries() {
        let child = by_key.get(entry.ticket_key.as_str());
        if child.is_some_and(|c| c.is_terminal()) {
            plan.dropped.push(DroppedEntry {
                entry: entry.clone(),
                reason: DropReason::Closed,
            });
        } else if !claimed.insert(entry.ticket_key.as_str()) {
            plan.dropped.push(DroppedEntry {
                entry: entry.clone(),
                reason: DropReason::Duplicate,
            });
        } else if child.is_some() {
            plan.kept.push(entry.clone());
        } else {
            plan.unconfirmed.push(entry.clone());
        }
    }

    let mut referenced: HashSet<String> =
        plan.kept.iter().map(|e| e.ticket_key.clone()).collect();
    for child in children {
        if child.is_terminal() || !referenced.insert(child.key.clone()) {
            continue;
        }
        plan.adopted.push(TrackedEntry::new(
            adopted_key(&child.key),
            child.summary.clone(),
            child.key.clone(),
        ));
    }

    plan
}

/// Pass B 계획
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreationPlan<'r> {
    /// 티켓을 만들 레코드 (입력 순서)
    pub to_create: Vec<&'r VulnerabilityRecord>,
    /// 이미 추적 중인 레코드 수
    pub already_tracked: usize,
}

/// 저장소에 없는 레코드를 고릅니다.
///
/// 같은 ID가 반복되면 첫 등장 위치에 마지막 등장 레코드를 씁니다.
pub fn plan_creations<'r>(
    store: &TrackingStore,
    records: &'r [VulnerabilityRecord],
) -> CreationPlan<'r> {
    let mut plan = CreationPlan::default();
    let mut position: HashMap<&str, usize> = HashMap::new();
    for record in records {
        if store.contains(&record.id) {
            plan.already_tracked += 1;
            continue;
        }
        match position.get(record.id.as_str()) {
            Some(&index) => plan.to_create[index] = record,
            None => {
                position.insert(record.id.as_str(), plan.to_create.len());
                plan.to_create.push(record);
            }
        }
    }
    plan
}

/// 조정 엔진
pub struct ReconciliationEngine<T> {
    tracker: T,
    composer: TicketComposer,
    store_path: PathBuf,
}

impl<T: IssueTracker> ReconciliationEngine<T> {
    /// 엔진을 생성합니다.
    pub fn new(tracker: T, composer: TicketComposer, store_path: impl Into<PathBuf>) -> Self {
        Self {
            tracker,
            composer,
            store_path: store_path.into(),
        }
    }

    /// 이슈 트래커를 반환합니다.
    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    /// 저장소 파일 경로를 반환합니다.
    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// 동기화를 한 번 실행합니다.
    ///
    /// # Errors
    ///
    /// 저장소를 읽거나 쓸 수 없으면 실패합니다. 저장 실패 이후에는 원격 변경을 하지 않습니다.
    /// 원격 호출 실패는 에러가 아니며 보고서에 기록됩니다.
    pub async fn run(
        &self,
        records: &[VulnerabilityRecord],
        dry_run: bool,
    ) -> Result<SyncReport, VulnsyncError> {
        let run_id = Uuid::new_v4().to_string();
        info!(
            run_id = %run_id,
            epic_key = %self.composer.epic_key(),
            records = records.len(),
            dry_run,
            "reconciliation started"
        );

        let loaded = TrackingStore::load(&self.store_path).await?;
        let mut report = SyncReport {
            run_id: run_id.clone(),
            dry_run,
            ..SyncReport::default()
        };

        // Pass A
        let mut store = self.correct_drift(&loaded, &mut report).await;
        if store != loaded && !dry_run {
            self.persist(&store).await?;
        }

        // Pass B
        self.absorb(&mut store, records, &mut report).await?;

        info!(
            run_id = %run_id,
            kept = report.kept,
            dropped = report.dropped.len(),
            adopted = report.adopted.len(),
            already_tracked = report.already_tracked,
            created = report.created.len(),
            planned = report.planned.len(),
            failed = report.failed.len(),
            "reconciliation finished"
        );
        Ok(report)
    }

    /// 저장소와 에픽 하위 목록을 비교한 읽기 전용 보고서를 만듭니다.
    ///
    /// # Errors
    ///
    /// 저장소를 읽을 수 없거나 하위 목록 조회가 실패하면 에러를 반환합니다.
    pub async fn status(&self) -> Result<StatusReport, VulnsyncError> {
        let store = TrackingStore::load(&self.store_path).await?;
        let epic_key = self.composer.epic_key();
        let children = self.tracker.list_epic_children(epic_key).await?;

        let by_key: HashMap<&str, &RemoteIssue> =
            children.iter().map(|c| (c.key.as_str(), c)).collect();
        let entries = store
            .entries()
            .map(|entry| EntryStatus {
                entry: entry.clone(),
                remote_status: by_key
                    .get(entry.ticket_key.as_str())
                    .map(|c| c.status.clone()),
            })
            .collect();
        let untracked_children = children
            .iter()
            .filter(|c| !c.is_terminal() && !store.references_ticket(&c.key))
            .cloned()
            .collect();

        Ok(StatusReport {
            epic_key: epic_key.to_owned(),
            entries,
            untracked_children,
        })
    }

    /// Pass A: 드리프트를 보정한 저장소를 반환합니다.
    ///
    /// 하위 목록 조회가 실패하면 읽은 저장소를 그대로 반환합니다.
    async fn correct_drift(&self, loaded: &TrackingStore, report: &mut SyncReport) -> TrackingStore {
        let epic_key = self.composer.epic_key();
        let children = match self.tracker.list_epic_children(epic_key).await {
            Ok(children) => children,
            Err(e) => {
                warn!(
                    run_id = %report.run_id,
                    epic_key = %epic_key,
                    error = %e,
                    "failed to list epic children, skipping drift correction"
                );
                report.pass_a_skipped = true;
                report.kept = loaded.len();
                return loaded.clone();
            }
        };
        debug!(epic_key = %epic_key, children = children.len(), "epic children listed");

        let plan = plan_drift(loaded, &children);
        let mut kept = plan.kept;
        let mut dropped = plan.dropped;

        for entry in plan.unconfirmed {
            let status = self.tracker.get_ticket_status(&entry.ticket_key).await;
            match status {
                Ok(None) => dropped.push(DroppedEntry {
                    entry,
                    reason: DropReason::Missing,
                }),
                Ok(Some(status)) if is_terminal_status(&status) => dropped.push(DroppedEntry {
                    entry,
                    reason: DropReason::Closed,
                }),
                Ok(Some(status)) => {
                    debug!(ticket_key = %entry.ticket_key, status = %status, "ticket left the epic");
                    dropped.push(DroppedEntry {
                        entry,
                        reason: DropReason::Detached,
                    });
                }
                Err(e) => {
                    warn!(
                        run_id = %report.run_id,
                        vuln_id = %entry.vulnerability_id,
                        module = %entry.module_name,
                        ticket_key = %entry.ticket_key,
                        error = %e,
                        "ticket status check failed, keeping entry"
                    );
                    kept.push(entry);
                }
            }
        }

        for dropped_entry in &dropped {
            let entry = &dropped_entry.entry;
            info!(
                run_id = %report.run_id,
                vuln_id = %entry.vulnerability_id,
                module = %entry.module_name,
                ticket_key = %entry.ticket_key,
                reason = %dropped_entry.reason,
                "dropping tracked entry"
            );
            if !report.dry_run {
                counter!(RECONCILE_ENTRIES_DROPPED_TOTAL, LABEL_REASON => dropped_entry.reason.as_str())
                    .increment(1);
            }
        }
        for entry in &plan.adopted {
            info!(
                run_id = %report.run_id,
                vuln_id = %entry.vulnerability_id,
                ticket_key = %entry.ticket_key,
                "adopting untracked epic child"
            );
        }
        if !report.dry_run {
            counter!(RECONCILE_ENTRIES_ADOPTED_TOTAL).increment(plan.adopted.len() as u64);
        }

        report.kept = kept.len();
        report.dropped = dropped;
        report.adopted = plan.adopted.clone();

        TrackingStore::from_entries(kept.into_iter().chain(plan.adopted))
    }

    /// Pass B: 추적되지 않은 레코드마다 티켓을 만들고 저장합니다.
    async fn absorb(
        &self,
        store: &mut TrackingStore,
        records: &[VulnerabilityRecord],
        report: &mut SyncReport,
    ) -> Result<(), VulnsyncError> {
        let plan = plan_creations(store, records);
        report.already_tracked = plan.already_tracked;

        for record in plan.to_create {
            let ticket = self.composer.compose(record);

            if report.dry_run {
                info!(
                    run_id = %report.run_id,
                    vuln_id = %record.id,
                    module = %record.module_name,
                    summary = %ticket.summary,
                    "would create ticket"
                );
                report.planned.push(PlannedTicket {
                    vulnerability_id: record.id.clone(),
                    module_name: record.module_name.clone(),
                    summary: ticket.summary,
                    priority: ticket.priority,
                });
                continue;
            }

            match self.tracker.create_ticket(&ticket).await {
                Ok(ticket_key) => {
                    counter!(TRACKER_TICKETS_CREATED_TOTAL, LABEL_RESULT => "success").increment(1);
                    info!(
                        run_id = %report.run_id,
                        vuln_id = %record.id,
                        module = %record.module_name,
                        ticket_key = %ticket_key,
                        "ticket created"
                    );
                    store.insert(TrackedEntry::new(
                        record.id.clone(),
                        record.module_name.clone(),
                        ticket_key.clone(),
                    ));
                    self.persist(store).await?;
                    report.created.push(CreatedTicket {
                        vulnerability_id: record.id.clone(),
                        module_name: record.module_name.clone(),
                        ticket_key,
                    });
                }
                Err(e) => {
                    counter!(TRACKER_TICKETS_CREATED_TOTAL, LABEL_RESULT => "failure").increment(1);
                    warn!(
                        run_id = %report.run_id,
                        vuln_id = %record.id,
                        module = %record.module_name,
                        error = %e,
                        "ticket creation failed, will retry next run"
                    );
                    report.failed.push(FailedCreation {
                        vulnerability_id: record.id.clone(),
                        module_name: record.module_name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    async fn persist(&self, store: &TrackingStore) -> Result<(), VulnsyncError> {
        store.save(&self.store_path).await?;
        counter!(RECONCILE_STORE_WRITES_TOTAL).increment(1);
        Ok(())
    }
}
