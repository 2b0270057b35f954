#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`store`]: 추적 저장소 (`TrackingStore`)
//! - [`engine`]: 조정 엔진 (`ReconciliationEngine`, `plan_drift`, `plan_creations`)
//! - [`report`]: 실행 보고서 (`SyncReport`, `StatusReport`)

pub mod engine;
pub mod report;
pub mod store;

// --- Public API Re-exports ---

pub use engine::{
    ADOPTED_KEY_PREFIX, CreationPlan, DriftPlan, ReconciliationEngine, adopted_key, plan_creations,
    plan_drift,
};
pub use report::{
    CreatedTicket, DropReason, DroppedEntry, EntryStatus, FailedCreation, PlannedTicket,
    StatusReport, SyncReport,
};
pub use store::TrackingStore;
