#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`gateway`]: `IssueTracker` trait, `NewTicket`
//! - [`jira`]: Jira REST 구현 (`JiraClient`)
//! - [`severity`]: priority 매핑 (`to_priority`)
//! - [`template`]: 설명 템플릿 (`DescriptionTemplate`)
//! - [`composer`]: 티켓 작성기 (`TicketComposer`)

pub mod composer;
pub mod gateway;
pub mod jira;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
pub mod severity;
pub mod template;

// --- Public API Re-exports ---

pub use composer::TicketComposer;
pub use gateway::{IssueTracker, NewTicket};
pub use jira::JiraClient;
#[cfg(any(test, feature = "test-util"))]
pub use mock::{MockCall, MockIssueTracker};
pub use severity::to_priority;
pub use template::DescriptionTemplate;
