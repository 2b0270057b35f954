#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: 도메인 에러 (`AuditError`)
//! - [`format`]: 형식 계열 (`FormatFamily`)과 버전 감지 규칙
//! - [`parser`]: 라인 디코더 (`AuditLineDecoder` trait, `AuditParser` 레지스트리)
//! - [`runner`]: 스캐너 서브프로세스 실행 (`ScannerRunner`)
//!
//! # Architecture
//!
//! ```text
//! yarn --version --> FormatFamily::from_version
//!                           |
//! yarn audit ... --> Vec<String> --> AuditParser --> ParseOutcome { records, ... }
//! ```

pub mod error;
pub mod format;
pub mod parser;
pub mod runner;

// --- Public API Re-exports ---

pub use error::AuditError;
pub use format::FormatFamily;
pub use parser::{AuditLineDecoder, AuditParser, BerryDecoder, ClassicDecoder, ModernDecoder, ParseOutcome};
pub use runner::{ScannerRunner, read_captured};
