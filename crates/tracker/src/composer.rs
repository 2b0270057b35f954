//! 티켓 작성기
//!
//! [`TicketComposer`]는 취약점 레코드 하나로 [`NewTicket`] 요청을 만듭니다.
//!
//! - 요약: `[<심각도 대문자>] Vulnerability in <module_name>`
//! - 본문: [`DescriptionTemplate`] 렌더링 결과
//! - priority: [`to_priority`]
//! - 프로젝트, 에픽, 이슈 타입: 설정값

use vulnsync_core::config::JiraConfig;
use vulnsync_core::types::VulnerabilityRecord;

use crate::gateway::NewTicket;
use crate::severity::to_priority;
use crate::template::DescriptionTemplate;

/// 티켓 작성기
#[derive(Debug, Clone)]
pub struct TicketComposer {
    project_key: String,
    epic_key: String,
    issue_type: String,
    template: DescriptionTemplate,
}

impl TicketComposer {
    /// 작성기를 생성합니다.
    pub fn new(
        project_key: impl Into<String>,
        epic_key: impl Into<String>,
        issue_type: impl Into<String>,
        template: DescriptionTemplate,
    ) -> Self {
        Self {
            project_key: project_key.into(),
            epic_key: epic_key.into(),
            issue_type: issue_type.into(),
            template,
        }
    }

    /// Jira 설정과 템플릿으로 작성기를 생성합니다.
    pub fn from_config(config: &JiraConfig, template: DescriptionTemplate) -> Self {
        Self::new(
            config.project_key.clone(),
            config.epic_key.clone(),
            config.issue_type.clone(),
            template,
        )
    }

    /// 상위 에픽 키를 반환합니다.
    pub fn epic_key(&self) -> &str {
        &self.epic_key
    }

    /// 레코드로 티켓 요청을 작성합니다.
    pub fn compose(&self, record: &VulnerabilityRecord) -> NewTicket {
        NewTicket {
            project_key: self.project_key.clone(),
            epic_key: self.epic_key.clone(),
            issue_type: self.issue_type.clone(),
            summary: summary(record),
            description: self.template.render(record),
            priority: to_priority(&record.severity),
        }
    }
}

fn summary(record: &VulnerabilityRecord) -> String {
    format!(
        "[{}] Vulnerability in {}",
        record.severity.to_uppercase(),
        record.module_name
    )
}
