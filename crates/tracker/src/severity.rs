//! 스캐너 심각도 → Jira priority 이름 매핑
//!
//! | 입력 (대소문자 무시) | 출력 |
//! |---|---|
//! | `info` | `Minor` |
//! | `moderate` | `Medium` |
//! | 그 외 | 첫 글자만 대문자로, 나머지는 그대로 |

/// 심각도 문자열을 priority 이름으로 변환합니다.
///
/// 빈 문자열은 빈 문자열로 변환됩니다.
pub fn to_priority(severity: &str) -> String {
    if severity.eq_ignore_ascii_case("info") {
        return "Minor".to_owned();
    }
    if severity.eq_ignore_ascii_case("moderate") {
        return "Medium".to_owned();
    }

    let mut chars = severity.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
