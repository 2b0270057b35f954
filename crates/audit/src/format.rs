//! 스캐너 출력 형식 계열
//!
//! [`FormatFamily`]는 스캐너 버전군마다 다른 출력 형태를 식별합니다.
//! 계열은 설정에서 직접 지정하거나(`classic`, `berry`, `modern`)
//! `yarn --version` 출력에서 결정합니다(`auto`).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AuditError;

/// 스캐너 출력 형식 계열
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatFamily {
    /// yarn 1.x -- `auditAdvisory` 봉투 안의 중첩 advisory
    Classic,
    /// yarn 2.x-3.x -- 평탄한 `{value, children}` 형태
    Berry,
    /// yarn 4+ -- `{value, children}` 형태, 숫자 ID와 단일 문자열 목록 허용
    Modern,
}

impl fmt::Display for FormatFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FormatFamily {
    /// 모든 알려진 계열
    pub const ALL: [FormatFamily; 3] = [Self::Classic, Self::Berry, Self::Modern];

    /// 계열의 정식 이름을 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Berry => "berry",
            Self::Modern => "modern",
        }
    }

    /// 문자열에서 계열을 파싱합니다 (대소문자 구분 없음, 별칭 허용).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classic" | "yarn1" | "v1" => Some(Self::Classic),
            "berry" | "yarn2" | "yarn3" => Some(Self::Berry),
            "modern" | "yarn4" => Some(Self::Modern),
            _ => None,
        }
    }

    /// 스캐너 버전 문자열에서 계열을 결정합니다.
    ///
    /// - 1.x → `Classic`
    /// - 2.x, 3.x → `Berry`
    /// - 4.x 이상 → `Modern`
    ///
    /// 프리릴리스 접미어(`4.0.0-rc.1`)와 앞의 `v`는 허용합니다.
    pub fn from_version(version: &str) -> Result<Self, AuditError> {
        let trimmed = version.trim();
        let cleaned = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let parsed = semver::Version::parse(cleaned).map_err(|e| AuditError::VersionDetect {
            version: trimmed.to_owned(),
            reason: e.to_string(),
        })?;

        match parsed.major {
            0 => Err(AuditError::VersionDetect {
                version: trimmed.to_owned(),
                reason: "pre-1.0 scanner versions are not supported".to_owned(),
            }),
            1 => Ok(Self::Classic),
            2 | 3 => Ok(Self::Berry),
            _ => Ok(Self::Modern),
        }
    }

    /// 이 계열의 audit 명령 인자를 반환합니다.
    pub fn audit_args(&self) -> &'static [&'static str] {
        match self {
            Self::Classic => &["audit", "--json"],
            Self::Berry | Self::Modern => &["npm", "audit", "-R", "--json"],
        }
    }
}

/// 설정값에서 형식 선택을 해석합니다.
///
/// `auto`이면 `None`(버전 감지 필요), 알려진 계열이면 `Some`,
/// 그 밖의 값은 [`AuditError::UnknownFormat`]입니다.
pub fn resolve_configured(value: &str) -> Result<Option<FormatFamily>, AuditError> {
    if value.trim().eq_ignore_ascii_case("auto") {
        return Ok(None);
    }
    FormatFamily::from_str_loose(value)
        .map(Some)
        .ok_or_else(|| AuditError::UnknownFormat(value.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_loose_accepts_aliases() {
        assert_eq!(FormatFamily::from_str_loose("Classic"), Some(FormatFamily::Classic));
        assert_eq!(FormatFamily::from_str_loose("yarn1"), Some(FormatFamily::Classic));
        assert_eq!(FormatFamily::from_str_loose("YARN3"), Some(FormatFamily::Berry));
        assert_eq!(FormatFamily::from_str_loose(" modern "), Some(FormatFamily::Modern));
        assert_eq!(FormatFamily::from_str_loose("pnpm"), None);
    }

    #[test]
    fn from_version_maps_major_versions() {
        assert_eq!(FormatFamily::from_version("1.22.19").unwrap(), FormatFamily::Classic);
        assert_eq!(FormatFamily::from_version("2.4.3").unwrap(), FormatFamily::Berry);
        assert_eq!(FormatFamily::from_version("3.6.4\n").unwrap(), FormatFamily::Berry);
        assert_eq!(FormatFamily::from_version("4.1.0").unwrap(), FormatFamily::Modern);
        assert_eq!(FormatFamily::from_version("5.0.0").unwrap(), FormatFamily::Modern);
    }

    #[test]
    fn from_version_accepts_prerelease_and_v_prefix() {
        assert_eq!(
            FormatFamily::from_version("4.0.0-rc.53").unwrap(),
            FormatFamily::Modern
        );
        assert_eq!(FormatFamily::from_version("v1.22.0").unwrap(), FormatFamily::Classic);
    }

    #[test]
    fn from_version_rejects_garbage() {
        let err = FormatFamily::from_version("command not found").unwrap_err();
        assert!(matches!(err, AuditError::VersionDetect { .. }));
    }

    #[test]
    fn from_version_rejects_zero_major() {
        assert!(FormatFamily::from_version("0.27.5").is_err());
    }

    #[test]
    fn audit_args_differ_between_classic_and_berry() {
        assert_eq!(FormatFamily::Classic.audit_args(), &["audit", "--json"]);
        assert_eq!(
            FormatFamily::Modern.audit_args(),
            &["npm", "audit", "-R", "--json"]
        );
    }

    #[test]
    fn resolve_configured_handles_auto_and_unknown() {
        assert_eq!(resolve_configured("auto").unwrap(), None);
        assert_eq!(resolve_configured("AUTO").unwrap(), None);
        assert_eq!(
            resolve_configured("berry").unwrap(),
            Some(FormatFamily::Berry)
        );
        assert!(matches!(
            resolve_configured("npm7"),
            Err(AuditError::UnknownFormat(_))
        ));
    }

    #[test]
    fn display_matches_as_str() {
        for family in FormatFamily::ALL {
            assert_eq!(family.to_string(), family.as_str());
        }
    }
}
