//! 추적 저장소 -- 취약점 ID → 티켓 참조
//!
//! [`TrackingStore`]는 JSON 파일 하나에 영속화되는 정렬된 맵입니다.
//!
//! - 파일이 없으면 빈 저장소로 시작합니다.
//! - 형식이 잘못된 파일은 에러입니다. 빈 저장소로 덮어쓰지 않습니다.
//! - 저장은 같은 디렉토리의 임시 파일에 쓴 뒤 rename으로 전체를 교체합니다.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use vulnsync_core::error::StoreError;
use vulnsync_core::types::TrackedEntry;

/// 파일에 기록되는 엔트리 값
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    #[serde(default)]
    module_name: String,
    #[serde(rename = "ticketKey")]
    ticket_key: String,
}

/// 추적 저장소
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackingStore {
    entries: BTreeMap<String, TrackedEntry>,
}

impl TrackingStore {
    /// 빈 저장소를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 엔트리 목록으로 저장소를 생성합니다. 같은 ID는 나중 것이 남습니다.
    pub fn from_entries(entries: impl IntoIterator<Item = TrackedEntry>) -> Self {
        let mut store = Self::new();
        for entry in entries {
            store.insert(entry);
        }
        store
    }

    /// 엔트리 수
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 취약점 ID가 추적 중인지 확인합니다.
    pub fn contains(&self, vulnerability_id: &str) -> bool {
        self.entries.contains_key(vulnerability_id)
    }

    /// 취약점 ID로 엔트리를 조회합니다.
    pub fn get(&self, vulnerability_id: &str) -> Option<&TrackedEntry> {
        self.entries.get(vulnerability_id)
    }

    /// 엔트리를 추가합니다. 같은 ID의 이전 엔트리를 반환합니다.
    pub fn insert(&mut self, entry: TrackedEntry) -> Option<TrackedEntry> {
        self.entries.insert(entry.vulnerability_id.clone(), entry)
    }

    /// 엔트리를 제거합니다.
    pub fn remove(&mut self, vulnerability_id: &str) -> Option<TrackedEntry> {
        self.entries.remove(vulnerability_id)
    }

    /// ID 순서로 엔트리를 순회합니다.
    pub fn entries(&self) -> impl Iterator<Item = &TrackedEntry> {
        self.entries.values()
    }

    /// 티켓 키를 참조하는 엔트리가 있는지 확인합니다.
    pub fn references_ticket(&self, ticket_key: &str) -> bool {
        self.entries.values().any(|e| e.ticket_key == ticket_key)
    }

    /// 파일에서 저장소를 읽습니다. 파일이 없으면 빈 저장소입니다.
    ///
    /// # Errors
    ///
    /// - 읽기 실패: `StoreError::Io`
    /// - JSON 형식 오류: `StoreError::Malformed`
    pub async fn load(path: &Path) -> Result<Self, StoreError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "tracking store not found, starting empty");
                return Ok(Self::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.display().to_string(),
                    source,
                });
            }
        };

        let store = Self::from_json(&content).map_err(|reason| StoreError::Malformed {
            path: path.display().to_string(),
            reason,
        })?;
        debug!(path = %path.display(), entries = store.len(), "tracking store loaded");
        Ok(store)
    }

    /// 저장소 전체를 파일에 기록합니다.
    ///
    /// # Errors
    ///
    /// 임시 파일 쓰기나 rename이 실패하면 `StoreError::Io`를 반환합니다.
    /// 실패해도 기존 파일은 그대로 남습니다.
    pub async fn save(&self, path: &Path) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: path.display().to_string(),
            source,
        };

        let json = self.to_json();
        let tmp = temp_path(path);
        if let Err(source) = tokio::fs::write(&tmp, json.as_bytes()).await {
            return Err(io_err(source));
        }
        if let Err(source) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_err(source));
        }

        debug!(path = %path.display(), entries = self.len(), "tracking store saved");
        Ok(())
    }

    /// 파일 형식의 JSON 문자열로 변환합니다 (들여쓰기 2칸, 키 정렬).
    pub fn to_json(&self) -> String {
        let map: BTreeMap<&str, StoredEntry> = self
            .entries
            .iter()
            .map(|(id, e)| {
                (
                    id.as_str(),
                    StoredEntry {
                        module_name: e.module_name.clone(),
                        ticket_key: e.ticket_key.clone(),
                    },
                )
            })
            .collect();
        // 문자열 키 맵의 직렬화는 실패하지 않습니다.
        let mut json = serde_json::to_string_pretty(&map).unwrap_or_else(|_| "{}".to_owned());
        json.push('\n');
        json
    }

    /// 파일 형식의 JSON 문자열을 해석합니다.
    pub fn from_json(content: &str) -> Result<Self, String> {
        if content.trim().is_empty() {
            return Ok(Self::new());
        }
        let map: BTreeMap<String, StoredEntry> =
            serde_json::from_str(content).map_err(|e| e.to_string())?;
        Ok(Self::from_entries(map.into_iter().map(|(id, stored)| {
            TrackedEntry::new(id, stored.module_name, stored.ticket_key)
        })))
    }
}

/// 대상 파일과 같은 디렉토리의 임시 파일 경로
fn temp_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "store".to_owned());
    path.with_file_name(format!(".{file_name}.{}.tmp", uuid::Uuid::new_v4()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TrackingStore {
        TrackingStore::from_entries([
            TrackedEntry::new("GHSA-b", "qs", "SEC-2"),
            TrackedEntry::new("GHSA-a", "lodash", "SEC-1"),
        ])
    }

    #[test]
    fn json_uses_legacy_field_names_and_sorted_keys() {
        let json = sample().to_json();
        let a = json.find("GHSA-a").unwrap();
        let b = json.find("GHSA-b").unwrap();
        assert!(a < b);
        assert!(json.contains(r#""ticketKey": "SEC-1""#));
        assert!(json.contains(r#""module_name": "lodash""#));
        assert!(json.starts_with("{\n  \"GHSA-a\""));
    }

    #[test]
    fn from_json_reads_legacy_file() {
        let content = r#"{
  "1065": { "module_name": "lodash", "ticketKey": "SEC-7" },
  "adopted:SEC-9": { "module_name": "[HIGH] Vulnerability in qs", "ticketKey": "SEC-9" }
}"#;
        let store = TrackingStore::from_json(content).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("1065").unwrap().ticket_key, "SEC-7");
        assert!(store.references_ticket("SEC-9"));
    }

    #[test]
    fn from_json_rejects_malformed() {
        assert!(TrackingStore::from_json("[1, 2]").is_err());
        assert!(TrackingStore::from_json(r#"{"x": {"module_name": "a"}}"#).is_err());
        assert!(TrackingStore::from_json("{not json").is_err());
    }

    #[test]
    fn blank_file_is_empty_store() {
        assert!(TrackingStore::from_json("  \n").unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vulnerabilities-tracked.json");
        let store = sample();
        store.save(&path).await.unwrap();
        let loaded = TrackingStore::load(&path).await.unwrap();
        assert_eq!(loaded, store);

        // 임시 파일이 남지 않아야 함
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[tokio::test]
    async fn load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = TrackingStore::load(&dir.path().join("absent.json"))
            .await
            .unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn load_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{\"GHSA-1\": 42}").unwrap();
        let err = TrackingStore::load(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));
    }

    #[tokio::test]
    async fn save_into_missing_directory_fails_without_side_effects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("store.json");
        let err = sample().save(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }
}
