//! JiraClient HTTP 바인딩 테스트 (wiremock)

use serde_json::json;
use wiremock::matchers::{basic_auth, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vulnsync_core::config::JiraConfig;
use vulnsync_core::error::TrackerError;
use vulnsync_tracker::{IssueTracker, JiraClient, NewTicket};

fn client_for(server: &MockServer, page_size: u32) -> JiraClient {
    let config = JiraConfig {
        base_url: server.uri(),
        project_key: "SEC".to_owned(),
        epic_key: "SEC-1".to_owned(),
        api_email: "bot@example.com".to_owned(),
        api_token: "token-123".to_owned(),
        request_timeout_secs: 5,
        page_size,
        ..JiraConfig::default()
    };
    JiraClient::from_config(&config).unwrap()
}

fn ticket() -> NewTicket {
    NewTicket {
        project_key: "SEC".to_owned(),
        epic_key: "SEC-1".to_owned(),
        issue_type: "Code Task".to_owned(),
        summary: "[MODERATE] Vulnerability in minimist".to_owned(),
        description: "**Issue ID**: GHSA-1".to_owned(),
        priority: "Medium".to_owned(),
    }
}

#[tokio::test]
async fn create_ticket_posts_fields_and_returns_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/api/2/issue"))
        .and(basic_auth("bot@example.com", "token-123"))
        .and(body_partial_json(json!({
            "fields": {
                "project": { "key": "SEC" },
                "summary": "[MODERATE] Vulnerability in minimist",
                "issuetype": { "name": "Code Task" },
                "parent": { "key": "SEC-1" },
                "priority": { "name": "Medium" }
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "10042",
            "key": "SEC-42",
            "self": "https://jira.example.com/rest/api/2/issue/10042"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let key = client_for(&server, 100).create_ticket(&ticket()).await.unwrap();
    assert_eq!(key, "SEC-42");
}

#[tokio::test]
async fn create_ticket_maps_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/api/2/issue"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string(r#"{"errors":{"priority":"invalid"}}"#),
        )
        .mount(&server)
        .await;

    let err = client_for(&server, 100)
        .create_ticket(&ticket())
        .await
        .unwrap_err();
    match err {
        TrackerError::Http { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("priority"));
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}

#[tokio::test]
async fn create_ticket_rejects_undecodable_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/api/2/issue"))
        .respond_with(ResponseTemplate::new(201).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server, 100)
        .create_ticket(&ticket())
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::Decode(_)));
}

#[tokio::test]
async fn get_ticket_status_reads_status_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/2/issue/SEC-7"))
        .and(query_param("fields", "status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "key": "SEC-7",
            "fields": { "status": { "name": "In Progress" } }
        })))
        .mount(&server)
        .await;

    let status = client_for(&server, 100)
        .get_ticket_status("SEC-7")
        .await
        .unwrap();
    assert_eq!(status.as_deref(), Some("In Progress"));
}

#[tokio::test]
async fn get_ticket_status_maps_404_to_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/2/issue/SEC-404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "errorMessages": ["Issue does not exist or you do not have permission to see it."]
        })))
        .mount(&server)
        .await;

    let status = client_for(&server, 100)
        .get_ticket_status("SEC-404")
        .await
        .unwrap();
    assert_eq!(status, None);
}

#[tokio::test]
async fn get_ticket_status_server_error_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/2/issue/SEC-7"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server, 100)
        .get_ticket_status("SEC-7")
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::Http { status: 503, .. }));
}

fn issue(key: &str, status: &str) -> serde_json::Value {
    json!({
        "key": key,
        "fields": {
            "summary": format!("[HIGH] Vulnerability in {key}"),
            "status": { "name": status }
        }
    })
}

#[tokio::test]
async fn list_epic_children_pages_until_total() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/2/search"))
        .and(query_param("jql", "parent=SEC-1"))
        .and(query_param("fields", "key,summary,status"))
        .and(query_param("startAt", "0"))
        .and(query_param("maxResults", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "startAt": 0,
            "maxResults": 2,
            "total": 3,
            "issues": [issue("SEC-2", "To Do"), issue("SEC-3", "Done")]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/api/2/search"))
        .and(query_param("startAt", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "startAt": 2,
            "maxResults": 2,
            "total": 3,
            "issues": [issue("SEC-4", "In Progress")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let children = client_for(&server, 2)
        .list_epic_children("SEC-1")
        .await
        .unwrap();
    let keys: Vec<&str> = children.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys, vec!["SEC-2", "SEC-3", "SEC-4"]);
    assert!(children[1].is_terminal());
    assert_eq!(children[2].status, "In Progress");
}

#[tokio::test]
async fn list_epic_children_empty_epic() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/2/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "startAt": 0,
            "maxResults": 100,
            "total": 0,
            "issues": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let children = client_for(&server, 100)
        .list_epic_children("SEC-1")
        .await
        .unwrap();
    assert!(children.is_empty());
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let config = JiraConfig {
        base_url: "http://127.0.0.1:1".to_owned(),
        api_email: "bot@example.com".to_owned(),
        api_token: "token".to_owned(),
        request_timeout_secs: 2,
        ..JiraConfig::default()
    };
    let client = JiraClient::from_config(&config).unwrap();
    let err = client.list_epic_children("SEC-1").await.unwrap_err();
    assert!(matches!(err, TrackerError::Transport(_)));
}
