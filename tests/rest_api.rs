//! Integration tests for the REST layer against a mock HTTP server:
//! session install, list-shape tolerance, the single automatic
//! refresh-and-retry on 401, and cache invalidation on mutations.

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use workhub_client::config::Config;
use workhub_client::errors::ClientError;
use workhub_client::models::document::CreateDocumentRequest;
use workhub_client::models::user::{AuthTokens, LoginRequest, RegisterRequest};
use workhub_client::WorkspaceClient;

fn client_for(server: &MockServer) -> WorkspaceClient {
    let config = Config {
        api_base_url: server.uri(),
        ws_base_url: "ws://localhost:1".into(),
        request_timeout_secs: 5,
    };
    WorkspaceClient::new(config).expect("client builds")
}

fn resumed_client(server: &MockServer) -> WorkspaceClient {
    let client = client_for(server);
    client.session().resume(AuthTokens {
        access: "acc-1".into(),
        refresh: "ref-1".into(),
    });
    client
}

fn user_json() -> serde_json::Value {
    json!({
        "id": "u1",
        "email": "alice@example.com",
        "username": "alice",
        "first_name": "Alice",
        "last_name": "A",
    })
}

fn workspace_json(id: &str, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "owner": user_json(),
        "created_at": "2026-08-01T10:00:00Z",
        "updated_at": "2026-08-01T10:00:00Z",
    })
}

fn document_json(id: &str, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "workspace": "w1",
        "title": title,
        "created_by": user_json(),
        "created_at": "2026-08-01T10:00:00Z",
        "updated_at": "2026-08-01T10:00:00Z",
    })
}

fn notification_json(id: &str, is_read: bool) -> serde_json::Value {
    json!({
        "id": id,
        "user": "u1",
        "type": "workspace_invite",
        "title": "Invited",
        "message": "You were invited",
        "is_read": is_read,
        "created_at": "2026-08-01T10:00:00Z",
        "updated_at": "2026-08-01T10:00:00Z",
    })
}

// ── Auth ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_installs_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .and(body_json(json!({"email": "alice@example.com", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": user_json(),
            "access": "acc-1",
            "refresh": "ref-1",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(!client.session().is_authenticated());

    let user = client
        .auth()
        .login(&LoginRequest {
            email: "alice@example.com".into(),
            password: "pw".into(),
        })
        .await
        .unwrap();

    assert_eq!(user.username, "alice");
    assert!(client.session().is_authenticated());
    assert_eq!(client.session().access_token().as_deref(), Some("acc-1"));
    assert_eq!(client.session().refresh_token().as_deref(), Some("ref-1"));
}

#[tokio::test]
async fn test_register_unwraps_tokens_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "data": {
                "user": user_json(),
                "tokens": {"access": "acc-r", "refresh": "ref-r"},
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .auth()
        .register(&RegisterRequest {
            email: "alice@example.com".into(),
            username: "alice".into(),
            password: "pw".into(),
            password_confirm: "pw".into(),
            first_name: None,
            last_name: None,
        })
        .await
        .unwrap();

    assert_eq!(client.session().access_token().as_deref(), Some("acc-r"));
}

#[tokio::test]
async fn test_logout_clears_session_even_if_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = resumed_client(&server);
    let result = client.auth().logout().await;
    assert!(result.is_err());
    assert!(!client.session().is_authenticated());
}

// ── Token refresh ─────────────────────────────────────────────

#[tokio::test]
async fn test_401_triggers_one_refresh_and_retry() {
    let server = MockServer::start().await;

    // First call is rejected, the retry with the refreshed token succeeds.
    Mock::given(method("GET"))
        .and(path("/api/auth/profile/"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/profile/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/token/refresh/"))
        .and(body_json(json!({"refresh": "ref-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "acc-2"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = resumed_client(&server);
    let user = client.auth().profile().await.unwrap();

    assert_eq!(user.id, "u1");
    assert_eq!(
        client.session().access_token().as_deref(),
        Some("acc-2"),
        "refreshed access token is stored"
    );
}

#[tokio::test]
async fn test_refresh_failure_clears_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/profile/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/token/refresh/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "expired"})))
        .mount(&server)
        .await;

    let client = resumed_client(&server);
    let logged_out = client.session().watch_authenticated();

    let err = client.auth().profile().await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));
    assert!(!client.session().is_authenticated());
    assert!(!*logged_out.borrow(), "embedder can observe the forced logout");
}

#[tokio::test]
async fn test_at_most_one_refresh_per_request() {
    let server = MockServer::start().await;

    // The server keeps rejecting even the refreshed token.
    Mock::given(method("GET"))
        .and(path("/api/auth/profile/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2) // original + exactly one retry
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "acc-2"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = resumed_client(&server);
    let err = client.auth().profile().await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::UnexpectedStatus { status, .. } if status.as_u16() == 401
    ));
}

// ── List shapes ───────────────────────────────────────────────

#[tokio::test]
async fn test_list_tolerates_bare_array() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/workspaces/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([workspace_json("w1", "Acme")])),
        )
        .mount(&server)
        .await;

    let client = resumed_client(&server);
    let workspaces = client.workspaces().list().await.unwrap();
    assert_eq!(workspaces.len(), 1);
    assert_eq!(workspaces[0].name, "Acme");
}

#[tokio::test]
async fn test_list_tolerates_paginated_results_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/workspaces/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "next": null,
            "previous": null,
            "results": [workspace_json("w1", "Acme"), workspace_json("w2", "Beta")],
        })))
        .mount(&server)
        .await;

    let client = resumed_client(&server);
    let workspaces = client.workspaces().list().await.unwrap();
    assert_eq!(workspaces.len(), 2);
    assert_eq!(workspaces[1].id, "w2");
}

#[tokio::test]
async fn test_list_tolerates_data_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notifications/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [notification_json("n1", false)],
        })))
        .mount(&server)
        .await;

    let client = resumed_client(&server);
    let items = client
        .notifications()
        .list(Default::default())
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
    assert!(!items[0].is_read);
}

// ── Cache behavior ────────────────────────────────────────────

#[tokio::test]
async fn test_list_is_served_from_cache_until_invalidated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notifications/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([notification_json("n1", false)])),
        )
        .expect(2) // initial fetch + refetch after mark_read
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/notifications/n1/mark_read/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = resumed_client(&server);
    let notifications = client.notifications();

    notifications.list(Default::default()).await.unwrap();
    // Second read is a cache hit, no extra request.
    notifications.list(Default::default()).await.unwrap();

    notifications.mark_read("n1").await.unwrap();
    // Mutation invalidated the partition; this read re-fetches.
    notifications.list(Default::default()).await.unwrap();
}

#[tokio::test]
async fn test_unread_count_accepts_object_and_bare_number() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notifications/unread_count/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 4})))
        .mount(&server)
        .await;

    let client = resumed_client(&server);
    assert_eq!(client.notifications().unread_count().await.unwrap(), 4);

    let server2 = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notifications/unread_count/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(7)))
        .mount(&server2)
        .await;

    let client2 = resumed_client(&server2);
    assert_eq!(client2.notifications().unread_count().await.unwrap(), 7);
}

#[tokio::test]
async fn test_workspace_mutation_invalidates_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/workspaces/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([workspace_json("w1", "Acme")])),
        )
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/workspaces/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "data": workspace_json("w2", "Beta"),
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = resumed_client(&server);
    let workspaces = client.workspaces();

    workspaces.list().await.unwrap();
    let created = workspaces
        .create(&workhub_client::models::workspace::CreateWorkspaceRequest {
            name: "Beta".into(),
            description: None,
            icon: None,
            icon_color: None,
            is_public: None,
            settings: None,
        })
        .await
        .unwrap();
    assert_eq!(created.id, "w2");

    // Invalidated by the create; hits the server again.
    workspaces.list().await.unwrap();
}

#[tokio::test]
async fn test_document_create_seeds_cache_for_immediate_get() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/documents/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(document_json("d1", "Notes")))
        .expect(1)
        .mount(&server)
        .await;
    // No GET mock mounted: a cache miss on the follow-up read would hit the
    // server, 404, and fail the test.

    let client = resumed_client(&server);
    let created = client
        .documents()
        .create(&CreateDocumentRequest {
            workspace: "w1".into(),
            board: None,
            title: Some("Notes".into()),
            icon: None,
            parent_document: None,
        })
        .await
        .unwrap();
    assert_eq!(created.id, "d1");

    let fetched = client.documents().get("d1").await.unwrap();
    assert_eq!(fetched.title, "Notes");
}

#[tokio::test]
async fn test_request_without_session_fails_without_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/workspaces/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.workspaces().list().await.unwrap_err();
    assert!(matches!(err, ClientError::NotAuthenticated));
}
