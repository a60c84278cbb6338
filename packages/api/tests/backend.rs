//! Integration tests for the backend client against a mock HTTP server.
//!
//! Each test mounts the endpoints it touches on a fresh `MockServer` and
//! drives `ApiClient` end to end: request shape, auth header, status mapping
//! and response decoding.

use api::{ApiClient, ApiError, CardDraft, FetchOptions, MarkRead, NewBoard, RegisterForm};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn authed(server: &MockServer) -> ApiClient {
    ApiClient::new(server.uri()).with_token(Some("tok".to_string()))
}

fn board_json(id: i64, owner: i64) -> serde_json::Value {
    json!({
        "id": id,
        "name": "Roadmap",
        "description": "Q3 plans",
        "userId": owner,
        "members": [{"id": owner, "firstName": "Ada", "lastName": "Lovelace", "email": "ada@example.com"}],
        "tags": [{"id": 1, "name": "infra"}],
        "isPublic": false
    })
}

#[tokio::test]
async fn test_login_returns_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"email": "ada@example.com", "password": "hunter22"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "usuario": {"id": 7, "firstName": "Ada", "lastName": "Lovelace", "email": "ada@example.com"},
            "access_token": "access-1",
            "refresh_token": "refresh-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let session = client.login(" ada@example.com ", "hunter22").await.unwrap();

    assert!(session.is_authenticated());
    assert_eq!(session.user_id(), Some(7));
    assert_eq!(session.access_token.as_deref(), Some("access-1"));
    assert_eq!(session.refresh_token.as_deref(), Some("refresh-1"));
}

#[tokio::test]
async fn test_login_rejected_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid credentials"})),
        )
        .mount(&server)
        .await;

    let err = ApiClient::new(server.uri())
        .login("ada@example.com", "wrongpass")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "Invalid credentials"));
}

#[tokio::test]
async fn test_register_validates_locally() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let form = RegisterForm {
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        email: "ada@example.com".into(),
        password: "hunter22".into(),
        confirm_password: "hunter23".into(),
    };
    let err = ApiClient::new(server.uri()).register(&form).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn test_restore_session_refreshes_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(header("authorization", "Bearer refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "access-2"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", "Bearer access-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "usuario": {"id": 7, "firstName": "Ada", "email": "ada@example.com"}
        })))
        .mount(&server)
        .await;

    let stale = store::AuthSession::new(
        store::User {
            id: 7,
            ..Default::default()
        },
        "access-1".into(),
        Some("refresh-1".into()),
    );
    let restored = ApiClient::new(server.uri())
        .restore_session(&stale)
        .await
        .unwrap();

    assert_eq!(restored.access_token.as_deref(), Some("access-2"));
    assert_eq!(restored.refresh_token.as_deref(), Some("refresh-1"));
    assert_eq!(restored.user.unwrap().first_name, "Ada");
}

#[tokio::test]
async fn test_protected_call_without_token() {
    let server = MockServer::start().await;
    let err = ApiClient::new(server.uri()).my_boards().await.unwrap_err();
    assert!(matches!(err, ApiError::MissingToken));
    assert!(err.is_token_expired());
}

#[tokio::test]
async fn test_my_boards_sends_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/board/getMyBoards"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([board_json(3, 7)])))
        .expect(1)
        .mount(&server)
        .await;

    let boards = authed(&server).await.my_boards().await.unwrap();
    assert_eq!(boards.len(), 1);
    assert!(boards[0].is_owned_by(7));
    assert_eq!(boards[0].tags[0].name, "infra");
}

#[tokio::test]
async fn test_create_board_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/board/createBoard"))
        .and(body_string_contains("name=\"name\""))
        .and(body_string_contains("Roadmap"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"board": board_json(9, 7)})))
        .expect(1)
        .mount(&server)
        .await;

    let board = NewBoard {
        name: "Roadmap".into(),
        description: "Q3 plans".into(),
        ..Default::default()
    };
    let created = authed(&server).await.create_board(board).await.unwrap();
    assert_eq!(created.map(|b| b.id), Some(9));
}

#[tokio::test]
async fn test_delete_board_forbidden_message() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/board/deleteBoard/3"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"error": "nope"})))
        .mount(&server)
        .await;

    let err = authed(&server).await.delete_board(3).await.unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(ref m) if m == "Only the creator can delete this board"));
}

#[tokio::test]
async fn test_find_user_by_email_exact_match() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/board/users/search"))
        .and(query_param("q", "grace@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "users": [
                {"id": 1, "email": "grace@example.com.au"},
                {"id": 2, "email": "Grace@Example.com"}
            ]
        })))
        .mount(&server)
        .await;

    let user = authed(&server)
        .await
        .find_user_by_email("grace@example.com")
        .await
        .unwrap();
    assert_eq!(user.map(|u| u.id), Some(2));
}

#[tokio::test]
async fn test_find_or_create_tag_creates_on_404() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tag/by-name/bug"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Tag not found"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/tag"))
        .and(body_json(json!({"name": "bug"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"tag": {"id": 4, "name": "bug"}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = authed(&server).await;
    assert!(client.tag_by_name("bug").await.unwrap().is_none());
    let tag = client.find_or_create_tag("bug").await.unwrap();
    assert_eq!(tag.id, 4);
}

#[tokio::test]
async fn test_load_board_cards_tolerates_member_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/card/getCards/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 10, "title": "Design", "state": "In Progress", "responsableId": 7},
            {"id": 11, "title": "Build", "state": "Pending"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/card/getMembers/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 7, "email": "ada@example.com"}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/card/getMembers/11"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let members = vec![store::User {
        id: 7,
        first_name: "Ada".into(),
        ..Default::default()
    }];
    let cards = authed(&server)
        .await
        .load_board_cards(3, &members)
        .await
        .unwrap();

    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].members.len(), 1);
    assert_eq!(cards[0].responsible.as_ref().map(|m| m.first_name.as_str()), Some("Ada"));
    assert!(cards[1].members.is_empty());
    assert!(cards[1].responsible.is_none());
}

#[tokio::test]
async fn test_create_card_posts_draft() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/card/createCard"))
        .and(body_string_contains("\"title\":\"Write docs\""))
        .and(body_string_contains("\"boardId\":3"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"message": "created"})))
        .expect(1)
        .mount(&server)
        .await;

    let draft = CardDraft::new(3, "Write docs");
    authed(&server).await.create_card(&draft).await.unwrap();
}

#[tokio::test]
async fn test_fetch_notifications_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/realtime/notifications"))
        .and(query_param("limit", "20"))
        .and(query_param("offset", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "notifications": [
                {"id": "n1", "type": "CARD_ASSIGNED", "title": "Assigned", "message": "Card #4", "read": false}
            ],
            "meta": {"total_count": 21, "unread_count": 1, "limit": 20, "offset": 20}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = authed(&server)
        .await
        .fetch_notifications(FetchOptions::page(20, 20))
        .await
        .unwrap();
    assert_eq!(page.notifications.len(), 1);
    assert_eq!(page.meta.total_count, 21);
    assert_eq!(page.meta.unread_count, 1);
}

#[tokio::test]
async fn test_mark_read_empty_ids_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/realtime/notifications/mark-read"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = authed(&server)
        .await
        .mark_read(&MarkRead::Ids(Vec::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn test_mark_all_read() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/realtime/notifications/mark-read"))
        .and(body_json(json!({"all": true})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"updated_count": 3, "unread_count": 0})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = authed(&server).await.mark_read(&MarkRead::All).await.unwrap();
    assert_eq!(response.updated_count, 3);
    assert_eq!(response.unread_count, 0);
}

#[tokio::test]
async fn test_channel_authorization_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pusher/auth"))
        .and(header("authorization", "Bearer tok"))
        .and(body_string_contains("socket_id=1.2"))
        .and(body_string_contains("channel_name=private-user-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"auth": "key:sig"})))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = format!("{}/pusher/auth", server.uri());
    let auth = authed(&server)
        .await
        .authorize_channel(&endpoint, "1.2", "private-user-7")
        .await
        .unwrap();
    assert_eq!(auth, "key:sig");
}
