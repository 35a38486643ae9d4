//! HTTP API integration tests.
//!
//! Tests for REST API endpoints (health check, room list, profiles) and the
//! `chat-messages` companion API.

mod fixtures;
use fixtures::{ALICE_TOKEN, BOB_TOKEN, TestServer};

use studyhall_server::domain::UserId;

fn chat_messages_url(server: &TestServer) -> String {
    format!("{}/functions/v1/chat-messages", server.base_url())
}

#[tokio::test]
async fn test_health_endpoint() {
    // テスト項目: /api/health エンドポイントが正常に動作する
    // given (前提条件):
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    // when (操作):
    let response = client
        .get(format!("{}/api/health", server.base_url()))
        .send()
        .await
        .expect("Failed to send request");

    // then (期待する結果):
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_rooms_list_endpoint() {
    // テスト項目: /api/rooms エンドポイントがルーム一覧を作成日時順に返す
    // given (前提条件):
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    // when (操作):
    let response = client
        .get(format!("{}/api/rooms", server.base_url()))
        .send()
        .await
        .expect("Failed to send request");

    // then (期待する結果):
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    let rooms = body.as_array().expect("Response should be an array");
    assert_eq!(rooms.len(), 4);
    assert_eq!(rooms[0]["id"], "general");
    assert_eq!(rooms[0]["name"], "General");
    assert!(rooms[0]["description"].is_string());
    assert!(rooms[0]["created_at"].is_string());
}

#[tokio::test]
async fn test_me_and_profile_endpoints() {
    // テスト項目: /api/me と /api/profiles/:id がプロフィールを返す
    // given (前提条件):
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    // when (操作):
    let me: serde_json::Value = client
        .get(format!("{}/api/me", server.base_url()))
        .bearer_auth(ALICE_TOKEN)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse JSON");
    let bob = client
        .get(format!("{}/api/profiles/bob", server.base_url()))
        .bearer_auth(ALICE_TOKEN)
        .send()
        .await
        .expect("Failed to send request");
    let missing = client
        .get(format!("{}/api/profiles/nobody", server.base_url()))
        .bearer_auth(ALICE_TOKEN)
        .send()
        .await
        .expect("Failed to send request");

    // then (期待する結果):
    assert_eq!(me["id"], "alice");
    assert_eq!(me["name"], "Alice");
    assert_eq!(bob.status(), 200);
    assert_eq!(missing.status(), 404);
}

#[tokio::test]
async fn test_post_message_returns_created() {
    // テスト項目: 有効なトークンで r1 に "hello" を POST すると 201 と採番済みメッセージが返る
    // given (前提条件):
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    // when (操作):
    let response = client
        .post(chat_messages_url(&server))
        .bearer_auth(ALICE_TOKEN)
        .json(&serde_json::json!({"room_id": "r1", "message": "hello"}))
        .send()
        .await
        .expect("Failed to send request");

    // then (期待する結果):
    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert!(body["id"].as_str().is_some_and(|id| id.len() == 36));
    assert_eq!(body["message"], "hello");
    assert_eq!(body["room_id"], "r1");
    assert_eq!(body["user_id"], "alice");
    assert_eq!(body["sender_name"], "Alice");
    assert_eq!(server.backend.messages.count().await, 1);
}

#[tokio::test]
async fn test_get_without_authorization_returns_401() {
    // テスト項目: Authorization ヘッダーなしの GET は 401
    // given (前提条件):
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    // when (操作):
    let response = client
        .get(format!("{}?room_id=r1", chat_messages_url(&server)))
        .send()
        .await
        .expect("Failed to send request");

    // then (期待する結果):
    assert_eq!(response.status(), 401);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn test_invalid_token_returns_401() {
    // テスト項目: 未発行のトークンは 401
    let server = TestServer::start().await;
    let response = reqwest::Client::new()
        .get(format!("{}?room_id=r1", chat_messages_url(&server)))
        .bearer_auth("forged-token")
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_missing_parameters_return_400() {
    // テスト項目: room_id や message が欠けている場合は 400
    // given (前提条件):
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    // when (操作):
    let get_without_room = client
        .get(chat_messages_url(&server))
        .bearer_auth(ALICE_TOKEN)
        .send()
        .await
        .expect("Failed to send request");
    let post_without_message = client
        .post(chat_messages_url(&server))
        .bearer_auth(ALICE_TOKEN)
        .json(&serde_json::json!({"room_id": "r1"}))
        .send()
        .await
        .expect("Failed to send request");
    let post_blank_message = client
        .post(chat_messages_url(&server))
        .bearer_auth(ALICE_TOKEN)
        .json(&serde_json::json!({"room_id": "r1", "message": "   "}))
        .send()
        .await
        .expect("Failed to send request");
    let post_garbage = client
        .post(chat_messages_url(&server))
        .bearer_auth(ALICE_TOKEN)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("Failed to send request");

    // then (期待する結果):
    assert_eq!(get_without_room.status(), 400);
    let body: serde_json::Value = get_without_room.json().await.unwrap();
    assert_eq!(body["error"], "Missing room_id");
    assert_eq!(post_without_message.status(), 400);
    assert_eq!(post_blank_message.status(), 400);
    assert_eq!(post_garbage.status(), 400);
    assert_eq!(server.backend.messages.count().await, 0);
}

#[tokio::test]
async fn test_unsupported_method_returns_405() {
    // テスト項目: GET/POST 以外のメソッドは 405（未認証なら先に 401）
    // given (前提条件):
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    // when (操作):
    let authorized = client
        .put(chat_messages_url(&server))
        .bearer_auth(ALICE_TOKEN)
        .send()
        .await
        .expect("Failed to send request");
    let anonymous = client
        .delete(chat_messages_url(&server))
        .send()
        .await
        .expect("Failed to send request");

    // then (期待する結果):
    assert_eq!(authorized.status(), 405);
    let body: serde_json::Value = authorized.json().await.unwrap();
    assert_eq!(body["error"], "Method not allowed");
    assert_eq!(anonymous.status(), 401);
}

#[tokio::test]
async fn test_unknown_room_returns_404() {
    // テスト項目: 存在しないルームは GET・POST ともに 404
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let get = client
        .get(format!("{}?room_id=nowhere", chat_messages_url(&server)))
        .bearer_auth(ALICE_TOKEN)
        .send()
        .await
        .expect("Failed to send request");
    let post = client
        .post(chat_messages_url(&server))
        .bearer_auth(ALICE_TOKEN)
        .json(&serde_json::json!({"room_id": "nowhere", "message": "hi"}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(get.status(), 404);
    assert_eq!(post.status(), 404);
}

#[tokio::test]
async fn test_get_returns_ordered_history_with_sender_names() {
    // テスト項目: GET は古い順に送信者名付きで返し、削除済みプロフィールは "Unknown"
    // given (前提条件):
    let server = TestServer::start().await;
    let client = reqwest::Client::new();
    for (token, text) in [(ALICE_TOKEN, "first"), (BOB_TOKEN, "second"), (ALICE_TOKEN, "third")] {
        let response = client
            .post(chat_messages_url(&server))
            .bearer_auth(token)
            .json(&serde_json::json!({"room_id": "general", "message": text}))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 201);
    }
    server
        .backend
        .profiles
        .remove(&UserId::new("bob").unwrap())
        .await
        .unwrap();

    // when (操作):
    let response = client
        .get(format!("{}?room_id=general&limit=2", chat_messages_url(&server)))
        .bearer_auth(ALICE_TOKEN)
        .send()
        .await
        .expect("Failed to send request");

    // then (期待する結果): limit=2 なので直近 2 件
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    let messages = body.as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["message"], "second");
    assert_eq!(messages[0]["sender_name"], "Unknown");
    assert_eq!(messages[1]["message"], "third");
    assert_eq!(messages[1]["sender_name"], "Alice");
}

#[tokio::test]
async fn test_cors_preflight() {
    // テスト項目: CORS プリフライトに応答する
    let server = TestServer::start().await;
    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, chat_messages_url(&server))
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "authorization,content-type")
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}
