mod common;

use pushhub_notifications::DeliveryResult;
use serde_json::{Value, json};

fn subscription(endpoint: &str) -> Value {
    json!({
        "endpoint": endpoint,
        "keys": { "p256dh": "BLc4xRzKlKORKWlW", "auth": "Uo7a6C" }
    })
}

async fn create(client: &reqwest::Client, base: &str, endpoint: &str) -> String {
    let resp = client
        .post(format!("{base}/subscriptions"))
        .json(&subscription(endpoint))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Subscription created");
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn subscription_crud() {
    let server = common::start_server().await;
    let base = &server.base;
    let client = reqwest::Client::new();

    // Empty list
    let list: Vec<Value> = client
        .get(format!("{base}/subscriptions"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(list.is_empty());

    let id = create(&client, base, "https://push.example/a").await;

    // Read back
    let resp = client
        .get(format!("{base}/subscriptions/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["endpoint"], "https://push.example/a");
    assert_eq!(body["keys"]["p256dh"], "BLc4xRzKlKORKWlW");
    assert!(body["createdAt"].is_string());

    // Duplicate endpoint
    let resp = client
        .post(format!("{base}/subscriptions"))
        .json(&subscription("https://push.example/a"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Subscription already exists");

    create(&client, base, "https://push.example/b").await;
    let list: Vec<Value> = client
        .get(format!("{base}/subscriptions"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.len(), 2);

    // Delete, then everything about it is gone
    let resp = client
        .delete(format!("{base}/subscriptions/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Subscription deleted");

    let resp = client
        .delete(format!("{base}/subscriptions/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Subscription not found");

    let resp = client
        .get(format!("{base}/subscriptions/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    // The endpoint is free again
    create(&client, base, "https://push.example/a").await;

    server.stop().await;
}

#[tokio::test]
async fn create_rejects_bad_input() {
    let server = common::start_server().await;
    let base = &server.base;
    let client = reqwest::Client::new();

    for body in [
        json!({}),
        json!({ "endpoint": "https://push.example/a" }),
        json!({ "endpoint": "https://push.example/a", "keys": { "p256dh": "k" } }),
        json!({ "endpoint": "", "keys": { "p256dh": "k", "auth": "a" } }),
    ] {
        let resp = client
            .post(format!("{base}/subscriptions"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400, "body: {body}");
        let err: Value = resp.json().await.unwrap();
        assert_eq!(
            err["error"],
            "Missing required fields: endpoint, keys.p256dh, keys.auth"
        );
    }

    // Malformed JSON
    let resp = client
        .post(format!("{base}/subscriptions"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(
        err["error"],
        "Missing required fields: endpoint, keys.p256dh, keys.auth"
    );

    // Wrong types get the same message, not the parser's text
    let resp = client
        .post(format!("{base}/subscriptions"))
        .header("content-type", "application/json")
        .body(r#"{"endpoint":"https://x","keys":"nope"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(
        err,
        json!({ "error": "Missing required fields: endpoint, keys.p256dh, keys.auth" })
    );

    server.stop().await;
}

#[tokio::test]
async fn malformed_ids_are_not_found() {
    let server = common::start_server().await;
    let client = reqwest::Client::new();

    for id in ["not-a-uuid", "507f1f77bcf86cd799439011"] {
        let resp = client
            .get(format!("{}/subscriptions/{id}", server.base))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);
        let resp = client
            .delete(format!("{}/subscriptions/{id}", server.base))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);
    }

    server.stop().await;
}

#[tokio::test]
async fn send_push_outcomes() {
    let server = common::start_server().await;
    let base = &server.base;
    let client = reqwest::Client::new();

    let ok_id = create(&client, base, "https://push.example/ok").await;
    let gone_id = create(&client, base, "https://push.example/gone").await;
    let broken_id = create(&client, base, "https://push.example/broken").await;
    let offline_id = create(&client, base, "https://push.example/offline").await;

    server.delivery.answer(
        "https://push.example/gone",
        DeliveryResult::http_failure(410, "HTTP 410: Gone"),
    );
    server.delivery.answer(
        "https://push.example/broken",
        DeliveryResult::http_failure(500, "HTTP 500: upstream"),
    );
    server
        .delivery
        .fail("https://push.example/offline", "connection refused");

    let payload = json!({
        "title": "T",
        "body": "B",
        "icon": "/icon-192x192.png",
        "data": { "url": "/inbox" }
    });

    // Missing title/body wins over an unknown id
    let resp = client
        .post(format!("{base}/send-push/unknown"))
        .json(&json!({ "title": "only title" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(err["error"], "Missing required fields: title, body");

    // Wrong types are reported the same way
    let resp = client
        .post(format!("{base}/send-push/{ok_id}"))
        .header("content-type", "application/json")
        .body(r#"{"title":5,"body":"B"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(err, json!({ "error": "Missing required fields: title, body" }));
    assert!(server.delivery.sent().is_empty());

    // Unknown id
    let resp = client
        .post(format!("{base}/send-push/unknown"))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(err["error"], "Subscription not found");

    // Delivered
    let resp = client
        .post(format!("{base}/send-push/{ok_id}"))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Push notification sent");
    let (endpoint, sent) = server.delivery.sent().pop().unwrap();
    assert_eq!(endpoint, "https://push.example/ok");
    assert_eq!(sent.title, "T");
    assert_eq!(sent.data.and_then(|d| d.url).as_deref(), Some("/inbox"));

    // Gone: 410 and the subscription is removed
    let resp = client
        .post(format!("{base}/send-push/{gone_id}"))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 410);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(err["error"], "Subscription expired and was removed");
    let resp = client
        .get(format!("{base}/subscriptions/{gone_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    // Push service error: 500 with details, subscription kept
    let resp = client
        .post(format!("{base}/send-push/{broken_id}"))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(err["error"], "Failed to send push notification");
    assert_eq!(err["details"], "HTTP 500: upstream");
    let resp = client
        .get(format!("{base}/subscriptions/{broken_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Delivery fault before reaching the push service
    let resp = client
        .post(format!("{base}/send-push/{offline_id}"))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    let err: Value = resp.json().await.unwrap();
    assert!(
        err["details"]
            .as_str()
            .unwrap()
            .contains("connection refused")
    );

    server.stop().await;
}
