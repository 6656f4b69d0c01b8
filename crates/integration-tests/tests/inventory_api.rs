//! Integration tests for the inventory API.
//!
//! Each test builds its own app over the in-memory store.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use bintrack_integration_tests::TestApp;
use serde_json::{Value, json};

fn item(name: &str, bin: &str) -> Value {
    json!({
        "name": name,
        "imageUrl": format!("/uploads/{name}.jpg"),
        "binNumber": bin,
    })
}

fn id_of(item: &Value) -> String {
    item["id"].as_str().unwrap().to_string()
}

fn names(items: &Value) -> Vec<String> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap().to_string())
        .collect()
}

/// Create an item and mark it sold with the given ship-by date.
async fn sell(app: &TestApp, name: &str, ship_by: Value) {
    let created = app.create_item(&item(name, "1")).await;
    let response = app
        .json(
            "PATCH",
            &format!("/api/inventory/{}", id_of(&created)),
            &json!({"status": "sold", "shipByDate": ship_by}),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

// ============================================================================
// Create / read
// ============================================================================

#[tokio::test]
async fn test_create_applies_defaults() {
    let app = TestApp::new();

    let created = app
        .create_item(&json!({"name": "Lamp", "imageUrl": "/uploads/lamp.jpg"}))
        .await;

    assert!(created["id"].is_string());
    assert_eq!(created["status"], "pending");
    assert_eq!(created["binNumber"], "");
    assert_eq!(created["rackNumber"], "");
    assert_eq!(created["platform"], "");
    assert!(created["soldAt"].is_null());
    assert!(created["createdAt"].is_string());
}

#[tokio::test]
async fn test_create_as_sold_stamps_sold_at() {
    let app = TestApp::new();

    let mut body = item("Boots", "4");
    body["status"] = json!("sold");
    let created = app.create_item(&body).await;

    assert_eq!(created["status"], "sold");
    assert!(created["soldAt"].is_string());
}

#[tokio::test]
async fn test_create_rejects_empty_name() {
    let app = TestApp::new();

    let response = app
        .json("POST", "/api/inventory", &json!({"name": "", "imageUrl": "/x.jpg"}))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["error"].as_str().unwrap().contains("name"));
    assert_eq!(app.get("/api/inventory").await.json()["stats"]["total"], 0);
}

#[tokio::test]
async fn test_create_rejects_malformed_json() {
    let app = TestApp::new();

    let response = app
        .json("POST", "/api/inventory", &json!({"imageUrl": "/x.jpg"}))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["error"].is_string());
}

#[tokio::test]
async fn test_show_item() {
    let app = TestApp::new();
    let created = app.create_item(&item("Mug", "2")).await;

    let response = app.get(&format!("/api/inventory/{}", id_of(&created))).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), created);
}

#[tokio::test]
async fn test_show_unknown_and_malformed_ids() {
    let app = TestApp::new();

    let unknown = app
        .get("/api/inventory/00000000-0000-0000-0000-000000000000")
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.json()["error"], "Item not found");

    let malformed = app.get("/api/inventory/not-a-uuid").await;
    assert_eq!(malformed.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_is_newest_first_with_stats() {
    let app = TestApp::new();
    app.create_item(&item("First", "1")).await;
    app.create_item(&item("Second", "1")).await;
    let third = app.create_item(&item("Third", "2")).await;
    app.json(
        "PATCH",
        &format!("/api/inventory/{}", id_of(&third)),
        &json!({"status": "sold"}),
    )
    .await;

    let listing = app.get("/api/inventory").await.json();

    assert_eq!(names(&listing["items"]), ["Third", "Second", "First"]);
    assert_eq!(
        listing["stats"],
        json!({"total": 3, "pending": 2, "completed": 0, "sold": 1, "revenue": 0.0})
    );
}

// ============================================================================
// Update lifecycle
// ============================================================================

#[tokio::test]
async fn test_status_lifecycle() {
    let app = TestApp::new();
    let created = app.create_item(&item("Jacket", "7")).await;
    let uri = format!("/api/inventory/{}", id_of(&created));

    let sold = app
        .json("PATCH", &uri, &json!({"status": "sold", "soldPrice": 45.5}))
        .await;
    assert_eq!(sold.status, StatusCode::OK);
    let sold = sold.json();
    assert_eq!(sold["status"], "sold");
    assert!(sold["soldAt"].is_string());
    assert_eq!(sold["soldPrice"], 45.5);

    let completed = app.json("PATCH", &uri, &json!({"status": "completed"})).await;
    assert_eq!(completed.json()["status"], "completed");
    assert_eq!(completed.json()["soldAt"], sold["soldAt"]);
    assert_eq!(
        app.get("/api/inventory").await.json()["stats"]["revenue"],
        45.5
    );

    let back = app.json("PATCH", &uri, &json!({"status": "sold"})).await;
    assert_eq!(back.status, StatusCode::OK);

    let pending = app.json("PATCH", &uri, &json!({"status": "pending"})).await;
    assert_eq!(pending.json()["status"], "pending");
    assert!(pending.json()["soldAt"].is_null());
}

#[tokio::test]
async fn test_pending_cannot_jump_to_completed() {
    let app = TestApp::new();
    let created = app.create_item(&item("Vase", "3")).await;
    let uri = format!("/api/inventory/{}", id_of(&created));

    let response = app.json("PATCH", &uri, &json!({"status": "completed"})).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.get(&uri).await.json()["status"], "pending");
}

#[tokio::test]
async fn test_patch_updates_only_given_fields() {
    let app = TestApp::new();
    let mut body = item("Radio", "9");
    body["description"] = json!("Works");
    let created = app.create_item(&body).await;
    let uri = format!("/api/inventory/{}", id_of(&created));

    let updated = app
        .json("PATCH", &uri, &json!({"rackNumber": "B", "description": null}))
        .await
        .json();

    assert_eq!(updated["rackNumber"], "B");
    assert!(updated["description"].is_null());
    assert_eq!(updated["name"], "Radio");
    assert_eq!(updated["binNumber"], "9");
}

#[tokio::test]
async fn test_patch_rejects_empty_bin() {
    let app = TestApp::new();
    let created = app.create_item(&item("Radio", "9")).await;
    let uri = format!("/api/inventory/{}", id_of(&created));

    let response = app.json("PATCH", &uri, &json!({"binNumber": ""})).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(
        response.json()["error"]
            .as_str()
            .unwrap()
            .contains("binNumber")
    );
}

#[tokio::test]
async fn test_patch_unknown_item() {
    let app = TestApp::new();

    let response = app
        .json(
            "PATCH",
            "/api/inventory/00000000-0000-0000-0000-000000000000",
            &json!({"name": "x"}),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_item() {
    let app = TestApp::new();
    let created = app.create_item(&item("Chair", "5")).await;
    let uri = format!("/api/inventory/{}", id_of(&created));

    let response = app.delete(&uri).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({"success": true, "message": "Item deleted successfully"})
    );

    assert_eq!(app.get(&uri).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.delete(&uri).await.status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
async fn test_search_by_text_and_status() {
    let app = TestApp::new();
    app.create_item(&item("Blue Lamp", "1")).await;
    let red = app.create_item(&item("Red Lamp", "2")).await;
    app.create_item(&item("Blue Mug", "3")).await;
    app.json(
        "PATCH",
        &format!("/api/inventory/{}", id_of(&red)),
        &json!({"status": "sold"}),
    )
    .await;

    let lamps = app
        .json("POST", "/api/inventory/search", &json!({"query": "Lamp"}))
        .await
        .json();
    assert_eq!(names(&lamps), ["Red Lamp", "Blue Lamp"]);

    let sold_lamps = app
        .json(
            "POST",
            "/api/inventory/search",
            &json!({"query": "Lamp", "status": "sold"}),
        )
        .await
        .json();
    assert_eq!(names(&sold_lamps), ["Red Lamp"]);

    let case_sensitive = app
        .json("POST", "/api/inventory/search", &json!({"query": "lamp"}))
        .await
        .json();
    assert_eq!(names(&case_sensitive), Vec::<String>::new());
}

#[tokio::test]
async fn test_search_matches_bin_number() {
    let app = TestApp::new();
    app.create_item(&item("Lamp", "A-12")).await;
    app.create_item(&item("Mug", "B-3")).await;

    let found = app
        .json("POST", "/api/inventory/search", &json!({"query": "A-1"}))
        .await
        .json();

    assert_eq!(names(&found), ["Lamp"]);
}

#[tokio::test]
async fn test_empty_search_returns_everything() {
    let app = TestApp::new();
    app.create_item(&item("One", "1")).await;
    app.create_item(&item("Two", "2")).await;

    let all = app
        .json("POST", "/api/inventory/search", &json!({"query": ""}))
        .await
        .json();

    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_search_by_photo_returns_known_candidates() {
    let app = TestApp::new();
    let a = app.create_item(&item("A", "1")).await;
    let b = app.create_item(&item("B", "1")).await;
    app.create_item(&item("C", "1")).await;

    let response = app
        .json(
            "POST",
            "/api/inventory/search-by-photo",
            &json!({
                "image": "data:image/jpeg;base64,aGVsbG8=",
                "itemIds": [
                    id_of(&a),
                    id_of(&b),
                    "not-a-uuid",
                    "00000000-0000-0000-0000-000000000000",
                ],
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({"matchingItemIds": [id_of(&b), id_of(&a)]})
    );
}

// ============================================================================
// Shipping worklist
// ============================================================================

#[tokio::test]
async fn test_ready_to_ship_orders_by_deadline() {
    let app = TestApp::new();

    sell(&app, "Later", json!("2026-04-30")).await;
    sell(&app, "Undated", Value::Null).await;
    sell(&app, "Late", json!("2026-03-01")).await;
    app.create_item(&item("Unsold", "1")).await;

    let worklist = app
        .get("/api/inventory/ready-to-ship?today=2026-03-10")
        .await
        .json();

    let entries = worklist["items"].as_array().unwrap();
    let order: Vec<&str> = entries
        .iter()
        .map(|e| e["item"]["name"].as_str().unwrap())
        .collect();
    assert_eq!(order, ["Late", "Later", "Undated"]);

    assert_eq!(entries[0]["urgency"]["label"], "Overdue");
    assert_eq!(entries[0]["urgency"]["urgent"], true);
    assert_eq!(entries[1]["urgency"]["urgent"], false);
    assert_eq!(entries[2]["urgency"]["label"], "No date");
    assert!(entries[2]["urgency"]["daysUntil"].is_null());
    assert_eq!(worklist["urgentCount"], 1);
}

#[tokio::test]
async fn test_ready_to_ship_rejects_bad_date() {
    let app = TestApp::new();

    let response = app.get("/api/inventory/ready-to-ship?today=tomorrow").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ready_to_ship_uses_client_offset() {
    let app = TestApp::new();
    // Picked as Jan 12, 8pm by a client at UTC-8.
    sell(&app, "Evening pick", json!("2024-01-13T04:00:00.000Z")).await;

    let pacific = app
        .get("/api/inventory/ready-to-ship?today=2024-01-10&tzOffsetMinutes=-480")
        .await;
    assert_eq!(pacific.status, StatusCode::OK);
    let urgency = &pacific.json()["items"][0]["urgency"];
    assert_eq!(urgency["daysUntil"], 2);
    assert_eq!(urgency["label"], "2 days");

    let utc = app
        .get("/api/inventory/ready-to-ship?today=2024-01-10&tzOffsetMinutes=0")
        .await
        .json();
    assert_eq!(utc["items"][0]["urgency"]["daysUntil"], 3);
}

#[tokio::test]
async fn test_ready_to_ship_rejects_bad_offset() {
    let app = TestApp::new();

    let response = app
        .get("/api/inventory/ready-to-ship?tzOffsetMinutes=pacific")
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(
        response.json()["error"]
            .as_str()
            .unwrap()
            .contains("tzOffsetMinutes")
    );
}
