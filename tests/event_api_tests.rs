// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event API tests: create/update/delete gating, joining, listing and
//! cursor pagination.

use axum::http::{Method, StatusCode};
use camptogether_api::db::DocumentStore;
use serde_json::{json, Value};

mod common;
use common::{
    admin_token, create_event, create_test_app, event_fixture, json_request, send, token_for,
};

fn camp_body() -> Value {
    json!({
        "title": "Big Sur Weekend",
        "start_date": "2026-02-10",
        "end_date": "2026-02-12",
        "is_public": true,
        "location_name": "Pfeiffer"
    })
}

fn ids(page: &Value) -> Vec<String> {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|event| event["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_create_event_sets_host_and_defaults() {
    let (app, _) = create_test_app();
    let token = token_for("host", None);

    let event = create_event(&app, &token, camp_body()).await;

    assert_eq!(event["host_id"], "host");
    assert_eq!(event["attendee_ids"], json!(["host"]));
    assert_eq!(event["title_lower"], "big sur weekend");
    assert_eq!(event["start_date"], "2026-02-10T00:00:00Z");
    assert_eq!(event["end_date"], "2026-02-12T00:00:00Z");
    assert_eq!(event["description"], "");
    assert!(!event["invite_token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_event_requires_auth() {
    let (app, _) = create_test_app();

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/events", None, Some(camp_body())),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing auth token");
}

#[tokio::test]
async fn test_create_event_rejects_reversed_dates() {
    let (app, _) = create_test_app();
    let token = token_for("host", None);

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/events",
            Some(&token),
            Some(json!({
                "title": "Backwards",
                "start_date": "2026-02-12",
                "end_date": "2026-02-10"
            })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
    let issues = body["details"]["issues"].as_array().unwrap();
    assert!(issues.iter().any(|issue| issue["path"] == "end_date"
        && issue["message"] == "End date must be after start date"));
}

#[tokio::test]
async fn test_create_event_reports_every_missing_field() {
    let (app, _) = create_test_app();
    let token = token_for("host", None);

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/events", Some(&token), Some(json!({}))),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let paths: Vec<&str> = body["details"]["issues"]
        .as_array()
        .unwrap()
        .iter()
        .map(|issue| issue["path"].as_str().unwrap())
        .collect();
    assert_eq!(paths, vec!["end_date", "start_date", "title"]);
}

#[tokio::test]
async fn test_malformed_json_is_a_validation_failure() {
    let (app, _) = create_test_app();
    let token = token_for("host", None);

    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/api/events")
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
    assert_eq!(body["details"]["issues"][0]["path"], "body");
}

#[tokio::test]
async fn test_get_event_is_public() {
    let (app, _) = create_test_app();
    let event = create_event(&app, &token_for("host", None), camp_body()).await;
    let id = event["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        json_request(Method::GET, &format!("/api/events/{id}"), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Big Sur Weekend");

    let (status, body) = send(
        &app,
        json_request(Method::GET, "/api/events/missing", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Event not found");
}

#[tokio::test]
async fn test_update_event_gating() {
    let (app, _) = create_test_app();
    let host = token_for("host", None);
    let guest = token_for("guest", None);
    let event = create_event(&app, &host, camp_body()).await;
    let uri = format!("/api/events/{}", event["id"].as_str().unwrap());

    // Attendees cannot edit.
    let (status, _) = send(&app, json_request(Method::POST, &format!("{uri}/join"), Some(&guest), None)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(
        &app,
        json_request(Method::PUT, &uri, Some(&guest), Some(json!({ "title": "Hijacked" }))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Forbidden");

    // Forbidden wins over an invalid payload.
    let (status, _) = send(
        &app,
        json_request(Method::PUT, &uri, Some(&guest), Some(json!({ "title": "" }))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        json_request(Method::PUT, &uri, Some(&host), Some(json!({ "title": "" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["issues"][0]["path"], "title");

    let (status, body) = send(
        &app,
        json_request(
            Method::PUT,
            &uri,
            Some(&host),
            Some(json!({ "title": "Big Sur Long Weekend", "end_date": "2026-02-13" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Big Sur Long Weekend");
    assert_eq!(body["title_lower"], "big sur long weekend");
    assert_eq!(body["end_date"], "2026-02-13T00:00:00Z");
    // The join above is preserved by the field-mask update.
    assert_eq!(body["attendee_ids"], json!(["host", "guest"]));

    let (status, _) = send(
        &app,
        json_request(
            Method::PUT,
            &uri,
            Some(&admin_token()),
            Some(json!({ "is_public": false })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        json_request(
            Method::PUT,
            "/api/events/missing",
            Some(&host),
            Some(json!({ "title": "x" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_event_cascades() {
    let (app, state) = create_test_app();
    let host = token_for("host", None);
    let event = create_event(&app, &host, camp_body()).await;
    let id = event["id"].as_str().unwrap().to_string();
    let uri = format!("/api/events/{id}");

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            &format!("{uri}/checklist"),
            Some(&host),
            Some(json!({ "name": "Tent" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            &format!("{uri}/expenses"),
            Some(&host),
            Some(json!({ "description": "Firewood", "amount": 12 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        json_request(Method::DELETE, &uri, Some(&token_for("stranger", None)), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, json_request(Method::DELETE, &uri, Some(&host), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    assert!(state.db.get_event(&id).await.unwrap().is_none());
    assert!(state.db.list_checklist_items(&id).await.unwrap().is_empty());
    assert!(state.db.list_expenses(&id).await.unwrap().is_empty());

    let (status, _) = send(&app, json_request(Method::DELETE, &uri, Some(&host), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_join_is_idempotent() {
    let (app, state) = create_test_app();
    let event = create_event(&app, &token_for("host", None), camp_body()).await;
    let id = event["id"].as_str().unwrap().to_string();
    let guest = token_for("guest", None);

    for _ in 0..2 {
        let (status, body) = send(
            &app,
            json_request(Method::POST, &format!("/api/events/{id}/join"), Some(&guest), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true }));
    }

    let stored = state.db.get_event(&id).await.unwrap().unwrap();
    assert_eq!(stored.attendee_ids, vec!["host", "guest"]);

    let (status, _) = send(
        &app,
        json_request(Method::POST, "/api/events/missing/join", Some(&guest), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_public_events_paginates_by_start_date() {
    let (app, state) = create_test_app();
    let fixtures = [
        ("e1", "2026-01-01T00:00:00Z", true),
        ("e2", "2026-03-01T00:00:00Z", true),
        ("e3", "2026-02-01T00:00:00Z", true),
        ("e4", "2026-02-01T00:00:00Z", true),
        ("hidden", "2026-04-01T00:00:00Z", false),
    ];
    for (id, start, is_public) in fixtures {
        state
            .db
            .create_event(&event_fixture(id, "Camp", "host", start, is_public))
            .await
            .unwrap();
    }

    let (status, first) = send(
        &app,
        json_request(Method::GET, "/api/events?limit=2", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&first), vec!["e2", "e4"]);
    assert_eq!(first["next_cursor"], "e4");

    let (status, second) = send(
        &app,
        json_request(Method::GET, "/api/events?limit=2&cursor=e4", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&second), vec!["e3", "e1"]);
    assert!(second["next_cursor"].is_null());

    // A cursor for a document that no longer exists restarts the listing.
    let (_, restarted) = send(
        &app,
        json_request(Method::GET, "/api/events?limit=2&cursor=gone", None, None),
    )
    .await;
    assert_eq!(ids(&restarted), vec!["e2", "e4"]);
}

#[tokio::test]
async fn test_cursor_event_made_private_keeps_page_position() {
    let (app, state) = create_test_app();
    for (id, start) in [
        ("e1", "2026-01-01T00:00:00Z"),
        ("e2", "2026-03-01T00:00:00Z"),
        ("e3", "2026-02-01T00:00:00Z"),
        ("e4", "2026-02-01T00:00:00Z"),
    ] {
        state
            .db
            .create_event(&event_fixture(id, "Camp", "host", start, true))
            .await
            .unwrap();
    }

    let (_, first) = send(
        &app,
        json_request(Method::GET, "/api/events?limit=2", None, None),
    )
    .await;
    assert_eq!(ids(&first), vec!["e2", "e4"]);
    assert_eq!(first["next_cursor"], "e4");

    let host = token_for("host", None);
    let (status, _) = send(
        &app,
        json_request(
            Method::PUT,
            "/api/events/e4",
            Some(&host),
            Some(json!({ "is_public": false })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, second) = send(
        &app,
        json_request(Method::GET, "/api/events?limit=2&cursor=e4", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&second), vec!["e3", "e1"]);
}

#[tokio::test]
async fn test_list_limit_is_clamped() {
    let (app, state) = create_test_app();
    for n in 0..55 {
        let id = format!("evt-{n:02}");
        state
            .db
            .create_event(&event_fixture(&id, "Camp", "host", "2026-05-01T00:00:00Z", true))
            .await
            .unwrap();
    }

    let (_, page) = send(
        &app,
        json_request(Method::GET, "/api/events?limit=200", None, None),
    )
    .await;
    assert_eq!(page["items"].as_array().unwrap().len(), 50);
    assert!(page["next_cursor"].is_string());

    let (_, page) = send(
        &app,
        json_request(Method::GET, "/api/events?limit=abc", None, None),
    )
    .await;
    assert_eq!(page["items"].as_array().unwrap().len(), 20);

    let (_, page) = send(
        &app,
        json_request(Method::GET, "/api/events?limit=0", None, None),
    )
    .await;
    assert_eq!(page["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_mine_requires_auth_and_includes_private() {
    let (app, state) = create_test_app();
    let mut private = event_fixture("private", "Secret Spot", "host", "2026-06-01T00:00:00Z", false);
    private.attendee_ids.push("guest".to_string());
    state.db.create_event(&private).await.unwrap();
    state
        .db
        .create_event(&event_fixture("other", "Other", "someone", "2026-06-02T00:00:00Z", true))
        .await
        .unwrap();

    let (status, body) = send(
        &app,
        json_request(Method::GET, "/api/events?scope=mine", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let guest = token_for("guest", None);
    let (status, page) = send(
        &app,
        json_request(Method::GET, "/api/events?scope=mine", Some(&guest), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&page), vec!["private"]);

    // Anything but "mine" is the public listing.
    let (_, page) = send(
        &app,
        json_request(Method::GET, "/api/events?scope=everything", Some(&guest), None),
    )
    .await;
    assert_eq!(ids(&page), vec!["other"]);
}

#[tokio::test]
async fn test_list_search_matches_title_prefix() {
    let (app, state) = create_test_app();
    for (id, title) in [("a", "Big Sur"), ("b", "Big Basin"), ("c", "Yosemite")] {
        state
            .db
            .create_event(&event_fixture(id, title, "host", "2026-07-01T00:00:00Z", true))
            .await
            .unwrap();
    }

    let (_, page) = send(
        &app,
        json_request(Method::GET, "/api/events?search=%20BIG%20", None, None),
    )
    .await;
    assert_eq!(ids(&page), vec!["b", "a"]);

    let (_, page) = send(
        &app,
        json_request(Method::GET, "/api/events?search=", None, None),
    )
    .await;
    assert_eq!(page["items"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_admin_listing() {
    let (app, state) = create_test_app();
    state
        .db
        .create_event(&event_fixture("pub", "Public", "host", "2026-01-01T00:00:00Z", true))
        .await
        .unwrap();
    state
        .db
        .create_event(&event_fixture("priv", "Private", "host", "2026-02-01T00:00:00Z", false))
        .await
        .unwrap();

    let (status, _) = send(
        &app,
        json_request(Method::GET, "/api/events/admin/all", Some(&token_for("host", None)), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        json_request(Method::GET, "/api/events/admin/all", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        json_request(Method::GET, "/api/events/admin/all", Some(&admin_token()), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let listed: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|event| event["id"].as_str().unwrap())
        .collect();
    assert_eq!(listed, vec!["priv", "pub"]);
}
