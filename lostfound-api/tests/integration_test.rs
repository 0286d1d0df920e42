/// Integration tests for the Lost & Found API
///
/// These drive the full router (auth middleware, handlers, error mapping)
/// over the in-memory store.

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::{id_of, item_body, TestContext};
use serde_json::json;

#[tokio::test]
async fn test_health_reports_memory_store() {
    let ctx = TestContext::new();

    let response = ctx.get("/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    assert_eq!(response.body["storage"], "memory");
    assert_eq!(response.body["database"], "connected");
}

#[tokio::test]
async fn test_security_headers_on_api_responses() {
    let ctx = TestContext::new();

    let response = ctx.get("/v1/home", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(response.headers.get("x-frame-options").unwrap(), "DENY");
    assert!(response.headers.get("strict-transport-security").is_none());
}

#[tokio::test]
async fn test_register_login_and_refresh() {
    let ctx = TestContext::new();

    let registered = ctx
        .post(
            "/v1/auth/register",
            None,
            json!({ "username": "alice", "email": "alice@example.com", "password": "umbrella-42" }),
        )
        .await;
    assert_eq!(registered.status, StatusCode::CREATED, "{}", registered.body);
    assert_eq!(registered.body["user"]["username"], "alice");
    assert!(registered.body["user"].get("password_hash").is_none());
    assert_eq!(registered.body["token_type"], "Bearer");

    // Registration logs the user in
    let token = registered.body["access_token"].as_str().unwrap().to_string();
    let me = ctx.get("/v1/me", Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["user"]["username"], "alice");

    let taken = ctx
        .post(
            "/v1/auth/register",
            None,
            json!({ "username": "alice", "password": "another-pass-1" }),
        )
        .await;
    assert_eq!(taken.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(taken.body["details"][0]["field"], "username");

    let wrong = ctx
        .post(
            "/v1/auth/login",
            None,
            json!({ "username": "alice", "password": "not-the-password" }),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body["error"], "unauthorized");

    let login = ctx
        .post(
            "/v1/auth/login",
            None,
            json!({ "username": "alice", "password": "umbrella-42" }),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    let refresh_token = login.body["refresh_token"].as_str().unwrap().to_string();

    let refreshed = ctx
        .post("/v1/auth/refresh", None, json!({ "refresh_token": refresh_token }))
        .await;
    assert_eq!(refreshed.status, StatusCode::OK);
    assert!(refreshed.body["access_token"].is_string());

    // An access token is not accepted as a refresh token
    let misuse = ctx
        .post("/v1/auth/refresh", None, json!({ "refresh_token": token }))
        .await;
    assert_eq!(misuse.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_rejects_weak_password() {
    let ctx = TestContext::new();

    let numeric = ctx
        .post(
            "/v1/auth/register",
            None,
            json!({ "username": "bob", "password": "12345678901" }),
        )
        .await;
    assert_eq!(numeric.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(numeric.body["details"][0]["field"], "password");

    let bad_name = ctx
        .post(
            "/v1/auth/register",
            None,
            json!({ "username": "bob smith", "password": "fine-password" }),
        )
        .await;
    assert_eq!(bad_name.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(bad_name.body["details"][0]["field"], "username");
}

#[tokio::test]
async fn test_protected_routes_require_bearer_token() {
    let ctx = TestContext::new();

    let missing = ctx
        .post("/v1/items", None, item_body("Keys", "found", "keys"))
        .await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let garbage = ctx
        .post("/v1/items", Some("not-a-jwt"), item_body("Keys", "found", "keys"))
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);

    let basic = ctx
        .send(
            Request::builder()
                .method(Method::GET)
                .uri("/v1/me")
                .header(header::AUTHORIZATION, "Basic YWxpY2U6c2VjcmV0")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(basic.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_item_returns_labels() {
    let ctx = TestContext::new();
    let owner = ctx.user("owner").await;

    let response = ctx
        .post(
            "/v1/items",
            owner.token(),
            item_body("  Brown wallet  ", "lost", "bags"),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["title"], "Brown wallet");
    assert_eq!(response.body["status"], "active");
    assert_eq!(response.body["category_label"], "Bags & Wallets");
    assert_eq!(response.body["item_type_label"], "Lost");
    assert_eq!(response.body["display_title"], "[Lost] Brown wallet");
    assert_eq!(response.body["owner_id"], owner.id().to_string());
}

#[tokio::test]
async fn test_create_item_validation_errors() {
    let ctx = TestContext::new();
    let owner = ctx.user("owner").await;

    let blank = ctx
        .post("/v1/items", owner.token(), item_body("   ", "found", "keys"))
        .await;
    assert_eq!(blank.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(blank.body["error"], "validation_error");
    assert_eq!(blank.body["details"][0]["field"], "title");

    let bad_type = ctx
        .post("/v1/items", owner.token(), item_body("Keys", "stolen", "keys"))
        .await;
    assert_eq!(bad_type.status, StatusCode::UNPROCESSABLE_ENTITY);

    let future = ctx
        .post(
            "/v1/items",
            owner.token(),
            json!({
                "title": "Scarf",
                "description": "Red wool",
                "item_type": "found",
                "location": "Bus stop",
                "date_reported": "2999-01-01",
            }),
        )
        .await;
    assert_eq!(future.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(future.body["details"][0]["field"], "date_reported");
}

#[tokio::test]
async fn test_category_defaults_to_others() {
    let ctx = TestContext::new();
    let owner = ctx.user("owner").await;

    let response = ctx
        .post(
            "/v1/items",
            owner.token(),
            json!({
                "title": "Water bottle",
                "description": "Steel, dented",
                "item_type": "found",
                "location": "Gym",
                "date_reported": "2024-05-01",
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["category"], "others");
}

#[tokio::test]
async fn test_item_detail_viewer_context() {
    let ctx = TestContext::new();
    let owner = ctx.user("owner").await;
    let visitor = ctx.user("visitor").await;
    let item_id = ctx.create_item(&owner, "Blue umbrella", "found").await;
    let uri = format!("/v1/items/{}", item_id);

    let anonymous = ctx.get(&uri, None).await;
    assert_eq!(anonymous.status, StatusCode::OK);
    assert_eq!(anonymous.body["owner_username"], "owner");
    assert_eq!(anonymous.body["is_owner"], false);
    assert!(anonymous.body.get("viewer_has_claimed").is_none());
    assert_eq!(anonymous.body["can_claim"], false);

    // A broken token on a public route is treated as anonymous
    let broken = ctx.get(&uri, Some("garbage")).await;
    assert_eq!(broken.status, StatusCode::OK);
    assert_eq!(broken.body["is_owner"], false);

    let as_owner = ctx.get(&uri, owner.token()).await;
    assert_eq!(as_owner.body["is_owner"], true);
    assert_eq!(as_owner.body["can_claim"], false);

    let before = ctx.get(&uri, visitor.token()).await;
    assert_eq!(before.body["viewer_has_claimed"], false);
    assert_eq!(before.body["can_claim"], true);

    ctx.submit_claim(&visitor, item_id).await;

    let after = ctx.get(&uri, visitor.token()).await;
    assert_eq!(after.body["viewer_has_claimed"], true);
    assert_eq!(after.body["can_claim"], false);
    assert_eq!(after.body["pending_claims_count"], 1);
}

#[tokio::test]
async fn test_unknown_or_malformed_ids_are_not_found() {
    let ctx = TestContext::new();

    let unknown = ctx
        .get("/v1/items/00000000-0000-0000-0000-000000000000", None)
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.body["error"], "not_found");

    let malformed = ctx.get("/v1/items/not-a-uuid", None).await;
    assert_eq!(malformed.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_edit_is_owner_only() {
    let ctx = TestContext::new();
    let owner = ctx.user("owner").await;
    let other = ctx.user("other").await;
    let item_id = ctx.create_item(&owner, "Laptop", "lost").await;
    let uri = format!("/v1/items/{}", item_id);

    let forbidden = ctx
        .request(
            Method::PUT,
            &uri,
            other.token(),
            Some(item_body("Stolen laptop", "lost", "electronics")),
        )
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let edited = ctx
        .request(
            Method::PUT,
            &uri,
            owner.token(),
            Some(item_body("Silver laptop", "lost", "electronics")),
        )
        .await;
    assert_eq!(edited.status, StatusCode::OK);
    assert_eq!(edited.body["title"], "Silver laptop");
    assert_eq!(edited.body["category"], "electronics");
    assert_eq!(edited.body["status"], "active");
}

#[tokio::test]
async fn test_close_and_delete() {
    let ctx = TestContext::new();
    let owner = ctx.user("owner").await;
    let other = ctx.user("other").await;
    let item_id = ctx.create_item(&owner, "Gloves", "found").await;

    let closed = ctx
        .post(&format!("/v1/items/{}/close", item_id), owner.token(), json!({}))
        .await;
    assert_eq!(closed.status, StatusCode::OK);
    assert_eq!(closed.body["status"], "closed");

    // Closing again is a no-op
    let again = ctx
        .post(&format!("/v1/items/{}/close", item_id), owner.token(), json!({}))
        .await;
    assert_eq!(again.status, StatusCode::OK);

    let claim = ctx
        .post(
            &format!("/v1/items/{}/claims", item_id),
            other.token(),
            json!({ "message": "Mine" }),
        )
        .await;
    assert_eq!(claim.status, StatusCode::CONFLICT);
    assert_eq!(claim.body["message"], "This item is no longer active.");

    let uri = format!("/v1/items/{}", item_id);
    let not_owner = ctx.request(Method::DELETE, &uri, other.token(), None).await;
    assert_eq!(not_owner.status, StatusCode::FORBIDDEN);

    let deleted = ctx.request(Method::DELETE, &uri, owner.token(), None).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    assert_eq!(ctx.get(&uri, None).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_filters_and_pagination() {
    let ctx = TestContext::new();
    let owner = ctx.user("owner").await;

    for n in 0..13 {
        ctx.create_item(&owner, &format!("Notebook {}", n), "found").await;
    }
    let wallet = ctx
        .post("/v1/items", owner.token(), item_body("Wallet", "lost", "bags"))
        .await;
    let wallet_id = id_of(&wallet.body);

    let first = ctx.get("/v1/items", None).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["total_results"], 14);
    assert_eq!(first.body["total_pages"], 2);
    assert_eq!(first.body["page_size"], 12);
    assert_eq!(first.body["results"].as_array().unwrap().len(), 12);
    assert_eq!(first.body["has_next"], true);
    // Newest first
    assert_eq!(first.body["results"][0]["title"], "Wallet");

    let beyond = ctx.get("/v1/items?page=99", None).await;
    assert_eq!(beyond.body["page"], 2);
    assert_eq!(beyond.body["results"].as_array().unwrap().len(), 2);

    let huge = ctx.get("/v1/items?page=9223372036854775807", None).await;
    assert_eq!(huge.status, StatusCode::OK);
    assert_eq!(huge.body["page"], 2);

    let junk = ctx.get("/v1/items?page=abc", None).await;
    assert_eq!(junk.body["page"], 1);

    let filtered = ctx
        .get("/v1/items?q=%20wallet%20&category=bags&item_type=lost", None)
        .await;
    assert_eq!(filtered.body["total_results"], 1);
    assert_eq!(filtered.body["results"][0]["id"], wallet_id.to_string());

    let blank = ctx.get("/v1/items?category=&item_type=", None).await;
    assert_eq!(blank.body["total_results"], 14);

    let unknown = ctx.get("/v1/items?category=furniture", None).await;
    assert_eq!(unknown.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(unknown.body["details"][0]["field"], "category");

    let wildcard = ctx.get("/v1/items?q=%25", None).await;
    assert_eq!(wildcard.body["total_results"], 0);

    // Closed items drop out of search
    ctx.post(&format!("/v1/items/{}/close", wallet_id), owner.token(), json!({}))
        .await;
    let after_close = ctx.get("/v1/items?q=wallet", None).await;
    assert_eq!(after_close.body["total_results"], 0);
}

#[tokio::test]
async fn test_home_and_my_items() {
    let ctx = TestContext::new();
    let owner = ctx.user("owner").await;
    let other = ctx.user("other").await;

    for n in 0..5 {
        ctx.create_item(&owner, &format!("Lost thing {}", n), "lost").await;
    }
    let found_id = ctx.create_item(&owner, "Found thing", "found").await;
    ctx.post(&format!("/v1/items/{}/close", found_id), owner.token(), json!({}))
        .await;
    ctx.create_item(&other, "Someone else's", "found").await;

    let home = ctx.get("/v1/home", None).await;
    assert_eq!(home.status, StatusCode::OK);
    assert_eq!(home.body["recent_lost"].as_array().unwrap().len(), 4);
    assert_eq!(home.body["recent_found"].as_array().unwrap().len(), 1);
    assert_eq!(home.body["stats"]["total_items"], 7);
    assert_eq!(home.body["stats"]["total_lost"], 5);
    assert_eq!(home.body["stats"]["total_found"], 2);
    assert_eq!(home.body["stats"]["total_claimed"], 0);
    assert_eq!(home.body["categories"].as_array().unwrap().len(), 7);

    let mine = ctx.get("/v1/items/mine", owner.token()).await;
    assert_eq!(mine.status, StatusCode::OK);
    let mine = mine.body.as_array().unwrap().clone();
    assert_eq!(mine.len(), 6);
    assert_eq!(mine[0]["title"], "Found thing");
    assert_eq!(mine[0]["status"], "closed");
}
