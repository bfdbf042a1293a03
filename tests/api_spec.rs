use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use routedeck::api::create_router;
use routedeck::db::Database;

fn server() -> TestServer {
    let db = Database::open_memory().expect("Failed to create test database");
    TestServer::new(create_router(db)).expect("Failed to start test server")
}

async fn create_blog(server: &TestServer) -> Value {
    let response = server
        .post("/api/cards")
        .json(&json!({
            "title": "Blog",
            "routePath": "/blog",
            "menuItems": [
                { "title": "Home", "routePath": "/blog/home", "order": 1 },
                { "title": "Archive", "routePath": "/blog/archive", "order": 2 }
            ]
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

#[tokio::test]
async fn health_reports_ok() {
    let server = server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "ok");
}

#[tokio::test]
async fn create_card_returns_menu_and_root_settings() {
    let server = server();
    let card = create_blog(&server).await;

    assert_eq!(card["title"], "Blog");
    assert_eq!(card["routePath"], "/blog");
    assert_eq!(card["requiresAuth"], false);
    let paths: Vec<&str> = card["menuItems"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["routePath"].as_str().unwrap())
        .collect();
    assert_eq!(paths, vec!["/blog/home", "/blog/archive"]);

    let tree = server.get("/api/routes/nested").await.json::<Value>();
    assert_eq!(tree[0]["path"], "/blog");
    assert_eq!(tree[0]["children"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn invalid_menu_path_is_a_validation_error() {
    let server = server();
    let response = server
        .post("/api/cards")
        .json(&json!({
            "title": "Blog",
            "routePath": "/blog",
            "menuItems": [{ "title": "Bad", "routePath": "blog/bad" }]
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["error"].as_str().unwrap().contains("blog/bad"));

    let cards = server.get("/api/cards").await.json::<Value>();
    assert!(cards.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_route_path_is_a_conflict() {
    let server = server();
    server
        .post("/api/routes")
        .json(&json!({ "path": "/docs" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server.post("/api/routes").json(&json!({ "path": "/docs" })).await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["code"], "CONFLICT");
}

#[tokio::test]
async fn missing_card_is_not_found() {
    let server = server();

    let response = server.get("/api/cards/42").await;
    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["code"], "NOT_FOUND");

    server
        .put("/api/cards/42")
        .json(&json!({ "title": "x" }))
        .await
        .assert_status_not_found();
    server.delete("/api/cards/42").await.assert_status_not_found();
}

#[tokio::test]
async fn null_route_path_detaches_the_card() {
    let server = server();
    let card = create_blog(&server).await;
    let id = card["id"].as_i64().unwrap();

    let response = server
        .put(&format!("/api/cards/{id}"))
        .json(&json!({ "routePath": null }))
        .await;
    response.assert_status_ok();
    let updated = response.json::<Value>();
    assert!(updated["routeId"].is_null());
    assert!(updated["menuItems"].as_array().unwrap().is_empty());

    let routes = server.get("/api/routes").await.json::<Value>();
    assert!(routes.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_card_removes_its_routes() {
    let server = server();
    let card = create_blog(&server).await;
    let id = card["id"].as_i64().unwrap();

    server
        .delete(&format!("/api/cards/{id}"))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server.get(&format!("/api/cards/{id}")).await.assert_status_not_found();
    let routes = server.get("/api/routes").await.json::<Value>();
    assert!(routes.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn provisioning_a_project_twice_creates_it_once() {
    let server = server();
    let body = json!({ "projectName": "docs", "cardId": 7 });

    let first = server.post("/api/routes/projects").json(&body).await;
    first.assert_status(StatusCode::CREATED);
    assert_eq!(first.json::<Value>()["created"].as_array().unwrap().len(), 3);

    let second = server.post("/api/routes/projects").json(&body).await;
    second.assert_status_ok();
    assert!(second.json::<Value>()["created"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_route_removes_its_subtree() {
    let server = server();
    create_blog(&server).await;
    let root = server.get("/api/routes").await.json::<Value>()[0].clone();
    let root_id = root["id"].as_i64().unwrap();

    server
        .delete(&format!("/api/routes/{root_id}"))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let routes = server.get("/api/routes").await.json::<Value>();
    assert!(routes.as_array().unwrap().is_empty());

    server
        .delete(&format!("/api/routes/{root_id}"))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn malformed_card_bodies_are_validation_errors() {
    let server = server();

    let missing_title = server
        .post("/api/cards")
        .json(&json!({ "routePath": "/blog" }))
        .await;
    missing_title.assert_status(StatusCode::BAD_REQUEST);
    let body = missing_title.json::<Value>();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["error"].as_str().unwrap().contains("title"));

    let missing_item_path = server
        .post("/api/cards")
        .json(&json!({
            "title": "Blog",
            "routePath": "/blog",
            "menuItems": [{ "title": "Home" }]
        }))
        .await;
    missing_item_path.assert_status(StatusCode::BAD_REQUEST);
    let body = missing_item_path.json::<Value>();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["error"].as_str().unwrap().contains("routePath"));

    let cards = server.get("/api/cards").await.json::<Value>();
    assert!(cards.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn a_second_card_cannot_take_over_a_project_root() {
    let server = server();
    create_blog(&server).await;

    let response = server
        .post("/api/cards")
        .json(&json!({ "title": "Other", "routePath": "/blog" }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["code"], "CONFLICT");

    let tree = server.get("/api/routes/nested").await.json::<Value>();
    assert_eq!(tree[0]["title"], "Blog");
    assert_eq!(tree[0]["children"].as_array().unwrap().len(), 2);
}
