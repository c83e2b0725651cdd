use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use lexshare::config::Config;
use tower::ServiceExt;

/// Default API key seeded by the initial migration
const DEFAULT_API_KEY: &str = "lexshare_default_api_key_please_regenerate";

/// Email of the seeded demo customer
const DEFAULT_EMAIL: &str = "demo@lexshare.dev";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    // A pooled in-memory sqlite gives every connection its own database
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;

    let state = lexshare::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    lexshare::api::router(state).await
}

async fn send(app: &Router, request: Request<Body>) -> axum::response::Response {
    app.clone().oneshot(request).await.unwrap()
}

fn authed(method: &str, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("X-Api-Key", DEFAULT_API_KEY)
}

async fn get(app: &Router, uri: &str) -> axum::response::Response {
    send(app, authed("GET", uri).body(Body::empty()).unwrap()).await
}

async fn post_form(app: &Router, uri: &str, form: &str) -> axum::response::Response {
    send(
        app,
        authed("POST", uri)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap(),
    )
    .await
}

async fn delete(app: &Router, uri: &str) -> axum::response::Response {
    send(app, authed("DELETE", uri).body(Body::empty()).unwrap()).await
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn raw_body(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

#[tokio::test]
async fn test_endpoints_require_auth() {
    let app = spawn_app().await;

    let response = send(
        &app,
        Request::builder()
            .uri("/api/glossaries")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(
        &app,
        Request::builder()
            .uri("/api/glossaries")
            .header("X-Api-Key", "wrong-key")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get(&app, "/api/glossaries").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_returns_api_key() {
    let app = spawn_app().await;

    let payload = serde_json::json!({
        "email": DEFAULT_EMAIL,
        "password": "password",
    });

    let response = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header("Content-Type", mime::APPLICATION_JSON.as_ref())
            .body(Body::from(payload.to_string()))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["email"], DEFAULT_EMAIL);
    assert_eq!(body["api_key"], DEFAULT_API_KEY);

    let payload = serde_json::json!({
        "email": DEFAULT_EMAIL,
        "password": "nope",
    });

    let response = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header("Content-Type", mime::APPLICATION_JSON.as_ref())
            .body(Body::from(payload.to_string()))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_and_list_glossary() {
    let app = spawn_app().await;

    let form = "title=Animals&share_flag=N&origin_lang=en&target_lang=fr\
                &content[0][origin]=cat&content[0][target]=chat\
                &content[1][origin]=dog&content[1][target]=chien";
    let response = post_form(&app, "/api/glossaries", form).await;
    assert_eq!(response.status(), StatusCode::OK);

    let created = json_body(response).await;
    assert!(created["id"].is_i64());

    let body = json_body(get(&app, "/api/glossaries").await).await;
    assert_eq!(body["total"], 1);

    let glossary = &body["data"][0];
    assert_eq!(glossary["title"], "Animals");
    assert_eq!(glossary["share_flag"], "N");
    assert_eq!(glossary["content"][0]["origin"], "cat");
    assert_eq!(glossary["content"][0]["target"], "chat");
    assert_eq!(glossary["content"][1]["origin"], "dog");
}

#[tokio::test]
async fn test_create_glossary_missing_fields() {
    let app = spawn_app().await;

    let response = post_form(&app, "/api/glossaries", "title=Animals&share_flag=N").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["code"], 400);

    // Nothing was created
    let body = json_body(get(&app, "/api/glossaries").await).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_edit_glossary_rebuilds_term_list() {
    let app = spawn_app().await;

    let form = "title=Animals&share_flag=N&origin_lang=en&target_lang=fr\
                &content[0][origin]=cat&content[0][target]=chat\
                &content[1][origin]=dog&content[1][target]=chien";
    let created = json_body(post_form(&app, "/api/glossaries", form).await).await;
    let id = created["id"].as_i64().unwrap();

    let form = "title=Pets&content[0][origin]=hamster&content[0][target]=hamster";
    let response = post_form(&app, &format!("/api/glossaries/{id}"), form).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(get(&app, "/api/glossaries").await).await;
    let glossary = &body["data"][0];
    assert_eq!(glossary["title"], "Pets");
    assert_eq!(glossary["content"].as_array().unwrap().len(), 1);
    assert_eq!(glossary["content"][0]["origin"], "hamster");
}

#[tokio::test]
async fn test_edit_glossary_rejects_bad_added_count() {
    let app = spawn_app().await;

    let form = "title=Animals&share_flag=N&origin_lang=en&target_lang=fr\
                &content[0][origin]=cat&content[0][target]=chat";
    let created = json_body(post_form(&app, "/api/glossaries", form).await).await;
    let id = created["id"].as_i64().unwrap();

    let response = post_form(
        &app,
        &format!("/api/glossaries/{id}"),
        "added_count=not-a-number",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The failed edit changed nothing
    let body = json_body(get(&app, "/api/glossaries").await).await;
    assert_eq!(body["data"][0]["title"], "Animals");
    assert_eq!(body["data"][0]["content"][0]["origin"], "cat");
    assert_eq!(body["data"][0]["added_count"], 0);
}

#[tokio::test]
async fn test_share_flag_validation_and_shared_list() {
    let app = spawn_app().await;

    let form = "title=Animals&share_flag=N&origin_lang=en&target_lang=fr\
                &content[0][origin]=cat&content[0][target]=chat";
    let created = json_body(post_form(&app, "/api/glossaries", form).await).await;
    let id = created["id"].as_i64().unwrap();

    // Not shared yet
    let body = json_body(get(&app, "/api/glossaries/shared").await).await;
    assert_eq!(body["total"], 0);

    let response = post_form(
        &app,
        &format!("/api/glossaries/{id}/share"),
        "share_flag=maybe",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_form(&app, &format!("/api/glossaries/{id}/share"), "share_flag=Y").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(get(&app, "/api/glossaries/shared?order=latest").await).await;
    assert_eq!(body["total"], 1);

    let row = &body["data"][0];
    assert_eq!(row["email"], DEFAULT_EMAIL);
    assert_eq!(row["faved"], false);
    assert_eq!(row["fav_count"], 0);
    assert_eq!(row["content"][0]["origin"], "cat");
}

#[tokio::test]
async fn test_favorite_toggle_is_self_inverse() {
    let app = spawn_app().await;

    let form = "title=Animals&share_flag=Y&origin_lang=en&target_lang=fr\
                &content[0][origin]=cat&content[0][target]=chat";
    let created = json_body(post_form(&app, "/api/glossaries", form).await).await;
    let id = created["id"].as_i64().unwrap();

    let response = post_form(&app, &format!("/api/glossaries/{id}/favorite"), "").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(get(&app, "/api/glossaries/shared").await).await;
    assert_eq!(body["data"][0]["faved"], true);
    assert_eq!(body["data"][0]["fav_count"], 1);

    let response = post_form(&app, &format!("/api/glossaries/{id}/favorite"), "").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(get(&app, "/api/glossaries/shared").await).await;
    assert_eq!(body["data"][0]["faved"], false);
    assert_eq!(body["data"][0]["fav_count"], 0);

    // Favoriting a missing glossary is a 404
    let response = post_form(&app, "/api/glossaries/9999/favorite", "").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_copy_requires_shared_glossary() {
    let app = spawn_app().await;

    let form = "title=Animals&share_flag=N&origin_lang=en&target_lang=fr\
                &content[0][origin]=cat&content[0][target]=chat";
    let created = json_body(post_form(&app, "/api/glossaries", form).await).await;
    let id = created["id"].as_i64().unwrap();

    let response = post_form(&app, &format!("/api/glossaries/{id}/copy"), "").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    post_form(&app, &format!("/api/glossaries/{id}/share"), "share_flag=Y").await;

    let response = post_form(&app, &format!("/api/glossaries/{id}/copy"), "").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let new_id = body["new_id"].as_i64().unwrap();
    assert_ne!(new_id, id);

    let body = json_body(get(&app, "/api/glossaries").await).await;
    assert_eq!(body["total"], 2);

    let copy = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|g| g["id"].as_i64() == Some(new_id))
        .unwrap();
    assert_eq!(copy["title"], "Animals (copy)");
    assert_eq!(copy["share_flag"], "N");
}

#[tokio::test]
async fn test_delete_glossary_is_permanent() {
    let app = spawn_app().await;

    let form = "title=Animals&share_flag=N&origin_lang=en&target_lang=fr";
    let created = json_body(post_form(&app, "/api/glossaries", form).await).await;
    let id = created["id"].as_i64().unwrap();

    let response = delete(&app, &format!("/api/glossaries/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(get(&app, "/api/glossaries").await).await;
    assert_eq!(body["total"], 0);

    let response = delete(&app, &format!("/api/glossaries/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_template_download_is_public() {
    let app = spawn_app().await;

    let response = send(
        &app,
        Request::builder()
            .uri("/api/glossaries/template")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        lexshare::sheets::XLSX_MIME
    );

    let bytes = raw_body(response).await;
    let rows = lexshare::sheets::read_term_rows(&bytes).unwrap();
    assert!(rows.is_empty());
}

fn multipart_body(boundary: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"file\"; filename=\"import.xlsx\"\r\n",
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

#[tokio::test]
async fn test_import_then_export_round_trips() {
    let app = spawn_app().await;

    let rows = vec![
        ("cat".to_string(), "chat".to_string()),
        ("dog".to_string(), "chien".to_string()),
    ];
    let workbook = lexshare::sheets::glossary_workbook(&rows).unwrap();

    let boundary = "lexshare-test-boundary";
    let response = send(
        &app,
        authed("POST", "/api/glossaries/import")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(multipart_body(boundary, &workbook)))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let created = json_body(response).await;
    let id = created["id"].as_i64().unwrap();

    let body = json_body(get(&app, "/api/glossaries").await).await;
    let glossary = &body["data"][0];
    assert_eq!(glossary["title"], "Imported glossary");
    assert_eq!(glossary["origin_lang"], "unknown");
    assert_eq!(glossary["target_lang"], "unknown");

    // Own and unshared, so the export is allowed
    let response = get(&app, &format!("/api/glossaries/{id}/export")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = raw_body(response).await;
    let exported = lexshare::sheets::read_term_rows(&bytes).unwrap();
    assert_eq!(exported, rows);
}

#[tokio::test]
async fn test_import_rejects_wrong_columns() {
    let app = spawn_app().await;

    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "word").unwrap();
    sheet.write_string(0, 1, "meaning").unwrap();
    let bytes = workbook.save_to_buffer().unwrap();

    let boundary = "lexshare-test-boundary";
    let response = send(
        &app,
        authed("POST", "/api/glossaries/import")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(multipart_body(boundary, &bytes)))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);

    let body = json_body(response).await;
    assert_eq!(body["code"], 406);
}

#[tokio::test]
async fn test_export_rejects_shared_glossary() {
    let app = spawn_app().await;

    let form = "title=Animals&share_flag=Y&origin_lang=en&target_lang=fr\
                &content[0][origin]=cat&content[0][target]=chat";
    let created = json_body(post_form(&app, "/api/glossaries", form).await).await;
    let id = created["id"].as_i64().unwrap();

    let response = get(&app, &format!("/api/glossaries/{id}/export")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = json_body(response).await;
    assert_eq!(body["code"], 403);
}

#[tokio::test]
async fn test_export_all_bundles_every_glossary() {
    let app = spawn_app().await;

    let form = "title=First&share_flag=N&origin_lang=en&target_lang=fr\
                &content[0][origin]=cat&content[0][target]=chat";
    post_form(&app, "/api/glossaries", form).await;

    let form = "title=Second&share_flag=Y&origin_lang=en&target_lang=de";
    post_form(&app, "/api/glossaries", form).await;

    let response = get(&app, "/api/glossaries/export").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        lexshare::sheets::ZIP_MIME
    );

    let bytes = raw_body(response).await;
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 2);
    assert!(archive.by_name("First.xlsx").is_ok());
    assert!(archive.by_name("Second.xlsx").is_ok());
}

#[tokio::test]
async fn test_prompt_create_validates_lengths() {
    let app = spawn_app().await;

    let response = post_form(&app, "/api/prompts", "title=Greeting").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let long_title = "t".repeat(256);
    let response = post_form(
        &app,
        "/api/prompts",
        &format!("title={long_title}&content=hello"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let long_content = "c".repeat(5001);
    let response = post_form(
        &app,
        "/api/prompts",
        &format!("title=Greeting&content={long_content}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_form(&app, "/api/prompts", "title=Greeting&content=hello").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert!(body["id"].is_i64());
    assert_eq!(body["message"], "Created");
}

#[tokio::test]
async fn test_prompt_delete_is_soft() {
    let app = spawn_app().await;

    let created = json_body(post_form(&app, "/api/prompts", "title=Greeting&content=hello").await)
        .await;
    let id = created["id"].as_i64().unwrap();

    let response = delete(&app, &format!("/api/prompts/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Hidden from the list
    let body = json_body(get(&app, "/api/prompts").await).await;
    assert_eq!(body["total"], 0);

    // Edits no longer find it
    let response = post_form(&app, &format!("/api/prompts/{id}"), "title=Renamed").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // But the delete endpoint still matches the row by ownership
    let response = delete(&app, &format!("/api/prompts/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_shared_prompt_list_is_public() {
    let app = spawn_app().await;

    let created = json_body(
        post_form(
            &app,
            "/api/prompts",
            "title=Greeting&content=hello&share_flag=Y",
        )
        .await,
    )
    .await;
    let id = created["id"].as_i64().unwrap();
    assert!(id > 0);

    // No API key, no session
    let response = send(
        &app,
        Request::builder()
            .uri("/api/prompts/shared?porder=latest")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["title"], "Greeting");
    assert_eq!(body["data"][0]["email"], DEFAULT_EMAIL);
    assert_eq!(body["data"][0]["fav_count"], 0);
}

#[tokio::test]
async fn test_prompt_favorite_moves_added_count() {
    let app = spawn_app().await;

    let created = json_body(
        post_form(
            &app,
            "/api/prompts",
            "title=Greeting&content=hello&share_flag=Y",
        )
        .await,
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    post_form(&app, &format!("/api/prompts/{id}/favorite"), "").await;

    let body = json_body(get(&app, "/api/prompts/shared").await).await;
    assert_eq!(body["data"][0]["added_count"], 1);
    assert_eq!(body["data"][0]["fav_count"], 1);

    post_form(&app, &format!("/api/prompts/{id}/favorite"), "").await;

    let body = json_body(get(&app, "/api/prompts/shared").await).await;
    assert_eq!(body["data"][0]["added_count"], 0);
    assert_eq!(body["data"][0]["fav_count"], 0);
}

#[tokio::test]
async fn test_prompt_copy_resets_counters() {
    let app = spawn_app().await;

    let created = json_body(post_form(&app, "/api/prompts", "title=Greeting&content=hello").await)
        .await;
    let id = created["id"].as_i64().unwrap();

    // Not shared yet
    let response = post_form(&app, &format!("/api/prompts/{id}/copy"), "").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    post_form(&app, &format!("/api/prompts/{id}/share"), "share_flag=Y").await;
    post_form(&app, &format!("/api/prompts/{id}/favorite"), "").await;

    let response = post_form(&app, &format!("/api/prompts/{id}/copy"), "").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["message"], "Copied");
    let new_id = body["new_id"].as_i64().unwrap();
    assert_ne!(new_id, id);

    let body = json_body(get(&app, "/api/prompts").await).await;
    let copy = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"].as_i64() == Some(new_id))
        .unwrap();
    assert_eq!(copy["title"], "Greeting (copy)");
    assert_eq!(copy["share_flag"], "N");
}
