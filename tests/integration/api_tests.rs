//! API integration tests

use bookshelf_api::{api, AppConfig, AppState};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

/// Start a server on an ephemeral port and return its base URL
async fn spawn_server() -> String {
    spawn_server_with(AppConfig::default()).await
}

async fn spawn_server_with(config: AppConfig) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let addr = listener.local_addr().expect("No local address");
    let app = api::create_router(AppState::new(config));

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server error");
    });

    format!("http://{}", addr)
}

fn book_body(name: &str, page_count: u32, read_page: u32, reading: bool) -> Value {
    json!({
        "name": name,
        "year": 2020,
        "author": "X",
        "summary": "s",
        "publisher": "P",
        "pageCount": page_count,
        "readPage": read_page,
        "reading": reading
    })
}

/// Create a book and return its id
async fn create_book(client: &Client, base: &str, body: &Value) -> String {
    let response = client
        .post(format!("{}/books", base))
        .json(body)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse response");
    body["data"]["bookId"].as_str().expect("No book ID").to_string()
}

async fn list_names(client: &Client, base: &str, query: &str) -> Vec<String> {
    let response = client
        .get(format!("{}/books{}", base, query))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "success");
    body["data"]["books"]
        .as_array()
        .expect("No books array")
        .iter()
        .map(|book| book["name"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let base = spawn_server().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/health", base))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_create_and_get_book() {
    let base = spawn_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/books", base))
        .json(&json!({
            "name": "A",
            "year": 2020,
            "author": "X",
            "summary": "s",
            "publisher": "P",
            "pageCount": 100,
            "readPage": 100,
            "reading": false
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Buku berhasil ditambahkan");
    let book_id = body["data"]["bookId"].as_str().expect("No book ID");
    assert_eq!(book_id.len(), 16);

    let response = client
        .get(format!("{}/books/{}", base, book_id))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    let book = &body["data"]["book"];
    assert_eq!(body["status"], "success");
    assert_eq!(book["id"], book_id);
    assert_eq!(book["name"], "A");
    assert_eq!(book["year"], 2020);
    assert_eq!(book["author"], "X");
    assert_eq!(book["summary"], "s");
    assert_eq!(book["publisher"], "P");
    assert_eq!(book["pageCount"], 100);
    assert_eq!(book["readPage"], 100);
    assert_eq!(book["reading"], false);
    assert_eq!(book["finished"], true);
    assert!(book["insertedAt"].is_string());
    assert_eq!(book["insertedAt"], book["updatedAt"]);
}

#[tokio::test]
async fn test_create_rejections_leave_store_empty() {
    let base = spawn_server().await;
    let client = Client::new();

    let cases = [
        (
            book_body("A", 100, 150, false),
            "Gagal menambahkan buku. readPage tidak boleh lebih besar dari pageCount",
        ),
        (book_body("   ", 100, 10, false), "Gagal menambahkan buku. Mohon isi nama buku"),
        (json!({ "year": 2020 }), "Gagal menambahkan buku. Mohon isi nama buku"),
        (
            json!({ "name": "A", "year": "2020", "author": "X", "summary": "s",
                    "publisher": "P", "pageCount": 10, "readPage": 1, "reading": false }),
            "Request tidak valid!",
        ),
    ];

    for (payload, message) in cases {
        let response = client
            .post(format!("{}/books", base))
            .json(&payload)
            .send()
            .await
            .expect("Failed to send request");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["status"], "fail");
        assert_eq!(body["message"], message);
    }

    assert!(list_names(&client, &base, "").await.is_empty());
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let base = spawn_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/books", base))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Request tidak valid!");
}

#[tokio::test]
async fn test_list_filters() {
    let base = spawn_server().await;
    let client = Client::new();

    create_book(&client, &base, &book_body("Alpha", 100, 10, true)).await;
    create_book(&client, &base, &book_body("Boo", 100, 100, true)).await;
    create_book(&client, &base, &book_body("Cider", 100, 100, false)).await;

    assert_eq!(list_names(&client, &base, "").await, ["Alpha", "Boo", "Cider"]);
    assert_eq!(list_names(&client, &base, "?reading=1&finished=0").await, ["Alpha"]);
    assert_eq!(list_names(&client, &base, "?reading=1").await, ["Alpha", "Boo"]);
    assert_eq!(list_names(&client, &base, "?finished=1").await, ["Boo", "Cider"]);
    assert_eq!(list_names(&client, &base, "?reading=0").await, ["Cider"]);
    assert_eq!(list_names(&client, &base, "?name=AL").await, ["Alpha"]);
    assert_eq!(list_names(&client, &base, "?name=o&finished=1").await, ["Boo"]);

    let response = client
        .get(format!("{}/books", base))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let first = body["data"]["books"][0].as_object().expect("No book");
    let mut keys: Vec<_> = first.keys().cloned().collect();
    keys.sort();
    assert_eq!(keys, ["id", "name", "publisher"]);
}

#[tokio::test]
async fn test_update_book() {
    let base = spawn_server().await;
    let client = Client::new();
    let book_id = create_book(&client, &base, &book_body("A", 100, 100, false)).await;

    let response = client
        .put(format!("{}/books/{}", base, book_id))
        .json(&book_body("Renamed", 300, 30, true))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Buku berhasil diperbarui");

    let response = client
        .get(format!("{}/books/{}", base, book_id))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let book = &body["data"]["book"];
    assert_eq!(book["name"], "Renamed");
    assert_eq!(book["pageCount"], 300);
    assert_eq!(book["reading"], true);
    // finished is not re-derived on update
    assert_eq!(book["finished"], true);

    let response = client
        .put(format!("{}/books/{}", base, book_id))
        .json(&book_body("Renamed", 10, 30, true))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(
        body["message"],
        "Gagal memperbarui buku. readPage tidak boleh lebih besar dari pageCount"
    );
}

#[tokio::test]
async fn test_update_recomputes_finished_when_configured() {
    let mut config = AppConfig::default();
    config.catalog.recompute_finished_on_update = true;
    let base = spawn_server_with(config).await;
    let client = Client::new();
    let book_id = create_book(&client, &base, &book_body("A", 100, 100, false)).await;

    let response = client
        .put(format!("{}/books/{}", base, book_id))
        .json(&book_body("A", 300, 30, true))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(format!("{}/books/{}", base, book_id))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["book"]["finished"], false);
}

#[tokio::test]
async fn test_unknown_id() {
    let base = spawn_server().await;
    let client = Client::new();
    create_book(&client, &base, &book_body("A", 10, 1, false)).await;

    let response = client
        .get(format!("{}/books/xxxxxxxxxxxxxxxx", base))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Buku tidak ditemukan");

    let response = client
        .put(format!("{}/books/xxxxxxxxxxxxxxxx", base))
        .json(&book_body("B", 10, 1, false))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Gagal memperbarui buku. Id tidak ditemukan");

    let response = client
        .delete(format!("{}/books/xxxxxxxxxxxxxxxx", base))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Buku gagal dihapus. Id tidak ditemukan");

    assert_eq!(list_names(&client, &base, "").await, ["A"]);
}

#[tokio::test]
async fn test_delete_preserves_order() {
    let base = spawn_server().await;
    let client = Client::new();
    create_book(&client, &base, &book_body("A", 10, 1, false)).await;
    let middle = create_book(&client, &base, &book_body("B", 10, 1, false)).await;
    create_book(&client, &base, &book_body("C", 10, 1, false)).await;

    let response = client
        .delete(format!("{}/books/{}", base, middle))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Buku berhasil dihapus");

    assert_eq!(list_names(&client, &base, "").await, ["A", "C"]);
}

#[tokio::test]
async fn test_array_body_rejected() {
    let base = spawn_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/books", base))
        .json(&json!(["Buku", 2020, "X", "s", "P", 100, 10, false]))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Request tidak valid!");

    assert!(list_names(&client, &base, "").await.is_empty());
}

#[tokio::test]
async fn test_duplicate_query_param_rejected_as_json() {
    let base = spawn_server().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/books?reading=1&reading=0", base))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Request tidak valid!");
}

#[tokio::test]
async fn test_invalid_utf8_path_rejected_as_json() {
    let base = spawn_server().await;
    let client = Client::new();

    for request in [
        client.get(format!("{}/books/%FF", base)),
        client.delete(format!("{}/books/%FF", base)),
    ] {
        let response = request.send().await.expect("Failed to send request");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["status"], "fail");
        assert_eq!(body["message"], "Request tidak valid!");
    }
}

#[tokio::test]
async fn test_update_rejections() {
    let base = spawn_server().await;
    let client = Client::new();
    let book_id = create_book(&client, &base, &book_body("A", 10, 1, false)).await;

    let mut wrong_type = book_body("A", 10, 1, false);
    wrong_type["reading"] = json!("yes");

    let cases = [
        (book_body("  ", 10, 1, false), "Gagal memperbarui buku. Mohon isi nama buku"),
        (wrong_type, "Request tidak valid!"),
    ];

    for (payload, message) in cases {
        let response = client
            .put(format!("{}/books/{}", base, book_id))
            .json(&payload)
            .send()
            .await
            .expect("Failed to send request");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["status"], "fail");
        assert_eq!(body["message"], message);
    }

    let response = client
        .get(format!("{}/books/{}", base, book_id))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["book"]["name"], "A");
    assert_eq!(body["data"]["book"]["reading"], false);
}
