//! API integration tests
//!
//! These run against a live server with a freshly migrated database:
//! `cargo run`, then `cargo test -- --ignored`.

use reqwest::Client;
use serde_json::{json, Value};

use pustaka_server::models::user::{Claims, Role};

const BASE_URL: &str = "http://localhost:8080/api/v1";

// Users seeded by the initial migration
const ADMIN_ID: i32 = 1;
const STAFF_ID: i32 = 2;
const MEMBER_ID: i32 = 3;

fn secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|_| "change-this-secret-in-production".to_string())
}

fn token_for(user_id: i32, username: &str, role: Role) -> String {
    Claims::new(user_id, username, role, 1)
        .create_token(&secret())
        .expect("Failed to sign test token")
}

fn admin_token() -> String {
    token_for(ADMIN_ID, "admin", Role::Admin)
}

fn staff_token() -> String {
    token_for(STAFF_ID, "staff", Role::Staff)
}

fn member_token() -> String {
    token_for(MEMBER_ID, "member", Role::Member)
}

/// Submit a book as staff and approve it as admin; returns the book id
async fn create_approved_book(client: &Client, title: &str, stock: i32) -> i64 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(staff_token())
        .json(&json!({ "title": title, "stock_total": stock }))
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse book");
    assert_eq!(body["status"], "pending");
    let book_id = body["id"].as_i64().expect("No book ID");

    let response = client
        .post(format!("{}/approvals", BASE_URL))
        .bearer_auth(admin_token())
        .json(&json!({ "book_id": book_id, "decision": "approve" }))
        .send()
        .await
        .expect("Failed to approve book");
    assert_eq!(response.status(), 200);

    book_id
}

async fn get_book(client: &Client, book_id: i64) -> Value {
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(member_token())
        .send()
        .await
        .expect("Failed to get book");
    assert!(response.status().is_success());
    response.json().await.expect("Failed to parse book")
}

/// Borrow as member and approve the loan as staff; returns the loan id
async fn borrow_and_approve(client: &Client, book_id: i64) -> i64 {
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .bearer_auth(member_token())
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to borrow");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse loan");
    assert_eq!(body["status"], "pending");
    let loan_id = body["id"].as_i64().expect("No loan ID");

    let response = client
        .post(format!("{}/loans/{}/decision", BASE_URL, loan_id))
        .bearer_auth(staff_token())
        .json(&json!({ "decision": "approve" }))
        .send()
        .await
        .expect("Failed to approve loan");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse decision");
    assert_eq!(body["status"], "dipinjam");

    loan_id
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_unauthenticated_access_denied() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_member_cannot_approve_books() {
    let client = Client::new();

    let response = client
        .post(format!("{}/approvals", BASE_URL))
        .bearer_auth(member_token())
        .json(&json!({ "book_id": 1, "decision": "approve" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_pending_book_is_not_borrowable() {
    let client = Client::new();

    // Scenario C: staff submits, nobody approves
    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(staff_token())
        .json(&json!({ "title": "Laskar Pelangi", "stock_total": 3 }))
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    let book_id = body["id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .bearer_auth(member_token())
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send borrow");
    assert_eq!(response.status(), 400);

    // Pending books are invisible to members
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(member_token())
        .send()
        .await
        .expect("Failed to get book");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_approval_unlocks_borrowing() {
    let client = Client::new();

    // Scenario D: approve, then borrowing succeeds
    let book_id = create_approved_book(&client, "Bumi Manusia", 2).await;

    let book = get_book(&client, book_id).await;
    assert_eq!(book["status"], "approved");
    assert_eq!(book["approved_by"], ADMIN_ID);
    assert!(!book["approved_at"].is_null());

    let loan_id = borrow_and_approve(&client, book_id).await;
    assert!(loan_id > 0);

    let book = get_book(&client, book_id).await;
    assert_eq!(book["stock_available"], 1);
}

#[tokio::test]
#[ignore]
async fn test_borrow_return_round_trip() {
    let client = Client::new();

    // Scenario A: borrow then on-time return restores stock, fine is zero
    let book_id = create_approved_book(&client, "Cantik Itu Luka", 2).await;
    let loan_id = borrow_and_approve(&client, book_id).await;

    let book = get_book(&client, book_id).await;
    assert_eq!(book["stock_available"], 1);

    let response = client
        .put(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .bearer_auth(member_token())
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to return");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse return");
    assert_eq!(body["status"], "returned");
    assert_eq!(body["fine"], 0);
    assert_eq!(body["loan"]["status"], "dikembalikan");
    assert!(!body["loan"]["returned_at"].is_null());

    let book = get_book(&client, book_id).await;
    assert_eq!(book["stock_available"], 2);
}

#[tokio::test]
#[ignore]
async fn test_double_return_is_rejected() {
    let client = Client::new();

    let book_id = create_approved_book(&client, "Pulang", 1).await;
    let loan_id = borrow_and_approve(&client, book_id).await;

    let response = client
        .put(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .bearer_auth(member_token())
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to return");
    assert_eq!(response.status(), 200);

    // Second return must fail without touching stock again
    let response = client
        .put(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .bearer_auth(member_token())
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send second return");
    assert_eq!(response.status(), 409);

    let book = get_book(&client, book_id).await;
    assert_eq!(book["stock_available"], 1);
}

#[tokio::test]
#[ignore]
async fn test_member_cannot_return_someone_elses_loan() {
    let client = Client::new();

    let book_id = create_approved_book(&client, "Perahu Kertas", 1).await;
    let loan_id = borrow_and_approve(&client, book_id).await;

    // A different member id in the body is refused outright
    let response = client
        .put(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .bearer_auth(member_token())
        .json(&json!({ "member_id": ADMIN_ID }))
        .send()
        .await
        .expect("Failed to send return");
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_open_loan_is_rejected() {
    let client = Client::new();

    let book_id = create_approved_book(&client, "Ronggeng Dukuh Paruk", 5).await;
    borrow_and_approve(&client, book_id).await;

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .bearer_auth(member_token())
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send borrow");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_borrows_of_last_copy() {
    let client = Client::new();

    let book_id = create_approved_book(&client, "Saman", 1).await;

    // Five members race for one copy; exactly one wins
    let mut handles = Vec::new();
    for i in 0..5 {
        let client = client.clone();
        // Pending requests don't trip the duplicate-loan check, so the
        // race is decided purely by the stock counter.
        let token = admin_token();
        handles.push(tokio::spawn(async move {
            client
                .post(format!("{}/loans", BASE_URL))
                .bearer_auth(token)
                .json(&json!({ "book_id": book_id, "user_id": (i % 3) + 1 }))
                .send()
                .await
                .map(|r| r.status().as_u16())
        }));
    }

    let mut created = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.expect("task panicked") {
            Ok(201) => created += 1,
            Ok(_) => rejected += 1,
            Err(e) => panic!("request failed: {}", e),
        }
    }

    assert_eq!(created, 1, "exactly one borrow may win the last copy");
    assert_eq!(rejected, 4);

    let book = get_book(&client, book_id).await;
    assert_eq!(book["stock_available"], 0);
}

#[tokio::test]
#[ignore]
async fn test_rejected_loan_releases_stock() {
    let client = Client::new();

    let book_id = create_approved_book(&client, "Negeri 5 Menara", 1).await;

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .bearer_auth(member_token())
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to borrow");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    let loan_id = body["id"].as_i64().unwrap();

    let book = get_book(&client, book_id).await;
    assert_eq!(book["stock_available"], 0);

    let response = client
        .post(format!("{}/loans/{}/decision", BASE_URL, loan_id))
        .bearer_auth(staff_token())
        .json(&json!({ "decision": "reject" }))
        .send()
        .await
        .expect("Failed to reject loan");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "rejected");

    let book = get_book(&client, book_id).await;
    assert_eq!(book["stock_available"], 1);
}

#[tokio::test]
#[ignore]
async fn test_loan_duration_is_bounded() {
    let client = Client::new();

    let book_id = create_approved_book(&client, "Supernova", 1).await;

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .bearer_auth(member_token())
        .json(&json!({ "book_id": book_id, "duration_days": 90 }))
        .send()
        .await
        .expect("Failed to send borrow");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_fine_settings_are_admin_only() {
    let client = Client::new();

    let response = client
        .get(format!("{}/settings/fines", BASE_URL))
        .bearer_auth(member_token())
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let response = client
        .get(format!("{}/settings/fines", BASE_URL))
        .bearer_auth(admin_token())
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse settings");
    assert!(body["fine_per_day"].is_number());
    assert!(body["default_loan_days"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_member_ledger_lists_own_loans() {
    let client = Client::new();

    let book_id = create_approved_book(&client, "Orang-Orang Biasa", 2).await;
    borrow_and_approve(&client, book_id).await;

    let response = client
        .get(format!("{}/loans", BASE_URL))
        .bearer_auth(member_token())
        .send()
        .await
        .expect("Failed to list loans");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse loans");
    let rows = body.as_array().expect("expected an array");
    assert!(rows.iter().any(|l| l["book_id"].as_i64() == Some(book_id)));

    // Another member's ledger is off limits
    let response = client
        .get(format!("{}/loans?user_id={}", BASE_URL, STAFF_ID))
        .bearer_auth(member_token())
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);
}
