use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{Duration, Utc};
use library_rental::api::{AppState, create_router};
use library_rental::auth::{TokenIssuer, TokenType};
use library_rental::domain::{Payment, PaymentType, User};
use library_rental::ports::{BorrowingRepository, PaymentRepository};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

mod common;

// ============================================================================
// E2Eテスト用のヘルパー関数
// ============================================================================

struct TestApp {
    router: axum::Router,
    ctx: common::TestContext,
    tokens: TokenIssuer,
}

struct TestResponse {
    status: StatusCode,
    location: Option<String>,
    body: Value,
}

/// インメモリアダプターと実際のAPIルーターでアプリケーションを組み立てる
fn setup_e2e_app() -> TestApp {
    let ctx = common::in_memory_context();
    let tokens = TokenIssuer::new("e2e-secret", Duration::minutes(5), Duration::minutes(30));

    let app_state = Arc::new(AppState {
        service_deps: ctx.deps.clone(),
        tokens: tokens.clone(),
    });

    TestApp {
        router: create_router(app_state),
        ctx,
        tokens,
    }
}

impl TestApp {
    fn access_token(&self, user: &User) -> String {
        self.tokens.issue(user.id, TokenType::Access).unwrap()
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|value| value.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            location,
            body,
        }
    }
}

fn book_body(inventory: i32) -> Value {
    json!({
        "title": "The Rust Programming Language",
        "author": "Steve Klabnik",
        "cover": "SOFT",
        "inventory": inventory,
        "daily_fee": "2.00",
    })
}

// ============================================================================
// ヘルスチェック・書籍
// ============================================================================

#[tokio::test]
async fn test_e2e_health_check() {
    let app = setup_e2e_app();

    let response = app.send("GET", "/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, Value::String("OK".to_string()));
}

#[tokio::test]
async fn test_e2e_books_are_public_to_read() {
    let app = setup_e2e_app();
    common::seed_book(&app.ctx.deps, 3, Decimal::new(150, 2)).await;

    let response = app.send("GET", "/books", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["count"], 1);
    assert_eq!(response.body["page"], 1);
    assert_eq!(response.body["page_size"], 20);
    assert_eq!(response.body["results"][0]["daily_fee"], "1.50");
    assert_eq!(response.body["results"][0]["cover"], "HARD");
}

#[tokio::test]
async fn test_e2e_book_writes_require_staff() {
    let app = setup_e2e_app();
    let reader = common::seed_user(&app.ctx.deps, "reader@test.com", false).await;
    let token = app.access_token(&reader);

    let anonymous = app.send("POST", "/books", None, Some(book_body(3))).await;
    let forbidden = app
        .send("POST", "/books", Some(&token), Some(book_body(3)))
        .await;

    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
    assert_eq!(forbidden.body["error"], "PERMISSION_DENIED");
}

#[tokio::test]
async fn test_e2e_staff_manages_catalog() {
    let app = setup_e2e_app();
    let staff = common::seed_user(&app.ctx.deps, "staff@test.com", true).await;
    let token = app.access_token(&staff);

    // 作成
    let created = app
        .send("POST", "/books", Some(&token), Some(book_body(4)))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["cover"], "SOFT");
    let book_id = created.body["id"].as_str().unwrap().to_string();

    // 更新（全項目置き換え）
    let mut update = book_body(7);
    update["title"] = json!("Programming Rust");
    let updated = app
        .send("PUT", &format!("/books/{}", book_id), Some(&token), Some(update))
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["title"], "Programming Rust");
    assert_eq!(updated.body["inventory"], 7);

    // 在庫0は不正
    let invalid = app
        .send("POST", "/books", Some(&token), Some(book_body(0)))
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    assert_eq!(invalid.body["error"], "INVALID_BOOK");

    // 削除（貸出なし）
    let deleted = app
        .send("DELETE", &format!("/books/{}", book_id), Some(&token), None)
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let missing = app
        .send("GET", &format!("/books/{}", book_id), None, None)
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_e2e_malformed_json_is_bad_request() {
    let app = setup_e2e_app();
    let staff = common::seed_user(&app.ctx.deps, "staff@test.com", true).await;
    let token = app.access_token(&staff);

    let response = app
        .send(
            "POST",
            "/books",
            Some(&token),
            Some(json!({ "title": "No author" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_e2e_delete_book_with_borrowings_is_rejected() {
    let app = setup_e2e_app();
    let staff = common::seed_user(&app.ctx.deps, "staff@test.com", true).await;
    let token = app.access_token(&staff);
    let book = common::seed_book(&app.ctx.deps, 2, Decimal::ONE).await;

    let borrowed = app
        .send(
            "POST",
            "/borrowings",
            Some(&token),
            Some(json!({
                "book": book.id.value(),
                "expected_return_date": Utc::now() + Duration::days(2),
            })),
        )
        .await;
    assert_eq!(borrowed.status, StatusCode::CREATED);

    let response = app
        .send("DELETE", &format!("/books/{}", book.id.value()), Some(&token), None)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "BOOK_HAS_BORROWINGS");
}

// ============================================================================
// 貸出
// ============================================================================

#[tokio::test]
async fn test_e2e_full_borrowing_flow() {
    // Arrange
    let app = setup_e2e_app();
    let reader = common::seed_user(&app.ctx.deps, "reader@test.com", false).await;
    let staff = common::seed_user(&app.ctx.deps, "staff@test.com", true).await;
    let reader_token = app.access_token(&reader);
    let staff_token = app.access_token(&staff);
    let book = common::seed_book(&app.ctx.deps, 5, Decimal::new(200, 2)).await;

    // Step 1: 貸出作成（POST /borrowings）
    let created = app
        .send(
            "POST",
            "/borrowings",
            Some(&reader_token),
            Some(json!({
                "book": book.id.value(),
                "expected_return_date": Utc::now() + Duration::days(3) + Duration::minutes(1),
            })),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["payment"]["money_to_pay"], "6.00");
    assert_eq!(created.body["payment"]["status"], "PENDING");
    assert_eq!(created.body["payment"]["payment_type"], "PAYMENT");
    let borrowing_id = created.body["id"].as_str().unwrap().to_string();
    let session_id = created.body["payment"]["session_id"]
        .as_str()
        .unwrap()
        .to_string();

    // Step 2: 在庫が1減っている
    let book_view = app
        .send("GET", &format!("/books/{}", book.id.value()), None, None)
        .await;
    assert_eq!(book_view.body["inventory"], 4);

    // Step 3: 詳細（書籍・利用者・支払いを含む）
    let detail = app
        .send(
            "GET",
            &format!("/borrowings/{}", borrowing_id),
            Some(&reader_token),
            None,
        )
        .await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.body["book"]["id"], json!(book.id.value()));
    assert_eq!(detail.body["user"]["email"], "reader@test.com");
    assert_eq!(detail.body["payments"].as_array().unwrap().len(), 1);

    // Step 4: 決済完了
    let success = app
        .send(
            "GET",
            &format!("/payments/success?session_id={}", session_id),
            Some(&reader_token),
            None,
        )
        .await;
    assert_eq!(success.status, StatusCode::OK);
    assert_eq!(
        success.body["message"],
        "Thanks for your payment, reader@test.com!"
    );

    // Step 5: 利用者は返却できない
    let forbidden = app
        .send(
            "POST",
            &format!("/borrowings/{}/return", borrowing_id),
            Some(&reader_token),
            None,
        )
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    // Step 6: 職員が期限内に返却
    let returned = app
        .send(
            "POST",
            &format!("/borrowings/{}/return", borrowing_id),
            Some(&staff_token),
            None,
        )
        .await;
    assert_eq!(returned.status, StatusCode::OK);
    assert!(returned.body["actual_return_date"].is_string());

    // Step 7: 二重返却は競合
    let again = app
        .send(
            "POST",
            &format!("/borrowings/{}/return", borrowing_id),
            Some(&staff_token),
            None,
        )
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);

    let book_view = app
        .send("GET", &format!("/books/{}", book.id.value()), None, None)
        .await;
    assert_eq!(book_view.body["inventory"], 5);
}

#[tokio::test]
async fn test_e2e_late_return_redirects_to_fine_checkout() {
    let app = setup_e2e_app();
    let reader = common::seed_user(&app.ctx.deps, "reader@test.com", false).await;
    let staff = common::seed_user(&app.ctx.deps, "staff@test.com", true).await;
    let book = common::seed_book(&app.ctx.deps, 1, Decimal::new(200, 2)).await;

    // 2日延滞中の貸出を直接用意する
    let now = Utc::now();
    let borrowing = common::borrowing(
        book.id,
        reader.id,
        now - Duration::days(5),
        now - Duration::days(2) - Duration::minutes(1),
    );
    let payment = Payment::pending(
        PaymentType::Payment,
        borrowing.id,
        "cs_test_seed".to_string(),
        "https://checkout.test/cs_test_seed".to_string(),
        Decimal::new(600, 2),
    );
    app.ctx
        .deps
        .borrowings
        .open(&borrowing, &payment)
        .await
        .unwrap();

    let response = app
        .send(
            "POST",
            &format!("/borrowings/{}/return", borrowing.id.value()),
            Some(&app.access_token(&staff)),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    let location = response.location.expect("redirect should carry a location");

    let payments = app
        .ctx
        .deps
        .payments
        .find_by_borrowing(borrowing.id)
        .await
        .unwrap();
    let fine = payments
        .iter()
        .find(|p| p.payment_type == PaymentType::Fine)
        .expect("fine should be recorded");
    assert_eq!(fine.money_to_pay, Decimal::new(800, 2));
    assert_eq!(location, fine.session_url);
}

#[tokio::test]
async fn test_e2e_borrowing_validation_errors() {
    let app = setup_e2e_app();
    let reader = common::seed_user(&app.ctx.deps, "reader@test.com", false).await;
    let token = app.access_token(&reader);
    let empty = common::seed_book(&app.ctx.deps, 0, Decimal::ONE).await;
    let stocked = common::seed_book(&app.ctx.deps, 1, Decimal::ONE).await;

    let out_of_stock = app
        .send(
            "POST",
            "/borrowings",
            Some(&token),
            Some(json!({
                "book": empty.id.value(),
                "expected_return_date": Utc::now() + Duration::days(2),
            })),
        )
        .await;
    assert_eq!(out_of_stock.status, StatusCode::BAD_REQUEST);
    assert_eq!(out_of_stock.body["message"], "Book is out of stock");

    let too_soon = app
        .send(
            "POST",
            "/borrowings",
            Some(&token),
            Some(json!({
                "book": stocked.id.value(),
                "expected_return_date": Utc::now() + Duration::hours(2),
            })),
        )
        .await;
    assert_eq!(too_soon.status, StatusCode::BAD_REQUEST);
    assert_eq!(too_soon.body["error"], "INVALID_BORROWING");
}

#[tokio::test]
async fn test_e2e_borrowings_require_authentication() {
    let app = setup_e2e_app();

    let list = app.send("GET", "/borrowings", None, None).await;
    let invalid = app
        .send("GET", "/borrowings", Some("not-a-token"), None)
        .await;

    assert_eq!(list.status, StatusCode::UNAUTHORIZED);
    assert_eq!(list.body["error"], "NOT_AUTHENTICATED");
    assert_eq!(invalid.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_e2e_list_borrowings_is_scoped_to_owner() {
    let app = setup_e2e_app();
    let alice = common::seed_user(&app.ctx.deps, "alice@test.com", false).await;
    let bob = common::seed_user(&app.ctx.deps, "bob@test.com", false).await;
    let staff = common::seed_user(&app.ctx.deps, "staff@test.com", true).await;
    let book = common::seed_book(&app.ctx.deps, 5, Decimal::ONE).await;

    for user in [&alice, &bob, &bob] {
        let response = app
            .send(
                "POST",
                "/borrowings",
                Some(&app.access_token(user)),
                Some(json!({
                    "book": book.id.value(),
                    "expected_return_date": Utc::now() + Duration::days(2),
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    let alice_view = app
        .send("GET", "/borrowings", Some(&app.access_token(&alice)), None)
        .await;
    assert_eq!(alice_view.body["count"], 1);

    let staff_token = app.access_token(&staff);
    let staff_view = app
        .send("GET", "/borrowings?page_size=2", Some(&staff_token), None)
        .await;
    assert_eq!(staff_view.body["count"], 3);
    assert_eq!(staff_view.body["results"].as_array().unwrap().len(), 2);

    let bob_only = app
        .send(
            "GET",
            &format!("/borrowings?user_id={}&is_active=true", bob.id.value()),
            Some(&staff_token),
            None,
        )
        .await;
    assert_eq!(bob_only.body["count"], 2);

    // 他人の貸出詳細は見えない
    let bob_borrowing = bob_only.body["results"][0]["id"].as_str().unwrap().to_string();
    let hidden = app
        .send(
            "GET",
            &format!("/borrowings/{}", bob_borrowing),
            Some(&app.access_token(&alice)),
            None,
        )
        .await;
    assert_eq!(hidden.status, StatusCode::NOT_FOUND);
}

// ============================================================================
// 支払い
// ============================================================================

#[tokio::test]
async fn test_e2e_payments_endpoints() {
    let app = setup_e2e_app();
    let reader = common::seed_user(&app.ctx.deps, "reader@test.com", false).await;
    let token = app.access_token(&reader);

    let anonymous = app.send("GET", "/payments", None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let listed = app.send("GET", "/payments", Some(&token), None).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body["count"], 0);

    let not_allowed = app
        .send("POST", "/payments", Some(&token), Some(json!({})))
        .await;
    assert_eq!(not_allowed.status, StatusCode::METHOD_NOT_ALLOWED);

    let missing_session = app
        .send("GET", "/payments/success", Some(&token), None)
        .await;
    assert_eq!(missing_session.status, StatusCode::BAD_REQUEST);

    let unknown_session = app
        .send(
            "GET",
            "/payments/success?session_id=cs_test_unknown",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(unknown_session.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        unknown_session.body["message"],
        "No such checkout.session: 'cs_test_unknown'"
    );

    let cancel = app
        .send("GET", "/payments/cancel", Some(&token), None)
        .await;
    assert_eq!(cancel.status, StatusCode::OK);
    assert!(
        cancel.body["message"]
            .as_str()
            .unwrap()
            .contains("only 24 hours")
    );
}

// ============================================================================
// 利用者・トークン
// ============================================================================

#[tokio::test]
async fn test_e2e_registration_requires_email() {
    let app = setup_e2e_app();

    let response = app
        .send("POST", "/users", None, Some(json!({ "password": "secret123" })))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "INVALID_USER");
}

#[tokio::test]
async fn test_e2e_registration_and_token_round_trip() {
    let app = setup_e2e_app();
    let credentials = json!({
        "email": "new@test.com",
        "password": "secret123",
    });

    let registered = app
        .send("POST", "/users", None, Some(credentials.clone()))
        .await;
    assert_eq!(registered.status, StatusCode::CREATED);
    assert_eq!(registered.body["email"], "new@test.com");
    assert_eq!(registered.body["is_staff"], false);
    assert!(registered.body.get("password_hash").is_none());

    let duplicate = app
        .send("POST", "/users", None, Some(credentials.clone()))
        .await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);

    let pair = app
        .send("POST", "/users/token", None, Some(credentials))
        .await;
    assert_eq!(pair.status, StatusCode::OK);
    let access = pair.body["access"].as_str().unwrap().to_string();
    let refresh = pair.body["refresh"].as_str().unwrap().to_string();

    let refreshed = app
        .send(
            "POST",
            "/users/token/refresh",
            None,
            Some(json!({ "refresh": refresh })),
        )
        .await;
    assert_eq!(refreshed.status, StatusCode::OK);
    assert!(refreshed.body["access"].is_string());

    let verified = app
        .send(
            "POST",
            "/users/token/verify",
            None,
            Some(json!({ "token": access })),
        )
        .await;
    assert_eq!(verified.status, StatusCode::OK);
    assert_eq!(verified.body, json!({}));

    let me = app.send("GET", "/users/me", Some(&access), None).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["email"], "new@test.com");

    // リフレッシュトークンではAPIを呼べない
    let wrong_type = app.send("GET", "/users/me", Some(&refresh), None).await;
    assert_eq!(wrong_type.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_e2e_token_errors() {
    let app = setup_e2e_app();

    let bad_credentials = app
        .send(
            "POST",
            "/users/token",
            None,
            Some(json!({ "email": "nobody@test.com", "password": "secret123" })),
        )
        .await;
    let bad_token = app
        .send(
            "POST",
            "/users/token/verify",
            None,
            Some(json!({ "token": "garbage" })),
        )
        .await;

    assert_eq!(bad_credentials.status, StatusCode::UNAUTHORIZED);
    assert_eq!(bad_token.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_e2e_update_profile() {
    let app = setup_e2e_app();
    let reader = common::seed_user(&app.ctx.deps, "reader@test.com", false).await;
    common::seed_user(&app.ctx.deps, "taken@test.com", false).await;
    let token = app.access_token(&reader);

    let updated = app
        .send(
            "PUT",
            "/users/me",
            Some(&token),
            Some(json!({
                "email": "renamed@test.com",
                "password": "secret123",
                "first_name": "Re",
                "last_name": "Named",
            })),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["email"], "renamed@test.com");
    assert_eq!(updated.body["first_name"], "Re");

    let conflict = app
        .send(
            "PUT",
            "/users/me",
            Some(&token),
            Some(json!({
                "email": "taken@test.com",
                "password": "secret123",
            })),
        )
        .await;
    assert_eq!(conflict.status, StatusCode::BAD_REQUEST);
    assert_eq!(conflict.body["error"], "EMAIL_TAKEN");
}
