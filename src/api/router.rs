use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{AppState, books, borrowings, payments, users};

/// Creates the API router with every library endpoint
///
/// Catalog:
/// - GET/POST /books, GET/PUT/DELETE /books/:id
///
/// Borrowings:
/// - GET/POST /borrowings, GET /borrowings/:id
/// - POST /borrowings/:id/return
///
/// Payments (read-only ledger plus the checkout return URLs):
/// - GET /payments, GET /payments/:id
/// - GET /payments/success, GET /payments/cancel
///
/// Users:
/// - POST /users, GET/PUT /users/me
/// - POST /users/token, /users/token/refresh, /users/token/verify
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route(
            "/borrowings",
            get(borrowings::list_borrowings).post(borrowings::create_borrowing),
        )
        .route("/borrowings/:id", get(borrowings::get_borrowing))
        .route("/borrowings/:id/return", post(borrowings::return_borrowing))
        .route("/payments", get(payments::list_payments))
        .route("/payments/success", get(payments::payment_success))
        .route("/payments/cancel", get(payments::payment_cancel))
        .route("/payments/:id", get(payments::get_payment))
        .route("/users", post(users::register))
        .route("/users/me", get(users::get_me).put(users::update_me))
        .route("/users/token", post(users::obtain_token))
        .route("/users/token/refresh", post(users::refresh_token))
        .route("/users/token/verify", post(users::verify_token))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
