//! PostgreSQLアダプターのテスト
//!
//! 実データベースが必要なため既定では無視する:
//! `DATABASE_URL=... cargo test -- --ignored`

mod common;

use chrono::{DateTime, Duration, Utc};
use futures::TryStreamExt;
use library_rental::adapters::postgres::{
    PostgresBookRepository, PostgresBorrowingRepository, PostgresPaymentRepository,
    PostgresUserRepository,
};
use library_rental::domain::{
    Book, Borrowing, Payment, PaymentStatus, PaymentType, User,
};
use library_rental::ports::{
    BookRepository, BorrowingFilter, BorrowingRepository, CloseOutcome, OpenOutcome,
    PageRequest, PaymentRepository, UserRepository,
};
use rust_decimal::Decimal;
use serial_test::serial;
use sqlx::PgPool;

/// PostgreSQLの時刻精度（マイクロ秒）に合わせて丸める
fn truncate_to_micros(dt: DateTime<Utc>) -> DateTime<Utc> {
    let micros = dt.timestamp_micros();
    DateTime::from_timestamp_micros(micros).expect("Invalid timestamp")
}

/// テストの独立性を保つため、各テスト前にすべてのデータを削除する
async fn cleanup_database(pool: &PgPool) {
    sqlx::query("TRUNCATE TABLE payments, borrowings, books, users CASCADE")
        .execute(pool)
        .await
        .expect("Failed to truncate tables");
}

struct Repositories {
    books: PostgresBookRepository,
    borrowings: PostgresBorrowingRepository,
    payments: PostgresPaymentRepository,
    users: PostgresUserRepository,
}

async fn setup() -> Repositories {
    let pool = common::create_test_pool().await;
    cleanup_database(&pool).await;

    Repositories {
        books: PostgresBookRepository::new(pool.clone()),
        borrowings: PostgresBorrowingRepository::new(pool.clone()),
        payments: PostgresPaymentRepository::new(pool.clone()),
        users: PostgresUserRepository::new(pool),
    }
}

async fn seed(repos: &Repositories, inventory: i32) -> (Book, User) {
    let book = common::book(inventory, Decimal::new(250, 2));
    repos.books.insert(&book).await.expect("Failed to insert book");

    let user = common::user("reader@test.com", false);
    assert!(repos.users.insert(&user).await.expect("Failed to insert user"));

    (book, user)
}

fn new_borrowing(book: &Book, user: &User, days: i64) -> Borrowing {
    let now = truncate_to_micros(Utc::now());
    common::borrowing(book.id, user.id, now, now + Duration::days(days))
}

fn payment_for(borrowing: &Borrowing, payment_type: PaymentType, session: &str) -> Payment {
    Payment::pending(
        payment_type,
        borrowing.id,
        session.to_string(),
        format!("https://checkout.test/{}", session),
        Decimal::new(750, 2),
    )
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_book_round_trip_and_update() {
    let repos = setup().await;
    let (book, _) = seed(&repos, 3).await;

    let loaded = repos.books.get_by_id(book.id).await.unwrap().unwrap();
    assert_eq!(loaded, book);

    let renamed = Book {
        title: "Renamed".to_string(),
        ..book.clone()
    };
    assert!(repos.books.update(&renamed).await.unwrap());

    let page = repos.books.list(PageRequest::default()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].title, "Renamed");

    assert!(repos.books.delete(book.id).await.unwrap());
    assert!(repos.books.get_by_id(book.id).await.unwrap().is_none());
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_open_decrements_inventory_and_stores_payment() {
    let repos = setup().await;
    let (book, user) = seed(&repos, 1).await;
    let borrowing = new_borrowing(&book, &user, 3);
    let payment = payment_for(&borrowing, PaymentType::Payment, "cs_test_open");

    let outcome = repos.borrowings.open(&borrowing, &payment).await.unwrap();
    assert_eq!(outcome, OpenOutcome::Opened);

    let stored = repos.borrowings.get_by_id(borrowing.id).await.unwrap();
    assert_eq!(stored, Some(borrowing.clone()));
    assert_eq!(repos.books.get_by_id(book.id).await.unwrap().unwrap().inventory, 0);
    assert_eq!(repos.books.count_borrowings(book.id).await.unwrap(), 1);

    let by_session = repos
        .payments
        .find_by_session_id("cs_test_open")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_session, payment);

    // 在庫0では何も保存しない
    let second = new_borrowing(&book, &user, 3);
    let second_payment = payment_for(&second, PaymentType::Payment, "cs_test_second");
    let outcome = repos.borrowings.open(&second, &second_payment).await.unwrap();
    assert_eq!(outcome, OpenOutcome::OutOfStock);
    assert!(repos.borrowings.get_by_id(second.id).await.unwrap().is_none());
    assert!(
        repos
            .payments
            .find_by_session_id("cs_test_second")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_close_is_guarded_against_double_return() {
    let repos = setup().await;
    let (book, user) = seed(&repos, 2).await;
    let borrowing = new_borrowing(&book, &user, 2);
    repos
        .borrowings
        .open(&borrowing, &payment_for(&borrowing, PaymentType::Payment, "cs_test_a"))
        .await
        .unwrap();

    let returned = Borrowing {
        actual_return_date: Some(borrowing.expected_return_date + Duration::days(1)),
        ..borrowing.clone()
    };
    let fine = payment_for(&returned, PaymentType::Fine, "cs_test_fine");

    let first = repos.borrowings.close(&returned, Some(&fine)).await.unwrap();
    let second = repos.borrowings.close(&returned, None).await.unwrap();

    assert_eq!(first, CloseOutcome::Closed);
    assert_eq!(second, CloseOutcome::AlreadyReturned);
    assert_eq!(repos.books.get_by_id(book.id).await.unwrap().unwrap().inventory, 2);

    let payments = repos.payments.find_by_borrowing(borrowing.id).await.unwrap();
    assert_eq!(payments.len(), 2);
    assert!(payments.iter().any(|p| p.payment_type == PaymentType::Fine));
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_list_filters_and_stream_all() {
    let repos = setup().await;
    let (book, user) = seed(&repos, 5).await;
    let other = common::user("other@test.com", false);
    repos.users.insert(&other).await.unwrap();

    let mine = new_borrowing(&book, &user, 2);
    let theirs = new_borrowing(&book, &other, 2);
    for (borrowing, session) in [(&mine, "cs_test_mine"), (&theirs, "cs_test_theirs")] {
        repos
            .borrowings
            .open(borrowing, &payment_for(borrowing, PaymentType::Payment, session))
            .await
            .unwrap();
    }

    let filter = BorrowingFilter {
        visible_to: Some(user.id),
        ..BorrowingFilter::default()
    };
    let page = repos
        .borrowings
        .list(&filter, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, mine.id);

    let returned_only = BorrowingFilter {
        is_active: Some(false),
        ..BorrowingFilter::default()
    };
    let page = repos
        .borrowings
        .list(&returned_only, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);

    let all: Vec<Borrowing> = repos.borrowings.stream_all().try_collect().await.unwrap();
    assert_eq!(all.len(), 2);

    let own_payments = repos
        .payments
        .list(Some(user.id), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(own_payments.total, 1);
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_payment_status_update() {
    let repos = setup().await;
    let (book, user) = seed(&repos, 1).await;
    let borrowing = new_borrowing(&book, &user, 2);
    let payment = payment_for(&borrowing, PaymentType::Payment, "cs_test_status");
    repos.borrowings.open(&borrowing, &payment).await.unwrap();

    assert!(
        repos
            .payments
            .update_status(payment.id, PaymentStatus::Paid)
            .await
            .unwrap()
    );

    let stored = repos.payments.get_by_id(payment.id).await.unwrap().unwrap();
    assert_eq!(stored.status, PaymentStatus::Paid);
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_user_email_is_unique() {
    let repos = setup().await;
    let (_, user) = seed(&repos, 1).await;

    let duplicate = common::user(&user.email, false);
    assert!(!repos.users.insert(&duplicate).await.unwrap());

    let found = repos.users.find_by_email(&user.email).await.unwrap();
    assert_eq!(found.map(|u| u.id), Some(user.id));
}
