use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::account::ProfileUpdate;
use crate::application::borrowing::BorrowingDetail;
use crate::domain::{
    Book, BookDraft, Borrowing, CoverType, Payment, PaymentStatus, PaymentType, User,
    commands::RegisterUser,
};
use crate::ports::{Page, PageRequest};

// ============================================================================
// Pagination
// ============================================================================

/// ページ指定のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PaginationQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }
}

/// ページ付き一覧レスポンス
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub count: i64,
    pub page: u32,
    pub page_size: u32,
    pub results: Vec<T>,
}

impl<T> PaginatedResponse<T> {
    pub fn new<U>(page: Page<U>, request: PageRequest) -> Self
    where
        T: From<U>,
    {
        Self {
            count: page.total,
            page: request.page(),
            page_size: request.page_size(),
            results: page.items.into_iter().map(T::from).collect(),
        }
    }
}

// ============================================================================
// Books
// ============================================================================

/// 書籍の作成・更新リクエスト（PUTは全項目置き換え）
#[derive(Debug, Deserialize)]
pub struct BookRequest {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub cover: CoverType,
    pub inventory: i32,
    pub daily_fee: Decimal,
}

impl BookRequest {
    pub fn into_draft(self) -> BookDraft {
        BookDraft {
            title: self.title,
            author: self.author,
            cover: self.cover,
            inventory: self.inventory,
            daily_fee: self.daily_fee,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub cover: CoverType,
    pub inventory: i32,
    pub daily_fee: Decimal,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.value(),
            title: book.title,
            author: book.author,
            cover: book.cover,
            inventory: book.inventory,
            daily_fee: book.daily_fee,
        }
    }
}

// ============================================================================
// Borrowings
// ============================================================================

/// 貸出一覧のクエリパラメータ
///
/// `user_id` と `is_active` は生の文字列で受け取り、解釈できない値は無視する。
#[derive(Debug, Default, Deserialize)]
pub struct ListBorrowingsQuery {
    pub user_id: Option<String>,
    pub is_active: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ListBorrowingsQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }
}

/// 貸出作成リクエスト
#[derive(Debug, Deserialize)]
pub struct CreateBorrowingRequest {
    pub book: Uuid,
    pub expected_return_date: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct BorrowingResponse {
    pub id: Uuid,
    pub borrow_date: DateTime<Utc>,
    pub expected_return_date: DateTime<Utc>,
    pub actual_return_date: Option<DateTime<Utc>>,
    pub book_id: Uuid,
    pub user_id: Uuid,
}

impl From<Borrowing> for BorrowingResponse {
    fn from(borrowing: Borrowing) -> Self {
        Self {
            id: borrowing.id.value(),
            borrow_date: borrowing.borrow_date,
            expected_return_date: borrowing.expected_return_date,
            actual_return_date: borrowing.actual_return_date,
            book_id: borrowing.book_id.value(),
            user_id: borrowing.user_id.value(),
        }
    }
}

/// 貸出作成レスポンス（決済URLを含む）
#[derive(Debug, Serialize)]
pub struct BorrowingCreatedResponse {
    #[serde(flatten)]
    pub borrowing: BorrowingResponse,
    pub payment: PaymentResponse,
}

/// 貸出詳細レスポンス（GET /borrowings/:id）
#[derive(Debug, Serialize)]
pub struct BorrowingDetailResponse {
    pub id: Uuid,
    pub borrow_date: DateTime<Utc>,
    pub expected_return_date: DateTime<Utc>,
    pub actual_return_date: Option<DateTime<Utc>>,
    pub book: BookResponse,
    pub user: UserResponse,
    pub payments: Vec<BorrowingPaymentResponse>,
}

impl From<BorrowingDetail> for BorrowingDetailResponse {
    fn from(detail: BorrowingDetail) -> Self {
        Self {
            id: detail.borrowing.id.value(),
            borrow_date: detail.borrowing.borrow_date,
            expected_return_date: detail.borrowing.expected_return_date,
            actual_return_date: detail.borrowing.actual_return_date,
            book: detail.book.into(),
            user: detail.user.into(),
            payments: detail.payments.into_iter().map(Into::into).collect(),
        }
    }
}

// ============================================================================
// Payments
// ============================================================================

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub status: PaymentStatus,
    pub payment_type: PaymentType,
    pub borrowing: Uuid,
    pub session_url: String,
    pub session_id: String,
    pub money_to_pay: Decimal,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id.value(),
            status: payment.status,
            payment_type: payment.payment_type,
            borrowing: payment.borrowing_id.value(),
            session_url: payment.session_url,
            session_id: payment.session_id,
            money_to_pay: payment.money_to_pay,
        }
    }
}

/// 貸出詳細に埋め込む支払い
#[derive(Debug, Serialize)]
pub struct BorrowingPaymentResponse {
    pub id: Uuid,
    pub status: PaymentStatus,
    pub payment_type: PaymentType,
    pub session_url: String,
    pub money_to_pay: Decimal,
}

impl From<Payment> for BorrowingPaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id.value(),
            status: payment.status,
            payment_type: payment.payment_type,
            session_url: payment.session_url,
            money_to_pay: payment.money_to_pay,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PaymentSuccessQuery {
    pub session_id: Option<String>,
}

/// 案内メッセージだけを返すレスポンス
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Users
// ============================================================================

/// 登録・プロフィール更新リクエスト
///
/// 欠けた項目は空文字として扱い、ドメインの検証で弾く。
#[derive(Debug, Deserialize)]
pub struct UserRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl UserRequest {
    pub fn into_command(self) -> RegisterUser {
        RegisterUser {
            email: self.email,
            password: self.password,
            first_name: self.first_name,
            last_name: self.last_name,
        }
    }

    pub fn into_profile_update(self) -> ProfileUpdate {
        ProfileUpdate {
            email: self.email,
            password: self.password,
            first_name: self.first_name,
            last_name: self.last_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.value(),
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            is_staff: user.is_staff,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenObtainRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenRefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct AccessTokenResponse {
    pub access: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenVerifyRequest {
    pub token: String,
}

// ============================================================================
// Errors
// ============================================================================

/// エラーレスポンス
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
