use crate::domain::{BorrowingId, Payment, PaymentId, PaymentStatus, PaymentType, UserId};
use crate::ports::payment_repository::{PaymentRepository as PaymentRepositoryTrait, Result};
use crate::ports::{Page, PageRequest};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;

use super::row_error::invalid_data;

const PAYMENT_COLUMNS: &str = "p.id, p.status, p.payment_type, p.borrowing_id, p.session_url, p.session_id, p.money_to_pay";

/// PostgreSQLの行データをPaymentに変換する
fn map_row_to_payment(row: &PgRow) -> Result<Payment> {
    let status_str: &str = row.get("status");
    let status = PaymentStatus::from_str(status_str).map_err(invalid_data)?;

    let type_str: &str = row.get("payment_type");
    let payment_type = PaymentType::from_str(type_str).map_err(invalid_data)?;

    Ok(Payment {
        id: PaymentId::from_uuid(row.get("id")),
        status,
        payment_type,
        borrowing_id: BorrowingId::from_uuid(row.get("borrowing_id")),
        session_url: row.get("session_url"),
        session_id: row.get("session_id"),
        money_to_pay: row.get("money_to_pay"),
    })
}

/// PaymentRepositoryのPostgreSQL実装
///
/// 所有者による絞り込みはborrowingsとのJOINで行う。
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepositoryTrait for PaymentRepository {
    async fn list(&self, owner: Option<UserId>, page: PageRequest) -> Result<Page<Payment>> {
        let owner = owner.map(|id| id.value());

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM payments p
            JOIN borrowings b ON b.id = p.borrowing_id
            WHERE ($1::uuid IS NULL OR b.user_id = $1)
            "#,
        )
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT {PAYMENT_COLUMNS}
            FROM payments p
            JOIN borrowings b ON b.id = p.borrowing_id
            WHERE ($1::uuid IS NULL OR b.user_id = $1)
            ORDER BY p.created_at DESC, p.id ASC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(owner)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .iter()
            .map(map_row_to_payment)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page { items, total })
    }

    async fn get_by_id(&self, payment_id: PaymentId) -> Result<Option<Payment>> {
        let row = sqlx::query(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments p WHERE p.id = $1"
        ))
        .bind(payment_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_payment).transpose()
    }

    async fn find_by_borrowing(&self, borrowing_id: BorrowingId) -> Result<Vec<Payment>> {
        let rows = sqlx::query(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments p WHERE p.borrowing_id = $1 ORDER BY p.created_at ASC"
        ))
        .bind(borrowing_id.value())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_payment).collect()
    }

    async fn find_by_session_id(&self, session_id: &str) -> Result<Option<Payment>> {
        let row = sqlx::query(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments p WHERE p.session_id = $1"
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_payment).transpose()
    }

    async fn update_status(&self, payment_id: PaymentId, status: PaymentStatus) -> Result<bool> {
        let result = sqlx::query("UPDATE payments SET status = $2 WHERE id = $1")
            .bind(payment_id.value())
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
