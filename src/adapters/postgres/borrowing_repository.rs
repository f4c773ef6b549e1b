use crate::domain::{Borrowing, BorrowingId, BookId, Payment, UserId};
use crate::ports::borrowing_repository::{
    BorrowingFilter, BorrowingRepository as BorrowingRepositoryTrait, CloseOutcome, OpenOutcome,
    Result,
};
use crate::ports::{Page, PageRequest};
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};

/// PostgreSQLの行データをBorrowingに変換する
fn map_row_to_borrowing(row: &PgRow) -> Borrowing {
    Borrowing {
        id: BorrowingId::from_uuid(row.get("id")),
        borrow_date: row.get("borrow_date"),
        expected_return_date: row.get("expected_return_date"),
        actual_return_date: row.get("actual_return_date"),
        book_id: BookId::from_uuid(row.get("book_id")),
        user_id: UserId::from_uuid(row.get("user_id")),
    }
}

/// 支払いを同じトランザクション内で挿入する
async fn insert_payment(tx: &mut Transaction<'_, Postgres>, payment: &Payment) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO payments (
            id,
            status,
            payment_type,
            borrowing_id,
            session_url,
            session_id,
            money_to_pay
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(payment.id.value())
    .bind(payment.status.as_str())
    .bind(payment.payment_type.as_str())
    .bind(payment.borrowing_id.value())
    .bind(&payment.session_url)
    .bind(&payment.session_id)
    .bind(payment.money_to_pay)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// BorrowingRepositoryのPostgreSQL実装
///
/// 在庫の増減・貸出・支払いの書き込みは常に1つのトランザクションで行う。
/// 在庫の減算と返却日の設定は条件付きUPDATEで、並行リクエストでも
/// 在庫が負になったり二重返却されたりしない。
pub struct BorrowingRepository {
    pool: PgPool,
}

impl BorrowingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BorrowingRepositoryTrait for BorrowingRepository {
    async fn open(&self, borrowing: &Borrowing, payment: &Payment) -> Result<OpenOutcome> {
        let mut tx = self.pool.begin().await?;

        let reserved = sqlx::query(
            r#"
            UPDATE books
            SET inventory = inventory - 1
            WHERE id = $1 AND inventory > 0
            "#,
        )
        .bind(borrowing.book_id.value())
        .execute(&mut *tx)
        .await?;

        if reserved.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(OpenOutcome::OutOfStock);
        }

        sqlx::query(
            r#"
            INSERT INTO borrowings (
                id,
                borrow_date,
                expected_return_date,
                actual_return_date,
                book_id,
                user_id
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(borrowing.id.value())
        .bind(borrowing.borrow_date)
        .bind(borrowing.expected_return_date)
        .bind(borrowing.actual_return_date)
        .bind(borrowing.book_id.value())
        .bind(borrowing.user_id.value())
        .execute(&mut *tx)
        .await?;

        insert_payment(&mut tx, payment).await?;

        tx.commit().await?;
        Ok(OpenOutcome::Opened)
    }

    async fn close(&self, borrowing: &Borrowing, fine: Option<&Payment>) -> Result<CloseOutcome> {
        let mut tx = self.pool.begin().await?;

        let closed = sqlx::query(
            r#"
            UPDATE borrowings
            SET actual_return_date = $2
            WHERE id = $1 AND actual_return_date IS NULL
            "#,
        )
        .bind(borrowing.id.value())
        .bind(borrowing.actual_return_date)
        .execute(&mut *tx)
        .await?;

        if closed.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(CloseOutcome::AlreadyReturned);
        }

        sqlx::query("UPDATE books SET inventory = inventory + 1 WHERE id = $1")
            .bind(borrowing.book_id.value())
            .execute(&mut *tx)
            .await?;

        if let Some(fine) = fine {
            insert_payment(&mut tx, fine).await?;
        }

        tx.commit().await?;
        Ok(CloseOutcome::Closed)
    }

    async fn get_by_id(&self, borrowing_id: BorrowingId) -> Result<Option<Borrowing>> {
        let row = sqlx::query(
            r#"
            SELECT id, borrow_date, expected_return_date, actual_return_date, book_id, user_id
            FROM borrowings
            WHERE id = $1
            "#,
        )
        .bind(borrowing_id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_borrowing))
    }

    /// フィルタ条件は `$n IS NULL OR ...` の形で1本のクエリにまとめる
    async fn list(&self, filter: &BorrowingFilter, page: PageRequest) -> Result<Page<Borrowing>> {
        let visible_to = filter.visible_to.map(|id| id.value());
        let user_id = filter.user_id.map(|id| id.value());

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM borrowings
            WHERE ($1::uuid IS NULL OR user_id = $1)
              AND ($2::uuid IS NULL OR user_id = $2)
              AND ($3::bool IS NULL OR (actual_return_date IS NULL) = $3)
            "#,
        )
        .bind(visible_to)
        .bind(user_id)
        .bind(filter.is_active)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query(
            r#"
            SELECT id, borrow_date, expected_return_date, actual_return_date, book_id, user_id
            FROM borrowings
            WHERE ($1::uuid IS NULL OR user_id = $1)
              AND ($2::uuid IS NULL OR user_id = $2)
              AND ($3::bool IS NULL OR (actual_return_date IS NULL) = $3)
            ORDER BY borrow_date DESC, id ASC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(visible_to)
        .bind(user_id)
        .bind(filter.is_active)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page {
            items: rows.iter().map(map_row_to_borrowing).collect(),
            total,
        })
    }

    fn stream_all(&self) -> BoxStream<'_, Result<Borrowing>> {
        let stream = sqlx::query(
            r#"
            SELECT id, borrow_date, expected_return_date, actual_return_date, book_id, user_id
            FROM borrowings
            ORDER BY borrow_date ASC
            "#,
        )
        .fetch(&self.pool)
        .map(|row_result| {
            let row = row_result?;
            Ok(map_row_to_borrowing(&row))
        });

        Box::pin(stream)
    }
}
