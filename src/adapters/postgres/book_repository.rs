use crate::domain::{Book, BookId, CoverType};
use crate::ports::book_repository::{BookRepository as BookRepositoryTrait, Result};
use crate::ports::{Page, PageRequest};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;

use super::row_error::invalid_data;

/// PostgreSQLの行データをBookに変換する
fn map_row_to_book(row: &PgRow) -> Result<Book> {
    let cover_str: &str = row.get("cover");
    let cover = CoverType::from_str(cover_str).map_err(invalid_data)?;

    Ok(Book {
        id: BookId::from_uuid(row.get("id")),
        title: row.get("title"),
        author: row.get("author"),
        cover,
        inventory: row.get("inventory"),
        daily_fee: row.get("daily_fee"),
    })
}

/// BookRepositoryのPostgreSQL実装
pub struct BookRepository {
    pool: PgPool,
}

impl BookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    async fn list(&self, page: PageRequest) -> Result<Page<Book>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query(
            r#"
            SELECT id, title, author, cover, inventory, daily_fee
            FROM books
            ORDER BY title ASC, id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .iter()
            .map(map_row_to_book)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page { items, total })
    }

    async fn get_by_id(&self, book_id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, author, cover, inventory, daily_fee
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(book_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    async fn insert(&self, book: &Book) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO books (id, title, author, cover, inventory, daily_fee)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(book.id.value())
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.cover.as_str())
        .bind(book.inventory)
        .bind(book.daily_fee)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, book: &Book) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = $2, author = $3, cover = $4, inventory = $5, daily_fee = $6
            WHERE id = $1
            "#,
        )
        .bind(book.id.value())
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.cover.as_str())
        .bind(book.inventory)
        .bind(book.daily_fee)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, book_id: BookId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(book_id.value())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_borrowings(&self, book_id: BookId) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM borrowings WHERE book_id = $1")
            .bind(book_id.value())
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
