use crate::domain::{Book, BookId};
use async_trait::async_trait;

use super::pagination::{Page, PageRequest};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 書籍カタログの永続化ポート
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// タイトル順の書籍一覧
    async fn list(&self, page: PageRequest) -> Result<Page<Book>>;

    async fn get_by_id(&self, book_id: BookId) -> Result<Option<Book>>;

    async fn insert(&self, book: &Book) -> Result<()>;

    /// 既存の書籍を丸ごと置き換える
    ///
    /// 該当する書籍がなければ `false`
    async fn update(&self, book: &Book) -> Result<bool>;

    /// 該当する書籍がなければ `false`
    async fn delete(&self, book_id: BookId) -> Result<bool>;

    /// 書籍を参照する貸出の件数（返却済みを含む）
    ///
    /// 0でない間は削除できない。
    async fn count_borrowings(&self, book_id: BookId) -> Result<i64>;
}
