use crate::domain::{self, Book, BookDraft, BookId};
use crate::ports::{Page, PageRequest};

use super::errors::{CatalogApplicationError, Result};
use crate::application::ServiceDependencies;

/// 書籍一覧（タイトル順）
pub async fn list_books(deps: &ServiceDependencies, page: PageRequest) -> Result<Page<Book>> {
    deps.books
        .list(page)
        .await
        .map_err(CatalogApplicationError::RepositoryError)
}

/// 書籍をIDで取得
pub async fn get_book(deps: &ServiceDependencies, book_id: BookId) -> Result<Book> {
    deps.books
        .get_by_id(book_id)
        .await
        .map_err(CatalogApplicationError::RepositoryError)?
        .ok_or(CatalogApplicationError::BookNotFound)
}

/// 書籍を登録する
pub async fn create_book(deps: &ServiceDependencies, draft: BookDraft) -> Result<Book> {
    let book = domain::book::create_book(draft)?;

    deps.books
        .insert(&book)
        .await
        .map_err(CatalogApplicationError::RepositoryError)?;

    tracing::info!(book_id = %book.id.value(), title = %book.title, "Book created");
    Ok(book)
}

/// 書籍を更新する（全項目置き換え）
pub async fn update_book(
    deps: &ServiceDependencies,
    book_id: BookId,
    draft: BookDraft,
) -> Result<Book> {
    let current = get_book(deps, book_id).await?;
    let updated = domain::book::update_book(&current, draft)?;

    let found = deps
        .books
        .update(&updated)
        .await
        .map_err(CatalogApplicationError::RepositoryError)?;

    if !found {
        return Err(CatalogApplicationError::BookNotFound);
    }
    Ok(updated)
}

/// 書籍を削除する
///
/// ビジネスルール：貸出記録（返却済みを含む）が1件でもあれば削除不可。
pub async fn delete_book(deps: &ServiceDependencies, book_id: BookId) -> Result<()> {
    let borrowings = deps
        .books
        .count_borrowings(book_id)
        .await
        .map_err(CatalogApplicationError::RepositoryError)?;

    if borrowings > 0 {
        return Err(CatalogApplicationError::BookHasBorrowings);
    }

    let deleted = deps
        .books
        .delete(book_id)
        .await
        .map_err(CatalogApplicationError::RepositoryError)?;

    if !deleted {
        return Err(CatalogApplicationError::BookNotFound);
    }

    tracing::info!(book_id = %book_id.value(), "Book deleted");
    Ok(())
}
