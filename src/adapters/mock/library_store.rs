use crate::domain::{
    Book, BookId, Borrowing, BorrowingId, Payment, PaymentId, PaymentStatus, User, UserId,
};
use crate::ports::{
    BookRepository, BorrowingFilter, BorrowingRepository, CloseOutcome, OpenOutcome, Page,
    PageRequest, PaymentRepository, UserRepository, book_repository, borrowing_repository,
    payment_repository, user_repository,
};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct State {
    books: HashMap<BookId, Book>,
    borrowings: HashMap<BorrowingId, Borrowing>,
    payments: Vec<Payment>,
    users: HashMap<UserId, User>,
}

/// 全リポジトリポートのインメモリ実装
///
/// 1つのロックで全テーブルを守るので、`open`/`close` はPostgreSQL実装と同じく不可分。
/// テストとデータベースなしのローカル実行で使う。
#[derive(Default)]
pub struct LibraryStore {
    state: Mutex<State>,
}

impl LibraryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn paginate<T>(items: Vec<T>, page: PageRequest) -> Page<T> {
    let total = items.len() as i64;
    let items = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect();
    Page { items, total }
}

#[async_trait]
impl BookRepository for LibraryStore {
    async fn list(&self, page: PageRequest) -> book_repository::Result<Page<Book>> {
        let state = self.state.lock().unwrap();
        let mut books: Vec<Book> = state.books.values().cloned().collect();
        books.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.value().cmp(&b.id.value())));
        Ok(paginate(books, page))
    }

    async fn get_by_id(&self, book_id: BookId) -> book_repository::Result<Option<Book>> {
        Ok(self.state.lock().unwrap().books.get(&book_id).cloned())
    }

    async fn insert(&self, book: &Book) -> book_repository::Result<()> {
        self.state
            .lock()
            .unwrap()
            .books
            .insert(book.id, book.clone());
        Ok(())
    }

    async fn update(&self, book: &Book) -> book_repository::Result<bool> {
        let mut state = self.state.lock().unwrap();
        match state.books.get_mut(&book.id) {
            Some(stored) => {
                *stored = book.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, book_id: BookId) -> book_repository::Result<bool> {
        let mut state = self.state.lock().unwrap();
        if state.borrowings.values().any(|b| b.book_id == book_id) {
            return Err("book is referenced by borrowings".into());
        }
        Ok(state.books.remove(&book_id).is_some())
    }

    async fn count_borrowings(&self, book_id: BookId) -> book_repository::Result<i64> {
        let state = self.state.lock().unwrap();
        Ok(state
            .borrowings
            .values()
            .filter(|b| b.book_id == book_id)
            .count() as i64)
    }
}

#[async_trait]
impl BorrowingRepository for LibraryStore {
    async fn open(
        &self,
        borrowing: &Borrowing,
        payment: &Payment,
    ) -> borrowing_repository::Result<OpenOutcome> {
        let mut state = self.state.lock().unwrap();

        let book = state
            .books
            .get_mut(&borrowing.book_id)
            .ok_or("borrowing references a missing book")?;
        if book.inventory <= 0 {
            return Ok(OpenOutcome::OutOfStock);
        }
        book.inventory -= 1;

        state.borrowings.insert(borrowing.id, borrowing.clone());
        state.payments.push(payment.clone());
        Ok(OpenOutcome::Opened)
    }

    async fn close(
        &self,
        borrowing: &Borrowing,
        fine: Option<&Payment>,
    ) -> borrowing_repository::Result<CloseOutcome> {
        let mut state = self.state.lock().unwrap();

        let stored = state
            .borrowings
            .get_mut(&borrowing.id)
            .ok_or("borrowing not found")?;
        if stored.actual_return_date.is_some() {
            return Ok(CloseOutcome::AlreadyReturned);
        }
        stored.actual_return_date = borrowing.actual_return_date;

        if let Some(book) = state.books.get_mut(&borrowing.book_id) {
            book.inventory += 1;
        }
        if let Some(fine) = fine {
            state.payments.push(fine.clone());
        }
        Ok(CloseOutcome::Closed)
    }

    async fn get_by_id(
        &self,
        borrowing_id: BorrowingId,
    ) -> borrowing_repository::Result<Option<Borrowing>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .borrowings
            .get(&borrowing_id)
            .cloned())
    }

    async fn list(
        &self,
        filter: &BorrowingFilter,
        page: PageRequest,
    ) -> borrowing_repository::Result<Page<Borrowing>> {
        let state = self.state.lock().unwrap();
        let mut borrowings: Vec<Borrowing> = state
            .borrowings
            .values()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        borrowings.sort_by(|a, b| b.borrow_date.cmp(&a.borrow_date));
        Ok(paginate(borrowings, page))
    }

    fn stream_all(&self) -> BoxStream<'_, borrowing_repository::Result<Borrowing>> {
        let mut borrowings: Vec<Borrowing> = self
            .state
            .lock()
            .unwrap()
            .borrowings
            .values()
            .cloned()
            .collect();
        borrowings.sort_by(|a, b| a.borrow_date.cmp(&b.borrow_date));
        stream::iter(borrowings.into_iter().map(Ok)).boxed()
    }
}

#[async_trait]
impl PaymentRepository for LibraryStore {
    async fn list(
        &self,
        owner: Option<UserId>,
        page: PageRequest,
    ) -> payment_repository::Result<Page<Payment>> {
        let state = self.state.lock().unwrap();
        let payments: Vec<Payment> = state
            .payments
            .iter()
            .filter(|p| match owner {
                Some(owner) => state
                    .borrowings
                    .get(&p.borrowing_id)
                    .is_some_and(|b| b.user_id == owner),
                None => true,
            })
            .cloned()
            .collect();
        Ok(paginate(payments, page))
    }

    async fn get_by_id(&self, payment_id: PaymentId) -> payment_repository::Result<Option<Payment>> {
        let state = self.state.lock().unwrap();
        Ok(state.payments.iter().find(|p| p.id == payment_id).cloned())
    }

    async fn find_by_borrowing(
        &self,
        borrowing_id: BorrowingId,
    ) -> payment_repository::Result<Vec<Payment>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .payments
            .iter()
            .filter(|p| p.borrowing_id == borrowing_id)
            .cloned()
            .collect())
    }

    async fn find_by_session_id(
        &self,
        session_id: &str,
    ) -> payment_repository::Result<Option<Payment>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .payments
            .iter()
            .find(|p| p.session_id == session_id)
            .cloned())
    }

    async fn update_status(
        &self,
        payment_id: PaymentId,
        status: PaymentStatus,
    ) -> payment_repository::Result<bool> {
        let mut state = self.state.lock().unwrap();
        match state.payments.iter_mut().find(|p| p.id == payment_id) {
            Some(payment) => {
                payment.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl UserRepository for LibraryStore {
    async fn insert(&self, user: &User) -> user_repository::Result<bool> {
        let mut state = self.state.lock().unwrap();
        if state.users.values().any(|u| u.email == user.email) {
            return Ok(false);
        }
        state.users.insert(user.id, user.clone());
        Ok(true)
    }

    async fn get_by_id(&self, user_id: UserId) -> user_repository::Result<Option<User>> {
        Ok(self.state.lock().unwrap().users.get(&user_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> user_repository::Result<Option<User>> {
        let state = self.state.lock().unwrap();
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn update(&self, user: &User) -> user_repository::Result<bool> {
        let mut state = self.state.lock().unwrap();
        if state
            .users
            .values()
            .any(|u| u.email == user.email && u.id != user.id)
        {
            return Ok(false);
        }
        state.users.insert(user.id, user.clone());
        Ok(true)
    }
}
