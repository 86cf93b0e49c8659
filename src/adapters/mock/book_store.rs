use crate::domain::{BookId, book::{self, Book}};
use crate::ports::book_availability_store::{
    Adjustment, BookAvailabilityStore as BookAvailabilityStoreTrait, Result,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// BookAvailabilityStoreのインメモリ実装
///
/// 書籍をロック内で保持し、貸出可能数の判定と更新を同じロック内で行う。
pub struct BookStore {
    books: Mutex<HashMap<BookId, Book>>,
}

impl BookStore {
    pub fn new() -> Self {
        Self {
            books: Mutex::new(HashMap::new()),
        }
    }

    /// 書籍を登録（テスト・開発用）
    pub fn add_book(&self, book: Book) {
        self.books.lock().unwrap().insert(book.book_id, book);
    }

    /// 現在の書籍の状態を取得
    pub fn book(&self, book_id: BookId) -> Option<Book> {
        self.books.lock().unwrap().get(&book_id).cloned()
    }
}

impl Default for BookStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookAvailabilityStoreTrait for BookStore {
    async fn find_by_id(&self, book_id: BookId) -> Result<Option<Book>> {
        Ok(self.book(book_id))
    }

    /// 判定と更新を1回のロックで行う
    async fn adjust_availability(&self, book_id: BookId, delta: i32) -> Result<Adjustment> {
        let mut books = self.books.lock().unwrap();
        let Some(current) = books.get_mut(&book_id) else {
            return Ok(Adjustment::BookMissing);
        };

        match book::adjust_availability(current, delta) {
            Ok(next) => {
                *current = next;
                Ok(Adjustment::Applied)
            }
            Err(_) => Ok(Adjustment::Rejected),
        }
    }
}
