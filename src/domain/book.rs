use serde::{Deserialize, Serialize};

use super::{AvailabilityError, BookId};

/// 書籍（貸出管理に必要な部分のみ）
///
/// 不変条件：0 <= available <= stock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub book_id: BookId,
    pub title: String,
    pub stock: u32,
    pub available: u32,
}

impl Book {
    /// 在庫数と同じ数だけ貸出可能な新しい書籍を作る
    pub fn new(book_id: BookId, title: impl Into<String>, stock: u32) -> Self {
        Self {
            book_id,
            title: title.into(),
            stock,
            available: stock,
        }
    }

    pub fn is_available(&self) -> bool {
        self.available > 0
    }
}

/// 純粋関数：貸出可能数を増減した結果を返す
///
/// 結果が 0..=stock の範囲を外れる場合はエラー。書籍は変更しない。
pub fn adjust_availability(book: &Book, delta: i32) -> Result<Book, AvailabilityError> {
    let next = i64::from(book.available) + i64::from(delta);

    if next < 0 {
        return Err(AvailabilityError::Exhausted);
    }
    if next > i64::from(book.stock) {
        return Err(AvailabilityError::AboveStock);
    }

    Ok(Book {
        available: next as u32,
        ..book.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_book_is_fully_available() {
        let book = Book::new(BookId::new(), "Laskar Pelangi", 3);
        assert_eq!(book.available, 3);
        assert!(book.is_available());
    }

    #[test]
    fn test_adjust_availability_decrements() {
        let book = Book::new(BookId::new(), "Bumi Manusia", 1);
        let book = adjust_availability(&book, -1).unwrap();
        assert_eq!(book.available, 0);
        assert!(!book.is_available());
    }

    #[test]
    fn test_adjust_availability_never_below_zero() {
        let book = Book::new(BookId::new(), "Bumi Manusia", 0);
        let result = adjust_availability(&book, -1);
        assert_eq!(result.unwrap_err(), AvailabilityError::Exhausted);
    }

    #[test]
    fn test_adjust_availability_never_above_stock() {
        let book = Book::new(BookId::new(), "Ronggeng Dukuh Paruk", 2);
        let result = adjust_availability(&book, 1);
        assert_eq!(result.unwrap_err(), AvailabilityError::AboveStock);
    }

    #[test]
    fn test_reserve_then_release_restores_count() {
        let book = Book::new(BookId::new(), "Cantik Itu Luka", 2);
        let reserved = adjust_availability(&book, -1).unwrap();
        let released = adjust_availability(&reserved, 1).unwrap();
        assert_eq!(released, book);
    }
}
