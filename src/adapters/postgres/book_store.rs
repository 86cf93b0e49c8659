use crate::domain::{BookId, book::Book};
use crate::ports::book_availability_store::{
    Adjustment, BookAvailabilityStore as BookAvailabilityStoreTrait, Result,
};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

fn invalid_data(message: String) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message))
}

/// PostgreSQLの行データをBookに変換する
///
/// stock / available は INTEGER で保存されているため u32 への変換を検証する。
fn map_row_to_book(row: &PgRow) -> Result<Book> {
    let stock: i32 = row.get("stock");
    let available: i32 = row.get("available");

    Ok(Book {
        book_id: BookId::from_uuid(row.get("id")),
        title: row.get("title"),
        stock: stock
            .try_into()
            .map_err(|_| invalid_data(format!("stock out of range: {}", stock)))?,
        available: available
            .try_into()
            .map_err(|_| invalid_data(format!("available out of range: {}", available)))?,
    })
}

/// BookAvailabilityStoreのPostgreSQL実装
///
/// 貸出可能数は1文の条件付きUPDATEで増減するため、行ロックにより
/// 同じ書籍への同時更新は直列化される。
pub struct BookStore {
    pool: PgPool,
}

impl BookStore {
    /// PostgreSQLコネクションプールから新しいBookStoreを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookAvailabilityStoreTrait for BookStore {
    async fn find_by_id(&self, book_id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, stock, available
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(book_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    /// 貸出可能数を条件付きで増減
    ///
    /// 更新件数が0の場合のみ、書籍の存在を確認して拒否理由を判別する。
    async fn adjust_availability(&self, book_id: BookId, delta: i32) -> Result<Adjustment> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET available = available + $2
            WHERE id = $1
              AND available + $2 >= 0
              AND available + $2 <= stock
            "#,
        )
        .bind(book_id.value())
        .bind(delta)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(Adjustment::Applied);
        }

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(book_id.value())
            .fetch_one(&self.pool)
            .await?;

        Ok(if exists {
            Adjustment::Rejected
        } else {
            Adjustment::BookMissing
        })
    }
}
