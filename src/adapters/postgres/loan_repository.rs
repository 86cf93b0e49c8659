use crate::domain::{
    BookId, LoanId, MemberId, StaffId,
    loan::{Loan, LoanStatus},
};
use crate::ports::loan_repository::{
    LoanFilter, LoanRepository as LoanRepositoryTrait, Result,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;
use uuid::Uuid;

const LOAN_COLUMNS: &str = r#"
    id,
    member_id,
    book_id,
    user_id,
    borrow_date,
    due_date,
    return_date,
    status,
    fine,
    notes,
    created_at
"#;

/// PostgreSQLの行データをLoanに変換する
///
/// ステータス文字列の変換でエラーハンドリングを行う。
fn map_row_to_loan(row: &PgRow) -> Result<Loan> {
    let status_str: &str = row.get("status");
    let status = LoanStatus::from_str(status_str).map_err(|e| {
        Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
            as Box<dyn std::error::Error + Send + Sync>
    })?;

    let user_id: Option<Uuid> = row.get("user_id");

    Ok(Loan {
        loan_id: LoanId::from_uuid(row.get("id")),
        member_id: MemberId::from_uuid(row.get("member_id")),
        book_id: BookId::from_uuid(row.get("book_id")),
        recorded_by: user_id.map(StaffId::from_uuid),
        borrowed_at: row.get("borrow_date"),
        due_date: row.get("due_date"),
        returned_at: row.get("return_date"),
        status,
        fine: row.get("fine"),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
    })
}

/// LoanRepositoryのPostgreSQL実装
pub struct LoanRepository {
    pool: PgPool,
}

impl LoanRepository {
    /// PostgreSQLコネクションプールから新しいLoanRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanRepositoryTrait for LoanRepository {
    async fn insert(&self, loan: &Loan) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO loans (
                id,
                member_id,
                book_id,
                user_id,
                borrow_date,
                due_date,
                return_date,
                status,
                fine,
                notes,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(loan.loan_id.value())
        .bind(loan.member_id.value())
        .bind(loan.book_id.value())
        .bind(loan.recorded_by.map(|id| id.value()))
        .bind(loan.borrowed_at)
        .bind(loan.due_date)
        .bind(loan.returned_at)
        .bind(loan.status.as_str())
        .bind(loan.fine)
        .bind(&loan.notes)
        .bind(loan.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, loan_id: LoanId) -> Result<()> {
        sqlx::query("DELETE FROM loans WHERE id = $1")
            .bind(loan_id.value())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn get_by_id(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        let row = sqlx::query(&format!("SELECT {} FROM loans WHERE id = $1", LOAN_COLUMNS))
            .bind(loan_id.value())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_loan).transpose()
    }

    /// 返却結果を保存（status = 'active' の行のみ更新）
    ///
    /// 同時返却では先に更新した1件だけが rows_affected = 1 になる。
    async fn close(&self, returned: &Loan) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE loans
            SET return_date = $2,
                status = $3,
                fine = $4,
                notes = $5
            WHERE id = $1 AND status = 'active'
            "#,
        )
        .bind(returned.loan_id.value())
        .bind(returned.returned_at)
        .bind(returned.status.as_str())
        .bind(returned.fine)
        .bind(&returned.notes)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn reopen(&self, original: &Loan) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE loans
            SET return_date = $2,
                status = $3,
                fine = $4,
                notes = $5
            WHERE id = $1
            "#,
        )
        .bind(original.loan_id.value())
        .bind(original.returned_at)
        .bind(original.status.as_str())
        .bind(original.fine)
        .bind(&original.notes)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// 条件付き検索
    ///
    /// NULLの引数は条件なしとして扱う。
    async fn find(&self, filter: &LoanFilter) -> Result<Vec<Loan>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM loans
            WHERE ($1::uuid IS NULL OR member_id = $1)
              AND ($2::uuid IS NULL OR book_id = $2)
              AND ($3::varchar IS NULL OR status = $3)
              AND ($4::timestamptz IS NULL OR borrow_date >= $4)
              AND ($5::timestamptz IS NULL OR borrow_date <= $5)
            ORDER BY borrow_date DESC, created_at DESC
            "#,
            LOAN_COLUMNS
        ))
        .bind(filter.member_id.map(|id| id.value()))
        .bind(filter.book_id.map(|id| id.value()))
        .bind(filter.status.map(|status| status.as_str()))
        .bind(filter.borrowed_from)
        .bind(filter.borrowed_to)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_loan).collect()
    }

    /// 延滞候補を検索（延滞検出バッチ用）
    ///
    /// (due_date) WHERE status = 'active' の部分インデックスを使用する。
    async fn find_overdue_candidates(&self, cutoff: DateTime<Utc>) -> Result<Vec<Loan>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM loans
            WHERE status = 'active' AND due_date < $1
            ORDER BY due_date ASC
            "#,
            LOAN_COLUMNS
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_loan).collect()
    }

    async fn count_active(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE status = 'active'")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn count_overdue(&self, cutoff: DateTime<Utc>) -> Result<i64> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE status = 'active' AND due_date < $1",
        )
        .bind(cutoff)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
