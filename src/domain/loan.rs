use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{
    BookId, LoanDays, LoanId, MemberId, ReturnLoanError, StaffId, commands::CreateLoan, fine,
};

/// 貸出ステータス
///
/// Active から Returned / Overdue への遷移は返却時に一度だけ起こる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// 貸出中
    Active,
    /// 返却済み（延滞料金なし）
    Returned,
    /// 延滞して返却済み（延滞料金あり）
    Overdue,
}

impl LoanStatus {
    /// 文字列表現を取得する
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Returned => "returned",
            LoanStatus::Overdue => "overdue",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, LoanStatus::Active)
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(LoanStatus::Active),
            "returned" => Ok(LoanStatus::Returned),
            "overdue" => Ok(LoanStatus::Overdue),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

/// 貸出記録 - 1冊の書籍の1回の貸出
///
/// 書籍の貸出可能数は「在庫数 - Activeな貸出の件数」と常に一致する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    // 識別子
    pub loan_id: LoanId,

    // 他の集約への参照（IDのみ）
    pub member_id: MemberId,
    pub book_id: BookId,
    pub recorded_by: Option<StaffId>,

    // 貸出管理の責務
    pub borrowed_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    pub fine: Decimal,
    pub notes: String,

    // 監査情報
    pub created_at: DateTime<Utc>,
}

/// 純粋関数：返却期限を計算する
pub fn due_date_for(borrowed_at: DateTime<Utc>, loan_days: LoanDays) -> DateTime<Utc> {
    borrowed_at + Duration::days(i64::from(loan_days.value()))
}

/// 純粋関数：書籍を貸し出す
///
/// ビジネスルール：
/// - 返却期限は貸出日時 + 貸出日数（既定7日）
/// - 状態はActive、延滞料金は0
///
/// 副作用なし。書籍・会員の検証はアプリケーション層で行う。
pub fn open_loan(cmd: &CreateLoan) -> Loan {
    Loan {
        loan_id: LoanId::new(),
        member_id: cmd.member_id,
        book_id: cmd.book_id,
        recorded_by: cmd.recorded_by,
        borrowed_at: cmd.borrowed_at,
        due_date: due_date_for(cmd.borrowed_at, cmd.loan_days),
        returned_at: None,
        status: LoanStatus::Active,
        fine: Decimal::ZERO,
        notes: cmd.notes.clone(),
        created_at: cmd.borrowed_at,
    }
}

/// 純粋関数：書籍を返却する
///
/// ビジネスルール：
/// - Active以外（返却済み）は返却不可
/// - 延滞料金が0ならReturned、それ以外はOverdue
/// - メモは既存のメモに追記する
///
/// 副作用なし。新しいLoanを返す。
pub fn return_loan(
    loan: &Loan,
    returned_at: DateTime<Utc>,
    notes: Option<&str>,
) -> Result<Loan, ReturnLoanError> {
    if !loan.status.is_active() {
        return Err(ReturnLoanError::AlreadyReturned);
    }

    let fine = fine::compute_fine(loan.due_date, returned_at);
    let status = if fine.is_zero() {
        LoanStatus::Returned
    } else {
        LoanStatus::Overdue
    };

    Ok(Loan {
        returned_at: Some(returned_at),
        status,
        fine,
        notes: append_notes(&loan.notes, notes),
        ..loan.clone()
    })
}

/// 純粋関数：延滞判定
///
/// 返却されていない貸出が返却期限を過ぎているか。
pub fn is_overdue(loan: &Loan, now: DateTime<Utc>) -> bool {
    loan.status.is_active() && now > loan.due_date
}

fn append_notes(existing: &str, addition: Option<&str>) -> String {
    match addition.map(str::trim).filter(|s| !s.is_empty()) {
        None => existing.to_string(),
        Some(addition) if existing.is_empty() => addition.to_string(),
        Some(addition) => format!("{}\n{}", existing, addition),
    }
}
