use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, LoanDays, LoanId, MemberId, StaffId};

/// コマンド：書籍を貸し出す
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLoan {
    pub member_id: MemberId,
    pub book_id: BookId,
    pub loan_days: LoanDays,
    pub recorded_by: Option<StaffId>,
    pub notes: String,
    pub borrowed_at: DateTime<Utc>,
}

/// コマンド：書籍を返却する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnLoan {
    pub loan_id: LoanId,
    pub returned_at: DateTime<Utc>,
    pub notes: Option<String>,
}
