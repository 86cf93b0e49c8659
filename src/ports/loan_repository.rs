use crate::domain::{
    BookId, LoanId, MemberId,
    loan::{Loan, LoanStatus},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 貸出一覧の検索条件
///
/// 指定されたものだけが AND で適用される。日付範囲は貸出日時に対して両端を含む。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoanFilter {
    pub member_id: Option<MemberId>,
    pub book_id: Option<BookId>,
    pub status: Option<LoanStatus>,
    pub borrowed_from: Option<DateTime<Utc>>,
    pub borrowed_to: Option<DateTime<Utc>>,
}

impl LoanFilter {
    /// 会員の全貸出
    pub fn for_member(member_id: MemberId) -> Self {
        Self {
            member_id: Some(member_id),
            ..Self::default()
        }
    }

    /// 貸出がこの条件に一致するか
    pub fn matches(&self, loan: &Loan) -> bool {
        self.member_id.is_none_or(|id| loan.member_id == id)
            && self.book_id.is_none_or(|id| loan.book_id == id)
            && self.status.is_none_or(|status| loan.status == status)
            && self.borrowed_from.is_none_or(|from| loan.borrowed_at >= from)
            && self.borrowed_to.is_none_or(|to| loan.borrowed_at <= to)
    }
}

/// 貸出リポジトリポート
#[async_trait]
pub trait LoanRepository: Send + Sync {
    /// 新しい貸出を保存する
    async fn insert(&self, loan: &Loan) -> Result<()>;

    /// 貸出を削除する
    ///
    /// 貸出可能数の確保に失敗した仮登録の取り消しにのみ使用される。
    async fn delete(&self, loan_id: LoanId) -> Result<()>;

    /// IDで貸出を取得する
    async fn get_by_id(&self, loan_id: LoanId) -> Result<Option<Loan>>;

    /// 返却結果を保存する
    ///
    /// 現在のステータスが active の場合のみ更新する（条件付き更新）。
    /// 更新した場合は true、既に返却済みだった場合は false を返す。
    async fn close(&self, returned: &Loan) -> Result<bool>;

    /// 返却を取り消して active に戻す
    ///
    /// 返却後の貸出可能数の更新に失敗した場合の補償処理で使用される。
    async fn reopen(&self, original: &Loan) -> Result<()>;

    /// 条件に一致する貸出を新しい順に検索する
    async fn find(&self, filter: &LoanFilter) -> Result<Vec<Loan>>;

    /// 延滞候補の貸出を検索する
    ///
    /// due_date < cutoff かつ status が active の貸出を返却期限の古い順に返す。
    async fn find_overdue_candidates(&self, cutoff: DateTime<Utc>) -> Result<Vec<Loan>>;

    /// active な貸出の件数
    async fn count_active(&self) -> Result<i64>;

    /// due_date < cutoff の active な貸出の件数
    async fn count_overdue(&self, cutoff: DateTime<Utc>) -> Result<i64>;
}
