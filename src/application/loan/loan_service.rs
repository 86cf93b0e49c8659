use crate::domain::{
    self, LoanId,
    commands::{CreateLoan, ReturnLoan},
    loan::{Loan, LoanStatus},
};
use crate::ports::*;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;

use super::availability_ledger;
use super::errors::{LoanApplicationError, Result};

/// メモの最大文字数
const MAX_NOTES_LEN: usize = 1000;

/// 貸出日数の上限
const MAX_LOAN_DAYS: u32 = 365;

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// ストレージへのハンドルはプロセスが所有し、ここから明示的に渡される。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub book_store: Arc<dyn BookAvailabilityStore>,
    pub loan_repository: Arc<dyn LoanRepository>,
    pub member_lookup: Arc<dyn MemberLookup>,
    pub notification_sink: Arc<dyn NotificationSink>,
    pub notification_inbox: Arc<dyn NotificationInbox>,
}

/// ダッシュボード用の貸出件数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoanStats {
    pub active: i64,
    pub overdue: i64,
}

/// 貸出日の範囲で集計した取引レポート
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanReport {
    pub total: usize,
    pub active: usize,
    pub returned: usize,
    pub overdue: usize,
    /// 返却時に確定した延滞料金の合計
    pub total_fine: Decimal,
    /// 対象の貸出（新しい順）
    pub loans: Vec<Loan>,
}

impl LoanReport {
    fn from_loans(loans: Vec<Loan>) -> Self {
        let count = |status: LoanStatus| loans.iter().filter(|l| l.status == status).count();

        Self {
            total: loans.len(),
            active: count(LoanStatus::Active),
            returned: count(LoanStatus::Returned),
            overdue: count(LoanStatus::Overdue),
            total_fine: loans.iter().map(|l| l.fine).sum(),
            loans,
        }
    }
}

/// 書籍を貸し出す
///
/// ビジネスルール：
/// - 書籍が存在し、貸出可能数が1以上であること
/// - 会員が存在し、有効であること
/// - 返却期限は貸出日時 + 貸出日数（既定7日）
///
/// # 一貫性保証
///
/// 貸出可能数の条件付き減算 → 貸出の登録 の順に行い、登録に失敗した
/// 場合は減算を戻す（補償処理）。登録前の貸出は一覧・返却から見えないため、
/// 途中状態の貸出が返却されることはない。減算は条件付き更新のため、
/// 貸出可能数が k の書籍に N 件の同時貸出があっても成功するのは k 件のみ。
///
/// # 引数
/// * `deps` - サービスの依存関係
/// * `cmd` - 貸出コマンド
///
/// # 戻り値
/// 成功時は作成された貸出のID
pub async fn create_loan(deps: &ServiceDependencies, cmd: CreateLoan) -> Result<LoanId> {
    if cmd.notes.chars().count() > MAX_NOTES_LEN {
        return Err(LoanApplicationError::Validation(format!(
            "notes must be at most {} characters",
            MAX_NOTES_LEN
        )));
    }

    if cmd.loan_days.value() > MAX_LOAN_DAYS {
        return Err(LoanApplicationError::Validation(format!(
            "loan_days must be at most {}",
            MAX_LOAN_DAYS
        )));
    }

    // 1. 書籍と会員を並行して取得
    let (book, member) = futures::try_join!(
        async {
            deps.book_store
                .find_by_id(cmd.book_id)
                .await
                .map_err(LoanApplicationError::BookStoreError)
        },
        async {
            deps.member_lookup
                .find_by_id(cmd.member_id)
                .await
                .map_err(LoanApplicationError::MemberLookupError)
        },
    )?;

    // 2. 書籍の貸出可能性確認
    let book = book.ok_or(LoanApplicationError::BookNotFound)?;
    if !book.is_available() {
        return Err(LoanApplicationError::BookUnavailable);
    }

    // 3. 会員の確認
    let member = member.ok_or(LoanApplicationError::MemberNotFound)?;
    if !member.is_active {
        return Err(LoanApplicationError::MemberInactive);
    }

    // 4. ドメイン層の純粋関数を呼び出し
    let loan = domain::loan::open_loan(&cmd);

    // 5. 貸出可能数を先に確保する。確保だけでは他の操作から見えない
    availability_ledger::reserve(&deps.book_store, loan.book_id).await?;

    // 6. 貸出を登録。失敗したら確保した分を戻す
    if let Err(err) = deps.loan_repository.insert(&loan).await {
        if let Err(cleanup) = availability_ledger::release(&deps.book_store, loan.book_id).await {
            tracing::error!(
                book_id = %loan.book_id,
                "failed to release reservation after loan insert failure: {}",
                cleanup
            );
        }
        return Err(LoanApplicationError::LoanRepositoryError(err));
    }

    tracing::info!(
        loan_id = %loan.loan_id,
        book_id = %loan.book_id,
        member_id = %loan.member_id,
        due_date = %loan.due_date,
        "loan created"
    );

    Ok(loan.loan_id)
}

/// 書籍を返却する
///
/// ビジネスルール：
/// - 貸出が存在すること
/// - 貸出がActive状態であること（返却は1回のみ）
/// - 延滞料金は返却日時と返却期限から計算し、0ならReturned、それ以外はOverdue
///
/// # 一貫性保証
///
/// ステータスの更新は active の場合のみ行う条件付き更新のため、
/// 同じ貸出への同時返却は1件のみ成功する。その後の貸出可能数の加算が
/// 失敗した場合は貸出を active に戻す（補償処理）。
///
/// # 戻り値
/// 延滞料金を含む返却後の貸出
pub async fn return_loan(deps: &ServiceDependencies, cmd: ReturnLoan) -> Result<Loan> {
    // 1. 貸出を取得
    let loan = get_loan(deps, cmd.loan_id).await?;

    // 2. ドメイン層の純粋関数を呼び出し
    let returned = domain::loan::return_loan(&loan, cmd.returned_at, cmd.notes.as_deref())
        .map_err(|_| LoanApplicationError::AlreadyReturned)?;

    // 3. 条件付きでステータスを更新
    let closed = deps
        .loan_repository
        .close(&returned)
        .await
        .map_err(LoanApplicationError::LoanRepositoryError)?;

    if !closed {
        return Err(LoanApplicationError::AlreadyReturned);
    }

    // 4. 貸出可能数を戻す。失敗したら返却を取り消す
    if let Err(err) = availability_ledger::release(&deps.book_store, loan.book_id).await {
        if let Err(cleanup) = deps.loan_repository.reopen(&loan).await {
            tracing::error!(
                loan_id = %loan.loan_id,
                "failed to reopen loan after release failure: {}",
                cleanup
            );
        }
        return Err(err);
    }

    tracing::info!(
        loan_id = %returned.loan_id,
        status = returned.status.as_str(),
        fine = %returned.fine,
        "loan returned"
    );

    Ok(returned)
}

/// IDで貸出を取得する
pub async fn get_loan(deps: &ServiceDependencies, loan_id: LoanId) -> Result<Loan> {
    deps.loan_repository
        .get_by_id(loan_id)
        .await
        .map_err(LoanApplicationError::LoanRepositoryError)?
        .ok_or(LoanApplicationError::LoanNotFound)
}

/// 条件に一致する貸出を一覧する
///
/// 会員・書籍・ステータス・貸出日の範囲で絞り込む。
pub async fn list_loans(deps: &ServiceDependencies, filter: &LoanFilter) -> Result<Vec<Loan>> {
    if let (Some(from), Some(to)) = (filter.borrowed_from, filter.borrowed_to) {
        if from > to {
            return Err(LoanApplicationError::Validation(
                "borrowed_from must not be after borrowed_to".to_string(),
            ));
        }
    }

    deps.loan_repository
        .find(filter)
        .await
        .map_err(LoanApplicationError::LoanRepositoryError)
}

/// 貸出中・延滞中の件数を取得する
pub async fn loan_stats(deps: &ServiceDependencies, now: DateTime<Utc>) -> Result<LoanStats> {
    let (active, overdue) = futures::try_join!(
        deps.loan_repository.count_active(),
        deps.loan_repository.count_overdue(now),
    )
    .map_err(LoanApplicationError::LoanRepositoryError)?;

    Ok(LoanStats { active, overdue })
}

/// 貸出日の範囲で取引レポートを作成する
///
/// 範囲の両端は省略可能。from が to より後の場合は Validation。
pub async fn loan_report(
    deps: &ServiceDependencies,
    borrowed_from: Option<DateTime<Utc>>,
    borrowed_to: Option<DateTime<Utc>>,
) -> Result<LoanReport> {
    let filter = LoanFilter {
        borrowed_from,
        borrowed_to,
        ..LoanFilter::default()
    };

    let loans = list_loans(deps, &filter).await?;
    Ok(LoanReport::from_loans(loans))
}
