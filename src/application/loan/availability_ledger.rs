use crate::domain::BookId;
use crate::ports::{Adjustment, BookAvailabilityStore};
use std::sync::Arc;

use super::errors::{LoanApplicationError, Result};

/// 貸出可能数を1減らす（貸出時）
///
/// 減算後の値が0以上になる場合のみ成功する。判定と更新は
/// ストアの条件付き更新で一度に行われるため、同じ書籍への同時貸出でも
/// 貸出可能数を超えて成功することはない。
///
/// # エラー
/// - BookUnavailable: 貸出可能数が0
/// - BookNotFound: 書籍が存在しない
pub async fn reserve(store: &Arc<dyn BookAvailabilityStore>, book_id: BookId) -> Result<()> {
    let adjustment = store
        .adjust_availability(book_id, -1)
        .await
        .map_err(LoanApplicationError::BookStoreError)?;

    match adjustment {
        Adjustment::Applied => Ok(()),
        Adjustment::Rejected => Err(LoanApplicationError::BookUnavailable),
        Adjustment::BookMissing => Err(LoanApplicationError::BookNotFound),
    }
}

/// 貸出可能数を1増やす（返却時）
///
/// 在庫数を超える場合は適用されない。業務上は reserve の後にしか
/// 呼ばれないため、拒否された場合は帳簿のずれとして記録するだけで
/// 返却自体は成功させる。
pub async fn release(store: &Arc<dyn BookAvailabilityStore>, book_id: BookId) -> Result<()> {
    let adjustment = store
        .adjust_availability(book_id, 1)
        .await
        .map_err(LoanApplicationError::BookStoreError)?;

    match adjustment {
        Adjustment::Applied => Ok(()),
        Adjustment::Rejected => {
            tracing::warn!(%book_id, "release rejected: available count already at stock");
            Ok(())
        }
        Adjustment::BookMissing => {
            tracing::warn!(%book_id, "release skipped: book no longer exists");
            Ok(())
        }
    }
}
