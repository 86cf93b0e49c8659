use thiserror::Error;

/// 貸出可能数の増減エラー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AvailabilityError {
    /// 貸出可能な冊数が残っていない
    #[error("no copies left to lend")]
    Exhausted,
    /// 在庫数を超えて戻そうとした
    #[error("available count would exceed stock")]
    AboveStock,
}

/// 返却のエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReturnLoanError {
    /// 既に返却済み（returned / overdue）
    #[error("loan has already been returned")]
    AlreadyReturned,
}
